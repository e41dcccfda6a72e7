//! Store setup
//!
//! Creates the seven-table rental schema and seeds the sample dataset.
//! Schema creation and seeding are split so tests can load their own rows
//! against the real schema.

use crate::error::{InsightError, Result};
use rusqlite::{params, Connection};
use std::path::Path;
use tracing::info;

const DROP_ORDER: &[&str] = &[
    "favorites",
    "property_photos",
    "reviews",
    "payments",
    "bookings",
    "properties",
    "users",
];

const SCHEMA: &[&str] = &[
    r#"
        CREATE TABLE users (
            user_id INTEGER PRIMARY KEY,
            first_name VARCHAR,
            last_name VARCHAR,
            email VARCHAR UNIQUE,
            phone VARCHAR,
            role TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP
        )
    "#,
    r#"
        CREATE TABLE properties (
            property_id INTEGER PRIMARY KEY,
            landlord_id INTEGER,
            title VARCHAR,
            description TEXT,
            property_type TEXT,
            address VARCHAR,
            city VARCHAR,
            state VARCHAR,
            country VARCHAR,
            bedrooms INTEGER,
            bathrooms INTEGER,
            rent_price DECIMAL(12,2),
            status TEXT,
            listed_at TIMESTAMP,
            FOREIGN KEY (landlord_id) REFERENCES users(user_id)
        )
    "#,
    r#"
        CREATE TABLE bookings (
            booking_id INTEGER PRIMARY KEY,
            property_id INTEGER,
            tenant_id INTEGER,
            start_date DATE,
            end_date DATE,
            status TEXT,
            created_at TIMESTAMP DEFAULT CURRENT_TIMESTAMP,
            FOREIGN KEY (property_id) REFERENCES properties(property_id),
            FOREIGN KEY (tenant_id) REFERENCES users(user_id)
        )
    "#,
    r#"
        CREATE TABLE payments (
            payment_id INTEGER PRIMARY KEY,
            booking_id INTEGER,
            tenant_id INTEGER,
            amount DECIMAL(12,2),
            payment_date DATE,
            status TEXT,
            method TEXT,
            FOREIGN KEY (booking_id) REFERENCES bookings(booking_id),
            FOREIGN KEY (tenant_id) REFERENCES users(user_id)
        )
    "#,
    r#"
        CREATE TABLE reviews (
            review_id INTEGER PRIMARY KEY,
            property_id INTEGER,
            tenant_id INTEGER,
            rating INTEGER,
            comment TEXT,
            created_at TIMESTAMP,
            FOREIGN KEY (property_id) REFERENCES properties(property_id),
            FOREIGN KEY (tenant_id) REFERENCES users(user_id)
        )
    "#,
    r#"
        CREATE TABLE property_photos (
            photo_id INTEGER PRIMARY KEY,
            property_id INTEGER,
            photo_url VARCHAR,
            uploaded_at TIMESTAMP,
            FOREIGN KEY (property_id) REFERENCES properties(property_id)
        )
    "#,
    r#"
        CREATE TABLE favorites (
            tenant_id INTEGER,
            property_id INTEGER,
            added_at TIMESTAMP,
            PRIMARY KEY (tenant_id, property_id),
            FOREIGN KEY (tenant_id) REFERENCES users(user_id),
            FOREIGN KEY (property_id) REFERENCES properties(property_id)
        )
    "#,
];

/// Drop and recreate the rental schema
pub fn create_schema(conn: &Connection) -> Result<()> {
    for table in DROP_ORDER {
        conn.execute(&format!("DROP TABLE IF EXISTS {}", table), [])
            .map_err(|e| InsightError::Execution(format!("Failed to drop {}: {}", table, e)))?;
    }
    for ddl in SCHEMA {
        conn.execute(ddl, [])
            .map_err(|e| InsightError::Execution(format!("Failed to create table: {}", e)))?;
    }
    Ok(())
}

/// Seed the sample dataset used by the demo questions
pub fn seed_sample_data(conn: &Connection) -> Result<()> {
    let users: &[(i64, &str, &str, &str)] = &[
        (1, "Alice", "Smith", "landlord"),
        (2, "Bob", "Johnson", "tenant"),
        (3, "Charlie", "Williams", "landlord"),
        (4, "David", "Brown", "tenant"),
    ];
    let mut insert_user = conn
        .prepare("INSERT INTO users (user_id, first_name, last_name, role) VALUES (?1, ?2, ?3, ?4)")
        .map_err(|e| InsightError::Execution(format!("Failed to prepare insert: {}", e)))?;
    for (user_id, first_name, last_name, role) in users {
        insert_user
            .execute(params![user_id, first_name, last_name, role])
            .map_err(|e| InsightError::Execution(format!("Failed to seed users: {}", e)))?;
    }

    let properties: &[(i64, i64, &str, &str, &str, f64, &str, i64)] = &[
        (101, 1, "Cozy Apartment", "London", "apartment", 1500.00, "booked", 1),
        (102, 1, "Spacious House", "Bradford", "house", 2200.00, "booked", 3),
        (103, 3, "Riverside Studio", "London", "studio", 1100.00, "available", 1),
        (104, 3, "Modern Apartment", "London", "apartment", 2400.00, "available", 2),
        (105, 1, "Luxury Apartment", "London", "apartment", 2200.00, "available", 2),
    ];
    let mut insert_property = conn
        .prepare(
            "INSERT INTO properties (property_id, landlord_id, title, city, property_type, rent_price, status, bedrooms) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )
        .map_err(|e| InsightError::Execution(format!("Failed to prepare insert: {}", e)))?;
    for (property_id, landlord_id, title, city, property_type, rent_price, status, bedrooms) in
        properties
    {
        insert_property
            .execute(params![
                property_id,
                landlord_id,
                title,
                city,
                property_type,
                rent_price,
                status,
                bedrooms
            ])
            .map_err(|e| InsightError::Execution(format!("Failed to seed properties: {}", e)))?;
    }

    let bookings: &[(i64, i64, i64, &str, &str, &str)] = &[
        (1001, 101, 2, "completed", "2024-05-01", "2024-06-01"),
        (1002, 102, 2, "completed", "2024-08-01", "2024-08-15"),
        (1003, 104, 4, "completed", "2024-07-01", "2024-07-31"),
    ];
    let mut insert_booking = conn
        .prepare(
            "INSERT INTO bookings (booking_id, property_id, tenant_id, status, start_date, end_date) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| InsightError::Execution(format!("Failed to prepare insert: {}", e)))?;
    for (booking_id, property_id, tenant_id, status, start_date, end_date) in bookings {
        insert_booking
            .execute(params![
                booking_id,
                property_id,
                tenant_id,
                status,
                start_date,
                end_date
            ])
            .map_err(|e| InsightError::Execution(format!("Failed to seed bookings: {}", e)))?;
    }

    let payments: &[(i64, i64, i64, f64, &str, &str)] = &[
        (2001, 1001, 2, 1500.00, "2024-05-01", "successful"),
        (2002, 1002, 2, 2200.00, "2024-08-01", "successful"),
        (2003, 1003, 4, 2400.00, "2024-07-01", "successful"),
    ];
    let mut insert_payment = conn
        .prepare(
            "INSERT INTO payments (payment_id, booking_id, tenant_id, amount, payment_date, status) \
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .map_err(|e| InsightError::Execution(format!("Failed to prepare insert: {}", e)))?;
    for (payment_id, booking_id, tenant_id, amount, payment_date, status) in payments {
        insert_payment
            .execute(params![
                payment_id,
                booking_id,
                tenant_id,
                amount,
                payment_date,
                status
            ])
            .map_err(|e| InsightError::Execution(format!("Failed to seed payments: {}", e)))?;
    }

    let reviews: &[(i64, i64, i64, i64, &str)] = &[
        (3001, 102, 2, 5, "Great house, very clean."),
        (3002, 101, 2, 4, "Nice location, good service."),
        (3003, 103, 2, 4, "Awesome."),
    ];
    let mut insert_review = conn
        .prepare(
            "INSERT INTO reviews (review_id, property_id, tenant_id, rating, comment) \
             VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .map_err(|e| InsightError::Execution(format!("Failed to prepare insert: {}", e)))?;
    for (review_id, property_id, tenant_id, rating, comment) in reviews {
        insert_review
            .execute(params![review_id, property_id, tenant_id, rating, comment])
            .map_err(|e| InsightError::Execution(format!("Failed to seed reviews: {}", e)))?;
    }

    Ok(())
}

/// Recreate the database file with schema and sample data
pub fn setup_database(db_path: impl AsRef<Path>) -> Result<()> {
    let conn = Connection::open(db_path.as_ref())
        .map_err(|e| InsightError::Execution(format!("Failed to open database: {}", e)))?;
    create_schema(&conn)?;
    seed_sample_data(&conn)?;
    info!("Database setup complete at {}", db_path.as_ref().display());
    Ok(())
}
