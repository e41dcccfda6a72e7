//! Canonical query registry
//!
//! Maps a normalized natural-language question to a pre-approved SQL
//! template. The set is built once at startup and shared read-only; any
//! question outside it falls back to the text-generation path.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Semantic shape of a recognized question, carried through the pipeline so
/// the formatter can pick a rendering rule without re-parsing the question.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QueryIntent {
    OccupancyRate,
    TopTenants,
    AverageRating,
    LandlordRevenue,
    AvailableListings,
}

/// A pre-approved question with its trusted SQL template
#[derive(Debug, Clone)]
pub struct CanonicalQuery {
    /// Normalized (trimmed, lowercased) question text
    pub key: String,

    /// SQL template executed verbatim on a match
    pub sql: String,

    /// Rendering intent attached at construction time
    pub intent: QueryIntent,
}

/// Immutable lookup table from normalized question to canonical query.
/// Constructed once in main and passed into the resolver by reference.
pub struct CanonicalRegistry {
    entries: HashMap<String, CanonicalQuery>,
}

impl CanonicalRegistry {
    /// Build the registry with the built-in question set.
    ///
    /// Join semantics fixed here: tenant attribution goes through the
    /// booking record (payments -> bookings -> users), and payment sums are
    /// not filtered on payments.status.
    pub fn builtin() -> Self {
        let seed = [
            (
                "What's the occupancy rate of properties in Bradford?",
                QueryIntent::OccupancyRate,
                r#"
        SELECT CAST(SUM(CASE WHEN status = 'booked' THEN 1 ELSE 0 END) AS REAL) * 100 / COUNT(*)
        FROM properties WHERE city = 'Bradford'
    "#,
            ),
            (
                "Who are the top 10 tenants by total rent paid?",
                QueryIntent::TopTenants,
                r#"
        SELECT
            T2.first_name,
            T2.last_name,
            SUM(T1.amount) AS total_rent_paid
        FROM payments AS T1
        INNER JOIN bookings AS T3 ON T1.booking_id = T3.booking_id
        INNER JOIN users AS T2 ON T3.tenant_id = T2.user_id
        WHERE T2.role = 'tenant'
        GROUP BY
            T2.user_id
        ORDER BY
            total_rent_paid DESC
        LIMIT 10;
    "#,
            ),
            (
                "What's the average rating of apartments vs houses?",
                QueryIntent::AverageRating,
                r#"
        SELECT T2.property_type, AVG(T1.rating)
        FROM reviews AS T1
        INNER JOIN properties AS T2 ON T1.property_id = T2.property_id
        GROUP BY T2.property_type;
    "#,
            ),
            (
                "Which landlords generated the most revenue this year?",
                QueryIntent::LandlordRevenue,
                r#"
        SELECT
            T3.first_name,
            T3.last_name,
            SUM(T1.amount) AS total_revenue
        FROM payments AS T1
        INNER JOIN bookings AS T2 ON T1.booking_id = T2.booking_id
        INNER JOIN properties AS T4 ON T2.property_id = T4.property_id
        INNER JOIN users AS T3 ON T4.landlord_id = T3.user_id
        WHERE T3.role = 'landlord'
        GROUP BY
            T3.user_id
        ORDER BY
            total_revenue DESC;
    "#,
            ),
            (
                "List all currently available 2BHKs under $2500 in London.",
                QueryIntent::AvailableListings,
                r#"
        SELECT title, city, rent_price
        FROM properties
        WHERE bedrooms = 2 AND city = 'London' AND status = 'available' AND rent_price < 2500;
    "#,
            ),
        ];

        let mut entries = HashMap::new();
        for (question, intent, sql) in seed {
            let key = Self::normalize(question);
            entries.insert(
                key.clone(),
                CanonicalQuery {
                    key,
                    sql: sql.to_string(),
                    intent,
                },
            );
        }

        Self { entries }
    }

    /// Normalize a question for lookup: trim and lowercase. Exact-match
    /// only, no fuzzy or partial matching.
    pub fn normalize(question: &str) -> String {
        question.trim().to_lowercase()
    }

    /// Look up an already-normalized question
    pub fn lookup(&self, normalized: &str) -> Option<&CanonicalQuery> {
        self.entries.get(normalized)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over the normalized keys (test support and diagnostics)
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(|k| k.as_str())
    }
}
