//! Query resolver
//!
//! Turns a natural-language question into a SQL candidate: exact-match
//! lookup in the canonical registry first, text generation as the fallback.
//! Generated output is unwrapped from code fences but otherwise passed
//! through untouched; the safety gate downstream is the only check on it.

use crate::error::{InsightError, Result};
use crate::llm::TextGenerator;
use crate::registry::{CanonicalRegistry, QueryIntent};
use lazy_static::lazy_static;
use regex::Regex;
use std::sync::Arc;
use tracing::{debug, info};

/// Schema description embedded in every generation prompt
const DB_SCHEMA: &str = r#"The database 'rental_app' has the following tables and columns:
- users (user_id INTEGER, first_name VARCHAR, last_name VARCHAR, email VARCHAR, phone VARCHAR, role TEXT)
- properties (property_id INTEGER, landlord_id INTEGER, title VARCHAR, description TEXT, property_type TEXT, address VARCHAR, city VARCHAR, rent_price DECIMAL, status TEXT, listed_at TIMESTAMP, bedrooms INTEGER, bathrooms INTEGER)
- bookings (booking_id INTEGER, property_id INTEGER, tenant_id INTEGER, start_date DATE, end_date DATE, status TEXT)
- payments (payment_id INTEGER, booking_id INTEGER, tenant_id INTEGER, amount DECIMAL, payment_date DATE, status TEXT, method TEXT)
- reviews (review_id INTEGER, property_id INTEGER, tenant_id INTEGER, rating INTEGER, comment TEXT)
- property_photos (photo_id INTEGER, property_id INTEGER, photo_url VARCHAR, uploaded_at TIMESTAMP)
- favorites (tenant_id INTEGER, property_id INTEGER, added_at TIMESTAMP)

Relationships (Foreign Keys):
- properties.landlord_id -> users.user_id
- bookings.property_id -> properties.property_id
- bookings.tenant_id -> users.user_id
- payments.booking_id -> bookings.booking_id
- payments.tenant_id -> users.user_id
- reviews.property_id -> properties.property_id
- reviews.tenant_id -> users.user_id

You must follow these instructions strictly:
- Your response must ONLY be a single, valid SQLite SQL query.
- Do not include any explanations, code block formatting (like ```sql), or extra text.
- For all queries, only select the columns needed to answer the user's question."#;

lazy_static! {
    static ref CODE_FENCE: Regex = Regex::new(r"(?s)```(?:sql)?\s*(.*?)\s*```").unwrap();
}

/// SQL candidate produced by resolution. The intent tag is present for
/// canonical hits only; generated SQL is classified later from the question.
#[derive(Debug, Clone)]
pub struct ResolvedQuery {
    pub sql: String,
    pub intent: Option<QueryIntent>,
}

/// Resolves questions against the registry, delegating misses to the
/// text-generation collaborator
pub struct QueryResolver {
    registry: Arc<CanonicalRegistry>,
    generator: Arc<dyn TextGenerator>,
}

impl QueryResolver {
    pub fn new(registry: Arc<CanonicalRegistry>, generator: Arc<dyn TextGenerator>) -> Self {
        Self {
            registry,
            generator,
        }
    }

    /// Resolve a question to a SQL candidate.
    ///
    /// Canonical hits return the stored template verbatim; identical
    /// normalized input always yields the identical template. Misses invoke
    /// the generator exactly once. A collaborator error or an empty
    /// response maps to a Generation error.
    pub async fn resolve(&self, question: &str) -> Result<ResolvedQuery> {
        let key = CanonicalRegistry::normalize(question);
        if let Some(entry) = self.registry.lookup(&key) {
            info!("Using canonical SQL for this question");
            return Ok(ResolvedQuery {
                sql: entry.sql.clone(),
                intent: Some(entry.intent),
            });
        }

        info!("No canonical match, delegating to text generation");
        let prompt = build_prompt(question);
        let raw = self.generator.generate(&prompt).await?;
        let sql = strip_code_fences(&raw);
        debug!("Generated candidate: {}", sql);

        if sql.is_empty() {
            return Err(InsightError::Generation(
                "Generator returned an empty response".to_string(),
            ));
        }

        Ok(ResolvedQuery { sql, intent: None })
    }
}

fn build_prompt(question: &str) -> String {
    format!(
        "{}\nUser request: {}\nSQL Query:",
        DB_SCHEMA,
        question.trim()
    )
}

/// Unwrap a ```sql ... ``` (or bare ``` ... ```) block if present,
/// otherwise return the trimmed text unchanged.
fn strip_code_fences(text: &str) -> String {
    let trimmed = text.trim();
    if let Some(captures) = CODE_FENCE.captures(trimmed) {
        return captures[1].trim().to_string();
    }
    trimmed.to_string()
}
