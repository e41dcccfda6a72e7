//! Read-only statement gate
//!
//! Sole execution gate for candidate SQL: a statement passes iff its
//! trimmed, lowercased text starts with `select`. This is a syntactic
//! prefix check only; callers rely on exactly this contract, so it must
//! not be strengthened or weakened.

use crate::error::{InsightError, Result};
use tracing::warn;

pub struct SafetyGate;

impl SafetyGate {
    pub fn new() -> Self {
        Self
    }

    /// Validate a candidate statement, rejecting absence and anything that
    /// is not a SELECT.
    pub fn validate<'a>(&self, candidate: Option<&'a str>) -> Result<&'a str> {
        let sql = candidate.ok_or_else(|| {
            warn!("Rejected empty SQL candidate");
            InsightError::Unsafe("No statement to validate".to_string())
        })?;

        if Self::is_read_only(sql) {
            Ok(sql)
        } else {
            warn!("Rejected non-select statement");
            Err(InsightError::Unsafe(format!(
                "Statement is not a select: {}",
                sql.trim()
            )))
        }
    }

    /// True iff the trimmed, lowercased statement starts with `select`
    pub fn is_read_only(sql: &str) -> bool {
        sql.trim().to_lowercase().starts_with("select")
    }
}

impl Default for SafetyGate {
    fn default() -> Self {
        Self::new()
    }
}
