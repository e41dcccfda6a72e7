//! SQL executor
//!
//! Runs a validated statement against the SQLite store and materializes
//! every row. Each call opens its own connection and releases it on every
//! exit path; store-level faults surface as Execution errors, never as
//! panics or leaked connections.

use crate::error::{InsightError, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;
use std::fmt;
use std::path::PathBuf;
use tracing::debug;

/// Scalar cell value materialized from the store
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl SqlValue {
    /// Numeric view used by currency/percentage/rating templates
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            SqlValue::Integer(i) => Some(*i as f64),
            SqlValue::Real(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SqlValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, SqlValue::Null)
    }

    fn from_ref(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => SqlValue::Null,
            ValueRef::Integer(i) => SqlValue::Integer(i),
            ValueRef::Real(f) => SqlValue::Real(f),
            ValueRef::Text(t) => SqlValue::Text(String::from_utf8_lossy(t).into_owned()),
            // The rental schema carries no blob columns
            ValueRef::Blob(_) => SqlValue::Null,
        }
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Null => write!(f, "NULL"),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Real(r) => write!(f, "{}", r),
            SqlValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// One result row, positional per the originating SQL
pub type Row = Vec<SqlValue>;

/// Executes read statements against the SQLite database file
pub struct SqlExecutor {
    db_path: PathBuf,
}

impl SqlExecutor {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
        }
    }

    /// Execute a statement and fetch all rows. The connection is scoped to
    /// this call and dropped on success, empty result, and error alike.
    pub fn execute(&self, sql: &str) -> Result<Vec<Row>> {
        let conn = Connection::open(&self.db_path)
            .map_err(|e| InsightError::Execution(format!("Failed to open database: {}", e)))?;

        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| InsightError::Execution(format!("Failed to prepare statement: {}", e)))?;
        let column_count = stmt.column_count();

        let mapped = stmt
            .query_map([], |row| {
                let mut values = Vec::with_capacity(column_count);
                for idx in 0..column_count {
                    values.push(SqlValue::from_ref(row.get_ref(idx)?));
                }
                Ok(values)
            })
            .map_err(|e| InsightError::Execution(format!("Failed to run statement: {}", e)))?;

        let mut rows = Vec::new();
        for row in mapped {
            rows.push(
                row.map_err(|e| InsightError::Execution(format!("Failed to read row: {}", e)))?,
            );
        }

        debug!("Statement returned {} rows", rows.len());
        Ok(rows)
    }
}
