use thiserror::Error;

#[derive(Error, Debug)]
pub enum InsightError {
    #[error("Generation error: {0}")]
    Generation(String),

    #[error("Unsafe statement: {0}")]
    Unsafe(String),

    #[error("Execution error: {0}")]
    Execution(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, InsightError>;
