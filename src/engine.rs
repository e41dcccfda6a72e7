//! Insight engine
//!
//! Sequences resolution, safety validation, execution, and formatting into
//! a single `process(question) -> text` call. Every stage failure collapses
//! to one user-facing apology; the specific kind is only logged.

use crate::error::InsightError;
use crate::executor::SqlExecutor;
use crate::formatter::ResultFormatter;
use crate::llm::TextGenerator;
use crate::registry::CanonicalRegistry;
use crate::resolver::QueryResolver;
use crate::safety::SafetyGate;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// Single user-facing message for every failure kind
pub const APOLOGY: &str = "Sorry, unable to answer at this point in time.";

/// Why a pipeline run failed. Recorded for operators; callers only ever see
/// the apology literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    GenerationFailed,
    Unsafe,
    ExecutionFailed,
}

impl From<&InsightError> for FailureKind {
    fn from(err: &InsightError) -> Self {
        match err {
            InsightError::Generation(_) => FailureKind::GenerationFailed,
            InsightError::Unsafe(_) => FailureKind::Unsafe,
            _ => FailureKind::ExecutionFailed,
        }
    }
}

/// Terminal outcome of one pipeline run
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessOutcome {
    Success(String),
    Failure(FailureKind),
}

impl ProcessOutcome {
    /// Render to the user-facing answer text
    pub fn render(self) -> String {
        match self {
            ProcessOutcome::Success(text) => text,
            ProcessOutcome::Failure(_) => APOLOGY.to_string(),
        }
    }
}

/// The question-answering pipeline: resolve, validate, execute, format
pub struct InsightEngine {
    resolver: QueryResolver,
    gate: SafetyGate,
    executor: SqlExecutor,
    formatter: ResultFormatter,
}

impl InsightEngine {
    pub fn new(
        registry: Arc<CanonicalRegistry>,
        generator: Arc<dyn TextGenerator>,
        db_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            resolver: QueryResolver::new(registry, generator),
            gate: SafetyGate::new(),
            executor: SqlExecutor::new(db_path),
            formatter: ResultFormatter::new(),
        }
    }

    /// Answer a question, mapping any stage failure to the apology literal.
    pub async fn process(&self, question: &str) -> String {
        self.run(question).await.render()
    }

    /// Run the pipeline and return the explicit outcome
    pub async fn run(&self, question: &str) -> ProcessOutcome {
        info!("Processing question: {}", question);

        let resolved = match self.resolver.resolve(question).await {
            Ok(resolved) => resolved,
            Err(e) => return Self::fail("Resolution", &e),
        };

        let sql = match self.gate.validate(Some(resolved.sql.as_str())) {
            Ok(sql) => sql,
            Err(e) => return Self::fail("Validation", &e),
        };

        let rows = match self.executor.execute(sql) {
            Ok(rows) => rows,
            Err(e) => return Self::fail("Execution", &e),
        };

        ProcessOutcome::Success(self.formatter.format(question, resolved.intent, &rows))
    }

    fn fail(stage: &str, err: &InsightError) -> ProcessOutcome {
        warn!("{} stage failed: {}", stage, err);
        ProcessOutcome::Failure(FailureKind::from(err))
    }
}
