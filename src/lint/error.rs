//! Analyzer invocation failures.

use std::time::Duration;
use thiserror::Error;

/// Errors an analyzer adapter can fail with.
///
/// None of these abort a batch; the orchestrator turns each into a single
/// `analysis-unavailable` diagnostic for the affected file.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AnalyzerError {
    #[error("analyzer timed out after {}ms", .0.as_millis())]
    Timeout(Duration),
    #[error("analyzer crashed: {0}")]
    Crash(String),
    #[error("could not parse analyzer output: {0}")]
    ParseFailure(String),
}

/// Coarse failure category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerErrorKind {
    Timeout,
    Crash,
    ParseFailure,
}

impl AnalyzerError {
    pub fn kind(&self) -> AnalyzerErrorKind {
        match self {
            AnalyzerError::Timeout(_) => AnalyzerErrorKind::Timeout,
            AnalyzerError::Crash(_) => AnalyzerErrorKind::Crash,
            AnalyzerError::ParseFailure(_) => AnalyzerErrorKind::ParseFailure,
        }
    }

    /// Human-readable detail without the category prefix.
    pub fn detail(&self) -> String {
        match self {
            AnalyzerError::Timeout(d) => format!("no result within {}ms", d.as_millis()),
            AnalyzerError::Crash(detail) | AnalyzerError::ParseFailure(detail) => detail.clone(),
        }
    }
}

impl std::fmt::Display for AnalyzerErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerErrorKind::Timeout => write!(f, "timeout"),
            AnalyzerErrorKind::Crash => write!(f, "crash"),
            AnalyzerErrorKind::ParseFailure => write!(f, "parse-failure"),
        }
    }
}
