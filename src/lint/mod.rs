//! Per-language diagnostic adapters and their orchestration.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐     ┌──────────────────┐     ┌───────────────────┐
//! │ SourceFile   │────▶│ AnalyzerRegistry │────▶│ AnalyzerAdapter   │
//! │ (lang tag)   │     │ (tag -> adapter) │     │ heuristic/command │
//! └──────────────┘     └──────────────────┘     └───────────────────┘
//!                              ▲                          │
//!                              │                          ▼
//!                      ┌───────────────────┐     ┌──────────────────┐
//!                      │ LintOrchestrator  │◀────│ RawDiagnostic /  │
//!                      │ (pool, timeouts)  │     │ AnalyzerError    │
//!                      └───────────────────┘     └──────────────────┘
//! ```
//!
//! Adapters report diagnostics in their native severity vocabulary; the
//! aggregator normalizes them.
//!
//! # Adding an Adapter
//!
//! Implement [`AnalyzerAdapter`] and register it under a language tag with
//! [`AnalyzerRegistry::register`].

mod command;
mod error;
mod formats;
mod heuristic;
mod orchestrator;
mod registry;

pub use command::ExternalCommandAdapter;
pub use error::{AnalyzerError, AnalyzerErrorKind};
pub use formats::parse_output;
pub use heuristic::HeuristicLinter;
pub use orchestrator::{FileLint, LintOrchestrator};
pub use registry::AnalyzerRegistry;

use async_trait::async_trait;
use std::time::Duration;

use crate::types::Severity;

/// Rule id attached to the diagnostic that replaces a failed invocation.
pub const ANALYSIS_UNAVAILABLE: &str = "analysis-unavailable";

/// Message used when no adapter is registered for a file's language.
pub const UNSUPPORTED_FILE_TYPE: &str = "Unsupported file type";

/// Severity exactly as the analyzer reported it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NativeSeverity {
    /// Already one of the normalized levels.
    Normalized(Severity),
    /// ESLint numeric level (1 = warn, 2 = error).
    Level(u8),
    /// A textual label such as "convention", "fatal error" or "note".
    Label(String),
}

/// A diagnostic before severity normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawDiagnostic {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub severity: NativeSeverity,
    pub message: String,
    pub rule_id: Option<String>,
}

impl RawDiagnostic {
    /// A positionless diagnostic with a normalized severity.
    pub fn synthetic(severity: Severity, message: impl Into<String>, rule_id: Option<&str>) -> Self {
        Self {
            line: None,
            column: None,
            severity: NativeSeverity::Normalized(severity),
            message: message.into(),
            rule_id: rule_id.map(str::to_string),
        }
    }

    /// The single diagnostic reported for a file with no registered adapter.
    pub fn unsupported() -> Self {
        Self::synthetic(Severity::Info, UNSUPPORTED_FILE_TYPE, None)
    }

    /// The single diagnostic reported when an invocation fails.
    pub fn unavailable(error: &AnalyzerError) -> Self {
        Self::synthetic(
            Severity::Warning,
            format!("analysis unavailable: {}", error),
            Some(ANALYSIS_UNAVAILABLE),
        )
    }
}

/// A pluggable per-language diagnostic capability.
///
/// Implementations must be safe to call concurrently for different files.
/// Anything materialized on disk must be removed before `analyze` returns or
/// when its future is dropped.
#[async_trait]
pub trait AnalyzerAdapter: Send + Sync {
    /// Short identifier used in logs (e.g. "eslint", "heuristic").
    fn name(&self) -> &str;

    /// Per-invocation limit overriding the orchestrator's default.
    fn timeout(&self) -> Option<Duration> {
        None
    }

    /// Analyze one file's content.
    async fn analyze(&self, filename: &str, content: &[u8])
        -> Result<Vec<RawDiagnostic>, AnalyzerError>;
}
