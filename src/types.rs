//! Response schema types.
//!
//! Serialized field names follow the boundary contract (`graphData`,
//! `bugData`, `ruleId`), so these structs can be handed straight to a JSON
//! response writer.

use serde::{Deserialize, Serialize};

use crate::graph::GraphData;

/// Normalized severity levels for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("unknown severity: {}", s)),
        }
    }
}

/// A single reported issue in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostic {
    pub line: Option<u32>,
    pub column: Option<u32>,
    pub severity: Severity,
    pub message: String,
    pub rule_id: Option<String>,
}

/// Diagnostics for one accepted file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileReport {
    pub name: String,
    pub errors: Vec<Diagnostic>,
}

/// All per-file reports, in submission order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BugData {
    pub files: Vec<FileReport>,
}

/// The complete result for one batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub graph_data: GraphData,
    pub bug_data: BugData,
}

impl AnalysisResult {
    /// Total diagnostics across all files.
    pub fn diagnostic_count(&self) -> usize {
        self.bug_data.files.iter().map(|f| f.errors.len()).sum()
    }

    /// Number of diagnostics with the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.bug_data
            .files
            .iter()
            .flat_map(|f| f.errors.iter())
            .filter(|d| d.severity == severity)
            .count()
    }

    /// Check if any diagnostic has error severity.
    pub fn has_errors(&self) -> bool {
        self.count_severity(Severity::Error) > 0
    }
}
