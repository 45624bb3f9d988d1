//! Built-in line-based linter.
//!
//! Needs no external tooling, so every supported language gets some
//! diagnostics even on a bare machine. Holds only its configuration; one
//! shared instance serves every request.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::Arc;

use super::{AnalyzerAdapter, AnalyzerError, NativeSeverity, RawDiagnostic};
use crate::source::{extension_of, language_tag, LanguageFamily};
use crate::types::Severity;

/// Default maximum line length.
pub const DEFAULT_MAX_LINE_LENGTH: usize = 120;

/// Language tags the heuristic linter is registered for by default.
pub const HEURISTIC_LANGUAGES: &[&str] = &["javascript", "typescript", "python", "java", "c", "cpp"];

static SHARED: Lazy<Arc<HeuristicLinter>> =
    Lazy::new(|| Arc::new(HeuristicLinter::new(DEFAULT_MAX_LINE_LENGTH)));

lazy_static::lazy_static! {
    static ref CONTROL_HEAD_RE: Regex =
        Regex::new(r"^(?:\}\s*)?(?:if|for|while|switch|catch|else|function|async\s+function)\b").unwrap();
}

/// Line-based checks for unfinished work and common JavaScript slips.
#[derive(Debug, Clone)]
pub struct HeuristicLinter {
    max_line_length: usize,
}

impl HeuristicLinter {
    pub fn new(max_line_length: usize) -> Self {
        Self { max_line_length }
    }

    /// The process-wide instance with default settings.
    pub fn shared() -> Arc<HeuristicLinter> {
        Arc::clone(&SHARED)
    }

    pub fn max_line_length(&self) -> usize {
        self.max_line_length
    }

    /// Run every check over the content. Lines and columns are 1-based.
    pub fn check(&self, family: LanguageFamily, content: &str) -> Vec<RawDiagnostic> {
        let mut diagnostics = Vec::new();
        let js = family == LanguageFamily::JavaScript;

        for (index, line) in content.lines().enumerate() {
            let line_number = (index + 1) as u32;
            let trimmed = line.trim();

            if let Some(pos) = marker_position(line) {
                diagnostics.push(diagnostic(
                    line_number,
                    column(line, pos),
                    Severity::Info,
                    "Contains TODO/FIXME comment",
                    "todo-comment",
                ));
            }

            if js {
                if let Some(pos) = line.find("console.log") {
                    diagnostics.push(diagnostic(
                        line_number,
                        column(line, pos),
                        Severity::Warning,
                        "Unexpected console.log statement",
                        "no-console",
                    ));
                }

                if is_incomplete_import(trimmed) {
                    diagnostics.push(diagnostic(
                        line_number,
                        column(line, line.len() - line.trim_start().len()),
                        Severity::Warning,
                        "Possibly unused or incomplete import",
                        "incomplete-import",
                    ));
                }

                if trimmed.ends_with(')') && !CONTROL_HEAD_RE.is_match(trimmed) {
                    diagnostics.push(diagnostic(
                        line_number,
                        line.trim_end().chars().count() as u32,
                        Severity::Warning,
                        "Missing semicolon at end of statement",
                        "missing-semicolon",
                    ));
                }
            }

            if line.chars().count() > self.max_line_length {
                diagnostics.push(diagnostic(
                    line_number,
                    (self.max_line_length + 1) as u32,
                    Severity::Info,
                    &format!(
                        "Line exceeds {} characters (consider breaking it)",
                        self.max_line_length
                    ),
                    "max-len",
                ));
            }
        }

        diagnostics
    }
}

impl Default for HeuristicLinter {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINE_LENGTH)
    }
}

#[async_trait]
impl AnalyzerAdapter for HeuristicLinter {
    fn name(&self) -> &str {
        "heuristic"
    }

    async fn analyze(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<Vec<RawDiagnostic>, AnalyzerError> {
        let family = LanguageFamily::from_tag(&language_tag(&extension_of(filename)));
        let text = String::from_utf8_lossy(content);
        Ok(self.check(family, &text))
    }
}

fn diagnostic(line: u32, column: u32, severity: Severity, message: &str, rule: &str) -> RawDiagnostic {
    RawDiagnostic {
        line: Some(line),
        column: Some(column),
        severity: NativeSeverity::Normalized(severity),
        message: message.to_string(),
        rule_id: Some(rule.to_string()),
    }
}

/// Byte offset of the first `TODO` or `FIXME` anywhere in the line.
fn marker_position(line: &str) -> Option<usize> {
    match (line.find("TODO"), line.find("FIXME")) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// 1-based character column for a byte offset into the line.
fn column(line: &str, byte_offset: usize) -> u32 {
    (line[..byte_offset].chars().count() + 1) as u32
}

/// An `import` line that names bindings but never says where they come from.
fn is_incomplete_import(trimmed: &str) -> bool {
    let Some(rest) = trimmed.strip_prefix("import") else {
        return false;
    };
    if !rest.starts_with(char::is_whitespace) {
        // import(...) or an identifier like importFoo
        return false;
    }
    let rest = rest.trim_start();
    if rest.starts_with('"') || rest.starts_with('\'') || rest.starts_with('(') {
        return false;
    }
    // First line of a multi-line named import
    if rest.contains('{') && !rest.contains('}') {
        return false;
    }
    !trimmed.contains("from")
}
