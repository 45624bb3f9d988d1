//! Parsers for external analyzer output.
//!
//! Each parser keeps the analyzer's own severity vocabulary; normalization
//! happens later in the aggregator.

use regex::Regex;
use serde::Deserialize;

use super::{NativeSeverity, RawDiagnostic};
use crate::config::OutputFormat;

/// One file entry of ESLint's JSON formatter.
#[derive(Deserialize)]
struct EslintFileResult {
    #[serde(default)]
    messages: Vec<EslintMessage>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EslintMessage {
    #[serde(default)]
    rule_id: Option<String>,
    severity: u8,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
}

/// One message of pylint's JSON reporter.
#[derive(Deserialize)]
struct PylintMessage {
    #[serde(rename = "type")]
    kind: String,
    message: String,
    #[serde(default)]
    line: Option<u32>,
    #[serde(default)]
    column: Option<u32>,
    #[serde(default)]
    symbol: Option<String>,
    #[serde(default, rename = "message-id")]
    message_id: Option<String>,
}

/// Parse an analyzer's stdout/stderr according to its declared format.
///
/// Returns a description of the problem when the output cannot be read.
pub fn parse_output(
    format: OutputFormat,
    stdout: &str,
    stderr: &str,
) -> Result<Vec<RawDiagnostic>, String> {
    match format {
        OutputFormat::Eslint => parse_eslint(stdout),
        OutputFormat::Pylint => parse_pylint(stdout),
        OutputFormat::Compiler => Ok(parse_compiler(stderr, stdout)),
    }
}

fn parse_eslint(stdout: &str) -> Result<Vec<RawDiagnostic>, String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() {
        return Err("empty output from eslint formatter".to_string());
    }

    let results: Vec<EslintFileResult> =
        serde_json::from_str(trimmed).map_err(|e| format!("invalid eslint JSON: {}", e))?;

    Ok(results
        .into_iter()
        .flat_map(|r| r.messages)
        .map(|m| RawDiagnostic {
            line: m.line,
            column: m.column,
            severity: NativeSeverity::Level(m.severity),
            message: m.message,
            rule_id: m.rule_id,
        })
        .collect())
}

fn parse_pylint(stdout: &str) -> Result<Vec<RawDiagnostic>, String> {
    let trimmed = stdout.trim();
    // pylint prints nothing at all for a clean file on some versions
    if trimmed.is_empty() {
        return Ok(Vec::new());
    }

    let messages: Vec<PylintMessage> =
        serde_json::from_str(trimmed).map_err(|e| format!("invalid pylint JSON: {}", e))?;

    Ok(messages
        .into_iter()
        .map(|m| RawDiagnostic {
            line: m.line,
            column: m.column,
            severity: NativeSeverity::Label(m.kind),
            message: m.message,
            rule_id: m.symbol.or(m.message_id),
        })
        .collect())
}

fn parse_compiler(stderr: &str, stdout: &str) -> Vec<RawDiagnostic> {
    lazy_static::lazy_static! {
        // path:line[:col]: level: message [flag]
        static ref COMPILER_RE: Regex = Regex::new(
            r"^(?:[A-Za-z]:)?[^:]+:(\d+):(?:(\d+):)?\s*(fatal error|error|warning|note|remark):\s*(.*?)(?:\s+\[([^\]]+)\])?\s*$"
        ).unwrap();
    }

    stderr
        .lines()
        .chain(stdout.lines())
        .filter_map(|line| COMPILER_RE.captures(line))
        .map(|caps| RawDiagnostic {
            line: caps.get(1).and_then(|m| m.as_str().parse().ok()),
            column: caps.get(2).and_then(|m| m.as_str().parse().ok()),
            severity: NativeSeverity::Label(caps[3].to_string()),
            message: caps[4].to_string(),
            rule_id: caps.get(5).map(|m| m.as_str().to_string()),
        })
        .collect()
}
