//! Adapter that runs an external analyzer as a child process.

use async_trait::async_trait;
use std::io::Write;
use std::path::PathBuf;
use std::process::Stdio;
use std::time::Duration;
use tokio::process::Command;
use uuid::Uuid;

use super::{parse_output, AnalyzerAdapter, AnalyzerError, RawDiagnostic};
use crate::config::{AnalyzerCommandConfig, OutputFormat, FILE_PLACEHOLDER};
use crate::source::extension_of;

/// Stderr is cut to this many characters in error details.
const STDERR_EXCERPT: usize = 200;

/// Materializes a file in a private temp location and runs a command on it.
///
/// The temp file is removed when the invocation finishes or its future is
/// dropped; the child is killed on drop.
#[derive(Debug, Clone)]
pub struct ExternalCommandAdapter {
    name: String,
    program: String,
    args: Vec<String>,
    format: OutputFormat,
    temp_dir: PathBuf,
    timeout: Option<Duration>,
}

impl ExternalCommandAdapter {
    pub fn new(
        program: impl Into<String>,
        args: Vec<String>,
        format: OutputFormat,
        temp_dir: PathBuf,
    ) -> Self {
        let program = program.into();
        Self {
            name: program.clone(),
            program,
            args,
            format,
            temp_dir,
            timeout: None,
        }
    }

    pub fn from_config(config: &AnalyzerCommandConfig, temp_dir: PathBuf) -> Self {
        let mut adapter = Self::new(
            config.command.clone(),
            config.args.clone(),
            config.format,
            temp_dir,
        );
        adapter.timeout = config.timeout_ms.map(Duration::from_millis);
        adapter
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn expand_args(&self, path: &str) -> Vec<String> {
        self.args
            .iter()
            .map(|arg| arg.replace(FILE_PLACEHOLDER, path))
            .collect()
    }
}

#[async_trait]
impl AnalyzerAdapter for ExternalCommandAdapter {
    fn name(&self) -> &str {
        &self.name
    }

    fn timeout(&self) -> Option<Duration> {
        self.timeout
    }

    async fn analyze(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<Vec<RawDiagnostic>, AnalyzerError> {
        // Keep the file's extension; most analyzers pick a parser from it
        let prefix = format!("graphlint-{}-", Uuid::new_v4().simple());
        let suffix = extension_of(filename);
        let mut temp = tempfile::Builder::new()
            .prefix(&prefix)
            .suffix(&suffix)
            .tempfile_in(&self.temp_dir)
            .map_err(|e| AnalyzerError::Crash(format!("could not create temp file: {}", e)))?;

        // Written through the owned handle: a write by path that outlives this
        // future would recreate the file after the guard removed it
        temp.as_file_mut()
            .write_all(content)
            .and_then(|_| temp.as_file_mut().flush())
            .map_err(|e| AnalyzerError::Crash(format!("could not write temp file: {}", e)))?;

        let path = temp.path().to_string_lossy().into_owned();
        let args = self.expand_args(&path);

        tracing::debug!(
            analyzer = %self.name,
            file = %filename,
            args = ?args,
            "running external analyzer"
        );

        let output = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| AnalyzerError::Crash(format!("failed to run {}: {}", self.program, e)))?;

        // Explicit so removal errors are visible in the logs
        if let Err(e) = temp.close() {
            tracing::warn!(analyzer = %self.name, error = %e, "failed to remove temp file");
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        let success = output.status.success();

        match parse_output(self.format, &stdout, &stderr) {
            Ok(diagnostics) if !success && diagnostics.is_empty() && self.format == OutputFormat::Compiler => {
                Err(AnalyzerError::Crash(exit_detail(&self.program, &output.status, &stderr)))
            }
            Ok(diagnostics) => Ok(diagnostics),
            Err(_) if !success => {
                Err(AnalyzerError::Crash(exit_detail(&self.program, &output.status, &stderr)))
            }
            Err(reason) => Err(AnalyzerError::ParseFailure(reason)),
        }
    }
}

fn exit_detail(program: &str, status: &std::process::ExitStatus, stderr: &str) -> String {
    let excerpt: String = stderr.trim().chars().take(STDERR_EXCERPT).collect();
    if excerpt.is_empty() {
        format!("{} exited with {}", program, status)
    } else {
        format!("{} exited with {}: {}", program, status, excerpt)
    }
}
