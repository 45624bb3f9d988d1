//! Bounded, failure-isolated fan-out of analyzer invocations.

use futures::stream::{self, StreamExt};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use super::{AnalyzerError, AnalyzerRegistry, RawDiagnostic};
use crate::config::AnalysisConfig;
use crate::source::SourceFile;

/// Default number of analyzer invocations in flight.
pub const DEFAULT_CONCURRENCY: usize = 4;

/// Default per-invocation timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Raw diagnostics for one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileLint {
    pub name: String,
    pub diagnostics: Vec<RawDiagnostic>,
}

/// Runs the registered adapter for every file of a batch.
///
/// Every file gets exactly one [`FileLint`], whatever happens to its
/// analyzer: no adapter, timeout, crash and panic all become diagnostics.
#[derive(Debug, Clone)]
pub struct LintOrchestrator {
    registry: Arc<AnalyzerRegistry>,
    timeout: Duration,
    concurrency: usize,
}

impl LintOrchestrator {
    pub fn new(registry: Arc<AnalyzerRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_TIMEOUT,
            concurrency: DEFAULT_CONCURRENCY,
        }
    }

    pub fn from_config(registry: Arc<AnalyzerRegistry>, config: &AnalysisConfig) -> Self {
        Self::new(registry)
            .with_timeout(config.timeout())
            .with_concurrency(config.concurrency)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn registry(&self) -> &AnalyzerRegistry {
        &self.registry
    }

    /// Lint every file. Results are in the same order as `files`.
    pub async fn run(&self, files: &[SourceFile]) -> Vec<FileLint> {
        let mut results: Vec<(usize, FileLint)> = stream::iter(files.iter().enumerate())
            .map(|(index, file)| async move { (index, self.lint_file(file).await) })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, lint)| lint).collect()
    }

    /// Lint a single file; never fails.
    pub async fn lint_file(&self, file: &SourceFile) -> FileLint {
        let Some(adapter) = self.registry.get(&file.language) else {
            tracing::debug!(file = %file.id, language = %file.language, "no analyzer registered");
            return FileLint {
                name: file.id.clone(),
                diagnostics: vec![RawDiagnostic::unsupported()],
            };
        };

        let limit = adapter.timeout().unwrap_or(self.timeout);
        let started = Instant::now();
        let invocation = AssertUnwindSafe(adapter.analyze(&file.id, &file.content)).catch_unwind();

        let outcome = match tokio::time::timeout(limit, invocation).await {
            Err(_) => Err(AnalyzerError::Timeout(limit)),
            Ok(Err(panic)) => Err(AnalyzerError::Crash(panic_message(panic.as_ref()))),
            Ok(Ok(result)) => result,
        };

        let diagnostics = match outcome {
            Ok(diagnostics) => {
                tracing::debug!(
                    file = %file.id,
                    analyzer = %adapter.name(),
                    count = diagnostics.len(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "analysis finished"
                );
                diagnostics
            }
            Err(e) => {
                tracing::warn!(
                    file = %file.id,
                    analyzer = %adapter.name(),
                    kind = %e.kind(),
                    error = %e,
                    "analysis unavailable"
                );
                vec![RawDiagnostic::unavailable(&e)]
            }
        };

        FileLint {
            name: file.id.clone(),
            diagnostics,
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panicked: {}", s)
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panicked: {}", s)
    } else {
        "panicked".to_string()
    }
}
