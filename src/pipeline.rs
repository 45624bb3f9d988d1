//! Per-request analysis pipeline.
//!
//! ```text
//! batch ─▶ FileClassifier ─┬─▶ GraphResolver (blocking pool) ──┬─▶ ResultAggregator
//!                          └─▶ LintOrchestrator (async pool) ──┘
//! ```
//!
//! The pipeline holds only immutable configuration, so one instance can
//! serve any number of concurrent requests.

use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

use crate::aggregate::ResultAggregator;
use crate::classify::FileClassifier;
use crate::config::AnalysisConfig;
use crate::graph::GraphResolver;
use crate::lint::{AnalyzerRegistry, LintOrchestrator};
use crate::source::SourceFile;
use crate::types::AnalysisResult;

/// One file as handed over by the upload layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    pub relative_path: String,
    pub content: Vec<u8>,
}

impl UploadedFile {
    pub fn new(relative_path: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        Self {
            relative_path: relative_path.into(),
            content: content.into(),
        }
    }
}

/// Failures that abort a whole request.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no eligible files to analyze ({submitted} submitted)")]
    NoEligibleFiles { submitted: usize },
    #[error("internal error: {0}")]
    Internal(String),
}

impl PipelineError {
    /// Whether the caller sent something unusable (as opposed to a server fault).
    pub fn is_client_error(&self) -> bool {
        matches!(self, PipelineError::NoEligibleFiles { .. })
    }
}

/// Classify, graph, lint and aggregate one batch.
#[derive(Debug, Clone)]
pub struct Pipeline {
    classifier: FileClassifier,
    resolver: GraphResolver,
    orchestrator: LintOrchestrator,
}

impl Pipeline {
    pub fn new(config: &AnalysisConfig) -> Self {
        Self::with_registry(config, Arc::new(AnalyzerRegistry::from_config(config)))
    }

    /// Use a caller-built registry instead of the configured adapters.
    pub fn with_registry(config: &AnalysisConfig, registry: Arc<AnalyzerRegistry>) -> Self {
        Self {
            classifier: FileClassifier::from_config(config),
            resolver: GraphResolver::from_config(&config.graph),
            orchestrator: LintOrchestrator::from_config(registry, config),
        }
    }

    pub async fn analyze(&self, batch: Vec<UploadedFile>) -> Result<AnalysisResult, PipelineError> {
        let request = Uuid::new_v4();
        let submitted = batch.len();

        let files: Vec<SourceFile> = batch
            .into_iter()
            .map(|upload| SourceFile::new(upload.relative_path, upload.content))
            .collect();
        let files = self.classifier.filter(files);

        tracing::info!(
            request = %request,
            submitted,
            accepted = files.len(),
            "starting analysis"
        );

        if files.is_empty() {
            return Err(PipelineError::NoEligibleFiles { submitted });
        }

        let files = Arc::new(files);
        let graph_files = Arc::clone(&files);
        let resolver = self.resolver.clone();
        let graph_task = tokio::task::spawn_blocking(move || resolver.build(&graph_files));

        let (graph, lints) = tokio::join!(graph_task, self.orchestrator.run(&files));
        let graph = graph.map_err(|e| PipelineError::Internal(format!("graph build failed: {}", e)))?;

        let result = ResultAggregator::aggregate(&files, graph, lints);
        tracing::info!(
            request = %request,
            nodes = result.graph_data.nodes.len(),
            links = result.graph_data.links.len(),
            diagnostics = result.diagnostic_count(),
            "analysis complete"
        );
        Ok(result)
    }
}
