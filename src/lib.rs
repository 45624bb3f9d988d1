//! Graphlint - multi-language dependency graph and diagnostics.
//!
//! Graphlint takes a batch of source files and returns two views of it: a
//! file-level dependency graph built from import statements, and per-file
//! diagnostics from pluggable, per-language analyzers.
//!
//! # Architecture
//!
//! - `classify`: extension allow-list and basename block-list
//! - `extract`: import specifier and function symbol extraction
//! - `graph`: specifier resolution into nodes and links
//! - `lint`: analyzer adapters, registry and the bounded orchestrator
//! - `aggregate`: severity normalization and the response schema
//! - `pipeline`: the per-request flow tying them together
//! - `config`: YAML configuration schema
//! - `report`: output formatting (JSON, pretty)
//!
//! # Example
//!
//! ```no_run
//! use graphlint::{AnalysisConfig, Pipeline, UploadedFile};
//!
//! # async fn run() -> Result<(), graphlint::PipelineError> {
//! let pipeline = Pipeline::new(&AnalysisConfig::default());
//! let result = pipeline
//!     .analyze(vec![
//!         UploadedFile::new("a.js", "import x from './b';"),
//!         UploadedFile::new("b.js", "export const x = 1;"),
//!     ])
//!     .await?;
//! assert_eq!(result.graph_data.links.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod aggregate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod extract;
pub mod graph;
pub mod lint;
pub mod pipeline;
pub mod report;
pub mod source;
pub mod types;

pub use aggregate::ResultAggregator;
pub use classify::{Classification, FileClassifier};
pub use config::{AnalysisConfig, AnalyzerCommandConfig, OutputFormat};
pub use extract::{DependencyExtractor, JsImportExtractor};
pub use graph::{GraphData, GraphEdge, GraphNode, GraphResolver};
pub use lint::{
    AnalyzerAdapter, AnalyzerError, AnalyzerRegistry, ExternalCommandAdapter, HeuristicLinter,
    LintOrchestrator,
};
pub use pipeline::{Pipeline, PipelineError, UploadedFile};
pub use source::{LanguageFamily, SourceFile};
pub use types::{AnalysisResult, BugData, Diagnostic, FileReport, Severity};
