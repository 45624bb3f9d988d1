//! Language tag to analyzer adapter mapping.

use std::collections::HashMap;
use std::sync::Arc;

use super::heuristic::{DEFAULT_MAX_LINE_LENGTH, HEURISTIC_LANGUAGES};
use super::{AnalyzerAdapter, ExternalCommandAdapter, HeuristicLinter};
use crate::config::AnalysisConfig;

/// Maps language tags to the adapter that analyzes them.
///
/// Built once per configuration and shared read-only across requests. A tag
/// with no entry means the language is unsupported.
#[derive(Default, Clone)]
pub struct AnalyzerRegistry {
    adapters: HashMap<String, Arc<dyn AnalyzerAdapter>>,
}

impl AnalyzerRegistry {
    /// An empty registry; every file is reported as unsupported.
    pub fn new() -> Self {
        Self::default()
    }

    /// The heuristic linter for every language it understands.
    pub fn with_builtin() -> Self {
        Self::with_heuristic(HeuristicLinter::shared())
    }

    fn with_heuristic(linter: Arc<HeuristicLinter>) -> Self {
        let mut registry = Self::new();
        for tag in HEURISTIC_LANGUAGES {
            registry.register(*tag, linter.clone());
        }
        registry
    }

    /// Built-in adapters, overridden per language by configured commands.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        let linter = if config.max_line_length == DEFAULT_MAX_LINE_LENGTH {
            HeuristicLinter::shared()
        } else {
            Arc::new(HeuristicLinter::new(config.max_line_length))
        };

        let mut registry = Self::with_heuristic(linter);
        let temp_dir = config.temp_dir();
        for (tag, command) in &config.analyzers {
            tracing::debug!(
                language = %tag,
                command = %command.command,
                format = %command.format,
                "registering external analyzer"
            );
            registry.register(
                tag.clone(),
                Arc::new(ExternalCommandAdapter::from_config(command, temp_dir.clone())),
            );
        }
        registry
    }

    /// Register an adapter, replacing any previous one for the tag.
    pub fn register(&mut self, language: impl Into<String>, adapter: Arc<dyn AnalyzerAdapter>) {
        self.adapters.insert(language.into(), adapter);
    }

    pub fn get(&self, language: &str) -> Option<Arc<dyn AnalyzerAdapter>> {
        self.adapters.get(language).cloned()
    }

    pub fn supports(&self, language: &str) -> bool {
        self.adapters.contains_key(language)
    }

    /// Registered language tags, sorted.
    pub fn languages(&self) -> Vec<&str> {
        let mut tags: Vec<&str> = self.adapters.keys().map(String::as_str).collect();
        tags.sort_unstable();
        tags
    }
}

impl std::fmt::Debug for AnalyzerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_map()
            .entries(self.adapters.iter().map(|(tag, a)| (tag, a.name())))
            .finish()
    }
}
