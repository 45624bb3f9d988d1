//! Eligibility filter for uploaded files.
//!
//! A file is analyzed only when its extension is on the allow-list and its
//! basename is not on the block-list, both compared without regard to case.
//! Classification never fails: block-list entries that are not valid globs
//! are compared literally.

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use std::collections::HashSet;

use crate::config::AnalysisConfig;
use crate::source::{basename, SourceFile};

/// Outcome of classifying a single file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    Accepted,
    ExtensionNotAllowed,
    BlockedBasename,
}

impl Classification {
    pub fn is_accepted(&self) -> bool {
        matches!(self, Classification::Accepted)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::Accepted => "accepted",
            Classification::ExtensionNotAllowed => "extension not allowed",
            Classification::BlockedBasename => "blocked basename",
        }
    }
}

/// Decides which files in a batch are eligible for analysis.
#[derive(Debug, Clone)]
pub struct FileClassifier {
    allowed_extensions: HashSet<String>,
    blocked_globs: GlobSet,
    blocked_exact: HashSet<String>,
}

impl FileClassifier {
    /// Build a classifier from an extension allow-list and a basename block-list.
    pub fn new<A, B>(allowed_extensions: A, blocked_basenames: B) -> Self
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        B: IntoIterator,
        B::Item: AsRef<str>,
    {
        let allowed_extensions = allowed_extensions
            .into_iter()
            .map(|e| e.as_ref().to_ascii_lowercase())
            .collect();

        let mut builder = GlobSetBuilder::new();
        let mut blocked_exact = HashSet::new();
        for pattern in blocked_basenames {
            let pattern = pattern.as_ref();
            // Exact names are kept as well so an invalid glob still blocks literally
            blocked_exact.insert(pattern.to_lowercase());
            if let Ok(glob) = GlobBuilder::new(pattern).case_insensitive(true).build() {
                builder.add(glob);
            }
        }
        let blocked_globs = builder.build().unwrap_or_else(|_| GlobSet::empty());

        Self {
            allowed_extensions,
            blocked_globs,
            blocked_exact,
        }
    }

    /// Build a classifier from the configuration's allow/block lists.
    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(&config.allowed_extensions, &config.blocked_basenames)
    }

    /// Classify a file by its name and extension.
    pub fn classify(&self, name: &str, extension: &str) -> Classification {
        if !self
            .allowed_extensions
            .contains(&extension.to_ascii_lowercase())
        {
            return Classification::ExtensionNotAllowed;
        }

        let base = basename(name);
        if self.blocked_exact.contains(&base.to_lowercase()) || self.blocked_globs.is_match(base)
        {
            return Classification::BlockedBasename;
        }

        Classification::Accepted
    }

    /// Whether a file is eligible for analysis.
    pub fn is_eligible(&self, name: &str, extension: &str) -> bool {
        self.classify(name, extension).is_accepted()
    }

    /// Keep the eligible files, preserving submission order.
    pub fn filter(&self, files: Vec<SourceFile>) -> Vec<SourceFile> {
        files
            .into_iter()
            .filter(|file| {
                let decision = self.classify(&file.id, &file.extension);
                tracing::debug!(file = %file.id, decision = decision.as_str(), "classified");
                decision.is_accepted()
            })
            .collect()
    }
}

impl Default for FileClassifier {
    fn default() -> Self {
        Self::from_config(&AnalysisConfig::default())
    }
}
