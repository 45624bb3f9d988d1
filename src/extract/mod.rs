//! Heuristic extraction of dependency specifiers and declared symbols.
//!
//! Extraction is text scanning, not parsing. Each language family gets a
//! [`DependencyExtractor`] so a real parser can replace the heuristics later
//! without touching graph resolution or orchestration.
//!
//! Only the JavaScript/TypeScript family contributes dependency edges. Other
//! families still become graph nodes and may report declared functions.

mod javascript;
mod symbols;

pub use javascript::JsImportExtractor;
pub use symbols::extract_functions;

use crate::source::LanguageFamily;

/// Produces raw dependency specifiers from file content.
///
/// Implementations never fail: content that matches nothing yields an empty
/// list. Specifiers are returned in textual order with duplicates preserved.
pub trait DependencyExtractor: Send + Sync {
    /// The family this extractor handles.
    fn family(&self) -> LanguageFamily;

    /// Extract specifiers in order of first-to-last textual occurrence.
    fn extract(&self, content: &str) -> Vec<String>;
}

static JS_EXTRACTOR: JsImportExtractor = JsImportExtractor;

/// Get the dependency extractor for a language family, if it has one.
pub fn extractor_for(family: LanguageFamily) -> Option<&'static dyn DependencyExtractor> {
    match family {
        LanguageFamily::JavaScript => Some(&JS_EXTRACTOR),
        _ => None,
    }
}

/// Extract specifiers for a family, returning nothing for families without edges.
pub fn extract_specifiers(family: LanguageFamily, content: &str) -> Vec<String> {
    extractor_for(family)
        .map(|extractor| extractor.extract(content))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_javascript_family_has_extractor() {
        assert!(extractor_for(LanguageFamily::JavaScript).is_some());
        assert!(extractor_for(LanguageFamily::Python).is_none());
        assert!(extractor_for(LanguageFamily::C).is_none());
    }

    #[test]
    fn test_non_js_family_yields_nothing() {
        let specs = extract_specifiers(LanguageFamily::Python, "import os\nfrom . import util\n");
        assert!(specs.is_empty());
    }
}
