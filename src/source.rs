//! Source files and language tagging.
//!
//! A [`SourceFile`] is the unit the pipeline works on: the submitted relative
//! path (its identity), the extension it was classified by, a language tag
//! used to pick an analyzer adapter, and the raw content.

use phf::phf_map;
use std::borrow::Cow;
use std::path::Path;

/// Extension (without dot, lowercase) to language tag.
static LANGUAGE_TAGS: phf::Map<&'static str, &'static str> = phf_map! {
    "js" => "javascript",
    "jsx" => "javascript",
    "mjs" => "javascript",
    "cjs" => "javascript",
    "ts" => "typescript",
    "tsx" => "typescript",
    "mts" => "typescript",
    "cts" => "typescript",
    "py" => "python",
    "java" => "java",
    "c" => "c",
    "h" => "c",
    "cpp" => "cpp",
    "cc" => "cpp",
    "cxx" => "cpp",
    "hpp" => "cpp",
    "hh" => "cpp",
    "go" => "go",
    "rs" => "rust",
    "rb" => "ruby",
    "php" => "php",
    "kt" => "kotlin",
    "swift" => "swift",
    "scala" => "scala",
};

/// Groups of languages that share extraction heuristics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguageFamily {
    /// JavaScript and TypeScript.
    JavaScript,
    Python,
    Java,
    /// C and C++.
    C,
    Other,
}

impl LanguageFamily {
    /// Determine the family for a language tag.
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "javascript" | "typescript" => LanguageFamily::JavaScript,
            "python" => LanguageFamily::Python,
            "java" => LanguageFamily::Java,
            "c" | "cpp" => LanguageFamily::C,
            _ => LanguageFamily::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LanguageFamily::JavaScript => "javascript",
            LanguageFamily::Python => "python",
            LanguageFamily::Java => "java",
            LanguageFamily::C => "c",
            LanguageFamily::Other => "other",
        }
    }

    /// Extensions tried, in order, when resolving an extensionless import.
    pub fn resolution_extensions(&self) -> &'static [&'static str] {
        match self {
            LanguageFamily::JavaScript => &[".js", ".jsx", ".ts", ".tsx", ".mjs", ".cjs"],
            LanguageFamily::Python => &[".py"],
            LanguageFamily::Java => &[".java"],
            LanguageFamily::C => &[".h", ".hpp", ".c", ".cpp"],
            LanguageFamily::Other => &[],
        }
    }
}

impl std::fmt::Display for LanguageFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map an extension (with or without the leading dot) to a language tag.
///
/// Unknown extensions fall back to the bare extension, so a custom allowed
/// extension still gets a stable tag even without a registered analyzer.
pub fn language_tag(extension: &str) -> String {
    let bare = extension.trim_start_matches('.').to_ascii_lowercase();
    match LANGUAGE_TAGS.get(bare.as_str()) {
        Some(tag) => (*tag).to_string(),
        None if bare.is_empty() => "unknown".to_string(),
        None => bare,
    }
}

/// Lowercased extension of a path-like name, including the dot.
/// Returns an empty string when the name has no extension.
pub fn extension_of(name: &str) -> String {
    Path::new(basename(name))
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e.to_ascii_lowercase()))
        .unwrap_or_default()
}

/// Final component of a `/` or `\` separated path.
pub fn basename(name: &str) -> &str {
    name.rsplit(['/', '\\']).next().unwrap_or(name)
}

/// A file submitted for analysis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    /// Submitted relative path; unique within a batch.
    pub id: String,
    /// Lowercased extension including the dot (e.g. ".ts").
    pub extension: String,
    /// Language tag (e.g. "typescript").
    pub language: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    /// Create a source file, deriving extension and language from the id.
    pub fn new(id: impl Into<String>, content: impl Into<Vec<u8>>) -> Self {
        let id = id.into();
        let extension = extension_of(&id);
        let language = language_tag(&extension);
        Self {
            id,
            extension,
            language,
            content: content.into(),
        }
    }

    /// The final path component of the id.
    pub fn basename(&self) -> &str {
        basename(&self.id)
    }

    /// Language family for extraction heuristics.
    pub fn family(&self) -> LanguageFamily {
        LanguageFamily::from_tag(&self.language)
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.content)
    }
}
