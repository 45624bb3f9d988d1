//! Import extraction for JavaScript and TypeScript.
//!
//! Recognizes `import ... from "x"`, side-effect `import "x"`, and
//! `require("x")`. Multi-line named imports are matched because the scan runs
//! over the whole file rather than line by line.

use regex::Regex;

use super::DependencyExtractor;
use crate::source::LanguageFamily;

/// Regex-based import scanner for the JavaScript family.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsImportExtractor;

impl DependencyExtractor for JsImportExtractor {
    fn family(&self) -> LanguageFamily {
        LanguageFamily::JavaScript
    }

    fn extract(&self, content: &str) -> Vec<String> {
        lazy_static::lazy_static! {
            // import x from 'spec' | import { a, b } from "spec" | import 'spec' | require('spec')
            static ref SPECIFIER_RE: Regex = Regex::new(
                r#"(?:\bimport\s+(?:[\w*{}\s,$]+?\s+from\s*)?["']([^"'\n]+)["']|\brequire\s*\(\s*["']([^"'\n]+)["']\s*\))"#
            ).unwrap();
        }

        let code = strip_line_comments(content);

        SPECIFIER_RE
            .captures_iter(&code)
            .filter_map(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map(|m| m.as_str().trim().to_string())
            .filter(|spec| !spec.is_empty())
            .collect()
    }
}

/// Blank out lines that are entirely `//` comments, keeping line structure.
fn strip_line_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            if line.trim_start().starts_with("//") {
                ""
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
