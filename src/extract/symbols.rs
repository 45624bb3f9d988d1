//! Declared function names, attached to file nodes in the graph.
//!
//! Line-oriented patterns per language family. Misses nested or multi-line
//! declarations; good enough to label a node.

use regex::Regex;

use crate::source::LanguageFamily;

lazy_static::lazy_static! {
    static ref JS_FUNCTION_RE: Regex =
        Regex::new(r"\bfunction\s*\*?\s*([A-Za-z_$][\w$]*)\s*\(").unwrap();
    static ref JS_ARROW_RE: Regex =
        Regex::new(r"\b(?:const|let|var)\s+([A-Za-z_$][\w$]*)\s*=\s*(?:async\s+)?(?:\([^)]*\)|[A-Za-z_$][\w$]*)\s*=>").unwrap();
    static ref PY_DEF_RE: Regex =
        Regex::new(r"^\s*(?:async\s+)?def\s+([A-Za-z_]\w*)\s*\(").unwrap();
    static ref JAVA_METHOD_RE: Regex =
        Regex::new(r"^\s*(?:(?:public|private|protected|static|final|abstract|synchronized)\s+)*[\w<>\[\],.?]+\s+([A-Za-z_]\w*)\s*\(").unwrap();
    static ref C_FUNCTION_RE: Regex =
        Regex::new(r"^\s*(?:[\w:*&<>]+\s+)+\**([A-Za-z_][\w:~]*)\s*\([^;]*\)\s*(?:const\s*)?\{").unwrap();
}

/// Words that look like a return type or name but start a statement.
const CONTROL_KEYWORDS: &[&str] = &[
    "if", "for", "while", "switch", "catch", "return", "new", "else", "do", "throw", "sizeof",
];

/// Extract declared function names in textual order, without duplicates.
pub fn extract_functions(family: LanguageFamily, content: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    let mut push = |name: &str| {
        if !CONTROL_KEYWORDS.contains(&name) && !names.iter().any(|n| n == name) {
            names.push(name.to_string());
        }
    };

    for line in content.lines() {
        let trimmed = line.trim_start();
        // '#' opens a comment everywhere but C, where it is a preprocessor line
        if trimmed.starts_with("//") || (trimmed.starts_with('#') && family != LanguageFamily::C) {
            continue;
        }

        match family {
            LanguageFamily::JavaScript => {
                for caps in JS_FUNCTION_RE.captures_iter(line) {
                    push(&caps[1]);
                }
                for caps in JS_ARROW_RE.captures_iter(line) {
                    push(&caps[1]);
                }
            }
            LanguageFamily::Python => {
                if let Some(caps) = PY_DEF_RE.captures(line) {
                    push(&caps[1]);
                }
            }
            LanguageFamily::Java => {
                if let Some(caps) = JAVA_METHOD_RE.captures(line) {
                    if !is_statement(trimmed) {
                        push(&caps[1]);
                    }
                }
            }
            LanguageFamily::C => {
                if let Some(caps) = C_FUNCTION_RE.captures(line) {
                    if !is_statement(trimmed) {
                        push(&caps[1]);
                    }
                }
            }
            LanguageFamily::Other => {}
        }
    }

    names
}

/// Lines starting with a control keyword are calls or statements, not declarations.
fn is_statement(trimmed: &str) -> bool {
    let first = trimmed
        .split(|c: char| !c.is_alphanumeric() && c != '_')
        .next()
        .unwrap_or("");
    CONTROL_KEYWORDS.contains(&first)
}
