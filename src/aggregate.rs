//! Merging graph and lint output into the response schema.

use std::collections::{HashMap, HashSet};

use crate::graph::{GraphData, GraphEdge, GraphNode};
use crate::lint::{FileLint, NativeSeverity, RawDiagnostic};
use crate::source::SourceFile;
use crate::types::{AnalysisResult, BugData, Diagnostic, FileReport, Severity};

/// Builds the final [`AnalysisResult`] for a batch.
pub struct ResultAggregator;

impl ResultAggregator {
    /// Map an analyzer's native severity onto the fixed levels.
    pub fn normalize_severity(native: &NativeSeverity) -> Severity {
        match native {
            NativeSeverity::Normalized(severity) => *severity,
            NativeSeverity::Level(2) => Severity::Error,
            NativeSeverity::Level(1) => Severity::Warning,
            NativeSeverity::Level(_) => Severity::Info,
            NativeSeverity::Label(label) => match label.trim().to_lowercase().as_str() {
                "error" | "fatal" | "fatal error" | "critical" | "e" | "f" => Severity::Error,
                "warning" | "warn" | "w" => Severity::Warning,
                "info" | "information" | "note" | "hint" | "convention" | "refactor" | "c"
                | "r" | "i" => Severity::Info,
                _ => Severity::Warning,
            },
        }
    }

    /// Combine the graph with per-file lint results.
    ///
    /// `files` are the accepted files in submission order; `lints` is
    /// expected in the same order. Every file gets a report.
    pub fn aggregate(files: &[SourceFile], graph: GraphData, lints: Vec<FileLint>) -> AnalysisResult {
        let mut lints = lints.into_iter().peekable();
        let mut reports = Vec::with_capacity(files.len());

        for file in files {
            let diagnostics = match lints.next_if(|lint| lint.name == file.id) {
                Some(lint) => lint.diagnostics,
                None => {
                    tracing::warn!(file = %file.id, "no lint result for file");
                    Vec::new()
                }
            };

            reports.push(FileReport {
                name: file.id.clone(),
                errors: diagnostics.into_iter().map(Self::normalize).collect(),
            });
        }

        AnalysisResult {
            graph_data: dedupe_graph(graph),
            bug_data: BugData { files: reports },
        }
    }

    fn normalize(raw: RawDiagnostic) -> Diagnostic {
        Diagnostic {
            line: raw.line,
            column: raw.column,
            severity: Self::normalize_severity(&raw.severity),
            message: raw.message,
            rule_id: raw.rule_id,
        }
    }
}

/// Collapse duplicate node ids and drop links that are repeated or dangle.
fn dedupe_graph(graph: GraphData) -> GraphData {
    let mut nodes: Vec<GraphNode> = Vec::with_capacity(graph.nodes.len());
    let mut positions: HashMap<String, usize> = HashMap::new();

    for node in graph.nodes {
        match positions.get(&node.id) {
            Some(&pos) => {
                if nodes[pos].functions.is_empty() {
                    nodes[pos].functions = node.functions;
                }
            }
            None => {
                positions.insert(node.id.clone(), nodes.len());
                nodes.push(node);
            }
        }
    }

    let mut seen: HashSet<(String, String)> = HashSet::new();
    let links: Vec<GraphEdge> = graph
        .links
        .into_iter()
        .filter(|e| positions.contains_key(&e.source) && positions.contains_key(&e.target))
        .filter(|e| seen.insert((e.source.clone(), e.target.clone())))
        .collect();

    GraphData { nodes, links }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(s: &str) -> Severity {
        ResultAggregator::normalize_severity(&NativeSeverity::Label(s.to_string()))
    }

    #[test]
    fn test_normalize_levels() {
        let level = |n| ResultAggregator::normalize_severity(&NativeSeverity::Level(n));
        assert_eq!(level(2), Severity::Error);
        assert_eq!(level(1), Severity::Warning);
        assert_eq!(level(0), Severity::Info);
        assert_eq!(level(7), Severity::Info);
    }

    #[test]
    fn test_normalize_labels() {
        assert_eq!(label("Fatal Error"), Severity::Error);
        assert_eq!(label("E"), Severity::Error);
        assert_eq!(label("warning"), Severity::Warning);
        assert_eq!(label("convention"), Severity::Info);
        assert_eq!(label("note"), Severity::Info);
        assert_eq!(label("something-new"), Severity::Warning);
    }

    #[test]
    fn test_report_per_file_in_order() {
        let files = vec![SourceFile::new("b.js", ""), SourceFile::new("a.py", "")];
        let lints = vec![
            FileLint {
                name: "b.js".to_string(),
                diagnostics: vec![RawDiagnostic {
                    line: Some(3),
                    column: Some(1),
                    severity: NativeSeverity::Level(2),
                    message: "boom".to_string(),
                    rule_id: Some("no-undef".to_string()),
                }],
            },
            FileLint {
                name: "a.py".to_string(),
                diagnostics: Vec::new(),
            },
        ];

        let result = ResultAggregator::aggregate(&files, GraphData::default(), lints);
        let names: Vec<&str> = result.bug_data.files.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["b.js", "a.py"]);
        assert_eq!(result.bug_data.files[0].errors[0].severity, Severity::Error);
        assert!(result.bug_data.files[1].errors.is_empty());
    }

    #[test]
    fn test_missing_lint_still_reported() {
        let files = vec![SourceFile::new("a.js", ""), SourceFile::new("b.js", "")];
        let lints = vec![FileLint {
            name: "b.js".to_string(),
            diagnostics: vec![RawDiagnostic::unsupported()],
        }];

        let result = ResultAggregator::aggregate(&files, GraphData::default(), lints);
        assert_eq!(result.bug_data.files.len(), 2);
        assert!(result.bug_data.files[0].errors.is_empty());
        assert_eq!(result.bug_data.files[1].errors.len(), 1);
    }

    #[test]
    fn test_duplicate_nodes_collapse() {
        let mut file_node = GraphNode::new("util.js");
        file_node.functions = vec!["helper".to_string()];
        let graph = GraphData {
            nodes: vec![GraphNode::new("a.js"), GraphNode::new("util.js"), file_node],
            links: vec![
                GraphEdge {
                    source: "a.js".to_string(),
                    target: "util.js".to_string(),
                },
                GraphEdge {
                    source: "a.js".to_string(),
                    target: "util.js".to_string(),
                },
                GraphEdge {
                    source: "a.js".to_string(),
                    target: "ghost.js".to_string(),
                },
            ],
        };

        let merged = dedupe_graph(graph);
        assert_eq!(merged.nodes.len(), 2);
        assert_eq!(merged.nodes[1].functions, vec!["helper"]);
        assert_eq!(merged.links.len(), 1);
    }
}
