//! File-level dependency graph.
//!
//! Every eligible file becomes a node. Import specifiers from the
//! JavaScript/TypeScript family become edges: local specifiers are matched
//! against files in the batch, and anything local that cannot be matched
//! points at a phantom node named after the raw specifier. Targets are always
//! inserted into the node set before the edge is recorded, so edges never
//! dangle.

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::GraphConfig;
use crate::extract::{extract_functions, extract_specifiers};
use crate::source::SourceFile;

/// A node in the dependency graph: a file, or a phantom import target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    /// Functions declared in the file (never set on phantom nodes).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
}

impl GraphNode {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            functions: Vec::new(),
        }
    }
}

/// A dependency from a file to another node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphEdge {
    pub source: String,
    pub target: String,
}

/// Nodes and links, in the shape graph renderers expect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphData {
    pub nodes: Vec<GraphNode>,
    pub links: Vec<GraphEdge>,
}

impl GraphData {
    /// Whether a node with this id exists.
    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n.id == id)
    }

    /// Nodes whose ids are not among the given file ids.
    pub fn phantom_count<'a, I>(&self, file_ids: I) -> usize
    where
        I: IntoIterator<Item = &'a str>,
    {
        let files: HashSet<&str> = file_ids.into_iter().collect();
        self.nodes
            .iter()
            .filter(|n| !files.contains(n.id.as_str()))
            .count()
    }
}

/// Insertion-ordered node set with unique ids.
#[derive(Default)]
struct NodeSet {
    nodes: Vec<GraphNode>,
    positions: HashMap<String, usize>,
}

impl NodeSet {
    /// Insert a node id if absent. Returns its position either way.
    fn insert(&mut self, id: &str) -> usize {
        if let Some(&pos) = self.positions.get(id) {
            return pos;
        }
        let pos = self.nodes.len();
        self.nodes.push(GraphNode::new(id));
        self.positions.insert(id.to_string(), pos);
        pos
    }
}

/// Lookup tables over the batch's file ids.
struct FileIndex<'a> {
    by_id: HashSet<&'a str>,
    /// Basename to the first submitted file with that basename.
    by_basename: HashMap<&'a str, &'a str>,
}

impl<'a> FileIndex<'a> {
    fn new(files: &'a [SourceFile]) -> Self {
        let mut by_id = HashSet::new();
        let mut by_basename = HashMap::new();
        for file in files {
            by_id.insert(file.id.as_str());
            by_basename.entry(file.basename()).or_insert(file.id.as_str());
        }
        Self { by_id, by_basename }
    }
}

/// Where a specifier points after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Target {
    File(String),
    Phantom(String),
    Dropped,
}

/// Builds the dependency graph for a batch of eligible files.
#[derive(Debug, Clone, Default)]
pub struct GraphResolver {
    phantom_bare_specifiers: bool,
}

impl GraphResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &GraphConfig) -> Self {
        Self {
            phantom_bare_specifiers: config.phantom_bare_specifiers,
        }
    }

    /// Treat bare package specifiers as phantom nodes instead of dropping them.
    pub fn phantom_bare_specifiers(mut self, enabled: bool) -> Self {
        self.phantom_bare_specifiers = enabled;
        self
    }

    /// Extract specifiers and declared functions, then resolve the graph.
    ///
    /// Scanning runs in parallel; results are collected in submission order so
    /// the output does not depend on scheduling.
    pub fn build(&self, files: &[SourceFile]) -> GraphData {
        let scans: Vec<(Vec<String>, Vec<String>)> = files
            .par_iter()
            .map(|file| {
                let text = file.text();
                (
                    extract_specifiers(file.family(), &text),
                    extract_functions(file.family(), &text),
                )
            })
            .collect();

        let (specifiers, functions): (Vec<_>, Vec<_>) = scans.into_iter().unzip();
        let mut graph = self.resolve(files, &specifiers);

        let positions: HashMap<&str, usize> = graph
            .nodes
            .iter()
            .enumerate()
            .map(|(i, n)| (n.id.as_str(), i))
            .collect();
        let assignments: Vec<(usize, Vec<String>)> = files
            .iter()
            .zip(functions)
            .filter_map(|(file, names)| positions.get(file.id.as_str()).map(|&i| (i, names)))
            .collect();
        for (i, names) in assignments {
            if graph.nodes[i].functions.is_empty() {
                graph.nodes[i].functions = names;
            }
        }

        graph
    }

    /// Resolve each file's raw specifiers into nodes and edges.
    ///
    /// `specifiers[i]` belongs to `files[i]`. File nodes come first in
    /// submission order, followed by phantom nodes in order of creation.
    pub fn resolve(&self, files: &[SourceFile], specifiers: &[Vec<String>]) -> GraphData {
        let index = FileIndex::new(files);
        let mut nodes = NodeSet::default();
        for file in files {
            nodes.insert(&file.id);
        }

        let mut links = Vec::new();
        let mut seen: HashSet<(String, String)> = HashSet::new();

        for (file, specs) in files.iter().zip(specifiers) {
            for spec in specs {
                let target = match self.resolve_specifier(&index, file, spec) {
                    Target::File(id) => id,
                    Target::Phantom(id) => {
                        tracing::debug!(file = %file.id, specifier = %spec, "unresolved import");
                        id
                    }
                    Target::Dropped => continue,
                };

                nodes.insert(&target);
                if seen.insert((file.id.clone(), target.clone())) {
                    links.push(GraphEdge {
                        source: file.id.clone(),
                        target,
                    });
                }
            }
        }

        GraphData {
            nodes: nodes.nodes,
            links,
        }
    }

    fn resolve_specifier(&self, index: &FileIndex<'_>, importer: &SourceFile, spec: &str) -> Target {
        if !is_path_like(spec) {
            return if self.phantom_bare_specifiers {
                Target::Phantom(spec.to_string())
            } else {
                Target::Dropped
            };
        }

        let extensions = importer.family().resolution_extensions();

        // Exact path relative to the importer refines the choice between same-named files
        if let Some(joined) = join_relative(&importer.id, spec) {
            for candidate in candidates(&joined, extensions) {
                if let Some(&id) = index.by_id.get(candidate.as_str()) {
                    return Target::File(id.to_string());
                }
            }
        }

        let base = final_segment(spec);
        if !base.is_empty() && base != "." && base != ".." {
            for candidate in candidates(base, extensions) {
                if let Some(&id) = index.by_basename.get(candidate.as_str()) {
                    return Target::File(id.to_string());
                }
            }
        }

        Target::Phantom(spec.to_string())
    }
}

/// Local specifiers start with `.` or `/`; everything else is a package.
pub fn is_path_like(spec: &str) -> bool {
    spec.starts_with('.') || spec.starts_with('/')
}

/// The name itself, then the name with each extension appended.
fn candidates(name: &str, extensions: &[&str]) -> Vec<String> {
    std::iter::once(name.to_string())
        .chain(extensions.iter().map(|ext| format!("{}{}", name, ext)))
        .collect()
}

/// Last path segment of a specifier, ignoring a trailing slash.
fn final_segment(spec: &str) -> &str {
    let trimmed = spec.trim_end_matches('/');
    trimmed.rsplit('/').next().unwrap_or(trimmed)
}

/// Join a specifier onto the importer's directory, normalizing `.` and `..`.
///
/// Specifiers starting with `/` are taken relative to the batch root. Returns
/// None when `..` climbs above the root.
fn join_relative(importer: &str, spec: &str) -> Option<String> {
    let importer = importer.replace('\\', "/");
    let mut parts: Vec<&str> = if spec.starts_with('/') {
        Vec::new()
    } else {
        let mut dir: Vec<&str> = importer.split('/').collect();
        dir.pop();
        dir
    };

    for segment in spec.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: &str, content: &str) -> SourceFile {
        SourceFile::new(id, content)
    }

    fn ids(graph: &GraphData) -> Vec<&str> {
        graph.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    fn edges(graph: &GraphData) -> Vec<(&str, &str)> {
        graph
            .links
            .iter()
            .map(|e| (e.source.as_str(), e.target.as_str()))
            .collect()
    }

    #[test]
    fn test_relative_import_resolves_to_batch_file() {
        let files = vec![
            file("a.js", r#"import x from "./b";"#),
            file("b.js", "export const x = 1;"),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(ids(&graph), vec!["a.js", "b.js"]);
        assert_eq!(edges(&graph), vec![("a.js", "b.js")]);
    }

    #[test]
    fn test_bare_specifier_dropped_by_default() {
        let files = vec![file("a.js", r#"import x from "left-pad";"#)];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(ids(&graph), vec!["a.js"]);
        assert!(graph.links.is_empty());
    }

    #[test]
    fn test_bare_specifier_phantom_when_enabled() {
        let files = vec![file("a.js", r#"import x from "left-pad";"#)];
        let graph = GraphResolver::new().phantom_bare_specifiers(true).build(&files);
        assert_eq!(ids(&graph), vec!["a.js", "left-pad"]);
        assert_eq!(edges(&graph), vec![("a.js", "left-pad")]);
    }

    #[test]
    fn test_unresolved_local_import_becomes_shared_phantom() {
        let files = vec![
            file("a.js", "import m from './missing';"),
            file("c.js", "const m = require('./missing');"),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(ids(&graph), vec!["a.js", "c.js", "./missing"]);
        assert_eq!(
            edges(&graph),
            vec![("a.js", "./missing"), ("c.js", "./missing")]
        );
        // Phantoms never carry functions
        assert!(graph.nodes[2].functions.is_empty());
    }

    #[test]
    fn test_extension_preference_order() {
        let files = vec![
            file("main.js", "import u from './util';"),
            file("util.ts", ""),
            file("util.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(edges(&graph), vec![("main.js", "util.js")]);
    }

    #[test]
    fn test_exact_name_beats_extension_candidates() {
        let files = vec![
            file("main.js", "import u from './util.ts';"),
            file("util.ts", ""),
            file("util.ts.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(edges(&graph), vec![("main.js", "util.ts")]);
    }

    #[test]
    fn test_relative_path_disambiguates_same_basename() {
        let files = vec![
            file("src/app.js", "import h from './lib/helpers';"),
            file("test/helpers.js", ""),
            file("src/lib/helpers.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(edges(&graph), vec![("src/app.js", "src/lib/helpers.js")]);
    }

    #[test]
    fn test_basename_fallback_uses_first_submitted() {
        let files = vec![
            file("src/app.js", "import h from '../shared/helpers';"),
            file("x/helpers.js", ""),
            file("y/helpers.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(edges(&graph), vec![("src/app.js", "x/helpers.js")]);
    }

    #[test]
    fn test_duplicate_imports_produce_one_edge() {
        let files = vec![
            file("a.js", "import b from './b';\nconst again = require('./b');"),
            file("b.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(edges(&graph), vec![("a.js", "b.js")]);
    }

    #[test]
    fn test_phantom_matching_file_id_collapses() {
        let files = vec![
            file("a.js", "import b from 'b.js';"),
            file("b.js", ""),
        ];
        let graph = GraphResolver::new().phantom_bare_specifiers(true).build(&files);
        assert_eq!(ids(&graph), vec!["a.js", "b.js"]);
        assert_eq!(edges(&graph), vec![("a.js", "b.js")]);
    }

    #[test]
    fn test_non_js_files_are_nodes_without_edges() {
        let files = vec![
            file("main.py", "from .util import helper\n\ndef main():\n    pass\n"),
            file("util.py", "def helper():\n    pass\n"),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(ids(&graph), vec!["main.py", "util.py"]);
        assert!(graph.links.is_empty());
        assert_eq!(graph.nodes[0].functions, vec!["main"]);
    }

    #[test]
    fn test_no_dangling_edges_and_unique_nodes() {
        let files = vec![
            file("a.js", "import b from './b';\nimport c from './c';\nimport d from '../../d';"),
            file("b.ts", "import a from './a';\nimport pad from 'left-pad';"),
            file("dir/a.js", "import x from '/b';"),
        ];
        let graph = GraphResolver::new().phantom_bare_specifiers(true).build(&files);

        let unique: HashSet<&str> = graph.nodes.iter().map(|n| n.id.as_str()).collect();
        assert_eq!(unique.len(), graph.nodes.len());
        for edge in &graph.links {
            assert!(graph.contains(&edge.source), "dangling source {}", edge.source);
            assert!(graph.contains(&edge.target), "dangling target {}", edge.target);
        }
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let files: Vec<SourceFile> = (0..50)
            .map(|i| file(&format!("m{}.js", i), &format!("import n from './m{}';", (i + 7) % 60)))
            .collect();
        let first = serde_json::to_string(&GraphResolver::new().build(&files)).unwrap();
        for _ in 0..5 {
            let again = serde_json::to_string(&GraphResolver::new().build(&files)).unwrap();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn test_phantom_count_with_repeated_file_ids() {
        let files = vec![
            file("a.js", "import './missing';"),
            file("a.js", "export const a = 1;"),
            file("b.js", ""),
        ];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(graph.nodes.len(), 3);
        assert_eq!(graph.phantom_count(files.iter().map(|f| f.id.as_str())), 1);
        assert_eq!(graph.phantom_count(["a.js"]), 2);
    }

    #[test]
    fn test_join_relative() {
        assert_eq!(join_relative("src/a.js", "./b"), Some("src/b".to_string()));
        assert_eq!(join_relative("src/a.js", "../lib/c"), Some("lib/c".to_string()));
        assert_eq!(join_relative("a.js", "../escape"), None);
        assert_eq!(join_relative("src/deep/a.js", "/root/x"), Some("root/x".to_string()));
    }

    #[test]
    fn test_final_segment() {
        assert_eq!(final_segment("./lib/util"), "util");
        assert_eq!(final_segment("../components/"), "components");
        assert_eq!(final_segment("."), ".");
    }

    #[test]
    fn test_functions_attached_to_file_nodes() {
        let files = vec![file("a.js", "function render() {}\nconst go = () => 1;")];
        let graph = GraphResolver::new().build(&files);
        assert_eq!(graph.nodes[0].functions, vec!["render", "go"]);
    }
}
