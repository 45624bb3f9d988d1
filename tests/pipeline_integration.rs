//! Integration tests for the full analysis pipeline.
//!
//! These tests run the pipeline against the testdata fixture project and
//! against small in-memory batches.

use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use graphlint::cli::collect_batch;
use graphlint::lint::RawDiagnostic;
use graphlint::{
    AnalysisConfig, AnalysisResult, AnalyzerAdapter, AnalyzerError, AnalyzerRegistry, Pipeline,
    Severity, UploadedFile,
};

fn fixture_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata/project")
}

async fn analyze_fixture(config: &AnalysisConfig) -> AnalysisResult {
    let batch = collect_batch(&fixture_path()).expect("should read fixture project");
    Pipeline::new(config)
        .analyze(batch)
        .await
        .expect("analysis should succeed")
}

fn rules_for<'a>(result: &'a AnalysisResult, name: &str) -> Vec<&'a str> {
    result
        .bug_data
        .files
        .iter()
        .find(|f| f.name == name)
        .unwrap_or_else(|| panic!("no report for {}", name))
        .errors
        .iter()
        .filter_map(|d| d.rule_id.as_deref())
        .collect()
}

fn assert_graph_invariants(result: &AnalysisResult) {
    let mut ids = HashSet::new();
    for node in &result.graph_data.nodes {
        assert!(ids.insert(node.id.as_str()), "duplicate node {}", node.id);
    }
    for link in &result.graph_data.links {
        assert!(ids.contains(link.source.as_str()), "dangling source {}", link.source);
        assert!(ids.contains(link.target.as_str()), "dangling target {}", link.target);
    }
}

#[tokio::test]
async fn test_fixture_accepted_files_in_order() {
    let result = analyze_fixture(&AnalysisConfig::default()).await;

    let names: Vec<&str> = result.bug_data.files.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "native/main.c",
            "scripts/build.py",
            "src/api.js",
            "src/index.js",
            "src/utils/format.ts",
        ]
    );
}

#[tokio::test]
async fn test_fixture_blocked_files_absent_everywhere() {
    let result = analyze_fixture(&AnalysisConfig::default()).await;

    for blocked in ["package.json", "webpack.config.js", "src/legacy.min.js", "README.md"] {
        assert!(!result.graph_data.contains(blocked), "{} is a node", blocked);
        assert!(
            !result.bug_data.files.iter().any(|f| f.name == blocked),
            "{} has a report",
            blocked
        );
    }
}

#[tokio::test]
async fn test_fixture_graph() {
    let result = analyze_fixture(&AnalysisConfig::default()).await;
    assert_graph_invariants(&result);

    let links: Vec<(&str, &str)> = result
        .graph_data
        .links
        .iter()
        .map(|l| (l.source.as_str(), l.target.as_str()))
        .collect();
    assert_eq!(
        links,
        vec![
            ("src/index.js", "src/utils/format.ts"),
            ("src/index.js", "./missing"),
            ("src/index.js", "src/api.js"),
        ]
    );

    // Five files plus the unresolved local import; the bare "react" import is dropped
    assert_eq!(result.graph_data.nodes.len(), 6);
    let names = result.bug_data.files.iter().map(|f| f.name.as_str());
    assert_eq!(result.graph_data.phantom_count(names), 1);
    assert!(!result.graph_data.contains("react"));

    let api = result
        .graph_data
        .nodes
        .iter()
        .find(|n| n.id == "src/api.js")
        .unwrap();
    assert_eq!(api.functions, vec!["fetchUser", "deleteUser"]);

    let c = result
        .graph_data
        .nodes
        .iter()
        .find(|n| n.id == "native/main.c")
        .unwrap();
    assert_eq!(c.functions, vec!["add", "main"]);
}

#[tokio::test]
async fn test_fixture_heuristic_diagnostics() {
    let result = analyze_fixture(&AnalysisConfig::default()).await;

    assert_eq!(rules_for(&result, "src/index.js"), vec!["todo-comment", "no-console"]);
    assert_eq!(rules_for(&result, "scripts/build.py"), vec!["todo-comment"]);
    assert!(rules_for(&result, "src/api.js").is_empty());
    assert!(rules_for(&result, "native/main.c").is_empty());

    let index = &result.bug_data.files[3];
    assert_eq!(index.errors[1].line, Some(9));
    assert_eq!(index.errors[1].severity, Severity::Warning);
    assert!(!result.has_errors());
}

#[tokio::test]
async fn test_phantom_bare_specifiers_option() {
    let mut config = AnalysisConfig::default();
    config.graph.phantom_bare_specifiers = true;

    let result = analyze_fixture(&config).await;
    assert!(result.graph_data.contains("react"));
    assert_graph_invariants(&result);
}

#[tokio::test]
async fn test_graph_is_deterministic() {
    let config = AnalysisConfig::default();
    let first = serde_json::to_string(&analyze_fixture(&config).await.graph_data).unwrap();
    for _ in 0..5 {
        let again = serde_json::to_string(&analyze_fixture(&config).await.graph_data).unwrap();
        assert_eq!(first, again);
    }
}

#[tokio::test]
async fn test_unsupported_language_reported() {
    let mut config = AnalysisConfig::default();
    config.allowed_extensions.push(".go".to_string());

    let result = Pipeline::new(&config)
        .analyze(vec![UploadedFile::new("cmd/main.go", "package main\n")])
        .await
        .unwrap();

    let errors = &result.bug_data.files[0].errors;
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].message, "Unsupported file type");
    assert_eq!(errors[0].severity, Severity::Info);
    assert_eq!(errors[0].line, None);
    assert_eq!(errors[0].rule_id, None);
}

/// Never answers within any reasonable timeout.
struct HangingAdapter;

#[async_trait]
impl AnalyzerAdapter for HangingAdapter {
    fn name(&self) -> &str {
        "hanging"
    }

    async fn analyze(&self, _: &str, _: &[u8]) -> Result<Vec<RawDiagnostic>, AnalyzerError> {
        tokio::time::sleep(Duration::from_secs(60)).await;
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_timeout_isolated_to_one_file() {
    let config = AnalysisConfig {
        timeout_ms: 200,
        ..Default::default()
    };
    let mut registry = AnalyzerRegistry::from_config(&config);
    registry.register("python", Arc::new(HangingAdapter));

    let result = Pipeline::with_registry(&config, Arc::new(registry))
        .analyze(vec![
            UploadedFile::new("a.js", "console.log(1);\n"),
            UploadedFile::new("slow.py", "x = 1\n"),
            UploadedFile::new("b.js", "export const b = 2;\n"),
        ])
        .await
        .expect("timeouts must not fail the request");

    assert_eq!(result.bug_data.files.len(), 3);

    let slow = &result.bug_data.files[1];
    assert_eq!(slow.errors.len(), 1);
    assert_eq!(slow.errors[0].rule_id.as_deref(), Some("analysis-unavailable"));
    assert!(slow.errors[0].message.starts_with("analysis unavailable:"));

    assert_eq!(rules_for(&result, "a.js"), vec!["no-console"]);
    assert!(rules_for(&result, "b.js").is_empty());
}

#[cfg(unix)]
#[tokio::test]
async fn test_external_eslint_adapter() {
    let temp = tempfile::TempDir::new().unwrap();
    let yaml = format!(
        r#"
temp_dir: {}
analyzers:
  javascript:
    command: sh
    args: ["-c", "printf '[{{\"messages\":[{{\"ruleId\":\"no-undef\",\"severity\":2,\"message\":\"x is not defined\",\"line\":1,\"column\":1}}]}}]'", "{{file}}"]
    format: eslint
"#,
        temp.path().display()
    );
    let config = AnalysisConfig::parse_str(&yaml).unwrap();

    let result = Pipeline::new(&config)
        .analyze(vec![
            UploadedFile::new("a.js", "x;\n"),
            UploadedFile::new("b.ts", "console.log(1);\n"),
        ])
        .await
        .unwrap();

    let a = &result.bug_data.files[0].errors;
    assert_eq!(a.len(), 1);
    assert_eq!(a[0].severity, Severity::Error);
    assert_eq!(a[0].rule_id.as_deref(), Some("no-undef"));

    // typescript keeps the built-in linter
    assert_eq!(rules_for(&result, "b.ts"), vec!["no-console"]);

    // Materialized files are gone once the request completes
    assert!(std::fs::read_dir(temp.path()).unwrap().next().is_none());
}
