//! Output formatting for analysis results.
//!
//! - JSON: the response schema, for programmatic consumption
//! - Pretty: colored terminal output for human readability

use colored::*;

use crate::types::{AnalysisResult, Diagnostic, FileReport, Severity};

/// Render the result as pretty-printed JSON.
pub fn render_json(result: &AnalysisResult) -> anyhow::Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Write results in JSON format to stdout.
pub fn write_json(result: &AnalysisResult) -> anyhow::Result<()> {
    println!("{}", render_json(result)?);
    Ok(())
}

/// Write results as a colored terminal report.
pub fn write_pretty(path: &str, result: &AnalysisResult) {
    // Header
    println!();
    print!("  ");
    print!("{}", "graphlint".cyan().bold());
    println!(" v{}", env!("CARGO_PKG_VERSION"));
    println!();

    print!("  {}", "Analyzed: ".dimmed());
    println!("{}", path);
    println!();

    write_graph_summary(result);
    println!();

    let noisy: Vec<&FileReport> = result
        .bug_data
        .files
        .iter()
        .filter(|f| !f.errors.is_empty())
        .collect();
    if !noisy.is_empty() {
        println!("  {} ({}):", "Diagnostics".bold(), result.diagnostic_count());
        println!();
        for file in noisy {
            write_file(file);
        }
    }

    write_totals(result);
    println!();
}

fn write_graph_summary(result: &AnalysisResult) {
    let graph = &result.graph_data;
    let files = result.bug_data.files.len();

    println!(
        "  {} {} files, {} links, {} unresolved",
        "Graph:".bold(),
        files,
        graph.links.len(),
        graph.phantom_count(result.bug_data.files.iter().map(|f| f.name.as_str()))
    );
}

fn write_file(file: &FileReport) {
    println!("  {}", file.name.blue());
    for d in &file.errors {
        write_severity_tag(d.severity);
        print!("{:<8}", position(d).dimmed());
        print!("{}", d.message);
        if let Some(rule) = &d.rule_id {
            print!("  {}", rule.dimmed());
        }
        println!();
    }
    println!();
}

fn position(d: &Diagnostic) -> String {
    match (d.line, d.column) {
        (Some(line), Some(col)) => format!("{}:{}", line, col),
        (Some(line), None) => line.to_string(),
        _ => "-".to_string(),
    }
}

fn write_severity_tag(severity: Severity) {
    match severity {
        Severity::Error => print!("    {} ", "ERROR".red()),
        Severity::Warning => print!("    {} ", "WARN ".yellow()),
        Severity::Info => print!("    {} ", "INFO ".blue()),
    }
}

fn write_totals(result: &AnalysisResult) {
    let errors = result.count_severity(Severity::Error);
    let warnings = result.count_severity(Severity::Warning);
    let infos = result.count_severity(Severity::Info);

    if errors + warnings + infos == 0 {
        println!("  {}", "✓ No issues found".green());
        return;
    }

    let status = if errors > 0 {
        "✗".red()
    } else {
        "!".yellow()
    };
    println!(
        "  {} {} errors, {} warnings, {} info",
        status,
        errors.to_string().red(),
        warnings.to_string().yellow(),
        infos.to_string().blue()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_formats() {
        let mut d = Diagnostic {
            line: Some(4),
            column: Some(2),
            severity: Severity::Warning,
            message: "x".to_string(),
            rule_id: None,
        };
        assert_eq!(position(&d), "4:2");
        d.column = None;
        assert_eq!(position(&d), "4");
        d.line = None;
        assert_eq!(position(&d), "-");
    }

    #[test]
    fn test_render_json_uses_schema_names() {
        let json = render_json(&AnalysisResult::default()).unwrap();
        assert!(json.contains("\"graphData\""));
        assert!(json.contains("\"bugData\""));
    }
}
