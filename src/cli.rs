//! Command-line interface for graphlint.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::AnalysisConfig;
use crate::pipeline::{Pipeline, UploadedFile};
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_ERROR: i32 = 2;

/// Default configuration written by `graphlint init`.
pub const DEFAULT_CONFIG_TEMPLATE: &str = include_str!("templates/graphlint.yaml");

/// Directories never descended into when collecting a batch.
const SKIPPED_DIRS: &[&str] = &["node_modules", "vendor", "target"];

/// Multi-language dependency graph and diagnostics.
///
/// Graphlint reads a source tree, builds a file-level dependency graph from
/// import statements, and runs a per-language analyzer over every file.
#[derive(Parser)]
#[command(name = "graphlint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze a file or directory
    Analyze(AnalyzeArgs),
    /// Write a default configuration file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    Json,
    Pretty,
}

/// Arguments for the analyze command.
#[derive(Parser)]
pub struct AnalyzeArgs {
    /// Path to analyze (file or directory)
    pub path: PathBuf,

    /// Path to configuration YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "json")]
    pub format: OutputMode,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = "graphlint.yaml")]
    pub output: PathBuf,
}

/// Read a file or directory tree into a batch.
///
/// Ids are relative to `root` and always use `/` separators. A single file
/// is identified by its file name.
pub fn collect_batch(root: &Path) -> anyhow::Result<Vec<UploadedFile>> {
    let metadata = std::fs::metadata(root)?;
    if metadata.is_file() {
        let name = root
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| root.to_string_lossy().into_owned());
        return Ok(vec![UploadedFile::new(name, std::fs::read(root)?)]);
    }

    let mut batch = Vec::new();
    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            if e.depth() == 0 || !e.file_type().is_dir() {
                return true;
            }
            let name = e.file_name().to_string_lossy();
            // Skip hidden and dependency/build directories
            !name.starts_with('.') && !SKIPPED_DIRS.iter().any(|d| *d == name)
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }

        let relative = entry.path().strip_prefix(root)?;
        let id = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        batch.push(UploadedFile::new(id, std::fs::read(entry.path())?));
    }

    Ok(batch)
}

/// Run the analyze command.
pub fn run_analyze(args: &AnalyzeArgs) -> anyhow::Result<i32> {
    let config = match AnalysisConfig::load(args.config.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: invalid configuration: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    let batch = match collect_batch(&args.path) {
        Ok(b) => b,
        Err(e) => {
            eprintln!("Error: cannot read {}: {}", args.path.display(), e);
            return Ok(EXIT_ERROR);
        }
    };

    tracing::debug!(path = %args.path.display(), files = batch.len(), "collected batch");

    let pipeline = Pipeline::new(&config);
    let runtime = tokio::runtime::Runtime::new()?;
    let result = match runtime.block_on(pipeline.analyze(batch)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error: {}", e);
            return Ok(EXIT_ERROR);
        }
    };

    match args.format {
        OutputMode::Json => report::write_json(&result)?,
        OutputMode::Pretty => report::write_pretty(&args.path.to_string_lossy(), &result),
    }

    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    // Create output directory if needed
    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG_TEMPLATE) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to register external analyzers", args.output.display());
    println!("  2. Run: graphlint analyze . --config {}", args.output.display());

    Ok(EXIT_SUCCESS)
}
