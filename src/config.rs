//! Configuration schema for graphlint.
//!
//! The configuration controls which files are eligible for analysis, how the
//! dependency graph treats unresolved imports, and which analyzer adapters run
//! for each language.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file names to search for in the working directory.
pub const DEFAULT_CONFIG_NAMES: &[&str] = &["graphlint.yaml", ".graphlint.yaml"];

/// Placeholder replaced by the materialized file path in analyzer arguments.
pub const FILE_PLACEHOLDER: &str = "{file}";

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisConfig {
    #[serde(default)]
    pub version: String,
    /// Extensions (with leading dot) eligible for analysis.
    #[serde(default = "default_allowed_extensions")]
    pub allowed_extensions: Vec<String>,
    /// Basenames or glob patterns never analyzed (lockfiles, manifests, build configs).
    #[serde(default = "default_blocked_basenames")]
    pub blocked_basenames: Vec<String>,
    /// Maximum number of analyzer invocations in flight per batch.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
    /// Per-invocation analyzer timeout in milliseconds.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    /// Directory for materialized temp files (system temp dir when absent).
    #[serde(default)]
    pub temp_dir: Option<PathBuf>,
    /// Line length limit used by the built-in heuristic linter.
    #[serde(default = "default_max_line_length")]
    pub max_line_length: usize,
    #[serde(default)]
    pub graph: GraphConfig,
    /// External analyzers keyed by language tag.
    #[serde(default)]
    pub analyzers: BTreeMap<String, AnalyzerCommandConfig>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            version: "1".to_string(),
            allowed_extensions: default_allowed_extensions(),
            blocked_basenames: default_blocked_basenames(),
            concurrency: default_concurrency(),
            timeout_ms: default_timeout_ms(),
            temp_dir: None,
            max_line_length: default_max_line_length(),
            graph: GraphConfig::default(),
            analyzers: BTreeMap::new(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from a YAML file.
    pub fn parse_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse_str(&content)
    }

    /// Parse a configuration from YAML text.
    pub fn parse_str(content: &str) -> anyhow::Result<Self> {
        let config: AnalysisConfig = serde_yaml::from_str(content)?;
        Ok(config)
    }

    /// Load the configuration from an explicit path, or discover one.
    ///
    /// Falls back to the built-in defaults when nothing is found.
    pub fn load(explicit: Option<&Path>) -> anyhow::Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => discover(),
        };

        let config = match path {
            Some(p) => {
                tracing::debug!(path = %p.display(), "loading configuration");
                Self::parse_file(&p)
                    .map_err(|e| anyhow::anyhow!("parsing config {}: {}", p.display(), e))?
            }
            None => {
                tracing::debug!("no configuration file found, using defaults");
                Self::default()
            }
        };

        validate(&config)?;
        Ok(config)
    }

    /// The per-invocation analyzer timeout.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.timeout_ms)
    }

    /// Directory analyzers materialize files into.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Render this configuration as YAML.
    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Dependency graph options.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct GraphConfig {
    /// Create phantom nodes for bare package specifiers instead of dropping them.
    #[serde(default)]
    pub phantom_bare_specifiers: bool,
}

/// An external analyzer invoked as a child process.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalyzerCommandConfig {
    /// Program to execute (looked up on PATH).
    pub command: String,
    /// Arguments; `{file}` is replaced with the materialized file path.
    #[serde(default = "default_analyzer_args")]
    pub args: Vec<String>,
    /// How to read the analyzer's output.
    pub format: OutputFormat,
    /// Overrides the global timeout for this analyzer.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
}

/// Native output formats understood by the external command adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// ESLint `--format json`.
    Eslint,
    /// pylint `--output-format=json`.
    Pylint,
    /// gcc/clang/javac style `path:line[:col]: level: message` lines.
    Compiler,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Eslint => write!(f, "eslint"),
            OutputFormat::Pylint => write!(f, "pylint"),
            OutputFormat::Compiler => write!(f, "compiler"),
        }
    }
}

fn default_allowed_extensions() -> Vec<String> {
    [".js", ".ts", ".jsx", ".tsx", ".py", ".java", ".c", ".cpp"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_blocked_basenames() -> Vec<String> {
    [
        "package.json",
        "package-lock.json",
        "yarn.lock",
        "pnpm-lock.yaml",
        "tsconfig.json",
        "jsconfig.json",
        "*.config.js",
        "*.config.ts",
        "*.config.mjs",
        "*.config.cjs",
        ".eslintrc.js",
        "*.min.js",
        "*.d.ts",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_concurrency() -> usize {
    4
}

fn default_timeout_ms() -> u64 {
    30_000
}

fn default_max_line_length() -> usize {
    120
}

fn default_analyzer_args() -> Vec<String> {
    vec![FILE_PLACEHOLDER.to_string()]
}

/// Find a configuration file in the working directory or the user config dir.
fn discover() -> Option<PathBuf> {
    for name in DEFAULT_CONFIG_NAMES {
        let path = PathBuf::from(name);
        if path.exists() {
            return Some(path);
        }
    }

    directories::ProjectDirs::from("", "", "graphlint")
        .map(|dirs| dirs.config_dir().join("config.yaml"))
        .filter(|p| p.exists())
}

/// Validate a configuration for correctness.
pub fn validate(config: &AnalysisConfig) -> anyhow::Result<()> {
    for ext in &config.allowed_extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            anyhow::bail!("invalid allowed extension {:?}, must look like \".js\"", ext);
        }
    }

    for pattern in &config.blocked_basenames {
        if pattern.is_empty() {
            anyhow::bail!("blocked_basenames must not contain empty entries");
        }
    }

    if config.concurrency == 0 {
        anyhow::bail!("concurrency must be at least 1");
    }

    if config.timeout_ms == 0 {
        anyhow::bail!("timeout_ms must be greater than 0");
    }

    for (language, analyzer) in &config.analyzers {
        if analyzer.command.trim().is_empty() {
            anyhow::bail!("analyzer for {:?} has an empty command", language);
        }
        if !analyzer.args.iter().any(|a| a.contains(FILE_PLACEHOLDER)) {
            anyhow::bail!(
                "analyzer for {:?} must pass {} somewhere in its args",
                language,
                FILE_PLACEHOLDER
            );
        }
        if analyzer.timeout_ms == Some(0) {
            anyhow::bail!("analyzer for {:?} has a zero timeout", language);
        }
    }

    Ok(())
}
