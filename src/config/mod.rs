use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SplitError;

/// Rows per output file when neither the command line nor a config file says otherwise.
pub const DEFAULT_ROWS: usize = 10_000;

fn default_rows() -> usize {
    DEFAULT_ROWS
}

/// Settings for a single split run.
///
/// Can be built directly, loaded from YAML, or assembled from command-line
/// flags. Call [`SplitConfig::validate`] before handing it to the pipeline;
/// [`crate::runtime::split`] does so itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SplitConfig {
    /// Input file, either a bare name (resolved against the working directory) or a path.
    #[serde(default)]
    pub file: Option<String>,
    #[serde(default = "default_rows")]
    pub rows: usize,
    #[serde(default)]
    pub copy_headers: bool,
    /// Directory for the output files. Defaults to the input file's directory.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    /// Size of the writer thread pool; `None` lets rayon decide.
    #[serde(default)]
    pub threads: Option<usize>,
    #[serde(default)]
    pub manifest: bool,
    /// Show a spinner with the number of rows scanned.
    #[serde(default)]
    pub progress: bool,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            file: None,
            rows: DEFAULT_ROWS,
            copy_headers: false,
            output_dir: None,
            threads: None,
            manifest: false,
            progress: false,
        }
    }
}

impl SplitConfig {
    pub fn new(file: impl Into<String>, rows: usize) -> Self {
        Self {
            file: Some(file.into()),
            rows,
            ..Self::default()
        }
    }

    pub fn copy_headers(mut self, copy_headers: bool) -> Self {
        self.copy_headers = copy_headers;
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(dir.into());
        self
    }

    pub fn threads(mut self, threads: usize) -> Self {
        self.threads = Some(threads);
        self
    }

    pub fn manifest(mut self, manifest: bool) -> Self {
        self.manifest = manifest;
        self
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        Self::from_yaml_str(&content)
    }

    /// Parses a config document. The input file may be left out here and
    /// supplied later on the command line, so only the shape is checked.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: SplitConfig =
            serde_yaml::from_str(content).context("Failed to parse YAML configuration")?;
        Ok(config)
    }

    /// Checks the settings and returns the raw input file name.
    pub fn validate(&self) -> Result<&str, SplitError> {
        let file = self
            .file
            .as_deref()
            .filter(|f| !f.is_empty())
            .ok_or(SplitError::MissingFile)?;
        if self.rows == 0 {
            return Err(SplitError::InvalidRows);
        }
        Ok(file)
    }
}
