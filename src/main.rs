use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

use splitter::config::SplitConfig;

#[derive(Parser)]
#[command(name = "splitter", version)]
#[command(
    about = "Split a large file into multiple files with a fixed number of rows each",
    long_about = None,
    after_help = "Example: splitter --copy-headers /home/me/Downloads/my-file.csv --rows 5000"
)]
struct Cli {
    /// File to split: a name in the current folder, or a full path
    #[arg(value_name = "FILE")]
    input: Option<String>,

    /// File to split (same as the positional FILE)
    #[arg(short, long, conflicts_with = "input")]
    file: Option<String>,

    /// Start a new file every time this many rows have been written [default: 10000]
    #[arg(short, long)]
    rows: Option<usize>,

    /// Repeat the first line of the input at the top of every output file
    #[arg(short, long)]
    copy_headers: bool,

    /// Folder for the output files (defaults to the folder of the input file)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Number of writer threads
    #[arg(short = 'j', long)]
    threads: Option<usize>,

    /// Write a JSON manifest of the created files next to them
    #[arg(long)]
    manifest: bool,

    /// Show a progress spinner while scanning
    #[arg(long)]
    progress: bool,

    /// Read settings from a YAML file; flags given here take precedence
    #[arg(long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn into_config(self) -> anyhow::Result<SplitConfig> {
        let mut config = match &self.config {
            Some(path) => SplitConfig::from_yaml_file(path)?,
            None => SplitConfig::default(),
        };
        if let Some(file) = self.input.or(self.file) {
            config.file = Some(file);
        }
        if let Some(rows) = self.rows {
            config.rows = rows;
        }
        if self.output_dir.is_some() {
            config.output_dir = self.output_dir;
        }
        if self.threads.is_some() {
            config.threads = self.threads;
        }
        config.copy_headers |= self.copy_headers;
        config.manifest |= self.manifest;
        config.progress |= self.progress;
        Ok(config)
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run() -> anyhow::Result<()> {
    let start = Instant::now();
    let config = Cli::parse().into_config()?;

    let result = splitter::split(&config).context("Failed to split file")?;

    tracing::info!(
        "The file {:?} with {} rows is split per {} rows into {} files in {:?}",
        result.input,
        result.rows,
        config.rows,
        result.files,
        result.output_dir
    );
    if let Some(manifest) = &result.manifest {
        tracing::info!("Manifest written to {:?}", manifest);
    }
    tracing::info!("The file splitting took {:?}", start.elapsed());
    Ok(())
}

fn main() {
    init_logging();
    if let Err(e) = run() {
        tracing::error!("{:#}", e);
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splitter::config::DEFAULT_ROWS;

    #[test]
    fn positional_file_and_defaults() {
        let config = Cli::parse_from(["splitter", "data.csv"]).into_config().unwrap();
        assert_eq!(config.file.as_deref(), Some("data.csv"));
        assert_eq!(config.rows, DEFAULT_ROWS);
        assert!(!config.copy_headers);
    }

    #[test]
    fn flags_fill_the_config() {
        let config = Cli::parse_from([
            "splitter",
            "--file",
            "/tmp/data.csv",
            "--rows",
            "500",
            "--copy-headers",
            "-j",
            "3",
        ])
        .into_config()
        .unwrap();
        assert_eq!(
            config,
            SplitConfig::new("/tmp/data.csv", 500)
                .copy_headers(true)
                .threads(3)
        );
    }

    #[test]
    fn file_is_optional_at_parse_time() {
        let config = Cli::parse_from(["splitter"]).into_config().unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn flags_override_config_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("split.yaml");
        std::fs::write(&path, "file: from-config.csv\nrows: 10\ncopy_headers: true\n").unwrap();

        let config = Cli::parse_from([
            "splitter",
            "--config",
            path.to_str().unwrap(),
            "--rows",
            "20",
        ])
        .into_config()
        .unwrap();

        assert_eq!(config.file.as_deref(), Some("from-config.csv"));
        assert_eq!(config.rows, 20);
        assert!(config.copy_headers);
    }
}
