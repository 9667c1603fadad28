use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;

use crate::config::SplitConfig;
use crate::error::{Result, SplitError};
use crate::io;
use crate::io::paths::{self, OutputTarget};
use crate::io::writer::{RowGroup, WriterGroup, WrittenFile};

mod manifest;
pub use manifest::{FileManifest, Manifest};

/// Outcome of a finished split.
#[derive(Debug, Clone)]
pub struct SplitResult {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    /// Number of output files created.
    pub files: usize,
    /// Number of input lines read, header included.
    pub rows: usize,
    pub outputs: Vec<WrittenFile>,
    pub manifest: Option<PathBuf>,
}

fn progress_bar(enabled: bool) -> ProgressBar {
    if !enabled {
        return ProgressBar::hidden();
    }
    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner()
        .template("{spinner:.green} [{elapsed_precise}] {pos} rows scanned, {msg}")
    {
        pb.set_style(style);
    }
    pb
}

/// Split the configured input file into files of at most `config.rows` rows.
///
/// The scan is sequential. Every time the row counter reaches a multiple of
/// `config.rows` the current group, boundary line included, is handed to a
/// writer task and a new group is started, seeded with the first line of the
/// input when `copy_headers` is set. A trailing partial group is written after
/// the scan. Returns once every output file is on disk.
///
/// Any fatal error stops the split right away. Files written before that
/// point are left in place.
pub fn split(config: &SplitConfig) -> Result<SplitResult> {
    let raw = config.validate()?;
    let input = paths::resolve(raw);
    let output_dir = config
        .output_dir
        .clone()
        .unwrap_or_else(|| paths::parent_dir(&input));
    let target = OutputTarget::new(&input, output_dir.clone());

    let lines = io::open_lines(&input)?;
    let mut writers = WriterGroup::new(target.clone(), config.threads)?;
    let pb = progress_bar(config.progress);

    tracing::debug!(
        input = %input.display(),
        rows_per_file = config.rows,
        copy_headers = config.copy_headers,
        "Starting split"
    );

    let mut header: Option<Vec<u8>> = None;
    let mut group = RowGroup::new();
    let mut rows = 0;
    let mut file_count = 0;

    for line in lines {
        let line = line.map_err(|source| SplitError::ReadInput {
            path: input.clone(),
            line: rows + 1,
            source,
        })?;
        rows += 1;
        if header.is_none() {
            header = Some(line.clone());
        }
        group.push(line);
        pb.inc(1);

        if rows % config.rows == 0 {
            let next = match &header {
                Some(h) if config.copy_headers => RowGroup::with_header(h),
                _ => RowGroup::new(),
            };
            file_count += 1;
            writers.spawn(file_count, std::mem::replace(&mut group, next));
            pb.set_message(format!("{} files dispatched", file_count));
            writers.poll_failures()?;
        }
    }

    if group.has_data() {
        file_count += 1;
        writers.spawn(file_count, group);
    }

    pb.set_message("waiting for writers");
    let outputs = writers.join()?;
    pb.finish_and_clear();

    let manifest = if config.manifest {
        let mut manifest = Manifest::new(input.clone(), config.rows, config.copy_headers);
        manifest.total_rows = rows;
        for file in &outputs {
            manifest.add_file(file);
        }
        let path = target.manifest_path();
        manifest
            .write_to_file(&path)
            .map_err(|source| SplitError::Manifest {
                path: path.clone(),
                source,
            })?;
        Some(path)
    } else {
        None
    };

    Ok(SplitResult {
        input,
        output_dir,
        files: file_count,
        rows,
        outputs,
        manifest,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write_input(dir: &TempDir, name: &str, content: &str) -> String {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn numbered(n: usize) -> String {
        (1..=n).map(|i| format!("row{}\n", i)).collect()
    }

    #[test]
    fn exact_multiple_has_no_trailing_file() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "data.csv", &numbered(6));

        let result = split(&SplitConfig::new(input, 3)).unwrap();

        assert_eq!(result.files, 2);
        assert_eq!(result.rows, 6);
        assert_eq!(
            fs::read_to_string(dir.path().join("data00001.csv")).unwrap(),
            "row1\nrow2\nrow3\n"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("data00002.csv")).unwrap(),
            "row4\nrow5\nrow6\n"
        );
        assert!(!dir.path().join("data00003.csv").exists());
    }

    #[test]
    fn trailing_partial_group_is_written() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "data.csv", &numbered(7));

        let result = split(&SplitConfig::new(input, 3)).unwrap();

        assert_eq!(result.files, 3);
        assert_eq!(result.rows, 7);
        assert_eq!(
            fs::read_to_string(dir.path().join("data00003.csv")).unwrap(),
            "row7\n"
        );
    }

    #[test]
    fn header_is_copied_into_later_files() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "people.csv", "id,name\n1,a\n2,b\n3,c\n4,d\n");

        let result = split(&SplitConfig::new(input, 2).copy_headers(true)).unwrap();

        assert_eq!(result.files, 3);
        let files: Vec<String> = (1..=3)
            .map(|i| fs::read_to_string(dir.path().join(format!("people{:05}.csv", i))).unwrap())
            .collect();
        assert_eq!(files[0], "id,name\n1,a\n");
        assert_eq!(files[1], "id,name\n2,b\n3,c\n");
        assert_eq!(files[2], "id,name\n4,d\n");
    }

    #[test]
    fn header_only_tail_is_not_written() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "people.csv", "id,name\n1,a\n2,b\n3,c\n");

        let result = split(&SplitConfig::new(input, 2).copy_headers(true)).unwrap();

        assert_eq!(result.files, 2);
        assert!(!dir.path().join("people00003.csv").exists());
    }

    #[test]
    fn empty_input_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "empty.csv", "");

        let result = split(&SplitConfig::new(input, 10)).unwrap();

        assert_eq!(result.files, 0);
        assert_eq!(result.rows, 0);
        assert!(result.outputs.is_empty());
    }

    #[test]
    fn missing_input_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("nope.csv").to_string_lossy().into_owned();
        assert!(matches!(
            split(&SplitConfig::new(input, 10)),
            Err(SplitError::OpenInput { .. })
        ));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn read_failure_mid_scan_is_fatal() {
        // Opening a directory succeeds on Linux; reading from it fails.
        let dir = TempDir::new().unwrap();
        let sub = dir.path().join("sub.csv");
        fs::create_dir(&sub).unwrap();

        let result = split(&SplitConfig::new(sub.to_string_lossy().into_owned(), 1));

        match result {
            Err(SplitError::ReadInput { path, line, .. }) => {
                assert_eq!(path, sub);
                assert_eq!(line, 1);
            }
            other => panic!("expected a read error, got {:?}", other.map(|r| r.files)),
        }
    }

    #[test]
    fn unwritable_output_dir_is_fatal() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "data.csv", &numbered(5));
        let config = SplitConfig::new(input, 2).output_dir(dir.path().join("missing"));
        assert!(matches!(
            split(&config),
            Err(SplitError::CreateOutput { .. })
        ));
    }

    #[test]
    fn manifest_lists_every_file() {
        let dir = TempDir::new().unwrap();
        let input = write_input(&dir, "data.csv", &numbered(5));

        let result = split(&SplitConfig::new(input, 2).manifest(true)).unwrap();

        let path = result.manifest.unwrap();
        assert_eq!(path, dir.path().join("data.manifest.json"));
        let manifest = Manifest::read_from_file(&path).unwrap();
        assert_eq!(manifest.total_rows, 5);
        assert_eq!(manifest.rows_per_file, 2);
        let rows: Vec<usize> = manifest.files.iter().map(|f| f.data_rows).collect();
        assert_eq!(rows, vec![2, 2, 1]);
    }
}
