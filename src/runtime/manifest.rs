use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::io::writer::WrittenFile;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub input_path: PathBuf,
    pub rows_per_file: usize,
    pub copy_headers: bool,
    pub total_rows: usize,
    pub files: Vec<FileManifest>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileManifest {
    pub index: usize,
    pub path: PathBuf,
    pub lines: usize,
    pub data_rows: usize,
}

impl From<&WrittenFile> for FileManifest {
    fn from(file: &WrittenFile) -> Self {
        Self {
            index: file.index,
            path: file.path.clone(),
            lines: file.lines,
            data_rows: file.data_rows,
        }
    }
}

impl Manifest {
    pub fn new(input_path: PathBuf, rows_per_file: usize, copy_headers: bool) -> Self {
        Self {
            input_path,
            rows_per_file,
            copy_headers,
            total_rows: 0,
            files: Vec::new(),
        }
    }

    pub fn add_file(&mut self, file: &WrittenFile) {
        self.files.push(file.into());
    }

    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        Ok(())
    }

    pub fn read_from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&json)?)
    }
}
