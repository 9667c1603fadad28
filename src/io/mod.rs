use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::error::{Result, SplitError};

pub mod paths;
pub mod writer;

/// Line iterator over a byte stream.
///
/// Lines come back as raw bytes with the trailing `\n` (or `\r\n`) removed, so
/// files that are not valid UTF-8 pass through untouched.
pub struct LineReader<R> {
    inner: R,
}

impl<R: BufRead> LineReader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = std::io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut line = Vec::new();
        match self.inner.read_until(b'\n', &mut line) {
            Ok(0) => None,
            Ok(_) => {
                if line.last() == Some(&b'\n') {
                    line.pop();
                }
                if line.last() == Some(&b'\r') {
                    line.pop();
                }
                Some(Ok(line))
            }
            Err(e) => Some(Err(e)),
        }
    }
}

/// Open the input file for a sequential line scan.
pub fn open_lines(path: &Path) -> Result<LineReader<BufReader<File>>> {
    let file = File::open(path).map_err(|source| SplitError::OpenInput {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(LineReader::new(BufReader::with_capacity(1024 * 1024, file)))
}
