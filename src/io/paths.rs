use std::env;
use std::path::{Path, PathBuf, MAIN_SEPARATOR};

/// Resolve the input file argument.
///
/// Anything containing a path separator is taken as given. A bare file name is
/// looked up in the current working directory; if that directory cannot be
/// determined the name is used unchanged.
pub fn resolve(raw: &str) -> PathBuf {
    if raw.contains(MAIN_SEPARATOR) {
        return PathBuf::from(raw);
    }
    match env::current_dir() {
        Ok(cwd) => cwd.join(raw),
        Err(e) => {
            tracing::warn!(file = raw, error = %e, "Could not determine working directory");
            PathBuf::from(raw)
        }
    }
}

/// Split a file name at its last `.` into base name and extension.
pub fn split_name(name: &str) -> (&str, Option<&str>) {
    match name.rsplit_once('.') {
        Some((base, ext)) => (base, Some(ext)),
        None => (name, None),
    }
}

/// Name of the output file for group `index`: `{base}{index:05}.{ext}`.
pub fn output_file_name(base: &str, extension: Option<&str>, index: usize) -> String {
    match extension {
        Some(ext) => format!("{}{:05}.{}", base, index, ext),
        None => format!("{}{:05}", base, index),
    }
}

/// Directory the input file lives in, `.` for a bare relative name.
pub fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Where and under which name the output files of one split go.
#[derive(Debug, Clone)]
pub struct OutputTarget {
    dir: PathBuf,
    base: String,
    extension: Option<String>,
}

impl OutputTarget {
    pub fn new(input: &Path, dir: PathBuf) -> Self {
        let name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let (base, extension) = split_name(&name);
        Self {
            dir,
            base: base.to_string(),
            extension: extension.map(str::to_string),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir
            .join(output_file_name(&self.base, self.extension.as_deref(), index))
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.dir.join(format!("{}.manifest.json", self.base))
    }
}
