use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors raised by the split pipeline.
///
/// Anything that can go wrong without stopping the split (a single line that
/// fails to write, an unknown working directory) is logged instead and never
/// shows up here.
#[derive(Debug, Error)]
pub enum SplitError {
    #[error("the file has not been given, pass it as an argument or with --file")]
    MissingFile,

    #[error("rows per file must be greater than zero")]
    InvalidRows,

    #[error("failed to open input file {path:?}: {source}")]
    OpenInput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read line {line} of {path:?}: {source}")]
    ReadInput {
        path: PathBuf,
        line: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to create output file {path:?}: {source}")]
    CreateOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to close output file {path:?}: {source}")]
    CloseOutput {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("writer for group {index} stopped before reporting a result")]
    WriterPanicked { index: usize },

    #[error("failed to build writer thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("failed to write manifest {path:?}: {source}")]
    Manifest {
        path: PathBuf,
        #[source]
        source: anyhow::Error,
    },
}

pub type Result<T> = std::result::Result<T, SplitError>;
