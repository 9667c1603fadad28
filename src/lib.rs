//! Split large line-oriented text files into smaller files of a bounded row
//! count, optionally repeating the header line in every file.
//!
//! ```no_run
//! use splitter::{split, SplitConfig};
//!
//! let result = split(&SplitConfig::new("data.csv", 5_000).copy_headers(true))?;
//! println!("{} rows into {} files", result.rows, result.files);
//! # Ok::<(), splitter::SplitError>(())
//! ```

pub mod config;
pub mod error;
pub mod io;
pub mod runtime;

pub use config::SplitConfig;
pub use error::SplitError;
pub use runtime::{split, SplitResult};
