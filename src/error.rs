//! Error types for htmlchunk operations.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that stop a chunking run.
///
/// Structural anomalies in the input (unknown link targets, unnumbered
/// headings, parts without an intro) are not errors; they are logged and
/// tolerated per item.
#[derive(Error, Debug)]
pub enum Error {
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot write {}: {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required element: {0}")]
    MissingElement(String),

    #[error("Invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

pub type Result<T> = std::result::Result<T, Error>;
