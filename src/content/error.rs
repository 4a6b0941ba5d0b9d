//! Content loading error types.
//!
//! [`ContentError`] aborts a whole collection load. [`FileError`] only ever
//! skips the one file it describes.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading a collection.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("no content found in `{dir}`")]
    NoContentFound { dir: PathBuf },

    #[error("invalid content pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("all {rejected} files in `{dir}` were rejected")]
    NoUsableContent { dir: PathBuf, rejected: usize },

    #[error("unknown highlight theme `{0}`")]
    UnknownTheme(String),
}

/// Errors that cause a single file to be skipped.
#[derive(Debug, Error)]
pub enum FileError {
    #[error("invalid filename `{name}`, expected {expected}")]
    InvalidFilename { name: String, expected: &'static str },

    #[error("failed to read file")]
    Read(#[source] std::io::Error),

    #[error("missing `---` metadata header")]
    MissingHeader,

    #[error("malformed metadata")]
    Metadata(#[from] serde_yaml::Error),

    #[error("missing `date` (required for posts)")]
    MissingDate,

    #[error("invalid date `{0}`, expected YYYY-MM-DD")]
    InvalidDate(String),

    /// `/tag/{tag}` is a single path segment.
    #[error("invalid tag `{0}`, tags cannot contain `/`")]
    InvalidTag(String),

    #[error("failed to convert markdown")]
    Convert(#[from] syntect::Error),
}
