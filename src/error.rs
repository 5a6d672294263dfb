//! Centralized error types for loreshell.

use std::path::PathBuf;
use thiserror::Error;

/// All errors produced by the loreshell library.
#[derive(Error, Debug)]
pub enum LoreError {
    /// The HTTP request could not be sent or its body could not be read.
    #[error("Request to '{url}' failed: {source}")]
    Http {
        url: String,
        source: reqwest::Error,
    },

    /// The archive answered with a non-success status.
    #[error("Archive returned HTTP {status} for '{url}'")]
    Status { url: String, status: u16 },

    /// The mbox payload could not be gunzipped.
    #[error("Failed to decompress mbox data: {0}")]
    Decompress(std::io::Error),

    /// The Atom response is not well-formed.
    #[error("Failed to parse Atom feed: {0}")]
    InvalidFeed(String),

    /// The archive has no universal `/r/` redirect and no inbox was given.
    #[error("inbox parameter is required for {0} (no universal message redirect)")]
    InboxRequired(String),

    /// A caller-supplied argument was rejected before any request was made.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error with the associated file path.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The specified file does not exist.
    #[error("Archive file not found: {0}")]
    FileNotFound(PathBuf),
}

/// Convenience alias for `Result<T, LoreError>`.
pub type Result<T> = std::result::Result<T, LoreError>;

impl LoreError {
    /// Create an `Io` variant from a path and an `io::Error`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create an `Http` variant from the requested URL and a transport error.
    pub fn http(url: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            url: url.into(),
            source,
        }
    }
}
