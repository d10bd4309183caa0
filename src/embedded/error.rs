//! Error types for synthetic document storage.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while writing or removing synthetic documents.
#[derive(Debug, Error)]
pub enum EmbeddedError {
    /// The storage folder or a synthetic file could not be written.
    #[error("IO error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Synthetic files need an absolute path to get a `file://` URI.
    #[error("storage path {0} is not absolute")]
    RelativePath(PathBuf),
}

impl EmbeddedError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
