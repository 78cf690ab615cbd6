use std::path::{Path, PathBuf};
use thiserror::Error;

/// Failures that abort an operation outright.
///
/// User-input problems (bad range bounds, unknown keys, deleting the last
/// clip) never show up here; those are reported as status messages on the
/// returned projection and leave the session untouched.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("no dataset file found in {0}")]
    NoPrimaryFile(PathBuf),

    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub(crate) fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub(crate) fn json(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        StoreError::Json {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}
