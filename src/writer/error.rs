use crate::domain::CoreError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WriterError {
    #[error("Failed to prepare log directory {path}: {source}")]
    Directory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error on bucket file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid base name '{0}': must be non-empty and contain no path separators")]
    InvalidBaseName(String),

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl WriterError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        WriterError::Io {
            path: path.into(),
            source,
        }
    }
}
