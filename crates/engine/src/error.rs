use std::path::PathBuf;

use backstory_core::CoreError;
use backstory_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("core error: {0}")]
    Core(#[from] CoreError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("configuration error: {0}")]
    Config(#[from] figment::Error),

    #[error("unsupported platform: {0}")]
    UnsupportedPlatform(String),

    #[error("{} already exists; delete to regenerate", .0.display())]
    FileAlreadyExists(PathBuf),

    #[error("{} did not exist; you must provide the file to read", .0.display())]
    FileMissing(PathBuf),

    #[error("file reports {declared} stories, but contains {actual}")]
    CountMismatch { declared: usize, actual: usize },

    #[error("build index {index} overran array of {capacity}")]
    BuildIndexOverrun { index: usize, capacity: usize },
}

impl EngineError {
    /// Skips that are reported but not treated as failures.
    pub fn is_informational(&self) -> bool {
        matches!(self, Self::FileAlreadyExists(_) | Self::FileMissing(_))
    }
}
