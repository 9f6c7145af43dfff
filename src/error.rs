//! Error types for the field registry

use std::path::PathBuf;
use thiserror::Error;

/// Result type for field registry operations
pub type Result<T> = std::result::Result<T, FieldsError>;

/// Field registry errors
#[derive(Error, Debug)]
pub enum FieldsError {
    #[error("No names were provided. Please use the --names option to pass field names.")]
    EmptyInput,

    #[error("The fields-file {path} contains invalid JSON ({reason}). Please fix the file then try again.")]
    CorruptRegistry { path: PathBuf, reason: String },

    #[error("Fields already exist in the file: {}", names.join(", "))]
    DuplicateFields { names: Vec<String> },

    #[error("Unknown transformation profile: {0}")]
    UnknownProfile(String),

    #[error("Invalid field name: {0:?}")]
    InvalidFieldName(String),

    #[error("The fields-file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("The fields-file is locked by another process: {0}")]
    LockBusy(PathBuf),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl FieldsError {
    /// Build a corrupt-registry error for content that has no backing file
    pub fn corrupt(reason: impl ToString) -> Self {
        FieldsError::CorruptRegistry {
            path: PathBuf::from("<memory>"),
            reason: reason.to_string(),
        }
    }

    /// Attach the file the corrupt content was read from
    pub fn at_path(self, path: impl Into<PathBuf>) -> Self {
        match self {
            FieldsError::CorruptRegistry { reason, .. } => FieldsError::CorruptRegistry {
                path: path.into(),
                reason,
            },
            other => other,
        }
    }
}
