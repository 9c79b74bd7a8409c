use thiserror::Error;

/// Coarse classification of a [`TreeError`], for callers that need to branch
/// on the failure class without matching message text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    UnsupportedType,
    Internal,
}

#[derive(Error, Debug)]
pub enum TreeError {
    /// A required request field is missing or empty.
    #[error("{0}")]
    Validation(String),

    /// A logical record or its data file is absent.
    #[error("{0}")]
    NotFound(String),

    /// The destination path is already occupied.
    #[error("{0}")]
    Conflict(String),

    /// The content type is not one the content store can decode.
    #[error("{0}")]
    UnsupportedType(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Config error: {0}")]
    Config(#[from] confique::Error),
}

impl TreeError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TreeError::Validation(_) => ErrorKind::Validation,
            TreeError::NotFound(_) => ErrorKind::NotFound,
            TreeError::Conflict(_) => ErrorKind::Conflict,
            TreeError::UnsupportedType(_) => ErrorKind::UnsupportedType,
            _ => ErrorKind::Internal,
        }
    }

    pub fn record_not_found(path: &str) -> Self {
        TreeError::NotFound(format!("File metadata not found for path {}.", path))
    }

    pub fn data_file_not_found(content_ref: &str) -> Self {
        TreeError::NotFound(format!("Data file not found for path {}.", content_ref))
    }
}

pub type Result<T> = std::result::Result<T, TreeError>;
