use models::errors::ModelError;
use thiserror::Error;

/// Failures of playlist operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PlaylistError {
    #[error("invalid command: {0}")]
    Validation(String),
    #[error("playlist not found")]
    NotFound,
    #[error("playlist already exists: {0}")]
    Conflict(String),
    #[error("operation cancelled")]
    Cancelled,
    #[error("deadline exceeded")]
    DeadlineExceeded,
    #[error("repository error: {0}")]
    Repository(String),
}

impl PlaylistError {
    /// Stable numeric code for external mapping/logging
    pub fn code(&self) -> u16 {
        match self {
            PlaylistError::Validation(_) => 2001,
            PlaylistError::NotFound => 2002,
            PlaylistError::Conflict(_) => 2003,
            PlaylistError::Cancelled => 2101,
            PlaylistError::DeadlineExceeded => 2102,
            PlaylistError::Repository(_) => 2200,
        }
    }

    /// Raised by the caller's context rather than by the operation itself.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, PlaylistError::Cancelled | PlaylistError::DeadlineExceeded)
    }
}

impl From<ModelError> for PlaylistError {
    fn from(e: ModelError) -> Self {
        match e {
            ModelError::Validation(msg) => PlaylistError::Validation(msg),
            ModelError::Db(msg) => PlaylistError::Repository(msg),
        }
    }
}

impl From<sea_orm::DbErr> for PlaylistError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e.sql_err() {
            Some(sea_orm::SqlErr::UniqueConstraintViolation(msg)) => PlaylistError::Conflict(msg),
            _ => PlaylistError::Repository(e.to_string()),
        }
    }
}
