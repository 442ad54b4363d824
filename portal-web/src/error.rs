//! Error classification for database writes.
//!
//! Diesel reports constraint failures as `DatabaseError(kind, info)`. Handlers
//! only care about a few of those kinds, because each one maps to a targeted
//! message for the user; everything else is logged and reported generically.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/// Message shown for failures we do not explain to the user.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again.";

#[derive(Debug, Error)]
pub enum PortalError {
    #[error("unique constraint violated: {0}")]
    Duplicate(String),
    #[error("foreign key constraint violated: {0}")]
    ForeignKey(String),
    #[error("check constraint violated: {0}")]
    CheckViolation(String),
    #[error("record not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(DieselError),
}

impl From<DieselError> for PortalError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => PortalError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => PortalError::Duplicate(message),
                    DatabaseErrorKind::ForeignKeyViolation => PortalError::ForeignKey(message),
                    DatabaseErrorKind::CheckViolation => PortalError::CheckViolation(message),
                    // Older SQLite builds report CHECK failures without an extended code.
                    _ if message.contains("CHECK constraint failed") => {
                        PortalError::CheckViolation(message)
                    }
                    _ if message.contains("FOREIGN KEY constraint failed") => {
                        PortalError::ForeignKey(message)
                    }
                    _ => PortalError::Database(DieselError::DatabaseError(kind, info)),
                }
            }
            other => PortalError::Database(other),
        }
    }
}

pub type PortalResult<T> = Result<T, PortalError>;
