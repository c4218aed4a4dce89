//! # Application Error
//!
//! The single error type command handlers return. `main` prints it to
//! stderr and exits with status 1.
//!
//! ## Error Mapping
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  DbError::NotFound          ──► AppError::NotFound                     │
//! │  DbError::UniqueViolation   ──► AppError::Conflict                     │
//! │  DbError::ForeignKey...     ──► AppError::Conflict                     │
//! │  CoreError                  ──► AppError::Core                         │
//! │  DbError (anything else)    ──► AppError::Database (logged)            │
//! │  ValidationError            ──► AppError::Validation                   │
//! │  ExportError                ──► AppError::Export                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use quill_core::{CoreError, ValidationError};
use quill_db::DbError;
use quill_render::ExportError;
use thiserror::Error;
use tracing::error;

/// Errors surfaced to the user.
#[derive(Debug, Error)]
pub enum AppError {
    /// A record addressed by id does not exist.
    #[error("{0}")]
    NotFound(String),

    /// The operation clashes with stored data.
    ///
    /// ## When This Occurs
    /// - Deleting a client that still has quotes
    /// - A quote number taken between generation and insert
    #[error("{0}")]
    Conflict(String),

    /// User input rejected before anything was written.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Quote number generation failed.
    #[error(transparent)]
    Core(CoreError),

    /// Storage failure that is not the user's fault.
    #[error("Database error: {0}")]
    Database(String),

    /// Rendering or merging failed; the target file was not written.
    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    /// Configuration file could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A file named on the command line could not be read.
    #[error("Cannot read {path}: {source}")]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn not_found(entity: &str, id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("{} not found: {}", entity, id))
    }

    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config(message.into())
    }
}

impl From<DbError> for AppError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::NotFound { entity, id } => AppError::not_found(entity, id),
            conflict @ (DbError::UniqueViolation { .. } | DbError::ForeignKeyViolation { .. }) => {
                AppError::Conflict(conflict.to_string())
            }
            other => {
                error!(error = %other, "Database error");
                AppError::Database(other.to_string())
            }
        }
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(v) => AppError::Validation(v),
            other => AppError::Core(other),
        }
    }
}

impl From<toml::de::Error> for AppError {
    fn from(err: toml::de::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AppError {
    fn from(err: toml::ser::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Io(err.into())
    }
}

/// Result type for command handlers.
pub type AppResult<T> = Result<T, AppError>;
