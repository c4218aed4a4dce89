//! # Database Errors
//!
//! ```text
//! sqlx::Error ──► DbError (this module) ──► AppError (CLI, stderr + exit 1)
//! ```
//!
//! Constraint failures are classified with [`sqlx::error::ErrorKind`];
//! the offending column is read from SQLite's message
//! (`UNIQUE constraint failed: quotes.quote_number`).

use sqlx::error::ErrorKind;
use thiserror::Error;

/// Database operation errors.
#[derive(Debug, Error)]
pub enum DbError {
    /// No row with the given id.
    ///
    /// ## When This Occurs
    /// - Lookup of a client or quote that was deleted or never existed
    /// - Update, status change or delete that touched zero rows
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// A UNIQUE index rejected the write.
    ///
    /// ## When This Occurs
    /// - Inserting a quote whose number another writer stored after the
    ///   generator took its snapshot
    #[error("{field} '{value}' is already in use")]
    UniqueViolation { field: String, value: String },

    /// A foreign key rejected the write.
    ///
    /// ## When This Occurs
    /// - Creating a quote for a client id that does not exist
    /// - Deleting a client that still has quotes
    #[error("Foreign key violation: {message}")]
    ForeignKeyViolation { message: String },

    #[error("Cannot open database: {0}")]
    ConnectionFailed(String),

    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// SQLite rejected a statement for another reason.
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Begin or commit of a quote + items transaction failed.
    #[error("Transaction failed: {0}")]
    TransactionFailed(String),

    #[error("Timed out waiting for a database connection")]
    PoolExhausted,

    #[error("Internal database error: {0}")]
    Internal(String),
}

impl DbError {
    pub fn not_found(entity: &'static str, id: impl ToString) -> Self {
        DbError::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// UniqueViolation carrying the value that clashed.
    pub fn duplicate(field: impl Into<String>, value: impl Into<String>) -> Self {
        DbError::UniqueViolation {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// `table.column` named in a SQLite constraint message.
fn constraint_column(message: &str) -> String {
    message
        .rsplit(": ")
        .next()
        .filter(|column| !column.is_empty() && *column != message)
        .unwrap_or("unknown")
        .to_string()
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Database(db_err) => match db_err.kind() {
                ErrorKind::UniqueViolation => DbError::UniqueViolation {
                    field: constraint_column(db_err.message()),
                    value: "unknown".to_string(),
                },
                ErrorKind::ForeignKeyViolation => DbError::ForeignKeyViolation {
                    message: db_err.message().to_string(),
                },
                _ => DbError::QueryFailed(db_err.message().to_string()),
            },
            sqlx::Error::RowNotFound => DbError::not_found("Record", "unknown"),
            sqlx::Error::PoolTimedOut => DbError::PoolExhausted,
            sqlx::Error::PoolClosed => DbError::ConnectionFailed("pool is closed".to_string()),
            other => DbError::Internal(other.to_string()),
        }
    }
}

impl From<sqlx::migrate::MigrateError> for DbError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        DbError::MigrationFailed(err.to_string())
    }
}

/// Result type for database operations.
pub type DbResult<T> = Result<T, DbError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constraint_column() {
        assert_eq!(
            constraint_column("UNIQUE constraint failed: quotes.quote_number"),
            "quotes.quote_number"
        );
        assert_eq!(constraint_column("FOREIGN KEY constraint failed"), "unknown");
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(DbError::not_found("Quote", 12).to_string(), "Quote not found: 12");
        assert_eq!(
            DbError::duplicate("quotes.quote_number", "ABCDEFGH").to_string(),
            "quotes.quote_number 'ABCDEFGH' is already in use"
        );
    }
}
