//! Error types for the circulation core

use chrono::NaiveDate;
use thiserror::Error;

/// Stable numeric error codes exposed to the calling layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Failure = 1,
    DbFailure = 3,
    NoSuchData = 4,
    BadValue = 5,
    Duplicate = 8,
    InvalidDateRange = 10,
    AlreadyReturned = 11,
    StorageConflict = 12,
    NotBorrowable = 13,
}

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// The return date precedes the checkout date
    #[error("Invalid date range: return date {return_date} precedes checkout date {checkout_date}")]
    InvalidDateRange {
        checkout_date: NaiveDate,
        return_date: NaiveDate,
    },

    /// A return already exists for this checkout
    #[error("Checkout {checkout_id} has already been returned")]
    DuplicateReturn { checkout_id: i32 },

    /// A storage uniqueness constraint was hit by a concurrent writer.
    /// Callers should re-fetch the return/penalty state instead of
    /// replaying the insert.
    #[error("Persistence conflict: {0}")]
    PersistenceConflict(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Business rule violation: {0}")]
    BusinessRule(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Numeric code for this error
    pub fn code(&self) -> ErrorCode {
        match self {
            AppError::NotFound(_) => ErrorCode::NoSuchData,
            AppError::Validation(_) => ErrorCode::BadValue,
            AppError::InvalidDateRange { .. } => ErrorCode::InvalidDateRange,
            AppError::DuplicateReturn { .. } => ErrorCode::AlreadyReturned,
            AppError::PersistenceConflict(_) => ErrorCode::StorageConflict,
            AppError::Conflict(_) => ErrorCode::Duplicate,
            AppError::BusinessRule(_) => ErrorCode::NotBorrowable,
            AppError::Database(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }

    /// Whether the caller may retry after re-reading current state
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::PersistenceConflict(_))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::Validation(errors.to_string())
    }
}

/// Turn a unique-constraint violation into the error built by `on_conflict`
/// (which receives the constraint name); any other failure stays a database error.
pub fn unique_violation_or(
    err: sqlx::Error,
    on_conflict: impl FnOnce(String) -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let constraint = db_err.constraint().unwrap_or("unique constraint").to_string();
            return on_conflict(constraint);
        }
    }
    AppError::Database(err)
}

/// Turn a foreign-key violation into the error built by `on_missing`
/// (which receives the constraint name); any other failure stays a database error.
pub fn foreign_key_violation_or(
    err: sqlx::Error,
    on_missing: impl FnOnce(String) -> AppError,
) -> AppError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_foreign_key_violation() {
            let constraint = db_err.constraint().unwrap_or("foreign key").to_string();
            return on_missing(constraint);
        }
    }
    AppError::Database(err)
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
