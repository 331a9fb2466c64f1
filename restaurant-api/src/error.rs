//! Storage-layer error type
//!
//! `StoreError` is what every `Store` implementation returns. Handlers use `?`
//! and the `From<StoreError> for AppError` conversion picks the client-facing
//! shape: unique violations become field errors, database failures become a
//! logged 500.

use axum::response::IntoResponse;
use shared::error::{AppError, ErrorCode};
use thiserror::Error;

/// Unique-constrained columns that can conflict on insert/update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    UserEmail,
    CategoryTitle,
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("unique constraint violated: {0:?}")]
    Conflict(UniqueField),

    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration failed: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<StoreError> for AppError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::Conflict(UniqueField::UserEmail) => {
                AppError::field_default(ErrorCode::EmailAlreadyRegistered, "email")
            }
            StoreError::Conflict(UniqueField::CategoryTitle) => {
                AppError::field_default(ErrorCode::CategoryTitleExists, "title")
            }
            StoreError::NotFound => AppError::not_found(),
            StoreError::Database(err) => AppError::database(err.to_string()),
            StoreError::Migrate(err) => AppError::database(err.to_string()),
        }
    }
}

impl IntoResponse for StoreError {
    fn into_response(self) -> axum::response::Response {
        AppError::from(self).into_response()
    }
}

/// Map a unique violation to `Conflict`, anything else to `Database`
pub(crate) fn map_unique(err: sqlx::Error, field: UniqueField) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(field),
        _ => StoreError::Database(err),
    }
}
