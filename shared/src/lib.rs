//! Shared types for the restaurant backend
//!
//! Error types, DTOs and domain rules used by the API server and by any
//! Rust client talking to it.

pub mod error;
pub mod models;
pub mod reservation;
pub mod util;

// Re-exports
pub use axum::Json;
pub use error::{AppError, AppResult, ErrorBody, ErrorCode};
pub use http;
pub use serde::{Deserialize, Serialize};
