//! Data models
//!
//! Shared between the API server and its clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (PostgreSQL BIGSERIAL); timestamps are epoch millis.

pub mod account;
pub mod menu;
pub mod page;
pub mod reservation;

// Re-exports
pub use account::*;
pub use menu::*;
pub use page::*;
pub use reservation::*;
