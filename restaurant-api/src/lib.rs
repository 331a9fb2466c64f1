//! Restaurant API server
//!
//! # Module layout
//!
//! ```text
//! restaurant-api/src/
//! ├── config.rs    # Environment configuration
//! ├── logger.rs    # tracing setup, security log macro
//! ├── state.rs     # AppState
//! ├── error.rs     # StoreError
//! ├── db/          # Store trait, PostgreSQL and in-memory stores
//! ├── auth/        # JWT, extractors, rate limiting
//! ├── email/       # Email queue, SES and log mailers
//! └── api/         # HTTP routes and handlers
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod logger;
pub mod state;
pub mod util;

pub use api::build_app;
pub use config::Config;
pub use logger::init_logger;
pub use state::AppState;
