//! Unified error system for the restaurant API
//!
//! This module provides:
//! - [`ErrorCode`]: Standardized error codes for all error types
//! - [`ErrorCategory`]: Classification of errors by domain
//! - [`AppError`]: Error type carrying a code and a client-facing body
//! - [`ErrorBody`]: The JSON shape returned to clients
//!
//! # Error Code Ranges
//!
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 6xxx: Menu errors
//! - 7xxx: Reservation errors
//! - 9xxx: System errors
//!
//! # Response bodies
//!
//! Bodies follow the shape web clients of this API already parse:
//!
//! ```json
//! {"detail": "یافت نشد."}
//! {"email": ["کاربری با این ایمیل قبلاً ثبت‌نام کرده است."]}
//! {"non_field_errors": ["رزرو فقط بین ساعت 12 تا 22 ممکن است"]}
//! ["پروفایل شما کامل نیست. لطفاً شماره تلفن خود را وارد کنید."]
//! ```
//!
//! # Example
//!
//! ```
//! use shared::error::{AppError, ErrorCode};
//!
//! let err = AppError::new(ErrorCode::NotFound);
//! let err = AppError::field(ErrorCode::EmailAlreadyRegistered, "email", "duplicate");
//! let err = AppError::non_field(ErrorCode::ReservationDateInPast, "past");
//! ```

mod category;
mod codes;
mod http;
mod types;

pub use category::ErrorCategory;
pub use codes::{ErrorCode, InvalidErrorCode};
pub use types::{AppError, AppResult, ErrorBody, NON_FIELD_ERRORS};
