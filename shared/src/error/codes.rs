//! Unified error codes
//!
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: Account errors
//! - 6xxx: Menu errors
//! - 7xxx: Reservation errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// Represented as u16 values so they serialize compactly and can be shared
/// with non-Rust clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Malformed request (bad JSON, wrong content type)
    InvalidRequest = 5,
    /// HTTP method not allowed on this route
    MethodNotAllowed = 6,
    /// Requested page does not exist
    InvalidPage = 7,

    // ==================== 1xxx: Auth ====================
    /// No credentials were provided
    NotAuthenticated = 1001,
    /// Invalid email/password
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Rate limit exceeded
    TooManyRequests = 1008,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Staff role required
    AdminRequired = 2003,

    // ==================== 3xxx: Account ====================
    /// Email already registered
    EmailAlreadyRegistered = 3001,
    /// Email not verified yet
    EmailNotVerified = 3002,
    /// Password and its confirmation differ
    PasswordMismatch = 3003,
    /// Password shorter than the minimum length
    PasswordTooShort = 3004,
    /// Current password is wrong
    WrongPassword = 3005,
    /// No user with the given email
    UserNotFound = 3006,
    /// Profile is missing required data
    ProfileIncomplete = 3007,
    /// Email link token invalid or expired
    LinkTokenInvalid = 3008,

    // ==================== 6xxx: Menu ====================
    /// Menu item not found
    MenuItemNotFound = 6001,
    /// Category not found
    CategoryNotFound = 6101,
    /// Category title already exists
    CategoryTitleExists = 6102,

    // ==================== 7xxx: Reservation ====================
    /// Reservation not found
    ReservationNotFound = 7001,
    /// Reservation date is before today
    ReservationDateInPast = 7002,
    /// Reservation time outside opening hours
    ReservationOutsideHours = 7003,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Default client-facing message (Persian)
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "عملیات با موفقیت انجام شد.",
            ErrorCode::Unknown => "خطای ناشناخته رخ داد.",
            ErrorCode::ValidationFailed => "داده‌های ارسالی نامعتبر است.",
            ErrorCode::NotFound => "یافت نشد.",
            ErrorCode::AlreadyExists => "این مورد از قبل وجود دارد.",
            ErrorCode::InvalidRequest => "درخواست نامعتبر است.",
            ErrorCode::MethodNotAllowed => "متد مجاز نیست.",
            ErrorCode::InvalidPage => "صفحه نامعتبر.",

            // Auth
            ErrorCode::NotAuthenticated => "اطلاعات برای اعتبارسنجی ارسال نشده است.",
            ErrorCode::InvalidCredentials => "ایمیل یا رمز عبور اشتباه است.",
            ErrorCode::TokenExpired => "توکن منقضی شده است.",
            ErrorCode::TokenInvalid => "توکن نامعتبر است.",
            ErrorCode::AccountDisabled => "حساب کاربری غیرفعال است.",
            ErrorCode::TooManyRequests => {
                "تعداد درخواست‌ها بیش از حد مجاز است. لطفاً بعداً تلاش کنید."
            }

            // Permission
            ErrorCode::PermissionDenied => "شما اجازه انجام این عمل را ندارید.",
            ErrorCode::AdminRequired => "شما اجازه انجام این عمل را ندارید.",

            // Account
            ErrorCode::EmailAlreadyRegistered => "کاربری با این ایمیل قبلاً ثبت‌نام کرده است.",
            ErrorCode::EmailNotVerified => "حساب کاربری شما تأیید نشده است.",
            ErrorCode::PasswordMismatch => "رمز عبور و تکرار آن یکسان نیستند.",
            ErrorCode::PasswordTooShort => "رمز عبور باید حداقل ۸ کاراکتر باشد.",
            ErrorCode::WrongPassword => "رمز عبور فعلی اشتباه است.",
            ErrorCode::UserNotFound => "کاربری با این ایمیل یافت نشد.",
            ErrorCode::ProfileIncomplete => {
                "پروفایل شما کامل نیست. لطفاً شماره تلفن خود را وارد کنید."
            }
            ErrorCode::LinkTokenInvalid => "توکن نامعتبر است یا منقضی شده است.",

            // Menu
            ErrorCode::MenuItemNotFound => "آیتم منو یافت نشد.",
            ErrorCode::CategoryNotFound => "دسته‌بندی یافت نشد.",
            ErrorCode::CategoryTitleExists => "دسته‌بندی با این عنوان وجود دارد.",

            // Reservation
            ErrorCode::ReservationNotFound => "رزرو یافت نشد.",
            ErrorCode::ReservationDateInPast => "تاریخ رزرو نمی‌تواند در گذشته باشد",
            ErrorCode::ReservationOutsideHours => "رزرو فقط بین ساعت 12 تا 22 ممکن است",

            // System
            ErrorCode::InternalError => "خطای داخلی سرور.",
            ErrorCode::DatabaseError => "خطای پایگاه داده.",
            ErrorCode::ConfigError => "خطای پیکربندی.",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "E{:04}", self.code())
    }
}

impl From<ErrorCode> for u16 {
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 into [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid error code: {0}")]
pub struct InvalidErrorCode(pub u16);

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        let code = match value {
            0 => ErrorCode::Success,
            1 => ErrorCode::Unknown,
            2 => ErrorCode::ValidationFailed,
            3 => ErrorCode::NotFound,
            4 => ErrorCode::AlreadyExists,
            5 => ErrorCode::InvalidRequest,
            6 => ErrorCode::MethodNotAllowed,
            7 => ErrorCode::InvalidPage,
            1001 => ErrorCode::NotAuthenticated,
            1002 => ErrorCode::InvalidCredentials,
            1003 => ErrorCode::TokenExpired,
            1004 => ErrorCode::TokenInvalid,
            1007 => ErrorCode::AccountDisabled,
            1008 => ErrorCode::TooManyRequests,
            2001 => ErrorCode::PermissionDenied,
            2003 => ErrorCode::AdminRequired,
            3001 => ErrorCode::EmailAlreadyRegistered,
            3002 => ErrorCode::EmailNotVerified,
            3003 => ErrorCode::PasswordMismatch,
            3004 => ErrorCode::PasswordTooShort,
            3005 => ErrorCode::WrongPassword,
            3006 => ErrorCode::UserNotFound,
            3007 => ErrorCode::ProfileIncomplete,
            3008 => ErrorCode::LinkTokenInvalid,
            6001 => ErrorCode::MenuItemNotFound,
            6101 => ErrorCode::CategoryNotFound,
            6102 => ErrorCode::CategoryTitleExists,
            7001 => ErrorCode::ReservationNotFound,
            7002 => ErrorCode::ReservationDateInPast,
            7003 => ErrorCode::ReservationOutsideHours,
            9001 => ErrorCode::InternalError,
            9002 => ErrorCode::DatabaseError,
            9005 => ErrorCode::ConfigError,
            other => return Err(InvalidErrorCode(other)),
        };
        Ok(code)
    }
}
