//! Error category classification

use super::codes::ErrorCode;
use serde::{Deserialize, Serialize};

/// Error category classification based on error code ranges
///
/// - 0xxx: General errors
/// - 1xxx: Authentication errors
/// - 2xxx: Permission errors
/// - 3xxx: Account errors
/// - 6xxx: Menu errors
/// - 7xxx: Reservation errors
/// - 9xxx: System errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    General,
    Auth,
    Permission,
    Account,
    Menu,
    Reservation,
    System,
}

impl ErrorCategory {
    /// Determine category from error code value
    pub fn from_code(code: u16) -> Self {
        match code {
            0..1000 => Self::General,
            1000..2000 => Self::Auth,
            2000..3000 => Self::Permission,
            3000..4000 => Self::Account,
            6000..7000 => Self::Menu,
            7000..8000 => Self::Reservation,
            _ => Self::System,
        }
    }

    /// Get the string name for this category
    pub fn name(&self) -> &'static str {
        match self {
            Self::General => "general",
            Self::Auth => "auth",
            Self::Permission => "permission",
            Self::Account => "account",
            Self::Menu => "menu",
            Self::Reservation => "reservation",
            Self::System => "system",
        }
    }
}

impl ErrorCode {
    /// Get the category for this error code
    pub fn category(&self) -> ErrorCategory {
        ErrorCategory::from_code(self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_ranges() {
        assert_eq!(ErrorCode::NotFound.category(), ErrorCategory::General);
        assert_eq!(ErrorCode::TokenInvalid.category(), ErrorCategory::Auth);
        assert_eq!(
            ErrorCode::AdminRequired.category(),
            ErrorCategory::Permission
        );
        assert_eq!(
            ErrorCode::EmailAlreadyRegistered.category(),
            ErrorCategory::Account
        );
        assert_eq!(ErrorCode::CategoryNotFound.category(), ErrorCategory::Menu);
        assert_eq!(
            ErrorCode::ReservationOutsideHours.category(),
            ErrorCategory::Reservation
        );
        assert_eq!(ErrorCode::DatabaseError.category(), ErrorCategory::System);
    }
}
