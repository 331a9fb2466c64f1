//! Reservation rules
//!
//! Checks that run after field validation and before anything is stored.

use crate::error::{AppError, ErrorCode, NON_FIELD_ERRORS};
use chrono::{NaiveDate, NaiveTime};

/// First bookable time of day
pub const OPENING_TIME: NaiveTime = match NaiveTime::from_hms_opt(12, 0, 0) {
    Some(t) => t,
    None => panic!("invalid opening time"),
};

/// Last bookable time of day (inclusive)
pub const CLOSING_TIME: NaiveTime = match NaiveTime::from_hms_opt(22, 0, 0) {
    Some(t) => t,
    None => panic!("invalid closing time"),
};

/// Check the requested slot against `today` and opening hours
///
/// Both violations are reported together under `non_field_errors`, the date
/// message first.
pub fn validate_slot(date: NaiveDate, time: NaiveTime, today: NaiveDate) -> Result<(), AppError> {
    let mut error: Option<AppError> = None;

    if date < today {
        error = Some(AppError::non_field(
            ErrorCode::ReservationDateInPast,
            ErrorCode::ReservationDateInPast.message(),
        ));
    }

    if !(OPENING_TIME..=CLOSING_TIME).contains(&time) {
        let message = ErrorCode::ReservationOutsideHours.message();
        error = Some(match error {
            Some(err) => err.with_field(NON_FIELD_ERRORS, message),
            None => AppError::non_field(ErrorCode::ReservationOutsideHours, message),
        });
    }

    match error {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

/// A reservation needs a phone number on the profile
pub fn ensure_profile_complete(phone_number: Option<&str>) -> Result<(), AppError> {
    match phone_number {
        Some(phone) if !phone.trim().is_empty() => Ok(()),
        _ => Err(AppError::list(
            ErrorCode::ProfileIncomplete,
            ErrorCode::ProfileIncomplete.message(),
        )),
    }
}
