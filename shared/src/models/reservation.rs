//! Reservation Models

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// Largest party a single reservation may seat
pub const MAX_PARTY_SIZE: i32 = 20;

/// Reservation entity, joined with the owner's email
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Reservation {
    pub id: i64,
    pub user_id: i64,
    pub email: String,
    pub date: NaiveDate,
    pub time: NaiveTime,
    pub people: i32,
    pub created_at: i64,
}

/// Create reservation payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ReservationCreate {
    pub date: NaiveDate,
    #[serde(deserialize_with = "deserialize_time")]
    pub time: NaiveTime,
    #[validate(range(min = 1, max = 20, message = "تعداد نفرات باید بین ۱ تا ۲۰ باشد."))]
    pub people: i32,
}

/// Accepts `HH:MM:SS[.fff]` as well as `HH:MM`
fn deserialize_time<'de, D>(deserializer: D) -> Result<NaiveTime, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_time(&raw).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid time `{raw}`, expected HH:MM[:SS]"
        ))
    })
}

pub fn parse_time(raw: &str) -> Option<NaiveTime> {
    let raw = raw.trim();
    NaiveTime::parse_from_str(raw, "%H:%M:%S%.f")
        .or_else(|_| NaiveTime::parse_from_str(raw, "%H:%M"))
        .ok()
}
