//! Password hashing and small helpers

pub use shared::util::{normalize_email, now_millis};

pub fn hash_password(password: &str) -> Result<String, argon2::password_hash::Error> {
    use argon2::password_hash::SaltString;
    use argon2::password_hash::rand_core::OsRng;
    use argon2::{Argon2, PasswordHasher};
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

/// Minutes east of UTC applied to the current time, as a calendar date
pub fn today_at_offset(offset_minutes: i32) -> chrono::NaiveDate {
    (chrono::Utc::now() + chrono::Duration::minutes(i64::from(offset_minutes))).date_naive()
}
