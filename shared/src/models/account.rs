//! User and Profile Models

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Maximum length of first/last names
pub const MAX_NAME_LEN: u64 = 50;

/// User account
///
/// Never serialized directly: it carries the password hash. Use [`UserView`].
#[derive(Debug, Clone)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    /// Staff and superusers may use the admin dashboard and edit the menu
    pub fn is_admin(&self) -> bool {
        self.is_staff || self.is_superuser
    }
}

/// User as listed in the admin dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserView {
    pub id: i64,
    pub email: String,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub is_active: bool,
    pub created_at: i64,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            email: user.email.clone(),
            is_verified: user.is_verified,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: user.is_active,
            created_at: user.created_at,
        }
    }
}

/// Profile entity, one per user, created together with the user
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Profile {
    pub user_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub image: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Profile {
    /// A profile is complete once it has a phone number
    pub fn is_complete(&self) -> bool {
        !self.phone_number.trim().is_empty()
    }
}

/// Profile as returned to its owner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileView {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
    pub image: Option<String>,
}

impl ProfileView {
    pub fn new(user: &User, profile: &Profile) -> Self {
        Self {
            email: user.email.clone(),
            first_name: profile.first_name.clone(),
            last_name: profile.last_name.clone(),
            phone_number: profile.phone_number.clone(),
            image: profile.image.clone(),
        }
    }
}

/// Update profile payload (PUT and PATCH)
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ProfileUpdate {
    #[validate(length(max = 50, message = "نام نباید بیشتر از ۵۰ کاراکتر باشد."))]
    pub first_name: Option<String>,
    #[validate(length(max = 50, message = "نام خانوادگی نباید بیشتر از ۵۰ کاراکتر باشد."))]
    pub last_name: Option<String>,
    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: Option<String>,
    #[validate(length(max = 2048, message = "آدرس تصویر بیش از حد طولانی است."))]
    pub image: Option<String>,
}

/// Iranian mobile numbers: `09` followed by nine digits. Empty clears the number.
pub fn validate_phone_number(phone: &str) -> Result<(), ValidationError> {
    if phone.is_empty() {
        return Ok(());
    }
    let valid =
        phone.len() == 11 && phone.starts_with("09") && phone.chars().all(|c| c.is_ascii_digit());
    if valid {
        Ok(())
    } else {
        Err(ValidationError::new("phone_number")
            .with_message("شماره تلفن باید با ۰۹ شروع شود و ۱۱ رقم باشد.".into()))
    }
}
