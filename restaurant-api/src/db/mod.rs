//! Database access layer
//!
//! [`Store`] is the persistence seam. [`PgStore`] is used whenever
//! `DATABASE_URL` is configured; [`MemoryStore`] backs development runs and
//! the test suite.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use shared::models::{
    Category, MenuItem, MenuItemWrite, Profile, ProfileUpdate, Reservation, ReservationCreate, User,
};

use crate::error::StoreResult;

/// New user row; the profile is created alongside it
#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub password_hash: String,
    pub is_verified: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
}

/// Sort order for menu item listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MenuOrdering {
    CreatedAsc,
    #[default]
    CreatedDesc,
    PriceAsc,
    PriceDesc,
}

impl MenuOrdering {
    /// Parse the `ordering` query value
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "created_date" => Some(Self::CreatedAsc),
            "-created_date" => Some(Self::CreatedDesc),
            "price" => Some(Self::PriceAsc),
            "-price" => Some(Self::PriceDesc),
            _ => None,
        }
    }

    fn sql(&self) -> &'static str {
        match self {
            Self::CreatedAsc => "m.created_date ASC, m.id ASC",
            Self::CreatedDesc => "m.created_date DESC, m.id DESC",
            Self::PriceAsc => "m.price ASC, m.id ASC",
            Self::PriceDesc => "m.price DESC, m.id DESC",
        }
    }
}

/// Menu item listing filter
#[derive(Debug, Clone, Default)]
pub struct MenuFilter {
    /// Hide drafts
    pub published_only: bool,
    /// Only items linked to this category
    pub category: Option<i64>,
    /// Case-insensitive match on description or category title
    pub search: Option<String>,
    pub ordering: MenuOrdering,
}

/// Category listing filter
#[derive(Debug, Clone, Default)]
pub struct CategoryFilter {
    /// Case-insensitive match on title
    pub search: Option<String>,
    /// Order by title descending instead of ascending
    pub descending: bool,
}

#[async_trait]
pub trait Store: Send + Sync {
    // ── Users ──

    /// Insert a user and its empty profile
    async fn create_user(&self, user: NewUser) -> StoreResult<User>;
    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>>;
    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>>;
    async fn set_verified(&self, id: i64) -> StoreResult<()>;
    async fn update_password(&self, id: i64, password_hash: &str) -> StoreResult<()>;
    async fn list_users(&self) -> StoreResult<Vec<User>>;

    // ── Profiles ──

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<Profile>>;
    /// Apply the set fields of `update`; unset fields are left alone
    async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> StoreResult<Profile>;

    // ── Categories ──

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>>;
    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>>;
    async fn create_category(&self, title: &str) -> StoreResult<Category>;
    async fn update_category(&self, id: i64, title: &str) -> StoreResult<Category>;
    /// Returns `false` when nothing was deleted
    async fn delete_category(&self, id: i64) -> StoreResult<bool>;

    // ── Menu items ──

    async fn list_menu_items(&self, filter: &MenuFilter) -> StoreResult<Vec<MenuItem>>;
    async fn get_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>>;
    async fn create_menu_item(&self, author_id: i64, item: &MenuItemWrite)
    -> StoreResult<MenuItem>;
    async fn update_menu_item(&self, id: i64, item: &MenuItemWrite) -> StoreResult<MenuItem>;
    async fn delete_menu_item(&self, id: i64) -> StoreResult<bool>;

    // ── Reservations ──

    async fn create_reservation(
        &self,
        user_id: i64,
        reservation: &ReservationCreate,
    ) -> StoreResult<Reservation>;
    async fn list_reservations_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>>;
    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>>;
    async fn get_reservation(&self, id: i64) -> StoreResult<Option<Reservation>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_menu_ordering_parse() {
        assert_eq!(MenuOrdering::parse("price"), Some(MenuOrdering::PriceAsc));
        assert_eq!(MenuOrdering::parse("-price"), Some(MenuOrdering::PriceDesc));
        assert_eq!(
            MenuOrdering::parse("created_date"),
            Some(MenuOrdering::CreatedAsc)
        );
        assert_eq!(MenuOrdering::parse("title"), None);
        assert_eq!(MenuOrdering::default(), MenuOrdering::CreatedDesc);
    }
}
