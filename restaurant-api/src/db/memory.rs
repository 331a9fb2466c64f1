//! In-memory store
//!
//! Backs development runs without `DATABASE_URL` and the integration tests.
//! A single `RwLock` guards all tables, so every write is atomic.

use async_trait::async_trait;
use shared::models::{
    Category, MenuItem, MenuItemWrite, Profile, ProfileUpdate, Reservation, ReservationCreate, User,
};
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

use super::{CategoryFilter, MenuFilter, MenuOrdering, NewUser, Store};
use crate::error::{StoreError, StoreResult, UniqueField};
use crate::util::now_millis;

#[derive(Default)]
struct Tables {
    next_id: i64,
    users: BTreeMap<i64, User>,
    profiles: HashMap<i64, Profile>,
    categories: BTreeMap<i64, Category>,
    /// Menu items with an empty `categories`, links live in `item_categories`
    menu_items: BTreeMap<i64, MenuItem>,
    item_categories: HashMap<i64, Vec<i64>>,
    reservations: BTreeMap<i64, ReservationRow>,
}

struct ReservationRow {
    id: i64,
    user_id: i64,
    date: chrono::NaiveDate,
    time: chrono::NaiveTime,
    people: i32,
    created_at: i64,
}

impl Tables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn with_categories(&self, item: &MenuItem) -> MenuItem {
        let mut item = item.clone();
        item.categories = self
            .item_categories
            .get(&item.id)
            .map(|ids| {
                ids.iter()
                    .filter_map(|id| self.categories.get(id).cloned())
                    .collect()
            })
            .unwrap_or_default();
        item
    }

    fn reservation(&self, row: &ReservationRow) -> Reservation {
        Reservation {
            id: row.id,
            user_id: row.user_id,
            email: self
                .users
                .get(&row.user_id)
                .map(|u| u.email.clone())
                .unwrap_or_default(),
            date: row.date,
            time: row.time,
            people: row.people,
            created_at: row.created_at,
        }
    }

    fn title_taken(&self, title: &str, except: Option<i64>) -> bool {
        self.categories
            .values()
            .any(|c| c.title == title && Some(c.id) != except)
    }

    /// Keep only ids of existing categories, in request order, without duplicates
    fn link_categories(&mut self, item_id: i64, ids: &[i64]) {
        let mut linked: Vec<i64> = Vec::with_capacity(ids.len());
        for id in ids {
            if self.categories.contains_key(id) && !linked.contains(id) {
                linked.push(*id);
            }
        }
        self.item_categories.insert(item_id, linked);
    }
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(needle)
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let mut t = self.tables.write().await;
        if t.users.values().any(|u| u.email == user.email) {
            return Err(StoreError::Conflict(UniqueField::UserEmail));
        }
        let now = now_millis();
        let id = t.next_id();
        let row = User {
            id,
            email: user.email,
            password_hash: user.password_hash,
            is_verified: user.is_verified,
            is_staff: user.is_staff,
            is_superuser: user.is_superuser,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        t.users.insert(id, row.clone());
        t.profiles.insert(
            id,
            Profile {
                user_id: id,
                created_at: now,
                updated_at: now,
                ..Default::default()
            },
        );
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let t = self.tables.read().await;
        Ok(t.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }

    async fn set_verified(&self, id: i64) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        if !user.is_verified {
            user.is_verified = true;
            user.updated_at = now_millis();
        }
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> StoreResult<()> {
        let mut t = self.tables.write().await;
        let user = t.users.get_mut(&id).ok_or(StoreError::NotFound)?;
        user.password_hash = password_hash.to_string();
        // Strictly increasing so tokens stamped with the old value stop matching
        user.updated_at = now_millis().max(user.updated_at + 1);
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(self.tables.read().await.users.values().cloned().collect())
    }

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<Profile>> {
        Ok(self.tables.read().await.profiles.get(&user_id).cloned())
    }

    async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> StoreResult<Profile> {
        let mut t = self.tables.write().await;
        let profile = t.profiles.get_mut(&user_id).ok_or(StoreError::NotFound)?;
        if let Some(first_name) = &update.first_name {
            profile.first_name = first_name.clone();
        }
        if let Some(last_name) = &update.last_name {
            profile.last_name = last_name.clone();
        }
        if let Some(phone_number) = &update.phone_number {
            profile.phone_number = phone_number.clone();
        }
        if let Some(image) = &update.image {
            profile.image = (!image.is_empty()).then(|| image.clone());
        }
        profile.updated_at = now_millis();
        Ok(profile.clone())
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>> {
        let t = self.tables.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let mut categories: Vec<Category> = t
            .categories
            .values()
            .filter(|c| needle.as_deref().is_none_or(|n| contains_ci(&c.title, n)))
            .cloned()
            .collect();
        // Lower-cased code-point order, as PgStore sorts with COLLATE "C"
        categories.sort_by_cached_key(|c| (c.title.to_lowercase(), c.id));
        if filter.descending {
            categories.reverse();
        }
        Ok(categories)
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(self.tables.read().await.categories.get(&id).cloned())
    }

    async fn create_category(&self, title: &str) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        if t.title_taken(title, None) {
            return Err(StoreError::Conflict(UniqueField::CategoryTitle));
        }
        let now = now_millis();
        let category = Category {
            id: t.next_id(),
            title: title.to_string(),
            created_at: now,
            updated_at: now,
        };
        t.categories.insert(category.id, category.clone());
        Ok(category)
    }

    async fn update_category(&self, id: i64, title: &str) -> StoreResult<Category> {
        let mut t = self.tables.write().await;
        if t.title_taken(title, Some(id)) {
            return Err(StoreError::Conflict(UniqueField::CategoryTitle));
        }
        let category = t.categories.get_mut(&id).ok_or(StoreError::NotFound)?;
        category.title = title.to_string();
        category.updated_at = now_millis();
        Ok(category.clone())
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        if t.categories.remove(&id).is_none() {
            return Ok(false);
        }
        for links in t.item_categories.values_mut() {
            links.retain(|c| *c != id);
        }
        Ok(true)
    }

    async fn list_menu_items(&self, filter: &MenuFilter) -> StoreResult<Vec<MenuItem>> {
        let t = self.tables.read().await;
        let needle = filter.search.as_deref().map(str::to_lowercase);

        let mut items: Vec<MenuItem> = t
            .menu_items
            .values()
            .filter(|item| !filter.published_only || item.is_published())
            .map(|item| t.with_categories(item))
            .filter(|item| {
                filter
                    .category
                    .is_none_or(|id| item.categories.iter().any(|c| c.id == id))
            })
            .filter(|item| {
                needle.as_deref().is_none_or(|n| {
                    contains_ci(&item.description, n)
                        || item.categories.iter().any(|c| contains_ci(&c.title, n))
                })
            })
            .collect();

        match filter.ordering {
            MenuOrdering::CreatedAsc => items.sort_by_key(|i| (i.created_date, i.id)),
            MenuOrdering::CreatedDesc => {
                items.sort_by_key(|i| std::cmp::Reverse((i.created_date, i.id)))
            }
            MenuOrdering::PriceAsc => items.sort_by_key(|i| (i.price, i.id)),
            MenuOrdering::PriceDesc => items.sort_by_key(|i| std::cmp::Reverse((i.price, i.id))),
        }
        Ok(items)
    }

    async fn get_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        let t = self.tables.read().await;
        Ok(t.menu_items.get(&id).map(|item| t.with_categories(item)))
    }

    async fn create_menu_item(
        &self,
        author_id: i64,
        item: &MenuItemWrite,
    ) -> StoreResult<MenuItem> {
        let mut t = self.tables.write().await;
        let now = now_millis();
        let id = t.next_id();
        let row = MenuItem {
            id,
            author_id,
            title: item.title.clone(),
            description: item.description.clone(),
            image: item.image.clone(),
            price: item.price,
            discount_percent: item.discount_percent,
            stock: item.stock,
            status: item.status,
            created_date: now,
            updated_date: now,
            categories: Vec::new(),
        };
        t.menu_items.insert(id, row);
        t.link_categories(id, &item.category_ids);
        let stored = &t.menu_items[&id];
        Ok(t.with_categories(stored))
    }

    async fn update_menu_item(&self, id: i64, item: &MenuItemWrite) -> StoreResult<MenuItem> {
        let mut t = self.tables.write().await;
        let row = t.menu_items.get_mut(&id).ok_or(StoreError::NotFound)?;
        row.title = item.title.clone();
        row.description = item.description.clone();
        row.image = item.image.clone();
        row.price = item.price;
        row.discount_percent = item.discount_percent;
        row.stock = item.stock;
        row.status = item.status;
        row.updated_date = now_millis();
        t.link_categories(id, &item.category_ids);
        let stored = &t.menu_items[&id];
        Ok(t.with_categories(stored))
    }

    async fn delete_menu_item(&self, id: i64) -> StoreResult<bool> {
        let mut t = self.tables.write().await;
        t.item_categories.remove(&id);
        Ok(t.menu_items.remove(&id).is_some())
    }

    async fn create_reservation(
        &self,
        user_id: i64,
        reservation: &ReservationCreate,
    ) -> StoreResult<Reservation> {
        let mut t = self.tables.write().await;
        if !t.users.contains_key(&user_id) {
            return Err(StoreError::NotFound);
        }
        let row = ReservationRow {
            id: t.next_id(),
            user_id,
            date: reservation.date,
            time: reservation.time,
            people: reservation.people,
            created_at: now_millis(),
        };
        let created = t.reservation(&row);
        t.reservations.insert(row.id, row);
        Ok(created)
    }

    async fn list_reservations_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Reservation> = t
            .reservations
            .values()
            .filter(|r| r.user_id == user_id)
            .map(|r| t.reservation(r))
            .collect();
        rows.sort_by_key(|r| (r.date, r.time, r.id));
        Ok(rows)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        let t = self.tables.read().await;
        let mut rows: Vec<Reservation> = t.reservations.values().map(|r| t.reservation(r)).collect();
        rows.sort_by_key(|r| (r.date, r.time, r.id));
        Ok(rows)
    }

    async fn get_reservation(&self, id: i64) -> StoreResult<Option<Reservation>> {
        let t = self.tables.read().await;
        Ok(t.reservations.get(&id).map(|r| t.reservation(r)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveTime};
    use shared::models::ProductStatus;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            email: email.to_string(),
            password_hash: "hash".to_string(),
            is_verified: true,
            is_staff: false,
            is_superuser: false,
        }
    }

    fn item(title: &str, description: &str, price: i64, status: ProductStatus, cats: Vec<i64>) -> MenuItemWrite {
        MenuItemWrite {
            title: title.to_string(),
            description: description.to_string(),
            image: None,
            price,
            discount_percent: 0,
            stock: 1,
            status,
            category_ids: cats,
        }
    }

    #[tokio::test]
    async fn test_user_gets_empty_profile() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        let profile = store.get_profile(user.id).await.unwrap().unwrap();
        assert_eq!(profile.user_id, user.id);
        assert!(!profile.is_complete());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = MemoryStore::new();
        store.create_user(new_user("a@example.com")).await.unwrap();
        let err = store
            .create_user(new_user("a@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(UniqueField::UserEmail)));
    }

    #[tokio::test]
    async fn test_update_password_bumps_updated_at() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        store.update_password(user.id, "new-hash").await.unwrap();
        let updated = store.find_user_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(updated.password_hash, "new-hash");
        assert!(updated.updated_at > user.updated_at);
    }

    #[tokio::test]
    async fn test_profile_partial_update() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("a@example.com")).await.unwrap();
        let update = ProfileUpdate {
            phone_number: Some("09120000000".to_string()),
            ..Default::default()
        };
        store.update_profile(user.id, &update).await.unwrap();
        let update = ProfileUpdate {
            first_name: Some("Sara".to_string()),
            ..Default::default()
        };
        let profile = store.update_profile(user.id, &update).await.unwrap();
        assert_eq!(profile.first_name, "Sara");
        assert_eq!(profile.phone_number, "09120000000");
    }

    #[tokio::test]
    async fn test_menu_filters() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("chef@example.com")).await.unwrap();
        let dessert = store.create_category("دسر").await.unwrap();
        let drinks = store.create_category("نوشیدنی").await.unwrap();

        store
            .create_menu_item(user.id, &item("cake", "Chocolate cake", 100, ProductStatus::Publish, vec![dessert.id]))
            .await
            .unwrap();
        store
            .create_menu_item(user.id, &item("tea", "Green tea", 20, ProductStatus::Publish, vec![drinks.id]))
            .await
            .unwrap();
        store
            .create_menu_item(user.id, &item("coffee", "Morning", 50, ProductStatus::Draft, vec![drinks.id]))
            .await
            .unwrap();

        let published = MenuFilter {
            published_only: true,
            ..Default::default()
        };
        assert_eq!(store.list_menu_items(&published).await.unwrap().len(), 2);

        let all = store.list_menu_items(&MenuFilter::default()).await.unwrap();
        assert_eq!(all.len(), 3);

        let by_category = MenuFilter {
            published_only: true,
            category: Some(drinks.id),
            ..Default::default()
        };
        let items = store.list_menu_items(&by_category).await.unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].title, "tea");

        let search = MenuFilter {
            search: Some("CHOCOLATE".to_string()),
            ..Default::default()
        };
        assert_eq!(store.list_menu_items(&search).await.unwrap()[0].title, "cake");

        let search_category = MenuFilter {
            search: Some("نوشیدنی".to_string()),
            ..Default::default()
        };
        assert_eq!(store.list_menu_items(&search_category).await.unwrap().len(), 2);

        let by_price = MenuFilter {
            ordering: MenuOrdering::PriceAsc,
            ..Default::default()
        };
        let prices: Vec<i64> = store
            .list_menu_items(&by_price)
            .await
            .unwrap()
            .iter()
            .map(|i| i.price)
            .collect();
        assert_eq!(prices, vec![20, 50, 100]);
    }

    #[tokio::test]
    async fn test_delete_category_unlinks_items() {
        let store = MemoryStore::new();
        let user = store.create_user(new_user("chef@example.com")).await.unwrap();
        let dessert = store.create_category("دسر").await.unwrap();
        let created = store
            .create_menu_item(user.id, &item("cake", "", 100, ProductStatus::Publish, vec![dessert.id, 999]))
            .await
            .unwrap();
        assert_eq!(created.categories.len(), 1);

        assert!(store.delete_category(dessert.id).await.unwrap());
        assert!(!store.delete_category(dessert.id).await.unwrap());
        let item = store.get_menu_item(created.id).await.unwrap().unwrap();
        assert!(item.categories.is_empty());
    }

    #[tokio::test]
    async fn test_category_title_unique() {
        let store = MemoryStore::new();
        let a = store.create_category("دسر").await.unwrap();
        assert!(store.create_category("دسر").await.is_err());
        let b = store.create_category("نوشیدنی").await.unwrap();
        assert!(matches!(
            store.update_category(b.id, "دسر").await,
            Err(StoreError::Conflict(UniqueField::CategoryTitle))
        ));
        // Renaming to its own title is fine
        assert!(store.update_category(a.id, "دسر").await.is_ok());
    }

    #[tokio::test]
    async fn test_category_order_ignores_case() {
        let store = MemoryStore::new();
        for title in ["Tea", "دسر", "coffee"] {
            store.create_category(title).await.unwrap();
        }
        let titles = |categories: Vec<Category>| -> Vec<String> {
            categories.into_iter().map(|c| c.title).collect()
        };

        let asc = store.list_categories(&CategoryFilter::default()).await.unwrap();
        assert_eq!(titles(asc), ["coffee", "Tea", "دسر"]);

        let filter = CategoryFilter {
            descending: true,
            ..Default::default()
        };
        let desc = store.list_categories(&filter).await.unwrap();
        assert_eq!(titles(desc), ["دسر", "Tea", "coffee"]);
    }

    #[tokio::test]
    async fn test_reservations_scoped_by_user() {
        let store = MemoryStore::new();
        let a = store.create_user(new_user("a@example.com")).await.unwrap();
        let b = store.create_user(new_user("b@example.com")).await.unwrap();
        let req = ReservationCreate {
            date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            time: NaiveTime::from_hms_opt(13, 0, 0).unwrap(),
            people: 2,
        };
        let created = store.create_reservation(a.id, &req).await.unwrap();
        assert_eq!(created.email, "a@example.com");
        store.create_reservation(a.id, &req).await.unwrap();
        store.create_reservation(b.id, &req).await.unwrap();

        assert_eq!(store.list_reservations_for_user(a.id).await.unwrap().len(), 2);
        assert_eq!(store.list_reservations().await.unwrap().len(), 3);
        assert_eq!(
            store.get_reservation(created.id).await.unwrap(),
            Some(created)
        );
    }
}
