//! PostgreSQL store (sqlx)

use async_trait::async_trait;
use shared::models::{
    Category, MenuItem, MenuItemWrite, Profile, ProfileUpdate, Reservation, ReservationCreate, User,
};
use sqlx::{PgPool, Postgres, QueryBuilder};
use std::collections::HashMap;

use super::{CategoryFilter, MenuFilter, NewUser, Store};
use crate::error::{StoreError, StoreResult, UniqueField, map_unique};
use crate::util::now_millis;

const RESERVATION_SELECT: &str = "SELECT r.id, r.user_id, u.email, r.date, r.time, r.people, r.created_at
     FROM reservations r JOIN users u ON u.id = r.user_id";

#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

/// Category joined with the menu item it is linked to
#[derive(sqlx::FromRow)]
struct CategoryLink {
    menu_item_id: i64,
    id: i64,
    title: String,
    created_at: i64,
    updated_at: i64,
}

impl PgStore {
    /// Connect and run pending migrations
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        let pool = PgPool::connect(database_url).await?;
        sqlx::migrate!("./migrations").run(&pool).await?;
        Ok(Self { pool })
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Fill `categories` on each item with one query
    async fn attach_categories(&self, items: &mut [MenuItem]) -> StoreResult<()> {
        if items.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = items.iter().map(|i| i.id).collect();
        let links: Vec<CategoryLink> = sqlx::query_as(
            "SELECT mic.menu_item_id, c.id, c.title, c.created_at, c.updated_at
             FROM menu_item_categories mic
             JOIN categories c ON c.id = mic.category_id
             WHERE mic.menu_item_id = ANY($1)
             ORDER BY c.title",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_item: HashMap<i64, Vec<Category>> = HashMap::new();
        for link in links {
            by_item.entry(link.menu_item_id).or_default().push(Category {
                id: link.id,
                title: link.title,
                created_at: link.created_at,
                updated_at: link.updated_at,
            });
        }
        for item in items.iter_mut() {
            item.categories = by_item.remove(&item.id).unwrap_or_default();
        }
        Ok(())
    }

    async fn replace_links(
        tx: &mut sqlx::Transaction<'_, Postgres>,
        item_id: i64,
        category_ids: &[i64],
    ) -> StoreResult<()> {
        sqlx::query("DELETE FROM menu_item_categories WHERE menu_item_id = $1")
            .bind(item_id)
            .execute(&mut **tx)
            .await?;
        if !category_ids.is_empty() {
            // Unknown ids are skipped by the join
            sqlx::query(
                "INSERT INTO menu_item_categories (menu_item_id, category_id)
                 SELECT $1, c.id FROM categories c WHERE c.id = ANY($2)
                 ON CONFLICT DO NOTHING",
            )
            .bind(item_id)
            .bind(category_ids)
            .execute(&mut **tx)
            .await?;
        }
        Ok(())
    }

    async fn fetch_menu_item(&self, id: i64) -> StoreResult<MenuItem> {
        let mut item: MenuItem = sqlx::query_as("SELECT * FROM menu_items WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;
        self.attach_categories(std::slice::from_mut(&mut item))
            .await?;
        Ok(item)
    }
}

#[async_trait]
impl Store for PgStore {
    async fn create_user(&self, user: NewUser) -> StoreResult<User> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let row: User = sqlx::query_as(
            "INSERT INTO users (email, password_hash, is_verified, is_staff, is_superuser, is_active, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, TRUE, $6, $6)
             RETURNING *",
        )
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.is_verified)
        .bind(user.is_staff)
        .bind(user.is_superuser)
        .bind(now)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| map_unique(e, UniqueField::UserEmail))?;

        sqlx::query("INSERT INTO profiles (user_id, created_at, updated_at) VALUES ($1, $2, $2)")
            .bind(row.id)
            .bind(now)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(row)
    }

    async fn find_user_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_user_by_id(&self, id: i64) -> StoreResult<Option<User>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn set_verified(&self, id: i64) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET is_verified = TRUE, updated_at = $2 WHERE id = $1 AND NOT is_verified",
        )
        .bind(id)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 && self.find_user_by_id(id).await?.is_none() {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn update_password(&self, id: i64, password_hash: &str) -> StoreResult<()> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $2, updated_at = GREATEST($3, updated_at + 1) WHERE id = $1",
        )
        .bind(id)
        .bind(password_hash)
        .bind(now_millis())
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn list_users(&self) -> StoreResult<Vec<User>> {
        Ok(sqlx::query_as("SELECT * FROM users ORDER BY id")
            .fetch_all(&self.pool)
            .await?)
    }

    async fn get_profile(&self, user_id: i64) -> StoreResult<Option<Profile>> {
        Ok(sqlx::query_as("SELECT * FROM profiles WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(&self, user_id: i64, update: &ProfileUpdate) -> StoreResult<Profile> {
        // Empty image string clears the column
        let image_set = update.image.is_some();
        let image = update.image.as_deref().filter(|s| !s.is_empty());
        let profile: Option<Profile> = sqlx::query_as(
            "UPDATE profiles SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                phone_number = COALESCE($4, phone_number),
                image = CASE WHEN $5 THEN $6 ELSE image END,
                updated_at = $7
             WHERE user_id = $1
             RETURNING *",
        )
        .bind(user_id)
        .bind(update.first_name.as_deref())
        .bind(update.last_name.as_deref())
        .bind(update.phone_number.as_deref())
        .bind(image_set)
        .bind(image)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await?;
        profile.ok_or(StoreError::NotFound)
    }

    async fn list_categories(&self, filter: &CategoryFilter) -> StoreResult<Vec<Category>> {
        let mut qb: QueryBuilder<Postgres> = QueryBuilder::new("SELECT * FROM categories");
        if let Some(search) = &filter.search {
            qb.push(" WHERE title ILIKE ").push_bind(like_pattern(search));
        }
        // Code-point order of the lower-cased title, same as MemoryStore
        qb.push(if filter.descending {
            r#" ORDER BY LOWER(title) COLLATE "C" DESC, id DESC"#
        } else {
            r#" ORDER BY LOWER(title) COLLATE "C" ASC, id ASC"#
        });
        Ok(qb.build_query_as().fetch_all(&self.pool).await?)
    }

    async fn get_category(&self, id: i64) -> StoreResult<Option<Category>> {
        Ok(sqlx::query_as("SELECT * FROM categories WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn create_category(&self, title: &str) -> StoreResult<Category> {
        let now = now_millis();
        sqlx::query_as(
            "INSERT INTO categories (title, created_at, updated_at) VALUES ($1, $2, $2) RETURNING *",
        )
        .bind(title)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique(e, UniqueField::CategoryTitle))
    }

    async fn update_category(&self, id: i64, title: &str) -> StoreResult<Category> {
        let row: Option<Category> = sqlx::query_as(
            "UPDATE categories SET title = $2, updated_at = $3 WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(title)
        .bind(now_millis())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_unique(e, UniqueField::CategoryTitle))?;
        row.ok_or(StoreError::NotFound)
    }

    async fn delete_category(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_menu_items(&self, filter: &MenuFilter) -> StoreResult<Vec<MenuItem>> {
        let mut qb: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT m.* FROM menu_items m WHERE TRUE");
        if filter.published_only {
            qb.push(" AND m.status = 'publish'");
        }
        if let Some(category) = filter.category {
            qb.push(
                " AND EXISTS (SELECT 1 FROM menu_item_categories mic
                   WHERE mic.menu_item_id = m.id AND mic.category_id = ",
            )
            .push_bind(category)
            .push(")");
        }
        if let Some(search) = &filter.search {
            let pattern = like_pattern(search);
            qb.push(" AND (m.description ILIKE ")
                .push_bind(pattern.clone())
                .push(
                    " OR EXISTS (SELECT 1 FROM menu_item_categories mic
                       JOIN categories c ON c.id = mic.category_id
                       WHERE mic.menu_item_id = m.id AND c.title ILIKE ",
                )
                .push_bind(pattern)
                .push("))");
        }
        qb.push(" ORDER BY ").push(filter.ordering.sql());

        let mut items: Vec<MenuItem> = qb.build_query_as().fetch_all(&self.pool).await?;
        self.attach_categories(&mut items).await?;
        Ok(items)
    }

    async fn get_menu_item(&self, id: i64) -> StoreResult<Option<MenuItem>> {
        match self.fetch_menu_item(id).await {
            Ok(item) => Ok(Some(item)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    async fn create_menu_item(
        &self,
        author_id: i64,
        item: &MenuItemWrite,
    ) -> StoreResult<MenuItem> {
        let now = now_millis();
        let mut tx = self.pool.begin().await?;
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO menu_items
                (author_id, title, description, image, price, discount_percent, stock, status, created_date, updated_date)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $9)
             RETURNING id",
        )
        .bind(author_id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.image.as_deref())
        .bind(item.price)
        .bind(item.discount_percent)
        .bind(item.stock)
        .bind(item.status.as_str())
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;
        Self::replace_links(&mut tx, id, &item.category_ids).await?;
        tx.commit().await?;
        self.fetch_menu_item(id).await
    }

    async fn update_menu_item(&self, id: i64, item: &MenuItemWrite) -> StoreResult<MenuItem> {
        let mut tx = self.pool.begin().await?;
        let result = sqlx::query(
            "UPDATE menu_items SET
                title = $2, description = $3, image = $4, price = $5,
                discount_percent = $6, stock = $7, status = $8, updated_date = $9
             WHERE id = $1",
        )
        .bind(id)
        .bind(&item.title)
        .bind(&item.description)
        .bind(item.image.as_deref())
        .bind(item.price)
        .bind(item.discount_percent)
        .bind(item.stock)
        .bind(item.status.as_str())
        .bind(now_millis())
        .execute(&mut *tx)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Self::replace_links(&mut tx, id, &item.category_ids).await?;
        tx.commit().await?;
        self.fetch_menu_item(id).await
    }

    async fn delete_menu_item(&self, id: i64) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM menu_items WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn create_reservation(
        &self,
        user_id: i64,
        reservation: &ReservationCreate,
    ) -> StoreResult<Reservation> {
        let (id,): (i64,) = sqlx::query_as(
            "INSERT INTO reservations (user_id, date, time, people, created_at)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING id",
        )
        .bind(user_id)
        .bind(reservation.date)
        .bind(reservation.time)
        .bind(reservation.people)
        .bind(now_millis())
        .fetch_one(&self.pool)
        .await?;
        self.get_reservation(id).await?.ok_or(StoreError::NotFound)
    }

    async fn list_reservations_for_user(&self, user_id: i64) -> StoreResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} WHERE r.user_id = $1 ORDER BY r.date, r.time, r.id");
        Ok(sqlx::query_as(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await?)
    }

    async fn list_reservations(&self) -> StoreResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} ORDER BY r.date, r.time, r.id");
        Ok(sqlx::query_as(&sql).fetch_all(&self.pool).await?)
    }

    async fn get_reservation(&self, id: i64) -> StoreResult<Option<Reservation>> {
        let sql = format!("{RESERVATION_SELECT} WHERE r.id = $1");
        Ok(sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }
}

/// `%term%` with LIKE wildcards in the term escaped
fn like_pattern(term: &str) -> String {
    let escaped = term
        .trim()
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern(" cake "), "%cake%");
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
