//! Menu Models: categories and menu items

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Publication state of a menu item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductStatus {
    #[default]
    Draft,
    Publish,
}

impl ProductStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Publish => "publish",
        }
    }
}

impl TryFrom<String> for ProductStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            other => Err(format!("unknown product status: {other}")),
        }
    }
}

/// Category entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create/replace category payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CategoryWrite {
    #[validate(length(min = 1, max = 100, message = "عنوان باید بین ۱ تا ۱۰۰ کاراکتر باشد."))]
    pub title: String,
}

/// Partial category update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct CategoryPatch {
    #[validate(length(min = 1, max = 100, message = "عنوان باید بین ۱ تا ۱۰۰ کاراکتر باشد."))]
    pub title: Option<String>,
}

/// Menu item entity
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct MenuItem {
    pub id: i64,
    pub author_id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    /// Price in the smallest currency unit
    pub price: i64,
    pub discount_percent: i32,
    pub stock: i32,
    #[cfg_attr(feature = "db", sqlx(try_from = "String"))]
    pub status: ProductStatus,
    pub created_date: i64,
    pub updated_date: i64,

    // -- Relations (populated by application code, skipped by FromRow) --
    #[cfg_attr(feature = "db", sqlx(skip))]
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl MenuItem {
    /// Price after discount, rounded down
    pub fn final_price(&self) -> i64 {
        final_price(self.price, self.discount_percent)
    }

    pub fn is_available(&self) -> bool {
        self.stock > 0
    }

    pub fn is_published(&self) -> bool {
        self.status == ProductStatus::Publish
    }
}

/// Largest accepted price, in the smallest currency unit
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// `price * (100 - discount) / 100` with the discount clamped to 0..=100
///
/// Computed in `i128`; the result never exceeds `price`, so it fits back.
pub fn final_price(price: i64, discount_percent: i32) -> i64 {
    let discount = i128::from(discount_percent.clamp(0, 100));
    let discounted = i128::from(price) * (100 - discount) / 100;
    i64::try_from(discounted).unwrap_or(price)
}

/// Menu item as returned by the public API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MenuItemView {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub image: Option<String>,
    pub price: i64,
    pub discount_percent: i32,
    pub final_price: i64,
    pub stock: i32,
    pub is_available: bool,
    pub status: ProductStatus,
    pub categories: Vec<Category>,
    pub detail_link: String,
    pub created_date: i64,
    pub updated_date: i64,
}

impl MenuItemView {
    /// Build the view; `detail_link` is `{items_url}{id}/`
    pub fn new(item: MenuItem, items_url: &str) -> Self {
        Self {
            detail_link: format!("{items_url}{}/", item.id),
            final_price: item.final_price(),
            is_available: item.is_available(),
            id: item.id,
            title: item.title,
            description: item.description,
            image: item.image,
            price: item.price,
            discount_percent: item.discount_percent,
            stock: item.stock,
            status: item.status,
            categories: item.categories,
            created_date: item.created_date,
            updated_date: item.updated_date,
        }
    }
}

/// Create/replace menu item payload
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MenuItemWrite {
    #[validate(length(min = 1, max = 200, message = "عنوان باید بین ۱ تا ۲۰۰ کاراکتر باشد."))]
    pub title: String,
    #[serde(default)]
    #[validate(length(max = 2000, message = "توضیحات بیش از حد طولانی است."))]
    pub description: String,
    pub image: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64, message = "قیمت باید بین ۰ تا ۱٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰ باشد."))]
    pub price: i64,
    #[serde(default)]
    #[validate(range(min = 0, max = 100, message = "درصد تخفیف باید بین ۰ تا ۱۰۰ باشد."))]
    pub discount_percent: i32,
    #[serde(default)]
    #[validate(range(min = 0, message = "موجودی نمی‌تواند منفی باشد."))]
    pub stock: i32,
    #[serde(default)]
    pub status: ProductStatus,
    #[serde(default, alias = "category")]
    pub category_ids: Vec<i64>,
}

/// Partial menu item update payload
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct MenuItemPatch {
    #[validate(length(min = 1, max = 200, message = "عنوان باید بین ۱ تا ۲۰۰ کاراکتر باشد."))]
    pub title: Option<String>,
    #[validate(length(max = 2000, message = "توضیحات بیش از حد طولانی است."))]
    pub description: Option<String>,
    pub image: Option<String>,
    #[validate(range(min = 0, max = 1_000_000_000_000i64, message = "قیمت باید بین ۰ تا ۱٬۰۰۰٬۰۰۰٬۰۰۰٬۰۰۰ باشد."))]
    pub price: Option<i64>,
    #[validate(range(min = 0, max = 100, message = "درصد تخفیف باید بین ۰ تا ۱۰۰ باشد."))]
    pub discount_percent: Option<i32>,
    #[validate(range(min = 0, message = "موجودی نمی‌تواند منفی باشد."))]
    pub stock: Option<i32>,
    pub status: Option<ProductStatus>,
    #[serde(alias = "category")]
    pub category_ids: Option<Vec<i64>>,
}

impl MenuItemPatch {
    /// Apply the patch on top of an existing item's writable fields
    pub fn apply_to(self, item: &MenuItem) -> MenuItemWrite {
        MenuItemWrite {
            title: self.title.unwrap_or_else(|| item.title.clone()),
            description: self
                .description
                .unwrap_or_else(|| item.description.clone()),
            image: self.image.or_else(|| item.image.clone()),
            price: self.price.unwrap_or(item.price),
            discount_percent: self.discount_percent.unwrap_or(item.discount_percent),
            stock: self.stock.unwrap_or(item.stock),
            status: self.status.unwrap_or(item.status),
            category_ids: self
                .category_ids
                .unwrap_or_else(|| item.categories.iter().map(|c| c.id).collect()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(price: i64, discount_percent: i32, stock: i32) -> MenuItem {
        MenuItem {
            id: 7,
            author_id: 1,
            title: "کیک شکلاتی".to_string(),
            description: "خوشمزه".to_string(),
            image: None,
            price,
            discount_percent,
            stock,
            status: ProductStatus::Publish,
            created_date: 0,
            updated_date: 0,
            categories: vec![Category {
                id: 3,
                title: "دسر".to_string(),
                created_at: 0,
                updated_at: 0,
            }],
        }
    }

    #[test]
    fn test_final_price() {
        assert_eq!(item(100_000, 10, 5).final_price(), 90_000);
        assert_eq!(item(20_000, 0, 0).final_price(), 20_000);
        assert_eq!(final_price(999, 33), 669);
        assert_eq!(final_price(1000, 150), 0);
    }

    #[test]
    fn test_final_price_large_values() {
        assert_eq!(final_price(MAX_PRICE, 10), 900_000_000_000);
        assert_eq!(final_price(i64::MAX, 0), i64::MAX);
        assert_eq!(final_price(i64::MAX, 10), 8_301_034_833_169_298_226);
    }

    #[test]
    fn test_price_upper_bound() {
        let write = |price: i64| -> MenuItemWrite {
            serde_json::from_value(serde_json::json!({ "title": "طلا", "price": price })).unwrap()
        };
        assert!(write(MAX_PRICE).validate().is_ok());
        let errors = write(9_000_000_000_000_000_000).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("price"));

        let patch = MenuItemPatch {
            price: Some(MAX_PRICE + 1),
            ..Default::default()
        };
        assert!(patch.validate().is_err());
    }

    #[test]
    fn test_availability() {
        assert!(item(1, 0, 5).is_available());
        assert!(!item(1, 0, 0).is_available());
    }

    #[test]
    fn test_status_serde() {
        assert_eq!(
            serde_json::to_value(ProductStatus::Publish).unwrap(),
            serde_json::json!("publish")
        );
        let parsed: ProductStatus = serde_json::from_str("\"draft\"").unwrap();
        assert_eq!(parsed, ProductStatus::Draft);
        assert_eq!(
            ProductStatus::try_from("publish".to_string()),
            Ok(ProductStatus::Publish)
        );
        assert!(ProductStatus::try_from("archived".to_string()).is_err());
    }

    #[test]
    fn test_view_detail_link() {
        let view = MenuItemView::new(
            item(100_000, 10, 5),
            "http://localhost:8000/menu/api/V1/menu-items/",
        );
        assert_eq!(
            view.detail_link,
            "http://localhost:8000/menu/api/V1/menu-items/7/"
        );
        assert_eq!(view.final_price, 90_000);
        assert!(view.is_available);
    }

    #[test]
    fn test_write_validation() {
        let write: MenuItemWrite = serde_json::from_value(serde_json::json!({
            "title": "قهوه",
            "price": 50000,
            "discount_percent": 120,
            "category": [1, 2]
        }))
        .unwrap();
        assert_eq!(write.category_ids, vec![1, 2]);
        assert_eq!(write.status, ProductStatus::Draft);
        let errors = write.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("discount_percent"));
    }

    #[test]
    fn test_patch_keeps_unset_fields() {
        let existing = item(100_000, 10, 5);
        let patch = MenuItemPatch {
            price: Some(120_000),
            ..Default::default()
        };
        let merged = patch.apply_to(&existing);
        assert_eq!(merged.price, 120_000);
        assert_eq!(merged.title, existing.title);
        assert_eq!(merged.category_ids, vec![3]);
        assert_eq!(merged.status, ProductStatus::Publish);
    }
}
