//! Menu items

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{MenuItem, MenuItemPatch, MenuItemView, MenuItemWrite};

use super::PREFIX;
use crate::api::extract::{QueryParams, ValidJson};
use crate::api::pagination::{ListUrl, Listing, PageParams};
use crate::auth::{Editor, OptionalUser};
use crate::db::{MenuFilter, MenuOrdering};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ItemQuery {
    pub category: Option<i64>,
    pub search: Option<String>,
    /// Unknown values fall back to `-created_date`
    pub ordering: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

impl ItemQuery {
    fn filter(&self, published_only: bool) -> MenuFilter {
        MenuFilter {
            published_only,
            category: self.category,
            search: self
                .search
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            ordering: self
                .ordering
                .as_deref()
                .and_then(MenuOrdering::parse)
                .unwrap_or_default(),
        }
    }

    fn page(&self) -> PageParams {
        PageParams {
            page: self.page,
            page_size: self.page_size,
        }
    }
}

fn items_url(state: &AppState) -> String {
    state.absolute_url(&format!("{PREFIX}/menu-items/"))
}

fn can_see_drafts(user: &OptionalUser) -> bool {
    user.0.as_ref().is_some_and(|u| u.is_admin())
}

/// GET menu-items/
pub async fn list(
    State(state): State<AppState>,
    user: OptionalUser,
    ListUrl(base_url): ListUrl,
    QueryParams(query): QueryParams<ItemQuery>,
) -> AppResult<Json<Listing<MenuItemView>>> {
    let filter = query.filter(!can_see_drafts(&user));
    let url = items_url(&state);
    let items: Vec<MenuItemView> = state
        .store
        .list_menu_items(&filter)
        .await?
        .into_iter()
        .map(|item| MenuItemView::new(item, &url))
        .collect();
    Ok(Json(query.page().apply(items, &base_url)?))
}

/// GET menu-items/{id}/
pub async fn detail(
    State(state): State<AppState>,
    user: OptionalUser,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuItemView>> {
    let drafts = can_see_drafts(&user);
    let item = state
        .store
        .get_menu_item(id)
        .await?
        .filter(|item| drafts || item.is_published())
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))?;
    Ok(Json(MenuItemView::new(item, &items_url(&state))))
}

/// Every referenced category must exist
async fn check_categories(state: &AppState, write: &MenuItemWrite) -> AppResult<()> {
    for &id in &write.category_ids {
        if state.store.get_category(id).await?.is_none() {
            return Err(AppError::field(
                ErrorCode::ValidationFailed,
                "category",
                format!("دسته‌بندی با شناسه {id} وجود ندارد."),
            ));
        }
    }
    Ok(())
}

async fn existing(state: &AppState, id: i64) -> AppResult<MenuItem> {
    state
        .store
        .get_menu_item(id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::MenuItemNotFound))
}

/// POST menu-items/
pub async fn create(
    Editor(editor): Editor,
    State(state): State<AppState>,
    ValidJson(write): ValidJson<MenuItemWrite>,
) -> AppResult<(StatusCode, Json<MenuItemView>)> {
    check_categories(&state, &write).await?;
    let item = state.store.create_menu_item(editor.id, &write).await?;
    tracing::info!(item_id = item.id, author_id = editor.id, "Menu item created");
    Ok((
        StatusCode::CREATED,
        Json(MenuItemView::new(item, &items_url(&state))),
    ))
}

/// PUT menu-items/{id}/
pub async fn replace(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(write): ValidJson<MenuItemWrite>,
) -> AppResult<Json<MenuItemView>> {
    existing(&state, id).await?;
    check_categories(&state, &write).await?;
    let item = state.store.update_menu_item(id, &write).await?;
    tracing::info!(item_id = id, editor_id = editor.id, "Menu item replaced");
    Ok(Json(MenuItemView::new(item, &items_url(&state))))
}

/// PATCH menu-items/{id}/
pub async fn patch(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(patch): ValidJson<MenuItemPatch>,
) -> AppResult<Json<MenuItemView>> {
    let write = patch.apply_to(&existing(&state, id).await?);
    check_categories(&state, &write).await?;
    let item = state.store.update_menu_item(id, &write).await?;
    tracing::info!(item_id = id, editor_id = editor.id, "Menu item updated");
    Ok(Json(MenuItemView::new(item, &items_url(&state))))
}

/// DELETE menu-items/{id}/
pub async fn delete(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.store.delete_menu_item(id).await? {
        return Err(AppError::new(ErrorCode::MenuItemNotFound));
    }
    tracing::info!(item_id = id, editor_id = editor.id, "Menu item deleted");
    Ok(StatusCode::NO_CONTENT)
}
