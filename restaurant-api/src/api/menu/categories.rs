//! Categories

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Category, CategoryPatch, CategoryWrite};

use crate::api::extract::{QueryParams, ValidJson};
use crate::api::pagination::{ListUrl, Listing, PageParams};
use crate::auth::Editor;
use crate::db::CategoryFilter;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CategoryQuery {
    pub search: Option<String>,
    /// `title` or `-title`
    pub ordering: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

fn not_found() -> AppError {
    AppError::new(ErrorCode::CategoryNotFound)
}

/// GET categories/
pub async fn list(
    State(state): State<AppState>,
    ListUrl(base_url): ListUrl,
    QueryParams(query): QueryParams<CategoryQuery>,
) -> AppResult<Json<Listing<Category>>> {
    let filter = CategoryFilter {
        search: query
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string),
        descending: query.ordering.as_deref().map(str::trim) == Some("-title"),
    };
    let categories = state.store.list_categories(&filter).await?;
    let page = PageParams {
        page: query.page,
        page_size: query.page_size,
    };
    Ok(Json(page.apply(categories, &base_url)?))
}

/// GET categories/{id}/
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<Json<Category>> {
    state
        .store
        .get_category(id)
        .await?
        .map(Json)
        .ok_or_else(not_found)
}

/// POST categories/
pub async fn create(
    Editor(editor): Editor,
    State(state): State<AppState>,
    ValidJson(write): ValidJson<CategoryWrite>,
) -> AppResult<(StatusCode, Json<Category>)> {
    let category = state.store.create_category(write.title.trim()).await?;
    tracing::info!(category_id = category.id, editor_id = editor.id, "Category created");
    Ok((StatusCode::CREATED, Json(category)))
}

/// PUT categories/{id}/
pub async fn replace(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(write): ValidJson<CategoryWrite>,
) -> AppResult<Json<Category>> {
    let category = state.store.update_category(id, write.title.trim()).await?;
    tracing::info!(category_id = id, editor_id = editor.id, "Category updated");
    Ok(Json(category))
}

/// PATCH categories/{id}/
pub async fn patch(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    ValidJson(patch): ValidJson<CategoryPatch>,
) -> AppResult<Json<Category>> {
    let current = state.store.get_category(id).await?.ok_or_else(not_found)?;
    let Some(title) = patch.title else {
        return Ok(Json(current));
    };
    let category = state.store.update_category(id, title.trim()).await?;
    tracing::info!(category_id = id, editor_id = editor.id, "Category updated");
    Ok(Json(category))
}

/// DELETE categories/{id}/
pub async fn delete(
    Editor(editor): Editor,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> AppResult<StatusCode> {
    if !state.store.delete_category(id).await? {
        return Err(not_found());
    }
    tracing::info!(category_id = id, editor_id = editor.id, "Category deleted");
    Ok(StatusCode::NO_CONTENT)
}
