use axum::{
    Json, Router,
    extract::{Path, State},
    routing::get,
};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{Reservation, UserView};

use crate::api::extract::QueryParams;
use crate::api::pagination::{ListUrl, Listing, PageParams};
use crate::auth::AdminUser;
use crate::state::AppState;

pub const PREFIX: &str = "/dashboard/admin/api/V1";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/reservations/", get(list_reservations))
        .route("/reservations/{id}/", get(get_reservation))
        .route("/users/", get(list_users))
        .route("/users/{id}/", get(get_user))
}

async fn list_reservations(
    State(state): State<AppState>,
    _admin: AdminUser,
    ListUrl(base_url): ListUrl,
    QueryParams(page): QueryParams<PageParams>,
) -> AppResult<Json<Listing<Reservation>>> {
    let reservations = state.store.list_reservations().await?;
    Ok(Json(page.apply(reservations, &base_url)?))
}

async fn get_reservation(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<Reservation>> {
    state
        .store
        .get_reservation(id)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::new(ErrorCode::ReservationNotFound))
}

async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
    ListUrl(base_url): ListUrl,
    QueryParams(page): QueryParams<PageParams>,
) -> AppResult<Json<Listing<UserView>>> {
    let users: Vec<UserView> = state
        .store
        .list_users()
        .await?
        .iter()
        .map(UserView::from)
        .collect();
    Ok(Json(page.apply(users, &base_url)?))
}

async fn get_user(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i64>,
) -> AppResult<Json<UserView>> {
    state
        .store
        .find_user_by_id(id)
        .await?
        .map(|user| Json(UserView::from(&user)))
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))
}
