use axum::{Json, Router, extract::State, routing::get};
use shared::error::AppResult;
use shared::models::{ProfileView, Reservation};

use crate::api::accounts::load_profile_view;
use crate::api::extract::QueryParams;
use crate::api::pagination::{ListUrl, Listing, PageParams};
use crate::auth::AuthUser;
use crate::state::AppState;

pub const PREFIX: &str = "/dashboard/customer/api/V1";

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/my-profile/", get(my_profile))
        .route("/reservations/", get(my_reservations))
}

async fn my_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ProfileView>> {
    load_profile_view(&state, &user).await.map(Json)
}

async fn my_reservations(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ListUrl(base_url): ListUrl,
    QueryParams(page): QueryParams<PageParams>,
) -> AppResult<Json<Listing<Reservation>>> {
    let reservations = state.store.list_reservations_for_user(user.id).await?;
    Ok(Json(page.apply(reservations, &base_url)?))
}
