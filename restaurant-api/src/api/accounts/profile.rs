//! Own profile: GET, PUT, PATCH

use axum::{Json, extract::State};
use shared::error::{AppError, AppResult};
use shared::models::{ProfileUpdate, ProfileView, User};

use crate::api::extract::ValidJson;
use crate::auth::AuthUser;
use crate::state::AppState;

/// Profile view for `user`; also served by the customer dashboard
pub(crate) async fn load_profile_view(state: &AppState, user: &User) -> AppResult<ProfileView> {
    let profile = state
        .store
        .get_profile(user.id)
        .await?
        .ok_or_else(AppError::not_found)?;
    Ok(ProfileView::new(user, &profile))
}

pub async fn get_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> AppResult<Json<ProfileView>> {
    load_profile_view(&state, &user).await.map(Json)
}

/// PUT and PATCH share one handler; absent fields are left unchanged
pub async fn update_profile(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(update): ValidJson<ProfileUpdate>,
) -> AppResult<Json<ProfileView>> {
    let profile = state.store.update_profile(user.id, &update).await?;
    tracing::info!(user_id = user.id, "Profile updated");
    Ok(Json(ProfileView::new(&user, &profile)))
}
