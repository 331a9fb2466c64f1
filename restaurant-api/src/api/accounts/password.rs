//! Change, reset and reset-confirm

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use validator::Validate;

use super::{PASSWORD_CHANGED, PASSWORD_RESET_DONE, PREFIX, RESET_LINK_SENT};
use crate::api::extract::ValidJson;
use crate::auth::{AuthUser, TokenType};
use crate::email::EmailJob;
use crate::security_log;
use crate::state::AppState;
use crate::util::{hash_password, normalize_email, verify_password};

fn hash(password: &str) -> AppResult<String> {
    hash_password(password).map_err(|e| AppError::internal(format!("password hashing failed: {e}")))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    #[validate(length(min = 8, message = "رمز عبور باید حداقل ۸ کاراکتر باشد."))]
    pub new_password: String,
    pub new_password_confirm: String,
}

/// POST /accounts/api/V1/change-password/
pub async fn change_password(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(req): ValidJson<ChangePasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    if !verify_password(&req.old_password, &user.password_hash) {
        security_log!(WARN, "change_password_wrong_old", user_id = user.id);
        return Err(AppError::field_default(ErrorCode::WrongPassword, "old_password"));
    }
    if req.new_password != req.new_password_confirm {
        return Err(AppError::field_default(
            ErrorCode::PasswordMismatch,
            "new_password_confirm",
        ));
    }

    state
        .store
        .update_password(user.id, &hash(&req.new_password)?)
        .await?;
    security_log!(INFO, "password_changed", user_id = user.id);
    Ok(Json(serde_json::json!({ "detail": PASSWORD_CHANGED })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    #[validate(email(message = "یک آدرس ایمیل معتبر وارد کنید."))]
    pub email: String,
}

/// POST /accounts/api/V1/reset-password/
pub async fn reset_password(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ResetPasswordRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = normalize_email(&req.email);
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .ok_or_else(|| AppError::field_default(ErrorCode::UserNotFound, "email"))?;

    let token = state
        .jwt
        .issue(&user, TokenType::ResetPassword)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let link = state.absolute_url(&format!("{PREFIX}/reset-password-confirm/{token}/"));
    state.emails.enqueue(EmailJob::PasswordReset {
        to: user.email.clone(),
        link,
    });

    security_log!(INFO, "password_reset_requested", user_id = user.id);
    Ok(Json(serde_json::json!({ "detail": RESET_LINK_SENT })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResetPasswordConfirmRequest {
    #[validate(length(min = 8, message = "رمز عبور باید حداقل ۸ کاراکتر باشد."))]
    pub new_password: String,
    pub new_password_confirm: String,
}

/// POST /accounts/api/V1/reset-password-confirm/{token}/
///
/// The token is single use: it embeds the user's `updated_at`, which the
/// password update bumps.
pub async fn reset_password_confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
    ValidJson(req): ValidJson<ResetPasswordConfirmRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let invalid = || AppError::new(ErrorCode::LinkTokenInvalid);

    let claims = state
        .jwt
        .validate(&token, TokenType::ResetPassword)
        .map_err(|_| invalid())?;
    let user_id = claims.user_id().map_err(|_| invalid())?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .filter(|u| claims.stamp == Some(u.updated_at))
        .ok_or_else(|| {
            security_log!(WARN, "reset_token_rejected", user_id);
            invalid()
        })?;

    if req.new_password != req.new_password_confirm {
        return Err(AppError::field_default(
            ErrorCode::PasswordMismatch,
            "new_password_confirm",
        ));
    }

    state
        .store
        .update_password(user.id, &hash(&req.new_password)?)
        .await?;
    security_log!(INFO, "password_reset", user_id = user.id);
    Ok(Json(serde_json::json!({ "detail": PASSWORD_RESET_DONE })))
}
