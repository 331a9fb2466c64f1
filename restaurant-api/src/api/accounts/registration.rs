//! Registration and email verification

use axum::{
    Json,
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::User;
use validator::Validate;

use super::{ALREADY_VERIFIED, PREFIX, REGISTRATION_EMAIL_SENT, VERIFICATION_RESENT};
use crate::api::extract::ValidJson;
use crate::auth::TokenType;
use crate::db::NewUser;
use crate::email::EmailJob;
use crate::state::AppState;
use crate::util::{hash_password, normalize_email};

/// POST /accounts/api/V1/registration/
#[derive(Debug, Deserialize, Validate)]
pub struct RegistrationRequest {
    #[validate(email(message = "یک آدرس ایمیل معتبر وارد کنید."))]
    pub email: String,
    #[validate(length(min = 8, message = "رمز عبور باید حداقل ۸ کاراکتر باشد."))]
    pub password: String,
    pub password_confirm: String,
}

pub async fn register(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RegistrationRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = normalize_email(&req.email);

    if state.store.find_user_by_email(&email).await?.is_some() {
        return Err(AppError::field_default(
            ErrorCode::EmailAlreadyRegistered,
            "email",
        ));
    }
    if req.password != req.password_confirm {
        return Err(AppError::field_default(
            ErrorCode::PasswordMismatch,
            "password_confirm",
        ));
    }

    let password_hash = hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("password hashing failed: {e}")))?;
    let user = state
        .store
        .create_user(NewUser {
            email,
            password_hash,
            is_verified: false,
            is_staff: false,
            is_superuser: false,
        })
        .await?;

    send_verification(&state, &user)?;
    tracing::info!(user_id = user.id, "User registered");

    Ok(Json(serde_json::json!({
        "detail": REGISTRATION_EMAIL_SENT,
        "email": user.email,
    })))
}

/// Queue an activation link for `user`
fn send_verification(state: &AppState, user: &User) -> AppResult<()> {
    let token = state
        .jwt
        .issue(user, TokenType::VerifyEmail)
        .map_err(|e| AppError::internal(e.to_string()))?;
    let link = state.absolute_url(&format!("{PREFIX}/is-verified/{token}/"));
    state.emails.enqueue(EmailJob::Verification {
        to: user.email.clone(),
        link,
    });
    Ok(())
}

/// GET /accounts/api/V1/is-verified/{token}/
///
/// Always redirects to the frontend, with `status=success` or `status=error`.
pub async fn is_verified(State(state): State<AppState>, Path(token): Path<String>) -> Response {
    let status = match activate(&state, &token).await {
        Ok(user_id) => {
            tracing::info!(user_id, "Email verified");
            "success"
        }
        Err(e) => {
            tracing::info!(error = %e, "Email verification failed");
            "error"
        }
    };
    let location = state.frontend_url(&format!("/email-verified?status={status}"));
    (StatusCode::FOUND, [(header::LOCATION, location)]).into_response()
}

async fn activate(state: &AppState, token: &str) -> AppResult<i64> {
    let claims = state
        .jwt
        .validate(token, TokenType::VerifyEmail)
        .map_err(|_| AppError::new(ErrorCode::LinkTokenInvalid))?;
    let user_id = claims
        .user_id()
        .map_err(|_| AppError::new(ErrorCode::LinkTokenInvalid))?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::UserNotFound))?;
    state.store.set_verified(user.id).await?;
    Ok(user.id)
}

/// POST /accounts/api/V1/resend/
#[derive(Debug, Deserialize, Validate)]
pub struct ResendRequest {
    #[validate(length(min = 1, message = "این فیلد الزامی است."))]
    pub email: String,
}

/// Unknown addresses get the same answer as unverified ones
pub async fn resend(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<ResendRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let email = normalize_email(&req.email);
    match state.store.find_user_by_email(&email).await? {
        Some(user) if user.is_verified => Ok(Json(serde_json::json!({
            "detail": ALREADY_VERIFIED,
        }))),
        Some(user) => {
            send_verification(&state, &user)?;
            Ok(Json(serde_json::json!({ "detail": VERIFICATION_RESENT })))
        }
        None => Ok(Json(serde_json::json!({ "detail": VERIFICATION_RESENT }))),
    }
}
