//! JWT create / refresh / verify

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult, ErrorCode};
use validator::Validate;

use crate::api::extract::ValidJson;
use crate::auth::{JwtError, TokenType};
use crate::security_log;
use crate::state::AppState;
use crate::util::{normalize_email, verify_password};

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
    pub user_id: i64,
    pub email: String,
}

fn token_error(e: JwtError) -> AppError {
    match e {
        JwtError::ExpiredToken => AppError::token_expired(),
        _ => AppError::invalid_token(),
    }
}

/// POST /accounts/api/V1/jwt/create/
pub async fn create(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    let email = normalize_email(&req.email);
    let user = state
        .store
        .find_user_by_email(&email)
        .await?
        .filter(|u| u.is_active);

    let Some(user) = user.filter(|u| verify_password(&req.password, &u.password_hash)) else {
        security_log!(WARN, "login_failed", email = %email);
        return Err(AppError::new(ErrorCode::InvalidCredentials));
    };

    if !user.is_verified {
        return Err(AppError::new(ErrorCode::EmailNotVerified));
    }

    let issue = |token_type| {
        state
            .jwt
            .issue(&user, token_type)
            .map_err(|e| AppError::internal(e.to_string()))
    };
    let access = issue(TokenType::Access)?;
    let refresh = issue(TokenType::Refresh)?;

    security_log!(INFO, "login", user_id = user.id);
    Ok(Json(TokenPair {
        access,
        refresh,
        user_id: user.id,
        email: user.email.clone(),
    }))
}

#[derive(Debug, Deserialize, Validate)]
pub struct RefreshRequest {
    pub refresh: String,
}

/// POST /accounts/api/V1/jwt/refresh/
pub async fn refresh(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<RefreshRequest>,
) -> AppResult<Json<serde_json::Value>> {
    let claims = state
        .jwt
        .validate(&req.refresh, TokenType::Refresh)
        .map_err(token_error)?;
    let user_id = claims.user_id().map_err(token_error)?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(AppError::invalid_token)?;

    let access = state
        .jwt
        .issue(&user, TokenType::Access)
        .map_err(|e| AppError::internal(e.to_string()))?;
    Ok(Json(serde_json::json!({ "access": access })))
}

#[derive(Debug, Deserialize, Validate)]
pub struct VerifyRequest {
    pub token: String,
}

/// POST /accounts/api/V1/jwt/verify/
pub async fn verify(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<VerifyRequest>,
) -> AppResult<Json<serde_json::Value>> {
    state
        .jwt
        .validate(&req.token, TokenType::Access)
        .map_err(token_error)?;
    Ok(Json(serde_json::json!({})))
}
