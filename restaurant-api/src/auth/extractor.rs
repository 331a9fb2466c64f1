//! Authentication extractors
//!
//! - [`AuthUser`]: valid access token required, 401 otherwise
//! - [`AdminUser`]: as `AuthUser`, plus staff/superuser or 403
//! - [`OptionalUser`]: anonymous allowed, a bad token is still a 401
//! - [`Editor`]: staff/superuser, anonymous callers get 403 rather than 401

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::error::AppError;
use shared::models::User;

use super::jwt::{JwtError, JwtService, TokenType};
use crate::security_log;
use crate::state::AppState;

/// Authenticated, active user
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

/// Authenticated staff member or superuser
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

/// Staff member or superuser allowed to change the menu
///
/// Runs before the body is read, so a forbidden write never reaches validation.
#[derive(Debug, Clone)]
pub struct Editor(pub User);

/// Authenticated user if an Authorization header was sent
#[derive(Debug, Clone)]
pub struct OptionalUser(pub Option<User>);

impl OptionalUser {
    /// Staff/superuser or 403, anonymous callers included
    pub fn require_admin(self) -> Result<User, AppError> {
        match self.0 {
            Some(user) if user.is_admin() => Ok(user),
            Some(user) => {
                security_log!(WARN, "permission_denied", user_id = user.id);
                Err(AppError::forbidden())
            }
            None => Err(AppError::forbidden()),
        }
    }
}

/// Resolve the bearer token in `parts`, `Ok(None)` when no header was sent
async fn authenticate(parts: &mut Parts, state: &AppState) -> Result<Option<User>, AppError> {
    if let Some(user) = parts.extensions.get::<AuthUser>() {
        return Ok(Some(user.0.clone()));
    }

    let Some(header) = parts
        .headers
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
    else {
        return Ok(None);
    };

    let token = JwtService::extract_from_header(header).ok_or_else(|| {
        security_log!(WARN, "auth_malformed_header", uri = %parts.uri);
        AppError::invalid_token()
    })?;

    let claims = state
        .jwt
        .validate(token, TokenType::Access)
        .map_err(|e| {
            security_log!(WARN, "auth_failed", error = %e, uri = %parts.uri);
            match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token(),
            }
        })?;

    let user_id = claims.user_id().map_err(|_| AppError::invalid_token())?;
    let user = state
        .store
        .find_user_by_id(user_id)
        .await?
        .filter(|u| u.is_active)
        .ok_or_else(|| {
            security_log!(WARN, "auth_unknown_user", user_id = user_id);
            AppError::invalid_token()
        })?;

    parts.extensions.insert(AuthUser(user.clone()));
    Ok(Some(user))
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        match authenticate(parts, state).await? {
            Some(user) => Ok(Self(user)),
            None => {
                security_log!(WARN, "auth_missing", uri = %parts.uri);
                Err(AppError::unauthorized())
            }
        }
    }
}

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let AuthUser(user) = AuthUser::from_request_parts(parts, state).await?;
        if !user.is_admin() {
            security_log!(WARN, "permission_denied", user_id = user.id, uri = %parts.uri);
            return Err(AppError::forbidden());
        }
        Ok(Self(user))
    }
}

impl FromRequestParts<AppState> for OptionalUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(authenticate(parts, state).await?))
    }
}

impl FromRequestParts<AppState> for Editor {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        OptionalUser::from_request_parts(parts, state)
            .await?
            .require_admin()
            .map(Self)
    }
}
