//! JWT token service
//!
//! Issues and validates HS256 tokens. Every token carries a `token_type` so an
//! email verification link cannot be replayed as an access token.

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use shared::models::User;
use thiserror::Error;

use crate::config::Config;

/// What a token may be used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    Access,
    Refresh,
    VerifyEmail,
    ResetPassword,
}

/// JWT configuration
#[derive(Debug, Clone)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
    pub access_minutes: i64,
    pub refresh_days: i64,
    pub email_token_minutes: i64,
}

impl From<&Config> for JwtConfig {
    fn from(config: &Config) -> Self {
        Self {
            secret: config.jwt_secret.clone(),
            issuer: config.jwt_issuer.clone(),
            audience: config.jwt_audience.clone(),
            access_minutes: config.access_token_minutes,
            refresh_days: config.refresh_token_days,
            email_token_minutes: config.email_token_minutes,
        }
    }
}

/// Claims stored in the token
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub sub: String,
    pub email: String,
    pub token_type: TokenType,
    /// User `updated_at` at issue time; reset links die once the password changes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stamp: Option<i64>,
    /// Token ID
    pub jti: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub aud: String,
}

impl Claims {
    pub fn user_id(&self) -> Result<i64, JwtError> {
        self.sub
            .parse()
            .map_err(|_| JwtError::InvalidToken("subject is not a user id".into()))
    }
}

#[derive(Error, Debug)]
pub enum JwtError {
    #[error("invalid token: {0}")]
    InvalidToken(String),

    #[error("token expired")]
    ExpiredToken,

    #[error("invalid signature")]
    InvalidSignature,

    #[error("expected a {expected:?} token, got {actual:?}")]
    WrongType {
        expected: TokenType,
        actual: TokenType,
    },

    #[error("token generation failed: {0}")]
    GenerationFailed(String),
}

/// JWT token service
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("issuer", &self.config.issuer)
            .field("audience", &self.config.audience)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());
        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    fn lifetime(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access => Duration::minutes(self.config.access_minutes),
            TokenType::Refresh => Duration::days(self.config.refresh_days),
            TokenType::VerifyEmail | TokenType::ResetPassword => {
                Duration::minutes(self.config.email_token_minutes)
            }
        }
    }

    /// Issue a token of `token_type` for `user`
    pub fn issue(&self, user: &User, token_type: TokenType) -> Result<String, JwtError> {
        let now = Utc::now();
        let claims = Claims {
            sub: user.id.to_string(),
            email: user.email.clone(),
            token_type,
            stamp: (token_type == TokenType::ResetPassword).then_some(user.updated_at),
            jti: uuid::Uuid::new_v4().to_string(),
            exp: (now + self.lifetime(token_type)).timestamp(),
            iat: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    /// Validate signature, expiry, issuer, audience and token type
    pub fn validate(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[&self.config.audience]);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_required_spec_claims(&["sub", "exp", "iat", "iss", "aud"]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::InvalidToken(e.to_string()),
            })?
            .claims;

        if claims.token_type != expected {
            return Err(JwtError::WrongType {
                expected,
                actual: claims.token_type,
            });
        }
        Ok(claims)
    }

    /// Strip the `Bearer ` scheme from an Authorization header
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}
