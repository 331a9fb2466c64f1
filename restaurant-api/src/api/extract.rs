//! Request extractors that reject with `AppError` bodies

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Query, Request};
use axum::http::request::Parts;
use axum::Json;
use serde::de::DeserializeOwned;
use shared::error::{AppError, ErrorCode};
use validator::Validate;

/// Message for a required field that was not sent
pub const FIELD_REQUIRED: &str = "این فیلد الزامی است.";

/// JSON body, deserialized and then validated
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(json_rejection)?;
        value.validate()?;
        Ok(Self(value))
    }
}

/// Missing fields become field errors, everything else a `detail`
fn json_rejection(rejection: JsonRejection) -> AppError {
    let text = rejection.body_text();
    if let Some(field) = missing_field(&text) {
        return AppError::field(ErrorCode::ValidationFailed, field, FIELD_REQUIRED);
    }
    match rejection {
        JsonRejection::MissingJsonContentType(_) => AppError::invalid_request(
            "نوع محتوای درخواست باید application/json باشد.",
        ),
        _ => AppError::invalid_request(text),
    }
}

/// Pull the field name out of serde's "missing field `name`" message
fn missing_field(message: &str) -> Option<&str> {
    let rest = &message[message.find("missing field `")? + "missing field `".len()..];
    rest.split('`').next().filter(|f| !f.is_empty())
}

/// Query string with `AppError` rejection
pub struct QueryParams<T>(pub T);

impl<S, T> FromRequestParts<S> for QueryParams<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|e: QueryRejection| AppError::invalid_request(e.body_text()))?;
        Ok(Self(value))
    }
}
