//! Error type and client-facing body

use super::category::ErrorCategory;
use super::codes::ErrorCode;
use http::StatusCode;
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Key used for errors that belong to the request as a whole
pub const NON_FIELD_ERRORS: &str = "non_field_errors";

/// JSON body returned for an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// `{"detail": "..."}`
    Detail(String),
    /// `{"field": ["...", ...], ...}`
    Fields(BTreeMap<String, Vec<String>>),
    /// `["...", ...]`
    List(Vec<String>),
}

impl ErrorBody {
    /// All messages in the body, in field order
    pub fn messages(&self) -> Vec<&str> {
        match self {
            Self::Detail(msg) => vec![msg.as_str()],
            Self::Fields(fields) => fields
                .values()
                .flat_map(|msgs| msgs.iter().map(String::as_str))
                .collect(),
            Self::List(msgs) => msgs.iter().map(String::as_str).collect(),
        }
    }
}

impl Serialize for ErrorBody {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Detail(msg) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("detail", msg)?;
                map.end()
            }
            Self::Fields(fields) => {
                let mut map = serializer.serialize_map(Some(fields.len()))?;
                for (field, msgs) in fields {
                    map.serialize_entry(field, msgs)?;
                }
                map.end()
            }
            Self::List(msgs) => {
                let mut seq = serializer.serialize_seq(Some(msgs.len()))?;
                for msg in msgs {
                    seq.serialize_element(msg)?;
                }
                seq.end()
            }
        }
    }
}

/// Application error with structured error code and body
#[derive(Debug, Clone)]
pub struct AppError {
    /// The error code identifying the type of error
    pub code: ErrorCode,
    /// What the client receives
    pub body: ErrorBody,
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.body.messages().join("; "))
    }
}

impl std::error::Error for AppError {}

impl AppError {
    /// Create a new error with the default message for the error code
    pub fn new(code: ErrorCode) -> Self {
        Self::with_message(code, code.message())
    }

    /// Create a `detail` error with a custom message
    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            body: ErrorBody::Detail(message.into()),
        }
    }

    /// Create an error attached to a single request field
    pub fn field(code: ErrorCode, field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            body: ErrorBody::Fields(BTreeMap::from([(field.into(), vec![message.into()])])),
        }
    }

    /// Create a field error using the code's default message
    pub fn field_default(code: ErrorCode, field: impl Into<String>) -> Self {
        Self::field(code, field, code.message())
    }

    /// Create an error under `non_field_errors`
    pub fn non_field(code: ErrorCode, message: impl Into<String>) -> Self {
        Self::field(code, NON_FIELD_ERRORS, message)
    }

    /// Create a bare list error
    pub fn list(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            body: ErrorBody::List(vec![message.into()]),
        }
    }

    /// Add another field message, turning the body into a field map if needed
    pub fn with_field(mut self, field: impl Into<String>, message: impl Into<String>) -> Self {
        let previous = std::mem::replace(&mut self.body, ErrorBody::Fields(BTreeMap::new()));
        let mut fields = match previous {
            ErrorBody::Fields(fields) => fields,
            ErrorBody::Detail(detail) => {
                BTreeMap::from([(NON_FIELD_ERRORS.to_string(), vec![detail])])
            }
            ErrorBody::List(msgs) => BTreeMap::from([(NON_FIELD_ERRORS.to_string(), msgs)]),
        };
        fields.entry(field.into()).or_default().push(message.into());
        self.body = ErrorBody::Fields(fields);
        self
    }

    /// Messages recorded for a field, if any
    pub fn field_messages(&self, field: &str) -> Option<&[String]> {
        match &self.body {
            ErrorBody::Fields(fields) => fields.get(field).map(Vec::as_slice),
            _ => None,
        }
    }

    /// Get the HTTP status code for this error
    pub fn http_status(&self) -> StatusCode {
        self.code.http_status()
    }

    // ==================== Convenience constructors ====================

    /// Create a validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::ValidationFailed, msg)
    }

    /// Create a not found error
    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound)
    }

    /// Create a not authenticated error
    pub fn unauthorized() -> Self {
        Self::new(ErrorCode::NotAuthenticated)
    }

    /// Create a permission denied error
    pub fn forbidden() -> Self {
        Self::new(ErrorCode::PermissionDenied)
    }

    /// Create a method not allowed error
    pub fn method_not_allowed() -> Self {
        Self::new(ErrorCode::MethodNotAllowed)
    }

    /// Create an invalid token error
    pub fn invalid_token() -> Self {
        Self::new(ErrorCode::TokenInvalid)
    }

    /// Create a token expired error
    pub fn token_expired() -> Self {
        Self::new(ErrorCode::TokenExpired)
    }

    /// Create an invalid request error
    pub fn invalid_request(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InvalidRequest, msg)
    }

    /// Create an internal error; the message is logged, never sent
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::InternalError, msg)
    }

    /// Create a database error; the message is logged, never sent
    pub fn database(msg: impl Into<String>) -> Self {
        Self::with_message(ErrorCode::DatabaseError, msg)
    }

    /// Create a rate limit error
    pub fn too_many_requests() -> Self {
        Self::new(ErrorCode::TooManyRequests)
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (field, errs) in errors.field_errors() {
            let key = if field == "__all__" {
                NON_FIELD_ERRORS.to_string()
            } else {
                field.to_string()
            };
            let messages = fields.entry(key).or_default();
            for err in errs {
                let message = err
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| ErrorCode::ValidationFailed.message().to_string());
                messages.push(message);
            }
        }
        Self {
            code: ErrorCode::ValidationFailed,
            body: ErrorBody::Fields(fields),
        }
    }
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

// ===== Axum Integration =====

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        use axum::Json;

        let status = self.http_status();

        // System errors are logged in full and replaced by a generic message
        if matches!(self.code.category(), ErrorCategory::System) {
            tracing::error!(
                code = %self.code,
                message = %self.body.messages().join("; "),
                "System error occurred"
            );
            let body = ErrorBody::Detail(self.code.message().to_string());
            return (status, Json(body)).into_response();
        }

        (status, Json(self.body)).into_response()
    }
}
