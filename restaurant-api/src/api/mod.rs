//! HTTP API
//!
//! - [`accounts`]: registration, verification, JWT, passwords, profile
//! - [`reservations`]: create and list own reservations
//! - [`dashboard`]: read-only admin and customer views
//! - [`menu`]: menu items and categories
//! - [`health`]: liveness probe

pub mod accounts;
pub mod dashboard;
pub mod extract;
pub mod health;
pub mod logging;
pub mod menu;
pub mod pagination;
pub mod reservations;

use axum::{Router, middleware as axum_middleware, routing::get};
use http::{HeaderName, HeaderValue};
use shared::error::AppError;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::state::AppState;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// UUIDv4 request ids
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        HeaderValue::from_str(&Uuid::new_v4().to_string())
            .ok()
            .map(RequestId::new)
    }
}

/// All routes, no middleware and no state
///
/// Rate-limited routes need the state to build their layers.
pub fn build_router(state: &AppState) -> Router<AppState> {
    Router::new()
        .merge(accounts::router(state))
        .merge(reservations::router())
        .merge(dashboard::router())
        .merge(menu::router())
        .route("/health", get(health::health_check))
        .fallback(|| async { AppError::not_found() })
        // Must come after every route so it reaches all method routers
        .method_not_allowed_fallback(|| async { AppError::method_not_allowed() })
}

/// Fully configured application, used by `main` and the integration tests
pub fn build_app(state: AppState) -> Router {
    build_router(&state)
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(axum_middleware::from_fn(logging::logging_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        .with_state(state)
}
