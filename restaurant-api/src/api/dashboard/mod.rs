//! Read-only dashboards
//!
//! - admin: every reservation and user, staff/superuser only
//! - customer: the caller's own profile and reservations
//!
//! Only GET is routed; other methods fall through to the JSON 405.

mod admin;
mod customer;

use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .nest(admin::PREFIX, admin::router())
        .nest(customer::PREFIX, customer::router())
}
