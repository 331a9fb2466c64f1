//! Menu API, mounted under `/menu/api/V1`
//!
//! Reads are public and see published items only; admins also see drafts.
//! Writes need an [`Editor`](crate::auth::Editor).

mod categories;
mod items;

use axum::{Router, routing::get};

use crate::state::AppState;

pub const PREFIX: &str = "/menu/api/V1";

pub fn router() -> Router<AppState> {
    let routes = Router::new()
        .route("/menu-items/", get(items::list).post(items::create))
        .route(
            "/menu-items/{id}/",
            get(items::detail)
                .put(items::replace)
                .patch(items::patch)
                .delete(items::delete),
        )
        .route("/categories/", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}/",
            get(categories::detail)
                .put(categories::replace)
                .patch(categories::patch)
                .delete(categories::delete),
        );
    Router::new().nest(PREFIX, routes)
}
