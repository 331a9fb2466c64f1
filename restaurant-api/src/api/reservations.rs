//! Reservations API, mounted under `/reservations/api/V1`

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use shared::error::AppResult;
use shared::models::{Reservation, ReservationCreate};
use shared::reservation::{ensure_profile_complete, validate_slot};

use super::extract::{QueryParams, ValidJson};
use super::pagination::{ListUrl, Listing, PageParams};
use crate::auth::AuthUser;
use crate::email::EmailJob;
use crate::state::AppState;

pub const PREFIX: &str = "/reservations/api/V1";

pub fn router() -> Router<AppState> {
    let routes = Router::new()
        .route("/reserve/", get(list_own).post(create))
        .route("/user-reservations/", get(list_own));
    Router::new().nest(PREFIX, routes)
}

/// GET reserve/ and user-reservations/: the caller's reservations
async fn list_own(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ListUrl(base_url): ListUrl,
    QueryParams(page): QueryParams<PageParams>,
) -> AppResult<Json<Listing<Reservation>>> {
    let reservations = state.store.list_reservations_for_user(user.id).await?;
    Ok(Json(page.apply(reservations, &base_url)?))
}

/// POST reserve/
///
/// Field validation, then the slot rules, then the profile check.
async fn create(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidJson(req): ValidJson<ReservationCreate>,
) -> AppResult<(StatusCode, Json<Reservation>)> {
    validate_slot(req.date, req.time, state.today())?;

    let profile = state.store.get_profile(user.id).await?;
    ensure_profile_complete(profile.as_ref().map(|p| p.phone_number.as_str()))?;

    let reservation = state.store.create_reservation(user.id, &req).await?;
    tracing::info!(
        reservation_id = reservation.id,
        user_id = user.id,
        date = %reservation.date,
        time = %reservation.time,
        people = reservation.people,
        "Reservation created"
    );

    state.emails.enqueue(EmailJob::ReservationConfirmed {
        to: user.email.clone(),
        date: reservation.date,
        time: reservation.time,
        people: reservation.people,
    });

    Ok((StatusCode::CREATED, Json(reservation)))
}
