//! Handlers for app bookings: creation, lookup, payment confirmation and
//! cancellation.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use busline_core::types::DbId;
use busline_engine::booking::CreateBookingRequest;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of both cancellation endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

/// POST /api/v1/bookings
///
/// The actor is the booking user.
pub async fn create_booking(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CreateBookingRequest>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state.engine.bookings.create_booking(actor.id, &input).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: aggregate })))
}

/// GET /api/v1/bookings/{id}
pub async fn get_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state.engine.bookings.get_booking(booking_id).await?;
    Ok(Json(DataResponse { data: aggregate }))
}

/// GET /api/v1/bookings/by-reference/{reference}
pub async fn get_booking_by_reference(
    State(state): State<AppState>,
    Path(reference): Path<String>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state
        .engine
        .bookings
        .get_booking_by_reference(&reference)
        .await?;
    Ok(Json(DataResponse { data: aggregate }))
}

/// GET /api/v1/users/{user_id}/bookings
pub async fn list_bookings_for_user(
    State(state): State<AppState>,
    Path(user_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let bookings = state.engine.bookings.list_bookings_for_user(user_id).await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// POST /api/v1/bookings/{id}/confirm-payment
///
/// Called by the payment integration once the charge has settled.
pub async fn confirm_payment(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state.engine.bookings.confirm_payment(booking_id).await?;
    Ok(Json(DataResponse { data: aggregate }))
}

/// POST /api/v1/bookings/{id}/cancel
pub async fn cancel_booking(
    actor: Actor,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .cancellations
        .cancel(booking_id, actor.id, input.reason)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
