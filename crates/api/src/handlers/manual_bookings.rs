//! Handlers for staff-entered bookings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use busline_core::status::PaymentStatus;
use busline_core::types::{DbId, Money};
use busline_engine::manual_booking::CreateManualBookingRequest;
use serde::Deserialize;

use crate::error::AppResult;
use crate::handlers::bookings::CancelRequest;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub amount_paid: Money,
}

/// POST /api/v1/manual-bookings
///
/// The actor is the staff member entering the booking.
pub async fn create_manual_booking(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<CreateManualBookingRequest>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state
        .engine
        .manual_bookings
        .create_manual_booking(actor.id, &input)
        .await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: aggregate })))
}

/// GET /api/v1/manual-bookings/{id}
pub async fn get_manual_booking(
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let aggregate = state
        .engine
        .manual_bookings
        .get_manual_booking(booking_id)
        .await?;
    Ok(Json(DataResponse { data: aggregate }))
}

/// GET /api/v1/trips/{trip_id}/manual-bookings
pub async fn list_manual_bookings_for_trip(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let bookings = state
        .engine
        .manual_bookings
        .list_manual_bookings_for_trip(trip_id)
        .await?;
    Ok(Json(DataResponse { data: bookings }))
}

/// PUT /api/v1/manual-bookings/{id}/payment
pub async fn update_manual_payment(
    actor: Actor,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<UpdatePaymentRequest>,
) -> AppResult<impl IntoResponse> {
    let booking = state
        .engine
        .manual_bookings
        .update_manual_payment(booking_id, input.payment_status, input.amount_paid)
        .await?;

    tracing::info!(booking_id, actor_id = actor.id, "Manual payment recorded via API");

    Ok(Json(DataResponse { data: booking }))
}

/// POST /api/v1/manual-bookings/{id}/cancel
pub async fn cancel_manual_booking(
    actor: Actor,
    State(state): State<AppState>,
    Path(booking_id): Path<DbId>,
    Json(input): Json<CancelRequest>,
) -> AppResult<impl IntoResponse> {
    let outcome = state
        .engine
        .cancellations
        .cancel_manual_booking(booking_id, actor.id, input.reason)
        .await?;
    Ok(Json(DataResponse { data: outcome }))
}
