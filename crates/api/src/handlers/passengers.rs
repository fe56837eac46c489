//! Handlers for the boarding lifecycle of booked seats.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use busline_core::status::PassengerStatus;
use busline_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SetStatusRequest {
    pub status: PassengerStatus,
}

#[derive(Debug, Deserialize)]
pub struct PassengerCountRequest {
    pub count: i32,
}

// ---------------------------------------------------------------------------
// Trip-level views
// ---------------------------------------------------------------------------

/// GET /api/v1/trips/{trip_id}/passengers
pub async fn list_passengers(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let passengers = state.engine.passengers.passengers_for_trip(trip_id).await?;
    Ok(Json(DataResponse { data: passengers }))
}

/// GET /api/v1/trips/{trip_id}/passengers/counts
pub async fn passenger_counts(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let tally = state.engine.passengers.passenger_counts(trip_id).await?;
    Ok(Json(DataResponse { data: tally }))
}

/// PUT /api/v1/trips/{trip_id}/passenger-count
///
/// Conductor's head-count override.
pub async fn update_passenger_count(
    actor: Actor,
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<PassengerCountRequest>,
) -> AppResult<impl IntoResponse> {
    let count = state
        .engine
        .passengers
        .update_passenger_count(trip_id, actor.id, input.count)
        .await?;
    Ok(Json(DataResponse { data: count }))
}

// ---------------------------------------------------------------------------
// Per-seat transitions
// ---------------------------------------------------------------------------

/// PUT /api/v1/passengers/{seat_link_id}/status
pub async fn set_status(
    actor: Actor,
    State(state): State<AppState>,
    Path(seat_link_id): Path<DbId>,
    Json(input): Json<SetStatusRequest>,
) -> AppResult<impl IntoResponse> {
    let link = state
        .engine
        .passengers
        .set_status(seat_link_id, input.status, actor.id)
        .await?;
    Ok(Json(DataResponse { data: link }))
}

/// POST /api/v1/passengers/{seat_link_id}/check-in
pub async fn check_in(
    actor: Actor,
    State(state): State<AppState>,
    Path(seat_link_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let link = state.engine.passengers.check_in(seat_link_id, actor.id).await?;
    Ok(Json(DataResponse { data: link }))
}

/// POST /api/v1/passengers/{seat_link_id}/board
pub async fn board(
    actor: Actor,
    State(state): State<AppState>,
    Path(seat_link_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let link = state.engine.passengers.board(seat_link_id, actor.id).await?;
    Ok(Json(DataResponse { data: link }))
}

/// POST /api/v1/passengers/{seat_link_id}/no-show
pub async fn mark_no_show(
    actor: Actor,
    State(state): State<AppState>,
    Path(seat_link_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let link = state
        .engine
        .passengers
        .mark_no_show(seat_link_id, actor.id)
        .await?;
    Ok(Json(DataResponse { data: link }))
}
