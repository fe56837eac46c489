//! Handlers for a trip's seat inventory.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use busline_core::types::{DbId, Money};
use busline_db::models::trip_seat::SeatLayoutEntry;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SeatIdsRequest {
    pub seat_ids: Vec<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateSeatsRequest {
    pub seats: Vec<SeatLayoutEntry>,
}

#[derive(Debug, Deserialize)]
pub struct BlockSeatsRequest {
    pub seat_ids: Vec<DbId>,
    pub reason: String,
}

#[derive(Debug, Deserialize)]
pub struct RepriceRequest {
    pub seat_ids: Vec<DbId>,
    pub price: Money,
}

/// GET /api/v1/trips/{trip_id}/seats
pub async fn list_seats(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let seats = state.engine.inventory.list_seats(trip_id).await?;
    Ok(Json(DataResponse { data: seats }))
}

/// GET /api/v1/trips/{trip_id}/seats/summary
pub async fn seat_summary(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let summary = state.engine.inventory.seat_summary(trip_id).await?;
    Ok(Json(DataResponse { data: summary }))
}

/// POST /api/v1/trips/{trip_id}/seats/availability
///
/// Read-only: reports which of the requested seats are currently available.
pub async fn check_availability(
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<SeatIdsRequest>,
) -> AppResult<impl IntoResponse> {
    let availability = state
        .engine
        .inventory
        .check_availability(trip_id, &input.seat_ids)
        .await?;
    Ok(Json(DataResponse { data: availability }))
}

/// POST /api/v1/trips/{trip_id}/seats
///
/// Instantiate the trip's seats from a layout.
pub async fn create_seats(
    actor: Actor,
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<CreateSeatsRequest>,
) -> AppResult<impl IntoResponse> {
    let seats = state
        .engine
        .inventory
        .create_trip_seats(trip_id, &input.seats)
        .await?;

    tracing::info!(trip_id, seat_count = seats.len(), actor_id = actor.id, "Trip seats created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: seats })))
}

/// POST /api/v1/trips/{trip_id}/seats/block
pub async fn block_seats(
    actor: Actor,
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<BlockSeatsRequest>,
) -> AppResult<impl IntoResponse> {
    let seats = state
        .engine
        .inventory
        .block(trip_id, &input.seat_ids, actor.id, &input.reason)
        .await?;
    Ok(Json(DataResponse { data: seats }))
}

/// POST /api/v1/trips/{trip_id}/seats/unblock
pub async fn unblock_seats(
    _actor: Actor,
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<SeatIdsRequest>,
) -> AppResult<impl IntoResponse> {
    let seats = state
        .engine
        .inventory
        .unblock(trip_id, &input.seat_ids)
        .await?;
    Ok(Json(DataResponse { data: seats }))
}

/// POST /api/v1/trips/{trip_id}/seats/reprice
///
/// Booked seats are skipped; the response lists the seats that changed.
pub async fn reprice_seats(
    _actor: Actor,
    State(state): State<AppState>,
    Path(trip_id): Path<DbId>,
    Json(input): Json<RepriceRequest>,
) -> AppResult<impl IntoResponse> {
    let seats = state
        .engine
        .inventory
        .reprice(trip_id, &input.seat_ids, input.price)
        .await?;
    Ok(Json(DataResponse { data: seats }))
}
