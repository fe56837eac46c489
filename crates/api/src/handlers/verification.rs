//! Boarding-pass scan endpoint.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use busline_core::types::DbId;
use serde::Deserialize;

use crate::error::AppResult;
use crate::middleware::actor::Actor;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct VerifyRequest {
    /// Raw scanned string: a signed seat payload or a bare reference.
    pub payload: String,
    /// Trip the scanning device is boarding, if known.
    pub trip_id: Option<DbId>,
}

/// POST /api/v1/verify
///
/// An unusable code is a 200 with `result: "invalid"`; only an unknown
/// reference is a 404.
pub async fn verify(
    actor: Actor,
    State(state): State<AppState>,
    Json(input): Json<VerifyRequest>,
) -> AppResult<impl IntoResponse> {
    let verification = state
        .engine
        .verifier
        .verify(&input.payload, input.trip_id)
        .await?;

    tracing::debug!(
        actor_id = actor.id,
        trip_id = ?input.trip_id,
        valid = verification.is_valid(),
        "Boarding code scanned",
    );

    Ok(Json(DataResponse { data: verification }))
}
