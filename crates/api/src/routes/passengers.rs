//! Per-seat lifecycle routes mounted at `/passengers`.

use axum::routing::{post, put};
use axum::Router;

use crate::handlers::passengers;
use crate::state::AppState;

/// ```text
/// PUT  /{seat_link_id}/status      -> set_status
/// POST /{seat_link_id}/check-in    -> check_in
/// POST /{seat_link_id}/board       -> board
/// POST /{seat_link_id}/no-show     -> mark_no_show
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{seat_link_id}/status", put(passengers::set_status))
        .route("/{seat_link_id}/check-in", post(passengers::check_in))
        .route("/{seat_link_id}/board", post(passengers::board))
        .route("/{seat_link_id}/no-show", post(passengers::mark_no_show))
}
