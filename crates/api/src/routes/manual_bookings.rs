//! Staff booking routes mounted at `/manual-bookings`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::manual_bookings;
use crate::state::AppState;

/// ```text
/// POST /                  -> create_manual_booking
/// GET  /{id}              -> get_manual_booking
/// PUT  /{id}/payment      -> update_manual_payment
/// POST /{id}/cancel       -> cancel_manual_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(manual_bookings::create_manual_booking))
        .route("/{id}", get(manual_bookings::get_manual_booking))
        .route(
            "/{id}/payment",
            put(manual_bookings::update_manual_payment),
        )
        .route(
            "/{id}/cancel",
            post(manual_bookings::cancel_manual_booking),
        )
}
