//! App booking routes mounted at `/bookings`, plus the per-user listing
//! mounted at `/users`.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::bookings;
use crate::state::AppState;

/// ```text
/// POST /                            -> create_booking
/// GET  /{id}                        -> get_booking
/// GET  /by-reference/{reference}    -> get_booking_by_reference
/// POST /{id}/confirm-payment        -> confirm_payment
/// POST /{id}/cancel                 -> cancel_booking
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(bookings::create_booking))
        .route("/{id}", get(bookings::get_booking))
        .route(
            "/by-reference/{reference}",
            get(bookings::get_booking_by_reference),
        )
        .route("/{id}/confirm-payment", post(bookings::confirm_payment))
        .route("/{id}/cancel", post(bookings::cancel_booking))
}

/// ```text
/// GET /{user_id}/bookings           -> list_bookings_for_user
/// ```
pub fn user_router() -> Router<AppState> {
    Router::new().route(
        "/{user_id}/bookings",
        get(bookings::list_bookings_for_user),
    )
}
