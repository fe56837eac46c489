//! Trip-scoped routes mounted at `/trips`.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{manual_bookings, passengers, seats};
use crate::state::AppState;

/// ```text
/// GET  /{trip_id}/seats                 -> list_seats
/// POST /{trip_id}/seats                 -> create_seats
/// GET  /{trip_id}/seats/summary         -> seat_summary
/// POST /{trip_id}/seats/availability    -> check_availability
/// POST /{trip_id}/seats/block           -> block_seats
/// POST /{trip_id}/seats/unblock         -> unblock_seats
/// POST /{trip_id}/seats/reprice         -> reprice_seats
/// GET  /{trip_id}/manual-bookings       -> list_manual_bookings_for_trip
/// GET  /{trip_id}/passengers            -> list_passengers
/// GET  /{trip_id}/passengers/counts     -> passenger_counts
/// PUT  /{trip_id}/passenger-count       -> update_passenger_count
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{trip_id}/seats",
            get(seats::list_seats).post(seats::create_seats),
        )
        .route("/{trip_id}/seats/summary", get(seats::seat_summary))
        .route(
            "/{trip_id}/seats/availability",
            post(seats::check_availability),
        )
        .route("/{trip_id}/seats/block", post(seats::block_seats))
        .route("/{trip_id}/seats/unblock", post(seats::unblock_seats))
        .route("/{trip_id}/seats/reprice", post(seats::reprice_seats))
        .route(
            "/{trip_id}/manual-bookings",
            get(manual_bookings::list_manual_bookings_for_trip),
        )
        .route("/{trip_id}/passengers", get(passengers::list_passengers))
        .route(
            "/{trip_id}/passengers/counts",
            get(passengers::passenger_counts),
        )
        .route(
            "/{trip_id}/passenger-count",
            put(passengers::update_passenger_count),
        )
}
