pub mod bookings;
pub mod health;
pub mod manual_bookings;
pub mod passengers;
pub mod trips;

use axum::routing::post;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /trips/{trip_id}/seats/...              seat inventory
/// /trips/{trip_id}/manual-bookings        staff bookings for a trip
/// /trips/{trip_id}/passengers/...         manifest and counts
/// /bookings/...                           app bookings
/// /users/{user_id}/bookings               a user's app bookings
/// /manual-bookings/...                    staff bookings
/// /passengers/{seat_link_id}/...          boarding lifecycle
/// /verify                                 boarding-pass scan (POST)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/trips", trips::router())
        .nest("/bookings", bookings::router())
        .nest("/users", bookings::user_router())
        .nest("/manual-bookings", manual_bookings::router())
        .nest("/passengers", passengers::router())
        .route("/verify", post(handlers::verification::verify))
}
