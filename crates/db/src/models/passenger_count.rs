//! Staff-maintained head-count override per trip.

use busline_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `trip_passenger_counts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripPassengerCount {
    pub scheduled_trip_id: DbId,
    pub passenger_count: i32,
    pub updated_by: DbId,
    pub updated_at: Timestamp,
}
