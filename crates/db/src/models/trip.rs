//! Scheduled trip rows. Trips are created upstream; the engine reads them.

use busline_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `scheduled_trips` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ScheduledTrip {
    pub id: DbId,
    pub route_label: String,
    pub bus_number: Option<String>,
    pub departure_at: Timestamp,
    pub arrival_at: Option<Timestamp>,
    pub base_fare: Money,
    pub total_seats: i32,
    pub is_bookable: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
