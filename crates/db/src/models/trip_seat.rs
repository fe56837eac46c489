//! Per-trip seat rows and the inputs used to lay them out.

use busline_core::seat::DEFAULT_SEAT_TYPE;
use busline_core::status::{SeatStatus, StatusId};
use busline_core::types::{DbId, Money, Timestamp};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A row from the `trip_seats` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TripSeat {
    pub id: DbId,
    pub scheduled_trip_id: DbId,
    pub seat_number: String,
    pub seat_type: String,
    pub row_number: Option<i32>,
    pub column_number: Option<i32>,
    pub price: Option<Money>,
    pub status_id: StatusId,
    pub blocked_by: Option<DbId>,
    pub block_reason: Option<String>,
    pub booking_reference: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TripSeat {
    /// Decoded seat status. Unknown IDs read as blocked so they never look
    /// sellable.
    pub fn status(&self) -> SeatStatus {
        SeatStatus::from_id(self.status_id).unwrap_or(SeatStatus::Blocked)
    }

    pub fn is_available(&self) -> bool {
        self.status() == SeatStatus::Available
    }
}

/// One seat in a layout passed to `TripSeatRepo::bulk_insert`.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatLayoutEntry {
    pub seat_number: String,
    #[serde(default = "default_seat_type")]
    pub seat_type: String,
    pub row_number: Option<i32>,
    pub column_number: Option<i32>,
    pub price: Option<Money>,
}

fn default_seat_type() -> String {
    DEFAULT_SEAT_TYPE.to_string()
}
