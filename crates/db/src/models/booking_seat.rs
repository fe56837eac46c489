//! Per-seat passenger links shared by both booking channels.

use busline_core::lifecycle::holds_seat;
use busline_core::status::{PassengerStatus, StatusId};
use busline_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `booking_seats` table.
///
/// Exactly one of `bus_booking_id` and `manual_booking_id` is set.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BookingSeat {
    pub id: DbId,
    pub scheduled_trip_id: DbId,
    pub trip_seat_id: DbId,
    pub bus_booking_id: Option<DbId>,
    pub manual_booking_id: Option<DbId>,
    pub booking_reference: String,
    pub seat_number: String,
    pub seat_price: Money,
    pub passenger_name: String,
    pub passenger_phone: Option<String>,
    pub passenger_gender: Option<String>,
    pub passenger_id_number: Option<String>,
    pub status_id: StatusId,
    pub qr_code: String,
    pub checked_in_at: Option<Timestamp>,
    pub checked_in_by: Option<DbId>,
    pub boarded_at: Option<Timestamp>,
    pub boarded_by: Option<DbId>,
    pub no_show_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl BookingSeat {
    pub fn status(&self) -> Option<PassengerStatus> {
        PassengerStatus::from_id(self.status_id)
    }

    /// The booking this link belongs to, or `None` for a row that violates
    /// the single-owner check.
    pub fn owner(&self) -> Option<SeatOwner> {
        match (self.bus_booking_id, self.manual_booking_id) {
            (Some(id), None) => Some(SeatOwner::Bus(id)),
            (None, Some(id)) => Some(SeatOwner::Manual(id)),
            _ => None,
        }
    }
}

/// Which booking a new seat link belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeatOwner {
    Bus(DbId),
    Manual(DbId),
}

/// DTO for inserting one seat link.
#[derive(Debug, Clone)]
pub struct CreateBookingSeat {
    pub owner: SeatOwner,
    pub scheduled_trip_id: DbId,
    pub trip_seat_id: DbId,
    pub booking_reference: String,
    pub seat_number: String,
    pub seat_price: Money,
    pub passenger_name: String,
    pub passenger_phone: Option<String>,
    pub passenger_gender: Option<String>,
    pub passenger_id_number: Option<String>,
    pub status: PassengerStatus,
    pub qr_code: String,
}

/// Passenger counts for one trip.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PassengerCounts {
    pub pending: i64,
    pub confirmed: i64,
    pub checked_in: i64,
    pub boarded: i64,
    pub completed: i64,
    pub cancelled: i64,
    pub no_show: i64,
}

impl PassengerCounts {
    pub fn get(&self, status: PassengerStatus) -> i64 {
        match status {
            PassengerStatus::Pending => self.pending,
            PassengerStatus::Confirmed => self.confirmed,
            PassengerStatus::CheckedIn => self.checked_in,
            PassengerStatus::Boarded => self.boarded,
            PassengerStatus::Completed => self.completed,
            PassengerStatus::Cancelled => self.cancelled,
            PassengerStatus::NoShow => self.no_show,
        }
    }

    /// Passengers still occupying a seat.
    pub fn holding_seats(&self) -> i64 {
        PassengerStatus::ALL
            .iter()
            .filter(|s| holds_seat(**s))
            .map(|s| self.get(*s))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn holding_seats_excludes_only_cancelled() {
        let counts = PassengerCounts {
            pending: 1,
            confirmed: 2,
            checked_in: 3,
            boarded: 4,
            completed: 5,
            cancelled: 100,
            no_show: 6,
        };
        assert_eq!(counts.holding_seats(), 21);
    }
}
