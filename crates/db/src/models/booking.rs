//! App (self-service) booking rows: the master booking and its bus slice.

use busline_core::status::{BookingStatus, PaymentStatus, StatusId};
use busline_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `master_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MasterBooking {
    pub id: DbId,
    pub reference: String,
    pub user_id: DbId,
    pub payment_status_id: StatusId,
    pub booking_status_id: StatusId,
    pub subtotal: Money,
    pub total_amount: Money,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub paid_at: Option<Timestamp>,
    pub cancelled_at: Option<Timestamp>,
    pub cancelled_by: Option<DbId>,
    pub cancellation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl MasterBooking {
    pub fn booking_status(&self) -> Option<BookingStatus> {
        BookingStatus::from_id(self.booking_status_id)
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_id(self.payment_status_id)
    }
}

/// DTO for inserting a master booking.
#[derive(Debug, Clone)]
pub struct CreateMasterBooking {
    pub reference: String,
    pub user_id: DbId,
    pub subtotal: Money,
    pub total_amount: Money,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
}

/// A row from the `bus_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BusBooking {
    pub id: DbId,
    pub master_booking_id: DbId,
    pub scheduled_trip_id: DbId,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
    pub seat_count: i32,
    pub fare_total: Money,
    pub status_id: StatusId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for inserting the bus slice of a master booking.
#[derive(Debug, Clone)]
pub struct CreateBusBooking {
    pub master_booking_id: DbId,
    pub scheduled_trip_id: DbId,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
    pub seat_count: i32,
    pub fare_total: Money,
}
