//! Staff-entered booking rows.

use busline_core::status::{BookingStatus, PaymentStatus, StatusId};
use busline_core::types::{DbId, Money, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `manual_seat_bookings` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ManualBooking {
    pub id: DbId,
    pub reference: String,
    pub scheduled_trip_id: DbId,
    pub created_by: DbId,
    pub booking_type: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
    pub seat_count: i32,
    pub total_fare: Money,
    pub payment_status_id: StatusId,
    pub amount_paid: Money,
    pub booking_status_id: StatusId,
    pub notes: Option<String>,
    pub cancelled_at: Option<Timestamp>,
    pub cancelled_by: Option<DbId>,
    pub cancellation_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl ManualBooking {
    pub fn booking_status(&self) -> Option<BookingStatus> {
        BookingStatus::from_id(self.booking_status_id)
    }

    pub fn payment_status(&self) -> Option<PaymentStatus> {
        PaymentStatus::from_id(self.payment_status_id)
    }
}

/// DTO for inserting a manual booking.
#[derive(Debug, Clone)]
pub struct CreateManualBooking {
    pub reference: String,
    pub scheduled_trip_id: DbId,
    pub created_by: DbId,
    pub booking_type: String,
    pub contact_name: String,
    pub contact_phone: String,
    pub contact_email: Option<String>,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
    pub seat_count: i32,
    pub total_fare: Money,
    pub payment_status: PaymentStatus,
    pub amount_paid: Money,
    pub notes: Option<String>,
}
