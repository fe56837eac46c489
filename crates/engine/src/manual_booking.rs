//! Manual Booking Coordinator: staff-entered phone, agent and walk-in
//! bookings.
//!
//! Uses the same allocation path as app bookings. Payment fields are staff
//! input and authoritative as entered; there is no gateway step, so seat
//! links start `confirmed`.

use std::sync::Arc;

use busline_core::booking::{
    validate_bookable, validate_booking_type, validate_manual_payment, validate_notes,
    validate_passengers_for_seats, validate_stop, ContactInfo, PassengerDetails,
    MANUAL_PAYMENT_STATUSES,
};
use busline_core::error::CoreError;
use busline_core::seat::{fare_total, validate_seat_selection};
use busline_core::status::{BookingStatus, PassengerStatus, PaymentStatus};
use busline_core::types::{DbId, Money};
use busline_db::models::booking_seat::{BookingSeat, SeatOwner};
use busline_db::models::manual_booking::{CreateManualBooking, ManualBooking};
use busline_db::repositories::{BookingSeatRepo, ManualBookingRepo, TripRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::allocation::{fresh_reference, link_seats};
use crate::config::EngineConfig;
use crate::error::{conflict, not_found, EngineError, EngineResult};
use crate::inventory::allocate_in;

/// Input for [`ManualBookingCoordinator::create_manual_booking`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateManualBookingRequest {
    pub trip_id: DbId,
    pub seat_ids: Vec<DbId>,
    /// One entry per seat, in the same order as `seat_ids`.
    pub passengers: Vec<PassengerDetails>,
    pub contact: ContactInfo,
    /// `phone`, `agent` or `walk_in`.
    pub booking_type: String,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub amount_paid: Money,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
    pub notes: Option<String>,
}

/// A staff booking with its seat links.
#[derive(Debug, Clone, Serialize)]
pub struct ManualBookingAggregate {
    pub booking: ManualBooking,
    pub seats: Vec<BookingSeat>,
}

#[derive(Clone)]
pub struct ManualBookingCoordinator {
    pool: PgPool,
    config: Arc<EngineConfig>,
}

impl ManualBookingCoordinator {
    pub fn new(pool: PgPool, config: Arc<EngineConfig>) -> Self {
        Self { pool, config }
    }

    /// Create a staff booking entered by `staff_id`.
    pub async fn create_manual_booking(
        &self,
        staff_id: DbId,
        request: &CreateManualBookingRequest,
    ) -> EngineResult<ManualBookingAggregate> {
        validate_seat_selection(&request.seat_ids)?;
        validate_passengers_for_seats(&request.passengers, request.seat_ids.len())?;
        request.contact.validate()?;
        validate_booking_type(&request.booking_type)?;
        validate_stop(&request.boarding_stop)?;
        validate_stop(&request.alighting_stop)?;
        validate_notes(&request.notes)?;
        if !MANUAL_PAYMENT_STATUSES.contains(&request.payment_status) {
            return Err(CoreError::Validation(format!(
                "Payment status '{}' cannot be recorded on a manual booking",
                request.payment_status
            ))
            .into());
        }

        let mut tx = self.pool.begin().await?;

        let trip = TripRepo::find_for_share(&mut tx, request.trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", request.trip_id))?;
        validate_bookable(
            trip.is_bookable,
            trip.departure_at,
            Utc::now(),
            self.config.booking_cutoff_minutes,
        )?;

        let reference = fresh_reference(&mut tx, &self.config.manual_reference_prefix).await?;
        let seats = allocate_in(&mut tx, &trip, &request.seat_ids, &reference).await?;
        let total = fare_total(&seats);
        validate_manual_payment(request.payment_status, request.amount_paid, total)?;

        let booking = ManualBookingRepo::create(
            &mut tx,
            &CreateManualBooking {
                reference: reference.clone(),
                scheduled_trip_id: trip.id,
                created_by: staff_id,
                booking_type: request.booking_type.clone(),
                contact_name: request.contact.name.trim().to_string(),
                contact_phone: request.contact.phone.clone(),
                contact_email: request.contact.email.clone(),
                boarding_stop: request.boarding_stop.clone(),
                alighting_stop: request.alighting_stop.clone(),
                seat_count: seats.len() as i32,
                total_fare: total,
                payment_status: request.payment_status,
                amount_paid: request.amount_paid,
                notes: request.notes.clone(),
            },
        )
        .await?;

        let links = link_seats(
            &mut tx,
            SeatOwner::Manual(booking.id),
            trip.id,
            &reference,
            &seats,
            &request.passengers,
            PassengerStatus::Confirmed,
            &self.config.qr_signing_secret,
        )
        .await?;

        tx.commit().await?;

        info!(
            manual_booking_id = booking.id,
            trip_id = trip.id,
            reference = %reference,
            booking_type = %booking.booking_type,
            seat_count = links.len(),
            actor_id = staff_id,
            total = %total,
            "Manual booking created"
        );

        Ok(ManualBookingAggregate {
            booking,
            seats: links,
        })
    }

    pub async fn get_manual_booking(&self, booking_id: DbId) -> EngineResult<ManualBookingAggregate> {
        let mut conn = self.pool.acquire().await?;
        let booking = ManualBookingRepo::find_by_id(&mut *conn, booking_id)
            .await?
            .ok_or_else(|| not_found("ManualBooking", booking_id))?;
        load_manual_aggregate(&mut conn, booking).await
    }

    /// Staff bookings on one trip, oldest first.
    pub async fn list_manual_bookings_for_trip(&self, trip_id: DbId) -> EngineResult<Vec<ManualBooking>> {
        TripRepo::find_by_id(&self.pool, trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", trip_id))?;
        Ok(ManualBookingRepo::list_for_trip(&self.pool, trip_id).await?)
    }

    /// Overwrite the staff-recorded payment of an open booking.
    pub async fn update_manual_payment(
        &self,
        booking_id: DbId,
        payment_status: PaymentStatus,
        amount_paid: Money,
    ) -> EngineResult<ManualBooking> {
        let mut tx = self.pool.begin().await?;

        let booking = ManualBookingRepo::lock_by_id(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found("ManualBooking", booking_id))?;
        let status = manual_booking_status(&booking)?;
        if status.is_closed() {
            return Err(conflict(format!(
                "Manual booking {} is already {status}",
                booking.reference
            )));
        }
        validate_manual_payment(payment_status, amount_paid, booking.total_fare)?;

        let updated =
            ManualBookingRepo::update_payment(&mut tx, booking_id, payment_status, amount_paid).await?;
        tx.commit().await?;

        info!(
            manual_booking_id = booking_id,
            payment_status = %payment_status,
            amount_paid = %amount_paid,
            "Manual booking payment updated"
        );
        Ok(updated)
    }
}

pub(crate) async fn load_manual_aggregate(
    conn: &mut PgConnection,
    booking: ManualBooking,
) -> EngineResult<ManualBookingAggregate> {
    let seats = BookingSeatRepo::list_for_owner(&mut *conn, SeatOwner::Manual(booking.id)).await?;
    Ok(ManualBookingAggregate { booking, seats })
}

pub(crate) fn manual_booking_status(booking: &ManualBooking) -> EngineResult<BookingStatus> {
    booking.booking_status().ok_or_else(|| {
        EngineError::Core(CoreError::Internal(format!(
            "Manual booking {} has unknown status id {}",
            booking.id, booking.booking_status_id
        )))
    })
}
