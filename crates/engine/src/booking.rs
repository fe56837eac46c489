//! Booking Coordinator: self-service (app) bookings.

use std::sync::Arc;

use busline_core::booking::{
    validate_bookable, validate_passengers_for_seats, validate_stop, ContactInfo, PassengerDetails,
};
use busline_core::error::CoreError;
use busline_core::seat::{fare_total, validate_seat_selection};
use busline_core::status::{BookingStatus, PassengerStatus, PaymentStatus};
use busline_core::types::DbId;
use busline_db::models::booking::{BusBooking, CreateBusBooking, CreateMasterBooking, MasterBooking};
use busline_db::models::booking_seat::{BookingSeat, SeatOwner};
use busline_db::repositories::{BookingSeatRepo, BusBookingRepo, MasterBookingRepo, TripRepo};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::allocation::{fresh_reference, link_seats};
use crate::config::EngineConfig;
use crate::error::{conflict, not_found, EngineError, EngineResult};
use crate::inventory::allocate_in;

/// Input for [`BookingCoordinator::create_booking`].
#[derive(Debug, Clone, Deserialize)]
pub struct CreateBookingRequest {
    pub trip_id: DbId,
    pub seat_ids: Vec<DbId>,
    /// One entry per seat, in the same order as `seat_ids`.
    pub passengers: Vec<PassengerDetails>,
    pub contact: ContactInfo,
    pub boarding_stop: Option<String>,
    pub alighting_stop: Option<String>,
}

/// A master booking with its bus slice and seat links.
#[derive(Debug, Clone, Serialize)]
pub struct BookingAggregate {
    pub booking: MasterBooking,
    pub bus_booking: BusBooking,
    pub seats: Vec<BookingSeat>,
}

#[derive(Clone)]
pub struct BookingCoordinator {
    pool: PgPool,
    config: Arc<EngineConfig>,
}

impl BookingCoordinator {
    pub fn new(pool: PgPool, config: Arc<EngineConfig>) -> Self {
        Self { pool, config }
    }

    /// Create an app booking for `user_id`.
    ///
    /// Seat allocation and every insert share one transaction: either the
    /// whole aggregate exists afterwards or nothing changed.
    pub async fn create_booking(
        &self,
        user_id: DbId,
        request: &CreateBookingRequest,
    ) -> EngineResult<BookingAggregate> {
        validate_seat_selection(&request.seat_ids)?;
        validate_passengers_for_seats(&request.passengers, request.seat_ids.len())?;
        request.contact.validate()?;
        validate_stop(&request.boarding_stop)?;
        validate_stop(&request.alighting_stop)?;

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

        let reference = fresh_reference(&mut tx, &self.config.app_reference_prefix).await?;
        let seats = allocate_in(&mut tx, &trip, &request.seat_ids, &reference).await?;
        let total = fare_total(&seats);

        let booking = MasterBookingRepo::create(
            &mut tx,
            &CreateMasterBooking {
                reference: reference.clone(),
                user_id,
                subtotal: total,
                total_amount: total,
                contact_name: request.contact.name.trim().to_string(),
                contact_phone: request.contact.phone.clone(),
                contact_email: request.contact.email.clone(),
            },
        )
        .await?;

        let bus_booking = BusBookingRepo::create(
            &mut tx,
            &CreateBusBooking {
                master_booking_id: booking.id,
                scheduled_trip_id: trip.id,
                boarding_stop: request.boarding_stop.clone(),
                alighting_stop: request.alighting_stop.clone(),
                seat_count: seats.len() as i32,
                fare_total: total,
            },
        )
        .await?;

        let links = link_seats(
            &mut tx,
            SeatOwner::Bus(bus_booking.id),
            trip.id,
            &reference,
            &seats,
            &request.passengers,
            PassengerStatus::Pending,
            &self.config.qr_signing_secret,
        )
        .await?;

        tx.commit().await?;

        info!(
            booking_id = booking.id,
            trip_id = trip.id,
            reference = %reference,
            seat_count = links.len(),
            actor_id = user_id,
            total = %total,
            "Booking created"
        );

        Ok(BookingAggregate {
            booking,
            bus_booking,
            seats: links,
        })
    }

    pub async fn get_booking(&self, booking_id: DbId) -> EngineResult<BookingAggregate> {
        let mut conn = self.pool.acquire().await?;
        let booking = MasterBookingRepo::find_by_id(&mut *conn, booking_id)
            .await?
            .ok_or_else(|| not_found("Booking", booking_id))?;
        load_aggregate(&mut conn, booking).await
    }

    pub async fn get_booking_by_reference(&self, reference: &str) -> EngineResult<BookingAggregate> {
        let mut conn = self.pool.acquire().await?;
        let booking = MasterBookingRepo::find_by_reference(&mut *conn, reference.trim())
            .await?
            .ok_or_else(|| {
                EngineError::Core(CoreError::ReferenceNotFound {
                    entity: "Booking",
                    reference: reference.trim().to_string(),
                })
            })?;
        load_aggregate(&mut conn, booking).await
    }

    /// Bookings of one user, newest first.
    pub async fn list_bookings_for_user(&self, user_id: DbId) -> EngineResult<Vec<MasterBooking>> {
        Ok(MasterBookingRepo::list_for_user(&self.pool, user_id).await?)
    }

    /// Record the external payment confirmation for a booking.
    ///
    /// Payment becomes `paid`, the booking and its pending seat links
    /// become `confirmed`. Repeating the call on a paid booking changes
    /// nothing; a cancelled or completed booking is a conflict even when
    /// it was paid.
    pub async fn confirm_payment(&self, booking_id: DbId) -> EngineResult<BookingAggregate> {
        let mut tx = self.pool.begin().await?;

        let booking = MasterBookingRepo::lock_by_id(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found("Booking", booking_id))?;

        let status = booking_status(&booking)?;
        if status.is_closed() {
            return Err(conflict(format!("Booking {} is already {status}", booking.reference)));
        }

        if booking.payment_status() == Some(PaymentStatus::Paid) {
            let aggregate = load_aggregate(&mut tx, booking).await?;
            tx.commit().await?;
            return Ok(aggregate);
        }

        let booking = MasterBookingRepo::mark_paid(&mut tx, booking_id).await?;
        let bus_booking = BusBookingRepo::find_by_master(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| missing_bus_booking(booking_id))?;
        BusBookingRepo::set_status(&mut tx, bus_booking.id, BookingStatus::Confirmed).await?;
        let confirmed = BookingSeatRepo::confirm_pending(&mut tx, SeatOwner::Bus(bus_booking.id)).await?;

        let aggregate = load_aggregate(&mut tx, booking).await?;
        tx.commit().await?;

        info!(
            booking_id,
            reference = %aggregate.booking.reference,
            seat_count = confirmed,
            "Booking payment confirmed"
        );
        Ok(aggregate)
    }
}

pub(crate) async fn load_aggregate(
    conn: &mut PgConnection,
    booking: MasterBooking,
) -> EngineResult<BookingAggregate> {
    let bus_booking = BusBookingRepo::find_by_master(&mut *conn, booking.id)
        .await?
        .ok_or_else(|| missing_bus_booking(booking.id))?;
    let seats = BookingSeatRepo::list_for_owner(&mut *conn, SeatOwner::Bus(bus_booking.id)).await?;
    Ok(BookingAggregate {
        booking,
        bus_booking,
        seats,
    })
}

pub(crate) fn booking_status(booking: &MasterBooking) -> EngineResult<BookingStatus> {
    booking.booking_status().ok_or_else(|| {
        EngineError::Core(CoreError::Internal(format!(
            "Booking {} has unknown status id {}",
            booking.id, booking.booking_status_id
        )))
    })
}

pub(crate) fn missing_bus_booking(master_booking_id: DbId) -> EngineError {
    EngineError::Core(CoreError::Internal(format!(
        "Booking {master_booking_id} has no bus booking"
    )))
}
