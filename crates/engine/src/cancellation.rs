//! Cancellation Handler: closes a booking and returns its seats.
//!
//! Booking status, seat links and trip seats change in one transaction so
//! a booking is never cancelled with its seats still booked, nor the
//! reverse. The refund decision is computed here and handed to an
//! external refund process.

use std::sync::Arc;

use busline_core::cancellation::{
    app_refund, manual_refund, validate_cancellable, validate_reason, RefundDecision,
};
use busline_core::lifecycle::validate_group_cancellation;
use busline_core::status::{BookingStatus, PaymentStatus};
use busline_core::types::{DbId, Timestamp};
use busline_db::models::booking_seat::SeatOwner;
use busline_db::repositories::{
    BookingSeatRepo, BusBookingRepo, ManualBookingRepo, MasterBookingRepo, TripRepo,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::allocation::BookingChannel;
use crate::booking::{booking_status, missing_bus_booking};
use crate::config::EngineConfig;
use crate::error::{not_found, EngineResult};
use crate::inventory::release_in;
use crate::lifecycle::passenger_status;
use crate::manual_booking::manual_booking_status;

/// What a cancellation did and what the refund process should do.
#[derive(Debug, Clone, Serialize)]
pub struct CancellationOutcome {
    pub channel: BookingChannel,
    pub booking_id: DbId,
    pub reference: String,
    pub seats_released: u64,
    #[serde(flatten)]
    pub refund: RefundDecision,
    pub cancelled_at: Option<Timestamp>,
}

#[derive(Clone)]
pub struct CancellationHandler {
    pool: PgPool,
    config: Arc<EngineConfig>,
}

impl CancellationHandler {
    pub fn new(pool: PgPool, config: Arc<EngineConfig>) -> Self {
        Self { pool, config }
    }

    /// Cancel an app booking. A paid booking is refunded in full.
    pub async fn cancel(
        &self,
        booking_id: DbId,
        actor_id: DbId,
        reason: Option<String>,
    ) -> EngineResult<CancellationOutcome> {
        validate_reason(&reason)?;

        let mut tx = self.pool.begin().await?;

        let booking = MasterBookingRepo::lock_by_id(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found("Booking", booking_id))?;
        let bus_booking = BusBookingRepo::find_by_master(&mut *tx, booking_id)
            .await?
            .ok_or_else(|| missing_bus_booking(booking_id))?;
        let trip = TripRepo::find_by_id(&mut *tx, bus_booking.scheduled_trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", bus_booking.scheduled_trip_id))?;

        validate_cancellable(
            booking_status(&booking)?,
            trip.departure_at,
            Utc::now(),
            self.config.cancellation_cutoff_minutes,
        )?;
        let owner = SeatOwner::Bus(bus_booking.id);
        lock_cancellable_links(&mut tx, owner).await?;
        let prior_payment = booking.payment_status().unwrap_or(PaymentStatus::Pending);

        let cancelled =
            MasterBookingRepo::cancel(&mut tx, booking_id, actor_id, reason.as_deref()).await?;
        BusBookingRepo::set_status(&mut tx, bus_booking.id, BookingStatus::Cancelled).await?;
        let links = BookingSeatRepo::cancel_for_owner(&mut tx, owner).await?;
        let seat_ids: Vec<DbId> = links.iter().map(|l| l.trip_seat_id).collect();
        let seats_released = release_in(&mut tx, &seat_ids, Some(cancelled.reference.as_str())).await?;

        tx.commit().await?;

        let refund = app_refund(prior_payment, cancelled.total_amount);
        info!(
            booking_id,
            trip_id = trip.id,
            reference = %cancelled.reference,
            seat_count = seats_released,
            actor_id,
            refund_needed = refund.refund_needed,
            refund_amount = %refund.refund_amount,
            "Booking cancelled"
        );

        Ok(CancellationOutcome {
            channel: BookingChannel::App,
            booking_id,
            reference: cancelled.reference,
            seats_released,
            refund,
            cancelled_at: cancelled.cancelled_at,
        })
    }

    /// Cancel a staff booking. Whatever was collected is refunded.
    pub async fn cancel_manual_booking(
        &self,
        booking_id: DbId,
        actor_id: DbId,
        reason: Option<String>,
    ) -> EngineResult<CancellationOutcome> {
        validate_reason(&reason)?;

        let mut tx = self.pool.begin().await?;

        let booking = ManualBookingRepo::lock_by_id(&mut tx, booking_id)
            .await?
            .ok_or_else(|| not_found("ManualBooking", booking_id))?;
        let trip = TripRepo::find_by_id(&mut *tx, booking.scheduled_trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", booking.scheduled_trip_id))?;

        validate_cancellable(
            manual_booking_status(&booking)?,
            trip.departure_at,
            Utc::now(),
            self.config.cancellation_cutoff_minutes,
        )?;
        let owner = SeatOwner::Manual(booking_id);
        lock_cancellable_links(&mut tx, owner).await?;
        let prior_payment = booking.payment_status().unwrap_or(PaymentStatus::Pending);

        let cancelled =
            ManualBookingRepo::cancel(&mut tx, booking_id, actor_id, reason.as_deref()).await?;
        let links = BookingSeatRepo::cancel_for_owner(&mut tx, owner).await?;
        let seat_ids: Vec<DbId> = links.iter().map(|l| l.trip_seat_id).collect();
        let seats_released = release_in(&mut tx, &seat_ids, Some(cancelled.reference.as_str())).await?;

        tx.commit().await?;

        let refund = manual_refund(prior_payment, cancelled.amount_paid);
        info!(
            manual_booking_id = booking_id,
            trip_id = trip.id,
            reference = %cancelled.reference,
            seat_count = seats_released,
            actor_id,
            refund_needed = refund.refund_needed,
            refund_amount = %refund.refund_amount,
            "Manual booking cancelled"
        );

        Ok(CancellationOutcome {
            channel: BookingChannel::Manual,
            booking_id,
            reference: cancelled.reference,
            seats_released,
            refund,
            cancelled_at: cancelled.cancelled_at,
        })
    }
}

/// Lock a booking's seat links and refuse the cancellation when any
/// passenger is already past boarding.
async fn lock_cancellable_links(conn: &mut PgConnection, owner: SeatOwner) -> EngineResult<()> {
    let links = BookingSeatRepo::lock_for_owner(conn, owner).await?;
    let statuses = links
        .iter()
        .map(passenger_status)
        .collect::<EngineResult<Vec<_>>>()?;
    validate_group_cancellation(statuses)?;
    Ok(())
}
