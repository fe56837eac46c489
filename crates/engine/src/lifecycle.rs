//! Passenger Lifecycle Tracker: per-seat boarding state machine.
//!
//! Works on seat links from either channel. Transition legality lives in
//! `busline_core::lifecycle`; this module applies it under a row lock.

use busline_core::error::CoreError;
use busline_core::lifecycle::validate_transition;
use busline_core::status::{BookingStatus, PassengerStatus};
use busline_core::types::DbId;
use busline_db::models::booking_seat::{BookingSeat, PassengerCounts, SeatOwner};
use busline_db::models::passenger_count::TripPassengerCount;
use busline_db::models::trip::ScheduledTrip;
use busline_db::repositories::{
    BookingSeatRepo, BusBookingRepo, ManualBookingRepo, MasterBookingRepo, PassengerCountRepo,
    TripRepo,
};
use chrono::Utc;
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::info;

use crate::booking::booking_status;
use crate::error::{conflict, not_found, EngineError, EngineResult};
use crate::inventory::release_in;
use crate::manual_booking::manual_booking_status;

/// Cancellation reason recorded when a booking loses its last seat.
pub const ALL_SEATS_CANCELLED: &str = "All seats cancelled";

/// Passenger counts for a trip dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct TripPassengerTally {
    pub trip_id: DbId,
    pub total_seats: i32,
    pub counts: PassengerCounts,
    /// Links still holding a seat (everything except `cancelled`).
    pub holding_seats: i64,
    /// Staff-entered head count, if any. Not reconciled with `counts`.
    pub reported_count: Option<TripPassengerCount>,
}

#[derive(Clone)]
pub struct PassengerLifecycle {
    pool: PgPool,
}

impl PassengerLifecycle {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Move a seat link to `target` if the edge is legal from its current
    /// status.
    ///
    /// Cancelling a single link also returns its trip seat to the
    /// inventory in the same transaction. When that was the booking's last
    /// live link the booking itself is closed as cancelled.
    pub async fn set_status(
        &self,
        seat_link_id: DbId,
        target: PassengerStatus,
        actor_id: DbId,
    ) -> EngineResult<BookingSeat> {
        let mut tx = self.pool.begin().await?;

        // Lock order: owning booking first, then the link.
        let owning = if target == PassengerStatus::Cancelled {
            let unlocked = BookingSeatRepo::find_by_id(&mut *tx, seat_link_id)
                .await?
                .ok_or_else(|| not_found("BookingSeat", seat_link_id))?;
            Some(lock_owning_booking(&mut tx, &unlocked).await?)
        } else {
            None
        };

        let link = BookingSeatRepo::lock_by_id(&mut tx, seat_link_id)
            .await?
            .ok_or_else(|| not_found("BookingSeat", seat_link_id))?;
        let current = passenger_status(&link)?;
        let trip = TripRepo::find_by_id(&mut *tx, link.scheduled_trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", link.scheduled_trip_id))?;

        validate_transition(current, target, trip.departure_at, Utc::now())?;

        let updated = BookingSeatRepo::transition(&mut tx, seat_link_id, current, target, actor_id)
            .await?
            .ok_or_else(|| conflict(format!("Seat link {seat_link_id} changed concurrently")))?;

        let mut booking_closed = false;
        if target == PassengerStatus::Cancelled {
            release_in(&mut tx, &[link.trip_seat_id], Some(link.booking_reference.as_str())).await?;
            if let Some(owning) = &owning {
                booking_closed = close_if_emptied(&mut tx, owning, actor_id).await?;
            }
        }

        tx.commit().await?;

        info!(
            seat_link_id,
            trip_id = trip.id,
            reference = %updated.booking_reference,
            from = %current,
            to = %target,
            actor_id,
            booking_closed,
            "Passenger status changed"
        );
        Ok(updated)
    }

    /// Mark a passenger as present ahead of boarding.
    pub async fn check_in(&self, seat_link_id: DbId, actor_id: DbId) -> EngineResult<BookingSeat> {
        self.set_status(seat_link_id, PassengerStatus::CheckedIn, actor_id).await
    }

    /// Mark a passenger as on the bus.
    pub async fn board(&self, seat_link_id: DbId, actor_id: DbId) -> EngineResult<BookingSeat> {
        self.set_status(seat_link_id, PassengerStatus::Boarded, actor_id).await
    }

    /// Mark a checked-in passenger who did not board. Only allowed at or
    /// after departure.
    pub async fn mark_no_show(&self, seat_link_id: DbId, actor_id: DbId) -> EngineResult<BookingSeat> {
        self.set_status(seat_link_id, PassengerStatus::NoShow, actor_id).await
    }

    /// Every seat link on a trip with its current status.
    pub async fn passengers_for_trip(&self, trip_id: DbId) -> EngineResult<Vec<BookingSeat>> {
        self.require_trip(trip_id).await?;
        Ok(BookingSeatRepo::list_for_trip(&self.pool, trip_id).await?)
    }

    pub async fn passenger_counts(&self, trip_id: DbId) -> EngineResult<TripPassengerTally> {
        let trip = self.require_trip(trip_id).await?;
        let counts = BookingSeatRepo::counts_for_trip(&self.pool, trip_id).await?;
        let reported_count = PassengerCountRepo::find_for_trip(&self.pool, trip_id).await?;

        Ok(TripPassengerTally {
            trip_id,
            total_seats: trip.total_seats,
            holding_seats: counts.holding_seats(),
            counts,
            reported_count,
        })
    }

    /// Record a staff head count for a trip.
    pub async fn update_passenger_count(
        &self,
        trip_id: DbId,
        actor_id: DbId,
        count: i32,
    ) -> EngineResult<TripPassengerCount> {
        if count < 0 {
            return Err(CoreError::Validation(format!(
                "Passenger count must not be negative (got {count})"
            ))
            .into());
        }

        let mut tx = self.pool.begin().await?;
        TripRepo::find_by_id(&mut *tx, trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", trip_id))?;
        let saved = PassengerCountRepo::upsert(&mut tx, trip_id, count, actor_id).await?;
        tx.commit().await?;

        info!(trip_id, actor_id, passenger_count = count, "Passenger count updated");
        Ok(saved)
    }

    async fn require_trip(&self, trip_id: DbId) -> EngineResult<ScheduledTrip> {
        TripRepo::find_by_id(&self.pool, trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", trip_id))
    }
}

pub(crate) fn passenger_status(link: &BookingSeat) -> EngineResult<PassengerStatus> {
    link.status().ok_or_else(|| {
        EngineError::Core(CoreError::Internal(format!(
            "Seat link {} has unknown status id {}",
            link.id, link.status_id
        )))
    })
}

/// A locked booking that owns a seat link.
enum OwningBooking {
    App {
        master_id: DbId,
        bus_booking_id: DbId,
        status: BookingStatus,
    },
    Manual {
        id: DbId,
        status: BookingStatus,
    },
}

impl OwningBooking {
    fn seat_owner(&self) -> SeatOwner {
        match *self {
            OwningBooking::App { bus_booking_id, .. } => SeatOwner::Bus(bus_booking_id),
            OwningBooking::Manual { id, .. } => SeatOwner::Manual(id),
        }
    }

    fn status(&self) -> BookingStatus {
        match *self {
            OwningBooking::App { status, .. } | OwningBooking::Manual { status, .. } => status,
        }
    }
}

async fn lock_owning_booking(
    conn: &mut PgConnection,
    link: &BookingSeat,
) -> EngineResult<OwningBooking> {
    match link.owner() {
        Some(SeatOwner::Bus(bus_booking_id)) => {
            let bus_booking = BusBookingRepo::find_by_id(&mut *conn, bus_booking_id)
                .await?
                .ok_or_else(|| not_found("BusBooking", bus_booking_id))?;
            let master = MasterBookingRepo::lock_by_id(&mut *conn, bus_booking.master_booking_id)
                .await?
                .ok_or_else(|| not_found("Booking", bus_booking.master_booking_id))?;
            Ok(OwningBooking::App {
                master_id: master.id,
                bus_booking_id,
                status: booking_status(&master)?,
            })
        }
        Some(SeatOwner::Manual(id)) => {
            let booking = ManualBookingRepo::lock_by_id(&mut *conn, id)
                .await?
                .ok_or_else(|| not_found("ManualBooking", id))?;
            Ok(OwningBooking::Manual {
                id,
                status: manual_booking_status(&booking)?,
            })
        }
        None => Err(CoreError::Internal(format!("Seat link {} has no owning booking", link.id)).into()),
    }
}

/// Cancel an open booking that no longer holds any seat. Payment status is
/// left as it was.
async fn close_if_emptied(
    conn: &mut PgConnection,
    owning: &OwningBooking,
    actor_id: DbId,
) -> EngineResult<bool> {
    if owning.status().is_closed() {
        return Ok(false);
    }
    if BookingSeatRepo::count_live_for_owner(&mut *conn, owning.seat_owner()).await? > 0 {
        return Ok(false);
    }

    match *owning {
        OwningBooking::App { master_id, bus_booking_id, .. } => {
            MasterBookingRepo::cancel(&mut *conn, master_id, actor_id, Some(ALL_SEATS_CANCELLED))
                .await?;
            BusBookingRepo::set_status(&mut *conn, bus_booking_id, BookingStatus::Cancelled).await?;
            info!(booking_id = master_id, actor_id, "Booking closed after its last seat was cancelled");
        }
        OwningBooking::Manual { id, .. } => {
            ManualBookingRepo::cancel(&mut *conn, id, actor_id, Some(ALL_SEATS_CANCELLED)).await?;
            info!(manual_booking_id = id, actor_id, "Manual booking closed after its last seat was cancelled");
        }
    }
    Ok(true)
}
