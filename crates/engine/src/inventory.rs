//! Seat Inventory: the only component that changes `trip_seats.status_id`.
//!
//! Public methods each run in their own transaction and never book or
//! release a seat. Allocation and release happen only through the `*_in`
//! functions, on the caller's connection, so the booking coordinators and
//! the cancellation handler change seats and seat links together.

use std::collections::HashSet;

use busline_core::error::CoreError;
use busline_core::seat::{
    resolve_seat_price, validate_block_reason, validate_layout, validate_price,
    validate_seat_ids, validate_seat_selection, validate_seat_type, PricedSeat, SeatSummary,
};
use busline_core::status::SeatStatus;
use busline_core::types::{DbId, Money};
use busline_db::models::trip::ScheduledTrip;
use busline_db::models::trip_seat::{SeatLayoutEntry, TripSeat};
use busline_db::repositories::{TripRepo, TripSeatRepo};
use serde::Serialize;
use sqlx::{PgConnection, PgPool};
use tracing::{info, warn};

use crate::error::{conflict, not_found, EngineResult};

/// Result of a read-only availability check.
///
/// When `available.len() != requested` the request as a whole must be
/// treated as failed.
#[derive(Debug, Clone, Serialize)]
pub struct Availability {
    pub requested: usize,
    pub available: Vec<PricedSeat>,
}

impl Availability {
    pub fn is_complete(&self) -> bool {
        self.available.len() == self.requested
    }
}

#[derive(Clone)]
pub struct SeatInventory {
    pool: PgPool,
}

impl SeatInventory {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// All seats of a trip with current status and price.
    pub async fn list_seats(&self, trip_id: DbId) -> EngineResult<Vec<TripSeat>> {
        require_trip(&self.pool, trip_id).await?;
        Ok(TripSeatRepo::list_for_trip(&self.pool, trip_id).await?)
    }

    pub async fn seat_summary(&self, trip_id: DbId) -> EngineResult<SeatSummary> {
        require_trip(&self.pool, trip_id).await?;
        Ok(TripSeatRepo::summary(&self.pool, trip_id).await?)
    }

    /// The requested seats that are available right now, priced.
    pub async fn check_availability(
        &self,
        trip_id: DbId,
        seat_ids: &[DbId],
    ) -> EngineResult<Availability> {
        validate_seat_ids(seat_ids)?;
        let trip = require_trip(&self.pool, trip_id).await?;
        let seats = TripSeatRepo::find_available(&self.pool, trip_id, seat_ids).await?;

        Ok(Availability {
            requested: seat_ids.len(),
            available: seats.iter().map(|s| price_seat(s, &trip)).collect(),
        })
    }

    /// Bulk-instantiate a trip's seats from a layout. A trip's seats are
    /// created once; a second call is a conflict.
    pub async fn create_trip_seats(
        &self,
        trip_id: DbId,
        seats: &[SeatLayoutEntry],
    ) -> EngineResult<Vec<TripSeat>> {
        let numbers: Vec<&str> = seats.iter().map(|s| s.seat_number.as_str()).collect();
        for seat in seats {
            validate_seat_type(&seat.seat_type)?;
            if let Some(price) = seat.price {
                validate_price(price)?;
            }
        }

        let mut tx = self.pool.begin().await?;

        let trip = TripRepo::find_for_share(&mut tx, trip_id)
            .await?
            .ok_or_else(|| not_found("ScheduledTrip", trip_id))?;

        if TripSeatRepo::count_for_trip(&mut *tx, trip_id).await? > 0 {
            return Err(conflict(format!("Trip {trip_id} already has seats")));
        }
        validate_layout(&numbers, trip.total_seats)?;

        let created = TripSeatRepo::bulk_insert(&mut tx, trip_id, seats).await?;
        tx.commit().await?;

        info!(trip_id, seat_count = created.len(), "Trip seats created");
        Ok(created)
    }

    /// Put seats on a maintenance hold. Any booked seat in the set fails
    /// the whole request.
    pub async fn block(
        &self,
        trip_id: DbId,
        seat_ids: &[DbId],
        actor_id: DbId,
        reason: &str,
    ) -> EngineResult<Vec<TripSeat>> {
        validate_seat_ids(seat_ids)?;
        validate_block_reason(reason)?;

        let mut tx = self.pool.begin().await?;
        let locked = lock_all(&mut tx, trip_id, seat_ids).await?;

        let booked: Vec<&str> = locked
            .iter()
            .filter(|s| s.status() == SeatStatus::Booked)
            .map(|s| s.seat_number.as_str())
            .collect();
        if !booked.is_empty() {
            return Err(conflict(format!(
                "Booked seats cannot be blocked: {}",
                booked.join(", ")
            )));
        }

        let blocked = TripSeatRepo::block(&mut tx, trip_id, seat_ids, actor_id, reason.trim()).await?;
        tx.commit().await?;

        info!(trip_id, actor_id, seat_count = blocked.len(), "Seats blocked");
        Ok(blocked)
    }

    /// Lift maintenance holds. Seats that are not blocked are left as-is
    /// and are not part of the returned set.
    pub async fn unblock(&self, trip_id: DbId, seat_ids: &[DbId]) -> EngineResult<Vec<TripSeat>> {
        validate_seat_ids(seat_ids)?;

        let mut tx = self.pool.begin().await?;
        lock_all(&mut tx, trip_id, seat_ids).await?;
        let unblocked = TripSeatRepo::unblock(&mut tx, trip_id, seat_ids).await?;
        tx.commit().await?;

        info!(trip_id, seat_count = unblocked.len(), "Seats unblocked");
        Ok(unblocked)
    }

    /// Set a price override on the requested seats that are not booked.
    pub async fn reprice(
        &self,
        trip_id: DbId,
        seat_ids: &[DbId],
        price: Money,
    ) -> EngineResult<Vec<TripSeat>> {
        validate_seat_ids(seat_ids)?;
        validate_price(price)?;

        let mut tx = self.pool.begin().await?;
        lock_all(&mut tx, trip_id, seat_ids).await?;
        let repriced = TripSeatRepo::reprice(&mut tx, trip_id, seat_ids, price).await?;
        tx.commit().await?;

        info!(trip_id, seat_count = repriced.len(), %price, "Seats repriced");
        Ok(repriced)
    }
}

// ---------------------------------------------------------------------------
// Transaction-scoped operations
// ---------------------------------------------------------------------------

/// Atomically move exactly `seat_ids` from available to booked.
///
/// Only the booking coordinators call this, inside the transaction that
/// also writes the seat links, so a booked seat always has a live link.
///
/// The seat rows are locked first, so availability is re-verified under
/// the lock and the guarded update cannot race another allocation. Any
/// seat that is missing or not available fails the call; the caller's
/// transaction must then be rolled back so nothing changes. The returned
/// seats follow the order of `seat_ids`.
pub async fn allocate_in(
    conn: &mut PgConnection,
    trip: &ScheduledTrip,
    seat_ids: &[DbId],
    booking_reference: &str,
) -> EngineResult<Vec<PricedSeat>> {
    validate_seat_selection(seat_ids)?;

    let locked = lock_all(conn, trip.id, seat_ids).await?;

    let unavailable: Vec<&str> = locked
        .iter()
        .filter(|s| !s.is_available())
        .map(|s| s.seat_number.as_str())
        .collect();
    if !unavailable.is_empty() {
        warn!(
            trip_id = trip.id,
            reference = booking_reference,
            seats = %unavailable.join(","),
            "Seat allocation conflict"
        );
        return Err(conflict(format!(
            "Seats not available: {}",
            unavailable.join(", ")
        )));
    }

    let changed = TripSeatRepo::mark_booked(conn, trip.id, seat_ids, booking_reference).await?;
    if changed != seat_ids.len() as u64 {
        warn!(
            trip_id = trip.id,
            reference = booking_reference,
            requested = seat_ids.len(),
            changed,
            "Seat allocation changed fewer rows than requested"
        );
        return Err(conflict("Seats not available"));
    }

    let mut priced: Vec<PricedSeat> = Vec::with_capacity(seat_ids.len());
    for id in seat_ids {
        if let Some(seat) = locked.iter().find(|s| s.id == *id) {
            priced.push(price_seat(seat, trip));
        }
    }
    Ok(priced)
}

/// Move booked seats back to available, optionally only those stamped
/// with `booking_reference`.
pub async fn release_in(
    conn: &mut PgConnection,
    seat_ids: &[DbId],
    booking_reference: Option<&str>,
) -> EngineResult<u64> {
    if seat_ids.is_empty() {
        return Ok(0);
    }
    let released = TripSeatRepo::release(conn, seat_ids, booking_reference).await?;
    info!(seat_count = released, reference = booking_reference, "Seats released");
    Ok(released)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn require_trip(pool: &PgPool, trip_id: DbId) -> EngineResult<ScheduledTrip> {
    TripRepo::find_by_id(pool, trip_id)
        .await?
        .ok_or_else(|| not_found("ScheduledTrip", trip_id))
}

/// Lock every requested seat of the trip; any id that is not a seat of
/// the trip is `NotFound`.
async fn lock_all(
    conn: &mut PgConnection,
    trip_id: DbId,
    seat_ids: &[DbId],
) -> EngineResult<Vec<TripSeat>> {
    let locked = TripSeatRepo::lock_for_update(conn, trip_id, seat_ids).await?;
    if locked.len() != seat_ids.len() {
        let found: HashSet<DbId> = locked.iter().map(|s| s.id).collect();
        let missing = seat_ids
            .iter()
            .copied()
            .find(|id| !found.contains(id))
            .unwrap_or_default();
        return Err(CoreError::NotFound {
            entity: "TripSeat",
            id: missing,
        }
        .into());
    }
    Ok(locked)
}

fn price_seat(seat: &TripSeat, trip: &ScheduledTrip) -> PricedSeat {
    PricedSeat {
        trip_seat_id: seat.id,
        seat_number: seat.seat_number.clone(),
        price: resolve_seat_price(seat.price, trip.base_fare),
    }
}
