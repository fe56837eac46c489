//! Repository for the `booking_seats` table (per-seat passenger links).

use busline_core::lifecycle::cancellable_statuses;
use busline_core::status::{PassengerStatus, StatusId};
use busline_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::booking_seat::{BookingSeat, CreateBookingSeat, PassengerCounts, SeatOwner};

/// Column list for `booking_seats` queries.
const COLUMNS: &str = "\
    id, scheduled_trip_id, trip_seat_id, bus_booking_id, manual_booking_id, \
    booking_reference, seat_number, seat_price, \
    passenger_name, passenger_phone, passenger_gender, passenger_id_number, \
    status_id, qr_code, checked_in_at, checked_in_by, boarded_at, boarded_by, \
    no_show_at, cancelled_at, created_at, updated_at";

/// Owner column and id for a seat link's booking.
fn owner_column(owner: SeatOwner) -> (&'static str, DbId) {
    match owner {
        SeatOwner::Bus(id) => ("bus_booking_id", id),
        SeatOwner::Manual(id) => ("manual_booking_id", id),
    }
}

pub struct BookingSeatRepo;

impl BookingSeatRepo {
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateBookingSeat,
    ) -> Result<BookingSeat, sqlx::Error> {
        let (bus_booking_id, manual_booking_id) = match input.owner {
            SeatOwner::Bus(id) => (Some(id), None),
            SeatOwner::Manual(id) => (None, Some(id)),
        };
        let query = format!(
            "INSERT INTO booking_seats \
                (scheduled_trip_id, trip_seat_id, bus_booking_id, manual_booking_id, \
                 booking_reference, seat_number, seat_price, \
                 passenger_name, passenger_phone, passenger_gender, passenger_id_number, \
                 status_id, qr_code) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(input.scheduled_trip_id)
            .bind(input.trip_seat_id)
            .bind(bus_booking_id)
            .bind(manual_booking_id)
            .bind(&input.booking_reference)
            .bind(&input.seat_number)
            .bind(input.seat_price)
            .bind(&input.passenger_name)
            .bind(&input.passenger_phone)
            .bind(&input.passenger_gender)
            .bind(&input.passenger_id_number)
            .bind(input.status.id())
            .bind(&input.qr_code)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<BookingSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM booking_seats WHERE id = $1");
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Load and row-lock one seat link for a lifecycle transition.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<BookingSeat>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM booking_seats WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Seat links owned by one booking, in seat-link order.
    pub async fn list_for_owner<'e, E>(executor: E, owner: SeatOwner) -> Result<Vec<BookingSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (column, owner_id) = owner_column(owner);
        let query = format!("SELECT {COLUMNS} FROM booking_seats WHERE {column} = $1 ORDER BY id");
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(owner_id)
            .fetch_all(executor)
            .await
    }

    /// Every seat link on a trip, across both channels.
    pub async fn list_for_trip<'e, E>(executor: E, trip_id: DbId) -> Result<Vec<BookingSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM booking_seats \
             WHERE scheduled_trip_id = $1 \
             ORDER BY seat_number, id"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(trip_id)
            .fetch_all(executor)
            .await
    }

    pub async fn list_by_reference<'e, E>(
        executor: E,
        booking_reference: &str,
    ) -> Result<Vec<BookingSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM booking_seats WHERE booking_reference = $1 ORDER BY id"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(booking_reference)
            .fetch_all(executor)
            .await
    }

    /// The most recent link for a seat number within a booking.
    pub async fn find_by_reference_and_seat<'e, E>(
        executor: E,
        booking_reference: &str,
        seat_number: &str,
    ) -> Result<Option<BookingSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM booking_seats \
             WHERE booking_reference = $1 AND seat_number = $2 \
             ORDER BY id DESC LIMIT 1"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(booking_reference)
            .bind(seat_number)
            .fetch_optional(executor)
            .await
    }

    /// Move one link from `current` to `next`, stamping the actor and time
    /// columns that belong to `next`.
    ///
    /// Returns `None` when the link is no longer in `current`.
    pub async fn transition(
        conn: &mut PgConnection,
        id: DbId,
        current: PassengerStatus,
        next: PassengerStatus,
        actor_id: DbId,
    ) -> Result<Option<BookingSeat>, sqlx::Error> {
        let (stamp, uses_actor) = match next {
            PassengerStatus::CheckedIn => (", checked_in_at = NOW(), checked_in_by = $4", true),
            PassengerStatus::Boarded => (", boarded_at = NOW(), boarded_by = $4", true),
            PassengerStatus::NoShow => (", no_show_at = NOW()", false),
            PassengerStatus::Cancelled => (", cancelled_at = NOW()", false),
            _ => ("", false),
        };
        let query = format!(
            "UPDATE booking_seats SET status_id = $3{stamp} \
             WHERE id = $1 AND status_id = $2 \
             RETURNING {COLUMNS}"
        );
        let mut q = sqlx::query_as::<_, BookingSeat>(&query)
            .bind(id)
            .bind(current.id())
            .bind(next.id());
        if uses_actor {
            q = q.bind(actor_id);
        }
        q.fetch_optional(&mut *conn).await
    }

    /// Confirm the still-pending links of a booking.
    pub async fn confirm_pending(conn: &mut PgConnection, owner: SeatOwner) -> Result<u64, sqlx::Error> {
        let (column, owner_id) = owner_column(owner);
        let query = format!(
            "UPDATE booking_seats SET status_id = $2 \
             WHERE {column} = $1 AND status_id = $3"
        );
        let result = sqlx::query(&query)
            .bind(owner_id)
            .bind(PassengerStatus::Confirmed.id())
            .bind(PassengerStatus::Pending.id())
            .execute(&mut *conn)
            .await?;
        Ok(result.rows_affected())
    }

    /// Lock every link of a booking, in id order.
    pub async fn lock_for_owner(
        conn: &mut PgConnection,
        owner: SeatOwner,
    ) -> Result<Vec<BookingSeat>, sqlx::Error> {
        let (column, owner_id) = owner_column(owner);
        let query = format!(
            "SELECT {COLUMNS} FROM booking_seats WHERE {column} = $1 ORDER BY id FOR UPDATE"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(owner_id)
            .fetch_all(&mut *conn)
            .await
    }

    /// Number of links of a booking that still hold a seat.
    pub async fn count_live_for_owner<'e, E>(executor: E, owner: SeatOwner) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (column, owner_id) = owner_column(owner);
        let query = format!("SELECT COUNT(*) FROM booking_seats WHERE {column} = $1 AND status_id <> $2");
        sqlx::query_scalar(&query)
            .bind(owner_id)
            .bind(PassengerStatus::Cancelled.id())
            .fetch_one(executor)
            .await
    }

    /// Cancel the links of a booking that are still before boarding.
    ///
    /// Boarded, completed and no-show links are left untouched.
    pub async fn cancel_for_owner(
        conn: &mut PgConnection,
        owner: SeatOwner,
    ) -> Result<Vec<BookingSeat>, sqlx::Error> {
        let (column, owner_id) = owner_column(owner);
        let cancellable: Vec<StatusId> = cancellable_statuses().map(PassengerStatus::id).collect();
        let query = format!(
            "UPDATE booking_seats SET status_id = $2, cancelled_at = NOW() \
             WHERE {column} = $1 AND status_id = ANY($3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BookingSeat>(&query)
            .bind(owner_id)
            .bind(PassengerStatus::Cancelled.id())
            .bind(cancellable)
            .fetch_all(&mut *conn)
            .await
    }

    /// Link counts per lifecycle status for one trip.
    pub async fn counts_for_trip<'e, E>(executor: E, trip_id: DbId) -> Result<PassengerCounts, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let rows: Vec<(StatusId, i64)> = sqlx::query_as(
            "SELECT status_id, COUNT(*) FROM booking_seats \
             WHERE scheduled_trip_id = $1 \
             GROUP BY status_id",
        )
        .bind(trip_id)
        .fetch_all(executor)
        .await?;

        let mut counts = PassengerCounts::default();
        for (status_id, count) in rows {
            match PassengerStatus::from_id(status_id) {
                Some(PassengerStatus::Pending) => counts.pending = count,
                Some(PassengerStatus::Confirmed) => counts.confirmed = count,
                Some(PassengerStatus::CheckedIn) => counts.checked_in = count,
                Some(PassengerStatus::Boarded) => counts.boarded = count,
                Some(PassengerStatus::Completed) => counts.completed = count,
                Some(PassengerStatus::Cancelled) => counts.cancelled = count,
                Some(PassengerStatus::NoShow) => counts.no_show = count,
                None => {
                    tracing::warn!(trip_id, status_id, "Unknown passenger status in booking_seats");
                }
            }
        }
        Ok(counts)
    }
}
