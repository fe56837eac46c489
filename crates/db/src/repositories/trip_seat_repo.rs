//! Repository for the `trip_seats` table (seat inventory).
//!
//! Every status change is guarded by the current status in its `WHERE`
//! clause, so callers can compare the affected row count against what
//! they asked for.

use busline_core::seat::SeatSummary;
use busline_core::status::SeatStatus;
use busline_core::types::{DbId, Money};
use sqlx::{PgConnection, PgExecutor, Postgres, QueryBuilder};

use crate::models::trip_seat::{SeatLayoutEntry, TripSeat};

/// Column list for `trip_seats` queries.
const COLUMNS: &str = "\
    id, scheduled_trip_id, seat_number, seat_type, row_number, column_number, \
    price, status_id, blocked_by, block_reason, booking_reference, \
    created_at, updated_at";

pub struct TripSeatRepo;

impl TripSeatRepo {
    /// All seats of a trip ordered by row, column, then seat number.
    pub async fn list_for_trip<'e, E>(executor: E, trip_id: DbId) -> Result<Vec<TripSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_seats \
             WHERE scheduled_trip_id = $1 \
             ORDER BY row_number NULLS LAST, column_number NULLS LAST, seat_number"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .fetch_all(executor)
            .await
    }

    /// The requested seats of a trip, whatever their status.
    pub async fn find_by_ids<'e, E>(
        executor: E,
        trip_id: DbId,
        seat_ids: &[DbId],
    ) -> Result<Vec<TripSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_seats \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) \
             ORDER BY id"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .fetch_all(executor)
            .await
    }

    /// The subset of the requested seats that is currently available.
    pub async fn find_available<'e, E>(
        executor: E,
        trip_id: DbId,
        seat_ids: &[DbId],
    ) -> Result<Vec<TripSeat>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_seats \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) AND status_id = $3 \
             ORDER BY id"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .bind(SeatStatus::Available.id())
            .fetch_all(executor)
            .await
    }

    /// Row-lock the requested seats of a trip.
    ///
    /// Rows are locked in ascending `id` order so two transactions with
    /// overlapping selections always acquire locks in the same order.
    pub async fn lock_for_update(
        conn: &mut PgConnection,
        trip_id: DbId,
        seat_ids: &[DbId],
    ) -> Result<Vec<TripSeat>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM trip_seats \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) \
             ORDER BY id \
             FOR UPDATE"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .fetch_all(&mut *conn)
            .await
    }

    /// Flip available seats to booked and stamp the booking reference.
    ///
    /// Returns the number of rows changed; fewer than `seat_ids.len()`
    /// means at least one seat was no longer available.
    pub async fn mark_booked(
        conn: &mut PgConnection,
        trip_id: DbId,
        seat_ids: &[DbId],
        booking_reference: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE trip_seats \
             SET status_id = $4, booking_reference = $3 \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) AND status_id = $5",
        )
        .bind(trip_id)
        .bind(seat_ids)
        .bind(booking_reference)
        .bind(SeatStatus::Booked.id())
        .bind(SeatStatus::Available.id())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Return booked seats to available and clear their reference.
    ///
    /// When `booking_reference` is given only seats stamped with that
    /// reference are released.
    pub async fn release(
        conn: &mut PgConnection,
        seat_ids: &[DbId],
        booking_reference: Option<&str>,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE trip_seats \
             SET status_id = $3, booking_reference = NULL \
             WHERE id = ANY($1) AND status_id = $4 \
               AND ($2::TEXT IS NULL OR booking_reference = $2)",
        )
        .bind(seat_ids)
        .bind(booking_reference)
        .bind(SeatStatus::Available.id())
        .bind(SeatStatus::Booked.id())
        .execute(&mut *conn)
        .await?;
        Ok(result.rows_affected())
    }

    /// Place available or already-blocked seats on a maintenance hold.
    /// Booked seats are left untouched.
    pub async fn block(
        conn: &mut PgConnection,
        trip_id: DbId,
        seat_ids: &[DbId],
        actor_id: DbId,
        reason: &str,
    ) -> Result<Vec<TripSeat>, sqlx::Error> {
        let query = format!(
            "UPDATE trip_seats \
             SET status_id = $5, blocked_by = $3, block_reason = $4 \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) AND status_id IN ($5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .bind(actor_id)
            .bind(reason)
            .bind(SeatStatus::Blocked.id())
            .bind(SeatStatus::Available.id())
            .fetch_all(&mut *conn)
            .await
    }

    /// Lift maintenance holds. Only seats currently blocked change.
    pub async fn unblock(
        conn: &mut PgConnection,
        trip_id: DbId,
        seat_ids: &[DbId],
    ) -> Result<Vec<TripSeat>, sqlx::Error> {
        let query = format!(
            "UPDATE trip_seats \
             SET status_id = $3, blocked_by = NULL, block_reason = NULL \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) AND status_id = $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .bind(SeatStatus::Available.id())
            .bind(SeatStatus::Blocked.id())
            .fetch_all(&mut *conn)
            .await
    }

    /// Set the price of the requested seats that are not booked.
    pub async fn reprice(
        conn: &mut PgConnection,
        trip_id: DbId,
        seat_ids: &[DbId],
        price: Money,
    ) -> Result<Vec<TripSeat>, sqlx::Error> {
        let query = format!(
            "UPDATE trip_seats \
             SET price = $3 \
             WHERE scheduled_trip_id = $1 AND id = ANY($2) AND status_id <> $4 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, TripSeat>(&query)
            .bind(trip_id)
            .bind(seat_ids)
            .bind(price)
            .bind(SeatStatus::Booked.id())
            .fetch_all(&mut *conn)
            .await
    }

    /// Number of seat rows a trip already has.
    pub async fn count_for_trip<'e, E>(executor: E, trip_id: DbId) -> Result<i64, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM trip_seats WHERE scheduled_trip_id = $1")
                .bind(trip_id)
                .fetch_one(executor)
                .await?;
        Ok(count)
    }

    /// Insert a trip's whole seat layout in one statement. All seats start
    /// available.
    pub async fn bulk_insert(
        conn: &mut PgConnection,
        trip_id: DbId,
        seats: &[SeatLayoutEntry],
    ) -> Result<Vec<TripSeat>, sqlx::Error> {
        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO trip_seats \
             (scheduled_trip_id, seat_number, seat_type, row_number, column_number, price, status_id) ",
        );
        builder.push_values(seats, |mut row, seat| {
            row.push_bind(trip_id)
                .push_bind(seat.seat_number.trim().to_string())
                .push_bind(seat.seat_type.clone())
                .push_bind(seat.row_number)
                .push_bind(seat.column_number)
                .push_bind(seat.price)
                .push_bind(SeatStatus::Available.id());
        });
        builder.push(format!(" RETURNING {COLUMNS}"));

        let mut inserted = builder
            .build_query_as::<TripSeat>()
            .fetch_all(&mut *conn)
            .await?;
        inserted.sort_by_key(|s| s.id);
        Ok(inserted)
    }

    /// Seat counts by status, read in a single statement so the totals
    /// come from one snapshot.
    pub async fn summary<'e, E>(executor: E, trip_id: DbId) -> Result<SeatSummary, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let (total, available, blocked, booked): (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT COUNT(*), \
                    COUNT(*) FILTER (WHERE status_id = $2), \
                    COUNT(*) FILTER (WHERE status_id = $3), \
                    COUNT(*) FILTER (WHERE status_id = $4) \
             FROM trip_seats WHERE scheduled_trip_id = $1",
        )
        .bind(trip_id)
        .bind(SeatStatus::Available.id())
        .bind(SeatStatus::Blocked.id())
        .bind(SeatStatus::Booked.id())
        .fetch_one(executor)
        .await?;

        Ok(SeatSummary {
            total,
            available,
            blocked,
            booked,
        })
    }
}
