//! Repository for the `trip_passenger_counts` override table.

use busline_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::passenger_count::TripPassengerCount;

pub struct PassengerCountRepo;

impl PassengerCountRepo {
    /// Insert or overwrite the head count for a trip.
    pub async fn upsert(
        conn: &mut PgConnection,
        trip_id: DbId,
        passenger_count: i32,
        actor_id: DbId,
    ) -> Result<TripPassengerCount, sqlx::Error> {
        sqlx::query_as::<_, TripPassengerCount>(
            "INSERT INTO trip_passenger_counts (scheduled_trip_id, passenger_count, updated_by) \
             VALUES ($1, $2, $3) \
             ON CONFLICT (scheduled_trip_id) DO UPDATE \
             SET passenger_count = EXCLUDED.passenger_count, \
                 updated_by = EXCLUDED.updated_by, \
                 updated_at = NOW() \
             RETURNING scheduled_trip_id, passenger_count, updated_by, updated_at",
        )
        .bind(trip_id)
        .bind(passenger_count)
        .bind(actor_id)
        .fetch_one(&mut *conn)
        .await
    }

    pub async fn find_for_trip<'e, E>(
        executor: E,
        trip_id: DbId,
    ) -> Result<Option<TripPassengerCount>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        sqlx::query_as::<_, TripPassengerCount>(
            "SELECT scheduled_trip_id, passenger_count, updated_by, updated_at \
             FROM trip_passenger_counts WHERE scheduled_trip_id = $1",
        )
        .bind(trip_id)
        .fetch_optional(executor)
        .await
    }
}
