//! Read access to the `scheduled_trips` table.

use busline_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::trip::ScheduledTrip;

/// Column list for `scheduled_trips` queries.
const COLUMNS: &str = "\
    id, route_label, bus_number, departure_at, arrival_at, \
    base_fare, total_seats, is_bookable, created_at, updated_at";

/// Trips are owned by the schedule provider; this repo only reads them.
pub struct TripRepo;

impl TripRepo {
    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<ScheduledTrip>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM scheduled_trips WHERE id = $1");
        sqlx::query_as::<_, ScheduledTrip>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    /// Take a shared lock on the trip row so `total_seats` and
    /// `is_bookable` cannot change under an in-flight transaction.
    pub async fn find_for_share(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ScheduledTrip>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scheduled_trips WHERE id = $1 FOR SHARE");
        sqlx::query_as::<_, ScheduledTrip>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }
}
