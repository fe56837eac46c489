//! Repository for the `bus_bookings` table.

use busline_core::status::BookingStatus;
use busline_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::booking::{BusBooking, CreateBusBooking};

/// Column list for `bus_bookings` queries.
const COLUMNS: &str = "\
    id, master_booking_id, scheduled_trip_id, boarding_stop, alighting_stop, \
    seat_count, fare_total, status_id, created_at, updated_at";

pub struct BusBookingRepo;

impl BusBookingRepo {
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateBusBooking,
    ) -> Result<BusBooking, sqlx::Error> {
        let query = format!(
            "INSERT INTO bus_bookings \
                (master_booking_id, scheduled_trip_id, boarding_stop, alighting_stop, \
                 seat_count, fare_total, status_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BusBooking>(&query)
            .bind(input.master_booking_id)
            .bind(input.scheduled_trip_id)
            .bind(&input.boarding_stop)
            .bind(&input.alighting_stop)
            .bind(input.seat_count)
            .bind(input.fare_total)
            .bind(BookingStatus::Pending.id())
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<BusBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM bus_bookings WHERE id = $1");
        sqlx::query_as::<_, BusBooking>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_master<'e, E>(
        executor: E,
        master_booking_id: DbId,
    ) -> Result<Option<BusBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM bus_bookings WHERE master_booking_id = $1");
        sqlx::query_as::<_, BusBooking>(&query)
            .bind(master_booking_id)
            .fetch_optional(executor)
            .await
    }

    pub async fn set_status(
        conn: &mut PgConnection,
        id: DbId,
        status: BookingStatus,
    ) -> Result<BusBooking, sqlx::Error> {
        let query = format!(
            "UPDATE bus_bookings SET status_id = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, BusBooking>(&query)
            .bind(id)
            .bind(status.id())
            .fetch_one(&mut *conn)
            .await
    }
}
