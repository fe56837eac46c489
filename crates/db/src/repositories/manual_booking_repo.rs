//! Repository for the `manual_seat_bookings` table (staff bookings).

use busline_core::status::{BookingStatus, PaymentStatus};
use busline_core::types::{DbId, Money};
use sqlx::{PgConnection, PgExecutor};

use crate::models::manual_booking::{CreateManualBooking, ManualBooking};

/// Column list for `manual_seat_bookings` queries.
const COLUMNS: &str = "\
    id, reference, scheduled_trip_id, created_by, booking_type, \
    contact_name, contact_phone, contact_email, boarding_stop, alighting_stop, \
    seat_count, total_fare, payment_status_id, amount_paid, booking_status_id, notes, \
    cancelled_at, cancelled_by, cancellation_reason, created_at, updated_at";

pub struct ManualBookingRepo;

impl ManualBookingRepo {
    /// Insert a staff booking. Staff bookings are confirmed on entry.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateManualBooking,
    ) -> Result<ManualBooking, sqlx::Error> {
        let query = format!(
            "INSERT INTO manual_seat_bookings \
                (reference, scheduled_trip_id, created_by, booking_type, \
                 contact_name, contact_phone, contact_email, boarding_stop, alighting_stop, \
                 seat_count, total_fare, payment_status_id, amount_paid, booking_status_id, notes) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(&input.reference)
            .bind(input.scheduled_trip_id)
            .bind(input.created_by)
            .bind(&input.booking_type)
            .bind(&input.contact_name)
            .bind(&input.contact_phone)
            .bind(&input.contact_email)
            .bind(&input.boarding_stop)
            .bind(&input.alighting_stop)
            .bind(input.seat_count)
            .bind(input.total_fare)
            .bind(input.payment_status.id())
            .bind(input.amount_paid)
            .bind(BookingStatus::Confirmed.id())
            .bind(&input.notes)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<ManualBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM manual_seat_bookings WHERE id = $1");
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_reference<'e, E>(
        executor: E,
        reference: &str,
    ) -> Result<Option<ManualBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM manual_seat_bookings WHERE reference = $1");
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(reference)
            .fetch_optional(executor)
            .await
    }

    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<ManualBooking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM manual_seat_bookings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Staff bookings on a trip, oldest first.
    pub async fn list_for_trip<'e, E>(executor: E, trip_id: DbId) -> Result<Vec<ManualBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM manual_seat_bookings \
             WHERE scheduled_trip_id = $1 \
             ORDER BY created_at, id"
        );
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(trip_id)
            .fetch_all(executor)
            .await
    }

    pub async fn update_payment(
        conn: &mut PgConnection,
        id: DbId,
        payment_status: PaymentStatus,
        amount_paid: Money,
    ) -> Result<ManualBooking, sqlx::Error> {
        let query = format!(
            "UPDATE manual_seat_bookings \
             SET payment_status_id = $2, amount_paid = $3 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(id)
            .bind(payment_status.id())
            .bind(amount_paid)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn cancel(
        conn: &mut PgConnection,
        id: DbId,
        actor_id: DbId,
        reason: Option<&str>,
    ) -> Result<ManualBooking, sqlx::Error> {
        let query = format!(
            "UPDATE manual_seat_bookings \
             SET booking_status_id = $2, cancelled_at = NOW(), \
                 cancelled_by = $3, cancellation_reason = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ManualBooking>(&query)
            .bind(id)
            .bind(BookingStatus::Cancelled.id())
            .bind(actor_id)
            .bind(reason)
            .fetch_one(&mut *conn)
            .await
    }
}
