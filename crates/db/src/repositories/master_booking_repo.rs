//! Repository for the `master_bookings` table (app bookings).

use busline_core::status::{BookingStatus, PaymentStatus};
use busline_core::types::DbId;
use sqlx::{PgConnection, PgExecutor};

use crate::models::booking::{CreateMasterBooking, MasterBooking};

/// Column list for `master_bookings` queries.
const COLUMNS: &str = "\
    id, reference, user_id, payment_status_id, booking_status_id, \
    subtotal, total_amount, contact_name, contact_phone, contact_email, \
    paid_at, cancelled_at, cancelled_by, cancellation_reason, \
    created_at, updated_at";

pub struct MasterBookingRepo;

impl MasterBookingRepo {
    /// Insert a new booking with payment and booking status `pending`.
    pub async fn create(
        conn: &mut PgConnection,
        input: &CreateMasterBooking,
    ) -> Result<MasterBooking, sqlx::Error> {
        let query = format!(
            "INSERT INTO master_bookings \
                (reference, user_id, payment_status_id, booking_status_id, \
                 subtotal, total_amount, contact_name, contact_phone, contact_email) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(&input.reference)
            .bind(input.user_id)
            .bind(PaymentStatus::Pending.id())
            .bind(BookingStatus::Pending.id())
            .bind(input.subtotal)
            .bind(input.total_amount)
            .bind(&input.contact_name)
            .bind(&input.contact_phone)
            .bind(&input.contact_email)
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn find_by_id<'e, E>(executor: E, id: DbId) -> Result<Option<MasterBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM master_bookings WHERE id = $1");
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(id)
            .fetch_optional(executor)
            .await
    }

    pub async fn find_by_reference<'e, E>(
        executor: E,
        reference: &str,
    ) -> Result<Option<MasterBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!("SELECT {COLUMNS} FROM master_bookings WHERE reference = $1");
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(reference)
            .fetch_optional(executor)
            .await
    }

    /// Load and row-lock a booking for a status change.
    pub async fn lock_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<MasterBooking>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM master_bookings WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(id)
            .fetch_optional(&mut *conn)
            .await
    }

    /// Bookings of one user, newest first.
    pub async fn list_for_user<'e, E>(executor: E, user_id: DbId) -> Result<Vec<MasterBooking>, sqlx::Error>
    where
        E: PgExecutor<'e>,
    {
        let query = format!(
            "SELECT {COLUMNS} FROM master_bookings \
             WHERE user_id = $1 \
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(user_id)
            .fetch_all(executor)
            .await
    }

    /// Record the external payment confirmation.
    pub async fn mark_paid(conn: &mut PgConnection, id: DbId) -> Result<MasterBooking, sqlx::Error> {
        let query = format!(
            "UPDATE master_bookings \
             SET payment_status_id = $2, booking_status_id = $3, paid_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(id)
            .bind(PaymentStatus::Paid.id())
            .bind(BookingStatus::Confirmed.id())
            .fetch_one(&mut *conn)
            .await
    }

    pub async fn cancel(
        conn: &mut PgConnection,
        id: DbId,
        actor_id: DbId,
        reason: Option<&str>,
    ) -> Result<MasterBooking, sqlx::Error> {
        let query = format!(
            "UPDATE master_bookings \
             SET booking_status_id = $2, cancelled_at = NOW(), \
                 cancelled_by = $3, cancellation_reason = $4 \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MasterBooking>(&query)
            .bind(id)
            .bind(BookingStatus::Cancelled.id())
            .bind(actor_id)
            .bind(reason)
            .fetch_one(&mut *conn)
            .await
    }
}
