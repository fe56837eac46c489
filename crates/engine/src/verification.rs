//! QR Verifier: read-only resolution of a scanned payload.
//!
//! Never changes lifecycle state; staff follow up with an explicit
//! check-in or board call. The same payload always resolves to the
//! current snapshot.

use std::sync::Arc;

use busline_core::error::CoreError;
use busline_core::qr::{decode_payload, PayloadError, ScanPayload};
use busline_core::status::{BookingStatus, PaymentStatus};
use busline_core::types::DbId;
use busline_db::models::booking_seat::BookingSeat;
use busline_db::repositories::{BookingSeatRepo, BusBookingRepo, ManualBookingRepo, MasterBookingRepo};
use serde::Serialize;
use sqlx::PgPool;
use tracing::debug;

use crate::allocation::BookingChannel;
use crate::booking::{booking_status, missing_bus_booking};
use crate::config::EngineConfig;
use crate::error::{EngineError, EngineResult};
use crate::manual_booking::manual_booking_status;

/// Why a scan did not verify.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InvalidReason {
    WrongTrip,
    BadSignature,
    Malformed,
    BookingCancelled,
}

/// The booking a payload resolved to, independent of channel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedBooking {
    pub channel: BookingChannel,
    pub booking_id: DbId,
    pub reference: String,
    pub scheduled_trip_id: DbId,
    pub booking_status: BookingStatus,
    pub payment_status: Option<PaymentStatus>,
    pub contact_name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum Verification {
    Valid {
        booking: VerifiedBooking,
        seats: Vec<BookingSeat>,
    },
    Invalid {
        reason: InvalidReason,
    },
}

impl Verification {
    pub fn is_valid(&self) -> bool {
        matches!(self, Verification::Valid { .. })
    }
}

#[derive(Clone)]
pub struct QrVerifier {
    pool: PgPool,
    config: Arc<EngineConfig>,
}

impl QrVerifier {
    pub fn new(pool: PgPool, config: Arc<EngineConfig>) -> Self {
        Self { pool, config }
    }

    /// Resolve a scanned payload to its booking and seat(s).
    ///
    /// A signed seat payload resolves to that one seat; a bare booking
    /// reference resolves to every seat of the booking. When
    /// `expected_trip_id` is given, a booking on another trip is
    /// `Invalid { wrong_trip }`. An unknown reference is `NotFound`.
    pub async fn verify(
        &self,
        payload: &str,
        expected_trip_id: Option<DbId>,
    ) -> EngineResult<Verification> {
        let scan = match decode_payload(&self.config.qr_signing_secret, payload) {
            Ok(scan) => scan,
            Err(PayloadError::Malformed) => return Ok(invalid(InvalidReason::Malformed)),
            Err(PayloadError::BadSignature) => return Ok(invalid(InvalidReason::BadSignature)),
        };

        let reference = match &scan {
            ScanPayload::Seat { reference, .. } | ScanPayload::Reference(reference) => reference,
        };
        let booking = self.resolve_booking(reference).await?;

        if let Some(expected) = expected_trip_id {
            if expected != booking.scheduled_trip_id {
                debug!(
                    reference = %booking.reference,
                    expected_trip_id = expected,
                    actual_trip_id = booking.scheduled_trip_id,
                    "Scan for another trip"
                );
                return Ok(invalid(InvalidReason::WrongTrip));
            }
        }
        if booking.booking_status == BookingStatus::Cancelled {
            return Ok(invalid(InvalidReason::BookingCancelled));
        }

        let seats = match &scan {
            ScanPayload::Seat { seat_number, .. } => {
                let seat = BookingSeatRepo::find_by_reference_and_seat(
                    &self.pool,
                    &booking.reference,
                    seat_number,
                )
                .await?
                .ok_or_else(|| {
                    EngineError::Core(CoreError::ReferenceNotFound {
                        entity: "BookingSeat",
                        reference: format!("{}/{seat_number}", booking.reference),
                    })
                })?;
                vec![seat]
            }
            ScanPayload::Reference(_) => {
                BookingSeatRepo::list_by_reference(&self.pool, &booking.reference).await?
            }
        };

        Ok(Verification::Valid { booking, seats })
    }

    async fn resolve_booking(&self, reference: &str) -> EngineResult<VerifiedBooking> {
        if let Some(master) = MasterBookingRepo::find_by_reference(&self.pool, reference).await? {
            let bus = BusBookingRepo::find_by_master(&self.pool, master.id)
                .await?
                .ok_or_else(|| missing_bus_booking(master.id))?;
            return Ok(VerifiedBooking {
                channel: BookingChannel::App,
                booking_id: master.id,
                booking_status: booking_status(&master)?,
                payment_status: master.payment_status(),
                reference: master.reference,
                scheduled_trip_id: bus.scheduled_trip_id,
                contact_name: master.contact_name,
            });
        }

        if let Some(manual) = ManualBookingRepo::find_by_reference(&self.pool, reference).await? {
            return Ok(VerifiedBooking {
                channel: BookingChannel::Manual,
                booking_id: manual.id,
                booking_status: manual_booking_status(&manual)?,
                payment_status: manual.payment_status(),
                reference: manual.reference,
                scheduled_trip_id: manual.scheduled_trip_id,
                contact_name: manual.contact_name,
            });
        }

        Err(EngineError::Core(CoreError::ReferenceNotFound {
            entity: "Booking",
            reference: reference.to_string(),
        }))
    }
}

fn invalid(reason: InvalidReason) -> Verification {
    Verification::Invalid { reason }
}
