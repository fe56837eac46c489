//! The allocation path shared by both booking channels.
//!
//! A coordinator validates its own input, then inside one transaction:
//! claims the seats through [`crate::inventory::allocate_in`], inserts its
//! booking row, and calls [`link_seats`] with the owner id. Keeping both
//! channels on this path means the exclusivity rules cannot drift.

use busline_core::booking::{generate_reference, PassengerDetails};
use busline_core::error::CoreError;
use busline_core::qr::encode_seat_payload;
use busline_core::seat::PricedSeat;
use busline_core::status::PassengerStatus;
use busline_core::types::DbId;
use busline_db::models::booking_seat::{BookingSeat, CreateBookingSeat, SeatOwner};
use busline_db::repositories::{BookingSeatRepo, ManualBookingRepo, MasterBookingRepo};
use serde::Serialize;
use sqlx::PgConnection;

use crate::error::{EngineError, EngineResult};

/// Attempts at drawing an unused booking reference.
const MAX_REFERENCE_ATTEMPTS: usize = 5;

/// Which channel created a booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    App,
    Manual,
}

/// Draw a reference that neither booking table uses yet.
pub(crate) async fn fresh_reference(conn: &mut PgConnection, prefix: &str) -> EngineResult<String> {
    for _ in 0..MAX_REFERENCE_ATTEMPTS {
        let candidate = generate_reference(prefix);
        let in_app = MasterBookingRepo::find_by_reference(&mut *conn, &candidate).await?;
        let in_manual = ManualBookingRepo::find_by_reference(&mut *conn, &candidate).await?;
        if in_app.is_none() && in_manual.is_none() {
            return Ok(candidate);
        }
    }
    Err(EngineError::Core(CoreError::Internal(
        "Could not generate a unique booking reference".to_string(),
    )))
}

/// Insert one seat link per allocated seat. `passengers[i]` travels in
/// `seats[i]`; lengths are checked by the coordinator beforehand.
#[allow(clippy::too_many_arguments)]
pub(crate) async fn link_seats(
    conn: &mut PgConnection,
    owner: SeatOwner,
    trip_id: DbId,
    booking_reference: &str,
    seats: &[PricedSeat],
    passengers: &[PassengerDetails],
    status: PassengerStatus,
    qr_secret: &str,
) -> EngineResult<Vec<BookingSeat>> {
    let mut links = Vec::with_capacity(seats.len());
    for (seat, passenger) in seats.iter().zip(passengers) {
        let input = CreateBookingSeat {
            owner,
            scheduled_trip_id: trip_id,
            trip_seat_id: seat.trip_seat_id,
            booking_reference: booking_reference.to_string(),
            seat_number: seat.seat_number.clone(),
            seat_price: seat.price,
            passenger_name: passenger.name.trim().to_string(),
            passenger_phone: passenger.phone.clone(),
            passenger_gender: passenger.gender.clone(),
            passenger_id_number: passenger.id_number.clone(),
            status,
            qr_code: encode_seat_payload(qr_secret, booking_reference, &seat.seat_number),
        };
        links.push(BookingSeatRepo::create(&mut *conn, &input).await?);
    }
    Ok(links)
}
