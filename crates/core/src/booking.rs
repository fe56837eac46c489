//! Booking rules shared by the app and staff channels.
//!
//! Covers reference generation, passenger/contact validation, the
//! bookability window for a trip, and the staff-side booking types and
//! payment inputs.

use chrono::Duration;
use rand::Rng;
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::error::CoreError;
use crate::status::PaymentStatus;
use crate::types::{Money, Timestamp};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Characters used in booking references. Excludes `0/O` and `1/I` so a
/// reference can be read over the phone.
const REFERENCE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";

/// Number of random characters after the prefix.
pub const REFERENCE_RANDOM_LENGTH: usize = 8;

/// Maximum length of a passenger or contact name.
pub const MAX_NAME_LENGTH: usize = 120;

/// Maximum length of a boarding or alighting stop label.
pub const MAX_STOP_LENGTH: usize = 120;

/// Maximum length of staff notes on a manual booking.
pub const MAX_NOTES_LENGTH: usize = 2_000;

/// Booking taken over the phone.
pub const BOOKING_TYPE_PHONE: &str = "phone";

/// Booking entered by a ticketing agent.
pub const BOOKING_TYPE_AGENT: &str = "agent";

/// Booking sold at the counter or at the door.
pub const BOOKING_TYPE_WALK_IN: &str = "walk_in";

/// All valid manual booking types.
pub const VALID_BOOKING_TYPES: &[&str] =
    &[BOOKING_TYPE_PHONE, BOOKING_TYPE_AGENT, BOOKING_TYPE_WALK_IN];

/// Payment statuses staff may record on a manual booking.
pub const MANUAL_PAYMENT_STATUSES: &[PaymentStatus] = &[
    PaymentStatus::Pending,
    PaymentStatus::Partial,
    PaymentStatus::Paid,
];

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// Generate a human-shareable booking reference such as `BK-7KQ2M9XD`.
///
/// Uniqueness is enforced by the database; callers retry on collision.
pub fn generate_reference(prefix: &str) -> String {
    let mut rng = rand::rng();
    let code: String = (0..REFERENCE_RANDOM_LENGTH)
        .map(|_| REFERENCE_ALPHABET[rng.random_range(0..REFERENCE_ALPHABET.len())] as char)
        .collect();
    format!("{prefix}-{code}")
}

/// `true` when `value` has the shape of a reference produced by
/// [`generate_reference`].
pub fn looks_like_reference(value: &str) -> bool {
    match value.split_once('-') {
        Some((prefix, code)) => {
            !prefix.is_empty()
                && prefix.chars().all(|c| c.is_ascii_uppercase())
                && code.len() == REFERENCE_RANDOM_LENGTH
                && code.bytes().all(|b| REFERENCE_ALPHABET.contains(&b))
        }
        None => false,
    }
}

// ---------------------------------------------------------------------------
// Passenger and contact details
// ---------------------------------------------------------------------------

/// Contact person for a booking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactInfo {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

impl ContactInfo {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        validate_phone(&self.phone)?;
        if let Some(email) = &self.email {
            if !email.validate_email() {
                return Err(CoreError::Validation(format!(
                    "Invalid email address '{email}'"
                )));
            }
        }
        Ok(())
    }
}

/// Identity of the passenger travelling in one seat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassengerDetails {
    pub name: String,
    pub phone: Option<String>,
    pub gender: Option<String>,
    /// National identity card or passport number.
    pub id_number: Option<String>,
}

impl PassengerDetails {
    pub fn validate(&self) -> Result<(), CoreError> {
        validate_name(&self.name)?;
        if let Some(phone) = &self.phone {
            validate_phone(phone)?;
        }
        Ok(())
    }
}

pub fn validate_name(name: &str) -> Result<(), CoreError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation(
            "Passenger name must not be empty".to_string(),
        ));
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(CoreError::Validation(format!(
            "Passenger name exceeds maximum length of {MAX_NAME_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Accepts 7 to 15 digits with an optional leading `+`. Spaces and dashes
/// are ignored.
pub fn validate_phone(phone: &str) -> Result<(), CoreError> {
    let compact: String = phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-'))
        .collect();
    let digits = compact.strip_prefix('+').unwrap_or(&compact);

    if digits.len() < 7 || digits.len() > 15 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return Err(CoreError::Validation(format!(
            "Invalid phone number '{phone}'"
        )));
    }
    Ok(())
}

/// Exactly one passenger entry per selected seat.
pub fn validate_passengers_for_seats(
    passengers: &[PassengerDetails],
    seat_count: usize,
) -> Result<(), CoreError> {
    if passengers.len() != seat_count {
        return Err(CoreError::Validation(format!(
            "Passenger details required for each seat: {} seats but {} passengers",
            seat_count,
            passengers.len()
        )));
    }
    passengers.iter().try_for_each(PassengerDetails::validate)
}

pub fn validate_stop(label: &Option<String>) -> Result<(), CoreError> {
    if let Some(stop) = label {
        if stop.trim().is_empty() || stop.len() > MAX_STOP_LENGTH {
            return Err(CoreError::Validation(format!(
                "Invalid stop label '{stop}'"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Trip bookability
// ---------------------------------------------------------------------------

/// The instant `cutoff_minutes` before `departure_at`.
///
/// A negative cutoff, or one that leaves the representable time range, is
/// a validation error.
pub fn cutoff_instant(departure_at: Timestamp, cutoff_minutes: i64) -> Result<Timestamp, CoreError> {
    if cutoff_minutes < 0 {
        return Err(CoreError::Validation(format!(
            "Cutoff must not be negative (got {cutoff_minutes} minutes)"
        )));
    }
    Duration::try_minutes(cutoff_minutes)
        .and_then(|cutoff| departure_at.checked_sub_signed(cutoff))
        .ok_or_else(|| {
            CoreError::Validation(format!(
                "Cutoff of {cutoff_minutes} minutes is out of range"
            ))
        })
}

/// Check that a trip accepts new bookings at `now`.
///
/// Bookings close `cutoff_minutes` before departure (0 = at departure).
pub fn validate_bookable(
    is_bookable: bool,
    departure_at: Timestamp,
    now: Timestamp,
    cutoff_minutes: i64,
) -> Result<(), CoreError> {
    if !is_bookable {
        return Err(CoreError::Rejected(
            "Trip is not open for booking".to_string(),
        ));
    }
    if now >= cutoff_instant(departure_at, cutoff_minutes)? {
        return Err(CoreError::Rejected(
            "Trip has departed or booking has closed".to_string(),
        ));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Staff-entered bookings
// ---------------------------------------------------------------------------

pub fn validate_booking_type(booking_type: &str) -> Result<(), CoreError> {
    if VALID_BOOKING_TYPES.contains(&booking_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid booking type '{booking_type}'. Must be one of: {}",
            VALID_BOOKING_TYPES.join(", ")
        )))
    }
}

/// Validate staff payment input against the booking's fare total.
pub fn validate_manual_payment(
    status: PaymentStatus,
    amount_paid: Money,
    total_fare: Money,
) -> Result<(), CoreError> {
    if !MANUAL_PAYMENT_STATUSES.contains(&status) {
        return Err(CoreError::Validation(format!(
            "Payment status '{status}' cannot be recorded on a manual booking"
        )));
    }
    if amount_paid < Money::ZERO {
        return Err(CoreError::Validation(
            "Amount paid must not be negative".to_string(),
        ));
    }
    if amount_paid > total_fare {
        return Err(CoreError::Validation(format!(
            "Amount paid {amount_paid} exceeds the total fare {total_fare}"
        )));
    }
    Ok(())
}

pub fn validate_notes(notes: &Option<String>) -> Result<(), CoreError> {
    if let Some(n) = notes {
        if n.len() > MAX_NOTES_LENGTH {
            return Err(CoreError::Validation(format!(
                "Notes exceed maximum length of {MAX_NOTES_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
