//! Seat selection and pricing rules (seat inventory).
//!
//! Pure functions shared by both booking channels so that selection
//! checks and fare resolution cannot drift between them.

use std::collections::HashSet;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::error::CoreError;
use crate::types::{DbId, Money};

/// Maximum number of seats a single booking may claim.
pub const MAX_SEATS_PER_BOOKING: usize = 10;

/// Maximum length of a maintenance block reason.
pub const MAX_BLOCK_REASON_LENGTH: usize = 500;

/// Maximum length of a seat number label (e.g. `"A12"`).
pub const MAX_SEAT_NUMBER_LENGTH: usize = 10;

/// Known seat type labels coming from layout templates.
pub const VALID_SEAT_TYPES: &[&str] = &["standard", "window", "aisle", "sleeper", "premium"];

/// Seat type used when a layout entry does not name one.
pub const DEFAULT_SEAT_TYPE: &str = "standard";

/// Validate a requested seat id list: non-empty, bounded, no duplicates.
pub fn validate_seat_selection(seat_ids: &[DbId]) -> Result<(), CoreError> {
    if seat_ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one seat must be selected".to_string(),
        ));
    }

    if seat_ids.len() > MAX_SEATS_PER_BOOKING {
        return Err(CoreError::Validation(format!(
            "A booking may claim at most {MAX_SEATS_PER_BOOKING} seats (got {})",
            seat_ids.len()
        )));
    }

    let mut seen = HashSet::with_capacity(seat_ids.len());
    for id in seat_ids {
        if !seen.insert(*id) {
            return Err(CoreError::Validation(format!(
                "Seat {id} is selected more than once"
            )));
        }
    }

    Ok(())
}

/// Validate an id list for maintenance operations (block, unblock, reprice).
///
/// Unlike booking selection there is no upper bound; a whole coach may be
/// blocked at once.
pub fn validate_seat_ids(seat_ids: &[DbId]) -> Result<(), CoreError> {
    if seat_ids.is_empty() {
        return Err(CoreError::Validation(
            "At least one seat id is required".to_string(),
        ));
    }
    let unique: HashSet<_> = seat_ids.iter().collect();
    if unique.len() != seat_ids.len() {
        return Err(CoreError::Validation(
            "Seat ids must not repeat".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_block_reason(reason: &str) -> Result<(), CoreError> {
    if reason.trim().is_empty() {
        return Err(CoreError::Validation(
            "A block reason is required".to_string(),
        ));
    }
    if reason.len() > MAX_BLOCK_REASON_LENGTH {
        return Err(CoreError::Validation(format!(
            "Block reason exceeds maximum length of {MAX_BLOCK_REASON_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Prices may be zero (complimentary seats) but never negative.
pub fn validate_price(price: Money) -> Result<(), CoreError> {
    if price < Decimal::ZERO {
        return Err(CoreError::Validation(format!(
            "Seat price must not be negative (got {price})"
        )));
    }
    Ok(())
}

pub fn validate_seat_type(seat_type: &str) -> Result<(), CoreError> {
    if VALID_SEAT_TYPES.contains(&seat_type) {
        Ok(())
    } else {
        Err(CoreError::Validation(format!(
            "Invalid seat type '{seat_type}'. Must be one of: {}",
            VALID_SEAT_TYPES.join(", ")
        )))
    }
}

/// Validate a layout-derived seat list before bulk instantiation.
///
/// `expected_total` is the trip's `total_seats`; the list must match it
/// exactly so the inventory starts out balanced.
pub fn validate_layout(
    seat_numbers: &[&str],
    expected_total: i32,
) -> Result<(), CoreError> {
    if seat_numbers.len() as i64 != i64::from(expected_total) {
        return Err(CoreError::Validation(format!(
            "Layout provides {} seats but the trip has {expected_total}",
            seat_numbers.len()
        )));
    }

    let mut seen = HashSet::with_capacity(seat_numbers.len());
    for number in seat_numbers {
        let trimmed = number.trim();
        if trimmed.is_empty()
            || trimmed.len() > MAX_SEAT_NUMBER_LENGTH
            || !trimmed.chars().all(|c| c.is_ascii_alphanumeric())
        {
            return Err(CoreError::Validation(format!(
                "Invalid seat number '{number}'"
            )));
        }
        if !seen.insert(trimmed) {
            return Err(CoreError::Validation(format!(
                "Seat number '{trimmed}' appears more than once"
            )));
        }
    }

    Ok(())
}

/// Resolve the fare for one seat: its own price when set, otherwise the
/// trip's base fare.
pub fn resolve_seat_price(seat_price: Option<Money>, base_fare: Money) -> Money {
    match seat_price {
        Some(price) => price,
        None => base_fare,
    }
}

/// A seat that passed allocation, with its resolved fare.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricedSeat {
    pub trip_seat_id: DbId,
    pub seat_number: String,
    pub price: Money,
}

/// Sum the resolved fares of a seat set.
pub fn fare_total(seats: &[PricedSeat]) -> Money {
    seats.iter().fold(Decimal::ZERO, |acc, seat| acc + seat.price)
}

/// Per-trip seat counts by status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeatSummary {
    pub total: i64,
    pub available: i64,
    pub blocked: i64,
    pub booked: i64,
}

impl SeatSummary {
    /// `available + blocked + booked == total`.
    pub fn is_balanced(&self) -> bool {
        self.available + self.blocked + self.booked == self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_selection_rejected() {
        let err = validate_seat_selection(&[]).unwrap_err();
        assert!(err.to_string().contains("At least one seat"));
    }

    #[test]
    fn duplicate_selection_rejected() {
        let err = validate_seat_selection(&[4, 5, 4]).unwrap_err();
        assert!(err.to_string().contains("Seat 4"));
    }

    #[test]
    fn oversized_selection_rejected() {
        let ids: Vec<DbId> = (1..=(MAX_SEATS_PER_BOOKING as DbId + 1)).collect();
        assert!(validate_seat_selection(&ids).is_err());
    }

    #[test]
    fn maintenance_ids_have_no_upper_bound() {
        let ids: Vec<DbId> = (1..=54).collect();
        assert!(validate_seat_ids(&ids).is_ok());
        assert!(validate_seat_ids(&[1, 1]).is_err());
    }

    #[test]
    fn seat_price_overrides_base_fare() {
        assert_eq!(resolve_seat_price(Some(dec!(1500.00)), dec!(1200.00)), dec!(1500.00));
    }

    #[test]
    fn missing_seat_price_falls_back_to_base_fare() {
        assert_eq!(resolve_seat_price(None, dec!(1200.00)), dec!(1200.00));
    }

    #[test]
    fn fare_total_sums_resolved_prices() {
        let seats = vec![
            PricedSeat {
                trip_seat_id: 1,
                seat_number: "1".into(),
                price: dec!(1200.00),
            },
            PricedSeat {
                trip_seat_id: 2,
                seat_number: "2".into(),
                price: dec!(1350.50),
            },
        ];
        assert_eq!(fare_total(&seats), dec!(2550.50));
        assert_eq!(fare_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn negative_price_rejected() {
        assert!(validate_price(dec!(-1)).is_err());
        assert!(validate_price(Decimal::ZERO).is_ok());
        assert!(validate_price(dec!(990.00)).is_ok());
    }

    #[test]
    fn layout_must_match_trip_capacity() {
        assert!(validate_layout(&["1", "2", "3"], 3).is_ok());
        assert!(validate_layout(&["1", "2"], 3).is_err());
        assert!(validate_layout(&["1", "1", "2"], 3).is_err());
        assert!(validate_layout(&["1", " ", "2"], 3).is_err());
        assert!(validate_layout(&["1", "2.5", "3"], 3).is_err());
    }

    #[test]
    fn block_reason_required() {
        assert!(validate_block_reason("broken recliner").is_ok());
        assert!(validate_block_reason("  ").is_err());
        assert!(validate_block_reason(&"x".repeat(MAX_BLOCK_REASON_LENGTH + 1)).is_err());
    }

    #[test]
    fn summary_balance() {
        let summary = SeatSummary {
            total: 40,
            available: 37,
            blocked: 1,
            booked: 2,
        };
        assert!(summary.is_balanced());
        assert!(!SeatSummary { booked: 3, ..summary }.is_balanced());
    }
}
