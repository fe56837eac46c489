//! Passenger boarding lifecycle (per booked seat).
//!
//! Transition rules:
//! - `pending`    -> `confirmed`, `cancelled`
//! - `confirmed`  -> `checked_in`, `boarded`, `cancelled`
//! - `checked_in` -> `boarded`, `cancelled`, `no_show` (at/after departure)
//! - `boarded`    -> `completed`
//!
//! `completed`, `cancelled` and `no_show` are terminal.

use crate::error::CoreError;
use crate::status::PassengerStatus;
use crate::types::Timestamp;

/// Returns the set of statuses that `from` may transition to.
pub fn valid_transitions(from: PassengerStatus) -> &'static [PassengerStatus] {
    use PassengerStatus::*;
    match from {
        Pending => &[Confirmed, Cancelled],
        Confirmed => &[CheckedIn, Boarded, Cancelled],
        CheckedIn => &[Boarded, Cancelled, NoShow],
        Boarded => &[Completed],
        Completed | Cancelled | NoShow => &[],
    }
}

/// `true` when a passenger in `status` may still be cancelled.
pub fn can_cancel(status: PassengerStatus) -> bool {
    valid_transitions(status).contains(&PassengerStatus::Cancelled)
}

/// Statuses a whole-booking cancellation moves to `cancelled`.
pub fn cancellable_statuses() -> impl Iterator<Item = PassengerStatus> {
    PassengerStatus::ALL.iter().copied().filter(|s| can_cancel(*s))
}

/// Validate a status transition from `current` to `next`.
///
/// `departure_at` gates `no_show`: a passenger cannot be marked as a
/// no-show before the bus is due to leave.
pub fn validate_transition(
    current: PassengerStatus,
    next: PassengerStatus,
    departure_at: Timestamp,
    now: Timestamp,
) -> Result<(), CoreError> {
    if !valid_transitions(current).contains(&next) {
        return Err(CoreError::InvalidTransition {
            from: current.name(),
            to: next.name(),
        });
    }

    if next == PassengerStatus::NoShow && now < departure_at {
        return Err(CoreError::Rejected(
            "A passenger can only be marked as no-show at or after departure".to_string(),
        ));
    }

    Ok(())
}

/// Statuses that still hold a seat on the bus from the inventory's point
/// of view. A cancelled passenger does not.
pub fn holds_seat(status: PassengerStatus) -> bool {
    status != PassengerStatus::Cancelled
}

/// Check that a booking can be cancelled as a whole given the statuses of
/// its passengers. Already-cancelled passengers are skipped. Any other
/// passenger for whom [`can_cancel`] is false blocks the cancellation.
pub fn validate_group_cancellation<I>(statuses: I) -> Result<(), CoreError>
where
    I: IntoIterator<Item = PassengerStatus>,
{
    for status in statuses {
        if holds_seat(status) && !can_cancel(status) {
            return Err(CoreError::InvalidTransition {
                from: status.name(),
                to: PassengerStatus::Cancelled.name(),
            });
        }
    }
    Ok(())
}
