//! Cancellation eligibility and refund computation.

use serde::Serialize;

use crate::booking::cutoff_instant;
use crate::error::CoreError;
use crate::status::{BookingStatus, PaymentStatus};
use crate::types::{Money, Timestamp};

/// Maximum length of a free-text cancellation reason.
pub const MAX_REASON_LENGTH: usize = 1_000;

/// What an external refund process needs to act on a cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RefundDecision {
    pub refund_needed: bool,
    pub refund_amount: Money,
}

/// Check that a booking can still be cancelled at `now`.
///
/// Closed bookings (cancelled, completed) are a conflict; a departed trip
/// or one inside the cutoff window is a business-rule refusal.
pub fn validate_cancellable(
    status: BookingStatus,
    departure_at: Timestamp,
    now: Timestamp,
    cutoff_minutes: i64,
) -> Result<(), CoreError> {
    if status.is_closed() {
        return Err(CoreError::Conflict(format!(
            "Booking is already {status}"
        )));
    }
    if now >= cutoff_instant(departure_at, cutoff_minutes)? {
        return Err(CoreError::Rejected(
            "Cancellation window has closed for this trip".to_string(),
        ));
    }
    Ok(())
}

pub fn validate_reason(reason: &Option<String>) -> Result<(), CoreError> {
    if let Some(r) = reason {
        if r.len() > MAX_REASON_LENGTH {
            return Err(CoreError::Validation(format!(
                "Cancellation reason exceeds maximum length of {MAX_REASON_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Refund for an app booking: the full total when it had been paid.
pub fn app_refund(prior_payment: PaymentStatus, total: Money) -> RefundDecision {
    if prior_payment == PaymentStatus::Paid {
        RefundDecision {
            refund_needed: true,
            refund_amount: total,
        }
    } else {
        RefundDecision {
            refund_needed: false,
            refund_amount: Money::ZERO,
        }
    }
}

/// Refund for a staff-entered booking: whatever was actually collected.
pub fn manual_refund(prior_payment: PaymentStatus, amount_paid: Money) -> RefundDecision {
    let collected = matches!(prior_payment, PaymentStatus::Paid | PaymentStatus::Partial);
    if collected && amount_paid > Money::ZERO {
        RefundDecision {
            refund_needed: true,
            refund_amount: amount_paid,
        }
    } else {
        RefundDecision {
            refund_needed: false,
            refund_amount: Money::ZERO,
        }
    }
}
