//! Engine configuration loaded from the environment.

use std::env;

use tracing::warn;

/// Signing secret used when `QR_SIGNING_SECRET` is unset. Only suitable
/// for local development.
pub const DEV_QR_SECRET: &str = "busline-dev-qr-secret-change-me";

/// Largest accepted cutoff: one week.
pub const MAX_CUTOFF_MINUTES: i64 = 7 * 24 * 60;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{var} must be an integer between 0 and 10080 (got '{value}')")]
    InvalidNumber { var: &'static str, value: String },

    #[error("{var} must be 1-4 uppercase ASCII letters (got '{value}')")]
    InvalidPrefix { var: &'static str, value: String },

    #[error("{0} must not be empty")]
    Empty(&'static str),
}

/// Business-rule knobs and secrets for the booking engine.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// HMAC key for QR boarding payloads.
    pub qr_signing_secret: String,
    /// Bookings close this many minutes before departure.
    pub booking_cutoff_minutes: i64,
    /// Cancellations close this many minutes before departure.
    pub cancellation_cutoff_minutes: i64,
    /// Reference prefix for app bookings.
    pub app_reference_prefix: String,
    /// Reference prefix for staff bookings.
    pub manual_reference_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            qr_signing_secret: DEV_QR_SECRET.to_string(),
            booking_cutoff_minutes: 0,
            cancellation_cutoff_minutes: 0,
            app_reference_prefix: "BK".to_string(),
            manual_reference_prefix: "MB".to_string(),
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                       | Default |
    /// |-------------------------------|---------|
    /// | `QR_SIGNING_SECRET`           | dev key |
    /// | `BOOKING_CUTOFF_MINUTES`      | `0`     |
    /// | `CANCELLATION_CUTOFF_MINUTES` | `0`     |
    /// | `REFERENCE_PREFIX_APP`        | `BK`    |
    /// | `REFERENCE_PREFIX_MANUAL`     | `MB`    |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();

        let qr_signing_secret = match lookup("QR_SIGNING_SECRET") {
            Some(secret) if secret.trim().is_empty() => {
                return Err(ConfigError::Empty("QR_SIGNING_SECRET"))
            }
            Some(secret) => secret,
            None => {
                warn!("QR_SIGNING_SECRET is not set; using the development signing key");
                defaults.qr_signing_secret
            }
        };

        let booking_cutoff_minutes = minutes(&lookup, "BOOKING_CUTOFF_MINUTES")?;
        let cancellation_cutoff_minutes = minutes(&lookup, "CANCELLATION_CUTOFF_MINUTES")?;

        let app_reference_prefix =
            prefix(&lookup, "REFERENCE_PREFIX_APP", defaults.app_reference_prefix)?;
        let manual_reference_prefix =
            prefix(&lookup, "REFERENCE_PREFIX_MANUAL", defaults.manual_reference_prefix)?;

        Ok(Self {
            qr_signing_secret,
            booking_cutoff_minutes,
            cancellation_cutoff_minutes,
            app_reference_prefix,
            manual_reference_prefix,
        })
    }
}

fn minutes<F>(lookup: &F, var: &'static str) -> Result<i64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(0),
        Some(value) => match value.trim().parse::<i64>() {
            Ok(n) if (0..=MAX_CUTOFF_MINUTES).contains(&n) => Ok(n),
            _ => Err(ConfigError::InvalidNumber { var, value }),
        },
    }
}

fn prefix<F>(lookup: &F, var: &'static str, default: String) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        None => Ok(default),
        Some(value) => {
            let valid = (1..=4).contains(&value.len())
                && value.chars().all(|c| c.is_ascii_uppercase());
            if valid {
                Ok(value)
            } else {
                Err(ConfigError::InvalidPrefix { var, value })
            }
        }
    }
}
