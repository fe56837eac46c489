//! Readiness report for load balancers and operators.
//!
//! Mounted at the root (`/health`), outside `/api/v1` and without the
//! actor header.

use axum::extract::State;
use axum::http::StatusCode;
use axum::{routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthReport {
    /// `ok` when bookings can be served, otherwise `degraded`.
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseHealth,
    pub booking_rules: BookingRules,
}

#[derive(Debug, Serialize)]
pub struct DatabaseHealth {
    pub reachable: bool,
    /// Latest applied migration; `null` when unreachable or unmigrated.
    pub schema_version: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct BookingRules {
    pub booking_cutoff_minutes: i64,
    pub cancellation_cutoff_minutes: i64,
    /// `false` while boarding passes are signed with the development key.
    pub qr_secret_configured: bool,
}

impl HealthReport {
    fn is_ready(&self) -> bool {
        self.database.reachable && self.database.schema_version.is_some()
    }
}

/// GET /health -- 200 when ready, 503 with the same body otherwise.
async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let schema_version = busline_db::schema_version(&state.pool).await;
    if let Err(err) = &schema_version {
        tracing::warn!(error = %err, "Health check could not reach the database");
    }

    let engine_config = state.engine.config();
    let mut report = HealthReport {
        status: "degraded",
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseHealth {
            reachable: schema_version.is_ok(),
            schema_version: schema_version.ok().flatten(),
        },
        booking_rules: BookingRules {
            booking_cutoff_minutes: engine_config.booking_cutoff_minutes,
            cancellation_cutoff_minutes: engine_config.cancellation_cutoff_minutes,
            qr_secret_configured: !state.engine.uses_dev_qr_secret(),
        },
    };

    if report.is_ready() {
        report.status = "ok";
        (StatusCode::OK, Json(report))
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, Json(report))
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
