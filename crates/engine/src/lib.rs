//! Seat inventory and booking engine.
//!
//! Six components share one Postgres pool:
//! [`SeatInventory`], [`BookingCoordinator`], [`ManualBookingCoordinator`],
//! [`PassengerLifecycle`], [`QrVerifier`] and [`CancellationHandler`].
//! Every mutating operation runs in exactly one transaction; an error
//! anywhere rolls the whole operation back.

use std::sync::Arc;

use sqlx::PgPool;

pub mod allocation;
pub mod booking;
pub mod cancellation;
pub mod config;
pub mod error;
pub mod inventory;
pub mod lifecycle;
pub mod manual_booking;
pub mod verification;

pub use booking::BookingCoordinator;
pub use cancellation::CancellationHandler;
pub use config::{ConfigError, EngineConfig};
pub use error::{EngineError, EngineResult};
pub use inventory::SeatInventory;
pub use lifecycle::PassengerLifecycle;
pub use manual_booking::ManualBookingCoordinator;
pub use verification::QrVerifier;

/// All engine components, wired to one pool and configuration.
#[derive(Clone)]
pub struct Engine {
    pub inventory: SeatInventory,
    pub bookings: BookingCoordinator,
    pub manual_bookings: ManualBookingCoordinator,
    pub passengers: PassengerLifecycle,
    pub verifier: QrVerifier,
    pub cancellations: CancellationHandler,
    config: Arc<EngineConfig>,
}

impl Engine {
    pub fn new(pool: PgPool, config: EngineConfig) -> Self {
        let config = Arc::new(config);
        Self {
            inventory: SeatInventory::new(pool.clone()),
            bookings: BookingCoordinator::new(pool.clone(), Arc::clone(&config)),
            manual_bookings: ManualBookingCoordinator::new(pool.clone(), Arc::clone(&config)),
            passengers: PassengerLifecycle::new(pool.clone()),
            verifier: QrVerifier::new(pool.clone(), Arc::clone(&config)),
            cancellations: CancellationHandler::new(pool, Arc::clone(&config)),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// `true` while boarding passes are signed with the built-in
    /// development key.
    pub fn uses_dev_qr_secret(&self) -> bool {
        self.config.qr_signing_secret == config::DEV_QR_SECRET
    }
}
