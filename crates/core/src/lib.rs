//! Domain rules for the seat inventory and booking engine.
//!
//! Pure logic with no I/O: status enums, transition tables, validation,
//! pricing, QR payloads and refund computation. Shared by the `db`,
//! `engine` and `api` crates.

pub mod booking;
pub mod cancellation;
pub mod error;
pub mod lifecycle;
pub mod qr;
pub mod seat;
pub mod status;
pub mod types;
