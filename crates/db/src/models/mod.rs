//! Row structs and insert DTOs.
//!
//! Each submodule contains a `FromRow` + `Serialize` entity struct matching
//! the database row, plus the DTOs its repository accepts.

pub mod booking;
pub mod booking_seat;
pub mod manual_booking;
pub mod passenger_count;
pub mod trip;
pub mod trip_seat;
