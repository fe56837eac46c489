//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods. Reads
//! accept any `PgExecutor` (pool or connection); writes accept
//! `&mut PgConnection` so every mutation runs inside the caller's
//! transaction.

pub mod booking_seat_repo;
pub mod bus_booking_repo;
pub mod manual_booking_repo;
pub mod master_booking_repo;
pub mod passenger_count_repo;
pub mod trip_repo;
pub mod trip_seat_repo;

pub use booking_seat_repo::BookingSeatRepo;
pub use bus_booking_repo::BusBookingRepo;
pub use manual_booking_repo::ManualBookingRepo;
pub use master_booking_repo::MasterBookingRepo;
pub use passenger_count_repo::PassengerCountRepo;
pub use trip_repo::TripRepo;
pub use trip_seat_repo::TripSeatRepo;
