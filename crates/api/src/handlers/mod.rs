pub mod bookings;
pub mod manual_bookings;
pub mod passengers;
pub mod seats;
pub mod verification;
