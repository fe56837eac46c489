//! Shared fixtures for engine integration tests.
//!
//! Trips are produced upstream in production, so tests insert them with
//! plain SQL and then lay out seats through the engine.

#![allow(dead_code)]

use busline_core::booking::{ContactInfo, PassengerDetails};
use busline_core::types::{DbId, Money};
use busline_db::models::trip_seat::{SeatLayoutEntry, TripSeat};
use busline_engine::booking::CreateBookingRequest;
use busline_engine::manual_booking::CreateManualBookingRequest;
use busline_engine::{Engine, EngineConfig};
use busline_core::status::PaymentStatus;
use rust_decimal_macros::dec;
use sqlx::PgPool;

pub const QR_SECRET: &str = "engine-test-secret";

pub fn test_config() -> EngineConfig {
    EngineConfig {
        qr_signing_secret: QR_SECRET.to_string(),
        ..EngineConfig::default()
    }
}

pub fn engine(pool: &PgPool) -> Engine {
    Engine::new(pool.clone(), test_config())
}

/// Insert a bookable trip departing `hours_ahead` hours from now.
pub async fn insert_trip(pool: &PgPool, total_seats: i32, base_fare: Money, hours_ahead: i64) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO scheduled_trips (route_label, departure_at, base_fare, total_seats) \
         VALUES ('Colombo - Galle', NOW() + make_interval(hours => $3::INT), $1, $2) \
         RETURNING id",
    )
    .bind(base_fare)
    .bind(total_seats)
    .bind(hours_ahead as i32)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// Move a trip's departure into the past.
pub async fn depart(pool: &PgPool, trip_id: DbId) {
    sqlx::query("UPDATE scheduled_trips SET departure_at = NOW() - INTERVAL '5 minutes' WHERE id = $1")
        .bind(trip_id)
        .execute(pool)
        .await
        .unwrap();
}

pub fn layout(count: usize, price: Option<Money>) -> Vec<SeatLayoutEntry> {
    (1..=count)
        .map(|n| SeatLayoutEntry {
            seat_number: n.to_string(),
            seat_type: "standard".into(),
            row_number: Some(((n - 1) / 4 + 1) as i32),
            column_number: Some(((n - 1) % 4 + 1) as i32),
            price,
        })
        .collect()
}

/// A trip with `count` seats at base fare 1200.00 departing tomorrow.
/// Returns the trip id and its seats ordered by seat number.
pub async fn trip_with_seats(pool: &PgPool, count: usize) -> (DbId, Vec<TripSeat>) {
    let trip_id = insert_trip(pool, count as i32, dec!(1200.00), 24).await;
    let seats = engine(pool)
        .inventory
        .create_trip_seats(trip_id, &layout(count, None))
        .await
        .unwrap();
    (trip_id, seats)
}

pub fn contact() -> ContactInfo {
    ContactInfo {
        name: "Nimal Perera".into(),
        phone: "+94 77 123 4567".into(),
        email: Some("nimal@example.com".into()),
    }
}

pub fn passenger(name: &str) -> PassengerDetails {
    PassengerDetails {
        name: name.into(),
        phone: None,
        gender: None,
        id_number: None,
    }
}

pub fn passengers(count: usize) -> Vec<PassengerDetails> {
    (1..=count).map(|n| passenger(&format!("Passenger {n}"))).collect()
}

pub fn booking_request(trip_id: DbId, seat_ids: &[DbId]) -> CreateBookingRequest {
    CreateBookingRequest {
        trip_id,
        seat_ids: seat_ids.to_vec(),
        passengers: passengers(seat_ids.len()),
        contact: contact(),
        boarding_stop: Some("Colombo Fort".into()),
        alighting_stop: Some("Galle".into()),
    }
}

pub fn manual_request(
    trip_id: DbId,
    seat_ids: &[DbId],
    payment_status: PaymentStatus,
    amount_paid: Money,
) -> CreateManualBookingRequest {
    CreateManualBookingRequest {
        trip_id,
        seat_ids: seat_ids.to_vec(),
        passengers: passengers(seat_ids.len()),
        contact: contact(),
        booking_type: "phone".into(),
        payment_status,
        amount_paid,
        boarding_stop: None,
        alighting_stop: None,
        notes: Some("Called from Matara".into()),
    }
}

/// `(available, blocked, booked, total)` straight from the table.
pub async fn seat_counts(pool: &PgPool, trip_id: DbId) -> (i64, i64, i64, i64) {
    sqlx::query_as(
        "SELECT COUNT(*) FILTER (WHERE status_id = 1), \
                COUNT(*) FILTER (WHERE status_id = 2), \
                COUNT(*) FILTER (WHERE status_id = 3), \
                COUNT(*) \
         FROM trip_seats WHERE scheduled_trip_id = $1",
    )
    .bind(trip_id)
    .fetch_one(pool)
    .await
    .unwrap()
}

/// Assert the seat-level storage invariants for a trip: counts add up to
/// `total_seats`, and a reference is present exactly on booked seats.
pub async fn assert_seat_invariants(pool: &PgPool, trip_id: DbId) -> i64 {
    let (available, blocked, booked, total) = seat_counts(pool, trip_id).await;
    let (total_seats,): (i32,) =
        sqlx::query_as("SELECT total_seats FROM scheduled_trips WHERE id = $1")
            .bind(trip_id)
            .fetch_one(pool)
            .await
            .unwrap();
    assert_eq!(available + blocked + booked, total);
    assert_eq!(total, i64::from(total_seats));

    let (mismatched,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM trip_seats \
         WHERE scheduled_trip_id = $1 AND (status_id = 3) <> (booking_reference IS NOT NULL)",
    )
    .bind(trip_id)
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(mismatched, 0);
    booked
}

/// Seat invariants plus: every booked seat has exactly one live seat link.
pub async fn assert_inventory_invariants(pool: &PgPool, trip_id: DbId) {
    let booked = assert_seat_invariants(pool, trip_id).await;

    let (live_links,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM booking_seats WHERE scheduled_trip_id = $1 AND status_id <> 6",
    )
    .bind(trip_id)
    .fetch_one(pool)
    .await
    .unwrap();
    assert_eq!(live_links, booked, "live seat links must match booked seats");
}

/// Book `seat_ids` through an app booking. Returns the booking reference.
pub async fn book_seats(pool: &PgPool, trip_id: DbId, seat_ids: &[DbId]) -> String {
    engine(pool)
        .bookings
        .create_booking(501, &booking_request(trip_id, seat_ids))
        .await
        .unwrap()
        .booking
        .reference
}
