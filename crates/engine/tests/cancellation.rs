//! Cancellation Handler integration tests.

mod common;

use busline_core::error::ErrorKind;
use busline_core::status::{BookingStatus, PassengerStatus, PaymentStatus};
use busline_engine::EngineConfig;
use common::*;
use rust_decimal_macros::dec;
use sqlx::PgPool;

/// Scenario B: cancelling a paid two-seat booking of 2400 refunds 2400
/// and frees both seats.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_paid_booking_refunds_total(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id, seats[1].id]))
        .await
        .unwrap();
    assert_eq!(booking.booking.total_amount, dec!(2400));
    engine.bookings.confirm_payment(booking.booking.id).await.unwrap();

    let outcome = engine
        .cancellations
        .cancel(booking.booking.id, 501, Some("Change of plans".into()))
        .await
        .unwrap();
    assert!(outcome.refund.refund_needed);
    assert_eq!(outcome.refund.refund_amount, dec!(2400));
    assert_eq!(outcome.seats_released, 2);
    assert!(outcome.cancelled_at.is_some());

    let after = engine.bookings.get_booking(booking.booking.id).await.unwrap();
    assert_eq!(after.booking.booking_status(), Some(BookingStatus::Cancelled));
    assert_eq!(after.booking.cancelled_by, Some(501));
    assert_eq!(after.booking.cancellation_reason.as_deref(), Some("Change of plans"));
    assert_eq!(after.bus_booking.status_id, BookingStatus::Cancelled.id());
    assert!(after
        .seats
        .iter()
        .all(|s| s.status() == Some(PassengerStatus::Cancelled)));

    let summary = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(summary.available, 4);
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_unpaid_booking_needs_no_refund(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id]))
        .await
        .unwrap();

    let outcome = engine.cancellations.cancel(booking.booking.id, 501, None).await.unwrap();
    assert!(!outcome.refund.refund_needed);
    assert_eq!(outcome.refund.refund_amount, dec!(0));
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_twice_conflicts(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id]))
        .await
        .unwrap();

    engine.cancellations.cancel(booking.booking.id, 501, None).await.unwrap();
    let err = engine.cancellations.cancel(booking.booking.id, 501, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    let err = engine.cancellations.cancel(999_999, 501, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_after_departure_rejected(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id]))
        .await
        .unwrap();
    depart(&pool, trip_id).await;

    let err = engine.cancellations.cancel(booking.booking.id, 501, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);

    // Nothing changed.
    let after = engine.bookings.get_booking(booking.booking.id).await.unwrap();
    assert_eq!(after.booking.booking_status(), Some(BookingStatus::Pending));
    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().booked, 1);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancellation_cutoff(pool: PgPool) {
    let config = EngineConfig {
        cancellation_cutoff_minutes: 24 * 60 + 60,
        ..test_config()
    };
    let engine = busline_engine::Engine::new(pool.clone(), config);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id]))
        .await
        .unwrap();

    let err = engine.cancellations.cancel(booking.booking.id, 501, None).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_manual_booking_refunds_amount_paid(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let booking = engine
        .manual_bookings
        .create_manual_booking(
            42,
            &manual_request(trip_id, &[seats[0].id, seats[1].id], PaymentStatus::Partial, dec!(800)),
        )
        .await
        .unwrap();

    let outcome = engine
        .cancellations
        .cancel_manual_booking(booking.booking.id, 42, Some("Passenger called".into()))
        .await
        .unwrap();
    assert!(outcome.refund.refund_needed);
    assert_eq!(outcome.refund.refund_amount, dec!(800));
    assert_eq!(outcome.seats_released, 2);

    let after = engine.manual_bookings.get_manual_booking(booking.booking.id).await.unwrap();
    assert_eq!(after.booking.booking_status(), Some(BookingStatus::Cancelled));
    assert!(after
        .seats
        .iter()
        .all(|s| s.status() == Some(PassengerStatus::Cancelled)));
    assert_inventory_invariants(&pool, trip_id).await;

    let err = engine
        .cancellations
        .cancel_manual_booking(booking.booking.id, 42, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_after_single_seat_cancel(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let booking = engine
        .manual_bookings
        .create_manual_booking(
            42,
            &manual_request(trip_id, &[seats[0].id, seats[1].id], PaymentStatus::Pending, dec!(0)),
        )
        .await
        .unwrap();
    engine
        .passengers
        .set_status(booking.seats[0].id, PassengerStatus::Cancelled, 42)
        .await
        .unwrap();

    let outcome = engine
        .cancellations
        .cancel_manual_booking(booking.booking.id, 42, None)
        .await
        .unwrap();
    assert_eq!(outcome.seats_released, 1);
    assert!(!outcome.refund.refund_needed);
    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().available, 4);
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_refused_once_a_passenger_boarded(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let booking = engine
        .bookings
        .create_booking(501, &booking_request(trip_id, &[seats[0].id, seats[1].id]))
        .await
        .unwrap();
    engine.bookings.confirm_payment(booking.booking.id).await.unwrap();
    engine.passengers.board(booking.seats[0].id, 900).await.unwrap();

    let err = engine
        .cancellations
        .cancel(booking.booking.id, 501, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    // Nothing moved: the booking is open and both seats stay booked.
    let after = engine.bookings.get_booking(booking.booking.id).await.unwrap();
    assert_eq!(after.booking.booking_status(), Some(BookingStatus::Confirmed));
    let boarded = after.seats.iter().find(|s| s.id == booking.seats[0].id).unwrap();
    let waiting = after.seats.iter().find(|s| s.id == booking.seats[1].id).unwrap();
    assert_eq!(boarded.status(), Some(PassengerStatus::Boarded));
    assert_eq!(waiting.status(), Some(PassengerStatus::Confirmed));
    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().booked, 2);
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_cancel_manual_booking_refused_after_trip_completed(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let booking = engine
        .manual_bookings
        .create_manual_booking(
            42,
            &manual_request(trip_id, &[seats[0].id], PaymentStatus::Paid, dec!(1200)),
        )
        .await
        .unwrap();
    let link_id = booking.seats[0].id;
    engine.passengers.board(link_id, 900).await.unwrap();
    engine
        .passengers
        .set_status(link_id, PassengerStatus::Completed, 900)
        .await
        .unwrap();

    let err = engine
        .cancellations
        .cancel_manual_booking(booking.booking.id, 42, None)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::State);

    let after = engine.manual_bookings.get_manual_booking(booking.booking.id).await.unwrap();
    assert_eq!(after.booking.booking_status(), Some(BookingStatus::Confirmed));
    assert_eq!(after.seats[0].status(), Some(PassengerStatus::Completed));
    assert_inventory_invariants(&pool, trip_id).await;
}
