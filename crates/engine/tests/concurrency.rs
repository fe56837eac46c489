//! Mutual exclusion over seat allocation across concurrent requests and
//! both booking channels.

mod common;

use busline_core::error::ErrorKind;
use busline_core::status::PaymentStatus;
use busline_engine::EngineResult;
use common::*;
use futures::future::join_all;
use rust_decimal_macros::dec;
use sqlx::PgPool;

fn outcome_kinds<T>(results: &[EngineResult<T>]) -> (usize, usize) {
    let wins = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| matches!(r, Err(e) if e.kind() == ErrorKind::Conflict))
        .count();
    (wins, conflicts)
}

/// `{A, B}` and `{B, C}` booked at the same time: exactly one wins and
/// seat B belongs to the winner.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_overlapping_bookings_exactly_one_wins(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let (a, b, c) = (seats[0].id, seats[1].id, seats[2].id);

    let first = booking_request(trip_id, &[a, b]);
    let second = booking_request(trip_id, &[b, c]);
    let (r1, r2) = tokio::join!(
        engine.bookings.create_booking(1, &first),
        engine.bookings.create_booking(2, &second),
    );

    let results = [r1, r2];
    assert_eq!(outcome_kinds(&results), (1, 1));

    let winner = results.iter().find_map(|r| r.as_ref().ok()).unwrap();
    let seat_b = engine
        .inventory
        .list_seats(trip_id)
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.id == b)
        .unwrap();
    assert_eq!(
        seat_b.booking_reference.as_deref(),
        Some(winner.booking.reference.as_str())
    );

    let summary = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(summary.booked, 2);
    assert_inventory_invariants(&pool, trip_id).await;
}

/// Scenario D: two staff bookings and one app booking race for one seat.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_cross_channel_race_for_single_seat(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let seat = seats[0].id;

    let manual_a = manual_request(trip_id, &[seat], PaymentStatus::Paid, dec!(1200));
    let manual_b = manual_request(trip_id, &[seat], PaymentStatus::Pending, dec!(0));
    let app = booking_request(trip_id, &[seat]);

    let (m1, m2, a1) = tokio::join!(
        engine.manual_bookings.create_manual_booking(10, &manual_a),
        engine.manual_bookings.create_manual_booking(11, &manual_b),
        engine.bookings.create_booking(12, &app),
    );

    let wins = [m1.is_ok(), m2.is_ok(), a1.is_ok()]
        .iter()
        .filter(|ok| **ok)
        .count();
    assert_eq!(wins, 1);
    for err in [m1.err(), m2.err()].into_iter().flatten() {
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
    if let Err(err) = a1 {
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    let (_, _, booked, _) = seat_counts(&pool, trip_id).await;
    assert_eq!(booked, 1);
    assert_inventory_invariants(&pool, trip_id).await;
}

/// Many concurrent single-seat requests for the same seat.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_many_requests_one_seat(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let request = booking_request(trip_id, &[seats[3].id]);

    let results = join_all((0..5).map(|user| engine.bookings.create_booking(user, &request))).await;
    assert_eq!(outcome_kinds(&results), (1, 4));
    assert_inventory_invariants(&pool, trip_id).await;
}

/// Disjoint selections never block each other from succeeding.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_disjoint_requests_all_succeed(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 8).await;

    let requests: Vec<_> = seats
        .chunks(2)
        .map(|pair| booking_request(trip_id, &[pair[0].id, pair[1].id]))
        .collect();
    let results =
        join_all(requests.iter().map(|r| engine.bookings.create_booking(1, r))).await;

    assert_eq!(outcome_kinds(&results), (4, 0));
    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().available, 0);
    assert_inventory_invariants(&pool, trip_id).await;
}

/// A cancellation and a new booking of the same seat are serialized by
/// the store: the seat ends up either free or owned by the new booking,
/// never double-claimed.
#[sqlx::test(migrations = "../db/migrations")]
async fn test_release_and_allocate_race(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 2).await;
    let seat = seats[0].id;

    let original = engine
        .bookings
        .create_booking(1, &booking_request(trip_id, &[seat]))
        .await
        .unwrap();

    let rebook = booking_request(trip_id, &[seat]);
    let (cancelled, rebooked) = tokio::join!(
        engine.cancellations.cancel(original.booking.id, 1, None),
        engine.bookings.create_booking(2, &rebook),
    );
    assert!(cancelled.is_ok());
    if let Err(err) = &rebooked {
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    let (available, _, booked, _) = seat_counts(&pool, trip_id).await;
    if rebooked.is_ok() {
        assert_eq!((available, booked), (1, 1));
    } else {
        assert_eq!((available, booked), (2, 0));
    }
    assert_inventory_invariants(&pool, trip_id).await;
}
