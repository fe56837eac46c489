//! Seat Inventory integration tests.

mod common;

use assert_matches::assert_matches;
use busline_core::error::ErrorKind;
use busline_core::status::SeatStatus;
use busline_core::types::DbId;
use busline_db::models::trip::ScheduledTrip;
use busline_db::repositories::TripRepo;
use busline_engine::inventory::{allocate_in, release_in};
use common::*;
use rust_decimal_macros::dec;
use sqlx::PgPool;

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_trip_seats_once(pool: PgPool) {
    let engine = engine(&pool);
    let trip_id = insert_trip(&pool, 4, dec!(900.00), 24).await;

    let seats = engine
        .inventory
        .create_trip_seats(trip_id, &layout(4, None))
        .await
        .unwrap();
    assert_eq!(seats.len(), 4);
    assert!(seats.iter().all(|s| s.is_available()));

    let err = engine
        .inventory
        .create_trip_seats(trip_id, &layout(4, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_create_trip_seats_validates_layout(pool: PgPool) {
    let engine = engine(&pool);
    let trip_id = insert_trip(&pool, 4, dec!(900.00), 24).await;

    let err = engine
        .inventory
        .create_trip_seats(trip_id, &layout(3, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let mut seats = layout(4, None);
    seats[3].seat_number = "1".into();
    let err = engine.inventory.create_trip_seats(trip_id, &seats).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = engine
        .inventory
        .create_trip_seats(trip_id, &layout(4, Some(dec!(-1))))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = engine
        .inventory
        .create_trip_seats(999_999, &layout(4, None))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_list_and_summary(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, _) = trip_with_seats(&pool, 40).await;

    let seats = engine.inventory.list_seats(trip_id).await.unwrap();
    assert_eq!(seats.len(), 40);

    let summary = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(summary.total, 40);
    assert_eq!(summary.available, 40);
    assert!(summary.is_balanced());

    let err = engine.inventory.list_seats(999_999).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_check_availability_reports_subset(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();

    book_seats(&pool, trip_id, &ids[..1]).await;

    let check = engine.inventory.check_availability(trip_id, &ids[..2]).await.unwrap();
    assert_eq!(check.requested, 2);
    assert_eq!(check.available.len(), 1);
    assert!(!check.is_complete());
    assert_eq!(check.available[0].trip_seat_id, ids[1]);
    assert_eq!(check.available[0].price, dec!(1200.00));
}

async fn load_trip(pool: &PgPool, trip_id: DbId) -> ScheduledTrip {
    TripRepo::find_by_id(pool, trip_id).await.unwrap().unwrap()
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_allocate_release_round_trip(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 6).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();
    let trip = load_trip(&pool, trip_id).await;
    let before = engine.inventory.seat_summary(trip_id).await.unwrap();

    let mut tx = pool.begin().await.unwrap();
    let priced = allocate_in(&mut tx, &trip, &ids[2..5], "BK-AAAAAAAA").await.unwrap();
    assert_eq!(priced.len(), 3);
    let priced_ids: Vec<_> = priced.iter().map(|p| p.trip_seat_id).collect();
    assert_eq!(priced_ids, ids[2..5].to_vec());
    tx.commit().await.unwrap();

    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().booked, 3);
    assert_eq!(assert_seat_invariants(&pool, trip_id).await, 3);

    // A different reference releases nothing.
    let mut tx = pool.begin().await.unwrap();
    assert_eq!(release_in(&mut tx, &ids[2..5], Some("BK-ZZZZZZZZ")).await.unwrap(), 0);
    let released = release_in(&mut tx, &ids[2..5], Some("BK-AAAAAAAA")).await.unwrap();
    assert_eq!(released, 3);
    tx.commit().await.unwrap();

    let after = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(after, before);
    let seats = engine.inventory.list_seats(trip_id).await.unwrap();
    assert!(seats.iter().all(|s| s.is_available() && s.booking_reference.is_none()));
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_allocate_is_all_or_nothing(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();
    let trip = load_trip(&pool, trip_id).await;

    book_seats(&pool, trip_id, &ids[1..2]).await;

    let mut tx = pool.begin().await.unwrap();
    let err = allocate_in(&mut tx, &trip, &ids[..3], "BK-BBBBBBBB")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);
    tx.rollback().await.unwrap();

    // Seats 1 and 3 were available but must not have changed.
    let summary = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(summary.booked, 1);
    let listed = engine.inventory.list_seats(trip_id).await.unwrap();
    assert!(listed
        .iter()
        .all(|s| s.booking_reference.as_deref() != Some("BK-BBBBBBBB")));
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_allocate_rejects_bad_selection(pool: PgPool) {
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let (other_trip, other_seats) = trip_with_seats(&pool, 2).await;
    assert_ne!(trip_id, other_trip);
    let trip = load_trip(&pool, trip_id).await;
    let mut tx = pool.begin().await.unwrap();

    let err = allocate_in(&mut tx, &trip, &[seats[0].id, seats[0].id], "BK-AAAAAAAA")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let err = allocate_in(&mut tx, &trip, &[seats[0].id, other_seats[0].id], "BK-AAAAAAAA")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);

    let err = allocate_in(&mut tx, &trip, &[], "BK-AAAAAAAA").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_block_booked_seat_conflicts(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();

    book_seats(&pool, trip_id, &ids[..1]).await;

    let err = engine
        .inventory
        .block(trip_id, &ids[..2], 7, "Seat belt broken")
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Conflict);

    // Nothing was blocked, not even the available seat.
    let summary = engine.inventory.seat_summary(trip_id).await.unwrap();
    assert_eq!(summary.blocked, 0);
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_block_unblock_cycle(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 4).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();

    let blocked = engine
        .inventory
        .block(trip_id, &ids[..2], 7, "Seat belt broken")
        .await
        .unwrap();
    assert_eq!(blocked.len(), 2);
    assert!(blocked.iter().all(|s| s.status() == SeatStatus::Blocked));

    // Blocking again refreshes the hold.
    let reblocked = engine
        .inventory
        .block(trip_id, &ids[..1], 8, "Awaiting repair")
        .await
        .unwrap();
    assert_eq!(reblocked[0].blocked_by, Some(8));
    assert_eq!(reblocked[0].block_reason.as_deref(), Some("Awaiting repair"));

    let err = engine.inventory.block(trip_id, &ids[2..3], 7, "  ").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Validation);

    let unblocked = engine.inventory.unblock(trip_id, &ids).await.unwrap();
    assert_eq!(unblocked.len(), 2);
    assert_eq!(engine.inventory.seat_summary(trip_id).await.unwrap().available, 4);
    assert_inventory_invariants(&pool, trip_id).await;
}

#[sqlx::test(migrations = "../db/migrations")]
async fn test_reprice_skips_booked_and_rejects_negative(pool: PgPool) {
    let engine = engine(&pool);
    let (trip_id, seats) = trip_with_seats(&pool, 3).await;
    let ids: Vec<_> = seats.iter().map(|s| s.id).collect();

    book_seats(&pool, trip_id, &ids[..1]).await;

    let repriced = engine.inventory.reprice(trip_id, &ids, dec!(1500.00)).await.unwrap();
    let repriced_ids: Vec<_> = repriced.iter().map(|s| s.id).collect();
    assert_eq!(repriced.len(), 2);
    assert!(!repriced_ids.contains(&ids[0]));

    let err = engine.inventory.reprice(trip_id, &ids, dec!(-10)).await.unwrap_err();
    assert_matches!(err.kind(), ErrorKind::Validation);
}
