//! Shared helpers for API integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use busline_core::types::DbId;
use busline_engine::{Engine, EngineConfig};
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;

use busline_api::config::ServerConfig;
use busline_api::router::build_app_router;
use busline_api::state::AppState;

/// Actor id sent on every mutating request.
pub const ACTOR_ID: DbId = 77;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        database_max_connections: 5,
    }
}

pub fn test_engine_config() -> EngineConfig {
    EngineConfig {
        qr_signing_secret: "api-test-secret".to_string(),
        ..EngineConfig::default()
    }
}

/// Build the full application router with all middleware layers, using the
/// given database pool.
pub fn build_test_app(pool: PgPool) -> Router {
    build_test_app_with(pool, test_engine_config())
}

pub fn build_test_app_with(pool: PgPool, engine_config: EngineConfig) -> Router {
    build_test_app_from(pool, test_config(), engine_config)
}

pub fn build_test_app_from(pool: PgPool, config: ServerConfig, engine_config: EngineConfig) -> Router {
    let state = AppState {
        pool: pool.clone(),
        config: Arc::new(config.clone()),
        engine: Engine::new(pool, engine_config),
    };

    build_app_router(state, &config)
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

/// Send a JSON body with the `x-actor-id` header set to [`ACTOR_ID`].
pub async fn send_json(app: Router, method: Method, uri: &str, body: Value) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .header("x-actor-id", ACTOR_ID.to_string())
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Insert a bookable trip departing tomorrow. Trips come from upstream
/// scheduling, so there is no endpoint for them.
pub async fn insert_trip(pool: &PgPool, total_seats: i32) -> DbId {
    let (id,): (DbId,) = sqlx::query_as(
        "INSERT INTO scheduled_trips (route_label, departure_at, base_fare, total_seats) \
         VALUES ('Kandy - Jaffna', NOW() + INTERVAL '1 day', 1500.00, $1) \
         RETURNING id",
    )
    .bind(total_seats)
    .fetch_one(pool)
    .await
    .unwrap();
    id
}

/// Lay out `count` seats numbered `1..=count` through the API and return
/// their ids in seat-number order.
pub async fn create_seats(app: Router, trip_id: DbId, count: usize) -> Vec<DbId> {
    let seats: Vec<Value> = (1..=count)
        .map(|n| serde_json::json!({ "seat_number": n.to_string() }))
        .collect();
    let response = post_json(
        app,
        &format!("/api/v1/trips/{trip_id}/seats"),
        serde_json::json!({ "seats": seats }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);

    body_json(response).await["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["id"].as_i64().unwrap())
        .collect()
}

pub fn booking_body(trip_id: DbId, seat_ids: &[DbId]) -> Value {
    let passengers: Vec<Value> = seat_ids
        .iter()
        .enumerate()
        .map(|(n, _)| serde_json::json!({ "name": format!("Passenger {}", n + 1) }))
        .collect();
    serde_json::json!({
        "trip_id": trip_id,
        "seat_ids": seat_ids,
        "passengers": passengers,
        "contact": { "name": "Tharindu Silva", "phone": "0771234567" },
    })
}
