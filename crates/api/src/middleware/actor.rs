//! Acting user extractor for Axum handlers.
//!
//! The upstream gateway authenticates the caller and forwards their id in
//! the `x-actor-id` header. No authorization happens in this service.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use busline_core::types::DbId;

use crate::error::AppError;

/// Header carrying the authenticated user or staff id.
pub const ACTOR_HEADER: &str = "x-actor-id";

/// The user or staff member performing the request.
///
/// ```ignore
/// async fn my_handler(actor: Actor) -> AppResult<Json<()>> {
///     tracing::info!(actor_id = actor.id, "handling request");
///     Ok(Json(()))
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: DbId,
}

impl<S: Send + Sync> FromRequestParts<S> for Actor {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(ACTOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::BadRequest(format!("Missing {ACTOR_HEADER} header")))?;

        parse_actor_id(raw).map(|id| Actor { id })
    }
}

fn parse_actor_id(raw: &str) -> Result<DbId, AppError> {
    match raw.trim().parse::<DbId>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::BadRequest(format!(
            "Invalid {ACTOR_HEADER} header '{raw}'"
        ))),
    }
}
