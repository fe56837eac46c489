use std::sync::Arc;

use busline_engine::Engine;

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: the pool and engine components are handles.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: busline_db::DbPool,
    /// Server configuration.
    pub config: Arc<ServerConfig>,
    /// Seat inventory and booking engine.
    pub engine: Engine,
}
