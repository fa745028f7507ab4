pub mod rest;
pub mod websocket;

use std::sync::Arc;
use axum::Router;
use axum::routing::get;
use tower_http::trace::TraceLayer;
use crate::hub::BroadcastHub;
use crate::rpc::ConnectionPool;
use crate::scheduler::IngestionScheduler;
use crate::store::TimeSeriesStore;

/// Shared handles behind every route. Handlers only read the store and pool;
/// websocket sessions subscribe to the hub. `/health` reflects the scheduler's loops.
pub struct ApiState {
    pub store: Arc<TimeSeriesStore>,
    pub hub: Arc<BroadcastHub>,
    pub pool: Arc<ConnectionPool>,
    pub scheduler: Arc<IngestionScheduler>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/health", get(rest::health_check))
        .route("/metrics", get(rest::metrics))
        .route("/api/tokens", get(rest::list_assets))
        .route("/api/tokens/:address", get(rest::get_asset))
        .route("/api/tokens/:address/transactions", get(rest::get_transactions))
        .route("/api/tokens/:address/price-history", get(rest::get_price_history))
        .route("/api/tokens/:address/volume-history", get(rest::get_volume_history))
        .route("/api/rpc/health", get(rest::rpc_health))
        .route("/ws", get(websocket::websocket_handler))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
