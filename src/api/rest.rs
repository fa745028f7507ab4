use std::sync::Arc;
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use crate::api::ApiState;
use crate::error::Error;
use crate::observability::metrics::render_metrics;
use crate::rpc::EndpointHealth;
use crate::store::Snapshot;
use crate::types::asset::Asset;
use crate::types::series::{TimeSeriesPoint, Transaction};

const DEFAULT_TRANSACTION_LIMIT: usize = 20;
const DEFAULT_HISTORY_LIMIT: usize = 100;

pub async fn health_check(State(state): State<Arc<ApiState>>) -> Result<&'static str, StatusCode> {
    state.scheduler.check_health().map_err(|e| {
        tracing::error!("Health check failed: {}", e);
        StatusCode::SERVICE_UNAVAILABLE
    })?;
    Ok("OK")
}

pub async fn metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        render_metrics(),
    )
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitQuery {
    pub limit: Option<usize>,
}

#[derive(Serialize)]
pub struct AssetResponse {
    pub asset: Asset,
}

#[derive(Serialize)]
pub struct TransactionsResponse {
    pub transactions: Vec<Transaction>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryResponse {
    pub price_history: Vec<TimeSeriesPoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VolumeHistoryResponse {
    pub volume_history: Vec<TimeSeriesPoint>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RpcHealthResponse {
    pub current_endpoint: Option<String>,
    pub degraded: bool,
    pub endpoints: Vec<EndpointHealth>,
}

pub async fn list_assets(State(state): State<Arc<ApiState>>) -> Json<Snapshot> {
    Json(state.store.snapshot())
}

pub async fn get_asset(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
) -> Result<Json<AssetResponse>, StatusCode> {
    let asset = state.store.require_asset(&address).map_err(status_for)?;
    Ok(Json(AssetResponse { asset }))
}

pub async fn get_transactions(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<TransactionsResponse>, StatusCode> {
    ensure_tracked(&state, &address)?;
    let limit = query.limit.unwrap_or(DEFAULT_TRANSACTION_LIMIT);
    Ok(Json(TransactionsResponse {
        transactions: state.store.query_transactions(&address, limit),
    }))
}

pub async fn get_price_history(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<PriceHistoryResponse>, StatusCode> {
    ensure_tracked(&state, &address)?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(PriceHistoryResponse {
        price_history: state.store.query_price_history(&address, limit),
    }))
}

pub async fn get_volume_history(
    State(state): State<Arc<ApiState>>,
    Path(address): Path<String>,
    Query(query): Query<LimitQuery>,
) -> Result<Json<VolumeHistoryResponse>, StatusCode> {
    ensure_tracked(&state, &address)?;
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    Ok(Json(VolumeHistoryResponse {
        volume_history: state.store.query_volume_history(&address, limit),
    }))
}

pub async fn rpc_health(State(state): State<Arc<ApiState>>) -> Json<RpcHealthResponse> {
    Json(RpcHealthResponse {
        current_endpoint: state.pool.current_endpoint().map(str::to_string),
        degraded: state.pool.is_degraded(),
        endpoints: state.pool.get_connections_health(),
    })
}

fn ensure_tracked(state: &ApiState, address: &str) -> Result<(), StatusCode> {
    if state.store.contains(address) {
        Ok(())
    } else {
        Err(StatusCode::NOT_FOUND)
    }
}

fn status_for(err: Error) -> StatusCode {
    match err {
        Error::AssetNotFound(_) => StatusCode::NOT_FOUND,
        Error::InvalidAsset { .. } | Error::InvalidPoint { .. } => StatusCode::BAD_REQUEST,
        other => {
            tracing::error!("Request failed: {}", other);
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}
