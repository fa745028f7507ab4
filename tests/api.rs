use std::sync::Arc;
use std::time::Duration;
use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;
use token_infra::api::{create_router, ApiState};
use token_infra::config::{PoolConfig, SchedulerConfig};
use token_infra::hub::BroadcastHub;
use token_infra::rpc::ConnectionPool;
use token_infra::scheduler::IngestionScheduler;
use token_infra::sources::AdapterRegistry;
use token_infra::store::TimeSeriesStore;
use token_infra::types::asset::{AssetUpdate, Platform};
use token_infra::types::series::{Direction, TimeSeriesPoint, Transaction};
use token_infra::types::timestamp::Timestamp;

fn listing(address: &str, market_cap: f64) -> AssetUpdate {
    AssetUpdate {
        name: Some(format!("Token {}", address)),
        symbol: Some(address.to_uppercase()),
        platform: Some(Platform::Raydium),
        price: Some(1.5),
        market_cap: Some(market_cap),
        volume_24h: Some(2_500_000.0),
        launch_date: Some(Timestamp::from_millis(0)),
        ..AssetUpdate::new(address)
    }
}

fn app() -> (Router, Arc<TimeSeriesStore>) {
    let store = Arc::new(TimeSeriesStore::default());
    store.upsert_asset(listing("small", 1_000.0)).unwrap();
    store.upsert_asset(listing("large", 9_000.0)).unwrap();

    let start = Timestamp::now() - Duration::from_secs(600);
    for i in 0..150u64 {
        let at = start + Duration::from_secs(i);
        store.append_price_point("large", TimeSeriesPoint::new(at, i as f64)).unwrap();
        store.append_volume_point("large", TimeSeriesPoint::new(at, 10.0)).unwrap();
    }
    for i in 0..30 {
        store.append_transaction("large", Transaction {
            address: "large".to_string(),
            direction: Direction::Buy,
            amount: 1.0,
            value_usd: 1.5,
            wallet: format!("wallet{}", i),
            timestamp: Timestamp::now(),
        }).unwrap();
    }

    let pool_config = PoolConfig {
        endpoints: vec!["http://127.0.0.1:9".to_string()],
        ..PoolConfig::default()
    };
    let hub = Arc::new(BroadcastHub::default());
    let pool = Arc::new(ConnectionPool::from_config(&pool_config).unwrap());
    let scheduler = Arc::new(IngestionScheduler::new(
        pool.clone(),
        store.clone(),
        hub.clone(),
        AdapterRegistry::new(),
        &SchedulerConfig::default(),
    ));
    let state = ApiState {
        store: store.clone(),
        hub,
        pool,
        scheduler,
    };
    (create_router(Arc::new(state)), store)
}

async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let response = app
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn health_responds_ok() {
    let (app, _) = app();
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn token_list_carries_assets_and_stats() {
    let (app, _) = app();
    let (status, body) = get(app, "/api/tokens").await;

    assert_eq!(status, StatusCode::OK);
    let assets = body["assets"].as_array().unwrap();
    assert_eq!(assets.len(), 2);
    assert_eq!(assets[0]["address"], "large");
    assert_eq!(body["stats"]["totalTokens"], 2);
    assert_eq!(body["stats"]["volume24h"], "5.0M");
}

#[tokio::test]
async fn single_token_or_not_found() {
    let (app, _) = app();
    let (status, body) = get(app.clone(), "/api/tokens/small").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["asset"]["symbol"], "SMALL");

    let (status, _) = get(app, "/api/tokens/missing").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn history_limits_default_and_apply() {
    let (app, _) = app();

    let (_, body) = get(app.clone(), "/api/tokens/large/price-history").await;
    let points = body["priceHistory"].as_array().unwrap();
    assert_eq!(points.len(), 100);
    assert_eq!(points.last().unwrap()["value"], 149.0);

    let (_, body) = get(app.clone(), "/api/tokens/large/volume-history?limit=5").await;
    assert_eq!(body["volumeHistory"].as_array().unwrap().len(), 5);

    let (_, body) = get(app.clone(), "/api/tokens/large/transactions").await;
    assert_eq!(body["transactions"].as_array().unwrap().len(), 20);

    let (_, body) = get(app.clone(), "/api/tokens/large/transactions?limit=1").await;
    assert_eq!(body["transactions"][0]["wallet"], "wallet29");

    let (status, _) = get(app, "/api/tokens/missing/price-history").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rpc_health_lists_endpoints() {
    let (app, _) = app();
    let (status, body) = get(app, "/api/rpc/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["endpoints"][0]["endpoint"], "http://127.0.0.1:9");
    assert_eq!(body["endpoints"][0]["consecutiveFailures"], 0);
    assert_eq!(body["degraded"], false);
}
