use std::sync::Arc;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method};
use wiremock::{Mock, MockServer, ResponseTemplate};
use token_infra::config::{PoolConfig, SchedulerConfig};
use token_infra::hub::BroadcastHub;
use token_infra::rpc::ConnectionPool;
use token_infra::scheduler::{CycleOutcome, IngestionScheduler};
use token_infra::sources::AdapterRegistry;
use token_infra::sources::synthetic::{FixedSampler, Synthesizer};
use token_infra::store::TimeSeriesStore;
use token_infra::types::asset::RiskLevel;

const SOL: &str = "So11111111111111111111111111111111111111112";

async fn healthy_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getLatestBlockhash" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": { "blockhash": "abc", "lastValidBlockHeight": 10 } }
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({ "method": "getAccountInfo" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "result": { "context": { "slot": 1 }, "value": null }
        })))
        .mount(&server)
        .await;
    server
}

async fn down_endpoint() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    server
}

struct Harness {
    scheduler: IngestionScheduler,
    store: Arc<TimeSeriesStore>,
    hub: Arc<BroadcastHub>,
    pool: Arc<ConnectionPool>,
}

fn harness(endpoints: Vec<String>) -> Harness {
    let pool_config = PoolConfig {
        endpoints,
        probe_timeout_ms: 1_000,
        request_timeout_ms: 1_000,
        ..PoolConfig::default()
    };
    let pool = Arc::new(ConnectionPool::from_config(&pool_config).unwrap());
    let store = Arc::new(TimeSeriesStore::default());
    let hub = Arc::new(BroadcastHub::with_buffer(16));
    let adapters = AdapterRegistry::with_platforms(Synthesizer::new(Arc::new(FixedSampler(0.5))));

    let scheduler = IngestionScheduler::new(
        pool.clone(),
        store.clone(),
        hub.clone(),
        adapters,
        &SchedulerConfig::default(),
    );
    Harness { scheduler, store, hub, pool }
}

#[tokio::test]
async fn first_cycle_seeds_every_platform_and_broadcasts() {
    let server = healthy_endpoint().await;
    let h = harness(vec![server.uri()]);
    let mut subscriber = h.hub.subscribe();

    let outcome = h.scheduler.run_metrics_cycle().await;

    assert_eq!(outcome, CycleOutcome::Completed { assets: 17, failures: 0 });
    assert_eq!(h.store.asset_count(), 17);
    assert_eq!(h.store.query_price_history(SOL, 100).len(), 24);

    let payload: serde_json::Value = serde_json::from_str(&subscriber.recv().await.unwrap()).unwrap();
    assert_eq!(payload["type"], "token_update");
    assert_eq!(payload["data"]["assets"].as_array().unwrap().len(), 17);
    assert_eq!(payload["data"]["stats"]["totalTokens"], 17);
}

#[tokio::test]
async fn later_cycles_extend_history_and_recompute_changes() {
    let server = healthy_endpoint().await;
    let h = harness(vec![server.uri()]);

    h.scheduler.run_metrics_cycle().await;
    let before = h.store.get_asset(SOL).unwrap();
    h.scheduler.run_metrics_cycle().await;
    let after = h.store.get_asset(SOL).unwrap();

    let history = h.store.query_price_history(SOL, 100);
    assert_eq!(history.len(), 25);
    assert_eq!(history.last().unwrap().value, after.price);
    assert!(history.windows(2).all(|w| w[0].time <= w[1].time));

    let expected = (after.market_cap - before.market_cap) / before.market_cap * 100.0;
    assert!((after.market_cap_change_24h - expected).abs() < 1e-6);
    assert_eq!(after.holder_change_24h, after.holder_count as i64 - before.holder_count as i64);
    assert!(!h.store.query_transactions(SOL, 100).is_empty());
}

#[tokio::test]
async fn audit_applies_mint_check_and_reclassifies() {
    let server = healthy_endpoint().await;
    let h = harness(vec![server.uri()]);
    h.scheduler.run_metrics_cycle().await;

    let outcome = h.scheduler.run_security_audit().await;
    assert_eq!(outcome, CycleOutcome::Completed { assets: 17, failures: 0 });

    // Absent mint accounts read as disabled; the fixed sampler leaves
    // liquidity unlocked, the contract verified and the ratio at 20%.
    for asset in h.store.all_assets() {
        assert!(asset.security.mint_disabled, "{}", asset.symbol);
        assert!(!asset.security.liquidity_locked);
        assert_eq!(asset.risk_level, RiskLevel::Caution, "{}", asset.symbol);
    }
}

#[tokio::test]
async fn rotates_past_a_failing_endpoint() {
    let down = down_endpoint().await;
    let up = healthy_endpoint().await;
    let h = harness(vec![down.uri(), up.uri()]);

    let outcome = h.scheduler.run_metrics_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Completed { assets: 17, .. }));
    assert_eq!(h.pool.current_endpoint(), Some(up.uri().as_str()));
    let health = h.pool.get_connections_health();
    assert_eq!(health[0].consecutive_failures, 1);
    assert_eq!(health[1].consecutive_failures, 0);
}

#[tokio::test]
async fn all_endpoints_down_aborts_without_writes() {
    let a = down_endpoint().await;
    let b = down_endpoint().await;
    let h = harness(vec![a.uri(), b.uri()]);
    let mut subscriber = h.hub.subscribe();

    let outcome = h.scheduler.run_metrics_cycle().await;

    assert!(matches!(outcome, CycleOutcome::Aborted(_)));
    assert_eq!(h.store.asset_count(), 0);
    assert!(subscriber.try_recv().is_none());
}
