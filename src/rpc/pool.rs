use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use parking_lot::RwLock;
use serde::Serialize;
use tokio::sync::Mutex;
use tokio::time::{timeout, Instant};
use tracing::{debug, info, warn};
use crate::config::PoolConfig;
use crate::error::{Error, Result};
use crate::observability::metrics::{DEGRADED_CONNECTIONS, ENDPOINT_ROTATIONS, PROBE_FAILURES};
use crate::rpc::{Connection, HttpRpcClient};
use crate::types::timestamp::Timestamp;

/// Health record of one configured endpoint. Only the pool mutates it.
#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointHealth {
    pub endpoint: String,
    pub consecutive_failures: u32,
    #[serde(skip)]
    pub last_attempt: Option<Instant>,
    #[serde(rename = "lastAttempt")]
    pub last_attempt_at: Option<Timestamp>,
    pub last_latency_ms: Option<u64>,
}

impl EndpointHealth {
    fn new(endpoint: &str) -> Self {
        EndpointHealth {
            endpoint: endpoint.to_string(),
            consecutive_failures: 0,
            last_attempt: None,
            last_attempt_at: None,
            last_latency_ms: None,
        }
    }

    /// Excluded from rotation: more than `threshold` consecutive failures, the
    /// last of them inside `window`.
    pub fn is_circuit_broken(&self, now: Instant, threshold: u32, window: Duration) -> bool {
        self.consecutive_failures > threshold
            && self.last_attempt
                .is_some_and(|at| now.saturating_duration_since(at) < window)
    }
}

/// Upstream endpoints with health tracking and round-robin failover.
///
/// `get_connection` probes the current endpoint and rotates only when that
/// probe fails or a rotation is forced. Rotations are serialized so
/// concurrent callers never probe the same endpoints twice over.
pub struct ConnectionPool {
    connections: Vec<Connection>,
    health: RwLock<Vec<EndpointHealth>>,
    current: AtomicUsize,
    ever_healthy: AtomicBool,
    degraded: AtomicBool,
    rotation: Mutex<()>,
    probe_timeout: Duration,
    failure_threshold: u32,
    circuit_window: Duration,
}

impl ConnectionPool {
    pub fn new(connections: Vec<Connection>, config: &PoolConfig) -> Self {
        let health = connections.iter()
            .map(|c| EndpointHealth::new(c.endpoint()))
            .collect();

        ConnectionPool {
            connections,
            health: RwLock::new(health),
            current: AtomicUsize::new(0),
            ever_healthy: AtomicBool::new(false),
            degraded: AtomicBool::new(false),
            rotation: Mutex::new(()),
            probe_timeout: config.probe_timeout(),
            failure_threshold: config.failure_threshold,
            circuit_window: config.circuit_window(),
        }
    }

    /// One JSON-RPC client per configured endpoint.
    pub fn from_config(config: &PoolConfig) -> Result<Self> {
        let connections = config.endpoints.iter()
            .map(|endpoint| {
                let client = HttpRpcClient::new(endpoint.as_str(), config.request_timeout())?;
                Ok(Connection::new(endpoint.as_str(), Arc::new(client)))
            })
            .collect::<Result<Vec<_>>>()?;

        info!("Connection pool initialized with {} endpoints", connections.len());
        Ok(Self::new(connections, config))
    }

    pub fn current_endpoint(&self) -> Option<&str> {
        self.connections
            .get(self.current.load(Ordering::Acquire))
            .map(Connection::endpoint)
    }

    /// Whether the last hand-out was a stale connection after a failed rotation.
    pub fn is_degraded(&self) -> bool {
        self.degraded.load(Ordering::Acquire)
    }

    pub fn get_connections_health(&self) -> Vec<EndpointHealth> {
        self.health.read().clone()
    }

    pub async fn get_connection(&self, force_new: bool) -> Result<Connection> {
        if self.connections.is_empty() {
            return Err(Error::NoHealthyEndpoint);
        }

        let _rotation = self.rotation.lock().await;
        let current = self.current.load(Ordering::Acquire);

        if !force_new && self.probe(current).await {
            self.degraded.store(false, Ordering::Release);
            return Ok(self.connections[current].clone());
        }

        let n = self.connections.len();
        for step in 1..=n {
            let idx = (current + step) % n;
            if idx == current && !force_new {
                // already probed above
                continue;
            }
            if self.is_circuit_broken(idx) {
                debug!(endpoint = %self.connections[idx].endpoint(), "Skipping circuit-broken endpoint");
                continue;
            }
            if self.probe(idx).await {
                if idx != current {
                    self.current.store(idx, Ordering::Release);
                    ENDPOINT_ROTATIONS.inc();
                    info!(
                        from = %self.connections[current].endpoint(),
                        to = %self.connections[idx].endpoint(),
                        "Rotated upstream endpoint"
                    );
                }
                self.degraded.store(false, Ordering::Release);
                return Ok(self.connections[idx].clone());
            }
        }

        if !self.ever_healthy.load(Ordering::Acquire) || self.all_circuit_broken() {
            warn!("No healthy upstream endpoint");
            return Err(Error::NoHealthyEndpoint);
        }

        self.degraded.store(true, Ordering::Release);
        DEGRADED_CONNECTIONS.inc();
        warn!(
            endpoint = %self.connections[current].endpoint(),
            "All endpoints failed their probe, handing out stale connection"
        );
        Ok(self.connections[current].clone())
    }

    fn is_circuit_broken(&self, idx: usize) -> bool {
        self.health.read()[idx]
            .is_circuit_broken(Instant::now(), self.failure_threshold, self.circuit_window)
    }

    fn all_circuit_broken(&self) -> bool {
        let now = Instant::now();
        self.health.read()
            .iter()
            .all(|h| h.is_circuit_broken(now, self.failure_threshold, self.circuit_window))
    }

    async fn probe(&self, idx: usize) -> bool {
        let connection = &self.connections[idx];
        let started = Instant::now();
        let outcome = match timeout(self.probe_timeout, connection.probe()).await {
            Ok(result) => result,
            Err(_) => Err(Error::Timeout(self.probe_timeout)),
        };

        let mut health = self.health.write();
        let entry = &mut health[idx];
        entry.last_attempt = Some(Instant::now());
        entry.last_attempt_at = Some(Timestamp::now());

        match outcome {
            Ok(()) => {
                entry.consecutive_failures = 0;
                entry.last_latency_ms = Some(started.elapsed().as_millis() as u64);
                self.ever_healthy.store(true, Ordering::Release);
                true
            }
            Err(e) => {
                entry.consecutive_failures = entry.consecutive_failures.saturating_add(1);
                PROBE_FAILURES.inc();
                warn!(
                    endpoint = %connection.endpoint(),
                    failures = entry.consecutive_failures,
                    error = %e,
                    "Endpoint probe failed"
                );
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;
    use crate::rpc::MockUpstreamClient;

    fn config() -> PoolConfig {
        PoolConfig {
            endpoints: Vec::new(),
            probe_timeout_ms: 500,
            request_timeout_ms: 1_000,
            failure_threshold: 3,
            circuit_window_secs: 300,
        }
    }

    fn unavailable(endpoint: &str) -> Error {
        Error::EndpointUnavailable {
            endpoint: endpoint.to_string(),
            reason: "connection refused".to_string(),
        }
    }

    fn healthy(name: &str) -> Connection {
        let mut client = MockUpstreamClient::new();
        client.expect_probe().returning(|| Ok(()));
        Connection::new(name, Arc::new(client))
    }

    fn failing(name: &'static str, times: usize) -> Connection {
        let mut client = MockUpstreamClient::new();
        client.expect_probe()
            .times(times)
            .returning(move || Err(unavailable(name)));
        Connection::new(name, Arc::new(client))
    }

    fn untouched(name: &str) -> Connection {
        let mut client = MockUpstreamClient::new();
        client.expect_probe().never();
        Connection::new(name, Arc::new(client))
    }

    #[tokio::test]
    async fn empty_pool_has_no_healthy_endpoint() {
        let pool = ConnectionPool::new(Vec::new(), &config());
        assert!(matches!(pool.get_connection(false).await, Err(Error::NoHealthyEndpoint)));
    }

    #[tokio::test]
    async fn keeps_current_endpoint_while_it_answers() {
        let pool = ConnectionPool::new(vec![healthy("a"), untouched("b")], &config());

        for _ in 0..3 {
            let conn = pool.get_connection(false).await.unwrap();
            assert_eq!(conn.endpoint(), "a");
        }
        assert_eq!(pool.get_connections_health()[0].consecutive_failures, 0);
        assert!(pool.get_connections_health()[0].last_latency_ms.is_some());
    }

    #[tokio::test]
    async fn repeatedly_failing_endpoint_is_never_selected_inside_window() {
        // E fails on calls 1, 3, 5, 7 and is then circuit-broken. `times(4)`
        // fails the test if it is probed again.
        let pool = ConnectionPool::new(
            vec![healthy("a"), failing("e", 4), healthy("c")],
            &config(),
        );

        for _ in 0..20 {
            let conn = pool.get_connection(true).await.unwrap();
            assert_ne!(conn.endpoint(), "e");
            let conn = pool.get_connection(false).await.unwrap();
            assert_ne!(conn.endpoint(), "e");
        }

        let health = pool.get_connections_health();
        assert_eq!(health[1].consecutive_failures, 4);
        assert!(health[1].is_circuit_broken(Instant::now(), 3, Duration::from_secs(300)));
    }

    #[tokio::test]
    async fn forced_rotation_skips_failing_current_without_probing_it() {
        let pool = ConnectionPool::new(vec![healthy("x"), untouched("y")], &config());
        {
            let mut health = pool.health.write();
            health[1].consecutive_failures = 3;
            health[1].last_attempt = Some(Instant::now() - Duration::from_secs(30));
        }
        // y must be current: 3 failures is under the breaker, so with x current
        // a forced rotation would probe y.
        pool.current.store(1, Ordering::Release);

        let conn = pool.get_connection(true).await.unwrap();

        assert_eq!(conn.endpoint(), "x");
        assert_eq!(pool.current_endpoint(), Some("x"));
        assert_eq!(pool.get_connections_health()[1].consecutive_failures, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn circuit_reopens_after_window() {
        let pool = ConnectionPool::new(vec![healthy("a"), failing("b", 5)], &config());
        for _ in 0..4 {
            pool.get_connection(true).await.unwrap();
        }
        assert_eq!(pool.get_connections_health()[1].consecutive_failures, 4);

        // a -> b is skipped, rotation wraps back to a
        assert_eq!(pool.get_connection(true).await.unwrap().endpoint(), "a");

        tokio::time::advance(Duration::from_secs(301)).await;
        assert_eq!(pool.get_connection(true).await.unwrap().endpoint(), "a");
        assert_eq!(pool.get_connections_health()[1].consecutive_failures, 5);
    }

    #[tokio::test]
    async fn never_healthy_pool_escalates() {
        let pool = ConnectionPool::new(vec![failing("a", 1), failing("b", 1)], &config());
        assert!(matches!(pool.get_connection(false).await, Err(Error::NoHealthyEndpoint)));
    }

    #[tokio::test]
    async fn total_outage_after_success_hands_out_stale_connection() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut flaky = MockUpstreamClient::new();
        let seen = calls.clone();
        flaky.expect_probe().returning(move || {
            if seen.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(())
            } else {
                Err(unavailable("a"))
            }
        });

        let pool = ConnectionPool::new(
            vec![Connection::new("a", Arc::new(flaky)), failing("b", 1)],
            &config(),
        );

        assert_eq!(pool.get_connection(false).await.unwrap().endpoint(), "a");
        assert!(!pool.is_degraded());

        let stale = pool.get_connection(false).await.unwrap();
        assert_eq!(stale.endpoint(), "a");
        assert!(pool.is_degraded());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn hung_probe_counts_as_failure() {
        let pool = ConnectionPool::new(
            vec![Connection::new("hung", Arc::new(HangingClient)), healthy("ok")],
            &config(),
        );

        let conn = pool.get_connection(false).await.unwrap();
        assert_eq!(conn.endpoint(), "ok");
        assert_eq!(pool.get_connections_health()[0].consecutive_failures, 1);
    }

    struct HangingClient;

    #[async_trait::async_trait]
    impl crate::rpc::UpstreamClient for HangingClient {
        async fn probe(&self) -> Result<()> {
            std::future::pending::<()>().await;
            Ok(())
        }

        async fn account_exists(&self, _address: &str) -> Result<bool> {
            Ok(false)
        }
    }
}
