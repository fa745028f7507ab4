use lazy_static::lazy_static;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts, Registry,
    TextEncoder,
};

lazy_static! {
    pub static ref REGISTRY: Registry = Registry::new();

    // Scheduler metrics
    pub static ref CYCLES_STARTED: IntCounterVec = IntCounterVec::new(
        Opts::new("cycles_started_total", "Cycle runs started"),
        &["cycle"]
    ).expect("valid metric definition");

    pub static ref CYCLES_COMPLETED: IntCounterVec = IntCounterVec::new(
        Opts::new("cycles_completed_total", "Cycle runs completed"),
        &["cycle"]
    ).expect("valid metric definition");

    pub static ref CYCLES_SKIPPED: IntCounterVec = IntCounterVec::new(
        Opts::new("cycles_skipped_total", "Ticks skipped because the previous run was still in flight"),
        &["cycle"]
    ).expect("valid metric definition");

    pub static ref CYCLES_ABORTED: IntCounterVec = IntCounterVec::new(
        Opts::new("cycles_aborted_total", "Cycle runs aborted early"),
        &["cycle"]
    ).expect("valid metric definition");

    pub static ref CYCLE_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "cycle_duration_seconds",
            "Wall time of one cycle run"
        ).buckets(vec![0.01, 0.05, 0.1, 0.5, 1.0, 5.0, 10.0, 30.0]),
        &["cycle"]
    ).expect("valid metric definition");

    pub static ref ADAPTER_FAILURES: IntCounterVec = IntCounterVec::new(
        Opts::new("adapter_failures_total", "Source adapter calls that failed or timed out"),
        &["platform"]
    ).expect("valid metric definition");

    // Connection pool metrics
    pub static ref PROBE_FAILURES: IntCounter = IntCounter::new(
        "endpoint_probe_failures_total",
        "Liveness probes that failed"
    ).expect("valid metric definition");

    pub static ref ENDPOINT_ROTATIONS: IntCounter = IntCounter::new(
        "endpoint_rotations_total",
        "Times the pool switched to another endpoint"
    ).expect("valid metric definition");

    pub static ref DEGRADED_CONNECTIONS: IntCounter = IntCounter::new(
        "degraded_connections_total",
        "Stale connections handed out because no endpoint passed a probe"
    ).expect("valid metric definition");

    // Store metrics
    pub static ref TRACKED_ASSETS: IntGauge = IntGauge::new(
        "tracked_assets",
        "Assets currently held in the store"
    ).expect("valid metric definition");

    pub static ref REJECTED_POINTS: IntCounter = IntCounter::new(
        "rejected_points_total",
        "Points rejected at the store boundary"
    ).expect("valid metric definition");

    // Broadcast metrics
    pub static ref ACTIVE_SUBSCRIBERS: IntGauge = IntGauge::new(
        "active_subscribers",
        "Live broadcast subscribers"
    ).expect("valid metric definition");

    pub static ref SUBSCRIBERS_DROPPED: IntCounter = IntCounter::new(
        "subscribers_dropped_total",
        "Subscribers removed after a failed send"
    ).expect("valid metric definition");
}

pub fn register_metrics() -> prometheus::Result<()> {
    REGISTRY.register(Box::new(CYCLES_STARTED.clone()))?;
    REGISTRY.register(Box::new(CYCLES_COMPLETED.clone()))?;
    REGISTRY.register(Box::new(CYCLES_SKIPPED.clone()))?;
    REGISTRY.register(Box::new(CYCLES_ABORTED.clone()))?;
    REGISTRY.register(Box::new(CYCLE_DURATION.clone()))?;
    REGISTRY.register(Box::new(ADAPTER_FAILURES.clone()))?;
    REGISTRY.register(Box::new(PROBE_FAILURES.clone()))?;
    REGISTRY.register(Box::new(ENDPOINT_ROTATIONS.clone()))?;
    REGISTRY.register(Box::new(DEGRADED_CONNECTIONS.clone()))?;
    REGISTRY.register(Box::new(TRACKED_ASSETS.clone()))?;
    REGISTRY.register(Box::new(REJECTED_POINTS.clone()))?;
    REGISTRY.register(Box::new(ACTIVE_SUBSCRIBERS.clone()))?;
    REGISTRY.register(Box::new(SUBSCRIBERS_DROPPED.clone()))?;
    Ok(())
}

/// Prometheus text exposition of everything in `REGISTRY`.
pub fn render_metrics() -> String {
    let mut buffer = Vec::new();
    if let Err(e) = TextEncoder::new().encode(&REGISTRY.gather(), &mut buffer) {
        tracing::warn!("Failed to encode metrics: {}", e);
    }
    String::from_utf8(buffer).unwrap_or_default()
}
