pub mod guard;
pub mod risk;

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use futures::future::join_all;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{interval, timeout, MissedTickBehavior};
use tracing::{debug, info, warn, Instrument};
use crate::config::SchedulerConfig;
use crate::error::{Error, Result};
use crate::hub::{BroadcastHub, BroadcastMessage};
use crate::observability::metrics::{
    ADAPTER_FAILURES, CYCLES_ABORTED, CYCLES_COMPLETED, CYCLES_SKIPPED, CYCLES_STARTED,
    CYCLE_DURATION,
};
use crate::observability::tracing::{adapter_span, cycle_span};
use crate::rpc::{Connection, ConnectionPool};
use crate::scheduler::guard::CycleGuard;
use crate::scheduler::risk::classify_risk;
use crate::sources::{AdapterRegistry, SourceContext};
use crate::store::TimeSeriesStore;
use crate::types::asset::{Asset, AssetUpdate};
use crate::types::series::TimeSeriesPoint;
use crate::types::timestamp::Timestamp;
use crate::utils::task_supervisor::TaskSupervisor;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CycleKind {
    MetricsRefresh,
    SecurityAudit,
}

impl CycleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CycleKind::MetricsRefresh => "metrics_refresh",
            CycleKind::SecurityAudit => "security_audit",
        }
    }
}

impl fmt::Display for CycleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// `assets` records written, `failures` adapter calls that failed or timed out.
    Completed { assets: usize, failures: usize },
    /// The previous run of the same cycle type was still in flight.
    Skipped,
    /// No upstream connection could be obtained.
    Aborted(String),
}

struct Core {
    pool: Arc<ConnectionPool>,
    store: Arc<TimeSeriesStore>,
    hub: Arc<BroadcastHub>,
    adapters: AdapterRegistry,
    metrics_guard: CycleGuard,
    audit_guard: CycleGuard,
    fetch_timeout: Duration,
}

/// Drives the metrics-refresh and security-audit cycles.
///
/// Each cycle type has its own guard: a tick that finds the previous run still
/// in flight is skipped. `shutdown` stops both loops from starting new runs and
/// waits for in-flight runs to finish.
pub struct IngestionScheduler {
    core: Arc<Core>,
    metrics_interval: Duration,
    audit_interval: Duration,
    shutdown_tx: watch::Sender<bool>,
    tasks: parking_lot::Mutex<TaskSupervisor>,
}

impl IngestionScheduler {
    pub fn new(
        pool: Arc<ConnectionPool>,
        store: Arc<TimeSeriesStore>,
        hub: Arc<BroadcastHub>,
        adapters: AdapterRegistry,
        config: &SchedulerConfig,
    ) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        IngestionScheduler {
            core: Arc::new(Core {
                pool,
                store,
                hub,
                adapters,
                metrics_guard: CycleGuard::new(),
                audit_guard: CycleGuard::new(),
                fetch_timeout: config.fetch_timeout(),
            }),
            metrics_interval: config.metrics_interval(),
            audit_interval: config.audit_interval(),
            shutdown_tx,
            tasks: parking_lot::Mutex::new(TaskSupervisor::new()),
        }
    }

    /// Spawns both cycle loops. The first tick of each fires immediately.
    pub fn start(&self) {
        if *self.shutdown_tx.borrow() {
            warn!("Scheduler already shut down, not starting");
            return;
        }

        let mut tasks = self.tasks.lock();
        if tasks.active_task_count() > 0 {
            warn!("Scheduler already running");
            return;
        }

        for (kind, period) in [
            (CycleKind::MetricsRefresh, self.metrics_interval),
            (CycleKind::SecurityAudit, self.audit_interval),
        ] {
            let core = self.core.clone();
            let shutdown = self.shutdown_tx.subscribe();
            tasks.spawn(kind.as_str(), run_loop(core, kind, period, shutdown));
        }

        info!(
            metrics_interval = ?self.metrics_interval,
            audit_interval = ?self.audit_interval,
            adapters = self.core.adapters.len(),
            "Ingestion scheduler started"
        );
    }

    pub async fn run_metrics_cycle(&self) -> CycleOutcome {
        self.core.run(CycleKind::MetricsRefresh).await
    }

    pub async fn run_security_audit(&self) -> CycleOutcome {
        self.core.run(CycleKind::SecurityAudit).await
    }

    pub fn is_running(&self, kind: CycleKind) -> bool {
        self.core.guard(kind).is_running()
    }

    /// Errors if a cycle loop has died.
    pub fn check_health(&self) -> Result<()> {
        self.tasks.lock().check_health()
    }

    /// No tick starts after this is called; in-flight runs drain before it returns.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_tx.send_replace(true);
        let mut tasks = std::mem::take(&mut *self.tasks.lock());
        info!("Stopping scheduler, draining {} loops", tasks.active_task_count());
        tasks.join_all().await
    }
}

async fn run_loop(core: Arc<Core>, kind: CycleKind, period: Duration, mut shutdown: watch::Receiver<bool>) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<JoinHandle<CycleOutcome>> = None;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.changed() => break,
            _ = ticker.tick() => {
                if *shutdown.borrow() {
                    break;
                }
                if in_flight.as_ref().is_some_and(|run| !run.is_finished()) {
                    CYCLES_SKIPPED.with_label_values(&[kind.as_str()]).inc();
                    debug!(cycle = %kind, "Previous run still in flight, skipping tick");
                    continue;
                }
                let core = core.clone();
                in_flight = Some(tokio::spawn(async move { core.run(kind).await }));
            }
        }
    }

    if let Some(run) = in_flight {
        if let Err(e) = run.await {
            warn!(cycle = %kind, "In-flight run failed during shutdown: {}", e);
        }
    }
    info!(cycle = %kind, "Cycle loop stopped");
}

impl Core {
    fn guard(&self, kind: CycleKind) -> &CycleGuard {
        match kind {
            CycleKind::MetricsRefresh => &self.metrics_guard,
            CycleKind::SecurityAudit => &self.audit_guard,
        }
    }

    async fn run(&self, kind: CycleKind) -> CycleOutcome {
        let name = kind.as_str();
        let Some(_permit) = self.guard(kind).try_acquire() else {
            CYCLES_SKIPPED.with_label_values(&[name]).inc();
            debug!(cycle = name, "Cycle already running, skipped");
            return CycleOutcome::Skipped;
        };

        CYCLES_STARTED.with_label_values(&[name]).inc();
        let timer = CYCLE_DURATION.with_label_values(&[name]).start_timer();

        let outcome = async {
            // Scoped to this run.
            let connection = match self.pool.get_connection(false).await {
                Ok(connection) => connection,
                Err(e) => {
                    warn!(error = %e, "Aborting cycle run");
                    return CycleOutcome::Aborted(e.to_string());
                }
            };

            match kind {
                CycleKind::MetricsRefresh => self.refresh_metrics(&connection).await,
                CycleKind::SecurityAudit => self.audit_security(&connection).await,
            }
        }
        .instrument(cycle_span(name))
        .await;

        timer.observe_duration();
        match &outcome {
            CycleOutcome::Completed { .. } => CYCLES_COMPLETED.with_label_values(&[name]).inc(),
            CycleOutcome::Aborted(_) => CYCLES_ABORTED.with_label_values(&[name]).inc(),
            CycleOutcome::Skipped => {}
        }
        outcome
    }

    async fn refresh_metrics(&self, connection: &Connection) -> CycleOutcome {
        let baseline: HashMap<String, Asset> = self.store.all_assets()
            .into_iter()
            .map(|asset| (asset.address.clone(), asset))
            .collect();

        let now = Timestamp::now();
        let ctx = SourceContext {
            connection,
            store: &self.store,
            now,
        };

        let fetches = self.adapters.adapters().iter().map(|adapter| {
            let platform = adapter.platform();
            let ctx = &ctx;
            async move {
                let result = match timeout(self.fetch_timeout, adapter.fetch_assets(ctx)).await {
                    Ok(result) => result,
                    Err(_) => Err(Error::Timeout(self.fetch_timeout)),
                };
                (platform, result)
            }
            .instrument(adapter_span(platform))
        });
        let results = join_all(fetches).await;

        let mut updates = Vec::new();
        let mut failures = 0;
        let mut upstream_failed = false;
        for (platform, result) in results {
            match result {
                Ok(batch) => updates.extend(batch),
                Err(e) => {
                    failures += 1;
                    upstream_failed |= e.is_upstream();
                    ADAPTER_FAILURES.with_label_values(&[platform.to_string().as_str()]).inc();
                    let err = Error::AdapterFetchFailed { platform, reason: e.to_string() };
                    warn!("{}", err);
                }
            }
        }

        let mut written = 0;
        let mut refreshed = HashSet::new();
        for update in updates {
            let address = update.address.clone();
            let prior = baseline.get(&address);
            let known = prior.is_some();
            let update = apply_deltas(update, prior);

            match self.store.upsert_asset(update) {
                Ok(asset) => {
                    written += 1;
                    refreshed.insert(address);
                    // New listings already carry seeded history up to `now`.
                    if known {
                        self.append_derived_points(&asset, now);
                    }
                }
                Err(e) => warn!(error = %e, "Dropping update"),
            }
        }

        // Known assets whose adapter failed keep their figures; their series
        // still advance this tick.
        let mut carried = 0;
        for (address, prior) in &baseline {
            if refreshed.contains(address) {
                continue;
            }
            match self.store.upsert_asset(apply_deltas(carry_forward(prior), Some(prior))) {
                Ok(asset) => {
                    carried += 1;
                    self.append_derived_points(&asset, now);
                }
                Err(e) => warn!(error = %e, "Dropping carried-forward update"),
            }
        }

        let message = BroadcastMessage::token_update(self.store.snapshot());
        match self.hub.publish(&message) {
            Ok(report) => debug!(delivered = report.delivered, dropped = report.dropped, "Published snapshot"),
            Err(e) => warn!(error = %e, "Snapshot publish failed"),
        }

        if upstream_failed {
            // Rotate ahead of the next tick.
            if let Err(e) = self.pool.get_connection(true).await {
                warn!(error = %e, "Endpoint rotation failed");
            }
        }

        info!(assets = written, carried, failures, "Metrics refresh complete");
        CycleOutcome::Completed { assets: written, failures }
    }

    fn append_derived_points(&self, asset: &Asset, now: Timestamp) {
        let price = TimeSeriesPoint::new(now, asset.price);
        let volume = TimeSeriesPoint::new(now, asset.volume_5m);
        if let Err(e) = self.store.append_price_point(&asset.address, price) {
            debug!(error = %e, "Price point rejected");
        }
        if let Err(e) = self.store.append_volume_point(&asset.address, volume) {
            debug!(error = %e, "Volume point rejected");
        }
    }

    async fn audit_security(&self, connection: &Connection) -> CycleOutcome {
        let ctx = SourceContext {
            connection,
            store: &self.store,
            now: Timestamp::now(),
        };

        let mut audited = 0;
        let mut failures = 0;
        for asset in self.store.all_assets() {
            let Some(adapter) = self.adapters.for_platform(asset.platform) else {
                debug!(address = %asset.address, platform = %asset.platform, "No adapter for platform");
                continue;
            };

            let result = match timeout(self.fetch_timeout, adapter.fetch_security_info(&ctx, &asset.address)).await {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(self.fetch_timeout)),
            };

            let security = match result {
                Ok(security) => security,
                Err(e) => {
                    failures += 1;
                    ADAPTER_FAILURES.with_label_values(&[asset.platform.to_string().as_str()]).inc();
                    warn!(address = %asset.address, error = %e, "Security check failed");
                    continue;
                }
            };

            let risk_level = classify_risk(&security);
            let update = AssetUpdate {
                security: Some(security),
                risk_level: Some(risk_level),
                ..AssetUpdate::new(asset.address.clone())
            };
            match self.store.upsert_asset(update) {
                Ok(_) => audited += 1,
                Err(e) => warn!(error = %e, "Dropping security update"),
            }
        }

        info!(assets = audited, failures, "Security audit complete");
        CycleOutcome::Completed { assets: audited, failures }
    }
}

/// Fills change fields from the previous snapshot of the same asset. Without
/// a prior record the update's own figures stand.
fn apply_deltas(mut update: AssetUpdate, prior: Option<&Asset>) -> AssetUpdate {
    let Some(prior) = prior else {
        return update;
    };

    if let Some(market_cap) = update.market_cap {
        update.market_cap_change_24h = Some(pct_change(prior.market_cap, market_cap));
    }
    if let Some(volume) = update.volume_5m {
        update.volume_change_5m = Some(pct_change(prior.volume_5m, volume));
    }
    if let Some(volume) = update.volume_1h {
        update.volume_change_1h = Some(pct_change(prior.volume_1h, volume));
    }
    if let Some(holders) = update.holder_count {
        update.holder_change_24h = Some(if prior.holder_count > 0 {
            holders as i64 - prior.holder_count as i64
        } else {
            0
        });
    }
    update
}

/// The stored figures restated as an update, so deltas against them are zero.
fn carry_forward(asset: &Asset) -> AssetUpdate {
    AssetUpdate {
        market_cap: Some(asset.market_cap),
        volume_5m: Some(asset.volume_5m),
        volume_1h: Some(asset.volume_1h),
        holder_count: Some(asset.holder_count),
        ..AssetUpdate::new(asset.address.clone())
    }
}

fn pct_change(previous: f64, current: f64) -> f64 {
    if previous > 0.0 {
        (current - previous) / previous * 100.0
    } else {
        0.0
    }
}
