use std::sync::Arc;
use anyhow::Context;
use tracing::{error, info};
use token_infra::api::{create_router, ApiState};
use token_infra::config::loader::AppConfig;
use token_infra::hub::BroadcastHub;
use token_infra::observability::metrics::register_metrics;
use token_infra::observability::tracing::init_tracing;
use token_infra::rpc::ConnectionPool;
use token_infra::scheduler::IngestionScheduler;
use token_infra::sources::AdapterRegistry;
use token_infra::sources::synthetic::{RandomSampler, Sampler, Synthesizer};
use token_infra::store::retention::RetentionPolicy;
use token_infra::store::TimeSeriesStore;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env = std::env::var("TOKEN_INFRA_ENV").unwrap_or_else(|_| "development".to_string());
    let config = AppConfig::load(&env).context("loading configuration")?;

    init_tracing(&config.logging);
    register_metrics().context("registering metrics")?;
    info!(env = %env, "Starting token-infra");

    let pool = Arc::new(ConnectionPool::from_config(&config.pool)?);
    let store = Arc::new(TimeSeriesStore::new(RetentionPolicy::from(&config.store)));
    let hub = Arc::new(BroadcastHub::new(&config.hub));

    let sampler: Arc<dyn Sampler> = match config.simulation.seed {
        Some(seed) => Arc::new(RandomSampler::seeded(seed)),
        None => Arc::new(RandomSampler::new()),
    };
    let adapters = AdapterRegistry::with_platforms(Synthesizer::new(sampler));

    let scheduler = Arc::new(IngestionScheduler::new(
        pool.clone(),
        store.clone(),
        hub.clone(),
        adapters,
        &config.scheduler,
    ));
    scheduler.start();

    let router = create_router(Arc::new(ApiState {
        store,
        hub,
        pool,
        scheduler: scheduler.clone(),
    }));
    let listener = tokio::net::TcpListener::bind(&config.api.bind_addr)
        .await
        .with_context(|| format!("binding {}", config.api.bind_addr))?;
    info!("API listening on {}", config.api.bind_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("serving API")?;

    info!("API stopped, draining scheduler");
    if let Err(e) = scheduler.shutdown().await {
        error!("Scheduler shutdown: {}", e);
    }
    info!("Shutdown complete");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for ctrl-c: {}", e);
    }
}
