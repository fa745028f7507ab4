use tracing::Span;
use tracing_subscriber::EnvFilter;
use crate::config::LoggingConfig;
use crate::types::asset::Platform;

/// Installs the global subscriber. `RUST_LOG` wins over the configured filter.
pub fn init_tracing(config: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.filter));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let result = if config.json {
        builder.json().try_init()
    } else {
        builder.compact().try_init()
    };

    if let Err(e) = result {
        tracing::warn!("Tracing subscriber already installed: {}", e);
    }
}

pub fn cycle_span(cycle: &'static str) -> Span {
    tracing::info_span!(
        "cycle",
        cycle = cycle,
    )
}

pub fn adapter_span(platform: Platform) -> Span {
    tracing::info_span!(
        "adapter",
        platform = %platform,
    )
}
