use std::time::Duration;
use serde::{Deserialize, Serialize};

pub mod loader;

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct PoolConfig {
    pub endpoints: Vec<String>,
    pub probe_timeout_ms: u64,
    pub request_timeout_ms: u64,
    /// An endpoint is circuit-broken once its consecutive failures exceed this.
    pub failure_threshold: u32,
    pub circuit_window_secs: u64,
}

impl PoolConfig {
    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn circuit_window(&self) -> Duration {
        Duration::from_secs(self.circuit_window_secs)
    }
}

impl Default for PoolConfig {
    fn default() -> Self {
        PoolConfig {
            endpoints: vec!["https://api.mainnet-beta.solana.com".to_string()],
            probe_timeout_ms: 3_000,
            request_timeout_ms: 10_000,
            failure_threshold: 3,
            circuit_window_secs: 300,  // 5 minutes
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct SchedulerConfig {
    pub metrics_interval_secs: u64,
    pub audit_interval_secs: u64,
    pub fetch_timeout_secs: u64,
}

impl SchedulerConfig {
    pub fn metrics_interval(&self) -> Duration {
        Duration::from_secs(self.metrics_interval_secs)
    }

    pub fn audit_interval(&self) -> Duration {
        Duration::from_secs(self.audit_interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        SchedulerConfig {
            metrics_interval_secs: 10,
            audit_interval_secs: 300,
            fetch_timeout_secs: 8,
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    pub max_points_per_series: usize,
    pub max_transactions_per_asset: usize,
    pub max_point_age_secs: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        StoreConfig {
            max_points_per_series: 2_880,
            max_transactions_per_asset: 500,
            max_point_age_secs: 86_400 * 7,  // 7 days
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct HubConfig {
    pub subscriber_buffer: usize,
}

impl Default for HubConfig {
    fn default() -> Self {
        HubConfig { subscriber_buffer: 64 }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    pub bind_addr: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig { bind_addr: "0.0.0.0:5000".to_string() }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        LoggingConfig {
            filter: "info".to_string(),
            json: false,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Fixes the synthetic sampler for reproducible runs.
    pub seed: Option<u64>,
}
