use crate::config::*;
use crate::error::{Error, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pool: PoolConfig,
    pub scheduler: SchedulerConfig,
    pub store: StoreConfig,
    pub hub: HubConfig,
    pub api: ApiConfig,
    pub logging: LoggingConfig,
    pub simulation: SimulationConfig,
}

impl AppConfig {
    pub fn load(env: &str) -> Result<Self> {
        let config = Config::builder()
            .add_source(File::with_name("config/default"))
            .add_source(File::with_name(&format!("config/{}", env)).required(false))
            .add_source(
                Environment::with_prefix("TOKEN_INFRA")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("pool.endpoints")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| Error::ConfigError(e.to_string()))?;

        let app: AppConfig = config.try_deserialize()
            .map_err(|e| Error::ConfigError(e.to_string()))?;
        app.validate()?;
        Ok(app)
    }

    pub fn validate(&self) -> Result<()> {
        if self.pool.endpoints.is_empty() {
            return Err(Error::ConfigError("pool.endpoints must not be empty".to_string()));
        }
        if self.scheduler.metrics_interval_secs == 0 || self.scheduler.audit_interval_secs == 0 {
            return Err(Error::ConfigError("scheduler intervals must be positive".to_string()));
        }
        if self.hub.subscriber_buffer == 0 {
            return Err(Error::ConfigError("hub.subscriber_buffer must be positive".to_string()));
        }
        if self.store.max_points_per_series == 0 || self.store.max_transactions_per_asset == 0 {
            return Err(Error::ConfigError("store bounds must be positive".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_cadence() {
        let config = AppConfig::default();
        assert_eq!(config.scheduler.metrics_interval().as_secs(), 10);
        assert_eq!(config.scheduler.audit_interval().as_secs(), 300);
        assert_eq!(config.pool.failure_threshold, 3);
        assert_eq!(config.pool.circuit_window().as_secs(), 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn rejects_empty_endpoint_list() {
        let mut config = AppConfig::default();
        config.pool.endpoints.clear();
        assert!(matches!(config.validate(), Err(Error::ConfigError(_))));
    }
}
