use std::time::Duration;
use crate::config::StoreConfig;
use crate::types::timestamp::Timestamp;

/// Bounds applied to every series and transaction log on each append.
/// The oldest entries are trimmed first.
#[derive(Clone, Debug)]
pub struct RetentionPolicy {
    pub max_points: usize,
    pub max_transactions: usize,
    pub max_age: Duration,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        RetentionPolicy::from(&StoreConfig::default())
    }
}

impl From<&StoreConfig> for RetentionPolicy {
    fn from(config: &StoreConfig) -> Self {
        RetentionPolicy {
            max_points: config.max_points_per_series.max(1),
            max_transactions: config.max_transactions_per_asset.max(1),
            max_age: Duration::from_secs(config.max_point_age_secs),
        }
    }
}

impl RetentionPolicy {
    pub fn is_expired(&self, timestamp: Timestamp, now: Timestamp) -> bool {
        now - timestamp > self.max_age
    }
}
