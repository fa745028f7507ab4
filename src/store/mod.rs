pub mod retention;
pub mod series;
pub mod stats;

use std::time::Duration;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::Serialize;
use crate::error::{Error, Result};
use crate::observability::metrics::{REJECTED_POINTS, TRACKED_ASSETS};
use crate::store::retention::RetentionPolicy;
use crate::store::series::AssetHistory;
use crate::store::stats::{format_magnitude, StoreStats};
use crate::types::asset::{Asset, AssetUpdate};
use crate::types::series::{TimeSeriesPoint, Transaction};
use crate::types::timestamp::Timestamp;

const NEW_TOKEN_WINDOW: Duration = Duration::from_secs(86_400);

/// All current assets plus aggregate stats, taken from one read pass.
#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub assets: Vec<Asset>,
    pub stats: StoreStats,
}

/// In-memory store for asset snapshots and their bounded histories.
///
/// Both maps are sharded (`DashMap`): writers to the same address serialize on
/// the shard lock, writers to different shards proceed in parallel, and a
/// reader only ever clones a fully merged record.
pub struct TimeSeriesStore {
    assets: DashMap<String, Asset>,
    history: DashMap<String, AssetHistory>,
    retention: RetentionPolicy,
}

impl TimeSeriesStore {
    pub fn new(retention: RetentionPolicy) -> Self {
        TimeSeriesStore {
            assets: DashMap::new(),
            history: DashMap::new(),
            retention,
        }
    }

    /// Creates the asset if its address is unseen, merges otherwise.
    pub fn upsert_asset(&self, update: AssetUpdate) -> Result<Asset> {
        update.validate().map_err(|reason| Error::InvalidAsset {
            address: update.address.clone(),
            reason,
        })?;

        let now = Timestamp::now();
        let (asset, created) = match self.assets.entry(update.address.clone()) {
            Entry::Occupied(mut entry) => {
                entry.get_mut().merge(update, now);
                (entry.get().clone(), false)
            }
            Entry::Vacant(entry) => {
                let address = update.address.clone();
                let asset = Asset::create(update, now)
                    .map_err(|reason| Error::InvalidAsset { address, reason })?;
                entry.insert(asset.clone());
                (asset, true)
            }
        };

        // The entry guard is gone here; len() takes every shard lock.
        if created {
            TRACKED_ASSETS.set(self.assets.len() as i64);
            tracing::debug!(address = %asset.address, symbol = %asset.symbol, "Asset created");
        }

        Ok(asset)
    }

    pub fn get_asset(&self, address: &str) -> Option<Asset> {
        self.assets.get(address).map(|entry| entry.value().clone())
    }

    /// Like `get_asset`, with `AssetNotFound` as the absent signal.
    pub fn require_asset(&self, address: &str) -> Result<Asset> {
        self.get_asset(address)
            .ok_or_else(|| Error::AssetNotFound(address.to_string()))
    }

    pub fn contains(&self, address: &str) -> bool {
        self.assets.contains_key(address)
    }

    pub fn asset_count(&self) -> usize {
        self.assets.len()
    }

    /// Every asset, largest market cap first.
    pub fn all_assets(&self) -> Vec<Asset> {
        let mut assets: Vec<Asset> = self.assets.iter()
            .map(|entry| entry.value().clone())
            .collect();
        assets.sort_by(|a, b| {
            b.market_cap.total_cmp(&a.market_cap)
                .then_with(|| a.address.cmp(&b.address))
        });
        assets
    }

    pub fn append_price_point(&self, address: &str, point: TimeSeriesPoint) -> Result<()> {
        self.check_point(address, "price", &point)?;
        let now = Timestamp::now();
        self.history.entry(address.to_string())
            .or_default()
            .price
            .insert(point, &self.retention, now);
        Ok(())
    }

    pub fn append_volume_point(&self, address: &str, point: TimeSeriesPoint) -> Result<()> {
        self.check_point(address, "volume", &point)?;
        let now = Timestamp::now();
        self.history.entry(address.to_string())
            .or_default()
            .volume
            .insert(point, &self.retention, now);
        Ok(())
    }

    pub fn append_transaction(&self, address: &str, tx: Transaction) -> Result<()> {
        let reason = if tx.address != address {
            Some(format!("transaction belongs to {}", tx.address))
        } else if !tx.amount.is_finite() || tx.amount < 0.0 {
            Some(format!("amount must be finite and non-negative, got {}", tx.amount))
        } else if !tx.value_usd.is_finite() || tx.value_usd < 0.0 {
            Some(format!("valueUsd must be finite and non-negative, got {}", tx.value_usd))
        } else {
            None
        };

        if let Some(reason) = reason {
            return Err(self.reject(address, reason));
        }

        let now = Timestamp::now();
        self.history.entry(address.to_string())
            .or_default()
            .transactions
            .insert(tx, &self.retention, now);
        Ok(())
    }

    /// Most recent `limit` price points in ascending time order.
    pub fn query_price_history(&self, address: &str, limit: usize) -> Vec<TimeSeriesPoint> {
        self.history.get(address)
            .map(|h| h.price.latest(limit))
            .unwrap_or_default()
    }

    /// Most recent `limit` volume points in ascending time order.
    pub fn query_volume_history(&self, address: &str, limit: usize) -> Vec<TimeSeriesPoint> {
        self.history.get(address)
            .map(|h| h.volume.latest(limit))
            .unwrap_or_default()
    }

    /// Most-recent-first, capped at `limit`.
    pub fn query_transactions(&self, address: &str, limit: usize) -> Vec<Transaction> {
        self.history.get(address)
            .map(|h| h.transactions.most_recent(limit))
            .unwrap_or_default()
    }

    pub fn stats(&self) -> StoreStats {
        compute_stats(&self.all_assets(), Timestamp::now())
    }

    pub fn stats_at(&self, now: Timestamp) -> StoreStats {
        compute_stats(&self.all_assets(), now)
    }

    pub fn snapshot(&self) -> Snapshot {
        let assets = self.all_assets();
        let stats = compute_stats(&assets, Timestamp::now());
        Snapshot { assets, stats }
    }

    fn check_point(&self, address: &str, series: &str, point: &TimeSeriesPoint) -> Result<()> {
        if !point.value.is_finite() {
            return Err(self.reject(address, format!("{} value is not finite: {}", series, point.value)));
        }
        if point.value < 0.0 {
            return Err(self.reject(address, format!("{} value is negative: {}", series, point.value)));
        }
        Ok(())
    }

    fn reject(&self, address: &str, reason: String) -> Error {
        REJECTED_POINTS.inc();
        tracing::warn!(address = %address, "Rejected point: {}", reason);
        Error::InvalidPoint {
            address: address.to_string(),
            reason,
        }
    }
}

impl Default for TimeSeriesStore {
    fn default() -> Self {
        Self::new(RetentionPolicy::default())
    }
}

fn compute_stats(assets: &[Asset], now: Timestamp) -> StoreStats {
    let cutoff = now - NEW_TOKEN_WINDOW;
    let new_tokens_24h = assets.iter()
        .filter(|a| a.launch_date >= cutoff)
        .count();
    let volume = assets.iter().fold(0.0, |acc, a| acc + a.volume_24h);

    StoreStats {
        total_tokens: assets.len(),
        new_tokens_24h,
        volume_24h: format_magnitude(volume),
    }
}
