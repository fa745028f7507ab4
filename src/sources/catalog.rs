use std::time::Duration;
use async_trait::async_trait;
use tracing::{debug, warn};
use crate::error::Result;
use crate::sources::profile::PlatformProfile;
use crate::sources::synthetic::Synthesizer;
use crate::sources::{SourceAdapter, SourceContext};
use crate::store::TimeSeriesStore;
use crate::types::asset::{Asset, AssetUpdate, HolderKind, Platform, SecurityInfo};
use crate::types::series::{Direction, TimeSeriesPoint, Transaction};
use crate::types::timestamp::Timestamp;

const HOUR: Duration = Duration::from_secs(3_600);
const DAY: Duration = Duration::from_secs(86_400);
const SEED_POINTS: u64 = 24;
const MIN_HOLDERS: i64 = 100;

/// One asset a platform lists.
#[derive(Clone, Copy, Debug)]
pub struct Listing {
    pub symbol: &'static str,
    pub name: &'static str,
    pub address: &'static str,
}

/// Adapter over a fixed listing catalog whose figures come from a
/// [`Synthesizer`]. Mint authority is read from the upstream connection.
pub struct CatalogAdapter {
    profile: &'static PlatformProfile,
    listings: &'static [Listing],
    synth: Synthesizer,
}

impl CatalogAdapter {
    pub fn new(profile: &'static PlatformProfile, listings: &'static [Listing], synth: Synthesizer) -> Self {
        CatalogAdapter { profile, listings, synth }
    }

    /// Full record for a listing seen for the first time.
    fn seed_listing(&self, listing: &Listing, now: Timestamp) -> AssetUpdate {
        let p = self.profile;
        let s = &self.synth;
        let (age_min, age_max) = p.launch_age_days;
        let launch_date = now - DAY * s.whole(age_min, age_max) as u32;
        let (holders_min, holders_max) = p.holders;
        let (change_min, change_max) = p.holder_change;
        let holder_change = change_min + s.whole(0, (change_max - change_min) as u64) as i64;

        AssetUpdate {
            name: Some(listing.name.to_string()),
            symbol: Some(listing.symbol.to_string()),
            price: Some(p.floor_price(p.price.sample(s))),
            market_cap: Some(p.market_cap.sample(s)),
            market_cap_change_24h: Some(p.market_cap_change.sample(s)),
            total_supply: Some(p.total_supply.sample(s)),
            circulating_supply: Some(p.circulating_supply.sample(s)),
            holder_count: Some(s.whole(holders_min, holders_max)),
            holder_change_24h: Some(holder_change),
            volume_5m: Some(p.volume_5m.sample(s)),
            volume_change_5m: Some(p.volume_change.sample(s)),
            volume_1h: Some(p.volume_1h.sample(s)),
            volume_change_1h: Some(p.volume_change.sample(s)),
            volume_24h: Some(p.volume_24h.sample(s)),
            total_volume: Some(p.total_volume.sample(s)),
            platform: Some(p.platform),
            platform_url: Some(p.listing_url(listing.address)),
            risk_level: Some(p.default_risk),
            security: Some(self.seed_security()),
            launch_date: Some(launch_date),
            ..AssetUpdate::new(listing.address)
        }
    }

    fn seed_security(&self) -> SecurityInfo {
        let odds = &self.profile.seed_security;
        let s = &self.synth;
        let liquidity_locked = s.chance(odds.locked_odds);
        let (share_min, share_max) = odds.largest_holder;

        SecurityInfo {
            liquidity_locked,
            liquidity_lock_months: liquidity_locked.then(|| s.whole(1, 24) as u32),
            mint_disabled: s.chance(odds.mint_disabled_odds),
            contract_verified: s.chance(odds.verified_odds),
            liquidity_ratio: odds.liquidity_ratio.sample(s),
            largest_holder_share: s.whole(share_min, share_max) as f64,
            largest_holder_kind: HolderKind::Wallet,
        }
    }

    /// Hourly price walk ending at the current price, plus hourly volumes.
    fn seed_history(&self, store: &TimeSeriesStore, address: &str, price: f64, volume_24h: f64, now: Timestamp) -> Result<()> {
        let mut walk = price;
        for j in 0..SEED_POINTS {
            let at = now - HOUR * j as u32;
            store.append_price_point(address, TimeSeriesPoint::new(at, walk))?;
            walk = self.profile.floor_price(walk * (1.0 + self.profile.hourly_move.sample(&self.synth)));

            let volume = self.synth.unit() * volume_24h / SEED_POINTS as f64;
            store.append_volume_point(address, TimeSeriesPoint::new(at, volume))?;
        }
        Ok(())
    }

    /// Fresh figures for a known asset. Deltas against the previous snapshot
    /// are left to the caller.
    fn observe(&self, asset: &Asset) -> AssetUpdate {
        let p = self.profile;
        let s = &self.synth;

        let price = p.floor_price(asset.price * (1.0 + p.tick_move.sample(s)));
        let market_cap = if asset.price > 0.0 {
            asset.market_cap * price / asset.price
        } else {
            asset.market_cap
        };

        let base = market_cap * s.between(0.01, 0.06);
        let drift = s.whole(0, 200) as i64 - 100;
        let holders = (asset.holder_count as i64 + drift).max(MIN_HOLDERS) as u64;

        AssetUpdate {
            price: Some(price),
            market_cap: Some(market_cap),
            volume_5m: Some(base * 0.01),
            volume_1h: Some(base * 0.12),
            volume_24h: Some(base),
            total_volume: Some(base * 10.0),
            holder_count: Some(holders),
            ..AssetUpdate::new(asset.address.clone())
        }
    }

    /// A batch of trades sized from `volume_base`.
    fn simulate_transactions(&self, store: &TimeSeriesStore, address: &str, price: f64, volume_base: f64, now: Timestamp) -> Result<()> {
        let s = &self.synth;
        let count = ((volume_base / 100_000.0).floor() as u64).clamp(1, 10);

        for _ in 0..count {
            let direction = if s.chance(0.6) { Direction::Buy } else { Direction::Sell };
            let value_usd = volume_base * s.between(0.01, 0.11);
            let amount = if price > 0.0 { value_usd / price } else { 0.0 };
            let minutes_ago = s.whole(0, 29);

            store.append_transaction(address, Transaction {
                address: address.to_string(),
                direction,
                amount,
                value_usd,
                wallet: s.wallet(),
                timestamp: now - Duration::from_secs(minutes_ago * 60),
            })?;
        }
        Ok(())
    }

    fn ingest_listing(&self, store: &TimeSeriesStore, listing: &Listing, now: Timestamp) -> Result<AssetUpdate> {
        match store.get_asset(listing.address) {
            None => {
                let update = self.seed_listing(listing, now);
                let asset = store.upsert_asset(update.clone())?;
                self.seed_history(store, &asset.address, asset.price, asset.volume_24h, now)?;
                self.simulate_transactions(store, &asset.address, asset.price, asset.volume_24h, now)?;
                debug!(platform = %self.profile.platform, symbol = listing.symbol, "Seeded new listing");
                Ok(update)
            }
            Some(asset) => {
                let update = self.observe(&asset);
                let price = update.price.unwrap_or(asset.price);
                let volume_5m = update.volume_5m.unwrap_or(asset.volume_5m);
                self.simulate_transactions(store, &asset.address, price, volume_5m, now)?;
                Ok(update)
            }
        }
    }
}

#[async_trait]
impl SourceAdapter for CatalogAdapter {
    fn platform(&self) -> Platform {
        self.profile.platform
    }

    async fn fetch_assets(&self, ctx: &SourceContext<'_>) -> Result<Vec<AssetUpdate>> {
        let mut updates = Vec::with_capacity(self.listings.len());
        for listing in self.listings {
            match self.ingest_listing(ctx.store, listing, ctx.now) {
                Ok(update) => updates.push(update),
                Err(e) => warn!(
                    platform = %self.profile.platform,
                    symbol = listing.symbol,
                    error = %e,
                    "Skipping listing"
                ),
            }
        }
        Ok(updates)
    }

    async fn fetch_security_info(&self, ctx: &SourceContext<'_>, address: &str) -> Result<SecurityInfo> {
        let mint_disabled = !ctx.connection.account_exists(address).await?;

        let s = &self.synth;
        let liquidity_locked = s.chance(0.5);
        let liquidity_lock_months = liquidity_locked.then(|| s.whole(1, 24) as u32);
        let contract_verified = s.chance(0.7);
        let liquidity_ratio = s.between(5.0, 35.0);
        let (largest_holder_kind, largest_holder_share) = if s.chance(0.3) {
            (HolderKind::Burn, s.whole(3, 12) as f64)
        } else {
            (HolderKind::Wallet, s.whole(5, 24) as f64)
        };

        Ok(SecurityInfo {
            liquidity_locked,
            liquidity_lock_months,
            mint_disabled,
            contract_verified,
            liquidity_ratio,
            largest_holder_share,
            largest_holder_kind,
        })
    }
}
