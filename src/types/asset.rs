use serde::{Deserialize, Serialize};
use std::fmt;
use crate::types::timestamp::Timestamp;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    #[serde(rename = "Raydium")]
    Raydium,
    #[serde(rename = "pump.fun")]
    PumpFun,
    #[serde(rename = "Orca")]
    Orca,
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Platform::Raydium => "Raydium",
            Platform::PumpFun => "pump.fun",
            Platform::Orca => "Orca",
        };
        f.write_str(name)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Safe,
    Caution,
    Risky,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HolderKind {
    Burn,
    Wallet,
}

/// Security sub-record of an asset. Ratios and shares are percentages.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SecurityInfo {
    pub liquidity_locked: bool,
    pub liquidity_lock_months: Option<u32>,
    pub mint_disabled: bool,
    pub contract_verified: bool,
    pub liquidity_ratio: f64,
    pub largest_holder_share: f64,
    pub largest_holder_kind: HolderKind,
}

impl Default for SecurityInfo {
    fn default() -> Self {
        SecurityInfo {
            liquidity_locked: false,
            liquidity_lock_months: None,
            mint_disabled: false,
            contract_verified: false,
            liquidity_ratio: 0.0,
            largest_holder_share: 0.0,
            largest_holder_kind: HolderKind::Wallet,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
    pub address: String,
    pub name: String,
    pub symbol: String,
    pub price: f64,
    pub market_cap: f64,
    pub market_cap_change_24h: f64,
    pub total_supply: f64,
    pub circulating_supply: f64,
    pub holder_count: u64,
    pub holder_change_24h: i64,
    pub volume_5m: f64,
    pub volume_change_5m: f64,
    pub volume_1h: f64,
    pub volume_change_1h: f64,
    pub volume_24h: f64,
    pub total_volume: f64,
    pub platform: Platform,
    pub platform_url: Option<String>,
    pub risk_level: RiskLevel,
    pub security: SecurityInfo,
    pub launch_date: Timestamp,
    pub updated_at: Timestamp,
}

/// A partial asset record. `None` fields keep their stored value on merge.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetUpdate {
    pub address: String,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_change_24h: Option<f64>,
    pub total_supply: Option<f64>,
    pub circulating_supply: Option<f64>,
    pub holder_count: Option<u64>,
    pub holder_change_24h: Option<i64>,
    pub volume_5m: Option<f64>,
    pub volume_change_5m: Option<f64>,
    pub volume_1h: Option<f64>,
    pub volume_change_1h: Option<f64>,
    pub volume_24h: Option<f64>,
    pub total_volume: Option<f64>,
    pub platform: Option<Platform>,
    pub platform_url: Option<String>,
    pub risk_level: Option<RiskLevel>,
    pub security: Option<SecurityInfo>,
    pub launch_date: Option<Timestamp>,
}

impl AssetUpdate {
    pub fn new(address: impl Into<String>) -> Self {
        AssetUpdate {
            address: address.into(),
            ..Default::default()
        }
    }

    /// Checks every present numeric field. Change fields may be negative,
    /// everything else must be finite and non-negative.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.address.trim().is_empty() {
            return Err("empty address".to_string());
        }

        let magnitudes = [
            ("price", self.price),
            ("marketCap", self.market_cap),
            ("totalSupply", self.total_supply),
            ("circulatingSupply", self.circulating_supply),
            ("volume5m", self.volume_5m),
            ("volume1h", self.volume_1h),
            ("volume24h", self.volume_24h),
            ("totalVolume", self.total_volume),
        ];
        for (field, value) in magnitudes {
            if let Some(v) = value {
                if !v.is_finite() || v < 0.0 {
                    return Err(format!("{} must be finite and non-negative, got {}", field, v));
                }
            }
        }

        let changes = [
            ("marketCapChange24h", self.market_cap_change_24h),
            ("volumeChange5m", self.volume_change_5m),
            ("volumeChange1h", self.volume_change_1h),
        ];
        for (field, value) in changes {
            if let Some(v) = value {
                if !v.is_finite() {
                    return Err(format!("{} must be finite, got {}", field, v));
                }
            }
        }

        if let Some(security) = &self.security {
            if !security.liquidity_ratio.is_finite() || security.liquidity_ratio < 0.0 {
                return Err("liquidityRatio must be finite and non-negative".to_string());
            }
            if !security.largest_holder_share.is_finite() || security.largest_holder_share < 0.0 {
                return Err("largestHolderShare must be finite and non-negative".to_string());
            }
        }

        Ok(())
    }
}

impl Asset {
    /// Builds a new record from an update. Name, symbol and platform are required.
    pub fn create(update: AssetUpdate, now: Timestamp) -> std::result::Result<Asset, String> {
        let name = update.name.ok_or("missing name")?;
        let symbol = update.symbol.ok_or("missing symbol")?;
        let platform = update.platform.ok_or("missing platform")?;

        Ok(Asset {
            address: update.address,
            name,
            symbol,
            price: update.price.unwrap_or(0.0),
            market_cap: update.market_cap.unwrap_or(0.0),
            market_cap_change_24h: update.market_cap_change_24h.unwrap_or(0.0),
            total_supply: update.total_supply.unwrap_or(0.0),
            circulating_supply: update.circulating_supply.unwrap_or(0.0),
            holder_count: update.holder_count.unwrap_or(0),
            holder_change_24h: update.holder_change_24h.unwrap_or(0),
            volume_5m: update.volume_5m.unwrap_or(0.0),
            volume_change_5m: update.volume_change_5m.unwrap_or(0.0),
            volume_1h: update.volume_1h.unwrap_or(0.0),
            volume_change_1h: update.volume_change_1h.unwrap_or(0.0),
            volume_24h: update.volume_24h.unwrap_or(0.0),
            total_volume: update.total_volume.unwrap_or(0.0),
            platform,
            platform_url: update.platform_url,
            risk_level: update.risk_level.unwrap_or(RiskLevel::Caution),
            security: update.security.unwrap_or_default(),
            launch_date: update.launch_date.unwrap_or(now),
            updated_at: now,
        })
    }

    /// Merges present fields of `update`. The address never changes.
    pub fn merge(&mut self, update: AssetUpdate, now: Timestamp) {
        macro_rules! take {
            ($($field:ident),* $(,)?) => {
                $(if let Some(v) = update.$field { self.$field = v; })*
            };
        }

        take!(
            name,
            symbol,
            price,
            market_cap,
            market_cap_change_24h,
            total_supply,
            circulating_supply,
            holder_count,
            holder_change_24h,
            volume_5m,
            volume_change_5m,
            volume_1h,
            volume_change_1h,
            volume_24h,
            total_volume,
            platform,
            risk_level,
            security,
            launch_date,
        );
        if update.platform_url.is_some() {
            self.platform_url = update.platform_url;
        }
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(address: &str) -> AssetUpdate {
        AssetUpdate {
            name: Some("Bonk".to_string()),
            symbol: Some("BONK".to_string()),
            platform: Some(Platform::Raydium),
            price: Some(0.00002),
            ..AssetUpdate::new(address)
        }
    }

    #[test]
    fn create_requires_identity_fields() {
        let err = Asset::create(AssetUpdate::new("addr"), Timestamp::now()).unwrap_err();
        assert_eq!(err, "missing name");

        let asset = Asset::create(listing("addr"), Timestamp::from_millis(10)).unwrap();
        assert_eq!(asset.symbol, "BONK");
        assert_eq!(asset.risk_level, RiskLevel::Caution);
        assert_eq!(asset.launch_date, Timestamp::from_millis(10));
    }

    #[test]
    fn merge_keeps_absent_fields() {
        let mut asset = Asset::create(listing("addr"), Timestamp::from_millis(10)).unwrap();
        let update = AssetUpdate {
            volume_24h: Some(1_000.0),
            ..AssetUpdate::new("addr")
        };
        asset.merge(update, Timestamp::from_millis(20));

        assert_eq!(asset.price, 0.00002);
        assert_eq!(asset.volume_24h, 1_000.0);
        assert_eq!(asset.updated_at, Timestamp::from_millis(20));
    }

    #[test]
    fn validate_rejects_negative_magnitudes_but_not_changes() {
        let mut update = listing("addr");
        update.volume_change_5m = Some(-12.5);
        assert!(update.validate().is_ok());

        update.market_cap = Some(-1.0);
        assert!(update.validate().is_err());

        update.market_cap = Some(f64::NAN);
        assert!(update.validate().is_err());
    }

    #[test]
    fn serializes_with_wire_names() {
        let asset = Asset::create(listing("addr"), Timestamp::from_millis(0)).unwrap();
        let json = serde_json::to_value(&asset).unwrap();
        assert_eq!(json["platform"], "Raydium");
        assert_eq!(json["riskLevel"], "caution");
        assert!(json.get("volume5m").is_some());
        assert!(json.get("marketCapChange24h").is_some());
        assert_eq!(json["security"]["largestHolderKind"], "wallet");
    }
}
