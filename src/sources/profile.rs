use crate::sources::synthetic::Synthesizer;
use crate::types::asset::{Platform, RiskLevel};

/// Half-open value range `[min, max)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Span {
    pub min: f64,
    pub max: f64,
}

impl Span {
    pub const fn new(min: f64, max: f64) -> Self {
        Span { min, max }
    }

    pub fn sample(&self, synth: &Synthesizer) -> f64 {
        synth.between(self.min, self.max)
    }
}

/// Odds and ranges for the security record a listing starts with.
#[derive(Clone, Copy, Debug)]
pub struct SeedSecurity {
    pub locked_odds: f64,
    pub mint_disabled_odds: f64,
    pub verified_odds: f64,
    /// Percent.
    pub liquidity_ratio: Span,
    /// Percent, whole numbers.
    pub largest_holder: (u64, u64),
}

/// How a platform's listings look: value ranges on first sight, how fast
/// prices move and which risk class they start in.
#[derive(Clone, Copy, Debug)]
pub struct PlatformProfile {
    pub platform: Platform,
    /// Listing address is appended.
    pub url_prefix: &'static str,
    /// Inclusive, in whole days.
    pub launch_age_days: (u64, u64),
    pub price: Span,
    pub market_cap: Span,
    pub market_cap_change: Span,
    pub total_supply: Span,
    pub circulating_supply: Span,
    pub holders: (u64, u64),
    pub holder_change: (i64, i64),
    pub volume_5m: Span,
    pub volume_1h: Span,
    pub volume_24h: Span,
    pub total_volume: Span,
    pub volume_change: Span,
    /// Relative move between two seeded hourly points.
    pub hourly_move: Span,
    /// Relative move per metrics tick.
    pub tick_move: Span,
    pub price_floor: f64,
    pub default_risk: RiskLevel,
    pub seed_security: SeedSecurity,
}

impl PlatformProfile {
    pub fn listing_url(&self, address: &str) -> String {
        format!("{}{}", self.url_prefix, address)
    }

    pub fn floor_price(&self, price: f64) -> f64 {
        price.max(self.price_floor)
    }
}
