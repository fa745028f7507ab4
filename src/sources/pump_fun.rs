use crate::sources::catalog::{CatalogAdapter, Listing};
use crate::sources::profile::{PlatformProfile, SeedSecurity, Span};
use crate::sources::synthetic::Synthesizer;
use crate::types::asset::{Platform, RiskLevel};

/// Fresh, thinly held launches.
pub static LISTINGS: [Listing; 5] = [
    Listing { symbol: "BOME", name: "BOMBCOIN", address: "bomecpCzuNMygPKMYUCKi3awZJzDHCnXgZFJn6dVbxD" },
    Listing { symbol: "POPCAT", name: "Pop Cat", address: "Po1araZZZzZfTv7fYTjDDcapjrJxD9JpPpMJRjvpufU" },
    Listing { symbol: "SHIB", name: "Shibarium", address: "SHiB6e5kyauZA3CyrrYn7sZT3mix8TdKcaGxKxiBa8Z" },
    Listing { symbol: "SLERF", name: "Slerf", address: "4LUro5uD4W81xQ7hYXBQD5J2WsJaFhaLtKjaMPNn55rR" },
    Listing { symbol: "MOON", name: "Moonflower", address: "Moon9DTXNnPzTryY2LiR2fYCDPxDV5pBg1obdhRJiWZ7" },
];

pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::PumpFun,
    url_prefix: "https://pump.fun/token/",
    launch_age_days: (1, 14),
    price: Span::new(0.0, 0.1),
    market_cap: Span::new(0.0, 500_000_000.0),
    market_cap_change: Span::new(-10.0, 70.0),
    total_supply: Span::new(0.0, 100_000_000_000.0),
    circulating_supply: Span::new(0.0, 70_000_000_000.0),
    holders: (5_000, 55_000),
    holder_change: (-1_000, 4_000),
    volume_5m: Span::new(0.0, 10_000_000.0),
    volume_1h: Span::new(0.0, 100_000_000.0),
    volume_24h: Span::new(0.0, 1_000_000_000.0),
    total_volume: Span::new(0.0, 10_000_000_000.0),
    volume_change: Span::new(-20.0, 80.0),
    hourly_move: Span::new(-0.1, 0.2),
    tick_move: Span::new(-0.01, 0.015),
    price_floor: 0.000_000_1,
    default_risk: RiskLevel::Risky,
    seed_security: SeedSecurity {
        locked_odds: 0.3,
        mint_disabled_odds: 0.4,
        verified_odds: 0.4,
        liquidity_ratio: Span::new(10.0, 50.0),
        largest_holder: (20, 49),
    },
};

pub fn adapter(synth: Synthesizer) -> CatalogAdapter {
    CatalogAdapter::new(&PROFILE, &LISTINGS, synth)
}
