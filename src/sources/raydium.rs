use crate::sources::catalog::{CatalogAdapter, Listing};
use crate::sources::profile::{PlatformProfile, SeedSecurity, Span};
use crate::sources::synthetic::Synthesizer;
use crate::types::asset::{Platform, RiskLevel};

/// Established high-cap listings.
pub static LISTINGS: [Listing; 7] = [
    Listing { symbol: "SOL", name: "Solana", address: "So11111111111111111111111111111111111111112" },
    Listing { symbol: "BONK", name: "Bonk", address: "DezXAZ8z7PnrnRJjz3wXBoRgixCa6xjnB7YaB1pPB263" },
    Listing { symbol: "JTO", name: "Jito", address: "J1toso1uCk3RLmjorhTtrVwY9HJ7X8V9yYac6Y7kGCPn" },
    Listing { symbol: "WIF", name: "Dogwifhat", address: "EKpQGSJtjMFqKZ9KQanSqYXRcF8fBopzLHYxdM65zcjm" },
    Listing { symbol: "PYTH", name: "Pyth Network", address: "HZ1JovNiVvGrGNiiYvEozEVgZ58xaU3RKwX8eACQBCt3" },
    Listing { symbol: "RNDR", name: "Render Token", address: "RND9vMhk8itAYZ7iMimRJFGXTV7W5JKvK1c6FgL4h9V" },
    Listing { symbol: "MSOL", name: "Marinade Staked SOL", address: "mSoLzYCxHdYgdzU16g5QSh3i5K3z3KZK7ytfqcJm7So" },
];

pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Raydium,
    url_prefix: "https://raydium.io/swap/?inputCurrency=SOL&outputCurrency=",
    launch_age_days: (30, 30),
    price: Span::new(0.0, 100.0),
    market_cap: Span::new(0.0, 5_000_000_000.0),
    market_cap_change: Span::new(-10.0, 10.0),
    total_supply: Span::new(0.0, 10_000_000_000.0),
    circulating_supply: Span::new(0.0, 8_000_000_000.0),
    holders: (10_000, 110_000),
    holder_change: (-1_000, 1_000),
    volume_5m: Span::new(0.0, 5_000_000.0),
    volume_1h: Span::new(0.0, 50_000_000.0),
    volume_24h: Span::new(0.0, 500_000_000.0),
    total_volume: Span::new(0.0, 10_000_000_000.0),
    volume_change: Span::new(-20.0, 20.0),
    hourly_move: Span::new(-0.04, 0.04),
    tick_move: Span::new(-0.005, 0.005),
    price_floor: 0.0001,
    default_risk: RiskLevel::Safe,
    seed_security: SeedSecurity {
        locked_odds: 1.0,
        mint_disabled_odds: 1.0,
        verified_odds: 1.0,
        liquidity_ratio: Span::new(20.0, 100.0),
        largest_holder: (5, 14),
    },
};

pub fn adapter(synth: Synthesizer) -> CatalogAdapter {
    CatalogAdapter::new(&PROFILE, &LISTINGS, synth)
}
