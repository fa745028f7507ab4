use crate::sources::catalog::{CatalogAdapter, Listing};
use crate::sources::profile::{PlatformProfile, SeedSecurity, Span};
use crate::sources::synthetic::Synthesizer;
use crate::types::asset::{Platform, RiskLevel};

pub static LISTINGS: [Listing; 5] = [
    Listing { symbol: "ORCA", name: "Orca", address: "orcaEKTdK7LKz57vaAYr9QeNsVEPfiu6QeMU1kektZE" },
    Listing { symbol: "PORT", name: "Port Finance", address: "PoRTjZMPXb9T7dyU7tpLEZRQj7e6ssfAE62j2oQuc6y" },
    Listing { symbol: "ATLAS", name: "Star Atlas", address: "ATLASXmbPQxBUYbxPsV97usA3fPQYEqzQBUHgiFCUsXx" },
    Listing { symbol: "GENE", name: "Genopets", address: "GENEtH5amGSi8kHAtQoezp1XEXwZJ8vcuePYnXdKrMYz" },
    Listing { symbol: "SAMO", name: "Samoyedcoin", address: "7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU" },
];

// Older pools, tighter ranges.
pub static PROFILE: PlatformProfile = PlatformProfile {
    platform: Platform::Orca,
    url_prefix: "https://www.orca.so/liquidity?base=",
    launch_age_days: (90, 90),
    price: Span::new(0.5, 5.5),
    market_cap: Span::new(500_000_000.0, 1_500_000_000.0),
    market_cap_change: Span::new(-5.0, 10.0),
    total_supply: Span::new(1_000_000_000.0, 6_000_000_000.0),
    circulating_supply: Span::new(750_000_000.0, 4_750_000_000.0),
    holders: (50_000, 250_000),
    holder_change: (-200, 800),
    volume_5m: Span::new(0.0, 20_000_000.0),
    volume_1h: Span::new(0.0, 200_000_000.0),
    volume_24h: Span::new(0.0, 2_000_000_000.0),
    total_volume: Span::new(0.0, 20_000_000_000.0),
    volume_change: Span::new(-4.0, 8.0),
    hourly_move: Span::new(-0.03, 0.03),
    tick_move: Span::new(-0.003, 0.003),
    price_floor: 0.01,
    default_risk: RiskLevel::Safe,
    seed_security: SeedSecurity {
        locked_odds: 1.0,
        mint_disabled_odds: 1.0,
        verified_odds: 1.0,
        liquidity_ratio: Span::new(50.0, 100.0),
        largest_holder: (2, 11),
    },
};

pub fn adapter(synth: Synthesizer) -> CatalogAdapter {
    CatalogAdapter::new(&PROFILE, &LISTINGS, synth)
}
