use crate::types::asset::{RiskLevel, SecurityInfo};

/// Liquidity ratio (percent) above which a fully secured asset is safe.
pub const SAFE_LIQUIDITY_RATIO: f64 = 20.0;
/// Liquidity ratio (percent) below which any asset is risky.
pub const RISKY_LIQUIDITY_RATIO: f64 = 10.0;

/// Deterministic risk rule table. Safe wins over risky, caution is the rest.
pub fn classify_risk(security: &SecurityInfo) -> RiskLevel {
    let SecurityInfo {
        mint_disabled,
        contract_verified,
        liquidity_locked,
        liquidity_ratio,
        ..
    } = *security;

    if mint_disabled && contract_verified && liquidity_locked && liquidity_ratio > SAFE_LIQUIDITY_RATIO {
        RiskLevel::Safe
    } else if !mint_disabled
        || (!contract_verified && !liquidity_locked)
        || liquidity_ratio < RISKY_LIQUIDITY_RATIO
    {
        RiskLevel::Risky
    } else {
        RiskLevel::Caution
    }
}
