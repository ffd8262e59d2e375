use super::types::{RatePair, RiskProfile, ScenarioTier};

/// Wealth goal every projection solves for.
pub const TARGET_WEALTH: f64 = 1_000_000.0;

pub const MONTHS_PER_YEAR: f64 = 12.0;

pub const CONSERVATIVE_RATES: RatePair = RatePair {
    baseline: 0.04,
    optimized: 0.08,
};

pub const AGGRESSIVE_RATES: RatePair = RatePair {
    baseline: 0.08,
    optimized: 0.10,
};

/// Starting capital from which an aggressive saver gets the investor narrative.
pub const INVESTOR_CAPITAL_THRESHOLD: f64 = 5_000.0;

pub fn select_rates(profile: RiskProfile) -> RatePair {
    match profile {
        RiskProfile::Conservative => CONSERVATIVE_RATES,
        RiskProfile::Aggressive => AGGRESSIVE_RATES,
    }
}

pub fn classify(starting_capital: f64, profile: RiskProfile) -> ScenarioTier {
    if starting_capital < INVESTOR_CAPITAL_THRESHOLD || profile == RiskProfile::Conservative {
        ScenarioTier::Entry
    } else {
        ScenarioTier::Investor
    }
}
