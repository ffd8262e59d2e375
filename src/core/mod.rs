mod engine;
mod horizon;
mod policy;
mod types;

pub use engine::{evaluate, evaluate_against};
pub use horizon::{effective_monthly_rate, project, years_to_target};
pub use policy::{
    AGGRESSIVE_RATES, CONSERVATIVE_RATES, INVESTOR_CAPITAL_THRESHOLD, MONTHS_PER_YEAR,
    TARGET_WEALTH, classify, select_rates,
};
pub use types::{
    HorizonYears, Projection, ProjectionInput, ProjectionResult, RatePair, RiskProfile,
    ScenarioTier, Submission,
};
