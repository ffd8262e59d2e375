use serde::{Serialize, Serializer};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskProfile {
    Conservative,
    Aggressive,
}

impl RiskProfile {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskProfile::Conservative => "conservative",
            RiskProfile::Aggressive => "aggressive",
        }
    }
}

/// Annual return assumptions for one profile: what the saver earns today and
/// what an optimized allocation is assumed to earn.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RatePair {
    pub baseline: f64,
    pub optimized: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
pub enum ScenarioTier {
    #[serde(rename = "iniciante")]
    Entry,
    #[serde(rename = "investidor")]
    Investor,
}

impl ScenarioTier {
    pub fn label(self) -> &'static str {
        match self {
            ScenarioTier::Entry => "iniciante",
            ScenarioTier::Investor => "investidor",
        }
    }
}

/// Years until the target is reached.
///
/// `0` means the target is already met and `+inf` means it is never reached
/// under the given assumptions. Both are regular values, not errors.
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd)]
pub struct HorizonYears(f64);

impl HorizonYears {
    pub const REACHED: HorizonYears = HorizonYears(0.0);
    pub const UNREACHABLE: HorizonYears = HorizonYears(f64::INFINITY);

    pub(crate) fn from_years(years: f64) -> Self {
        HorizonYears(years.max(0.0))
    }

    pub fn years(self) -> f64 {
        self.0
    }

    pub fn is_reached(self) -> bool {
        self.0 == 0.0
    }

    pub fn is_unreachable(self) -> bool {
        self.0.is_infinite()
    }

    /// `None` when unreachable, so JSON consumers get `null` instead of a
    /// non-representable float.
    pub fn finite(self) -> Option<f64> {
        self.0.is_finite().then_some(self.0)
    }
}

impl Serialize for HorizonYears {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.finite().serialize(serializer)
    }
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ProjectionInput {
    pub starting_capital: f64,
    pub monthly_contribution: f64,
    pub annual_rate: f64,
}

/// Already-validated form data. Amounts are parsed, finite and non-negative.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub name: String,
    pub age: u32,
    pub starting_capital: f64,
    pub monthly_contribution: f64,
    pub profile: RiskProfile,
    pub email: Option<String>,
    pub whatsapp: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub baseline_years: HorizonYears,
    pub optimized_years: HorizonYears,
    pub tier: ScenarioTier,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Projection {
    pub name: String,
    pub rates: RatePair,
    pub result: ProjectionResult,
}
