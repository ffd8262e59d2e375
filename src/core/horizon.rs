use super::policy::MONTHS_PER_YEAR;
use super::types::{HorizonYears, ProjectionInput};

/// Monthly rate that compounds to `annual_rate` over twelve months.
pub fn effective_monthly_rate(annual_rate: f64) -> f64 {
    (1.0 + annual_rate).powf(1.0 / MONTHS_PER_YEAR) - 1.0
}

/// Years until `starting_capital` plus monthly contributions, compounding at
/// `annual_rate`, reach `target`.
///
/// Total over non-negative inputs: an already-met target yields
/// [`HorizonYears::REACHED`] and an unreachable one yields
/// [`HorizonYears::UNREACHABLE`]. The guards run in a fixed order and the
/// general case uses the closed-form annuity period count
/// `m = ln((T*i + PMT) / (PV*i + PMT)) / ln(1 + i)`.
pub fn years_to_target(
    starting_capital: f64,
    monthly_contribution: f64,
    annual_rate: f64,
    target: f64,
) -> HorizonYears {
    let pv = starting_capital;
    let pmt = monthly_contribution;

    if pv >= target {
        return HorizonYears::REACHED;
    }
    if pmt <= 0.0 && pv <= 0.0 && annual_rate <= 0.0 {
        return HorizonYears::UNREACHABLE;
    }

    let monthly_rate = effective_monthly_rate(annual_rate);

    if monthly_rate == 0.0 {
        if pmt == 0.0 {
            return HorizonYears::UNREACHABLE;
        }
        return HorizonYears::from_years((target - pv) / pmt / MONTHS_PER_YEAR);
    }

    let growth_ratio = (target * monthly_rate + pmt) / (pv * monthly_rate + pmt);
    if growth_ratio <= 0.0 {
        return HorizonYears::UNREACHABLE;
    }

    let months = growth_ratio.ln() / (1.0 + monthly_rate).ln();
    HorizonYears::from_years(months / MONTHS_PER_YEAR)
}

pub fn project(input: ProjectionInput, target: f64) -> HorizonYears {
    years_to_target(
        input.starting_capital,
        input.monthly_contribution,
        input.annual_rate,
        target,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::policy::TARGET_WEALTH;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    /// Month-by-month balance after `months`, contributions at period end.
    fn simulate_balance(pv: f64, pmt: f64, annual_rate: f64, months: u32) -> f64 {
        let i = effective_monthly_rate(annual_rate);
        let mut balance = pv;
        for _ in 0..months {
            balance = balance * (1.0 + i) + pmt;
        }
        balance
    }

    #[test]
    fn effective_monthly_rate_compounds_back_to_annual() {
        let i = effective_monthly_rate(0.10);
        assert_relative_eq!((1.0 + i).powi(12), 1.10, epsilon = 1e-12);
        assert_eq!(effective_monthly_rate(0.0), 0.0);
    }

    #[test]
    fn zero_when_target_already_met() {
        assert_eq!(years_to_target(1_000_000.0, 1_000.0, 0.1, TARGET_WEALTH).years(), 0.0);
        assert_eq!(years_to_target(2_000_000.0, 1_000.0, 0.1, TARGET_WEALTH).years(), 0.0);
        assert!(years_to_target(1_000_000.0, 0.0, 0.0, TARGET_WEALTH).is_reached());
    }

    #[test]
    fn unreachable_without_capital_contribution_or_growth() {
        assert!(years_to_target(0.0, 0.0, 0.0, TARGET_WEALTH).is_unreachable());
    }

    #[test]
    fn zero_rate_with_capital_but_no_contribution_is_unreachable() {
        assert!(years_to_target(50_000.0, 0.0, 0.0, TARGET_WEALTH).is_unreachable());
    }

    #[test]
    fn zero_rate_accumulates_linearly() {
        let years = years_to_target(0.0, 10_000.0, 0.0, TARGET_WEALTH).years();
        assert_relative_eq!(years, 100.0 / 12.0, epsilon = 1e-9);

        let years = years_to_target(400_000.0, 5_000.0, 0.0, TARGET_WEALTH).years();
        assert_relative_eq!(years, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn growth_only_without_contribution_uses_lump_sum_compounding() {
        // Tenfold growth of a lump sum: ln(10) / ln(1.10) years.
        let years = years_to_target(100_000.0, 0.0, 0.10, TARGET_WEALTH).years();
        let expected = (10.0_f64).ln() / (1.10_f64).ln();
        assert_relative_eq!(years, expected, epsilon = 1e-9);
    }

    #[test]
    fn no_capital_no_contribution_with_growth_is_unreachable() {
        assert!(years_to_target(0.0, 0.0, 0.08, TARGET_WEALTH).is_unreachable());
    }

    #[test]
    fn compound_case_lands_between_twenty_and_thirty_years() {
        let years = years_to_target(0.0, 1_000.0, 0.10, TARGET_WEALTH).years();
        assert!(years > 20.0 && years < 30.0, "got {years}");
    }

    #[test]
    fn oracle_closed_form_matches_month_by_month_simulation() {
        let (pv, pmt, rate) = (25_000.0, 2_500.0, 0.08);
        let years = years_to_target(pv, pmt, rate, TARGET_WEALTH).years();
        let months = years * 12.0;

        let before = simulate_balance(pv, pmt, rate, months.floor() as u32);
        let after = simulate_balance(pv, pmt, rate, months.ceil() as u32);
        assert!(before <= TARGET_WEALTH, "before={before}");
        assert!(after >= TARGET_WEALTH, "after={after}");
    }

    #[test]
    fn capital_just_below_target_never_goes_negative() {
        let h = years_to_target(TARGET_WEALTH - 1e-9, 0.0, 0.04, TARGET_WEALTH);
        assert!(h.years() >= 0.0);
        assert!(h.years() < 1e-6);
    }

    #[test]
    fn project_reads_projection_input() {
        let input = ProjectionInput {
            starting_capital: 0.0,
            monthly_contribution: 10_000.0,
            annual_rate: 0.0,
        };
        assert_relative_eq!(project(input, TARGET_WEALTH).years(), 100.0 / 12.0, epsilon = 1e-9);
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(128))]

        #[test]
        fn prop_already_met_target_is_zero_for_any_rate(
            surplus in 0u32..5_000_000,
            pmt in 0u32..50_000,
            rate_bp in 0u32..2_001
        ) {
            let pv = TARGET_WEALTH + surplus as f64;
            let h = years_to_target(pv, pmt as f64, rate_bp as f64 / 10_000.0, TARGET_WEALTH);
            prop_assert_eq!(h.years(), 0.0);
        }

        #[test]
        fn prop_higher_rate_never_lengthens_horizon(
            pv in 0u32..999_999,
            pmt in 0u32..50_000,
            rate_bp in 0u32..2_000,
            step_bp in 1u32..1_000
        ) {
            let low = rate_bp as f64 / 10_000.0;
            let high = (rate_bp + step_bp) as f64 / 10_000.0;
            let slow = years_to_target(pv as f64, pmt as f64, low, TARGET_WEALTH);
            let fast = years_to_target(pv as f64, pmt as f64, high, TARGET_WEALTH);

            if slow.is_unreachable() {
                prop_assert!(fast <= slow);
            } else {
                prop_assert!(!fast.is_unreachable());
                prop_assert!(fast.years() <= slow.years() * (1.0 + 1e-9) + 1e-9);
            }
        }

        #[test]
        fn prop_horizon_is_non_negative_and_not_nan(
            pv in 0u32..2_000_000,
            pmt in 0u32..50_000,
            rate_bp in 0u32..3_001
        ) {
            let h = years_to_target(pv as f64, pmt as f64, rate_bp as f64 / 10_000.0, TARGET_WEALTH);
            prop_assert!(!h.years().is_nan());
            prop_assert!(h.years() >= 0.0);
        }
    }
}
