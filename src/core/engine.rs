use super::horizon::project;
use super::policy::{TARGET_WEALTH, classify, select_rates};
use super::types::{Projection, ProjectionInput, ProjectionResult, Submission};

/// Runs one submission through rate selection, both horizon projections and
/// tier classification. No side effects; identical submissions give identical
/// projections.
pub fn evaluate(submission: &Submission) -> Projection {
    evaluate_against(submission, TARGET_WEALTH)
}

pub fn evaluate_against(submission: &Submission, target: f64) -> Projection {
    let rates = select_rates(submission.profile);
    let input_at = |annual_rate| ProjectionInput {
        starting_capital: submission.starting_capital,
        monthly_contribution: submission.monthly_contribution,
        annual_rate,
    };

    let result = ProjectionResult {
        baseline_years: project(input_at(rates.baseline), target),
        optimized_years: project(input_at(rates.optimized), target),
        tier: classify(submission.starting_capital, submission.profile),
    };

    Projection {
        name: submission.name.clone(),
        rates,
        result,
    }
}
