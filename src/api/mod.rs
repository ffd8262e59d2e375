mod narrative;

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::get,
};
use clap::{Parser, ValueEnum};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::{AppConfig, DEFAULT_STORE_TIMEOUT_MS};
use crate::core::{HorizonYears, Projection, RiskProfile, ScenarioTier, Submission, TARGET_WEALTH, evaluate};
use crate::store::{CalculationRecord, CalculationStore, RestStore};

pub use narrative::{Narrative, UNREACHABLE_LABEL, format_years, narrative_for};

const INDEX_HTML: &str = include_str!("../../web/index.html");
const STYLES_CSS: &str = include_str!("../../web/styles.css");
const APP_JS: &str = include_str!("../../web/app.js");

const MIN_NAME_CHARS: usize = 2;
const MIN_AGE: u32 = 18;
const MAX_AGE: u32 = 100;

const PERSISTENCE_WARNING: &str =
    "Não foi possível salvar sua simulação agora. O resultado abaixo continua válido.";

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliProfile {
    Conservative,
    Aggressive,
}

impl From<CliProfile> for RiskProfile {
    fn from(value: CliProfile) -> Self {
        match value {
            CliProfile::Conservative => RiskProfile::Conservative,
            CliProfile::Aggressive => RiskProfile::Aggressive,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ApiProfile {
    Conservative,
    Aggressive,
}

impl From<ApiProfile> for CliProfile {
    fn from(value: ApiProfile) -> Self {
        match value {
            ApiProfile::Conservative => CliProfile::Conservative,
            ApiProfile::Aggressive => CliProfile::Aggressive,
        }
    }
}

/// A money field as it arrives from the form: either a plain number or the
/// masked text the currency input produces (`"1.500.000"`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
enum CurrencyInput {
    Amount(f64),
    Masked(String),
}

impl FromStr for CurrencyInput {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(CurrencyInput::Masked(s.to_string()))
    }
}

impl CurrencyInput {
    /// Masked text keeps only its ASCII digits; no digits at all reads as 0.
    fn to_amount(&self, field: &'static str) -> Result<f64, InputError> {
        let amount = match self {
            CurrencyInput::Amount(v) => *v,
            CurrencyInput::Masked(raw) => {
                let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
                if digits.is_empty() {
                    0.0
                } else {
                    digits
                        .parse::<f64>()
                        .map_err(|_| InputError::InvalidAmount { field })?
                }
            }
        };

        if !amount.is_finite() || amount < 0.0 {
            return Err(InputError::InvalidAmount { field });
        }
        Ok(amount)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("name must have at least 2 characters")]
    NameTooShort,
    #[error("age is required")]
    MissingAge,
    #[error("age must be between 18 and 100, got {0}")]
    AgeOutOfRange(u32),
    #[error("{field} must be a finite, non-negative amount")]
    InvalidAmount { field: &'static str },
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct CalculatePayload {
    name: Option<String>,
    age: Option<u32>,
    current_investment: Option<CurrencyInput>,
    monthly_investment: Option<CurrencyInput>,
    profile: Option<ApiProfile>,
    email: Option<String>,
    whatsapp: Option<String>,
}

#[derive(Parser, Debug)]
#[command(
    name = "million",
    about = "Projects how many years it takes to reach the first million"
)]
struct Cli {
    #[arg(long)]
    name: String,
    #[arg(long)]
    age: Option<u32>,
    #[arg(
        long,
        default_value = "0",
        help = "Amount already invested; masked text like 1.500 is accepted"
    )]
    current_investment: CurrencyInput,
    #[arg(long, default_value = "0", help = "Amount invested every month")]
    monthly_investment: CurrencyInput,
    #[arg(long, value_enum, default_value_t = CliProfile::Conservative)]
    profile: CliProfile,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    whatsapp: Option<String>,
    #[arg(long, help = "Print the JSON response instead of the result text")]
    json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RatesResponse {
    baseline: f64,
    optimized: f64,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum PersistenceState {
    Saved,
    Failed,
    Disabled,
}

#[derive(Debug, Serialize)]
struct PersistenceResponse {
    status: PersistenceState,
    #[serde(skip_serializing_if = "Option::is_none")]
    warning: Option<String>,
}

impl PersistenceResponse {
    fn disabled() -> Self {
        PersistenceResponse {
            status: PersistenceState::Disabled,
            warning: None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CalculateResponse {
    name: String,
    profile: RiskProfile,
    target: f64,
    rates: RatesResponse,
    scenario: ScenarioTier,
    years_real: HorizonYears,
    years_optimized: HorizonYears,
    years_real_label: String,
    years_optimized_label: String,
    narrative: Narrative,
    persistence: PersistenceResponse,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// Shared handler state. The store is optional; without one every
/// calculation reports persistence as `disabled`.
#[derive(Clone)]
pub struct AppState {
    store: Option<Arc<dyn CalculationStore>>,
    store_timeout: Duration,
}

impl AppState {
    pub fn new(store: Option<Arc<dyn CalculationStore>>, store_timeout: Duration) -> Self {
        AppState {
            store,
            store_timeout,
        }
    }

    pub fn without_store() -> Self {
        Self::new(None, Duration::from_millis(DEFAULT_STORE_TIMEOUT_MS))
    }

    pub fn from_config(config: &AppConfig) -> Self {
        match &config.store {
            Some(store_config) => {
                let store = RestStore::new(store_config);
                info!("Lead persistence enabled at {}", store.endpoint());
                Self::new(Some(Arc::new(store)), store_config.timeout)
            }
            None => {
                warn!("No lead store configured; calculations will not be persisted");
                Self::without_store()
            }
        }
    }
}

fn build_submission(cli: Cli) -> Result<Submission, InputError> {
    let name = cli.name.trim().to_string();
    if name.chars().count() < MIN_NAME_CHARS {
        return Err(InputError::NameTooShort);
    }

    let Some(age) = cli.age else {
        return Err(InputError::MissingAge);
    };
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Err(InputError::AgeOutOfRange(age));
    }

    let starting_capital = cli.current_investment.to_amount("currentInvestment")?;
    let monthly_contribution = cli.monthly_investment.to_amount("monthlyInvestment")?;

    let contact = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(Submission {
        name,
        age,
        starting_capital,
        monthly_contribution,
        profile: cli.profile.into(),
        email: contact(cli.email),
        whatsapp: contact(cli.whatsapp),
    })
}

fn default_cli_for_api() -> Cli {
    Cli {
        name: String::new(),
        age: None,
        current_investment: CurrencyInput::Masked("0".to_string()),
        monthly_investment: CurrencyInput::Masked("0".to_string()),
        profile: CliProfile::Conservative,
        email: None,
        whatsapp: None,
        json: true,
    }
}

fn submission_from_payload(payload: CalculatePayload) -> Result<Submission, InputError> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.name {
        cli.name = v;
    }
    if let Some(v) = payload.age {
        cli.age = Some(v);
    }
    if let Some(v) = payload.current_investment {
        cli.current_investment = v;
    }
    if let Some(v) = payload.monthly_investment {
        cli.monthly_investment = v;
    }
    if let Some(v) = payload.profile {
        cli.profile = v.into();
    }
    cli.email = payload.email;
    cli.whatsapp = payload.whatsapp;

    build_submission(cli)
}

fn build_calculate_response(
    projection: &Projection,
    profile: RiskProfile,
    persistence: PersistenceResponse,
) -> CalculateResponse {
    let result = &projection.result;
    CalculateResponse {
        name: projection.name.clone(),
        profile,
        target: TARGET_WEALTH,
        rates: RatesResponse {
            baseline: projection.rates.baseline,
            optimized: projection.rates.optimized,
        },
        scenario: result.tier,
        years_real: result.baseline_years,
        years_optimized: result.optimized_years,
        years_real_label: format_years(result.baseline_years),
        years_optimized_label: format_years(result.optimized_years),
        narrative: narrative_for(projection),
        persistence,
    }
}

/// Hands the finished projection to the store. Whatever happens here only
/// changes the `persistence` block of the response.
async fn persist(state: &AppState, record: &CalculationRecord) -> PersistenceResponse {
    let Some(store) = &state.store else {
        return PersistenceResponse::disabled();
    };

    let outcome = match tokio::time::timeout(state.store_timeout, store.save(record)).await {
        Ok(outcome) => outcome,
        Err(_) => Err(crate::store::StoreError::Timeout(
            state.store_timeout.as_millis(),
        )),
    };

    match outcome {
        Ok(()) => PersistenceResponse {
            status: PersistenceState::Saved,
            warning: None,
        },
        Err(e) => {
            warn!("Failed to persist calculation {} via {}: {e}", record.id, store.name());
            PersistenceResponse {
                status: PersistenceState::Failed,
                warning: Some(PERSISTENCE_WARNING.to_string()),
            }
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/index.html", get(index_handler))
        .route("/styles.css", get(styles_handler))
        .route("/app.js", get(app_js_handler))
        .route(
            "/api/calculate",
            get(calculate_get_handler).post(calculate_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

pub async fn run_http_server(config: AppConfig) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let app = router(AppState::from_config(&config));

    let listener = TcpListener::bind(addr).await?;
    info!("Million calculator listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{}/", config.port);

    axum::serve(listener, app).await
}

/// Runs one projection from command-line arguments and returns the text to
/// print. Persistence is not attempted.
pub fn run_cli<I, T>(args: I) -> Result<String, CliError>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    let cli = Cli::parse_from(args);
    let as_json = cli.json;
    let submission = build_submission(cli)?;
    let projection = evaluate(&submission);
    let response =
        build_calculate_response(&projection, submission.profile, PersistenceResponse::disabled());

    if as_json {
        return Ok(serde_json::to_string_pretty(&response)?);
    }
    Ok(render_text(&response))
}

fn render_text(response: &CalculateResponse) -> String {
    let narrative = &response.narrative;
    let mut lines = vec![narrative.headline.clone()];
    if let Some(sub) = &narrative.subheadline {
        lines.push(sub.clone());
    }
    lines.push(narrative.message.clone());
    lines.push(narrative.offer.clone());
    lines.push(String::new());
    lines.push(format!(
        "Ritmo atual ({}): {}",
        format_rate(response.rates.baseline),
        response.years_real_label
    ));
    lines.push(format!(
        "{} ({}): {}",
        narrative.strategy,
        format_rate(response.rates.optimized),
        response.years_optimized_label
    ));
    lines.push(format!("-> {}", narrative.cta_label));
    lines.join("\n")
}

fn format_rate(rate: f64) -> String {
    let percent = format!("{:.1}", rate * 100.0).replace('.', ",");
    format!("{percent}% a.a.")
}

async fn index_handler() -> impl IntoResponse {
    with_cache_control(Html(INDEX_HTML))
}

async fn styles_handler() -> impl IntoResponse {
    with_cache_control((
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        STYLES_CSS,
    ))
}

async fn app_js_handler() -> impl IntoResponse {
    with_cache_control((
        [(
            header::CONTENT_TYPE,
            "application/javascript; charset=utf-8",
        )],
        APP_JS,
    ))
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn calculate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<CalculatePayload>,
) -> Response {
    calculate_handler_impl(&state, payload).await
}

async fn calculate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<CalculatePayload>,
) -> Response {
    calculate_handler_impl(&state, payload).await
}

async fn calculate_handler_impl(state: &AppState, payload: CalculatePayload) -> Response {
    let submission = match submission_from_payload(payload) {
        Ok(submission) => submission,
        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    };

    let projection = evaluate(&submission);
    info!(
        "Projected {} profile: tier={} baseline={:?} optimized={:?}",
        submission.profile.as_str(),
        projection.result.tier.label(),
        projection.result.baseline_years.finite(),
        projection.result.optimized_years.finite(),
    );

    let record = CalculationRecord::new(&submission, &projection);
    let persistence = persist(state, &record).await;

    json_response(
        StatusCode::OK,
        build_calculate_response(&projection, submission.profile, persistence),
    )
}

fn with_cache_control<R: IntoResponse>(response: R) -> Response {
    let mut response = response.into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    with_cache_control((status, Json(body)))
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}
