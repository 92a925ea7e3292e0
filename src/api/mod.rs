pub mod catalog;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use axum::{
    Router,
    extract::{Json, Query, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::{ServeConfig, SimulateArgs};
use crate::core::{
    DEFAULT_PERCENTILES, RiskProfile, RunDiagnostics, RunOptions, SimulationError,
    SimulationParameters, SimulationSummary, SpendingPolicy, YearTraceRow, run_with_options,
    run_yearly_trace, summarize_with_percentiles,
};
use catalog::{CareerProfile, Catalog, HouseholdProfile, ParameterResolver, ResolveError};

const DEFAULT_CAREER: &str = "software_engineer";
const DEFAULT_LOCATION: &str = "washington_dc";
const DEFAULT_YEARS: u32 = 10;
const DEFAULT_SAMPLES: u32 = 10_000;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Resolve(#[from] ResolveError),
    #[error(transparent)]
    Simulation(#[from] SimulationError),
    #[error("simulation exceeded the request time budget")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) | ApiError::Resolve(_) => StatusCode::BAD_REQUEST,
            ApiError::Simulation(SimulationError::Cancelled) | ApiError::Timeout => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            ApiError::Simulation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error_response(self.status(), &self.to_string())
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum PercentileInput {
    List(Vec<f64>),
    Csv(String),
}

impl PercentileInput {
    fn into_values(self) -> Result<Vec<f64>, ApiError> {
        match self {
            PercentileInput::List(values) => Ok(values),
            PercentileInput::Csv(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<f64>()
                        .map_err(|_| ApiError::BadRequest(format!("invalid percentile '{part}'")))
                })
                .collect(),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    career: Option<String>,
    location: Option<String>,
    #[serde(alias = "spending", alias = "policy")]
    spending_policy: Option<SpendingPolicy>,
    children: Option<u32>,
    child_years: Option<u32>,
    years: Option<u32>,
    #[serde(alias = "numSamples", alias = "runs")]
    samples: Option<u32>,
    seed: Option<u64>,
    percentiles: Option<PercentileInput>,
    #[serde(alias = "risk")]
    risk_profile: Option<RiskProfile>,
    include_trace: Option<bool>,
}

#[derive(Debug)]
struct ApiRequest {
    profile: HouseholdProfile,
    percentiles: Vec<f64>,
    include_trace: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimulateResponse {
    career: String,
    location: String,
    spending_policy: SpendingPolicy,
    years: u32,
    summary: SimulationSummary,
    diagnostics: RunDiagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    yearly_trace: Option<Vec<YearTraceRow>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    catalog: Arc<Catalog>,
    config: Arc<ServeConfig>,
}

pub async fn run_http_server(config: ServeConfig) -> std::io::Result<()> {
    config
        .validate()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()))?;
    let addr = config.listen_addr();
    let app = router(AppState {
        catalog: Arc::new(Catalog::builtin()),
        config: Arc::new(config),
    });

    let listener = TcpListener::bind(addr).await?;
    info!(%addr, "net worth HTTP API listening");

    axum::serve(listener, app).await
}

fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(health_handler))
        .route("/api/careers", get(careers_handler))
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler)
        .with_state(state)
}

/// Runs one household profile through the builtin catalog and renders the summary as JSON.
pub fn simulate_from_args(args: SimulateArgs) -> Result<String, ApiError> {
    let options = if args.sequential {
        RunOptions::sequential()
    } else {
        RunOptions::default()
    };
    let request = ApiRequest {
        profile: HouseholdProfile {
            career_id: args.career,
            location: args.location,
            spending_policy: args.spending_policy.into(),
            num_children: args.children,
            child_years: args.child_years,
            years: args.years,
            num_samples: args.samples,
            random_seed: args.seed,
            risk_profile: args.risk_profile.map(Into::into),
        },
        percentiles: args.percentiles,
        include_trace: args.trace,
    };

    let params = Catalog::builtin().resolve(&request.profile)?;
    let response = simulate(
        &request.profile,
        params,
        &options,
        &request.percentiles,
        request.include_trace,
    )?;
    serde_json::to_string_pretty(&response).map_err(|e| ApiError::Internal(e.to_string()))
}

async fn health_handler() -> Response {
    json_response(StatusCode::OK, serde_json::json!({ "status": "ok" }))
}

async fn careers_handler(State(state): State<AppState>) -> Response {
    let careers: Vec<&CareerProfile> = state.catalog.careers().collect();
    json_response(StatusCode::OK, careers)
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(
    State(state): State<AppState>,
    Query(payload): Query<SimulatePayload>,
) -> Result<Response, ApiError> {
    simulate_handler_impl(state, payload).await
}

async fn simulate_post_handler(
    State(state): State<AppState>,
    Json(payload): Json<SimulatePayload>,
) -> Result<Response, ApiError> {
    simulate_handler_impl(state, payload).await
}

async fn simulate_handler_impl(
    state: AppState,
    payload: SimulatePayload,
) -> Result<Response, ApiError> {
    let request = api_request_from_payload(payload, &state.config)?;
    let params = state.catalog.resolve(&request.profile)?;

    let cancel = Arc::new(AtomicBool::new(false));
    let mut options = if state.config.sequential {
        RunOptions::sequential()
    } else {
        RunOptions::default()
    };
    options = options.with_cancel(Arc::clone(&cancel));

    let ApiRequest {
        profile,
        percentiles,
        include_trace,
    } = request;
    let worker = tokio::task::spawn_blocking(move || {
        simulate(&profile, params, &options, &percentiles, include_trace)
    });

    let response = match tokio::time::timeout(state.config.request_timeout(), worker).await {
        Ok(joined) => joined.map_err(|e| ApiError::Internal(e.to_string()))??,
        Err(_) => {
            cancel.store(true, Ordering::Relaxed);
            return Err(ApiError::Timeout);
        }
    };

    info!(
        career = %response.career,
        location = %response.location,
        samples = response.summary.sample_count,
        mean_net_worth = response.summary.mean_net_worth,
        "simulation served"
    );
    Ok(json_response(StatusCode::OK, response))
}

fn simulate(
    profile: &HouseholdProfile,
    mut params: SimulationParameters,
    options: &RunOptions,
    percentiles: &[f64],
    include_trace: bool,
) -> Result<SimulateResponse, SimulationError> {
    let run = run_with_options(&params, options)?;
    let summary = summarize_with_percentiles(&run.net_worths, percentiles)?;

    let yearly_trace = if include_trace {
        // Pin the seed so the trace replays exactly the trials summarized above.
        params.random_seed = Some(run.diagnostics.base_seed);
        Some(run_yearly_trace(&params, options)?)
    } else {
        None
    };

    Ok(SimulateResponse {
        career: profile.career_id.clone(),
        location: profile.location.clone(),
        spending_policy: profile.spending_policy,
        years: profile.years,
        summary,
        diagnostics: run.diagnostics,
        yearly_trace,
    })
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        header::HeaderValue::from_static("no-store"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str, config: &ServeConfig) -> Result<ApiRequest, ApiError> {
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| ApiError::BadRequest(format!("Invalid API JSON payload: {e}")))?;
    api_request_from_payload(payload, config)
}

fn api_request_from_payload(
    payload: SimulatePayload,
    config: &ServeConfig,
) -> Result<ApiRequest, ApiError> {
    let years = payload.years.unwrap_or(DEFAULT_YEARS);
    if years > config.max_years {
        return Err(ApiError::BadRequest(format!(
            "years must be <= {}",
            config.max_years
        )));
    }

    let num_samples = payload.samples.unwrap_or(DEFAULT_SAMPLES);
    if num_samples > config.max_samples {
        return Err(ApiError::BadRequest(format!(
            "samples must be <= {}",
            config.max_samples
        )));
    }

    let percentiles = match payload.percentiles {
        Some(input) => input.into_values()?,
        None => DEFAULT_PERCENTILES.to_vec(),
    };

    Ok(ApiRequest {
        profile: HouseholdProfile {
            career_id: payload.career.unwrap_or_else(|| DEFAULT_CAREER.to_string()),
            location: payload
                .location
                .unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
            spending_policy: payload
                .spending_policy
                .unwrap_or(SpendingPolicy::Conservative),
            num_children: payload.children.unwrap_or(0),
            child_years: payload.child_years,
            years,
            num_samples,
            random_seed: payload.seed,
            risk_profile: payload.risk_profile,
        },
        percentiles,
        include_trace: payload.include_trace.unwrap_or(false),
    })
}
