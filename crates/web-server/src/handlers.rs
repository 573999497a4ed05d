use crate::{AppState, error::AppError};
use analytics::{StrategyEvaluationRequest, StrategyEvaluationResult};
use axum::{Json, extract::State};
use core_types::{OptionContract, OptionType, ScreeningFilters};
use market_data::SYNTHETIC_CAVEAT;
use pricing::{PricingInput, PricingOutput};
use screener::{ChainOutcome, ChainQuery, FilterStats};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenResponse {
    pub contracts: Vec<OptionContract>,
    pub total_match_count: usize,
    pub filters_applied: ScreeningFilters,
    pub filter_stats: FilterStats,
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<&'static str>,
    pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainResponse {
    #[serde(flatten)]
    pub chain: ChainOutcome,
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<&'static str>,
    pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyResponse {
    #[serde(flatten)]
    pub result: StrategyEvaluationResult,
    /// Volatility used for the Greeks snapshot.
    pub volatility: f64,
    pub synthetic: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caveat: Option<&'static str>,
    pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GreeksResponse {
    #[serde(flatten)]
    pub output: PricingOutput,
    pub request_id: Uuid,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedVolatilityRequest {
    pub option_price: f64,
    pub option_type: OptionType,
    pub spot: f64,
    pub strike: f64,
    /// In years.
    pub time_to_expiration: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImpliedVolatilityResponse {
    pub implied_volatility: f64,
    pub request_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

fn caveat(synthetic: bool) -> Option<&'static str> {
    synthetic.then_some(SYNTHETIC_CAVEAT)
}

/// Runs engine work off the async executor.
async fn run_blocking<T, F>(work: F) -> Result<T, AppError>
where
    F: FnOnce() -> Result<T, AppError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work).await?
}

/// # GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// # POST /api/screen
pub async fn screen(
    State(state): State<Arc<AppState>>,
    Json(filters): Json<ScreeningFilters>,
) -> Result<Json<ScreenResponse>, AppError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, symbols = ?filters.underlying_symbols, "Screen requested.");

    let response = run_blocking(move || {
        let outcome = state.screener.screen(&filters)?;
        let synthetic = outcome.is_synthetic();
        Ok(ScreenResponse {
            total_match_count: outcome.total_match_count,
            contracts: outcome.contracts,
            filter_stats: outcome.stats,
            filters_applied: filters,
            synthetic,
            caveat: caveat(synthetic),
            request_id,
        })
    })
    .await?;
    Ok(Json(response))
}

/// # POST /api/chain
pub async fn chain(
    State(state): State<Arc<AppState>>,
    Json(query): Json<ChainQuery>,
) -> Result<Json<ChainResponse>, AppError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, symbol = %query.underlying_symbol, "Chain requested.");

    let response = run_blocking(move || {
        let chain = state.screener.chain(&query)?;
        let synthetic = chain.underlying.origin.is_synthetic();
        Ok(ChainResponse {
            chain,
            synthetic,
            caveat: caveat(synthetic),
            request_id,
        })
    })
    .await?;
    Ok(Json(response))
}

/// # POST /api/strategy/evaluate
pub async fn evaluate_strategy(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StrategyEvaluationRequest>,
) -> Result<Json<StrategyResponse>, AppError> {
    let request_id = Uuid::new_v4();
    tracing::info!(%request_id, legs = request.legs.len(), "Strategy evaluation requested.");

    let response = run_blocking(move || {
        let volatility = state.evaluator.snapshot_volatility(&request, &state.resolver)?;
        let result = state.evaluator.evaluate(&request, volatility.value)?;
        Ok(StrategyResponse {
            result,
            volatility: volatility.value,
            synthetic: volatility.synthetic,
            caveat: caveat(volatility.synthetic),
            request_id,
        })
    })
    .await?;
    Ok(Json(response))
}

/// # POST /api/pricing/greeks
pub async fn greeks(
    State(state): State<Arc<AppState>>,
    Json(input): Json<PricingInput>,
) -> Result<Json<GreeksResponse>, AppError> {
    let output = state.estimator.estimate(&input)?;
    Ok(Json(GreeksResponse {
        output,
        request_id: Uuid::new_v4(),
    }))
}

/// # POST /api/pricing/implied-volatility
pub async fn implied_volatility(
    State(state): State<Arc<AppState>>,
    Json(request): Json<ImpliedVolatilityRequest>,
) -> Result<Json<ImpliedVolatilityResponse>, AppError> {
    let implied_volatility = state.estimator.solve_implied_volatility(
        request.option_price,
        request.option_type,
        request.spot,
        request.strike,
        request.time_to_expiration,
    )?;
    Ok(Json(ImpliedVolatilityResponse {
        implied_volatility,
        request_id: Uuid::new_v4(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use configuration::Config;
    use core_types::{OptionAction, StrategyLeg};
    use market_data::PriceResolver;
    use rust_decimal_macros::dec;

    fn state() -> Arc<AppState> {
        Arc::new(AppState::new(Config::default(), PriceResolver::synthetic()).unwrap())
    }

    fn status_of(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[tokio::test]
    async fn screen_marks_synthetic_results() {
        let mut filters = ScreeningFilters::for_symbols(["SPY"]);
        filters.result_limit = 5;
        let Json(response) = screen(State(state()), Json(filters.clone())).await.unwrap();

        assert!(response.synthetic);
        assert!(response.caveat.is_some());
        assert!(response.contracts.len() <= 5);
        assert!(response.total_match_count >= response.contracts.len());
        assert_eq!(response.filters_applied, filters);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("totalMatchCount").is_some());
        assert!(json.get("requestId").is_some());
    }

    #[tokio::test]
    async fn empty_symbol_list_is_a_bad_request() {
        let filters = ScreeningFilters::for_symbols(Vec::<String>::new());
        let err = screen(State(state()), Json(filters)).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn chain_flattens_the_outcome() {
        let mut query = ChainQuery::for_symbol("AAPL");
        query.max_dte = 21;
        let Json(response) = chain(State(state()), Json(query)).await.unwrap();
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["underlying"]["symbol"], "AAPL");
        assert!(json["expirations"].is_array());
        assert_eq!(json["synthetic"], true);
    }

    #[tokio::test]
    async fn strategy_with_explicit_volatility_is_not_synthetic() {
        let mut request = StrategyEvaluationRequest::new(
            dec!(100),
            vec![StrategyLeg {
                strike_price: dec!(100),
                option_type: OptionType::Call,
                action: OptionAction::Buy,
                quantity: 1,
                premium: dec!(5),
            }],
        );
        request.volatility = Some(0.2);
        let Json(response) = evaluate_strategy(State(state()), Json(request.clone())).await.unwrap();
        assert!(!response.synthetic);
        assert!(response.caveat.is_none());
        assert_eq!(response.result.breakeven_prices, vec![dec!(105)]);

        request.volatility = None;
        let Json(response) = evaluate_strategy(State(state()), Json(request)).await.unwrap();
        assert!(response.synthetic);
        assert!(response.caveat.is_some());
    }

    #[tokio::test]
    async fn strategy_without_legs_is_a_bad_request() {
        let request = StrategyEvaluationRequest::new(dec!(100), vec![]);
        let err = evaluate_strategy(State(state()), Json(request)).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn pricing_endpoints_round_trip() {
        let input = PricingInput {
            option_type: OptionType::Put,
            spot: 100.0,
            strike: 95.0,
            time_to_expiration: 0.25,
            volatility: 0.3,
        };
        let Json(priced) = greeks(State(state()), Json(input)).await.unwrap();
        assert!(priced.output.greeks.delta < 0.0);

        let Json(solved) = implied_volatility(
            State(state()),
            Json(ImpliedVolatilityRequest {
                option_price: priced.output.theoretical_price,
                option_type: OptionType::Put,
                spot: 100.0,
                strike: 95.0,
                time_to_expiration: 0.25,
            }),
        )
        .await
        .unwrap();
        assert!((solved.implied_volatility - 0.3).abs() < 1e-4);
    }

    #[tokio::test]
    async fn zero_time_to_expiration_is_rejected() {
        let input = PricingInput {
            option_type: OptionType::Call,
            spot: 100.0,
            strike: 100.0,
            time_to_expiration: 0.0,
            volatility: 0.3,
        };
        let err = greeks(State(state()), Json(input)).await.unwrap_err();
        assert_eq!(status_of(err), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn health_reports_ok() {
        let Json(response) = health().await;
        assert_eq!(response.status, "ok");
    }
}
