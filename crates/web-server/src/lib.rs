use analytics::StrategyEvaluator;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use configuration::Config;
use market_data::PriceResolver;
use pricing::GreeksEstimator;
use screener::ScreeningService;
use std::sync::Arc;
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

pub mod error;
pub mod handlers;

use error::AppError;

/// Request bodies are small JSON documents.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// The shared application state that all handlers can access.
pub struct AppState {
    pub config: Config,
    pub resolver: PriceResolver,
    pub estimator: GreeksEstimator,
    pub screener: ScreeningService,
    pub evaluator: StrategyEvaluator,
}

impl AppState {
    pub fn new(config: Config, resolver: PriceResolver) -> Result<Self, AppError> {
        let estimator = GreeksEstimator::new(config.engine.risk_free_rate)?;
        Ok(Self {
            screener: ScreeningService::new(&config, resolver.clone())?,
            evaluator: StrategyEvaluator::new(estimator, config.strategy.clone()),
            estimator,
            resolver,
            config,
        })
    }
}

/// Builds the application router with CORS, request tracing and the request timeout.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::any())
        .allow_methods(Any)
        .allow_headers(AllowHeaders::any());
    let timeout = state.config.server.request_timeout;

    Router::new()
        .route("/api/health", get(handlers::health))
        .route("/api/screen", post(handlers::screen))
        .route("/api/chain", post(handlers::chain))
        .route("/api/strategy/evaluate", post(handlers::evaluate_strategy))
        .route("/api/pricing/greeks", post(handlers::greeks))
        .route("/api/pricing/implied-volatility", post(handlers::implied_volatility))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
}

/// Binds the configured address and serves until Ctrl-C.
///
/// Tracing must already be initialized by the caller.
pub async fn run_server(config: Config, resolver: PriceResolver) -> anyhow::Result<()> {
    let addr = config.server.socket_addr()?;
    let live_quotes = resolver.has_live_source();
    let state = Arc::new(AppState::new(config, resolver)?);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, live_quotes, "Web server listening.");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("Web server stopped.");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for the shutdown signal.");
    }
}
