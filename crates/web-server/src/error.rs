use analytics::AnalyticsError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use configuration::ConfigError;
use core_types::CoreError;
use pricing::PricingError;
use screener::ScreenerError;
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Screener(#[from] ScreenerError),
    #[error(transparent)]
    Analytics(#[from] AnalyticsError),
    #[error(transparent)]
    Pricing(#[from] PricingError),
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("Worker task failed: {0}")]
    Worker(#[from] tokio::task::JoinError),
}

impl AppError {
    fn validation(&self) -> Option<&CoreError> {
        match self {
            AppError::Screener(e) => e.validation(),
            AppError::Analytics(e) => e.validation(),
            AppError::Pricing(PricingError::Validation(e)) => Some(e),
            _ => None,
        }
    }
}

/// Converts our custom `AppError` into an HTTP response.
///
/// Input problems become `400 { error, reason }` with a stable `reason` code; anything
/// else is logged and reported as a 500 without internal detail.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message, reason) = if let Some(invalid) = self.validation() {
            (StatusCode::BAD_REQUEST, invalid.to_string(), invalid.reason())
        } else {
            match &self {
                AppError::Pricing(PricingError::OutsideArbitrageBounds { .. }) => {
                    (StatusCode::BAD_REQUEST, self.to_string(), "outside_arbitrage_bounds")
                }
                AppError::Pricing(PricingError::NotConverged(_)) => {
                    (StatusCode::UNPROCESSABLE_ENTITY, self.to_string(), "not_converged")
                }
                _ => {
                    tracing::error!(error = ?self, "Request failed.");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "An internal error occurred".to_string(),
                        "internal",
                    )
                }
            }
        };

        if status.is_client_error() {
            tracing::debug!(%reason, %message, "Rejected request.");
        }
        let body = Json(json!({ "error": message, "reason": reason }));
        (status, body).into_response()
    }
}
