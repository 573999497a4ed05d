use crate::error::ConfigError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// The root configuration structure for the entire application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSettings,
    #[serde(default)]
    pub chain: ChainSettings,
    #[serde(default)]
    pub strategy: StrategySettings,
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Parameters shared by every engine component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Continuously compounded risk-free rate used in `d1`. 0.05 is 5%.
    pub risk_free_rate: f64,
    /// Seed of the synthetic liquidity generator. Requests may override it.
    pub seed: u64,
    /// Relative strike/spot distance treated as at the money (0.005 is 0.5%).
    pub atm_tolerance_pct: Decimal,
}

/// Parameters of the expiration schedule and contract universe generators.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChainSettings {
    /// Strikes generated on each side of the centre strike.
    pub strikes_per_side: usize,
    /// Weekly Friday expirations are listed up to this many days out.
    pub weekly_horizon_days: u32,
    /// Largest DTE a request may ask for.
    pub max_dte: u32,
    /// Synthetic volume of an at-the-money, near-dated contract.
    pub base_volume: f64,
    /// Exponential liquidity decay per strike step away from spot.
    pub volume_decay: f64,
    /// Curvature of the volatility smile in log-moneyness.
    pub smile_coefficient: f64,
    /// Quoted spread as a fraction of the theoretical price.
    pub spread_pct: Decimal,
    /// Minimum quoted spread.
    pub min_tick: Decimal,
}

/// Defaults and limits for multi-leg strategy evaluation.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StrategySettings {
    /// Half-width of the price sweep as a fraction of spot.
    pub default_price_range_pct: Decimal,
    pub default_num_points: usize,
    pub max_num_points: usize,
    /// Time to expiration assumed for the Greeks snapshot when a request gives none.
    pub default_days_to_expiration: u32,
    /// Volatility for the Greeks snapshot when neither the request nor a symbol supplies one.
    pub default_volatility: f64,
    /// Every n-th grid point gets a Greeks sample.
    pub greeks_sample_stride: usize,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    /// Wall-clock budget for a single request, e.g. "30s".
    #[serde(with = "humantime_serde")]
    pub request_timeout: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogRotation {
    Minutely,
    Hourly,
    Daily,
    Never,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// An `EnvFilter` directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    /// When set, logs are also written to rolling files in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
    pub rotation: LogRotation,
}

// --- Default Implementations ---

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            risk_free_rate: 0.05,
            seed: 42,
            atm_tolerance_pct: dec!(0.005),
        }
    }
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            strikes_per_side: 10,
            weekly_horizon_days: 45,
            max_dte: 730,
            base_volume: 5_000.0,
            volume_decay: 0.35,
            smile_coefficient: 0.8,
            spread_pct: dec!(0.04),
            min_tick: dec!(0.05),
        }
    }
}

impl Default for StrategySettings {
    fn default() -> Self {
        Self {
            default_price_range_pct: dec!(0.20),
            default_num_points: 100,
            max_num_points: 2_000,
            default_days_to_expiration: 30,
            default_volatility: 0.25,
            greeks_sample_stride: 10,
        }
    }
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
            file_prefix: "optilab.log".to_string(),
            rotation: LogRotation::Daily,
        }
    }
}

impl ServerSettings {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| ConfigError::ValidationError(format!("invalid server address: {}", e)))
    }
}

impl Config {
    /// Checks cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: &str| Err(ConfigError::ValidationError(msg.to_string()));

        if !self.engine.risk_free_rate.is_finite() {
            return fail("engine.risk_free_rate must be finite");
        }
        if self.engine.atm_tolerance_pct < Decimal::ZERO {
            return fail("engine.atm_tolerance_pct must not be negative");
        }
        if self.chain.strikes_per_side == 0 {
            return fail("chain.strikes_per_side must be at least 1");
        }
        if !(self.chain.base_volume > 0.0) || !(self.chain.volume_decay >= 0.0) {
            return fail("chain.base_volume must be positive and chain.volume_decay non-negative");
        }
        if !(self.chain.smile_coefficient >= 0.0) {
            return fail("chain.smile_coefficient must not be negative");
        }
        if self.chain.spread_pct < Decimal::ZERO || self.chain.min_tick <= Decimal::ZERO {
            return fail("chain.spread_pct must be non-negative and chain.min_tick positive");
        }
        let range = self.strategy.default_price_range_pct;
        if range <= Decimal::ZERO || range >= Decimal::ONE {
            return fail("strategy.default_price_range_pct must be between 0 and 1");
        }
        if self.strategy.default_num_points < 2
            || self.strategy.default_num_points > self.strategy.max_num_points
        {
            return fail("strategy.default_num_points must be in [2, max_num_points]");
        }
        if self.strategy.greeks_sample_stride == 0 {
            return fail("strategy.greeks_sample_stride must be at least 1");
        }
        if !(self.strategy.default_volatility.is_finite() && self.strategy.default_volatility > 0.0) {
            return fail("strategy.default_volatility must be positive");
        }
        if self.strategy.default_days_to_expiration == 0 {
            return fail("strategy.default_days_to_expiration must be at least 1");
        }
        Ok(())
    }
}
