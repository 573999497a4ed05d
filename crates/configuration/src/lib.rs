use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    ChainSettings, Config, EngineSettings, LogRotation, LoggingSettings, ServerSettings,
    StrategySettings,
};

/// Environment variables override file values, e.g. `OPTILAB__ENGINE__SEED=7`.
const ENV_PREFIX: &str = "OPTILAB";

/// Loads the application configuration from an optional `config.toml` in the working
/// directory, layered under environment overrides.
///
/// Every field has a default, so a missing file yields a fully usable configuration.
/// The result is validated before it is returned.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(Path::new("config.toml"))
}

/// Same as [`load_config`] but reads the file at `path` (which may be absent).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let builder = config::Config::builder()
        .add_source(config::File::from(path).required(false))
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    finish(builder)
}

fn finish(raw: config::Config) -> Result<Config, ConfigError> {
    let config = raw.try_deserialize::<Config>()?;
    config.validate()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    fn parse(toml: &str) -> Result<Config, ConfigError> {
        let raw = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        finish(raw)
    }

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse("").unwrap();
        assert_eq!(config.engine.seed, 42);
        assert_eq!(config.engine.risk_free_rate, 0.05);
        assert_eq!(config.chain.strikes_per_side, 10);
        assert_eq!(config.strategy.default_num_points, 100);
        assert_eq!(config.strategy.default_price_range_pct, dec!(0.20));
        assert_eq!(config.server.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn file_values_override_defaults() {
        let config = parse(
            r#"
            [engine]
            seed = 7
            risk_free_rate = 0.03

            [server]
            port = 8080
            request_timeout = "5s"

            [logging]
            level = "debug"
            rotation = "hourly"
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.seed, 7);
        assert_eq!(config.engine.risk_free_rate, 0.03);
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.request_timeout, Duration::from_secs(5));
        assert_eq!(config.logging.rotation, LogRotation::Hourly);
        // Untouched sections keep their defaults.
        assert_eq!(config.chain.weekly_horizon_days, 45);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = parse("[strategy]\ndefault_num_points = 1").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));

        let err = parse("[engine]\natm_tolerance_pct = -0.1").unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError(_)));
    }

    #[test]
    fn missing_file_is_not_an_error() {
        let config = load_config_from(Path::new("does-not-exist.toml")).unwrap();
        assert!(config.chain.base_volume > 0.0);
    }
}
