//! Configuration loader with layered sources.

use crate::{AppConfig, ConfigValidator, format_validation_errors};
use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use roster_core::RosterError;
use std::path::Path;
use tracing::{debug, info};

/// Snapshot of process environment variables.
pub type EnvVars = config::Map<String, String>;

/// Configuration loaded once at startup.
#[derive(Debug, Clone)]
pub struct ConfigLoader {
    config: AppConfig,
}

impl ConfigLoader {
    /// Creates a new configuration loader.
    ///
    /// Configuration is loaded from multiple sources in order:
    /// 1. `config/default.toml` - Default values
    /// 2. `config/{environment}.toml` - Environment-specific overrides
    /// 3. `config/local.toml` - Local overrides
    /// 4. Environment variables with `ROSTER__` prefix
    /// 5. `DATABASE_URL`, `REDIS_HOST`, `REDIS_PORT`, `REDIS_PASSWORD`
    pub fn new(config_dir: &str) -> Result<Self, RosterError> {
        let config = Self::load_config(config_dir)?;
        Ok(Self { config })
    }

    /// Loads configuration from the default location (`./config`).
    pub fn from_default_location() -> Result<Self, RosterError> {
        Self::new("./config")
    }

    /// Returns the loaded configuration.
    #[must_use]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Consumes the loader, returning the configuration.
    #[must_use]
    pub fn into_config(self) -> AppConfig {
        self.config
    }

    fn load_config(config_dir: &str) -> Result<AppConfig, RosterError> {
        // Load .env file if present
        if let Err(e) = dotenvy::dotenv() {
            debug!("No .env file found or error loading it: {}", e);
        }

        let env: EnvVars = std::env::vars().collect();
        Self::load_with_env(config_dir, &env)
    }

    /// Loads configuration from `config_dir`, reading environment variables
    /// from `env` instead of the process environment.
    pub fn load_with_env(config_dir: &str, env: &EnvVars) -> Result<AppConfig, RosterError> {
        let environment = env
            .get("ROSTER_ENVIRONMENT")
            .cloned()
            .unwrap_or_else(|| "development".to_string());

        info!("Loading configuration for environment: {}", environment);

        let mut builder = Config::builder()
            .set_default("app.environment", environment.clone())
            .map_err(config_error_to_roster_error)?;

        for name in ["default", environment.as_str(), "local"] {
            let path = format!("{}/{}.toml", config_dir, name);
            if Path::new(&path).exists() {
                debug!("Loading config from: {}", path);
                builder = builder.add_source(File::with_name(&path).required(false));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("ROSTER")
                .separator("__")
                .try_parsing(true)
                .source(Some(env.clone())),
        );

        builder = apply_legacy_env(builder, env)?;

        let app_config: AppConfig = builder
            .build()
            .and_then(|c| c.try_deserialize())
            .map_err(config_error_to_roster_error)?;

        Self::validate_config(&app_config)?;

        Ok(app_config)
    }

    fn validate_config(config: &AppConfig) -> Result<(), RosterError> {
        ConfigValidator::validate(config)
            .map_err(|errors| RosterError::Configuration(format_validation_errors(&errors)))
    }
}

/// Applies the unprefixed variables the service has always honored.
fn apply_legacy_env(
    builder: ConfigBuilder<DefaultState>,
    env: &EnvVars,
) -> Result<ConfigBuilder<DefaultState>, RosterError> {
    let redis_port = match env.get("REDIS_PORT") {
        Some(raw) => Some(raw.trim().parse::<u16>().map(i64::from).map_err(|e| {
            RosterError::Configuration(format!("REDIS_PORT '{}' is not a port: {}", raw, e))
        })?),
        None => None,
    };

    builder
        .set_override_option("database.url", env.get("DATABASE_URL").cloned())
        .and_then(|b| b.set_override_option("redis.host", env.get("REDIS_HOST").cloned()))
        .and_then(|b| b.set_override_option("redis.port", redis_port))
        .and_then(|b| b.set_override_option("redis.password", env.get("REDIS_PASSWORD").cloned()))
        .map_err(config_error_to_roster_error)
}

fn config_error_to_roster_error(err: ConfigError) -> RosterError {
    RosterError::Configuration(err.to_string())
}
