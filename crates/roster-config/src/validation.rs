//! Configuration validation, run once after loading and before any connection is opened.

use crate::{AppConfig, CacheConfig, DatabaseConfig, ObservabilityConfig, RedisConfig, ServerConfig};
use thiserror::Error;
use url::Url;

/// Upper bound for either connection pool.
const MAX_POOL_SIZE: u32 = 1000;
const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
const LOG_FORMATS: [&str; 2] = ["pretty", "json"];

/// A single rejected configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("Invalid port for {name}: {value} (must be 1-65535)")]
    InvalidPort { name: String, value: u16 },

    #[error("Invalid pool size: min ({min}) and max ({max}) must satisfy 0 < max and min <= max")]
    InvalidPoolSize { min: u32, max: u32 },

    #[error("Pool size {value} exceeds maximum allowed ({maximum})")]
    PoolSizeTooLarge { value: u32, maximum: u32 },

    #[error("Invalid {url_type} URL: {message}")]
    InvalidUrl { url_type: String, message: String },

    #[error("Timeout '{name}' must be positive")]
    NonPositiveTimeout { name: String },

    #[error("Cache key cannot be empty")]
    EmptyCacheKey,

    #[error("Invalid log level: '{value}' (valid: trace, debug, info, warn, error)")]
    InvalidLogLevel { value: String },

    #[error("Invalid log format: '{value}' (valid: pretty, json)")]
    InvalidLogFormat { value: String },
}

impl ConfigValidationError {
    fn database_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url_type: "database".to_string(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Checks every section and collects all problems rather than stopping at the first.
    pub fn validate(config: &AppConfig) -> Result<(), Vec<ConfigValidationError>> {
        let mut errors = Vec::new();

        check_server(&config.server, &mut errors);
        check_database(&config.database, &mut errors);
        if config.redis.enabled {
            check_redis(&config.redis, &mut errors);
        }
        check_cache(&config.cache, &mut errors);
        check_observability(&config.observability, &mut errors);

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

fn check_server(server: &ServerConfig, errors: &mut Vec<ConfigValidationError>) {
    if server.port == 0 {
        errors.push(ConfigValidationError::InvalidPort {
            name: "server.port".to_string(),
            value: 0,
        });
    }
}

fn check_database(database: &DatabaseConfig, errors: &mut Vec<ConfigValidationError>) {
    if database.url.is_empty() {
        errors.push(ConfigValidationError::database_url("URL cannot be empty"));
    } else {
        match Url::parse(&database.url) {
            Ok(url) if matches!(url.scheme(), "postgres" | "postgresql") => {}
            Ok(url) => errors.push(ConfigValidationError::database_url(format!(
                "unsupported scheme '{}', expected postgres://",
                url.scheme()
            ))),
            Err(e) => errors.push(ConfigValidationError::database_url(e.to_string())),
        }
    }

    let (min, max) = (database.min_connections, database.max_connections);
    if max == 0 || min > max {
        errors.push(ConfigValidationError::InvalidPoolSize { min, max });
    } else if max > MAX_POOL_SIZE {
        errors.push(ConfigValidationError::PoolSizeTooLarge {
            value: max,
            maximum: MAX_POOL_SIZE,
        });
    }

    if database.connect_timeout_secs == 0 {
        errors.push(ConfigValidationError::NonPositiveTimeout {
            name: "database.connect_timeout_secs".to_string(),
        });
    }
}

fn check_redis(redis: &RedisConfig, errors: &mut Vec<ConfigValidationError>) {
    if redis.port == 0 {
        errors.push(ConfigValidationError::InvalidPort {
            name: "redis.port".to_string(),
            value: 0,
        });
    }
    if Url::parse(&redis.address()).is_err() {
        errors.push(ConfigValidationError::InvalidUrl {
            url_type: "redis".to_string(),
            message: format!("cannot build a URL from host '{}'", redis.host),
        });
    }

    let size = u32::try_from(redis.pool_size).unwrap_or(u32::MAX);
    if size == 0 {
        errors.push(ConfigValidationError::InvalidPoolSize { min: 0, max: 0 });
    } else if size > MAX_POOL_SIZE {
        errors.push(ConfigValidationError::PoolSizeTooLarge {
            value: size,
            maximum: MAX_POOL_SIZE,
        });
    }
}

fn check_cache(cache: &CacheConfig, errors: &mut Vec<ConfigValidationError>) {
    if cache.key.trim().is_empty() {
        errors.push(ConfigValidationError::EmptyCacheKey);
    }
}

fn check_observability(observability: &ObservabilityConfig, errors: &mut Vec<ConfigValidationError>) {
    if !LOG_LEVELS.contains(&observability.log_level.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidLogLevel {
            value: observability.log_level.clone(),
        });
    }
    if !LOG_FORMATS.contains(&observability.log_format.to_lowercase().as_str()) {
        errors.push(ConfigValidationError::InvalidLogFormat {
            value: observability.log_format.clone(),
        });
    }
}

/// Formats validation errors for display.
pub fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .enumerate()
        .fold(String::from("Configuration validation failed:\n"), |mut out, (i, error)| {
            out.push_str(&format!("  {}. {}\n", i + 1, error));
            out
        })
}
