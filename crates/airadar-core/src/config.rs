use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

const PROVIDER_OPENAI: &str = "openai";
const PROVIDER_ANTHROPIC: &str = "anthropic";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if required env vars are missing or values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Pure parsing/validation, decoupled from the process environment so it can
/// be tested with a `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let require = |var: &str| -> Result<String, ConfigError> {
        lookup(var).map_err(|_| ConfigError::MissingEnvVar(var.to_string()))
    };

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        or_default(var, default)
            .parse::<SocketAddr>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u32 = |var: &str, default: &str| -> Result<u32, ConfigError> {
        or_default(var, default)
            .parse::<u32>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_f64 = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(var, format!("must be a non-negative number, got {value}")));
        }
        Ok(value)
    };

    let database_url = require("DATABASE_URL")?;
    let env = parse_environment(&or_default("AIRADAR_ENV", "development"))?;
    let bind_addr = parse_addr("AIRADAR_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("AIRADAR_LOG_LEVEL", "info");

    let db_max_connections = parse_u32("AIRADAR_DB_MAX_CONNECTIONS", "10")?;
    let db_min_connections = parse_u32("AIRADAR_DB_MIN_CONNECTIONS", "1")?;
    let db_acquire_timeout_secs = parse_u64("AIRADAR_DB_ACQUIRE_TIMEOUT_SECS", "10")?;

    let trend_cron = or_default("AIRADAR_TREND_CRON", "0 */30 * * * *");
    let trend_velocity_weight = parse_f64("AIRADAR_TREND_VELOCITY_WEIGHT", "0.3")?;
    let trend_cross_source_weight = parse_f64("AIRADAR_TREND_CROSS_SOURCE_WEIGHT", "0.5")?;
    let trend_absolute_weight = parse_f64("AIRADAR_TREND_ABSOLUTE_WEIGHT", "0.2")?;
    let trend_min_score = parse_f64("AIRADAR_TREND_MIN_SCORE", "30")?;

    let (llm_provider, llm_api_key) = resolve_llm_credentials(
        optional("AIRADAR_LLM_PROVIDER"),
        optional("OPENAI_API_KEY"),
        optional("ANTHROPIC_API_KEY"),
    )?;
    let llm_model = optional("AIRADAR_LLM_MODEL");
    let llm_base_url = optional("AIRADAR_LLM_BASE_URL");
    let llm_min_score = parse_f64("AIRADAR_LLM_MIN_SCORE", "6")?;
    let llm_timeout_secs = parse_u64("AIRADAR_LLM_TIMEOUT_SECS", "60")?;

    let api_keys = parse_api_keys(&or_default("AIRADAR_API_KEYS", ""));
    if api_keys.is_empty() && env != Environment::Development {
        return Err(ConfigError::MissingEnvVar("AIRADAR_API_KEYS".to_string()));
    }

    Ok(AppConfig {
        database_url,
        env,
        bind_addr,
        log_level,
        db_max_connections,
        db_min_connections,
        db_acquire_timeout_secs,
        trend_cron,
        trend_velocity_weight,
        trend_cross_source_weight,
        trend_absolute_weight,
        trend_min_score,
        llm_provider,
        llm_api_key,
        llm_model,
        llm_base_url,
        llm_min_score,
        llm_timeout_secs,
        api_keys,
    })
}

/// Split a comma-separated key list, dropping blanks and duplicates.
fn parse_api_keys(raw: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for key in raw.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Pick the LLM provider and the matching key.
///
/// An explicit provider uses that provider's key. Without one, the presence of
/// a key selects the provider; `ANTHROPIC_API_KEY` wins when both are set.
fn resolve_llm_credentials(
    provider: Option<String>,
    openai_key: Option<String>,
    anthropic_key: Option<String>,
) -> Result<(Option<String>, Option<String>), ConfigError> {
    match provider.as_deref() {
        Some(PROVIDER_OPENAI) => Ok((provider, openai_key)),
        Some(PROVIDER_ANTHROPIC) => Ok((provider, anthropic_key)),
        Some(other) => Err(ConfigError::InvalidEnvVar {
            var: "AIRADAR_LLM_PROVIDER".to_string(),
            reason: format!("expected openai or anthropic, got {other}"),
        }),
        None => match (anthropic_key, openai_key) {
            (Some(key), _) => Ok((Some(PROVIDER_ANTHROPIC.to_string()), Some(key))),
            (None, Some(key)) => Ok((Some(PROVIDER_OPENAI.to_string()), Some(key))),
            (None, None) => Ok((None, None)),
        },
    }
}

/// Parse a string into an `Environment` variant.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "AIRADAR_ENV".to_string(),
            reason: format!("expected development, test, or production, got {other}"),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
