use crate::app_config::AppConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
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
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the real environment so it can be tested with a plain
/// `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
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

    let parse_radius = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if value.is_finite() && value > 0.0 {
            Ok(value)
        } else {
            Err(invalid(var, format!("must be a positive number, got {value}")))
        }
    };

    let api_base_url = or_default("PRIXLOC_API_BASE_URL", "http://localhost:8000");
    if !(api_base_url.starts_with("http://") || api_base_url.starts_with("https://")) {
        return Err(invalid(
            "PRIXLOC_API_BASE_URL",
            format!("expected an http(s) URL, got '{api_base_url}'"),
        ));
    }

    let api_token = lookup("PRIXLOC_API_TOKEN")
        .ok()
        .filter(|t| !t.trim().is_empty());
    let log_level = or_default("PRIXLOC_LOG_LEVEL", "info");
    let request_timeout_secs = parse_u64("PRIXLOC_REQUEST_TIMEOUT_SECS", "30")?;
    let user_agent = or_default("PRIXLOC_USER_AGENT", "prixloc/0.1 (nearby-stores)");
    let default_radius_km = parse_radius("PRIXLOC_DEFAULT_RADIUS_KM", "10")?;

    let max_results = match lookup("PRIXLOC_MAX_RESULTS") {
        Ok(raw) => Some(
            raw.parse::<u32>()
                .map_err(|e| invalid("PRIXLOC_MAX_RESULTS", e.to_string()))?,
        ),
        Err(_) => None,
    };

    let sensor_timeout_secs = parse_u64("PRIXLOC_SENSOR_TIMEOUT_SECS", "10")?;
    let sensor_max_age_secs = parse_u64("PRIXLOC_SENSOR_MAX_AGE_SECS", "60")?;
    let map_poll_interval_ms = parse_u64("PRIXLOC_MAP_POLL_INTERVAL_MS", "400")?;
    let map_poll_max_attempts = parse_u32("PRIXLOC_MAP_POLL_MAX_ATTEMPTS", "50")?;

    Ok(AppConfig {
        api_base_url,
        api_token,
        log_level,
        request_timeout_secs,
        user_agent,
        default_radius_km,
        max_results,
        sensor_timeout_secs,
        sensor_max_age_secs,
        map_poll_interval_ms,
        map_poll_max_attempts,
    })
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
