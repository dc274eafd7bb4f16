use std::collections::HashMap;
use std::env::VarError;

use super::*;

fn lookup_from_map<'a>(
    map: &'a HashMap<&'a str, &'a str>,
) -> impl Fn(&str) -> Result<String, VarError> + 'a {
    move |key| {
        map.get(key)
            .map(|v| (*v).to_string())
            .ok_or(VarError::NotPresent)
    }
}

#[test]
fn build_app_config_uses_defaults_with_empty_env() {
    let map: HashMap<&str, &str> = HashMap::new();
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "http://localhost:8000");
    assert!(cfg.api_token.is_none());
    assert_eq!(cfg.log_level, "info");
    assert_eq!(cfg.request_timeout_secs, 30);
    assert_eq!(cfg.user_agent, "prixloc/0.1 (nearby-stores)");
    assert!((cfg.default_radius_km - 10.0).abs() < f64::EPSILON);
    assert!(cfg.max_results.is_none());
    assert_eq!(cfg.sensor_timeout_secs, 10);
    assert_eq!(cfg.sensor_max_age_secs, 60);
    assert_eq!(cfg.map_poll_interval_ms, 400);
    assert_eq!(cfg.map_poll_max_attempts, 50);
}

#[test]
fn build_app_config_reads_overrides() {
    let mut map = HashMap::new();
    map.insert("PRIXLOC_API_BASE_URL", "https://prix.example.ga");
    map.insert("PRIXLOC_API_TOKEN", "secret-token");
    map.insert("PRIXLOC_DEFAULT_RADIUS_KM", "2.5");
    map.insert("PRIXLOC_MAX_RESULTS", "20");
    map.insert("PRIXLOC_REQUEST_TIMEOUT_SECS", "0");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert_eq!(cfg.api_base_url, "https://prix.example.ga");
    assert_eq!(cfg.api_token.as_deref(), Some("secret-token"));
    assert!((cfg.default_radius_km - 2.5).abs() < f64::EPSILON);
    assert_eq!(cfg.max_results, Some(20));
    assert_eq!(cfg.request_timeout_secs, 0);
}

#[test]
fn blank_api_token_is_treated_as_absent() {
    let mut map = HashMap::new();
    map.insert("PRIXLOC_API_TOKEN", "   ");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    assert!(cfg.api_token.is_none());
}

#[test]
fn build_app_config_rejects_non_http_base_url() {
    let mut map = HashMap::new();
    map.insert("PRIXLOC_API_BASE_URL", "ftp://prix.example.ga");
    let result = build_app_config(lookup_from_map(&map));
    assert!(
        matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRIXLOC_API_BASE_URL"),
        "expected InvalidEnvVar(PRIXLOC_API_BASE_URL), got: {result:?}"
    );
}

#[test]
fn build_app_config_rejects_non_positive_radius() {
    for raw in ["0", "-1", "abc"] {
        let mut map = HashMap::new();
        map.insert("PRIXLOC_DEFAULT_RADIUS_KM", raw);
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "PRIXLOC_DEFAULT_RADIUS_KM"),
            "expected InvalidEnvVar(PRIXLOC_DEFAULT_RADIUS_KM) for {raw}, got: {result:?}"
        );
    }
}

#[test]
fn build_app_config_rejects_invalid_numbers() {
    for var in [
        "PRIXLOC_REQUEST_TIMEOUT_SECS",
        "PRIXLOC_MAX_RESULTS",
        "PRIXLOC_SENSOR_TIMEOUT_SECS",
        "PRIXLOC_SENSOR_MAX_AGE_SECS",
        "PRIXLOC_MAP_POLL_INTERVAL_MS",
        "PRIXLOC_MAP_POLL_MAX_ATTEMPTS",
    ] {
        let mut map = HashMap::new();
        map.insert(var, "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { var: ref v, .. }) if v == var),
            "expected InvalidEnvVar({var}), got: {result:?}"
        );
    }
}

#[test]
fn debug_output_redacts_api_token() {
    let mut map = HashMap::new();
    map.insert("PRIXLOC_API_TOKEN", "secret-token");
    let cfg = build_app_config(lookup_from_map(&map)).unwrap();
    let rendered = format!("{cfg:?}");
    assert!(!rendered.contains("secret-token"));
    assert!(rendered.contains("[redacted]"));
}

#[test]
fn config_errors_always_name_the_offending_variable() {
    let mut map = HashMap::new();
    map.insert("PRIXLOC_SENSOR_MAX_AGE_SECS", "soon");
    let err = build_app_config(lookup_from_map(&map)).unwrap_err();
    match err {
        ConfigError::InvalidEnvVar { var, reason } => {
            assert_eq!(var, "PRIXLOC_SENSOR_MAX_AGE_SECS");
            assert!(!reason.is_empty());
        }
    }
}
