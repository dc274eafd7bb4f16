#[derive(Clone)]
pub struct AppConfig {
    pub api_base_url: String,
    pub api_token: Option<String>,
    pub log_level: String,
    /// HTTP request timeout. `0` leaves requests unbounded.
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub default_radius_km: f64,
    pub max_results: Option<u32>,
    pub sensor_timeout_secs: u64,
    pub sensor_max_age_secs: u64,
    pub map_poll_interval_ms: u64,
    pub map_poll_max_attempts: u32,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_base_url", &self.api_base_url)
            .field("api_token", &self.api_token.as_ref().map(|_| "[redacted]"))
            .field("log_level", &self.log_level)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("default_radius_km", &self.default_radius_km)
            .field("max_results", &self.max_results)
            .field("sensor_timeout_secs", &self.sensor_timeout_secs)
            .field("sensor_max_age_secs", &self.sensor_max_age_secs)
            .field("map_poll_interval_ms", &self.map_poll_interval_ms)
            .field("map_poll_max_attempts", &self.map_poll_max_attempts)
            .finish()
    }
}
