mod app_config;
mod config;
pub mod types;

pub use app_config::AppConfig;
pub use config::{load_app_config, load_app_config_from_env};
pub use types::{
    LocationUpdate, NearbyResponse, NumericValue, Position, SearchParameters, StoreResult,
    TravelMode, DEFAULT_RADIUS_KM,
};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}
