//! HTTP client for the price-comparison backend's nearby-stores endpoints.
//!
//! Two calls: the live nearby search (never served from a cache) and the
//! best-effort "last location" write on the user profile.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use prixloc_core::{AppConfig, LocationUpdate, NearbyResponse, Position, SearchParameters};
use reqwest::header::{ACCEPT, CACHE_CONTROL, PRAGMA};
use reqwest::{Client, Url};

use crate::error::LocatorError;

pub const NEARBY_PATH: &str = "api/magasins/magasins/proximite/";
pub const UPDATE_LOCATION_PATH: &str = "api/utilisateurs/utilisateurs/update_location/";

/// Client for the nearby-search and location-persist endpoints.
///
/// Cheap to clone; clones share the connection pool and nonce sequence.
#[derive(Clone)]
pub struct NearbyClient {
    client: Client,
    nearby_url: Url,
    update_location_url: Url,
    api_token: Option<String>,
    max_results: Option<u32>,
    nonce_seq: Arc<AtomicU64>,
}

impl NearbyClient {
    /// Creates a client from application configuration.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LocatorError::InvalidBaseUrl`] if the
    /// configured base URL does not parse.
    pub fn new(config: &AppConfig) -> Result<Self, LocatorError> {
        Ok(Self::with_base_url(
            &config.api_base_url,
            config.request_timeout_secs,
            &config.user_agent,
        )?
        .with_api_token(config.api_token.clone())
        .with_max_results(config.max_results))
    }

    /// Creates a client against an explicit base URL (for testing with wiremock).
    ///
    /// A `timeout_secs` of `0` leaves requests without an overall timeout.
    ///
    /// # Errors
    ///
    /// Returns [`LocatorError::Transport`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`LocatorError::InvalidBaseUrl`] if
    /// `base_url` is not a valid URL.
    pub fn with_base_url(
        base_url: &str,
        timeout_secs: u64,
        user_agent: &str,
    ) -> Result<Self, LocatorError> {
        let mut builder = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent);
        if timeout_secs > 0 {
            builder = builder.timeout(Duration::from_secs(timeout_secs));
        }
        let client = builder.build()?;

        // Exactly one trailing slash so `join` appends below any path prefix
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let invalid = |reason: String| LocatorError::InvalidBaseUrl {
            base_url: base_url.to_owned(),
            reason,
        };
        let base = Url::parse(&normalised).map_err(|e| invalid(e.to_string()))?;
        let nearby_url = base
            .join(NEARBY_PATH)
            .map_err(|e| invalid(e.to_string()))?;
        let update_location_url = base
            .join(UPDATE_LOCATION_PATH)
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Self {
            client,
            nearby_url,
            update_location_url,
            api_token: None,
            max_results: None,
            nonce_seq: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Bearer token sent with profile writes.
    #[must_use]
    pub fn with_api_token(mut self, api_token: Option<String>) -> Self {
        self.api_token = api_token;
        self
    }

    /// Optional `max_results` forwarded with every search.
    #[must_use]
    pub fn with_max_results(mut self, max_results: Option<u32>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Queries stores near `params.position`, in the order the backend ranks them.
    ///
    /// Every request carries a fresh `cb` nonce and no-cache headers so that no
    /// intermediary can answer with a stale result.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::HttpStatus`] when the backend answers with a non-2xx status.
    /// - [`LocatorError::Transport`] when the backend cannot be reached.
    /// - [`LocatorError::Deserialize`] when the body is not the expected envelope.
    pub async fn search(&self, params: &SearchParameters) -> Result<NearbyResponse, LocatorError> {
        let url = self.build_search_url(params, &self.next_nonce());
        tracing::debug!(url = %url, "fetching nearby stores");

        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, "application/json")
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        let parsed: NearbyResponse =
            serde_json::from_str(&body).map_err(|e| LocatorError::Deserialize {
                context: url.to_string(),
                source: e,
            })?;

        tracing::debug!(
            count = parsed.result_count(),
            returned = parsed.results.len(),
            "nearby stores received"
        );
        Ok(parsed)
    }

    /// Stores the last searched location on the caller's profile.
    ///
    /// The response body is ignored.
    ///
    /// # Errors
    ///
    /// - [`LocatorError::HttpStatus`] on a non-2xx status (typically 401/403
    ///   for anonymous callers).
    /// - [`LocatorError::Transport`] when the backend cannot be reached.
    pub async fn persist_last_location(
        &self,
        position: Position,
        radius_km: f64,
    ) -> Result<(), LocatorError> {
        let mut request = self
            .client
            .post(self.update_location_url.clone())
            .json(&LocationUpdate::new(position, radius_km));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::HttpStatus {
                status: status.as_u16(),
                url: self.update_location_url.to_string(),
            });
        }
        Ok(())
    }

    /// Builds the nearby-search URL with percent-encoded query parameters.
    pub(crate) fn build_search_url(&self, params: &SearchParameters, nonce: &str) -> Url {
        let mut url = self.nearby_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("lat", &params.position.latitude.to_string());
            pairs.append_pair("lng", &params.position.longitude.to_string());
            pairs.append_pair("rayon_km", &params.radius_km.to_string());
            pairs.append_pair("mode", params.travel_mode.as_str());
            if let Some(max) = self.max_results {
                pairs.append_pair("max_results", &max.to_string());
            }
            pairs.append_pair("cb", nonce);
        }
        url
    }

    /// Millisecond timestamp plus a per-client sequence, unique even for two
    /// searches issued within the same millisecond.
    fn next_nonce(&self) -> String {
        let seq = self.nonce_seq.fetch_add(1, Ordering::Relaxed);
        format!("{}-{seq}", chrono::Utc::now().timestamp_millis())
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;
