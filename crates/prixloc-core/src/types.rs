//! Wire and domain types shared by the locator and its front-ends.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Radius used when the caller supplies none (or an unusable one).
pub const DEFAULT_RADIUS_KM: f64 = 10.0;

/// A geographic point. Both coordinates are always finite.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

impl Position {
    /// Returns `None` unless both coordinates are finite numbers.
    #[must_use]
    pub fn new(latitude: f64, longitude: f64) -> Option<Self> {
        (latitude.is_finite() && longitude.is_finite()).then_some(Self {
            latitude,
            longitude,
        })
    }

    /// Parses a pair of raw text inputs (e.g. manual latitude/longitude fields).
    ///
    /// Surrounding whitespace is ignored. Empty, non-numeric, `NaN` and
    /// infinite values yield `None`.
    #[must_use]
    pub fn parse(latitude: &str, longitude: &str) -> Option<Self> {
        let lat = latitude.trim().parse::<f64>().ok()?;
        let lng = longitude.trim().parse::<f64>().ok()?;
        Self::new(lat, lng)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// Transport mode forwarded to the backend (duration estimates) and to
/// directions links.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TravelMode {
    #[default]
    Driving,
    Walking,
    Bicycling,
    Transit,
}

impl TravelMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Walking => "walking",
            TravelMode::Bicycling => "bicycling",
            TravelMode::Transit => "transit",
        }
    }

    /// Parses a selector value, falling back to [`TravelMode::Driving`] for
    /// anything unrecognised.
    #[must_use]
    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TravelMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "driving" => Ok(TravelMode::Driving),
            "walking" => Ok(TravelMode::Walking),
            "bicycling" => Ok(TravelMode::Bicycling),
            "transit" => Ok(TravelMode::Transit),
            other => Err(format!("unknown travel mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchParameters {
    pub position: Position,
    pub radius_km: f64,
    pub travel_mode: TravelMode,
}

impl SearchParameters {
    /// Parameters with the default radius and travel mode.
    #[must_use]
    pub fn new(position: Position) -> Self {
        Self {
            position,
            radius_km: DEFAULT_RADIUS_KM,
            travel_mode: TravelMode::default(),
        }
    }

    /// Parameters built from raw selector values.
    ///
    /// The radius falls back to `default_radius_km` when missing, unparseable,
    /// non-finite or not strictly positive.
    #[must_use]
    pub fn from_selectors(
        position: Position,
        radius: Option<&str>,
        mode: Option<&str>,
        default_radius_km: f64,
    ) -> Self {
        let radius_km = radius
            .and_then(|r| r.trim().parse::<f64>().ok())
            .filter(|r| r.is_finite() && *r > 0.0)
            .unwrap_or(default_radius_km);
        Self {
            position,
            radius_km,
            travel_mode: TravelMode::parse_or_default(mode),
        }
    }
}

/// A numeric field as the backend actually sends it: usually a JSON number,
/// sometimes a decimal string, occasionally something else entirely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum NumericValue {
    Number(f64),
    Text(String),
    Other(serde_json::Value),
}

impl NumericValue {
    /// The value as a finite float, if it is one or spells one.
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            NumericValue::Number(n) => *n,
            NumericValue::Text(s) => s.trim().parse::<f64>().ok()?,
            NumericValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }

    /// The value exactly as received, for display when it is not numeric.
    #[must_use]
    pub fn raw(&self) -> String {
        match self {
            NumericValue::Number(n) => n.to_string(),
            NumericValue::Text(s) => s.clone(),
            NumericValue::Other(v) => v.to_string(),
        }
    }
}

/// One store returned by the nearby-search endpoint.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StoreResult {
    pub id: i64,
    #[serde(rename = "nom", alias = "name", default)]
    pub name: Option<String>,
    #[serde(default)]
    pub latitude: Option<NumericValue>,
    #[serde(default)]
    pub longitude: Option<NumericValue>,
    #[serde(default)]
    pub distance_km: Option<NumericValue>,
    #[serde(default)]
    pub duration_min: Option<NumericValue>,
    #[serde(rename = "adresse", alias = "address", default)]
    pub address: Option<String>,
    #[serde(default)]
    pub rating: Option<NumericValue>,
    #[serde(default)]
    pub avg_price: Option<NumericValue>,
}

impl StoreResult {
    /// Name shown on cards and markers.
    #[must_use]
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(name) if !name.trim().is_empty() => name,
            _ => "Store",
        }
    }

    /// The store's position, when both coordinates are present and numeric.
    #[must_use]
    pub fn coordinates(&self) -> Option<Position> {
        let lat = self.latitude.as_ref()?.as_f64()?;
        let lng = self.longitude.as_ref()?.as_f64()?;
        Position::new(lat, lng)
    }
}

/// Envelope of the nearby-search endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NearbyResponse {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub results: Vec<StoreResult>,
    /// Query parameters echoed back by the backend. Informational only.
    #[serde(default)]
    pub params: Option<serde_json::Value>,
}

impl NearbyResponse {
    /// Backend-reported count, or the number of results when absent.
    #[must_use]
    pub fn result_count(&self) -> u64 {
        self.count.unwrap_or(self.results.len() as u64)
    }
}

/// Body of the user-profile "last location" write.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LocationUpdate {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(rename = "rayon_km")]
    pub radius_km: f64,
}

impl LocationUpdate {
    #[must_use]
    pub fn new(position: Position, radius_km: f64) -> Self {
        Self {
            latitude: position.latitude,
            longitude: position.longitude,
            radius_km,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn position_rejects_non_finite() {
        assert!(Position::new(f64::NAN, 9.45).is_none());
        assert!(Position::new(0.39, f64::INFINITY).is_none());
        assert!(Position::new(0.39, 9.45).is_some());
    }

    #[test]
    fn position_parse_handles_whitespace_and_garbage() {
        assert_eq!(
            Position::parse(" 0.39 ", "9.45"),
            Some(Position {
                latitude: 0.39,
                longitude: 9.45
            })
        );
        assert!(Position::parse("", "9.45").is_none());
        assert!(Position::parse("abc", "9.45").is_none());
        assert!(Position::parse("NaN", "9.45").is_none());
        assert!(Position::parse("inf", "9.45").is_none());
    }

    #[test]
    fn travel_mode_parses_known_values_case_insensitively() {
        assert_eq!("WALKING".parse::<TravelMode>(), Ok(TravelMode::Walking));
        assert_eq!("transit".parse::<TravelMode>(), Ok(TravelMode::Transit));
        assert!("flying".parse::<TravelMode>().is_err());
    }

    #[test]
    fn travel_mode_falls_back_to_driving() {
        assert_eq!(TravelMode::parse_or_default(None), TravelMode::Driving);
        assert_eq!(
            TravelMode::parse_or_default(Some("hovercraft")),
            TravelMode::Driving
        );
        assert_eq!(
            TravelMode::parse_or_default(Some("bicycling")),
            TravelMode::Bicycling
        );
    }

    #[test]
    fn selectors_fall_back_to_default_radius() {
        let pos = Position::new(0.39, 9.45).unwrap();
        for raw in [None, Some(""), Some("abc"), Some("0"), Some("-3"), Some("NaN")] {
            let params = SearchParameters::from_selectors(pos, raw, None, DEFAULT_RADIUS_KM);
            assert!(
                (params.radius_km - DEFAULT_RADIUS_KM).abs() < f64::EPSILON,
                "radius {raw:?} should fall back"
            );
        }
        let params = SearchParameters::from_selectors(pos, Some("25"), Some("walking"), 10.0);
        assert!((params.radius_km - 25.0).abs() < f64::EPSILON);
        assert_eq!(params.travel_mode, TravelMode::Walking);
    }

    #[test]
    fn store_result_accepts_decimal_strings_for_coordinates() {
        let store: StoreResult = serde_json::from_value(serde_json::json!({
            "id": 7,
            "nom": "Mbolo",
            "latitude": "0.400000",
            "longitude": 9.46,
            "distance_km": "n/a",
            "rating": true
        }))
        .unwrap();
        assert_eq!(
            store.coordinates(),
            Some(Position {
                latitude: 0.4,
                longitude: 9.46
            })
        );
        assert_eq!(store.distance_km.as_ref().and_then(NumericValue::as_f64), None);
        assert_eq!(store.distance_km.as_ref().map(NumericValue::raw), Some("n/a".to_owned()));
        assert_eq!(store.rating.as_ref().map(NumericValue::raw), Some("true".to_owned()));
    }

    #[test]
    fn store_result_without_coordinates_has_none() {
        let store: StoreResult =
            serde_json::from_value(serde_json::json!({ "id": 1, "latitude": null })).unwrap();
        assert!(store.coordinates().is_none());
        assert_eq!(store.display_name(), "Store");
    }

    #[test]
    fn nearby_response_count_falls_back_to_len() {
        let resp: NearbyResponse = serde_json::from_value(serde_json::json!({
            "results": [{ "id": 1 }, { "id": 2 }]
        }))
        .unwrap();
        assert_eq!(resp.result_count(), 2);
    }

    #[test]
    fn location_update_serializes_backend_field_names() {
        let pos = Position::new(0.39, 9.45).unwrap();
        let body = serde_json::to_value(LocationUpdate::new(pos, 10.0)).unwrap();
        assert_eq!(
            body,
            serde_json::json!({ "latitude": 0.39, "longitude": 9.45, "rayon_km": 10.0 })
        );
    }
}
