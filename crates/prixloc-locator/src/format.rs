//! Display formatting for store cards and marker info text.
//!
//! Every metric tolerates absence (nothing is rendered) and non-numeric
//! backend values (the raw text is shown instead).

use std::fmt;

use prixloc_core::{NumericValue, StoreResult, TravelMode};
use reqwest::Url;

const DIRECTIONS_BASE: &str = "https://www.google.com/maps/dir/";

fn format_metric(
    value: Option<&NumericValue>,
    fmt_number: impl Fn(f64) -> String,
) -> Option<String> {
    let value = value?;
    if let Some(n) = value.as_f64() {
        return Some(fmt_number(n));
    }
    match value {
        NumericValue::Text(raw) if !raw.trim().is_empty() => Some(raw.trim().to_owned()),
        _ => None,
    }
}

#[must_use]
pub fn format_distance(value: Option<&NumericValue>) -> Option<String> {
    format_metric(value, |km| format!("{km:.2} km"))
}

#[must_use]
pub fn format_duration(value: Option<&NumericValue>) -> Option<String> {
    format_metric(value, |min| format!("{min:.0} min"))
}

#[must_use]
pub fn format_rating(value: Option<&NumericValue>) -> Option<String> {
    format_metric(value, |r| format!("{r:.1}★"))
}

#[must_use]
pub fn format_avg_price(value: Option<&NumericValue>) -> Option<String> {
    format_metric(value, |p| format!("{p:.2}"))
}

/// Directions deep link to the store for the given travel mode.
///
/// `None` when the store has no usable coordinates.
#[must_use]
pub fn directions_url(store: &StoreResult, mode: TravelMode) -> Option<String> {
    let destination = store.coordinates()?;
    let url = Url::parse_with_params(
        DIRECTIONS_BASE,
        &[
            ("api", "1"),
            ("destination", destination.to_string().as_str()),
            ("travelmode", mode.as_str()),
        ],
    )
    .ok()?;
    Some(url.into())
}

/// A rendered list entry for one store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreCard {
    pub store_id: i64,
    pub title: String,
    pub distance: Option<String>,
    pub duration: Option<String>,
    pub rating: Option<String>,
    pub avg_price: Option<String>,
    pub address: Option<String>,
    pub directions_url: Option<String>,
}

impl StoreCard {
    #[must_use]
    pub fn from_store(store: &StoreResult, mode: TravelMode) -> Self {
        Self {
            store_id: store.id,
            title: store.display_name().to_owned(),
            distance: format_distance(store.distance_km.as_ref()),
            duration: format_duration(store.duration_min.as_ref()),
            rating: format_rating(store.rating.as_ref()),
            avg_price: format_avg_price(store.avg_price.as_ref()),
            address: store
                .address
                .as_deref()
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_owned),
            directions_url: directions_url(store, mode),
        }
    }

    /// The "Distance: … • Duration: …" line, if any metric is present.
    #[must_use]
    pub fn meta_line(&self) -> Option<String> {
        let parts: Vec<String> = [
            self.distance.as_ref().map(|d| format!("Distance: {d}")),
            self.duration.as_ref().map(|d| format!("Duration: {d}")),
            self.rating.as_ref().map(|r| format!("Rating: {r}")),
            self.avg_price.as_ref().map(|p| format!("Avg. price: {p}")),
        ]
        .into_iter()
        .flatten()
        .collect();
        (!parts.is_empty()).then(|| parts.join(" • "))
    }
}

impl fmt::Display for StoreCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.title)?;
        if let Some(meta) = self.meta_line() {
            writeln!(f, "  {meta}")?;
        }
        if let Some(address) = &self.address {
            writeln!(f, "  {address}")?;
        }
        if let Some(url) = &self.directions_url {
            writeln!(f, "  Directions: {url}")?;
        }
        Ok(())
    }
}

/// Info-window lines attached to a store's map marker.
#[must_use]
pub fn marker_info(store: &StoreResult) -> Vec<String> {
    let mut lines = vec![store.display_name().to_owned()];
    if let Some(d) = format_distance(store.distance_km.as_ref()) {
        lines.push(format!("Distance: {d}"));
    }
    if let Some(d) = format_duration(store.duration_min.as_ref()) {
        lines.push(format!("Duration: {d}"));
    }
    if let Some(address) = store.address.as_deref().filter(|a| !a.trim().is_empty()) {
        lines.push(address.trim().to_owned());
    }
    lines
}
