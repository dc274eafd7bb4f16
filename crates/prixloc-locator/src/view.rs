//! The presentation slots the locator reads from and writes into.

use std::fmt;

use prixloc_core::Position;

use crate::format::StoreCard;

/// User-facing status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Status {
    Locating,
    Searching,
    SearchingFromManualInput,
    Found { count: u64 },
    NoStoresFound,
    LoadError,
    PositionUnavailable { sensor_supported: bool },
}

impl Status {
    /// Whether the status should be styled as an error.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(self, Status::LoadError | Status::PositionUnavailable { .. })
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Locating => f.write_str("Getting your position…"),
            Status::Searching => f.write_str("Searching for nearby stores…"),
            Status::SearchingFromManualInput => {
                f.write_str("Searching from the entered coordinates…")
            }
            Status::Found { count } => write!(f, "{count} store(s) found."),
            Status::NoStoresFound => f.write_str("No stores found in this radius."),
            Status::LoadError => f.write_str("Error loading nearby stores."),
            Status::PositionUnavailable {
                sensor_supported: true,
            } => f.write_str(
                "Unable to get your position. Allow geolocation or enter latitude/longitude, then search again.",
            ),
            Status::PositionUnavailable {
                sensor_supported: false,
            } => f.write_str(
                "Geolocation is not supported on this device. Enter latitude/longitude, then search again.",
            ),
        }
    }
}

/// Raw contents of the manual latitude/longitude inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ManualInput {
    pub latitude: Option<String>,
    pub longitude: Option<String>,
}

impl ManualInput {
    #[must_use]
    pub fn new(latitude: impl Into<String>, longitude: impl Into<String>) -> Self {
        Self {
            latitude: Some(latitude.into()),
            longitude: Some(longitude.into()),
        }
    }

    /// Input pre-filled from a sensor fix, six decimals per coordinate.
    #[must_use]
    pub fn from_position(position: Position) -> Self {
        Self::new(
            format!("{:.6}", position.latitude),
            format!("{:.6}", position.longitude),
        )
    }

    /// Both fields hold some non-blank text.
    #[must_use]
    pub fn is_filled(&self) -> bool {
        let filled = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());
        filled(&self.latitude) && filled(&self.longitude)
    }

    /// The position spelled by the inputs, if both parse as finite numbers.
    #[must_use]
    pub fn position(&self) -> Option<Position> {
        Position::parse(self.latitude.as_deref()?, self.longitude.as_deref()?)
    }
}

/// Raw values of the radius and travel-mode selectors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selectors {
    pub radius_km: Option<String>,
    pub travel_mode: Option<String>,
}

/// Status line, results list and input fields of the nearby-stores view.
pub trait ResultsView: Send {
    fn set_status(&mut self, status: &Status);

    /// Removes every rendered card.
    fn clear_results(&mut self);

    /// Shows `cards` in the given order.
    fn show_cards(&mut self, cards: &[StoreCard]);

    fn manual_input(&self) -> ManualInput;

    fn set_manual_input(&mut self, input: ManualInput);

    fn selectors(&self) -> Selectors;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_input_requires_both_numeric_fields() {
        assert_eq!(
            ManualInput::new("0.39", "9.45").position(),
            Position::new(0.39, 9.45)
        );
        assert!(ManualInput::new("0.39", "").position().is_none());
        assert!(ManualInput::new("north", "9.45").position().is_none());
        assert!(ManualInput::default().position().is_none());
    }

    #[test]
    fn is_filled_ignores_blank_fields() {
        assert!(ManualInput::new("a", "b").is_filled());
        assert!(!ManualInput::new(" ", "9.45").is_filled());
        assert!(!ManualInput::default().is_filled());
    }

    #[test]
    fn prefill_uses_six_decimals() {
        let input = ManualInput::from_position(Position::new(0.39, 9.45).unwrap());
        assert_eq!(input, ManualInput::new("0.390000", "9.450000"));
    }

    #[test]
    fn only_failures_are_errors() {
        assert!(Status::LoadError.is_error());
        assert!(Status::PositionUnavailable {
            sensor_supported: true
        }
        .is_error());
        assert!(!Status::NoStoresFound.is_error());
        assert!(!Status::Found { count: 3 }.is_error());
        assert_eq!(Status::Found { count: 3 }.to_string(), "3 store(s) found.");
    }
}
