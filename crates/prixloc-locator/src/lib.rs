//! Nearby-store locator for the price-comparison backend.
//!
//! Acquires a position (device sensor, then manual input), queries the
//! backend's nearby-stores endpoint, and renders the result as a list of
//! cards plus a set of map markers that always describe the same snapshot.

pub mod client;
pub mod error;
pub mod format;
pub mod generation;
pub mod locator;
pub mod markers;
pub mod poller;
pub mod sensor;
pub mod view;

pub use client::NearbyClient;
pub use error::LocatorError;
pub use format::{directions_url, StoreCard};
pub use locator::{
    AcquiredPosition, LocatorSettings, NearbyLocator, PositionSource, SearchOutcome,
};
pub use markers::{MapSurface, MarkerHandle, MarkerSet, MarkerSpec, INITIAL_ZOOM};
pub use poller::{Readiness, ReadinessPoller};
pub use sensor::{FixedSensor, Fix, NoSensor, PositionSensor, SensorError, SensorOptions};
pub use view::{ManualInput, ResultsView, Selectors, Status};
