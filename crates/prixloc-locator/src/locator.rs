//! The nearby-store locator.
//!
//! Owns the display (status line, result cards, map and its markers) and
//! coordinates the asynchronous steps around it: position acquisition, the
//! live search, the deferred map initialization and the best-effort
//! location persist.
//!
//! Overlapping searches resolve as last-started-wins: every search takes a
//! [`SearchTicket`](crate::generation::SearchTicket), and a response is only
//! rendered if its ticket is still current when the display lock is taken.

use std::sync::Arc;
use std::time::Duration;

use prixloc_core::{
    AppConfig, Position, SearchParameters, StoreResult, TravelMode, DEFAULT_RADIUS_KM,
};
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use crate::client::NearbyClient;
use crate::error::LocatorError;
use crate::format::StoreCard;
use crate::generation::{SearchGeneration, SearchTicket};
use crate::markers::{MapSurface, MarkerSet, INITIAL_ZOOM};
use crate::poller::{Readiness, ReadinessPoller};
use crate::sensor::{read_sensor, PositionSensor, SensorError, SensorOptions};
use crate::view::{ManualInput, ResultsView, Status};

#[derive(Debug, Clone, Copy)]
pub struct LocatorSettings {
    pub sensor: SensorOptions,
    pub map_poll_interval: Duration,
    pub map_poll_max_attempts: u32,
    pub default_radius_km: f64,
}

impl Default for LocatorSettings {
    fn default() -> Self {
        Self {
            sensor: SensorOptions::default(),
            map_poll_interval: Duration::from_millis(400),
            map_poll_max_attempts: 50,
            default_radius_km: DEFAULT_RADIUS_KM,
        }
    }
}

impl LocatorSettings {
    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            sensor: SensorOptions {
                high_accuracy: true,
                timeout: Duration::from_secs(config.sensor_timeout_secs),
                maximum_age: Duration::from_secs(config.sensor_max_age_secs),
            },
            map_poll_interval: Duration::from_millis(config.map_poll_interval_ms),
            map_poll_max_attempts: config.map_poll_max_attempts,
            default_radius_km: config.default_radius_km,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionSource {
    Sensor,
    ManualInput,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AcquiredPosition {
    pub position: Position,
    pub source: PositionSource,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Cards and markers were rendered for `count` stores.
    Shown { count: usize },
    /// The backend answered with no stores.
    Empty,
    /// The search failed; the error status is shown.
    Failed,
    /// A newer search started before this one completed; nothing was written.
    Superseded,
    /// Neither the sensor nor the manual inputs produced a position.
    NoPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MapState {
    Uninitialized,
    Polling,
    Ready,
}

struct Screen<V, M> {
    view: V,
    map: M,
    markers: MarkerSet,
    map_state: MapState,
    pending_center: Option<Position>,
}

impl<V: ResultsView, M: MapSurface> Screen<V, M> {
    /// Replaces cards and markers with one snapshot, in backend order.
    fn render(&mut self, results: &[StoreResult], count: u64, mode: TravelMode) -> SearchOutcome {
        self.view.clear_results();
        let attach = self.map_state == MapState::Ready;
        self.markers.rebuild(results, &mut self.map, attach);

        if results.is_empty() {
            self.view.set_status(&Status::NoStoresFound);
            return SearchOutcome::Empty;
        }

        let cards: Vec<StoreCard> = results
            .iter()
            .map(|store| StoreCard::from_store(store, mode))
            .collect();
        self.view.show_cards(&cards);
        self.view.set_status(&Status::Found { count });
        SearchOutcome::Shown {
            count: results.len(),
        }
    }

    fn initialize_map(&mut self, center: Position) {
        self.map.initialize(center, INITIAL_ZOOM);
        self.map_state = MapState::Ready;
        self.markers.attach_pending(&mut self.map);
    }

    fn tear_down(&mut self) {
        self.markers.clear(&mut self.map);
        self.pending_center = None;
    }
}

struct Inner<S, V, M> {
    client: NearbyClient,
    sensor: S,
    settings: LocatorSettings,
    generation: SearchGeneration,
    display: Mutex<Screen<V, M>>,
    last_persist: Mutex<Option<JoinHandle<()>>>,
    teardown: watch::Sender<bool>,
}

/// Handle to a locator instance. Clones share the same display and state.
pub struct NearbyLocator<S, V, M> {
    inner: Arc<Inner<S, V, M>>,
}

impl<S, V, M> Clone for NearbyLocator<S, V, M> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<S, V, M> NearbyLocator<S, V, M>
where
    S: PositionSensor + 'static,
    V: ResultsView + 'static,
    M: MapSurface + 'static,
{
    pub fn new(
        client: NearbyClient,
        sensor: S,
        view: V,
        map: M,
        settings: LocatorSettings,
    ) -> Self {
        let (teardown, _) = watch::channel(false);
        Self {
            inner: Arc::new(Inner {
                client,
                sensor,
                settings,
                generation: SearchGeneration::default(),
                display: Mutex::new(Screen {
                    view,
                    map,
                    markers: MarkerSet::default(),
                    map_state: MapState::Uninitialized,
                    pending_center: None,
                }),
                last_persist: Mutex::new(None),
                teardown,
            }),
        }
    }

    /// Obtains a position: device sensor first, then the manual inputs.
    ///
    /// Each source is tried exactly once. A sensor fix is written back into
    /// the manual inputs. When neither source yields a position an
    /// instructional status is shown and `None` is returned.
    pub async fn acquire_position(&self) -> Option<AcquiredPosition> {
        self.set_status(&Status::Locating).await;

        let sensor_error = match read_sensor(&self.inner.sensor, &self.inner.settings.sensor).await
        {
            Ok(position) => {
                tracing::debug!(%position, "device position acquired");
                self.inner
                    .display
                    .lock()
                    .await
                    .view
                    .set_manual_input(ManualInput::from_position(position));
                return Some(AcquiredPosition {
                    position,
                    source: PositionSource::Sensor,
                });
            }
            Err(err) => err,
        };

        tracing::warn!(
            error = %sensor_error,
            "device position unavailable; falling back to manual input"
        );
        let mut display = self.inner.display.lock().await;
        if let Some(position) = display.view.manual_input().position() {
            display.view.set_status(&Status::SearchingFromManualInput);
            return Some(AcquiredPosition {
                position,
                source: PositionSource::ManualInput,
            });
        }

        display.view.set_status(&Status::PositionUnavailable {
            sensor_supported: sensor_error != SensorError::Unsupported,
        });
        None
    }

    /// Searches around `position` with the radius and travel mode currently
    /// selected in the view.
    pub async fn search_at(&self, position: Position) -> SearchOutcome {
        let selectors = self.inner.display.lock().await.view.selectors();
        let params = SearchParameters::from_selectors(
            position,
            selectors.radius_km.as_deref(),
            selectors.travel_mode.as_deref(),
            self.inner.settings.default_radius_km,
        );
        self.search(params).await
    }

    /// Runs one live search and renders its result, unless a newer search
    /// started in the meantime.
    ///
    /// After a non-empty result is shown, the location is persisted in the
    /// background.
    pub async fn search(&self, params: SearchParameters) -> SearchOutcome {
        let ticket = self.inner.generation.begin();
        tracing::debug!(
            lat = params.position.latitude,
            lng = params.position.longitude,
            radius_km = params.radius_km,
            mode = %params.travel_mode,
            "searching nearby stores"
        );

        self.ensure_map(ticket, params.position).await;
        {
            let mut display = self.inner.display.lock().await;
            if self.inner.generation.is_current(ticket) {
                display.view.set_status(&Status::Searching);
            }
        }

        let result = self.inner.client.search(&params).await;

        let mut display = self.inner.display.lock().await;
        if !self.inner.generation.is_current(ticket) {
            tracing::debug!(
                lat = params.position.latitude,
                lng = params.position.longitude,
                "discarding response of a superseded search"
            );
            return SearchOutcome::Superseded;
        }

        match result {
            Ok(response) => {
                let outcome =
                    display.render(&response.results, response.result_count(), params.travel_mode);
                drop(display);
                if matches!(outcome, SearchOutcome::Shown { .. }) {
                    let handle = self.persist_last_location(params.position, params.radius_km);
                    *self.inner.last_persist.lock().await = Some(handle);
                }
                outcome
            }
            Err(err) => {
                match &err {
                    LocatorError::HttpStatus { status, url } => {
                        tracing::warn!(
                            status,
                            url = %url,
                            "nearby search returned a non-success status"
                        );
                    }
                    LocatorError::Transport(source) => {
                        tracing::error!(
                            error = %source,
                            "nearby search could not reach the server"
                        );
                    }
                    other => tracing::error!(error = %other, "nearby search failed"),
                }
                display.view.set_status(&Status::LoadError);
                SearchOutcome::Failed
            }
        }
    }

    /// Replaces cards and markers with `results`, superseding any search
    /// still in flight.
    pub async fn render(&self, results: &[StoreResult]) -> SearchOutcome {
        let _supersede = self.inner.generation.begin();
        let mut display = self.inner.display.lock().await;
        let mode = TravelMode::parse_or_default(display.view.selectors().travel_mode.as_deref());
        display.render(results, results.len() as u64, mode)
    }

    /// Writes the last searched location to the user profile in a detached task.
    ///
    /// Failures (typically an anonymous caller) are logged and dropped; they
    /// never reach the display. The returned handle may be dropped.
    pub fn persist_last_location(&self, position: Position, radius_km: f64) -> JoinHandle<()> {
        let client = self.inner.client.clone();
        tokio::spawn(async move {
            match client.persist_last_location(position, radius_km).await {
                Ok(()) => tracing::debug!(%position, radius_km, "last location persisted"),
                Err(err) => {
                    tracing::debug!(error = %err, "last location not persisted; ignoring");
                }
            }
        })
    }

    /// Waits for the most recent background persist, if one is outstanding.
    ///
    /// Short-lived callers use this before exiting so the write is not
    /// cancelled with the runtime.
    pub async fn finish_persist(&self) {
        let handle = self.inner.last_persist.lock().await.take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                tracing::debug!(error = %err, "persist task did not complete");
            }
        }
    }

    /// Acquires a position and searches around it.
    pub async fn locate_and_search(&self) -> SearchOutcome {
        match self.acquire_position().await {
            Some(acquired) => self.search_at(acquired.position).await,
            None => SearchOutcome::NoPosition,
        }
    }

    /// Reuses the manual inputs when both hold numbers, otherwise runs the
    /// full acquisition chain again.
    pub async fn refresh(&self) -> SearchOutcome {
        let manual = self.inner.display.lock().await.view.manual_input();
        if manual.is_filled() {
            if let Some(position) = manual.position() {
                return self.search_at(position).await;
            }
        }
        self.locate_and_search().await
    }

    /// Stops any pending map poll and removes every store marker.
    ///
    /// Searches still in flight come back as [`SearchOutcome::Superseded`]
    /// and never touch the view again.
    pub async fn teardown(&self) {
        let _supersede = self.inner.generation.begin();
        self.inner.teardown.send_replace(true);
        self.inner.display.lock().await.tear_down();
    }

    async fn set_status(&self, status: &Status) {
        self.inner.display.lock().await.view.set_status(status);
    }

    /// Creates or recenters the map; defers creation while the SDK loads.
    /// A no-op once `ticket` has been superseded.
    async fn ensure_map(&self, ticket: SearchTicket, center: Position) {
        let mut display = self.inner.display.lock().await;
        if !self.inner.generation.is_current(ticket) {
            return;
        }
        match display.map_state {
            MapState::Ready => display.map.recenter(center),
            MapState::Polling => display.pending_center = Some(center),
            MapState::Uninitialized => {
                if display.map.is_ready() {
                    display.initialize_map(center);
                    return;
                }
                display.map_state = MapState::Polling;
                display.pending_center = Some(center);
                drop(display);

                tracing::debug!("map SDK not loaded yet; deferring map initialization");
                let locator = self.clone();
                tokio::spawn(async move { locator.await_map_sdk().await });
            }
        }
    }

    async fn await_map_sdk(&self) {
        let poller = ReadinessPoller::new(
            self.inner.settings.map_poll_interval,
            self.inner.settings.map_poll_max_attempts,
        );
        let mut teardown = self.inner.teardown.subscribe();
        let inner = &self.inner;
        let readiness = poller
            .wait_until(
                || async move { inner.display.lock().await.map.is_ready() },
                &mut teardown,
            )
            .await;

        let mut display = self.inner.display.lock().await;
        match (readiness, display.pending_center.take()) {
            (Readiness::Ready, Some(center)) => {
                tracing::debug!(%center, "map SDK ready; initializing map");
                display.initialize_map(center);
            }
            (readiness, _) => {
                tracing::debug!(?readiness, "map initialization abandoned");
                display.map_state = MapState::Uninitialized;
            }
        }
    }
}
