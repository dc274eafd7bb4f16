//! Terminal renditions of the locator's view and map.
//!
//! Cards go to the supplied writer (stdout in the binary); status lines go
//! to stderr so piped output only carries results.

use std::collections::BTreeMap;
use std::io::Write;

use prixloc_core::Position;
use prixloc_locator::{
    ManualInput, MapSurface, MarkerHandle, MarkerSpec, ResultsView, Selectors, Status, StoreCard,
};

pub(crate) struct TerminalView<W> {
    out: W,
    manual: ManualInput,
    selectors: Selectors,
}

impl<W: Write + Send> TerminalView<W> {
    pub(crate) fn new(out: W, manual: ManualInput, selectors: Selectors) -> Self {
        Self {
            out,
            manual,
            selectors,
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out
    }

    fn write_card(&mut self, card: &StoreCard) -> std::io::Result<()> {
        writeln!(self.out, "{card}")?;
        writeln!(self.out)
    }
}

impl<W: Write + Send> ResultsView for TerminalView<W> {
    fn set_status(&mut self, status: &Status) {
        if status.is_error() {
            eprintln!("error: {status}");
        } else {
            eprintln!("{status}");
        }
    }

    fn clear_results(&mut self) {}

    fn show_cards(&mut self, cards: &[StoreCard]) {
        for card in cards {
            if let Err(err) = self.write_card(card) {
                tracing::warn!(error = %err, "failed to write store card");
                return;
            }
        }
    }

    fn manual_input(&self) -> ManualInput {
        self.manual.clone()
    }

    fn set_manual_input(&mut self, input: ManualInput) {
        self.manual = input;
    }

    fn selectors(&self) -> Selectors {
        self.selectors.clone()
    }
}

/// A map with no canvas: always ready, keeps its markers in memory and
/// optionally lists them on stderr.
#[derive(Debug, Default)]
pub(crate) struct TerminalMap {
    echo: bool,
    next_id: u64,
    pub(crate) markers: BTreeMap<u64, MarkerSpec>,
}

impl TerminalMap {
    pub(crate) fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Self::default()
        }
    }
}

impl MapSurface for TerminalMap {
    fn is_ready(&self) -> bool {
        true
    }

    fn initialize(&mut self, center: Position, zoom: u8) {
        tracing::debug!(%center, zoom, "map initialized");
        if self.echo {
            eprintln!("map: You are here ({center})");
        }
    }

    fn recenter(&mut self, center: Position) {
        if self.echo {
            eprintln!("map: You are here ({center})");
        }
    }

    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle {
        self.next_id += 1;
        if self.echo {
            eprintln!("map: {} at {}", marker.title, marker.position);
        }
        self.markers.insert(self.next_id, marker.clone());
        MarkerHandle(self.next_id)
    }

    fn remove_marker(&mut self, handle: MarkerHandle) {
        self.markers.remove(&handle.0);
    }
}
