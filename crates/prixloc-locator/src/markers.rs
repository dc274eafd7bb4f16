//! Map surface abstraction and the locator-owned marker set.

use prixloc_core::{Position, StoreResult};

use crate::format::marker_info;

/// Zoom level of a freshly created map.
pub const INITIAL_ZOOM: u8 = 13;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerHandle(pub u64);

/// What to draw for one store.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub store_id: i64,
    pub position: Position,
    pub title: String,
    pub info: Vec<String>,
}

impl MarkerSpec {
    /// `None` for stores without usable coordinates.
    #[must_use]
    pub fn from_store(store: &StoreResult) -> Option<Self> {
        Some(Self {
            store_id: store.id,
            position: store.coordinates()?,
            title: store.display_name().to_owned(),
            info: marker_info(store),
        })
    }
}

/// The external mapping SDK, as seen by the locator.
///
/// `is_ready` reports whether the SDK has finished loading; every other
/// method is only called once it has.
pub trait MapSurface: Send {
    fn is_ready(&self) -> bool;

    /// Creates the map centered on the user, with a "You are here" marker.
    fn initialize(&mut self, center: Position, zoom: u8);

    fn recenter(&mut self, center: Position);

    fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle;

    fn remove_marker(&mut self, handle: MarkerHandle);
}

/// Store markers for the current result snapshot.
///
/// Specs are kept even while the map is not initialized; they are attached
/// once it is.
#[derive(Debug, Default)]
pub struct MarkerSet {
    entries: Vec<(MarkerSpec, Option<MarkerHandle>)>,
}

impl MarkerSet {
    /// Detaches every attached marker and forgets all specs.
    pub fn clear<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        for (_, handle) in self.entries.drain(..) {
            if let Some(handle) = handle {
                map.remove_marker(handle);
            }
        }
    }

    /// Tears down the current set and builds one from `stores`, in order.
    pub fn rebuild<M: MapSurface + ?Sized>(
        &mut self,
        stores: &[StoreResult],
        map: &mut M,
        attach: bool,
    ) {
        self.clear(map);
        self.entries = stores
            .iter()
            .filter_map(MarkerSpec::from_store)
            .map(|spec| (spec, None))
            .collect();
        if attach {
            self.attach_pending(map);
        }
    }

    /// Attaches every spec not yet on the map.
    pub fn attach_pending<M: MapSurface + ?Sized>(&mut self, map: &mut M) {
        for (spec, handle) in &mut self.entries {
            if handle.is_none() {
                *handle = Some(map.add_marker(spec));
            }
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn attached(&self) -> usize {
        self.entries.iter().filter(|(_, h)| h.is_some()).count()
    }

    pub fn specs(&self) -> impl Iterator<Item = &MarkerSpec> {
        self.entries.iter().map(|(spec, _)| spec)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;

    #[derive(Default)]
    struct FakeMap {
        next: u64,
        live: BTreeMap<u64, i64>,
    }

    impl MapSurface for FakeMap {
        fn is_ready(&self) -> bool {
            true
        }
        fn initialize(&mut self, _center: Position, _zoom: u8) {}
        fn recenter(&mut self, _center: Position) {}
        fn add_marker(&mut self, marker: &MarkerSpec) -> MarkerHandle {
            self.next += 1;
            self.live.insert(self.next, marker.store_id);
            MarkerHandle(self.next)
        }
        fn remove_marker(&mut self, handle: MarkerHandle) {
            self.live.remove(&handle.0);
        }
    }

    fn stores(ids: &[i64]) -> Vec<StoreResult> {
        ids.iter()
            .map(|id| {
                serde_json::from_value(serde_json::json!({
                    "id": id, "latitude": 0.4, "longitude": 9.4
                }))
                .unwrap()
            })
            .collect()
    }

    #[test]
    fn rebuild_replaces_previous_markers() {
        let mut map = FakeMap::default();
        let mut set = MarkerSet::default();
        set.rebuild(&stores(&[1, 2, 3]), &mut map, true);
        assert_eq!(map.live.len(), 3);
        set.rebuild(&stores(&[4]), &mut map, true);
        assert_eq!(map.live.values().copied().collect::<Vec<_>>(), vec![4]);
        assert_eq!(set.attached(), 1);
    }

    #[test]
    fn stores_without_coordinates_get_no_marker() {
        let mut map = FakeMap::default();
        let mut set = MarkerSet::default();
        let mut list = stores(&[1]);
        list.push(serde_json::from_value(serde_json::json!({ "id": 2 })).unwrap());
        set.rebuild(&list, &mut map, true);
        assert_eq!(set.len(), 1);
        assert_eq!(map.live.len(), 1);
    }

    #[test]
    fn pending_markers_attach_later_in_order() {
        let mut map = FakeMap::default();
        let mut set = MarkerSet::default();
        set.rebuild(&stores(&[7, 8]), &mut map, false);
        assert_eq!(set.attached(), 0);
        assert!(map.live.is_empty());
        set.attach_pending(&mut map);
        assert_eq!(set.attached(), 2);
        assert_eq!(map.live.values().copied().collect::<Vec<_>>(), vec![7, 8]);
        set.clear(&mut map);
        assert!(map.live.is_empty());
        assert!(set.is_empty());
    }
}
