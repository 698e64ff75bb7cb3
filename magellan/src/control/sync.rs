//! Synchronization between the embedder's result list and the marker layer.

use std::sync::Arc;

use magellan_types::geo::GeoPoint;
use parking_lot::RwLock;

use crate::control::{EventDispatcher, ListEvent, MapEvent};
use crate::layer::marker_layer::{ClusterId, MarkerLayer, PlaceId, VisibleParent};
use crate::map::MapController;

/// The highlight state of the map: at most one marker or one cluster carries the highlight
/// treatment at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HighlightState {
    /// Nothing is highlighted.
    #[default]
    None,
    /// The marker of this place is highlighted.
    Marker(PlaceId),
    /// This cluster is highlighted.
    Cluster(ClusterId),
}

/// Keeps a result list rendered by the embedder and the marker layer consistent, without any
/// shared reactive state: the embedder feeds list events in, the controller mutates highlight
/// attributes and publishes outbound events.
///
/// Every transition into a highlighted state passes through [`HighlightState::None`] first:
/// the previous highlight is fully cleared before the next one is applied, so no residual
/// styling can survive a hover moving between items.
///
/// The controller mutates only visual highlight attributes of markers and clusters; it never
/// touches the grouping structure, the view, or the tile state.
pub struct SyncController {
    state: HighlightState,
    events: Arc<EventDispatcher>,
}

impl SyncController {
    /// Creates a controller with no highlight.
    pub fn new(events: Arc<EventDispatcher>) -> Self {
        Self {
            state: HighlightState::None,
            events,
        }
    }

    /// The current highlight state.
    pub fn state(&self) -> HighlightState {
        self.state
    }

    /// Handles one event of the result list.
    pub fn handle(
        &mut self,
        event: &ListEvent,
        map: &mut MapController,
        markers: &Arc<RwLock<MarkerLayer>>,
    ) {
        match event {
            ListEvent::ItemHovered(id) => self.highlight(*id, map, markers),
            ListEvent::ItemClicked(id) | ListEvent::CenterControlClicked(id) => {
                self.center_on(*id, map, markers)
            }
            ListEvent::ListLeft => self.clear(markers),
            // The previously highlighted references may no longer correspond to current data.
            ListEvent::ResultsRefreshed => self.clear(markers),
        }
    }

    fn highlight(
        &mut self,
        id: PlaceId,
        map: &MapController,
        markers: &Arc<RwLock<MarkerLayer>>,
    ) {
        self.clear(markers);

        let Some(view) = map.view() else {
            return;
        };
        let zoom = view.zoom_rounded();

        let mut layer = markers.write();
        match layer.visible_parent(id, zoom) {
            Some(VisibleParent::Marker(marker_id)) => {
                if layer.set_marker_highlight(marker_id, true) {
                    self.state = HighlightState::Marker(marker_id);
                }
            }
            Some(VisibleParent::Cluster(cluster_id)) => {
                if layer.set_cluster_highlight(cluster_id, true) {
                    self.state = HighlightState::Cluster(cluster_id);
                }
            }
            None => log::debug!("Hovered place {id} is not rendered"),
        }
    }

    fn center_on(
        &mut self,
        id: PlaceId,
        map: &mut MapController,
        markers: &Arc<RwLock<MarkerLayer>>,
    ) {
        let Some(position) = markers.read().position_of(id) else {
            log::debug!("Cannot center on place {id}: not rendered");
            return;
        };
        let Some(zoom) = map.view().map(|view| view.zoom_rounded()) else {
            return;
        };

        map.set_view(position.lat(), position.lon(), zoom, true);
        self.events.emit(MapEvent::MapCentered { place_id: id });
    }

    fn clear(&mut self, markers: &Arc<RwLock<MarkerLayer>>) {
        match std::mem::take(&mut self.state) {
            HighlightState::None => {}
            HighlightState::Marker(id) => {
                markers.write().set_marker_highlight(id, false);
            }
            HighlightState::Cluster(id) => {
                markers.write().set_cluster_highlight(id, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use assert_matches::assert_matches;
    use magellan_types::cartesian::Size;
    use parking_lot::Mutex;

    use super::*;
    use crate::layer::marker_layer::PointOfInterest;
    use crate::layer::tile_layer::DummyTileProvider;
    use crate::options::{ClusteringOptions, MapOptions, PerformanceOptions};

    struct Fixture {
        sync: SyncController,
        map: MapController,
        markers: Arc<RwLock<MarkerLayer>>,
        events: Arc<EventDispatcher>,
    }

    fn fixture(points: &[PointOfInterest], clustering_threshold: usize) -> Fixture {
        let events = Arc::new(EventDispatcher::new());
        let options = MapOptions::default();
        let mut map = MapController::new(
            options.default_view,
            options.tile_layer,
            PerformanceOptions::default().with_animation_duration(Duration::ZERO),
            None,
        );
        map.init_with_providers(DummyTileProvider, DummyTileProvider, None, None, false);
        map.set_size(Size::new(800.0, 600.0));

        let markers = Arc::new(RwLock::new(MarkerLayer::new(
            ClusteringOptions::default(),
            clustering_threshold,
            events.clone(),
        )));
        markers.write().update_markers(points);
        map.set_marker_layer(markers.clone());

        Fixture {
            sync: SyncController::new(events.clone()),
            map,
            markers,
            events,
        }
    }

    fn flat_points() -> Vec<PointOfInterest> {
        vec![
            PointOfInterest::new(1, 48.20, 16.40, "A"),
            PointOfInterest::new(2, 52.52, 13.40, "B"),
            PointOfInterest::new(3, -33.90, 151.20, "C"),
        ]
    }

    #[test]
    fn hover_highlights_the_marker() {
        let mut f = fixture(&flat_points(), 50);

        f.sync
            .handle(&ListEvent::ItemHovered(1), &mut f.map, &f.markers);

        assert_eq!(f.sync.state(), HighlightState::Marker(1));
        assert!(f.markers.read().marker(1).expect("rendered").is_highlighted());
    }

    #[test]
    fn hover_moves_between_items_without_residue() {
        let mut f = fixture(&flat_points(), 50);

        f.sync
            .handle(&ListEvent::ItemHovered(1), &mut f.map, &f.markers);
        f.sync
            .handle(&ListEvent::ItemHovered(2), &mut f.map, &f.markers);

        assert_eq!(f.sync.state(), HighlightState::Marker(2));
        let layer = f.markers.read();
        assert!(!layer.marker(1).expect("rendered").is_highlighted());
        assert!(layer.marker(2).expect("rendered").is_highlighted());
    }

    #[test]
    fn hover_on_clustered_place_highlights_the_cluster() {
        let points = vec![
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
        ];
        let mut f = fixture(&points, 2);

        f.sync
            .handle(&ListEvent::ItemHovered(1), &mut f.map, &f.markers);

        let cluster_id = assert_matches!(
            f.sync.state(),
            HighlightState::Cluster(id) => id
        );
        let layer = f.markers.read();
        let parent = layer
            .visible_parent(1, f.map.view().expect("initialized").zoom_rounded())
            .expect("rendered");
        assert_eq!(parent, VisibleParent::Cluster(cluster_id));
    }

    #[test]
    fn leaving_the_list_clears_the_highlight() {
        let mut f = fixture(&flat_points(), 50);

        f.sync
            .handle(&ListEvent::ItemHovered(1), &mut f.map, &f.markers);
        f.sync.handle(&ListEvent::ListLeft, &mut f.map, &f.markers);

        assert_eq!(f.sync.state(), HighlightState::None);
        assert!(!f.markers.read().marker(1).expect("rendered").is_highlighted());
    }

    #[test]
    fn results_refreshed_clears_the_highlight() {
        let mut f = fixture(&flat_points(), 50);

        f.sync
            .handle(&ListEvent::ItemHovered(1), &mut f.map, &f.markers);
        f.sync
            .handle(&ListEvent::ResultsRefreshed, &mut f.map, &f.markers);

        assert_eq!(f.sync.state(), HighlightState::None);
        assert!(!f.markers.read().marker(1).expect("rendered").is_highlighted());
    }

    #[test]
    fn click_recenters_and_publishes() {
        let mut f = fixture(&flat_points(), 50);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        f.events
            .subscribe(move |event: &MapEvent| sink.lock().push(*event));

        f.sync
            .handle(&ListEvent::ItemClicked(2), &mut f.map, &f.markers);

        let view = f.map.view().expect("initialized");
        assert_eq!(view.center().lat(), 52.52);
        assert_eq!(view.center().lon(), 13.40);
        assert_eq!(&*received.lock(), &[MapEvent::MapCentered { place_id: 2 }]);
    }

    #[test]
    fn center_control_behaves_like_a_click() {
        let mut f = fixture(&flat_points(), 50);
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        f.events
            .subscribe(move |event: &MapEvent| sink.lock().push(*event));

        f.sync
            .handle(&ListEvent::CenterControlClicked(3), &mut f.map, &f.markers);

        assert_eq!(&*received.lock(), &[MapEvent::MapCentered { place_id: 3 }]);
    }

    #[test]
    fn hovering_unknown_place_leaves_no_highlight() {
        let mut f = fixture(&flat_points(), 50);

        f.sync
            .handle(&ListEvent::ItemHovered(99), &mut f.map, &f.markers);

        assert_eq!(f.sync.state(), HighlightState::None);
    }
}
