//! Markers, cluster groups, and their lifecycle.
//!
//! The marker layer is the single validation boundary between the external point feed and the
//! renderer: whatever upstream delivers, only points with usable coordinates become markers.
//! The set of markers is replaced wholesale on every update; there is no incremental diffing.

use std::any::Any;
use std::sync::Arc;

use magellan_types::cartesian::Point2;
use magellan_types::geo::{GeoBounds, GeoPoint2d, NewGeoPoint};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::color::Color;
use crate::control::{EventDispatcher, MapEvent};
use crate::error::MagellanError;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::options::ClusteringOptions;
use crate::render::{Canvas, ClusterPaint, MarkerPaint, PolygonStyle};
use crate::view::MapView;
use crate::zoom::MAX_ZOOM;

mod clustering;

/// Identifier of a point of interest, owned by the upstream data source.
pub type PlaceId = u64;

/// Pixel distance within which a click counts as hitting a marker.
const CLICK_TOLERANCE_PX: f64 = 16.0;

/// Scale factor applied to a highlighted marker icon.
const HIGHLIGHT_SCALE: f32 = 1.3;

/// Glow outline color of a highlighted marker.
const HIGHLIGHT_GLOW: Color = Color::rgba(51, 136, 255, 200);

/// A point of interest as delivered by the external feed.
///
/// Coordinates are optional on purpose: upstream data is not trusted, and a missing or
/// non-numeric coordinate must reach [`MarkerLayer::update_markers`] to be rejected there,
/// not blow up during deserialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointOfInterest {
    /// Id of the place.
    pub id: PlaceId,
    /// Latitude in degrees, if present and numeric.
    #[serde(default)]
    pub latitude: Option<f64>,
    /// Longitude in degrees, if present and numeric.
    #[serde(default)]
    pub longitude: Option<f64>,
    /// Display title of the place.
    #[serde(default)]
    pub title: String,
}

impl PointOfInterest {
    /// Creates a point of interest with valid coordinates.
    pub fn new(id: PlaceId, latitude: f64, longitude: f64, title: impl Into<String>) -> Self {
        Self {
            id,
            latitude: Some(latitude),
            longitude: Some(longitude),
            title: title.into(),
        }
    }
}

/// A rendered marker: the association between a point of interest and its visual presence on
/// the map.
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    id: PlaceId,
    position: GeoPoint2d,
    title: String,
    highlighted: bool,
}

impl Marker {
    /// Id of the place this marker renders.
    pub fn id(&self) -> PlaceId {
        self.id
    }

    /// Position of the marker.
    pub fn position(&self) -> GeoPoint2d {
        self.position
    }

    /// Display title of the marker.
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Whether the marker is currently highlighted.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// Identifier of a cluster. Valid only for the current clustering of the current marker set; a
/// zoom change or a marker update produces new ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterId(u32);

/// A cluster badge standing in for several nearby markers.
#[derive(Debug, Clone, PartialEq)]
pub struct Cluster {
    id: ClusterId,
    position: GeoPoint2d,
    members: Vec<PlaceId>,
    highlighted: bool,
    spiderfied: bool,
}

impl Cluster {
    /// Id of the cluster.
    pub fn id(&self) -> ClusterId {
        self.id
    }

    /// Position the badge is drawn at.
    pub fn position(&self) -> GeoPoint2d {
        self.position
    }

    /// Ids of the places grouped into this cluster.
    pub fn members(&self) -> &[PlaceId] {
        &self.members
    }

    /// Whether the cluster is currently highlighted.
    pub fn is_highlighted(&self) -> bool {
        self.highlighted
    }
}

/// How the current marker set is grouped on the map. Exactly one grouping is mounted at any
/// time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grouping {
    /// Every marker is rendered individually.
    Flat,
    /// Markers are grouped into clusters where they are close enough on the screen.
    Clustered,
}

/// What is currently visible on the map for a given place: its own marker, or the cluster
/// hiding it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisibleParent {
    /// The place's own marker is visible.
    Marker(PlaceId),
    /// The place is grouped into this cluster.
    Cluster(ClusterId),
}

/// Result of a click on the map, as resolved against the marker layer.
#[derive(Debug, Clone, PartialEq)]
pub enum ClickOutcome {
    /// Nothing interactive under the pointer.
    Miss,
    /// A marker was selected. The `marker-selected` event has already been published.
    Marker(PlaceId),
    /// A cluster was clicked; the map should zoom to these bounds to split it.
    ZoomToCluster(GeoBounds),
    /// A cluster at maximum zoom was expanded into its individual markers in place.
    Spiderfied(ClusterId),
}

#[derive(Default)]
struct ClusterState {
    zoom: Option<u32>,
    clusters: Vec<Cluster>,
}

/// Owns marker and cluster-group lifecycle for the current set of points of interest.
///
/// The layer renders either a flat or a clustered grouping depending on how the point count
/// compares to the configured threshold. Cluster composition depends on the zoom level, so the
/// clusters are a derived artifact rebuilt lazily whenever the layer is asked about a zoom it
/// has not clustered for yet.
pub struct MarkerLayer {
    markers: Vec<Marker>,
    grouping: Grouping,
    cluster_state: RwLock<ClusterState>,
    options: ClusteringOptions,
    max_markers_before_clustering: usize,
    events: Arc<EventDispatcher>,
    messenger: Option<Box<dyn Messenger>>,
}

impl MarkerLayer {
    /// Creates an empty layer.
    pub fn new(
        options: ClusteringOptions,
        max_markers_before_clustering: usize,
        events: Arc<EventDispatcher>,
    ) -> Self {
        Self {
            markers: vec![],
            grouping: Grouping::Flat,
            cluster_state: RwLock::new(ClusterState::default()),
            options,
            max_markers_before_clustering,
            events,
            messenger: None,
        }
    }

    /// Replaces all markers with the given points.
    ///
    /// This is a full replace: every existing marker and the mounted grouping are destroyed
    /// before the new set is built. The grouping is selected from the raw input length; points
    /// with missing or non-finite coordinates are then skipped (and logged) without affecting
    /// that choice.
    pub fn update_markers(&mut self, points: &[PointOfInterest]) {
        self.markers.clear();
        *self.cluster_state.write() = ClusterState::default();

        self.grouping = if points.len() >= self.max_markers_before_clustering {
            Grouping::Clustered
        } else {
            Grouping::Flat
        };

        for point in points {
            match (point.latitude, point.longitude) {
                (Some(latitude), Some(longitude))
                    if latitude.is_finite() && longitude.is_finite() =>
                {
                    self.markers.push(Marker {
                        id: point.id,
                        position: GeoPoint2d::latlon(latitude, longitude),
                        title: point.title.clone(),
                        highlighted: false,
                    });
                }
                _ => {
                    log::warn!(
                        "Skipping place: {}",
                        MagellanError::InvalidCoordinates(point.id)
                    );
                }
            }
        }

        self.redraw();
    }

    /// Number of markers currently rendered. Invalid feed entries are not counted.
    pub fn marker_count(&self) -> usize {
        self.markers.len()
    }

    /// The grouping currently mounted on the map.
    pub fn grouping(&self) -> Grouping {
        self.grouping
    }

    /// The marker rendering the given place, if any.
    pub fn marker(&self, id: PlaceId) -> Option<&Marker> {
        self.markers.iter().find(|marker| marker.id == id)
    }

    /// Position of the given place, if it is rendered.
    pub fn position_of(&self, id: PlaceId) -> Option<GeoPoint2d> {
        self.marker(id).map(|marker| marker.position)
    }

    /// Smallest geographic bounds containing all rendered markers, or `None` when the layer is
    /// empty.
    pub fn bounds(&self) -> Option<GeoBounds> {
        GeoBounds::from_points(self.markers.iter().map(|marker| &marker.position))
    }

    /// Resolves a place id to whatever is currently visible for it at the given zoom level:
    /// the marker itself, or the cluster it is grouped into. Returns `None` for places that are
    /// not rendered at all.
    pub fn visible_parent(&self, id: PlaceId, zoom: u32) -> Option<VisibleParent> {
        self.marker(id)?;

        if !self.clustering_active(zoom) {
            return Some(VisibleParent::Marker(id));
        }

        self.ensure_clusters(zoom);
        let state = self.cluster_state.read();
        let cluster = state
            .clusters
            .iter()
            .find(|cluster| cluster.members.contains(&id))?;

        if cluster.members.len() == 1 || cluster.spiderfied {
            Some(VisibleParent::Marker(id))
        } else {
            Some(VisibleParent::Cluster(cluster.id))
        }
    }

    /// Sets the highlight attribute of a marker. Returns false if the place is not rendered.
    pub fn set_marker_highlight(&mut self, id: PlaceId, highlighted: bool) -> bool {
        match self.markers.iter_mut().find(|marker| marker.id == id) {
            Some(marker) => {
                marker.highlighted = highlighted;
                self.redraw();
                true
            }
            None => false,
        }
    }

    /// Sets the highlight attribute of a cluster. Returns false if no such cluster currently
    /// exists (e.g. after a zoom change rebuilt the clustering).
    pub fn set_cluster_highlight(&mut self, id: ClusterId, highlighted: bool) -> bool {
        let mut state = self.cluster_state.write();
        match state.clusters.iter_mut().find(|cluster| cluster.id == id) {
            Some(cluster) => {
                cluster.highlighted = highlighted;
                drop(state);
                self.redraw();
                true
            }
            None => false,
        }
    }

    /// Resolves a click at the given viewport position.
    ///
    /// A hit on an individually visible marker publishes [`MapEvent::MarkerSelected`]. A hit on
    /// a cluster badge either requests a zoom to the cluster's bounds, or expands the cluster
    /// in place when the map is already at maximum zoom.
    pub fn handle_click(&mut self, position: Point2, view: &MapView) -> ClickOutcome {
        let zoom = view.zoom_rounded();

        if !self.clustering_active(zoom) {
            return self.click_marker(position, view, None);
        }

        self.ensure_clusters(zoom);

        let badge_hit = {
            let state = self.cluster_state.read();
            state
                .clusters
                .iter()
                .filter(|cluster| cluster.members.len() > 1 && !cluster.spiderfied)
                .find(|cluster| {
                    let badge = (self.options.icon_factory)(cluster.members.len());
                    let radius = (badge.diameter_px as f64 / 2.0).max(CLICK_TOLERANCE_PX);
                    view.geo_to_screen(&cluster.position).distance(&position) <= radius
                })
                .map(|cluster| (cluster.id, cluster.members.clone()))
        };

        if let Some((cluster_id, members)) = badge_hit {
            if zoom >= MAX_ZOOM && self.options.spiderfy_on_max_zoom {
                self.set_spiderfied(cluster_id);
                return ClickOutcome::Spiderfied(cluster_id);
            }

            if self.options.zoom_to_bounds_on_click {
                let positions: Vec<_> = members
                    .iter()
                    .filter_map(|member| self.position_of(*member))
                    .collect();
                if let Some(bounds) = GeoBounds::from_points(&positions) {
                    return ClickOutcome::ZoomToCluster(bounds);
                }
            }

            return ClickOutcome::Miss;
        }

        let visible = self.individually_visible();
        self.click_marker(position, view, Some(&visible))
    }

    fn click_marker(
        &self,
        position: Point2,
        view: &MapView,
        allowed: Option<&[PlaceId]>,
    ) -> ClickOutcome {
        let mut best: Option<(PlaceId, f64)> = None;
        for marker in &self.markers {
            if let Some(allowed) = allowed {
                if !allowed.contains(&marker.id) {
                    continue;
                }
            }

            let distance = view.geo_to_screen(&marker.position).distance(&position);
            if distance <= CLICK_TOLERANCE_PX && best.map_or(true, |(_, d)| distance < d) {
                best = Some((marker.id, distance));
            }
        }

        match best {
            Some((id, _)) => {
                self.events.emit(MapEvent::MarkerSelected { place_id: id });
                ClickOutcome::Marker(id)
            }
            None => ClickOutcome::Miss,
        }
    }

    /// Places whose markers are drawn individually despite the clustered grouping: members of
    /// single-member and spiderfied clusters.
    fn individually_visible(&self) -> Vec<PlaceId> {
        let state = self.cluster_state.read();
        state
            .clusters
            .iter()
            .filter(|cluster| cluster.members.len() == 1 || cluster.spiderfied)
            .flat_map(|cluster| cluster.members.iter().copied())
            .collect()
    }

    fn set_spiderfied(&mut self, id: ClusterId) {
        let mut state = self.cluster_state.write();
        if let Some(cluster) = state.clusters.iter_mut().find(|cluster| cluster.id == id) {
            cluster.spiderfied = true;
        }
        drop(state);
        self.redraw();
    }

    fn clustering_active(&self, zoom: u32) -> bool {
        if self.grouping != Grouping::Clustered {
            return false;
        }

        match self.options.disable_clustering_at_zoom {
            Some(disable_at) => zoom < disable_at,
            None => true,
        }
    }

    fn ensure_clusters(&self, zoom: u32) {
        if self.cluster_state.read().zoom == Some(zoom) {
            return;
        }

        let clusters =
            clustering::build_clusters(&self.markers, zoom, self.options.max_cluster_radius);
        *self.cluster_state.write() = ClusterState {
            zoom: Some(zoom),
            clusters,
        };
    }

    fn marker_paint(marker: &Marker) -> MarkerPaint {
        if marker.highlighted {
            MarkerPaint {
                scale: HIGHLIGHT_SCALE,
                glow: Some(HIGHLIGHT_GLOW),
            }
        } else {
            MarkerPaint::default()
        }
    }

    fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw();
        }
    }
}

impl Layer for MarkerLayer {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        let zoom = view.zoom_rounded();

        if !self.clustering_active(zoom) {
            for marker in &self.markers {
                canvas.draw_marker(view.geo_to_screen(&marker.position), &Self::marker_paint(marker));
            }
            return;
        }

        self.ensure_clusters(zoom);
        let state = self.cluster_state.read();
        for cluster in &state.clusters {
            if cluster.members.len() == 1 || cluster.spiderfied {
                for member in &cluster.members {
                    if let Some(marker) = self.marker(*member) {
                        canvas.draw_marker(
                            view.geo_to_screen(&marker.position),
                            &Self::marker_paint(marker),
                        );
                    }
                }
                continue;
            }

            if cluster.highlighted && self.options.show_coverage_on_hover {
                let positions: Vec<_> = cluster
                    .members
                    .iter()
                    .filter_map(|member| self.position_of(*member))
                    .collect();
                if let Some(bounds) = GeoBounds::from_points(&positions) {
                    let corners: Vec<_> = bounds
                        .corners()
                        .iter()
                        .map(|corner| view.geo_to_screen(corner))
                        .collect();
                    canvas.draw_polygon(
                        &corners,
                        &PolygonStyle {
                            outline: HIGHLIGHT_GLOW,
                            outline_width: 1.0,
                            fill: HIGHLIGHT_GLOW.with_alpha(40),
                        },
                    );
                }
            }

            canvas.draw_cluster(
                view.geo_to_screen(&cluster.position),
                &ClusterPaint {
                    icon: (self.options.icon_factory)(cluster.members.len()),
                    outlined: cluster.highlighted,
                    pulsing: cluster.highlighted,
                },
            );
        }
    }

    fn prepare(&self, _view: &MapView) {
        // nothing to load
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.messenger = Some(messenger);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use magellan_types::cartesian::Size;
    use magellan_types::latlon;
    use parking_lot::Mutex;

    use super::*;
    use crate::render::{DrawCall, RecordingCanvas};

    fn test_layer(threshold: usize) -> MarkerLayer {
        MarkerLayer::new(
            ClusteringOptions::default(),
            threshold,
            Arc::new(EventDispatcher::new()),
        )
    }

    fn spread_points(count: usize) -> Vec<PointOfInterest> {
        (0..count)
            .map(|i| {
                PointOfInterest::new(
                    i as PlaceId,
                    10.0 + i as f64 * 2.0,
                    -30.0 + i as f64 * 1.5,
                    format!("place {i}"),
                )
            })
            .collect()
    }

    #[test]
    fn grouping_threshold_is_inclusive() {
        let mut layer = test_layer(50);

        layer.update_markers(&spread_points(49));
        assert_eq!(layer.grouping(), Grouping::Flat);

        layer.update_markers(&spread_points(50));
        assert_eq!(layer.grouping(), Grouping::Clustered);
    }

    #[test]
    fn invalid_points_are_skipped() {
        let mut layer = test_layer(50);
        let mut points = spread_points(3);
        points[1].latitude = None;

        layer.update_markers(&points);
        assert_eq!(layer.marker_count(), 2);
        assert!(layer.marker(1).is_none());
    }

    #[test]
    fn non_finite_coordinates_are_skipped() {
        let mut layer = test_layer(50);
        let mut points = spread_points(2);
        points[0].longitude = Some(f64::NAN);

        layer.update_markers(&points);
        assert_eq!(layer.marker_count(), 1);
    }

    #[test]
    fn update_is_a_full_replace() {
        let mut layer = test_layer(50);
        layer.update_markers(&spread_points(5));
        assert_eq!(layer.marker_count(), 5);

        layer.update_markers(&[PointOfInterest::new(100, 1.0, 2.0, "only")]);
        assert_eq!(layer.marker_count(), 1);
        assert!(layer.marker(0).is_none());
        assert!(layer.marker(100).is_some());
    }

    #[test]
    fn feed_entries_with_null_coordinates_deserialize() {
        let feed = r#"[
            {"id": 1, "latitude": 48.2, "longitude": 16.4, "title": "A"},
            {"id": 2, "latitude": null, "longitude": 16.4, "title": "B"}
        ]"#;
        let points: Vec<PointOfInterest> =
            serde_json::from_str(feed).expect("feed must deserialize");

        let mut layer = test_layer(50);
        layer.update_markers(&points);
        assert_eq!(layer.marker_count(), 1);
    }

    #[test]
    fn visible_parent_in_flat_grouping() {
        let mut layer = test_layer(50);
        layer.update_markers(&spread_points(3));

        assert_matches!(layer.visible_parent(1, 5), Some(VisibleParent::Marker(1)));
        assert_matches!(layer.visible_parent(99, 5), None);
    }

    #[test]
    fn visible_parent_resolves_clusters() {
        let mut layer = test_layer(2);
        // Two points a few hundred meters apart, one on the other side of the world.
        layer.update_markers(&[
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
            PointOfInterest::new(3, -33.9, 151.2, "C"),
        ]);

        let parent_1 = layer.visible_parent(1, 5).expect("place 1 is rendered");
        let parent_2 = layer.visible_parent(2, 5).expect("place 2 is rendered");
        assert_matches!(parent_1, VisibleParent::Cluster(_));
        assert_eq!(parent_1, parent_2);

        assert_matches!(layer.visible_parent(3, 5), Some(VisibleParent::Marker(3)));
    }

    #[test]
    fn clustering_disabled_at_high_zoom() {
        let mut layer = test_layer(2);
        layer.update_markers(&[
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
        ]);

        assert_matches!(layer.visible_parent(1, 5), Some(VisibleParent::Cluster(_)));
        // Default options disable clustering at zoom 17.
        assert_matches!(layer.visible_parent(1, 17), Some(VisibleParent::Marker(1)));
    }

    #[test]
    fn exactly_one_grouping_is_rendered() {
        let mut layer = test_layer(2);
        layer.update_markers(&[
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
            PointOfInterest::new(3, -33.9, 151.2, "C"),
        ]);

        let view = MapView::new(latlon!(20.0, 80.0), 3.0).with_size(Size::new(800.0, 600.0));
        let mut canvas = RecordingCanvas::new();
        layer.render(&view, &mut canvas);

        // The two close places collapse into one badge; the single distant place renders as a
        // marker of the same (clustered) grouping.
        assert_eq!(canvas.clusters().len(), 1);
        assert_eq!(canvas.markers().len(), 1);
    }

    #[test]
    fn highlighted_marker_is_drawn_enlarged_with_glow() {
        let mut layer = test_layer(50);
        layer.update_markers(&spread_points(2));
        assert!(layer.set_marker_highlight(1, true));

        let view = MapView::new(latlon!(11.0, -29.0), 4.0).with_size(Size::new(800.0, 600.0));
        let mut canvas = RecordingCanvas::new();
        layer.render(&view, &mut canvas);

        let highlighted: Vec<_> = canvas
            .markers()
            .into_iter()
            .filter(|(_, paint)| paint.glow.is_some())
            .collect();
        assert_eq!(highlighted.len(), 1);
        assert_eq!(highlighted[0].1.scale, HIGHLIGHT_SCALE);
    }

    #[test]
    fn click_on_marker_publishes_selection() {
        let events = Arc::new(EventDispatcher::new());
        let received = Arc::new(Mutex::new(Vec::new()));
        let sink = received.clone();
        events.subscribe(move |event: &MapEvent| sink.lock().push(*event));

        let mut layer =
            MarkerLayer::new(ClusteringOptions::default(), 50, events);
        layer.update_markers(&spread_points(3));

        let view = MapView::new(latlon!(12.0, -28.5), 6.0).with_size(Size::new(800.0, 600.0));
        let target = layer.position_of(1).expect("place 1 is rendered");
        let outcome = layer.handle_click(view.geo_to_screen(&target), &view);

        assert_matches!(outcome, ClickOutcome::Marker(1));
        assert_eq!(&*received.lock(), &[MapEvent::MarkerSelected { place_id: 1 }]);
    }

    #[test]
    fn click_far_from_markers_is_a_miss() {
        let mut layer = test_layer(50);
        layer.update_markers(&spread_points(3));

        let view = MapView::new(latlon!(12.0, -28.5), 6.0).with_size(Size::new(800.0, 600.0));
        let outcome = layer.handle_click(Point2::new(5.0, 5.0), &view);
        assert_matches!(outcome, ClickOutcome::Miss);
    }

    #[test]
    fn click_on_cluster_requests_zoom_to_bounds() {
        let mut layer = test_layer(2);
        layer.update_markers(&[
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
        ]);

        let view = MapView::new(latlon!(48.2, 16.4), 5.0).with_size(Size::new(800.0, 600.0));
        let parent = layer.visible_parent(1, 5).expect("place 1 is rendered");
        let cluster_position = match parent {
            VisibleParent::Cluster(_) => {
                let state = layer.cluster_state.read();
                state.clusters[0].position
            }
            VisibleParent::Marker(_) => panic!("places must be clustered"),
        };

        let outcome = layer.handle_click(view.geo_to_screen(&cluster_position), &view);
        let bounds = assert_matches!(outcome, ClickOutcome::ZoomToCluster(bounds) => bounds);
        assert!(bounds.south() <= 48.2 && bounds.north() >= 48.201);
    }

    #[test]
    fn cluster_render_uses_icon_factory() {
        let mut layer = test_layer(2);
        layer.update_markers(&[
            PointOfInterest::new(1, 48.2000, 16.4000, "A"),
            PointOfInterest::new(2, 48.2010, 16.4010, "B"),
        ]);

        let view = MapView::new(latlon!(48.2, 16.4), 5.0).with_size(Size::new(800.0, 600.0));
        let mut canvas = RecordingCanvas::new();
        layer.render(&view, &mut canvas);

        let clusters = canvas.clusters();
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].1.icon.label, "2");
        assert!(!clusters[0].1.outlined);
    }

    #[test]
    fn tile_draws_never_come_from_marker_layer() {
        let mut layer = test_layer(2);
        layer.update_markers(&spread_points(5));

        let view = MapView::new(latlon!(14.0, -27.0), 3.0).with_size(Size::new(800.0, 600.0));
        let mut canvas = RecordingCanvas::new();
        layer.render(&view, &mut canvas);
        assert!(canvas
            .calls
            .iter()
            .all(|call| !matches!(call, DrawCall::Tile(_))));
    }
}
