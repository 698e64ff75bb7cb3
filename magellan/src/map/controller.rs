//! The controller owning the map: tile layer, view transitions and the radius overlay.

use std::sync::Arc;
use std::time::Duration;

use magellan_types::cartesian::Size;
use magellan_types::geo::{Datum, GeoBounds, GeoPoint, GeoPoint2d};
use magellan_types::latlon;
use parking_lot::RwLock;
use web_time::SystemTime;

use crate::error::MagellanError;
use crate::layer::marker_layer::MarkerLayer;
use crate::layer::overlay::{CircleOverlay, CircleStyle};
use crate::layer::tile_layer::{TileLayer, TileProvider, TileSource};
use crate::map::transition::PendingTransition;
use crate::map::{Map, TransitionHandle, TransitionOutcome};
use crate::messenger::Messenger;
use crate::options::{PerformanceOptions, TileLayerOptions, ViewOptions};
use crate::render::Canvas;
use crate::view::MapView;
use crate::zoom::zoom_for_radius;

/// Settle check delay for recentring transitions.
const SETTLE_CHECK_DELAY: Duration = Duration::from_millis(10);

/// Settle check delay for the world view transition. The world view jump usually crosses many
/// zoom levels, so the view is given more time before it is considered settled.
const WORLD_SETTLE_CHECK_DELAY: Duration = Duration::from_millis(100);

/// Zoom level of the world view.
const WORLD_VIEW_ZOOM: u32 = 3;

/// The tile layer is always the bottom layer; the radius overlay sits directly above it and
/// below everything else.
const TILE_LAYER_INDEX: usize = 0;
const OVERLAY_INDEX: usize = 1;

/// The current search radius: a center and a distance around it.
///
/// The circle polygon rendered for it is a derived artifact owned by the overlay layer; every
/// change of the search radius rebuilds that polygon from scratch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRadius {
    /// Center of the search.
    pub center: GeoPoint2d,
    /// Radius around the center, in meters.
    pub radius_m: f64,
}

/// Owns the map canvas state: the current view, the tile layer with its fallback provider, the
/// search-radius overlay, and view transitions with their completion signals.
///
/// Every view operation is a logged no-op until [`MapController::init`] has been called;
/// nothing here ever panics or returns an error to the embedder.
pub struct MapController {
    map: Option<Map>,
    tile_options: Option<TileLayerOptions>,
    default_view: ViewOptions,
    performance: PerformanceOptions,
    circle_style: CircleStyle,
    search_radius: Option<SearchRadius>,
    has_overlay: bool,
    use_dynamic_bounding_box: bool,
    pending: Vec<PendingTransition>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl MapController {
    /// Creates an uninitialized controller.
    pub fn new(
        default_view: ViewOptions,
        tile_options: TileLayerOptions,
        performance: PerformanceOptions,
        messenger: Option<Arc<dyn Messenger>>,
    ) -> Self {
        Self {
            map: None,
            tile_options: Some(tile_options),
            default_view,
            performance,
            circle_style: CircleStyle::default(),
            search_radius: None,
            has_overlay: false,
            use_dynamic_bounding_box: false,
            pending: Vec::new(),
            messenger,
        }
    }

    /// Initializes the map: creates the view and mounts the tile layer with the primary
    /// provider. A second call on an already initialized controller is a no-op.
    ///
    /// `center` and `zoom` override the configured default view; `use_dynamic_bounding_box`
    /// tells the embedder-facing layers whether marker updates should be followed by a
    /// [`MapController::fit_to_bounds`] call framing the whole result set.
    #[cfg(not(target_arch = "wasm32"))]
    pub fn init(
        &mut self,
        center: Option<GeoPoint2d>,
        zoom: Option<u32>,
        use_dynamic_bounding_box: bool,
    ) {
        use crate::layer::tile_layer::RestTileProvider;

        if self.map.is_some() {
            log::debug!("Map is already initialized");
            return;
        }

        let Some(tile_options) = self.tile_options.take() else {
            return;
        };
        let primary = RestTileProvider::new(tile_options.primary_provider);
        let fallback = RestTileProvider::new(tile_options.fallback_provider);
        self.finish_init(
            primary,
            fallback,
            tile_options.zoom_bounds,
            tile_options.attribution,
            center,
            zoom,
            use_dynamic_bounding_box,
        );
    }

    /// Same as [`MapController::init`], but with explicitly constructed tile providers. This is
    /// the initialization path for hosts without plain HTTP access (and for tests).
    pub fn init_with_providers(
        &mut self,
        primary: impl TileProvider + 'static,
        fallback: impl TileProvider + 'static,
        center: Option<GeoPoint2d>,
        zoom: Option<u32>,
        use_dynamic_bounding_box: bool,
    ) {
        if self.map.is_some() {
            log::debug!("Map is already initialized");
            return;
        }

        let Some(tile_options) = self.tile_options.take() else {
            return;
        };
        self.finish_init(
            primary,
            fallback,
            tile_options.zoom_bounds,
            tile_options.attribution,
            center,
            zoom,
            use_dynamic_bounding_box,
        );
    }

    #[allow(clippy::too_many_arguments)]
    fn finish_init(
        &mut self,
        primary: impl TileProvider + 'static,
        fallback: impl TileProvider + 'static,
        zoom_bounds: std::ops::RangeInclusive<u32>,
        attribution: Option<crate::attribution::Attribution>,
        center: Option<GeoPoint2d>,
        zoom: Option<u32>,
        use_dynamic_bounding_box: bool,
    ) {
        let mut tile_layer = TileLayer::new(primary, fallback, zoom_bounds, attribution);
        if let Some(messenger) = &self.messenger {
            use crate::layer::Layer;
            tile_layer.set_messenger(Box::new(messenger.clone()));
        }

        let view = MapView::new(
            center.unwrap_or(self.default_view.center),
            zoom.unwrap_or(self.default_view.zoom) as f64,
        );
        let messenger = self
            .messenger
            .as_ref()
            .map(|m| Box::new(m.clone()) as Box<dyn Messenger>);

        self.map = Some(Map::new(view, vec![Box::new(tile_layer)], messenger));
        self.use_dynamic_bounding_box = use_dynamic_bounding_box;
    }

    /// Returns true after a successful [`MapController::init`].
    pub fn is_initialized(&self) -> bool {
        self.map.is_some()
    }

    /// The current view, if the map is initialized.
    pub fn view(&self) -> Option<&MapView> {
        self.map.as_ref().map(|map| map.view())
    }

    /// The initialized map, if any.
    pub fn map(&self) -> Option<&Map> {
        self.map.as_ref()
    }

    /// Mutable access to the initialized map, if any.
    pub fn map_mut(&mut self) -> Option<&mut Map> {
        self.map.as_mut()
    }

    /// Whether marker updates should be followed by framing the whole result set.
    pub fn use_dynamic_bounding_box(&self) -> bool {
        self.use_dynamic_bounding_box
    }

    /// Sets the viewport size.
    pub fn set_size(&mut self, size: Size) {
        match self.map.as_mut() {
            Some(map) => map.set_size(size),
            None => log::error!("Ignoring set_size: {}", MagellanError::NotInitialized),
        }
    }

    /// Mounts the marker layer on top of all other layers.
    pub fn set_marker_layer(&mut self, layer: Arc<RwLock<MarkerLayer>>) {
        let Some(map) = self.map.as_mut() else {
            log::error!(
                "Ignoring set_marker_layer: {}",
                MagellanError::NotInitialized
            );
            return;
        };
        map.layers_mut().push(layer);
        map.redraw();
    }

    /// Recenters the map on the given point at the given zoom level.
    pub fn set_view(&mut self, lat: f64, lon: f64, zoom: u32, animate: bool) {
        let Some(map) = self.map.as_ref() else {
            log::error!("Ignoring set_view: {}", MagellanError::NotInitialized);
            return;
        };
        let target = map
            .view()
            .with_center(latlon!(lat, lon))
            .with_zoom(zoom as f64);
        let _ = self.begin_transition(target, animate, SETTLE_CHECK_DELAY);
    }

    /// Centers the map on a location and frames the given search radius around it: derives the
    /// zoom level from the radius, rebuilds the radius overlay, and starts the view transition.
    ///
    /// The returned handle resolves when the transition's animation finishes, or through the
    /// settle check when no movement was needed (see [`TransitionHandle`]).
    pub fn center_on_location(
        &mut self,
        lat: f64,
        lon: f64,
        radius_m: f64,
        animate: bool,
    ) -> TransitionHandle {
        let Some(map) = self.map.as_ref() else {
            log::error!(
                "Ignoring center_on_location: {}",
                MagellanError::NotInitialized
            );
            return TransitionHandle::resolved(TransitionOutcome::Skipped);
        };

        let center = latlon!(lat, lon);
        let zoom = zoom_for_radius(radius_m, lat, map.view().size());
        let target = map.view().with_center(center).with_zoom(zoom as f64);

        self.rebuild_overlay(center, radius_m);
        self.begin_transition(target, animate, SETTLE_CHECK_DELAY)
    }

    /// Shows the whole world: a fixed center over the Atlantic at a zoom level that fits all
    /// continents. The search-radius overlay is removed - it has no meaning outside proximity
    /// mode.
    pub fn show_world_view(&mut self, animate: bool) -> TransitionHandle {
        let Some(map) = self.map.as_ref() else {
            log::error!(
                "Ignoring show_world_view: {}",
                MagellanError::NotInitialized
            );
            return TransitionHandle::resolved(TransitionOutcome::Skipped);
        };

        let target = map
            .view()
            .with_center(latlon!(40.0, 0.0))
            .with_zoom(WORLD_VIEW_ZOOM as f64);

        self.search_radius = None;
        self.unmount_overlay();
        self.begin_transition(target, animate, WORLD_SETTLE_CHECK_DELAY)
    }

    /// Recomputes the zoom and the radius overlay for a changed radius, without the completion
    /// ceremony of [`MapController::center_on_location`]. Pass `animate = false` while the
    /// radius control is being dragged so the view keeps up with the pointer.
    pub fn adjust_zoom_to_radius(&mut self, lat: f64, lon: f64, radius_m: f64, animate: bool) {
        let Some(map) = self.map.as_ref() else {
            log::error!(
                "Ignoring adjust_zoom_to_radius: {}",
                MagellanError::NotInitialized
            );
            return;
        };

        let center = latlon!(lat, lon);
        let zoom = zoom_for_radius(radius_m, lat, map.view().size());
        let target = map.view().with_center(center).with_zoom(zoom as f64);

        self.rebuild_overlay(center, radius_m);
        let _ = self.begin_transition(target, animate, SETTLE_CHECK_DELAY);
    }

    /// Transitions the view so the given bounds are fully visible. Used with the dynamic
    /// bounding box mode to frame a refreshed result set.
    pub fn fit_to_bounds(&mut self, bounds: GeoBounds, animate: bool) -> TransitionHandle {
        let Some(map) = self.map.as_ref() else {
            log::error!("Ignoring fit_to_bounds: {}", MagellanError::NotInitialized);
            return TransitionHandle::resolved(TransitionOutcome::Skipped);
        };

        let center = bounds.center();
        let south_west = latlon!(bounds.south(), bounds.west());
        let north_east = latlon!(bounds.north(), bounds.east());
        let radius_m = Datum::SPHERE.great_circle_distance(&south_west, &north_east) / 2.0;

        let zoom = if radius_m > 0.0 {
            zoom_for_radius(radius_m, center.lat(), map.view().size())
        } else {
            map.view().zoom_rounded()
        };
        let target = map.view().with_center(center).with_zoom(zoom as f64);
        self.begin_transition(target, animate, SETTLE_CHECK_DELAY)
    }

    /// Shows the search-radius circle for the given center and radius. The overlay polygon is
    /// always rebuilt from scratch.
    pub fn show_radius_circle(&mut self, lat: f64, lon: f64, radius_m: f64) {
        if self.map.is_none() {
            log::error!(
                "Ignoring show_radius_circle: {}",
                MagellanError::NotInitialized
            );
            return;
        }
        self.rebuild_overlay(latlon!(lat, lon), radius_m);
    }

    /// Updates the search-radius circle. Equivalent to [`MapController::show_radius_circle`]:
    /// the overlay is a derived artifact and is recreated, never mutated.
    pub fn update_radius_circle(&mut self, lat: f64, lon: f64, radius_m: f64) {
        self.show_radius_circle(lat, lon, radius_m);
    }

    /// Removes the search-radius circle from the map.
    pub fn remove_radius_circle(&mut self) {
        if self.map.is_none() {
            log::error!(
                "Ignoring remove_radius_circle: {}",
                MagellanError::NotInitialized
            );
            return;
        }
        self.search_radius = None;
        self.unmount_overlay();
    }

    /// The current search radius, if any.
    pub fn search_radius(&self) -> Option<&SearchRadius> {
        self.search_radius.as_ref()
    }

    /// Returns true while the radius circle is mounted on the map.
    pub fn is_radius_circle_visible(&self) -> bool {
        self.has_overlay
    }

    /// Sets the style used for the search-radius circle. Takes effect on the next rebuild.
    pub fn set_circle_style(&mut self, style: CircleStyle) {
        self.circle_style = style;
    }

    /// The tile source the tile layer currently loads from.
    pub fn tile_source(&self) -> Option<TileSource> {
        let map = self.map.as_ref()?;
        map.layers()[TILE_LAYER_INDEX]
            .as_any()
            .downcast_ref::<TileLayer>()
            .map(|layer| layer.source())
    }

    /// Advances a running view animation and resolves pending transition completion signals.
    /// Call once per frame.
    pub fn animate(&mut self) {
        let Some(map) = self.map.as_mut() else {
            return;
        };

        let finished = map.animate();
        if self.pending.is_empty() {
            return;
        }

        let now = SystemTime::now();
        let view = *map.view();
        let mut still_pending = Vec::new();
        for pending in self.pending.drain(..) {
            if let Some(final_view) = &finished {
                if final_view.is_same_pose(&pending.target) {
                    let _ = pending.sender.send(TransitionOutcome::Finished);
                    continue;
                }
            }

            if now >= pending.settle_deadline && view.is_same_pose(&pending.target) {
                let _ = pending.sender.send(TransitionOutcome::Settled);
                continue;
            }

            still_pending.push(pending);
        }
        self.pending = still_pending;

        if !self.pending.is_empty() {
            // Keep frames coming until every pending transition resolves.
            map.redraw();
        }
    }

    /// Renders all layers for the current view into the given canvas.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        if let Some(map) = &self.map {
            map.render(canvas);
        }
    }

    /// Lets the layers start asynchronous work (tile loading) for the current view.
    pub fn prepare(&self) {
        if let Some(map) = &self.map {
            map.prepare();
        }
    }

    fn begin_transition(
        &mut self,
        target: MapView,
        animate: bool,
        settle_delay: Duration,
    ) -> TransitionHandle {
        // A new transition supersedes anything still pending; superseded handles are resolved
        // explicitly instead of being left to a settle check that may never match.
        for pending in self.pending.drain(..) {
            pending.supersede();
        }

        let Some(map) = self.map.as_mut() else {
            return TransitionHandle::resolved(TransitionOutcome::Skipped);
        };

        if map.view().is_same_pose(&target) {
            // No movement needed: no animation runs, so a finish notification would never
            // fire. The settle check resolves this transition on a later frame.
            let (handle, sender) = TransitionHandle::pending();
            self.pending.push(PendingTransition {
                target,
                settle_deadline: SystemTime::now() + settle_delay,
                sender,
            });
            map.redraw();
            return handle;
        }

        if animate && !self.performance.animation_duration.is_zero() {
            map.animate_to(target, self.performance.animation_duration);
            let (handle, sender) = TransitionHandle::pending();
            self.pending.push(PendingTransition {
                target,
                settle_deadline: SystemTime::now() + settle_delay,
                sender,
            });
            map.redraw();
            handle
        } else {
            map.set_view(target);
            TransitionHandle::resolved(TransitionOutcome::Finished)
        }
    }

    fn rebuild_overlay(&mut self, center: GeoPoint2d, radius_m: f64) {
        self.search_radius = Some(SearchRadius { center, radius_m });

        if radius_m <= 0.0 {
            // A collapsed circle is not worth mounting.
            self.unmount_overlay();
            return;
        }

        let overlay = CircleOverlay::new(center, radius_m, self.circle_style);
        let Some(map) = self.map.as_mut() else {
            return;
        };
        if self.has_overlay {
            map.layers_mut().remove(OVERLAY_INDEX);
        }
        map.layers_mut().insert(OVERLAY_INDEX, overlay);
        self.has_overlay = true;
        map.redraw();
    }

    fn unmount_overlay(&mut self) {
        if !self.has_overlay {
            return;
        }
        if let Some(map) = self.map.as_mut() {
            map.layers_mut().remove(OVERLAY_INDEX);
            map.redraw();
        }
        self.has_overlay = false;
    }
}
