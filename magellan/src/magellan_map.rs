//! Convenience wiring of the engine components.

use std::sync::Arc;

use magellan_types::cartesian::{Point2, Size};
use magellan_types::geo::GeoPoint2d;
use parking_lot::RwLock;

use crate::control::{EventDispatcher, ListEvent, SyncController};
use crate::layer::marker_layer::{ClickOutcome, MarkerLayer, PointOfInterest};
use crate::layer::tile_layer::TileProvider;
use crate::map::MapController;
use crate::messenger::Messenger;
use crate::options::MapOptions;
use crate::render::Canvas;

/// The whole engine assembled from its components: a [`MapController`], a
/// [`MarkerLayer`] and a [`SyncController`] sharing one [`EventDispatcher`].
///
/// Embedders that need custom composition (several marker layers, their own event routing) can
/// wire the components by hand instead; this struct adds no behavior of its own beyond the
/// glue the typical host needs:
///
/// * feed [`ListEvent`]s into [`MagellanMap::handle_list_event`];
/// * feed map click positions into [`MagellanMap::handle_map_click`];
/// * call [`MagellanMap::animate`] once per frame and [`MagellanMap::render`] to draw.
pub struct MagellanMap {
    controller: MapController,
    markers: Arc<RwLock<MarkerLayer>>,
    sync: SyncController,
    events: Arc<EventDispatcher>,
    use_dynamic_bounding_box: bool,
    markers_mounted: bool,
}

impl MagellanMap {
    /// Creates the engine from the given options. Call one of the init methods before anything
    /// else.
    pub fn new(options: MapOptions, messenger: Option<Arc<dyn Messenger>>) -> Self {
        let events = Arc::new(EventDispatcher::new());
        let markers = Arc::new(RwLock::new(MarkerLayer::new(
            options.clustering,
            options.performance.max_markers_before_clustering,
            events.clone(),
        )));
        let controller = MapController::new(
            options.default_view,
            options.tile_layer,
            options.performance,
            messenger,
        );

        Self {
            controller,
            markers,
            sync: SyncController::new(events.clone()),
            events,
            use_dynamic_bounding_box: options.use_dynamic_bounding_box,
            markers_mounted: false,
        }
    }

    /// Initializes the map with the configured tile providers and mounts the marker layer.
    /// Idempotent, like [`MapController::init`].
    #[cfg(not(target_arch = "wasm32"))]
    pub fn init(&mut self, center: Option<GeoPoint2d>, zoom: Option<u32>) {
        self.controller
            .init(center, zoom, self.use_dynamic_bounding_box);
        self.mount_markers();
    }

    /// Initializes the map with explicitly constructed tile providers and mounts the marker
    /// layer.
    pub fn init_with_providers(
        &mut self,
        primary: impl TileProvider + 'static,
        fallback: impl TileProvider + 'static,
        center: Option<GeoPoint2d>,
        zoom: Option<u32>,
    ) {
        self.controller.init_with_providers(
            primary,
            fallback,
            center,
            zoom,
            self.use_dynamic_bounding_box,
        );
        self.mount_markers();
    }

    fn mount_markers(&mut self) {
        if self.controller.is_initialized() && !self.markers_mounted {
            self.controller.set_marker_layer(self.markers.clone());
            self.markers_mounted = true;
        }
    }

    /// Replaces the rendered points of interest. In dynamic bounding box mode the view is then
    /// transitioned to frame the whole new set.
    pub fn update_markers(&mut self, points: &[PointOfInterest]) {
        self.markers.write().update_markers(points);

        if self.controller.use_dynamic_bounding_box() {
            let bounds = self.markers.read().bounds();
            if let Some(bounds) = bounds {
                let _ = self.controller.fit_to_bounds(bounds, true);
            }
        }
    }

    /// Handles one event of the embedder's result list.
    pub fn handle_list_event(&mut self, event: &ListEvent) {
        self.sync.handle(event, &mut self.controller, &self.markers);
    }

    /// Handles a click on the map at the given viewport position. Marker hits publish
    /// `marker-selected`; cluster hits zoom the view to the cluster's bounds.
    pub fn handle_map_click(&mut self, position: Point2) {
        let Some(view) = self.controller.view().copied() else {
            return;
        };

        let outcome = self.markers.write().handle_click(position, &view);
        if let ClickOutcome::ZoomToCluster(bounds) = outcome {
            let _ = self.controller.fit_to_bounds(bounds, true);
        }
    }

    /// Advances animations and transition completion. Call once per frame.
    pub fn animate(&mut self) {
        self.controller.animate();
    }

    /// Renders all layers into the given canvas.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        self.controller.render(canvas);
    }

    /// Lets the layers start asynchronous work for the current view.
    pub fn prepare(&self) {
        self.controller.prepare();
    }

    /// Sets the viewport size.
    pub fn set_size(&mut self, size: Size) {
        self.controller.set_size(size);
    }

    /// The map controller.
    pub fn controller(&self) -> &MapController {
        &self.controller
    }

    /// Mutable access to the map controller.
    pub fn controller_mut(&mut self) -> &mut MapController {
        &mut self.controller
    }

    /// The marker layer.
    pub fn markers(&self) -> &Arc<RwLock<MarkerLayer>> {
        &self.markers
    }

    /// The outbound event dispatcher.
    pub fn events(&self) -> &Arc<EventDispatcher> {
        &self.events
    }

    /// The list synchronization controller.
    pub fn sync(&self) -> &SyncController {
        &self.sync
    }
}
