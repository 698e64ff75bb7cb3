//! Configuration of the map engine.
//!
//! All options are plain values handed to the components at construction time. Nothing here is
//! global: two engines in the same process configured differently do not affect each other.

use std::ops::RangeInclusive;
use std::time::Duration;

use magellan_types::geo::GeoPoint2d;
use magellan_types::latlon;
use maybe_sync::{MaybeSend, MaybeSync};

use crate::attribution::Attribution;
use crate::layer::tile_layer::{TileIndex, UrlSource};
use crate::render::ClusterIcon;
use crate::zoom::{MAX_ZOOM, MIN_ZOOM};

/// Produces the badge icon for a cluster of the given member count.
pub trait ClusterIconFactory: (Fn(usize) -> ClusterIcon) + MaybeSend + MaybeSync {}
impl<T: Fn(usize) -> ClusterIcon + MaybeSend + MaybeSync> ClusterIconFactory for T {}

/// The view shown before the embedder requests anything else.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewOptions {
    /// Initial center of the map.
    pub center: GeoPoint2d,
    /// Initial zoom level.
    pub zoom: u32,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            center: latlon!(40.0, 0.0),
            zoom: 3,
        }
    }
}

/// Configuration of the base tile layer.
pub struct TileLayerOptions {
    /// URL source of the primary tile provider.
    pub primary_provider: Box<dyn UrlSource<TileIndex>>,
    /// URL source the layer switches to when the primary provider fails. The switch is one-way:
    /// the primary provider is never retried.
    pub fallback_provider: Box<dyn UrlSource<TileIndex>>,
    /// Attribution of the tile source.
    pub attribution: Option<Attribution>,
    /// Zoom levels the providers serve tiles for.
    pub zoom_bounds: RangeInclusive<u32>,
}

impl Default for TileLayerOptions {
    fn default() -> Self {
        Self {
            primary_provider: Box::new(|index: &TileIndex| {
                format!(
                    "https://tile.openstreetmap.org/{}/{}/{}.png",
                    index.z, index.x, index.y
                )
            }),
            fallback_provider: Box::new(|index: &TileIndex| {
                format!(
                    "https://tile.openstreetmap.de/{}/{}/{}.png",
                    index.z, index.x, index.y
                )
            }),
            attribution: Some(Attribution::new(
                "© OpenStreetMap contributors",
                Some("https://www.openstreetmap.org/copyright"),
            )),
            zoom_bounds: MIN_ZOOM..=MAX_ZOOM,
        }
    }
}

impl TileLayerOptions {
    /// Sets the primary tile provider.
    pub fn with_primary_provider(
        mut self,
        provider: impl UrlSource<TileIndex> + 'static,
    ) -> Self {
        self.primary_provider = Box::new(provider);
        self
    }

    /// Sets the fallback tile provider.
    pub fn with_fallback_provider(
        mut self,
        provider: impl UrlSource<TileIndex> + 'static,
    ) -> Self {
        self.fallback_provider = Box::new(provider);
        self
    }

    /// Sets the attribution of the tile source.
    pub fn with_attribution(mut self, attribution: Attribution) -> Self {
        self.attribution = Some(attribution);
        self
    }

    /// Sets the zoom levels the providers serve tiles for.
    pub fn with_zoom_bounds(mut self, bounds: RangeInclusive<u32>) -> Self {
        self.zoom_bounds = bounds;
        self
    }
}

/// Configuration of marker clustering.
pub struct ClusteringOptions {
    /// Markers closer than this many pixels to a cluster are merged into it.
    pub max_cluster_radius: f64,
    /// At this zoom level and above markers are never clustered. `None` keeps clustering active
    /// at all zoom levels.
    pub disable_clustering_at_zoom: Option<u32>,
    /// Expand a clicked cluster into its individual markers when the map is already at maximum
    /// zoom and the cluster cannot be split by zooming in.
    pub spiderfy_on_max_zoom: bool,
    /// Draw the geographic area covered by a cluster's members while the cluster is highlighted.
    pub show_coverage_on_hover: bool,
    /// Zoom the map to a cluster's bounds when the cluster is clicked.
    pub zoom_to_bounds_on_click: bool,
    /// Produces the badge icon for a cluster from its member count.
    pub icon_factory: Box<dyn ClusterIconFactory>,
}

impl Default for ClusteringOptions {
    fn default() -> Self {
        Self {
            max_cluster_radius: 80.0,
            disable_clustering_at_zoom: Some(17),
            spiderfy_on_max_zoom: true,
            show_coverage_on_hover: false,
            zoom_to_bounds_on_click: true,
            icon_factory: Box::new(default_cluster_icon),
        }
    }
}

impl ClusteringOptions {
    /// Sets the clustering radius in pixels.
    pub fn with_max_cluster_radius(mut self, radius: f64) -> Self {
        self.max_cluster_radius = radius;
        self
    }

    /// Sets the zoom level at which clustering is disabled.
    pub fn with_disable_clustering_at_zoom(mut self, zoom: Option<u32>) -> Self {
        self.disable_clustering_at_zoom = zoom;
        self
    }

    /// Sets the cluster icon factory.
    pub fn with_icon_factory(mut self, factory: impl ClusterIconFactory + 'static) -> Self {
        self.icon_factory = Box::new(factory);
        self
    }
}

/// Badge sizes follow the usual small/medium/large convention of web map cluster plugins.
fn default_cluster_icon(count: usize) -> ClusterIcon {
    let diameter_px = if count < 10 {
        40.0
    } else if count < 100 {
        50.0
    } else {
        60.0
    };

    ClusterIcon {
        diameter_px,
        label: count.to_string(),
    }
}

/// Performance-related tuning knobs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerformanceOptions {
    /// Point counts at or above this threshold are rendered as a clustered grouping; smaller
    /// sets are rendered flat.
    pub max_markers_before_clustering: usize,
    /// Duration of animated view transitions. A zero duration makes all transitions instant.
    pub animation_duration: Duration,
}

impl Default for PerformanceOptions {
    fn default() -> Self {
        Self {
            max_markers_before_clustering: 50,
            animation_duration: Duration::from_millis(300),
        }
    }
}

impl PerformanceOptions {
    /// Sets the clustering threshold.
    pub fn with_max_markers_before_clustering(mut self, threshold: usize) -> Self {
        self.max_markers_before_clustering = threshold;
        self
    }

    /// Sets the animation duration.
    pub fn with_animation_duration(mut self, duration: Duration) -> Self {
        self.animation_duration = duration;
        self
    }
}

/// Full engine configuration.
#[derive(Default)]
pub struct MapOptions {
    /// The view shown before the embedder requests anything else.
    pub default_view: ViewOptions,
    /// Base tile layer configuration.
    pub tile_layer: TileLayerOptions,
    /// Marker clustering configuration.
    pub clustering: ClusteringOptions,
    /// Performance tuning knobs.
    pub performance: PerformanceOptions,
    /// When set, the embedder is expected to frame the whole result set after each marker
    /// update (see `MapController::fit_to_bounds`) instead of keeping the current view.
    pub use_dynamic_bounding_box: bool,
}
