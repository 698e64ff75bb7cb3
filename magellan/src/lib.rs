//! Magellan is a map visualization engine for exploring points of interest, either within a
//! search radius around a location or worldwide. It renders a tiled base map with a
//! geodesically accurate search-radius overlay, manages marker and cluster lifecycle for a set
//! of points, and keeps an external result list and the rendered markers synchronized under
//! hover and click.
//!
//! # Main components
//!
//! Everything revolves around
//!
//! * [`MapController`], which owns the map: the current [`MapView`], the tile layer (with an
//!   automatic fallback provider), view transitions and the radius-circle overlay;
//! * [`MarkerLayer`](layer::MarkerLayer), which owns marker and cluster-group lifecycle for the
//!   current set of points of interest;
//! * [`SyncController`](control::SyncController), which keeps a result list rendered by the
//!   embedder consistent with whatever is currently visible on the map for each point - the
//!   marker itself, or the cluster hiding it.
//!
//! The engine does not talk to a windowing system or a GPU. The embedder feeds it events
//! ([`ListEvent`](control::ListEvent) for the result list, screen positions for map clicks),
//! calls [`MapController::animate`] once per frame, and renders the layers into its
//! [`Canvas`](render::Canvas) implementation. Outbound notifications (`marker-selected`,
//! `map-centered`) are published through the [`EventDispatcher`](control::EventDispatcher) and
//! consumed outside this crate.
//!
//! The [`MagellanMap`] facade wires these components together for embedders that do not need
//! custom composition.

#![warn(clippy::unwrap_used)]
#![warn(missing_docs)]

pub(crate) mod async_runtime;
mod attribution;
mod color;
pub mod control;
pub mod error;
pub mod geodesic;
pub mod layer;
mod magellan_map;
mod map;
mod messenger;
mod options;
pub mod render;
mod view;
pub mod zoom;

pub use attribution::Attribution;
pub use color::Color;
pub use magellan_map::MagellanMap;
pub use map::{
    LayerCollection, Map, MapController, SearchRadius, TransitionHandle, TransitionOutcome,
};
pub use messenger::{DummyMessenger, Messenger};
pub use options::{
    ClusterIconFactory, ClusteringOptions, MapOptions, PerformanceOptions, TileLayerOptions,
    ViewOptions,
};
pub use view::{MapView, POSE_TOLERANCE_DEG};

// Reexport magellan_types
pub use magellan_types;
