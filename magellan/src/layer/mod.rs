//! [Layers](Layer) specify a data source and the way the data should be rendered to the map.

use std::any::Any;
use std::sync::Arc;

use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::attribution::Attribution;
use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::view::MapView;

pub mod marker_layer;
pub mod overlay;
pub mod tile_layer;

pub use marker_layer::MarkerLayer;
pub use overlay::CircleOverlay;
pub use tile_layer::TileLayer;

/// Layers specify a data source and the way the data should be rendered to the map.
///
/// There are currently 3 types of layers:
/// * [`TileLayer`] - downloads prerendered tiles from an Internet source and draws them as is;
/// * [`MarkerLayer`] - draws points of interest as markers or cluster badges;
/// * [`CircleOverlay`] - draws the search-radius polygon.
pub trait Layer: MaybeSend + MaybeSync {
    /// Renders the layer for the given view into the given canvas.
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas);

    /// Prepares the layer for rendering with the given `view`. The preparation may include data
    /// downloading or other asynchronous operations which cannot be awaited for during the
    /// render cycle.
    fn prepare(&self, view: &MapView);

    /// Sets the messenger for the layer. Messenger is used to notify the application when the
    /// layer thinks it should be updated on the screen.
    fn set_messenger(&mut self, messenger: Box<dyn Messenger>);

    /// A map stores layers as trait objects. This method can be used to convert the trait
    /// object into the concrete type.
    fn as_any(&self) -> &dyn Any;

    /// A map stores layers as trait objects. This method can be used to convert the trait
    /// object into the concrete type.
    fn as_any_mut(&mut self) -> &mut dyn Any;

    /// Returns the attribution of the layer, if available.
    fn attribution(&self) -> Option<Attribution> {
        None
    }
}

impl<T: Layer + 'static> Layer for Arc<RwLock<T>> {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        self.read().render(view, canvas)
    }

    fn prepare(&self, view: &MapView) {
        self.read().prepare(view)
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.write().set_messenger(messenger)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.read().attribution()
    }
}
