use maybe_sync::{MaybeSend, MaybeSync};

/// Messenger is used by the map and layers to notify the application that the map should be
/// redrawn on the screen, e.g. when a tile finishes loading or an animation is in progress.
pub trait Messenger: MaybeSend + MaybeSync {
    /// Request redraw of the map.
    fn request_redraw(&self);
}

impl<T: Messenger + ?Sized> Messenger for std::sync::Arc<T> {
    fn request_redraw(&self) {
        (**self).request_redraw()
    }
}

/// Messenger that ignores all requests. Useful for tests and for headless rendering.
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyMessenger {}

impl Messenger for DummyMessenger {
    fn request_redraw(&self) {}
}
