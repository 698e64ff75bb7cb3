//! The map itself and the controller driving it.

use std::time::Duration;

use magellan_types::cartesian::Size;
use web_time::SystemTime;

use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::render::Canvas;
use crate::view::MapView;

mod controller;
mod layer_collection;
mod transition;

pub use controller::{MapController, SearchRadius};
pub use layer_collection::LayerCollection;
pub use transition::{TransitionHandle, TransitionOutcome};

const FRAME_DURATION: Duration = Duration::from_millis(16);

/// Map specifies a set of layers, and the view that should be rendered.
///
/// The map itself is passive: it knows nothing about user input or data updates. Call
/// [`Map::animate`] once per frame to advance a running view animation, and [`Map::render`] to
/// draw the layers for the current view.
pub struct Map {
    view: MapView,
    layers: LayerCollection,
    messenger: Option<Box<dyn Messenger>>,
    animation: Option<AnimationParameters>,
}

struct AnimationParameters {
    start_view: MapView,
    end_view: MapView,
    start_time: SystemTime,
    duration: Duration,
}

impl Map {
    /// Creates a new map.
    pub fn new(
        view: MapView,
        layers: Vec<Box<dyn Layer>>,
        messenger: Option<Box<dyn Messenger>>,
    ) -> Self {
        Self {
            view,
            layers: layers.into(),
            messenger,
            animation: None,
        }
    }

    /// Current view of the map.
    pub fn view(&self) -> &MapView {
        &self.view
    }

    /// Returns the list of map's layers.
    pub fn layers(&self) -> &LayerCollection {
        &self.layers
    }

    /// Returns a mutable reference to the list of map's layers.
    pub fn layers_mut(&mut self) -> &mut LayerCollection {
        &mut self.layers
    }

    /// Changes the view of the map to the given one, cancelling a running animation.
    pub fn set_view(&mut self, view: MapView) {
        self.animation = None;
        self.view = view;
        self.redraw();
    }

    /// Request redraw of the map.
    pub fn redraw(&self) {
        if let Some(messenger) = &self.messenger {
            messenger.request_redraw()
        }
    }

    /// Update the view of the map before rendering in case [`Map::animate_to`] was called.
    ///
    /// Returns the final view when the animation reached its target on this tick - the "move
    /// finished" notification consumers of transition handles wait for.
    pub fn animate(&mut self) -> Option<MapView> {
        let animation = self.animation.as_ref()?;

        let now = SystemTime::now();
        let k = now
            .duration_since(animation.start_time)
            .unwrap_or_default()
            .as_millis() as f64
            / animation.duration.as_millis() as f64;

        if k >= 1.0 {
            let animation = self
                .animation
                .take()
                .expect("the value was removed unexpectedly");
            self.view = animation.end_view.with_size(self.view.size());
            self.redraw();
            Some(self.view)
        } else {
            self.view = animation
                .start_view
                .interpolate(&animation.end_view, k)
                .with_size(self.view.size());
            self.redraw();
            None
        }
    }

    /// Target view of the current animation, or the current view if nothing is animating.
    pub fn target_view(&self) -> &MapView {
        self.animation
            .as_ref()
            .map(|animation| &animation.end_view)
            .unwrap_or(&self.view)
    }

    /// Returns true if a view animation is in progress.
    pub fn is_animating(&self) -> bool {
        self.animation.is_some()
    }

    /// Request a gradual change of the map view to the specified view.
    pub fn animate_to(&mut self, target: MapView, duration: Duration) {
        self.animation = Some(AnimationParameters {
            start_view: self.view,
            end_view: target,
            // Start one frame in the past so that the first `animate` tick makes visible
            // progress (and a zero-duration animation completes immediately).
            start_time: SystemTime::now() - FRAME_DURATION,
            duration,
        });
    }

    /// Set the size of the map.
    pub fn set_size(&mut self, new_size: Size) {
        self.view = self.view.with_size(new_size);
    }

    /// Sets the new event messenger for the map.
    pub fn set_messenger(&mut self, messenger: Option<impl Messenger + 'static>) {
        self.messenger = messenger.map(|m| Box::new(m) as Box<dyn Messenger>);
    }

    /// Renders all layers for the current view into the given canvas.
    pub fn render(&self, canvas: &mut dyn Canvas) {
        for layer in self.layers.iter() {
            layer.render(&self.view, canvas);
        }
    }

    /// Lets every layer start the asynchronous work it needs for the current view.
    pub fn prepare(&self) {
        for layer in self.layers.iter() {
            layer.prepare(&self.view);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use magellan_types::geo::GeoPoint;
    use magellan_types::latlon;

    use super::*;

    struct CountingMessenger(Arc<AtomicUsize>);

    impl Messenger for CountingMessenger {
        fn request_redraw(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn test_map() -> (Map, Arc<AtomicUsize>) {
        let redraws = Arc::new(AtomicUsize::new(0));
        let map = Map::new(
            MapView::new(latlon!(0.0, 0.0), 3.0),
            vec![],
            Some(Box::new(CountingMessenger(redraws.clone()))),
        );
        (map, redraws)
    }

    #[test]
    fn set_view_requests_redraw() {
        let (mut map, redraws) = test_map();
        map.set_view(MapView::new(latlon!(10.0, 10.0), 5.0));
        assert_eq!(map.view().center(), latlon!(10.0, 10.0));
        assert_eq!(redraws.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn zero_duration_animation_completes_on_first_tick() {
        let (mut map, _) = test_map();
        let target = MapView::new(latlon!(10.0, 10.0), 5.0);
        map.animate_to(target, Duration::ZERO);
        assert!(map.is_animating());

        let finished = map.animate();
        assert_eq!(finished.map(|view| view.center()), Some(latlon!(10.0, 10.0)));
        assert!(!map.is_animating());
        assert_eq!(map.view().zoom(), 5.0);
    }

    #[test]
    fn animation_interpolates_towards_target() {
        let (mut map, _) = test_map();
        map.animate_to(MapView::new(latlon!(10.0, 20.0), 5.0), Duration::from_secs(60));

        assert!(map.animate().is_none());
        let mid = *map.view();
        assert!(mid.center().lat() > 0.0 && mid.center().lat() < 10.0);
        assert!(mid.zoom() > 3.0 && mid.zoom() < 5.0);
    }

    #[test]
    fn animate_without_animation_is_a_no_op() {
        let (mut map, redraws) = test_map();
        assert!(map.animate().is_none());
        assert_eq!(redraws.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn target_view_during_animation() {
        let (mut map, _) = test_map();
        let target = MapView::new(latlon!(10.0, 20.0), 5.0);
        map.animate_to(target, Duration::from_secs(60));
        assert_eq!(map.target_view().center(), latlon!(10.0, 20.0));
    }
}
