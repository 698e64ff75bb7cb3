//! Events wiring the engine to its embedder.
//!
//! The embedder converts its own UI events (DOM listeners, winit events and the like) into
//! [`ListEvent`] values and feeds them to the [`SyncController`]; this mirrors how raw window
//! events are converted into user events before any map logic sees them. In the other
//! direction the engine publishes [`MapEvent`]s through the [`EventDispatcher`]; what happens
//! in response (opening a detail view, scrolling the list) is not this crate's business.

use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::RwLock;

use crate::layer::marker_layer::PlaceId;

mod sync;

pub use sync::{HighlightState, SyncController};

/// An event of the result list displayed next to the map, as observed by the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListEvent {
    /// The pointer entered the list item of the given place.
    ItemHovered(PlaceId),
    /// The list item of the given place was clicked.
    ItemClicked(PlaceId),
    /// The dedicated "center on map" control inside the item was clicked.
    CenterControlClicked(PlaceId),
    /// The pointer left the list container.
    ListLeft,
    /// The result list was replaced with fresh data; any references to its previous items are
    /// stale.
    ResultsRefreshed,
}

/// A notification published by the engine for the embedder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapEvent {
    /// A marker was selected on the map.
    MarkerSelected {
        /// Id of the selected place.
        place_id: PlaceId,
    },
    /// The map was centered on a place from the result list.
    MapCentered {
        /// Id of the place the map was centered on.
        place_id: PlaceId,
    },
}

/// Handler of outbound [`MapEvent`]s.
pub trait MapEventHandler: MaybeSend + MaybeSync {
    /// Handle the event.
    fn handle(&self, event: &MapEvent);
}

impl<T: Fn(&MapEvent)> MapEventHandler for T
where
    T: MaybeSend + MaybeSync,
{
    fn handle(&self, event: &MapEvent) {
        self(event)
    }
}

/// Fans outbound events out to the registered handlers, in registration order.
#[derive(Default)]
pub struct EventDispatcher {
    handlers: RwLock<Vec<Box<dyn MapEventHandler>>>,
}

impl EventDispatcher {
    /// Creates a dispatcher with no handlers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for all future events.
    pub fn subscribe(&self, handler: impl MapEventHandler + 'static) {
        self.handlers.write().push(Box::new(handler));
    }

    /// Publishes an event to all registered handlers.
    pub fn emit(&self, event: MapEvent) {
        log::trace!("Publishing {event:?}");
        for handler in self.handlers.read().iter() {
            handler.handle(&event);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use parking_lot::Mutex;

    use super::*;

    #[test]
    fn events_reach_all_handlers() {
        let dispatcher = EventDispatcher::new();
        let first = Arc::new(Mutex::new(Vec::new()));
        let second = Arc::new(Mutex::new(Vec::new()));

        let sink = first.clone();
        dispatcher.subscribe(move |event: &MapEvent| sink.lock().push(*event));
        let sink = second.clone();
        dispatcher.subscribe(move |event: &MapEvent| sink.lock().push(*event));

        dispatcher.emit(MapEvent::MarkerSelected { place_id: 7 });

        assert_eq!(&*first.lock(), &[MapEvent::MarkerSelected { place_id: 7 }]);
        assert_eq!(&*second.lock(), &[MapEvent::MarkerSelected { place_id: 7 }]);
    }
}
