//! Raster tile layer with an automatic one-way fallback between two providers.

use std::any::Any;
use std::ops::RangeInclusive;
use std::sync::Arc;

use bytes::Bytes;
use magellan_types::cartesian::{Point2, Size};
use maybe_sync::{MaybeSend, MaybeSync};
use parking_lot::Mutex;
use quick_cache::sync::Cache;

use crate::attribution::Attribution;
use crate::error::MagellanError;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::render::{Canvas, ScreenRect};
use crate::view::{mercator, world_meters_per_pixel, MapView};
use crate::zoom::EARTH_CIRCUMFERENCE_M;

const TILE_CACHE_SIZE: usize = 5000;

/// Tile index.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Hash)]
pub struct TileIndex {
    /// X index, counted from the west edge of the projected world.
    pub x: i32,
    /// Y index, counted from the north edge of the projected world.
    pub y: i32,
    /// Zoom level.
    pub z: u32,
}

impl TileIndex {
    /// Create a new index instance.
    pub fn new(x: i32, y: i32, z: u32) -> Self {
        Self { x, y, z }
    }
}

/// Source of tile URLs, usually a closure formatting the index into a URL template.
pub trait UrlSource<Key>: (Fn(&Key) -> String) + MaybeSend + MaybeSync {}
impl<Key, T: Fn(&Key) -> String + MaybeSend + MaybeSync> UrlSource<Key> for T {}

/// Undecoded tile image data. Decoding is the rendering backend's business; the engine only
/// moves the bytes around.
#[derive(Debug, Clone)]
pub struct TileData(Bytes);

impl TileData {
    /// Wraps raw image bytes.
    pub fn new(bytes: Bytes) -> Self {
        Self(bytes)
    }

    /// The image bytes.
    pub fn bytes(&self) -> &Bytes {
        &self.0
    }
}

/// Provider of tiles for a [`TileLayer`].
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait TileProvider: MaybeSend + MaybeSync {
    /// Loads the tile with the given index.
    async fn load(&self, index: TileIndex) -> Result<TileData, MagellanError>;
}

/// Tile provider that loads tiles one by one with REST HTTP GET requests, as used by the OSM
/// tile protocol, TMS, ArcGis TileService and similar services.
#[cfg(not(target_arch = "wasm32"))]
pub struct RestTileProvider {
    url_source: Box<dyn UrlSource<TileIndex>>,
    client: reqwest::Client,
}

#[cfg(not(target_arch = "wasm32"))]
impl RestTileProvider {
    /// Creates a new instance of the provider.
    pub fn new(url_source: impl UrlSource<TileIndex> + 'static) -> Self {
        Self {
            url_source: Box::new(url_source),
            client: reqwest::Client::new(),
        }
    }
}

#[cfg(not(target_arch = "wasm32"))]
#[async_trait::async_trait]
impl TileProvider for RestTileProvider {
    async fn load(&self, index: TileIndex) -> Result<TileData, MagellanError> {
        let url = (self.url_source)(&index);
        log::debug!("Loading {url}");
        let response = self.client.get(&url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(TileData::new(bytes))
    }
}

/// Tile provider that always fails. Used as a stand-in where no tile backend is wanted, e.g.
/// in tests.
#[cfg(feature = "_tests")]
#[derive(Debug, Default, Clone, Copy)]
pub struct DummyTileProvider;

#[cfg(feature = "_tests")]
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl TileProvider for DummyTileProvider {
    async fn load(&self, _index: TileIndex) -> Result<TileData, MagellanError> {
        Err(MagellanError::TileLoad)
    }
}

/// Which of the two configured providers the layer currently loads from. The state only ever
/// moves from `Primary` to `Fallback`, never back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileSource {
    /// The preferred provider the layer starts with.
    Primary,
    /// The provider used after the primary one has failed.
    Fallback,
}

enum TileState {
    Loading,
    Loaded(TileData),
    Error,
}

/// Tile layer loads prerendered raster tiles using a [`TileProvider`] and renders them to the
/// map. Tile load failures are not surfaced to the embedder: the first failure of the primary
/// provider switches the layer to the fallback provider for the rest of its life.
pub struct TileLayer {
    primary: Arc<dyn TileProvider>,
    fallback: Arc<dyn TileProvider>,
    source: Arc<Mutex<TileSource>>,
    tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
    zoom_bounds: RangeInclusive<u32>,
    attribution: Option<Attribution>,
    messenger: Option<Arc<dyn Messenger>>,
}

impl TileLayer {
    /// Creates a new layer.
    pub fn new(
        primary: impl TileProvider + 'static,
        fallback: impl TileProvider + 'static,
        zoom_bounds: RangeInclusive<u32>,
        attribution: Option<Attribution>,
    ) -> Self {
        Self {
            primary: Arc::new(primary),
            fallback: Arc::new(fallback),
            source: Arc::new(Mutex::new(TileSource::Primary)),
            tiles: Arc::new(Cache::new(TILE_CACHE_SIZE)),
            zoom_bounds,
            attribution,
            messenger: None,
        }
    }

    /// The provider the layer currently loads tiles from.
    pub fn source(&self) -> TileSource {
        *self.source.lock()
    }

    async fn load_tile(
        index: TileIndex,
        primary: Arc<dyn TileProvider>,
        fallback: Arc<dyn TileProvider>,
        source: Arc<Mutex<TileSource>>,
        tiles: Arc<Cache<TileIndex, Arc<TileState>>>,
        messenger: Option<Arc<dyn Messenger>>,
    ) {
        match tiles.get_value_or_guard_async(&index).await {
            Ok(_) => {}
            Err(guard) => {
                let _ = guard.insert(Arc::new(TileState::Loading));

                let use_fallback = *source.lock() == TileSource::Fallback;
                let load_result = if use_fallback {
                    fallback.load(index).await
                } else {
                    match primary.load(index).await {
                        Ok(tile) => Ok(tile),
                        Err(error) => {
                            {
                                let mut source = source.lock();
                                if *source == TileSource::Primary {
                                    log::warn!(
                                        "Primary tile provider failed for {index:?}: {error}; \
                                         switching to the fallback provider"
                                    );
                                    *source = TileSource::Fallback;
                                }
                            }
                            fallback.load(index).await
                        }
                    }
                };

                match load_result {
                    Ok(tile) => {
                        tiles.insert(index, Arc::new(TileState::Loaded(tile)));
                        if let Some(messenger) = messenger {
                            messenger.request_redraw();
                        }
                    }
                    Err(error) => {
                        log::debug!("Failed to load tile {index:?}: {error}");
                        tiles.insert(index, Arc::new(TileState::Error));
                    }
                }
            }
        }
    }

    /// Loads all tiles needed for the given view, awaiting each load.
    pub async fn load_tiles(&self, view: &MapView) {
        for (index, _) in self.visible_tiles(view) {
            Self::load_tile(
                index,
                self.primary.clone(),
                self.fallback.clone(),
                self.source.clone(),
                self.tiles.clone(),
                self.messenger.clone(),
            )
            .await;
        }
    }

    /// Tile indices needed to cover the view, with the viewport rectangle each one maps to.
    ///
    /// Indices are computed at the view's integer zoom level clamped into the layer's zoom
    /// bounds; during a zoom animation the tiles of the nearest level are scaled to the
    /// fractional zoom.
    fn visible_tiles(&self, view: &MapView) -> Vec<(TileIndex, ScreenRect)> {
        if view.size().is_zero() {
            return vec![];
        }

        let z = view
            .zoom_rounded()
            .clamp(*self.zoom_bounds.start(), *self.zoom_bounds.end());
        let tiles_per_side = 1i64 << z;
        let tile_world_size = EARTH_CIRCUMFERENCE_M / tiles_per_side as f64;
        let half_world = EARTH_CIRCUMFERENCE_M / 2.0;

        let scale = world_meters_per_pixel(view.zoom());
        let center = mercator(&view.center());
        let left = center.x - view.size().half_width() * scale;
        let right = center.x + view.size().half_width() * scale;
        let top = center.y + view.size().half_height() * scale;
        let bottom = center.y - view.size().half_height() * scale;

        let x_first = ((left + half_world) / tile_world_size).floor() as i64;
        let x_last = ((right + half_world) / tile_world_size).ceil() as i64;
        let y_first = (((half_world - top) / tile_world_size).floor() as i64).max(0);
        let y_last = (((half_world - bottom) / tile_world_size).ceil() as i64).min(tiles_per_side);

        let tile_px = tile_world_size / scale;

        let mut tiles = vec![];
        for y in y_first..y_last {
            for x in x_first..x_last {
                // Horizontal indices wrap over the antimeridian; the screen position keeps the
                // unwrapped index so a tile can appear on both sides of the seam.
                let index =
                    TileIndex::new(x.rem_euclid(tiles_per_side) as i32, y as i32, z);
                let origin = Point2::new(
                    ((x as f64 * tile_world_size - half_world) - left) / scale,
                    (top - (half_world - y as f64 * tile_world_size)) / scale,
                );
                tiles.push((
                    index,
                    ScreenRect::new(origin, Size::new(tile_px, tile_px)),
                ));
            }
        }

        tiles
    }
}

impl Layer for TileLayer {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        for (index, rect) in self.visible_tiles(view) {
            if let Some(state) = self.tiles.get(&index) {
                if let TileState::Loaded(tile) = &*state {
                    canvas.draw_tile(tile, rect);
                }
            }
        }
    }

    fn prepare(&self, view: &MapView) {
        for (index, _) in self.visible_tiles(view) {
            let primary = self.primary.clone();
            let fallback = self.fallback.clone();
            let source = self.source.clone();
            let tiles = self.tiles.clone();
            let messenger = self.messenger.clone();
            crate::async_runtime::spawn(async move {
                Self::load_tile(index, primary, fallback, source, tiles, messenger).await;
            });
        }
    }

    fn set_messenger(&mut self, messenger: Box<dyn Messenger>) {
        self.messenger = Some(Arc::from(messenger));
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn attribution(&self) -> Option<Attribution> {
        self.attribution.clone()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use magellan_types::latlon;

    use super::*;
    use crate::render::RecordingCanvas;
    use crate::zoom::{MAX_ZOOM, MIN_ZOOM};

    struct StaticProvider {
        result: Result<&'static [u8], ()>,
        load_count: Arc<AtomicUsize>,
    }

    impl StaticProvider {
        fn ok(bytes: &'static [u8]) -> (Self, Arc<AtomicUsize>) {
            let count = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    result: Ok(bytes),
                    load_count: count.clone(),
                },
                count,
            )
        }

        fn failing() -> (Self, Arc<AtomicUsize>) {
            let count = Arc::new(AtomicUsize::new(0));
            (
                Self {
                    result: Err(()),
                    load_count: count.clone(),
                },
                count,
            )
        }
    }

    #[async_trait::async_trait]
    impl TileProvider for StaticProvider {
        async fn load(&self, _index: TileIndex) -> Result<TileData, MagellanError> {
            self.load_count.fetch_add(1, Ordering::SeqCst);
            match self.result {
                Ok(bytes) => Ok(TileData::new(Bytes::from_static(bytes))),
                Err(()) => Err(MagellanError::TileLoad),
            }
        }
    }

    fn test_layer(primary: StaticProvider, fallback: StaticProvider) -> TileLayer {
        TileLayer::new(primary, fallback, MIN_ZOOM..=MAX_ZOOM, None)
    }

    #[test]
    fn fallback_switch_is_one_way() {
        let (primary, primary_count) = StaticProvider::failing();
        let (fallback, fallback_count) = StaticProvider::ok(b"tile");
        let layer = test_layer(primary, fallback);

        assert_eq!(layer.source(), TileSource::Primary);

        tokio_test::block_on(TileLayer::load_tile(
            TileIndex::new(0, 0, 1),
            layer.primary.clone(),
            layer.fallback.clone(),
            layer.source.clone(),
            layer.tiles.clone(),
            None,
        ));

        assert_eq!(layer.source(), TileSource::Fallback);
        assert_eq!(primary_count.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_count.load(Ordering::SeqCst), 1);

        // The next tile goes straight to the fallback; the primary is never retried.
        tokio_test::block_on(TileLayer::load_tile(
            TileIndex::new(1, 0, 1),
            layer.primary.clone(),
            layer.fallback.clone(),
            layer.source.clone(),
            layer.tiles.clone(),
            None,
        ));

        assert_eq!(primary_count.load(Ordering::SeqCst), 1);
        assert_eq!(fallback_count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn fallback_failure_does_not_switch_again() {
        let (primary, _) = StaticProvider::failing();
        let (fallback, _) = StaticProvider::failing();
        let layer = test_layer(primary, fallback);

        tokio_test::block_on(TileLayer::load_tile(
            TileIndex::new(0, 0, 1),
            layer.primary.clone(),
            layer.fallback.clone(),
            layer.source.clone(),
            layer.tiles.clone(),
            None,
        ));
        tokio_test::block_on(TileLayer::load_tile(
            TileIndex::new(1, 0, 1),
            layer.primary.clone(),
            layer.fallback.clone(),
            layer.source.clone(),
            layer.tiles.clone(),
            None,
        ));

        assert_eq!(layer.source(), TileSource::Fallback);
    }

    #[test]
    fn loaded_tiles_are_rendered() {
        let (primary, _) = StaticProvider::ok(b"tile");
        let (fallback, _) = StaticProvider::failing();
        let layer = test_layer(primary, fallback);

        let view = MapView::new(latlon!(0.0, 0.0), 2.0)
            .with_size(magellan_types::cartesian::Size::new(512.0, 512.0));
        tokio_test::block_on(layer.load_tiles(&view));

        let mut canvas = RecordingCanvas::new();
        layer.render(&view, &mut canvas);
        assert!(!canvas.calls.is_empty());
        assert_eq!(layer.source(), TileSource::Primary);
    }

    #[test]
    fn no_tiles_for_empty_viewport() {
        let (primary, _) = StaticProvider::ok(b"tile");
        let (fallback, _) = StaticProvider::failing();
        let layer = test_layer(primary, fallback);

        let view = MapView::new(latlon!(0.0, 0.0), 2.0);
        assert!(layer.visible_tiles(&view).is_empty());
    }
}
