//! Rendering abstraction the layers draw into.
//!
//! The engine itself does not rasterize anything. Each frame the embedder hands the layers a
//! [`Canvas`] implementation (a 2d browser canvas, a GPU renderer, a test recorder) and the
//! layers describe what should be on the screen in viewport pixel coordinates.

use magellan_types::cartesian::{Point2, Size};

use crate::color::Color;
use crate::layer::tile_layer::TileData;

/// Axis-aligned rectangle in viewport pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenRect {
    /// Top-left corner of the rectangle.
    pub origin: Point2,
    /// Width and height of the rectangle.
    pub size: Size,
}

impl ScreenRect {
    /// Creates a new rectangle.
    pub fn new(origin: Point2, size: Size) -> Self {
        Self { origin, size }
    }
}

/// Style of a filled polygon, e.g. the search-radius overlay.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolygonStyle {
    /// Outline color.
    pub outline: Color,
    /// Outline width in pixels.
    pub outline_width: f32,
    /// Fill color.
    pub fill: Color,
}

/// Appearance of a single marker icon.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerPaint {
    /// Icon scale factor; `1.0` is the regular size.
    pub scale: f32,
    /// Glow outline drawn around the icon, if any.
    pub glow: Option<Color>,
}

impl Default for MarkerPaint {
    fn default() -> Self {
        Self {
            scale: 1.0,
            glow: None,
        }
    }
}

/// Icon of a cluster badge, as produced by the cluster icon factory.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterIcon {
    /// Diameter of the badge in pixels.
    pub diameter_px: f32,
    /// Label drawn inside the badge, normally the member count.
    pub label: String,
}

/// Appearance of a cluster badge.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterPaint {
    /// The badge icon.
    pub icon: ClusterIcon,
    /// Whether the badge is drawn with a highlight outline.
    pub outlined: bool,
    /// Whether the badge is pulsing.
    pub pulsing: bool,
}

/// A surface the layers draw into, one frame at a time. All coordinates are viewport pixels.
pub trait Canvas {
    /// Draws a map tile image into the given rectangle.
    fn draw_tile(&mut self, tile: &TileData, rect: ScreenRect);

    /// Draws a filled polygon. The outline between the last and the first vertex is closed by
    /// the canvas; the vertex list must not duplicate the first vertex at the end.
    fn draw_polygon(&mut self, vertices: &[Point2], style: &PolygonStyle);

    /// Draws a marker icon anchored at the given position.
    fn draw_marker(&mut self, position: Point2, paint: &MarkerPaint);

    /// Draws a cluster badge centered at the given position.
    fn draw_cluster(&mut self, position: Point2, paint: &ClusterPaint);
}

/// A single recorded draw call.
#[cfg(feature = "_tests")]
#[derive(Debug, Clone, PartialEq)]
pub enum DrawCall {
    /// A tile was drawn.
    Tile(ScreenRect),
    /// A polygon was drawn.
    Polygon(Vec<Point2>, PolygonStyle),
    /// A marker was drawn.
    Marker(Point2, MarkerPaint),
    /// A cluster badge was drawn.
    Cluster(Point2, ClusterPaint),
}

/// Canvas that records draw calls instead of rendering them. Used in tests.
#[cfg(feature = "_tests")]
#[derive(Debug, Default)]
pub struct RecordingCanvas {
    /// The draw calls recorded so far, in order.
    pub calls: Vec<DrawCall>,
}

#[cfg(feature = "_tests")]
impl RecordingCanvas {
    /// Creates an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded marker draw calls.
    pub fn markers(&self) -> Vec<(Point2, MarkerPaint)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Marker(position, paint) => Some((*position, *paint)),
                _ => None,
            })
            .collect()
    }

    /// Recorded cluster draw calls.
    pub fn clusters(&self) -> Vec<(Point2, ClusterPaint)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Cluster(position, paint) => Some((*position, paint.clone())),
                _ => None,
            })
            .collect()
    }

    /// Recorded polygon draw calls.
    pub fn polygons(&self) -> Vec<(Vec<Point2>, PolygonStyle)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                DrawCall::Polygon(vertices, style) => Some((vertices.clone(), *style)),
                _ => None,
            })
            .collect()
    }
}

#[cfg(feature = "_tests")]
impl Canvas for RecordingCanvas {
    fn draw_tile(&mut self, _tile: &TileData, rect: ScreenRect) {
        self.calls.push(DrawCall::Tile(rect));
    }

    fn draw_polygon(&mut self, vertices: &[Point2], style: &PolygonStyle) {
        self.calls.push(DrawCall::Polygon(vertices.to_vec(), *style));
    }

    fn draw_marker(&mut self, position: Point2, paint: &MarkerPaint) {
        self.calls.push(DrawCall::Marker(position, *paint));
    }

    fn draw_cluster(&mut self, position: Point2, paint: &ClusterPaint) {
        self.calls.push(DrawCall::Cluster(position, paint.clone()));
    }
}
