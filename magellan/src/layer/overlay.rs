//! The search-radius overlay.

use std::any::Any;

use magellan_types::geo::GeoPoint2d;

use crate::color::Color;
use crate::geodesic;
use crate::layer::Layer;
use crate::messenger::Messenger;
use crate::render::{Canvas, PolygonStyle};
use crate::view::MapView;

/// Style of the search-radius circle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleStyle {
    /// Outline color.
    pub outline: Color,
    /// Outline width in pixels.
    pub outline_width: f32,
    /// Fill color.
    pub fill: Color,
}

impl Default for CircleStyle {
    fn default() -> Self {
        Self {
            outline: Color::rgba(51, 136, 255, 255),
            outline_width: 2.0,
            fill: Color::rgba(51, 136, 255, 40),
        }
    }
}

/// Layer drawing the polygon that approximates the current search radius.
///
/// The overlay is a derived artifact: it is built from a center and radius on construction and
/// never mutated afterwards. Changing the search radius means building a new overlay.
pub struct CircleOverlay {
    vertices: Vec<GeoPoint2d>,
    style: CircleStyle,
}

impl CircleOverlay {
    /// Builds the overlay for the given search radius.
    pub fn new(center: GeoPoint2d, radius_m: f64, style: CircleStyle) -> Self {
        Self {
            vertices: geodesic::circle_polygon(&center, radius_m, None),
            style,
        }
    }

    /// Vertices of the overlay polygon, without a duplicated closing vertex.
    pub fn vertices(&self) -> &[GeoPoint2d] {
        &self.vertices
    }
}

impl Layer for CircleOverlay {
    fn render(&self, view: &MapView, canvas: &mut dyn Canvas) {
        let projected: Vec<_> = self
            .vertices
            .iter()
            .map(|vertex| view.geo_to_screen(vertex))
            .collect();
        canvas.draw_polygon(
            &projected,
            &PolygonStyle {
                outline: self.style.outline,
                outline_width: self.style.outline_width,
                fill: self.style.fill,
            },
        );
    }

    fn prepare(&self, _view: &MapView) {
        // nothing to load
    }

    fn set_messenger(&mut self, _messenger: Box<dyn Messenger>) {
        // the overlay never changes after construction
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
