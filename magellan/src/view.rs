//! Current camera pose over the map: center, zoom and viewport size.

use magellan_types::cartesian::{Point2, Size};
use magellan_types::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};

use crate::zoom::{meters_per_pixel, EARTH_CIRCUMFERENCE_M};

/// Latitude/longitude difference below which two view centers are considered the same pose.
pub const POSE_TOLERANCE_DEG: f64 = 1e-6;

/// Radius of the Web Mercator projection sphere, in meters.
const MERCATOR_RADIUS_M: f64 = EARTH_CIRCUMFERENCE_M / std::f64::consts::TAU;

/// The mercator projection is cut off at this latitude, making the projected world square.
const MAX_MERCATOR_LATITUDE: f64 = 85.06;

/// MapView specifies the point of the map that is rendered, the zoom level it is rendered at,
/// and the size of the viewport it is rendered into.
///
/// The zoom is stored as `f64` because it interpolates smoothly during animated transitions;
/// target poses always carry integer-valued zooms.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MapView {
    center: GeoPoint2d,
    zoom: f64,
    size: Size,
}

impl MapView {
    /// Creates a new view centered on the given point.
    pub fn new(center: GeoPoint2d, zoom: f64) -> Self {
        Self {
            center,
            zoom,
            size: Size::default(),
        }
    }

    /// Center of the view.
    pub fn center(&self) -> GeoPoint2d {
        self.center
    }

    /// Zoom level of the view. Fractional values appear only mid-animation.
    pub fn zoom(&self) -> f64 {
        self.zoom
    }

    /// Zoom level rounded to the nearest integer level.
    pub fn zoom_rounded(&self) -> u32 {
        self.zoom.round().max(0.0) as u32
    }

    /// Size of the viewport in pixels.
    pub fn size(&self) -> Size {
        self.size
    }

    /// Returns a copy of the view with the center replaced.
    pub fn with_center(&self, center: GeoPoint2d) -> Self {
        Self { center, ..*self }
    }

    /// Returns a copy of the view with the zoom replaced.
    pub fn with_zoom(&self, zoom: f64) -> Self {
        Self { zoom, ..*self }
    }

    /// Returns a copy of the view with the viewport size replaced.
    pub fn with_size(&self, size: Size) -> Self {
        Self { size, ..*self }
    }

    /// Returns true if the other view points at the same pose: centers within
    /// [`POSE_TOLERANCE_DEG`] on both axes and exactly the same zoom.
    pub fn is_same_pose(&self, other: &MapView) -> bool {
        (self.center.lat() - other.center.lat()).abs() <= POSE_TOLERANCE_DEG
            && (self.center.lon() - other.center.lon()).abs() <= POSE_TOLERANCE_DEG
            && self.zoom == other.zoom
    }

    /// Meters covered by one screen pixel at the view's center latitude.
    pub fn resolution(&self) -> f64 {
        meters_per_pixel(self.center.lat(), self.zoom)
    }

    /// Projects a geographic point to viewport pixels, with the origin at the top-left corner.
    pub fn geo_to_screen(&self, point: &impl GeoPoint<Num = f64>) -> Point2 {
        let world = mercator(point);
        let center = mercator(&self.center);
        let scale = world_meters_per_pixel(self.zoom);

        Point2::new(
            self.size.half_width() + (world.x - center.x) / scale,
            self.size.half_height() - (world.y - center.y) / scale,
        )
    }

    /// Converts a viewport pixel position back to geographic coordinates.
    pub fn screen_to_geo(&self, position: Point2) -> GeoPoint2d {
        let center = mercator(&self.center);
        let scale = world_meters_per_pixel(self.zoom);

        let x = center.x + (position.x - self.size.half_width()) * scale;
        let y = center.y + (self.size.half_height() - position.y) * scale;

        GeoPoint2d::latlon(
            (y / MERCATOR_RADIUS_M).sinh().atan().to_degrees(),
            (x / MERCATOR_RADIUS_M).to_degrees(),
        )
    }

    /// View at fraction `k` of the way from this view to `target`. Used by view animations.
    pub(crate) fn interpolate(&self, target: &MapView, k: f64) -> Self {
        Self {
            center: GeoPoint2d::latlon(
                self.center.lat() + (target.center.lat() - self.center.lat()) * k,
                self.center.lon() + (target.center.lon() - self.center.lon()) * k,
            ),
            zoom: self.zoom + (target.zoom - self.zoom) * k,
            ..*self
        }
    }
}

/// Projects a geographic point into Web Mercator meters.
pub(crate) fn mercator(point: &impl GeoPoint<Num = f64>) -> Point2 {
    let lat = point
        .lat()
        .clamp(-MAX_MERCATOR_LATITUDE, MAX_MERCATOR_LATITUDE)
        .to_radians();
    Point2::new(
        MERCATOR_RADIUS_M * point.lon_rad(),
        MERCATOR_RADIUS_M * (std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln(),
    )
}

/// Converts Web Mercator meters back to geographic coordinates.
pub(crate) fn mercator_inverse(world: Point2) -> GeoPoint2d {
    GeoPoint2d::latlon(
        (world.y / MERCATOR_RADIUS_M).sinh().atan().to_degrees(),
        (world.x / MERCATOR_RADIUS_M).to_degrees(),
    )
}

/// Web Mercator meters covered by one pixel at the given zoom, at the equator of the projected
/// plane. Distances in projected meters divided by this value are screen pixel distances.
pub(crate) fn world_meters_per_pixel(zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M / crate::zoom::TILE_SIZE / 2f64.powf(zoom)
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;
    use magellan_types::latlon;

    use super::*;

    #[test]
    fn center_projects_to_screen_center() {
        let view = MapView::new(latlon!(48.85, 2.35), 10.0).with_size(Size::new(800.0, 600.0));
        let screen = view.geo_to_screen(&latlon!(48.85, 2.35));
        assert_abs_diff_eq!(screen.x, 400.0, epsilon = 1e-9);
        assert_abs_diff_eq!(screen.y, 300.0, epsilon = 1e-9);
    }

    #[test]
    fn screen_round_trip() {
        let view = MapView::new(latlon!(40.0, -3.7), 12.0).with_size(Size::new(1024.0, 768.0));
        let point = latlon!(40.01, -3.69);
        let screen = view.geo_to_screen(&point);
        let back = view.screen_to_geo(screen);
        assert_abs_diff_eq!(back.lat(), point.lat(), epsilon = 1e-9);
        assert_abs_diff_eq!(back.lon(), point.lon(), epsilon = 1e-9);
    }

    #[test]
    fn north_is_up() {
        let view = MapView::new(latlon!(0.0, 0.0), 5.0).with_size(Size::new(100.0, 100.0));
        let north = view.geo_to_screen(&latlon!(1.0, 0.0));
        assert!(north.y < 50.0);
    }

    #[test]
    fn same_pose_tolerance() {
        let view = MapView::new(latlon!(40.0, 0.0), 3.0);
        let close = MapView::new(latlon!(40.0 + 5e-7, 0.0 - 5e-7), 3.0);
        let off_zoom = MapView::new(latlon!(40.0, 0.0), 4.0);
        let off_center = MapView::new(latlon!(40.001, 0.0), 3.0);

        assert!(view.is_same_pose(&close));
        assert!(!view.is_same_pose(&off_zoom));
        assert!(!view.is_same_pose(&off_center));
    }

    #[test]
    fn interpolate_halfway() {
        let from = MapView::new(latlon!(0.0, 0.0), 4.0);
        let to = MapView::new(latlon!(10.0, 20.0), 8.0);
        let mid = from.interpolate(&to, 0.5);
        assert_abs_diff_eq!(mid.center().lat(), 5.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.center().lon(), 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(mid.zoom(), 6.0, epsilon = 1e-12);
    }
}
