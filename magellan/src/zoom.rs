//! Derivation of the zoom level that frames a search radius attractively in a viewport.

use magellan_types::cartesian::Size;

/// Length of the equator of the Web Mercator projection sphere, in meters.
pub const EARTH_CIRCUMFERENCE_M: f64 = 40_075_016.686;

/// Width and height of a map tile in pixels; the whole world is one such tile at zoom 0.
pub(crate) const TILE_SIZE: f64 = 256.0;

/// Lowest zoom level the engine will ever choose.
pub const MIN_ZOOM: u32 = 1;

/// Highest zoom level the engine will ever choose.
pub const MAX_ZOOM: u32 = 18;

/// The circle's diameter should occupy this share of the smaller viewport dimension.
const TARGET_DIAMETER_SHARE: f64 = 0.8;

/// Meters covered by one screen pixel at the given latitude and (possibly fractional) zoom
/// level. The `cos` factor compensates for the east-west stretching of the Mercator projection
/// away from the equator.
pub fn meters_per_pixel(latitude: f64, zoom: f64) -> f64 {
    EARTH_CIRCUMFERENCE_M * latitude.to_radians().cos().abs() / TILE_SIZE / 2f64.powf(zoom)
}

/// Returns the integer zoom level at which a circle of `radius_m` meters around a point at
/// `latitude` fills about 80% of the smaller dimension of `viewport`.
///
/// The zoom solves `radius_m = meters_per_pixel(latitude, zoom) * target_radius_px`, rounded to
/// the nearest integer and clamped into `[MIN_ZOOM, MAX_ZOOM]`. For a fixed latitude and
/// viewport the result is monotonically non-increasing in the radius.
///
/// Degenerate inputs never panic: a non-positive radius clamps to [`MAX_ZOOM`] (the tightest
/// framing), while an empty viewport or a polar latitude (where Mercator meters-per-pixel
/// degenerates to zero) clamps to [`MIN_ZOOM`].
pub fn zoom_for_radius(radius_m: f64, latitude: f64, viewport: Size) -> u32 {
    let target_radius_px = 0.5 * TARGET_DIAMETER_SHARE * viewport.min_dimension();
    let meters_per_pixel_at_zoom0 =
        EARTH_CIRCUMFERENCE_M * latitude.to_radians().cos().abs() / TILE_SIZE;

    if radius_m <= 0.0 {
        return MAX_ZOOM;
    }

    let zoom = (meters_per_pixel_at_zoom0 * target_radius_px / radius_m).log2();
    if !zoom.is_finite() {
        return MIN_ZOOM;
    }

    (zoom.round() as i64).clamp(MIN_ZOOM as i64, MAX_ZOOM as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn worked_example_at_the_equator() {
        // minDim = 600 -> targetRadiusPixels = 240; metersPerPixelAtZoom0 ~ 156543;
        // round(log2(156543 * 240 / 200000)) = round(7.55) = 8.
        let zoom = zoom_for_radius(200_000.0, 0.0, Size::new(800.0, 600.0));
        assert_eq!(zoom, 8);
    }

    #[test]
    fn zoom_is_always_in_range() {
        let viewport = Size::new(1024.0, 768.0);
        let mut radius_m = 1.0;
        while radius_m <= 20_000_000.0 {
            for latitude in [-89.0, -45.0, 0.0, 37.5, 60.0, 89.0] {
                let zoom = zoom_for_radius(radius_m, latitude, viewport);
                assert!((MIN_ZOOM..=MAX_ZOOM).contains(&zoom));
            }
            radius_m *= 3.0;
        }
    }

    #[test]
    fn zoom_does_not_increase_with_radius() {
        let viewport = Size::new(800.0, 600.0);
        for latitude in [0.0, 48.85, -33.9] {
            let near = zoom_for_radius(100_000.0, latitude, viewport);
            let far = zoom_for_radius(1_000_000.0, latitude, viewport);
            assert!(near >= far);
        }
    }

    #[test]
    fn polar_latitude_clamps_to_min_zoom() {
        assert_eq!(
            zoom_for_radius(100_000.0, 90.0, Size::new(800.0, 600.0)),
            MIN_ZOOM
        );
    }

    #[test]
    fn empty_viewport_clamps_to_min_zoom() {
        assert_eq!(zoom_for_radius(100_000.0, 0.0, Size::new(0.0, 0.0)), MIN_ZOOM);
    }

    #[test]
    fn meters_per_pixel_halves_with_each_zoom_level() {
        let at_5 = meters_per_pixel(0.0, 5.0);
        let at_6 = meters_per_pixel(0.0, 6.0);
        assert!((at_5 / at_6 - 2.0).abs() < 1e-12);
    }
}
