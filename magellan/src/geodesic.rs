//! Construction of geodesic circles: polygons whose vertices all lie at the same great-circle
//! distance from a center point.
//!
//! The vertices are connected by straight segments when rendered. At the point densities chosen
//! by [`circle_point_count`] this is visually indistinguishable from the true curve and keeps
//! polygon fill numerically stable.

use magellan_types::geo::{Datum, GeoPoint, GeoPoint2d, NewGeoPoint};

/// Number of polygon vertices used for a circle of the given radius when the caller does not
/// request a specific count. Larger circles cover more screen at the zoom levels they are viewed
/// on and need more vertices to stay visually smooth.
pub fn circle_point_count(radius_m: f64) -> usize {
    let radius_km = radius_m / 1_000.0;
    if radius_km <= 500.0 {
        64
    } else if radius_km <= 2_000.0 {
        96
    } else if radius_km <= 5_000.0 {
        128
    } else {
        180
    }
}

/// Builds a closed polygon approximating the circle of `radius_m` meters around `center`.
///
/// The polygon is ordered clockwise starting from due north. The first vertex is *not*
/// duplicated at the end: renderers close the ring themselves, and a duplicated closing vertex
/// causes fill artifacts.
///
/// Vertex `i` of `n` lies at bearing `i * (360 / n)` degrees from the center, at angular
/// distance `radius_m / R` along the great circle in that direction (spherical direct geodesic,
/// `R` being the mean Earth radius). Longitudes are wrapped into `[-180, 180]`; latitudes are
/// clamped into `[-90, 90]` to absorb floating point drift near the poles.
///
/// A zero radius is allowed and produces a polygon collapsed to the center point; whether such
/// a polygon is worth mounting is the caller's decision.
pub fn circle_polygon(
    center: &impl GeoPoint<Num = f64>,
    radius_m: f64,
    point_count: Option<usize>,
) -> Vec<GeoPoint2d> {
    let n = point_count.unwrap_or_else(|| circle_point_count(radius_m));
    let angular_distance = radius_m / Datum::SPHERE.semimajor();

    let lat1 = center.lat_rad();
    let lon1 = center.lon_rad();
    let (sin_lat1, cos_lat1) = lat1.sin_cos();
    let (sin_d, cos_d) = angular_distance.sin_cos();

    (0..n)
        .map(|i| {
            let bearing = i as f64 * std::f64::consts::TAU / n as f64;
            let sin_lat2 = sin_lat1 * cos_d + cos_lat1 * sin_d * bearing.cos();
            let lat2 = sin_lat2.asin();
            let lon2 =
                lon1 + (bearing.sin() * sin_d * cos_lat1).atan2(cos_d - sin_lat1 * sin_lat2);

            GeoPoint2d::latlon(
                lat2.to_degrees().clamp(-90.0, 90.0),
                wrap_longitude(lon2.to_degrees()),
            )
        })
        .collect()
}

fn wrap_longitude(lon: f64) -> f64 {
    (lon + 180.0).rem_euclid(360.0) - 180.0
}
