use crate::geo::GeoPoint;

/// Parameters of the reference surface geographic coordinates are defined on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Datum {
    semimajor: f64,
    inv_flattening: f64,
}

impl Datum {
    /// WGS84 ellipsoid.
    pub const WGS84: Self = Datum {
        semimajor: 6_378_137.0,
        inv_flattening: 298.257223563,
    };

    /// Sphere with the mean Earth radius. Spherical geodesic formulas on this datum are accurate
    /// to a fraction of a percent, which is well below what is visible on a map screen.
    pub const SPHERE: Self = Datum {
        semimajor: 6_371_000.0,
        inv_flattening: f64::INFINITY,
    };

    /// Semimajor axis of the datum, in meters.
    pub fn semimajor(&self) -> f64 {
        self.semimajor
    }

    /// Inverse flattening of the datum.
    pub fn inv_flattening(&self) -> f64 {
        self.inv_flattening
    }

    /// Great-circle distance between two points in meters, computed with the haversine formula
    /// on a sphere with this datum's semimajor axis as radius.
    pub fn great_circle_distance(
        &self,
        a: &impl GeoPoint<Num = f64>,
        b: &impl GeoPoint<Num = f64>,
    ) -> f64 {
        let d_lat = b.lat_rad() - a.lat_rad();
        let d_lon = b.lon_rad() - a.lon_rad();

        let h = (d_lat / 2.0).sin().powi(2)
            + a.lat_rad().cos() * b.lat_rad().cos() * (d_lon / 2.0).sin().powi(2);
        2.0 * self.semimajor * h.sqrt().asin()
    }
}

impl Default for Datum {
    fn default() -> Self {
        Self::WGS84
    }
}
