use serde::{Deserialize, Serialize};

use crate::geo::{GeoPoint, GeoPoint2d, NewGeoPoint};

/// Axis-aligned geographic bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    south: f64,
    west: f64,
    north: f64,
    east: f64,
}

impl GeoBounds {
    /// Creates bounds from the south-west and north-east corners.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        Self {
            south,
            west,
            north,
            east,
        }
    }

    /// Smallest bounds containing all the given points. Returns `None` for an empty iterator.
    pub fn from_points<'a, P: GeoPoint<Num = f64> + 'a>(
        points: impl IntoIterator<Item = &'a P>,
    ) -> Option<Self> {
        let mut bounds: Option<Self> = None;
        for point in points {
            bounds = Some(match bounds {
                None => Self::new(point.lat(), point.lon(), point.lat(), point.lon()),
                Some(b) => b.extended(point),
            });
        }

        bounds
    }

    /// Returns bounds extended to contain the given point.
    pub fn extended(&self, point: &impl GeoPoint<Num = f64>) -> Self {
        Self {
            south: self.south.min(point.lat()),
            west: self.west.min(point.lon()),
            north: self.north.max(point.lat()),
            east: self.east.max(point.lon()),
        }
    }

    /// Southern latitude.
    pub fn south(&self) -> f64 {
        self.south
    }

    /// Western longitude.
    pub fn west(&self) -> f64 {
        self.west
    }

    /// Northern latitude.
    pub fn north(&self) -> f64 {
        self.north
    }

    /// Eastern longitude.
    pub fn east(&self) -> f64 {
        self.east
    }

    /// Center of the bounds.
    pub fn center(&self) -> GeoPoint2d {
        GeoPoint2d::latlon(
            (self.south + self.north) / 2.0,
            (self.west + self.east) / 2.0,
        )
    }

    /// Corners of the bounds in counter-clockwise order starting from the south-west.
    pub fn corners(&self) -> [GeoPoint2d; 4] {
        [
            GeoPoint2d::latlon(self.south, self.west),
            GeoPoint2d::latlon(self.south, self.east),
            GeoPoint2d::latlon(self.north, self.east),
            GeoPoint2d::latlon(self.north, self.west),
        ]
    }
}
