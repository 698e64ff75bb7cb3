//! Geographic geometry types.

mod bounds;
mod datum;
mod point;

pub use bounds::GeoBounds;
pub use datum::Datum;
pub use point::{GeoPoint, GeoPoint2d, NewGeoPoint};
