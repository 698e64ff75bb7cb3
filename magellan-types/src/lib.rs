//! Geometry primitives shared between the Magellan map engine and its embedders.
//!
//! The crate is split into two coordinate worlds:
//! * [`geo`] - positions on the surface of the Earth, expressed as latitude and longitude in
//!   degrees;
//! * [`cartesian`] - flat coordinates, used for screen pixels and projected (Web Mercator)
//!   positions.
//!
//! The engine never confuses the two: a [`geo::GeoPoint`] must be projected through the view
//! before it can be compared to anything measured in pixels.

pub mod cartesian;
pub mod geo;
