//! Coordinate engine
//!
//! Maps the domain space (hour of day × temperature) onto a fixed logical
//! rendering plane and back, and converts screen pixels reported by the
//! host into that plane.
//!
//! Pipeline: screen point → [`SurfaceTransform`] → logical point →
//! [`CoordinateMapper`] → (hour, temperature)

mod plane;
mod range;
mod surface;

pub use plane::{CoordinateMapper, Plane, Point};
pub use range::{compute_range, TemperatureRange};
pub use surface::{Matrix2D, Rect, SurfaceGeometry, SurfaceTransform};
