#![warn(missing_docs)]

//! Polygon geometry and path data for the landscape engine.
//!
//! Pure functions shared by every drafting tool: shoelace areas,
//! bounds and centroids, nearest-point search, the monotone-chain
//! convex hull, and an SVG-compatible path data model that can be
//! parsed from and written back to a `d` attribute.

pub mod error;
pub mod hull;
pub mod path;
pub mod polygon;

pub use error::{GeomError, Result};
pub use hull::convex_hull;
pub use path::{PathCommand, PathData};
pub use polygon::{distance, nearest, scaled_area, PolyPath, Polygon};
