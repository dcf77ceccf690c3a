#![warn(missing_docs)]

//! Math types for the landscape site-analysis engine.
//!
//! Thin wrappers around nalgebra providing the types shared by every
//! drafting tool: document-space points and vectors, axis-aligned
//! bounds, tolerance constants, and the flat-earth geodetic constants
//! used to move between document offsets and latitude/longitude.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// A point in 2D document space (document units, Y grows downward).
pub type Point2 = nalgebra::Point2<f64>;

/// A vector in 2D document space.
pub type Vec2 = Vector2<f64>;

/// Average length of one degree of latitude, in meters.
pub const METERS_PER_DEGREE_LAT: f64 = 111_139.0;

/// Length of one degree of longitude at `latitude_deg`, in meters.
///
/// Uses the same spherical approximation as [`METERS_PER_DEGREE_LAT`]
/// scaled by the cosine of the latitude.
pub fn meters_per_degree_lon(latitude_deg: f64) -> f64 {
    METERS_PER_DEGREE_LAT * latitude_deg.to_radians().cos()
}

/// Wrap an angle in degrees into `[0, 360)`.
pub fn normalize_degrees(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    // rem_euclid can return exactly 360.0 for tiny negative inputs
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// A geodetic position in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    /// Latitude, positive north.
    pub latitude: f64,
    /// Longitude, positive east.
    pub longitude: f64,
}

impl LatLon {
    /// Create a new position.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// True when latitude is within [-90, 90] and longitude within [-180, 180].
    pub fn is_valid(&self) -> bool {
        (-90.0..=90.0).contains(&self.latitude) && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Axis-aligned bounding box in document space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds2 {
    /// Minimum corner (left, top).
    pub min: Point2,
    /// Maximum corner (right, bottom).
    pub max: Point2,
}

impl Bounds2 {
    /// Bounds of a point set, or `None` when the set is empty.
    pub fn from_points<'a>(points: impl IntoIterator<Item = &'a Point2>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = *iter.next()?;
        let mut bounds = Self {
            min: first,
            max: first,
        };
        for p in iter {
            bounds.include(p);
        }
        Some(bounds)
    }

    /// Grow the bounds to contain `p`.
    pub fn include(&mut self, p: &Point2) {
        self.min.x = self.min.x.min(p.x);
        self.min.y = self.min.y.min(p.y);
        self.max.x = self.max.x.max(p.x);
        self.max.y = self.max.y.max(p.y);
    }

    /// Width along X.
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    /// Height along Y.
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    /// Center of the box.
    pub fn center(&self) -> Point2 {
        nalgebra::center(&self.min, &self.max)
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in document units.
    pub linear: f64,
}

impl Tolerance {
    /// Default drafting tolerance (1e-9 document units).
    pub const DEFAULT: Self = Self { linear: 1e-9 };

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point2, b: &Point2) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meters_per_degree_lon_equator_and_pole() {
        assert!((meters_per_degree_lon(0.0) - METERS_PER_DEGREE_LAT).abs() < 1e-9);
        assert!(meters_per_degree_lon(90.0).abs() < 1e-9);
        assert!((meters_per_degree_lon(60.0) - METERS_PER_DEGREE_LAT / 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_normalize_degrees() {
        assert!((normalize_degrees(370.0) - 10.0).abs() < 1e-12);
        assert!((normalize_degrees(-90.0) - 270.0).abs() < 1e-12);
        assert_eq!(normalize_degrees(360.0), 0.0);
        assert_eq!(normalize_degrees(-1e-20), 0.0);
    }

    #[test]
    fn test_latlon_validity() {
        assert!(LatLon::new(45.0, -122.5).is_valid());
        assert!(LatLon::new(-90.0, 180.0).is_valid());
        assert!(!LatLon::new(90.5, 0.0).is_valid());
        assert!(!LatLon::new(0.0, -180.1).is_valid());
        assert!(!LatLon::new(f64::NAN, 0.0).is_valid());
    }

    #[test]
    fn test_bounds_from_points() {
        let pts = [
            Point2::new(1.0, 5.0),
            Point2::new(-2.0, 3.0),
            Point2::new(4.0, -1.0),
        ];
        let b = Bounds2::from_points(&pts).unwrap();
        assert_eq!(b.min, Point2::new(-2.0, -1.0));
        assert_eq!(b.max, Point2::new(4.0, 5.0));
        assert!((b.width() - 6.0).abs() < 1e-12);
        assert!((b.height() - 6.0).abs() < 1e-12);
        assert_eq!(b.center(), Point2::new(1.0, 2.0));
    }

    #[test]
    fn test_bounds_empty() {
        let pts: [Point2; 0] = [];
        assert!(Bounds2::from_points(&pts).is_none());
    }

    #[test]
    fn test_tolerance_points_equal() {
        let tol = Tolerance::DEFAULT;
        let a = Point2::new(1.0, 2.0);
        let b = Point2::new(1.0 + 1e-12, 2.0);
        assert!(tol.points_equal(&a, &b));
        let c = Point2::new(1.001, 2.0);
        assert!(!tol.points_equal(&a, &c));
    }
}
