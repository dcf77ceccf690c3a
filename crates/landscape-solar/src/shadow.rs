//! Shadow vectors and footprint projection.
//!
//! Document coordinates have Y growing downward, so north is `-Y` and a
//! bearing `b` maps to the offset `(sin b, -cos b)`.

use landscape_geom::{convex_hull, Polygon};
use landscape_math::{normalize_degrees, Vec2};
use serde::{Deserialize, Serialize};

use crate::sun::SunPosition;

/// Smallest `tan(altitude)` used for shadow length.
pub const MIN_TAN_ALTITUDE: f64 = 1e-6;

/// Shadow cast by a vertical object of known height.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShadowVector {
    /// Length in the same unit as the object height.
    pub length: f64,
    /// Compass bearing in degrees the shadow points to.
    pub direction: f64,
}

impl ShadowVector {
    /// This shadow with its length multiplied by `factor`.
    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            length: self.length * factor,
            direction: self.direction,
        }
    }

    /// Document-space offset of the shadow tip.
    pub fn offset(&self) -> Vec2 {
        shadow_offset(self.length, self.direction)
    }
}

/// Shadow of an object of `height` under the sun at `sun`.
///
/// The shadow points away from the sun. When the sun sits on the horizon
/// the tangent is floored at [`MIN_TAN_ALTITUDE`] so the length stays
/// finite.
pub fn shadow_vector(height: f64, sun: &SunPosition) -> ShadowVector {
    let mut tan = sun.altitude.tan();
    if tan.abs() < MIN_TAN_ALTITUDE {
        tan = MIN_TAN_ALTITUDE;
    }
    ShadowVector {
        length: height / tan,
        direction: normalize_degrees(sun.azimuth + 180.0),
    }
}

/// Document-space offset for a shadow of `length` along bearing `direction`.
pub fn shadow_offset(length: f64, direction: f64) -> Vec2 {
    let bearing = direction.to_radians();
    Vec2::new(length * bearing.sin(), -length * bearing.cos())
}

/// Copy of `footprint` moved to the tip of its shadow.
pub fn project_shadow(footprint: &Polygon, length: f64, direction: f64) -> Polygon {
    footprint.translated(shadow_offset(length, direction))
}

/// Hull enveloping a footprint and its projected copy.
pub fn composite_shadow(original: &Polygon, projected: &Polygon) -> Polygon {
    let mut points = Vec::with_capacity(original.len() + projected.len());
    points.extend_from_slice(&original.points);
    points.extend_from_slice(&projected.points);
    Polygon::new(convex_hull(&points))
}
