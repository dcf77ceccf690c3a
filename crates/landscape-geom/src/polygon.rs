//! Polygons, strokes, and the measurement helpers built on them.

use landscape_math::{Bounds2, Point2, Tolerance, Vec2};
use serde::{Deserialize, Serialize};

/// A 2D polygon (implicitly closed ring of vertices).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    /// Vertices of the polygon in order.
    pub points: Vec<Point2>,
}

impl Polygon {
    /// Create a new polygon from points.
    pub fn new(points: Vec<Point2>) -> Self {
        Self { points }
    }

    /// Check if the polygon is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of vertices.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Signed area of the polygon (shoelace formula).
    ///
    /// Positive for counter-clockwise in a Y-up frame. Fewer than three
    /// vertices contribute zero.
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        if n < 3 {
            return 0.0;
        }
        let mut area = 0.0;
        for i in 0..n {
            let j = (i + 1) % n;
            area += self.points[i].x * self.points[j].y;
            area -= self.points[j].x * self.points[i].y;
        }
        area / 2.0
    }

    /// Unsigned area in document units squared.
    pub fn area(&self) -> f64 {
        self.signed_area().abs()
    }

    /// Is the polygon counter-clockwise?
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    /// Vertex average of the polygon.
    pub fn centroid(&self) -> Point2 {
        if self.points.is_empty() {
            return Point2::origin();
        }
        let sum = self
            .points
            .iter()
            .fold(Vec2::zeros(), |acc, p| acc + p.coords);
        Point2::from(sum / self.points.len() as f64)
    }

    /// Axis-aligned bounds, `None` for an empty polygon.
    pub fn bounds(&self) -> Option<Bounds2> {
        Bounds2::from_points(&self.points)
    }

    /// Copy of the polygon moved by `offset`.
    pub fn translated(&self, offset: Vec2) -> Self {
        Self {
            points: self.points.iter().map(|p| p + offset).collect(),
        }
    }
}

/// An ordered stroke of document-space points.
///
/// Construction drops consecutive duplicate points, so no two adjacent
/// entries coincide. An empty input yields `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolyPath {
    points: Vec<Point2>,
}

impl PolyPath {
    /// Build a stroke from points, dropping consecutive duplicates.
    pub fn new(points: impl IntoIterator<Item = Point2>) -> Option<Self> {
        let tol = Tolerance::DEFAULT;
        let mut out: Vec<Point2> = Vec::new();
        for p in points {
            if out.last().is_some_and(|last| tol.points_equal(last, &p)) {
                continue;
            }
            out.push(p);
        }
        if out.is_empty() {
            None
        } else {
            Some(Self { points: out })
        }
    }

    /// Points of the stroke in order.
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    /// Number of points (always at least one).
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false; a stroke holds at least one point.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Sum of consecutive-vertex distances.
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| distance(&w[0], &w[1])).sum()
    }
}

/// Euclidean distance between two points.
pub fn distance(a: &Point2, b: &Point2) -> f64 {
    (b - a).norm()
}

/// Find the point nearest to `target`, ignoring indices for which `skip`
/// returns true.
///
/// Returns the index and distance. Ties keep the earliest index.
pub fn nearest(
    points: &[Point2],
    target: &Point2,
    mut skip: impl FnMut(usize) -> bool,
) -> Option<(usize, f64)> {
    let mut best: Option<(usize, f64)> = None;
    for (i, p) in points.iter().enumerate() {
        if skip(i) {
            continue;
        }
        let d = distance(target, p);
        if best.map_or(true, |(_, bd)| d < bd) {
            best = Some((i, d));
        }
    }
    best
}

/// Total area of a set of rings in square meters.
///
/// Each ring is measured independently with the shoelace formula and the
/// absolute values are summed; inner rings (holes) are added rather than
/// subtracted. Rings with fewer than three vertices contribute zero. The
/// sum is divided by `scale_factor²` (document units per meter).
pub fn scaled_area(rings: &[Vec<Point2>], scale_factor: f64) -> f64 {
    let total: f64 = rings
        .iter()
        .filter(|ring| ring.len() >= 3)
        .map(|ring| Polygon::new(ring.clone()).area())
        .sum();
    total / (scale_factor * scale_factor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Polygon {
        Polygon::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ])
    }

    #[test]
    fn test_polygon_area() {
        let sq = square(1.0);
        assert_relative_eq!(sq.signed_area(), 1.0);
        assert!(sq.is_ccw());
    }

    #[test]
    fn test_area_sign_invariant_under_winding() {
        let mut sq = square(3.0);
        let ccw = sq.area();
        sq.points.reverse();
        assert!(!sq.is_ccw());
        assert_relative_eq!(sq.area(), ccw);
    }

    #[test]
    fn test_area_invariant_under_rotation() {
        let pts = vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(5.0, 3.0),
            Point2::new(1.0, 4.0),
        ];
        let base = Polygon::new(pts.clone()).area();
        for shift in 1..pts.len() {
            let mut rotated = pts.clone();
            rotated.rotate_left(shift);
            assert_relative_eq!(Polygon::new(rotated).area(), base, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_degenerate_polygon_has_no_area() {
        let p = Polygon::new(vec![Point2::new(0.0, 0.0), Point2::new(1.0, 1.0)]);
        assert_eq!(p.signed_area(), 0.0);
    }

    #[test]
    fn test_centroid() {
        let sq = square(2.0);
        assert_eq!(sq.centroid(), Point2::new(1.0, 1.0));
    }

    #[test]
    fn test_translated() {
        let moved = square(1.0).translated(Vec2::new(2.0, -1.0));
        assert_eq!(moved.points[0], Point2::new(2.0, -1.0));
        assert_eq!(moved.points[2], Point2::new(3.0, 0.0));
    }

    #[test]
    fn test_distance_3_4_5() {
        assert_eq!(distance(&Point2::new(0.0, 0.0), &Point2::new(3.0, 4.0)), 5.0);
    }

    #[test]
    fn test_nearest_skips_and_keeps_first_tie() {
        let pts = [
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(-1.0, 0.0),
            Point2::new(5.0, 0.0),
        ];
        let (idx, d) = nearest(&pts, &Point2::new(0.0, 0.0), |i| i == 0).unwrap();
        assert_eq!(idx, 1);
        assert_relative_eq!(d, 1.0);
        assert!(nearest(&pts, &Point2::origin(), |_| true).is_none());
    }

    #[test]
    fn test_scaled_area() {
        let ring = square(10.0).points;
        // 10 units per meter: 100 units² = 1 m²
        assert_relative_eq!(scaled_area(&[ring], 10.0), 1.0);
    }

    #[test]
    fn test_scaled_area_adds_inner_rings() {
        // Holes are summed, not subtracted.
        let outer = square(10.0).points;
        let inner: Vec<Point2> = square(2.0)
            .translated(Vec2::new(4.0, 4.0))
            .points;
        assert_relative_eq!(scaled_area(&[outer, inner], 1.0), 104.0);
    }

    #[test]
    fn test_scaled_area_skips_short_rings() {
        let line = vec![Point2::new(0.0, 0.0), Point2::new(3.0, 3.0)];
        assert_eq!(scaled_area(&[line], 1.0), 0.0);
    }

    #[test]
    fn test_polypath_drops_consecutive_duplicates() {
        let path = PolyPath::new([
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(0.0, 0.0),
        ])
        .unwrap();
        assert_eq!(path.len(), 3);
        assert_relative_eq!(path.length(), 2.0);
        assert!(PolyPath::new(Vec::new()).is_none());
    }
}
