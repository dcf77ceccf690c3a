//! Monotone-chain convex hull.

use landscape_math::Point2;

/// Z component of `(a - o) × (b - o)`.
fn cross(o: &Point2, a: &Point2, b: &Point2) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

/// Convex hull of a point set.
///
/// Points are sorted lexicographically by `(x, y)` and exact duplicates
/// removed. The lower and upper chains discard every non-left turn, so
/// collinear points on an edge are dropped. The result starts at the
/// lowest `(x, y)` point and is counter-clockwise in a Y-up frame.
///
/// Degenerate input (fewer than three distinct points, or all points
/// collinear) returns the sorted unique points instead of failing.
pub fn convex_hull(points: &[Point2]) -> Vec<Point2> {
    let mut sorted: Vec<Point2> = points.to_vec();
    sorted.sort_by(|a, b| a.x.total_cmp(&b.x).then(a.y.total_cmp(&b.y)));
    sorted.dedup();

    if sorted.len() < 3 {
        return sorted;
    }

    let mut lower: Vec<Point2> = Vec::with_capacity(sorted.len());
    for p in &sorted {
        while lower.len() >= 2 && cross(&lower[lower.len() - 2], &lower[lower.len() - 1], p) <= 0.0
        {
            lower.pop();
        }
        lower.push(*p);
    }

    let mut upper: Vec<Point2> = Vec::with_capacity(sorted.len());
    for p in sorted.iter().rev() {
        while upper.len() >= 2 && cross(&upper[upper.len() - 2], &upper[upper.len() - 1], p) <= 0.0
        {
            upper.pop();
        }
        upper.push(*p);
    }

    lower.pop();
    upper.pop();
    lower.extend(upper);

    if lower.len() < 3 {
        // All input points were collinear.
        return sorted;
    }
    lower
}
