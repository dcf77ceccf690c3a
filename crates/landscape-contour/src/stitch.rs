//! Greedy nearest-neighbor stitching of unordered points into strokes.
//!
//! A band is an unordered point cloud. Strokes are grown from each
//! unvisited point by repeatedly jumping to the nearest unvisited point,
//! stopping when that jump would exceed a distance threshold. Each scan
//! is linear, so a band of `k` points costs `O(k²)`; bands stay small
//! once the noise filter has run.

use landscape_geom::{distance, nearest, PathData, PolyPath};
use landscape_math::Point2;

/// Mean distance between consecutive points in their given order.
///
/// This is a cheap density estimate over iteration order, not a true
/// nearest-neighbor average. Fewer than two points yield zero.
pub fn average_step(points: &[Point2]) -> f64 {
    if points.len() < 2 {
        return 0.0;
    }
    let total: f64 = points.windows(2).map(|w| distance(&w[0], &w[1])).sum();
    total / (points.len() - 1) as f64
}

/// Chain points into strokes of indices.
///
/// Every point lands in exactly one chain. Chains start at the earliest
/// unvisited point; a jump longer than `threshold` ends the chain.
pub fn chain_points(points: &[Point2], threshold: f64) -> Vec<Vec<usize>> {
    let mut visited = vec![false; points.len()];
    let mut chains = Vec::new();

    for start in 0..points.len() {
        if visited[start] {
            continue;
        }
        visited[start] = true;
        let mut chain = vec![start];
        let mut tail = start;

        while let Some((next, d)) = nearest(points, &points[tail], |i| visited[i]) {
            if d > threshold {
                break;
            }
            visited[next] = true;
            chain.push(next);
            tail = next;
        }
        chains.push(chain);
    }

    chains
}

/// Smooth a stroke with midpoint quadratic segments.
///
/// The stroke starts with a move to its first point. Every interior
/// point becomes a control point whose segment ends halfway to the next
/// point, and the final segment lands on the true last point, so the
/// curve is continuous with no sharp corners.
pub fn smooth(stroke: &PolyPath) -> PathData {
    let pts = stroke.points();
    let mut path = PathData::new();
    path.move_to(pts[0]);
    for i in 1..pts.len().saturating_sub(1) {
        let mid = midpoint(&pts[i], &pts[i + 1]);
        path.quad_to(pts[i], mid);
    }
    let last = pts[pts.len() - 1];
    path.quad_to(last, last);
    path
}

fn midpoint(a: &Point2, b: &Point2) -> Point2 {
    Point2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

/// Concatenate several paths into one drawable path.
pub fn consolidate<'a>(paths: impl IntoIterator<Item = &'a PathData>) -> PathData {
    let mut merged = PathData::new();
    for p in paths {
        merged.extend(p);
    }
    merged
}

/// Result of stitching one band.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitched {
    /// Smoothed strokes merged into one path.
    pub path: PathData,
    /// Number of strokes.
    pub chains: usize,
    /// Threshold that was applied.
    pub threshold: f64,
}

/// Stitch a band: estimate density, chain, smooth, and merge.
///
/// The jump threshold is `threshold_multiplier × average_step(points)`.
pub fn stitch(points: &[Point2], threshold_multiplier: f64) -> Stitched {
    let threshold = threshold_multiplier * average_step(points);
    let chains = chain_points(points, threshold);
    let strokes: Vec<PathData> = chains
        .iter()
        .filter_map(|chain| PolyPath::new(chain.iter().map(|&i| points[i])))
        .map(|stroke| smooth(&stroke))
        .collect();
    Stitched {
        path: consolidate(&strokes),
        chains: chains.len(),
        threshold,
    }
}
