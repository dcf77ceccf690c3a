//! Batched elevation queries.
//!
//! The elevation provider accepts many locations per request but caps the
//! total request length. Locations are packed, in grid order, into
//! `locations=lat,lon|lat,lon|...` queries that stay within a byte budget.

use std::fmt::Display;

use landscape_math::LatLon;
use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};
use crate::grid::{ElevationGrid, GridPoint};

/// Query-length limit of a single elevation request.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchBudget {
    /// Maximum request length in bytes.
    pub max_bytes: usize,
    /// Bytes taken by the fixed parts of a request (URL prefix, API key).
    pub overhead_bytes: usize,
}

impl Default for BatchBudget {
    fn default() -> Self {
        Self {
            max_bytes: 8192,
            overhead_bytes: 0,
        }
    }
}

const QUERY_PREFIX: &str = "locations=";

/// A contiguous run of grid points fetched with one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationBatch {
    /// Batch number, starting at zero.
    pub index: usize,
    /// Grid index of the first location.
    pub start: usize,
    /// Locations in request order.
    pub locations: Vec<LatLon>,
    /// Encoded query, `locations=lat,lon|...`.
    pub query: String,
}

impl ElevationBatch {
    /// Number of locations in the batch.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    /// True when the batch holds no locations.
    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

fn encode(location: &LatLon) -> String {
    format!("{},{}", location.latitude, location.longitude)
}

/// Pack grid points into batches that respect `budget`.
///
/// Fails when a single location cannot fit into an empty request.
pub fn plan_batches(points: &[GridPoint], budget: &BatchBudget) -> Result<Vec<ElevationBatch>> {
    let mut batches: Vec<ElevationBatch> = Vec::new();
    let limit = budget.max_bytes.saturating_sub(budget.overhead_bytes);

    for point in points {
        let encoded = encode(&point.location);
        let fits = batches
            .last()
            .is_some_and(|b| b.query.len() + 1 + encoded.len() <= limit);

        if fits {
            if let Some(batch) = batches.last_mut() {
                batch.query.push('|');
                batch.query.push_str(&encoded);
                batch.locations.push(point.location);
            }
            continue;
        }

        let query = format!("{QUERY_PREFIX}{encoded}");
        if query.len() > limit {
            return Err(ContourError::InvalidSettings(format!(
                "batch budget of {} bytes ({} overhead) cannot hold a single location",
                budget.max_bytes, budget.overhead_bytes
            )));
        }
        batches.push(ElevationBatch {
            index: batches.len(),
            start: point.index,
            locations: vec![point.location],
            query,
        });
    }

    Ok(batches)
}

/// One element of an elevation response, in request order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ElevationSample {
    /// Elevation in meters; `None` when the provider has no data.
    pub elevation: Option<f64>,
    /// Location echoed back by the provider, if any.
    pub location: Option<LatLon>,
}

impl ElevationSample {
    /// Sample with a known elevation.
    pub fn new(elevation: f64) -> Self {
        Self {
            elevation: Some(elevation),
            location: None,
        }
    }
}

/// A batch whose request failed; its points stay without elevation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// Batch number.
    pub batch: usize,
    /// Number of locations left unsampled.
    pub locations: usize,
    /// Human-readable reason.
    pub message: String,
}

/// A grid whose samples have been filled from the provider.
#[derive(Debug, Clone, PartialEq)]
pub struct SampledGrid {
    /// Grid with elevations filled in where data arrived.
    pub grid: ElevationGrid,
    /// Batches that failed.
    pub failures: Vec<BatchFailure>,
}

impl SampledGrid {
    /// Number of samples that received an elevation.
    pub fn sampled(&self) -> usize {
        self.grid
            .points
            .iter()
            .filter(|p| p.elevation.is_some())
            .count()
    }
}

/// Fetch every batch and write the elevations into the grid.
///
/// A failing batch, or one whose response holds more samples than it
/// requested, is recorded in [`SampledGrid::failures`] and skipped; the
/// remaining batches still run. Short responses fill what they cover.
pub fn fetch_elevations<F, E>(
    mut grid: ElevationGrid,
    batches: &[ElevationBatch],
    mut fetch: F,
) -> SampledGrid
where
    F: FnMut(&ElevationBatch) -> std::result::Result<Vec<ElevationSample>, E>,
    E: Display,
{
    let mut failures = Vec::new();

    for batch in batches {
        let samples = match fetch(batch) {
            Ok(samples) => samples,
            Err(err) => {
                tracing::warn!(batch = batch.index, error = %err, "elevation batch failed");
                failures.push(BatchFailure {
                    batch: batch.index,
                    locations: batch.len(),
                    message: err.to_string(),
                });
                continue;
            }
        };

        if samples.len() > batch.len() {
            let message = format!(
                "provider returned {} samples for {} locations",
                samples.len(),
                batch.len()
            );
            tracing::warn!(batch = batch.index, "{message}");
            failures.push(BatchFailure {
                batch: batch.index,
                locations: batch.len(),
                message,
            });
            continue;
        }
        if samples.len() < batch.len() {
            tracing::warn!(
                batch = batch.index,
                received = samples.len(),
                requested = batch.len(),
                "short elevation response"
            );
        }

        for (offset, sample) in samples.iter().enumerate() {
            if let Some(point) = grid.points.get_mut(batch.start + offset) {
                point.elevation = sample.elevation.filter(|e| e.is_finite());
            }
        }
        tracing::debug!(batch = batch.index, samples = samples.len(), "elevation batch fetched");
    }

    SampledGrid { grid, failures }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridSpec;

    fn grid(n: usize) -> ElevationGrid {
        ElevationGrid::generate(GridSpec {
            width: 100.0,
            height: 100.0,
            points_per_side: n,
            scale_factor: 1.0,
            center: LatLon::new(-33.865, 151.2094),
        })
        .unwrap()
    }

    #[test]
    fn test_single_batch_when_budget_allows() {
        let g = grid(3);
        let batches = plan_batches(&g.points, &BatchBudget::default()).unwrap();
        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].len(), 9);
        assert!(batches[0].query.starts_with("locations=-33."));
        assert_eq!(batches[0].query.matches('|').count(), 8);
    }

    #[test]
    fn test_batches_respect_budget_and_cover_grid() {
        let g = grid(10);
        let budget = BatchBudget {
            max_bytes: 300,
            overhead_bytes: 40,
        };
        let batches = plan_batches(&g.points, &budget).unwrap();
        assert!(batches.len() > 1);
        let mut next = 0;
        for (i, b) in batches.iter().enumerate() {
            assert_eq!(b.index, i);
            assert_eq!(b.start, next);
            assert!(b.query.len() + budget.overhead_bytes <= budget.max_bytes);
            next += b.len();
        }
        assert_eq!(next, g.len());
    }

    #[test]
    fn test_budget_too_small() {
        let g = grid(2);
        let budget = BatchBudget {
            max_bytes: 20,
            overhead_bytes: 0,
        };
        assert!(matches!(
            plan_batches(&g.points, &budget),
            Err(ContourError::InvalidSettings(_))
        ));
    }

    #[test]
    fn test_failed_batch_leaves_points_absent() {
        let g = grid(4);
        let budget = BatchBudget {
            max_bytes: 120,
            overhead_bytes: 0,
        };
        let batches = plan_batches(&g.points, &budget).unwrap();
        assert!(batches.len() >= 3);

        let sampled = fetch_elevations(g, &batches, |b| {
            if b.index == 1 {
                Err("timeout")
            } else {
                Ok(b.locations.iter().map(|_| ElevationSample::new(12.0)).collect())
            }
        });

        assert_eq!(sampled.failures.len(), 1);
        assert_eq!(sampled.failures[0].batch, 1);
        assert_eq!(sampled.failures[0].message, "timeout");
        let failed = &batches[1];
        for p in &sampled.grid.points {
            let in_failed = p.index >= failed.start && p.index < failed.start + failed.len();
            assert_eq!(p.elevation.is_none(), in_failed);
        }
        assert_eq!(sampled.sampled(), sampled.grid.len() - failed.len());
    }

    #[test]
    fn test_oversized_response_is_rejected() {
        let g = grid(2);
        let batches = plan_batches(&g.points, &BatchBudget::default()).unwrap();
        let sampled = fetch_elevations(g, &batches, |b| {
            Ok::<_, String>(vec![ElevationSample::new(1.0); b.len() + 1])
        });
        assert_eq!(sampled.failures.len(), 1);
        assert_eq!(sampled.sampled(), 0);
    }

    #[test]
    fn test_short_response_fills_prefix() {
        let g = grid(2);
        let batches = plan_batches(&g.points, &BatchBudget::default()).unwrap();
        let sampled = fetch_elevations(g, &batches, |_| {
            Ok::<_, String>(vec![
                ElevationSample::new(3.0),
                ElevationSample {
                    elevation: None,
                    location: None,
                },
            ])
        });
        assert!(sampled.failures.is_empty());
        assert_eq!(sampled.grid.points[0].elevation, Some(3.0));
        assert_eq!(sampled.grid.points[1].elevation, None);
        assert_eq!(sampled.sampled(), 1);
    }
}
