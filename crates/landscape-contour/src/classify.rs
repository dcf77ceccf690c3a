//! Elevation band classification.
//!
//! Only samples that sit close to a whole meter are trusted as contour
//! candidates. Surviving samples are rounded and grouped by elevation,
//! keeping only multiples of the contour gap.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::batch::SampledGrid;
use crate::error::{ContourError, Result};
use crate::grid::GridPoint;

/// Filters applied while grouping samples into bands.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandFilter {
    /// Elevation step between retained bands, in meters.
    pub contour_gap: u32,
    /// Fractional parts strictly inside `(low, high)` are rejected.
    pub noise_band: (f64, f64),
}

impl Default for BandFilter {
    fn default() -> Self {
        Self {
            contour_gap: 1,
            noise_band: (0.05, 0.95),
        }
    }
}

impl BandFilter {
    /// Validate the filter.
    pub fn validate(&self) -> Result<()> {
        if self.contour_gap == 0 {
            return Err(ContourError::InvalidSettings(
                "contour_gap must be at least 1".into(),
            ));
        }
        let (low, high) = self.noise_band;
        if !(0.0..=1.0).contains(&low) || !(0.0..=1.0).contains(&high) || low >= high {
            return Err(ContourError::InvalidSettings(
                "noise_band must satisfy 0 <= low < high <= 1".into(),
            ));
        }
        Ok(())
    }

    /// Rounded elevation of a sample, or `None` when the sample is rejected.
    pub fn accept(&self, elevation: f64) -> Option<i64> {
        // Floor fraction, so -3.3 tests 0.7 rather than the truncated 0.3.
        let fraction = elevation - elevation.floor();
        let (low, high) = self.noise_band;
        if fraction > low && fraction < high {
            return None;
        }
        let rounded = elevation.round() as i64;
        if rounded.rem_euclid(i64::from(self.contour_gap)) != 0 {
            return None;
        }
        Some(rounded)
    }
}

/// Samples sharing one rounded elevation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationBand {
    /// Rounded elevation in meters.
    pub elevation: i64,
    /// Member samples in grid order.
    pub points: Vec<GridPoint>,
}

impl ElevationBand {
    /// Layer label, e.g. `"12m"`.
    pub fn label(&self) -> String {
        format!("{}m", self.elevation)
    }
}

/// Lowest and highest retained rounded elevation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElevationRange {
    /// Lowest band.
    pub min: i64,
    /// Highest band.
    pub max: i64,
}

impl ElevationRange {
    fn include(range: Option<Self>, elevation: i64) -> Self {
        match range {
            Some(r) => Self {
                min: r.min.min(elevation),
                max: r.max.max(elevation),
            },
            None => Self {
                min: elevation,
                max: elevation,
            },
        }
    }
}

/// Counts of samples dropped during classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifyStats {
    /// Samples without elevation data.
    pub missing: usize,
    /// Samples rejected by the filter.
    pub rejected: usize,
    /// Samples kept in a band.
    pub kept: usize,
}

/// Result of classifying a sampled grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Classification {
    /// Bands keyed by rounded elevation.
    pub bands: BTreeMap<i64, ElevationBand>,
    /// Range over all bands, `None` when nothing survived.
    pub range: Option<ElevationRange>,
    /// Drop counts.
    pub stats: ClassifyStats,
}

impl Classification {
    /// Bands from highest to lowest elevation.
    pub fn descending(&self) -> impl Iterator<Item = &ElevationBand> {
        self.bands.values().rev()
    }
}

/// Group the samples of a fully fetched grid into bands.
pub fn classify(sampled: &SampledGrid, filter: &BandFilter) -> Classification {
    let mut bands: BTreeMap<i64, ElevationBand> = BTreeMap::new();
    let mut range = None;
    let mut stats = ClassifyStats::default();

    for point in &sampled.grid.points {
        let Some(elevation) = point.elevation else {
            stats.missing += 1;
            continue;
        };
        let Some(rounded) = filter.accept(elevation) else {
            stats.rejected += 1;
            continue;
        };
        bands
            .entry(rounded)
            .or_insert_with(|| ElevationBand {
                elevation: rounded,
                points: Vec::new(),
            })
            .points
            .push(*point);
        range = Some(ElevationRange::include(range, rounded));
        stats.kept += 1;
    }

    tracing::debug!(
        bands = bands.len(),
        kept = stats.kept,
        rejected = stats.rejected,
        missing = stats.missing,
        "classified elevation samples"
    );
    Classification {
        bands,
        range,
        stats,
    }
}
