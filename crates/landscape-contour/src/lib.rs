#![warn(missing_docs)]

//! Elevation grid sampling and contour stitching for the landscape engine.
//!
//! Building a contour map runs through a fixed sequence of stages, each
//! consuming the previous stage's output:
//!
//! 1. [`ElevationGrid::generate`] lays an N×N grid over the page
//! 2. [`plan_batches`] packs grid locations into size-limited requests
//! 3. [`fetch_elevations`] fills elevations through an injected fetcher
//! 4. [`classify`] groups near-integer samples into elevation bands
//! 5. [`build_contours`] stitches each band into one smoothed path
//!
//! # Example
//!
//! ```ignore
//! use landscape_contour::{extract_contours, ContourSettings, GridSpec};
//!
//! let map = extract_contours(&spec, &ContourSettings::default(), |batch| {
//!     provider.elevations(batch)
//! })?;
//! for line in &map.lines {
//!     println!("{}: {} strokes", line.label, line.chains);
//! }
//! ```

pub mod batch;
pub mod classify;
pub mod error;
pub mod grid;
pub mod stitch;

pub use batch::{
    fetch_elevations, plan_batches, BatchBudget, BatchFailure, ElevationBatch, ElevationSample,
    SampledGrid,
};
pub use classify::{
    classify, BandFilter, Classification, ClassifyStats, ElevationBand, ElevationRange,
};
pub use error::{ContourError, Result};
pub use grid::{ElevationGrid, GridPoint, GridSpec};
pub use stitch::{average_step, chain_points, consolidate, smooth, stitch, Stitched};

use std::fmt::Display;

use landscape_geom::PathData;
use landscape_math::Point2;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Contour extraction parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourSettings {
    /// Samples along each side of the grid.
    pub num_points: usize,
    /// Jump threshold as a multiple of the band's average point step.
    pub threshold_multiplier: f64,
    /// Elevation step between retained bands, in meters.
    pub contour_gap: u32,
    /// Fractional parts strictly inside this interval are treated as noise.
    pub noise_band: (f64, f64),
    /// Request size limit for elevation batches.
    pub batch: BatchBudget,
}

impl Default for ContourSettings {
    fn default() -> Self {
        Self {
            num_points: 350,
            threshold_multiplier: 2.0,
            contour_gap: 1,
            noise_band: (0.05, 0.95),
            batch: BatchBudget::default(),
        }
    }
}

impl ContourSettings {
    /// Band filter derived from these settings.
    pub fn filter(&self) -> BandFilter {
        BandFilter {
            contour_gap: self.contour_gap,
            noise_band: self.noise_band,
        }
    }

    /// Validate settings.
    pub fn validate(&self) -> Result<()> {
        if self.num_points < 2 {
            return Err(ContourError::InvalidSettings(
                "num_points must be at least 2".into(),
            ));
        }
        if !(self.threshold_multiplier > 0.0 && self.threshold_multiplier.is_finite()) {
            return Err(ContourError::InvalidSettings(
                "threshold_multiplier must be positive".into(),
            ));
        }
        if self.batch.max_bytes <= self.batch.overhead_bytes {
            return Err(ContourError::InvalidSettings(
                "batch max_bytes must exceed overhead_bytes".into(),
            ));
        }
        self.filter().validate()
    }
}

/// One contour-like stroke set for a single elevation.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourLine {
    /// Rounded elevation in meters.
    pub elevation: i64,
    /// Layer label, e.g. `"12m"`.
    pub label: String,
    /// All strokes of the band merged into one path.
    pub path: PathData,
    /// Number of strokes merged into `path`.
    pub chains: usize,
    /// Number of samples in the band.
    pub points: usize,
}

/// A finished contour map.
#[derive(Debug, Clone, PartialEq)]
pub struct ContourMap {
    /// Lines from highest to lowest elevation.
    pub lines: Vec<ContourLine>,
    /// Range of retained elevations.
    pub range: Option<ElevationRange>,
    /// Batches whose samples are missing.
    pub failures: Vec<BatchFailure>,
    /// Classification counts.
    pub stats: ClassifyStats,
}

/// Stitch every band into a [`ContourLine`], highest elevation first.
///
/// Bands are independent, so they are stitched in parallel; the output
/// order does not depend on scheduling.
pub fn build_contours(classification: &Classification, threshold_multiplier: f64) -> Vec<ContourLine> {
    let bands: Vec<&ElevationBand> = classification.descending().collect();
    bands
        .par_iter()
        .map(|band| {
            let points: Vec<Point2> = band.points.iter().map(|p| p.position).collect();
            let stitched = stitch(&points, threshold_multiplier);
            tracing::debug!(
                elevation = band.elevation,
                points = points.len(),
                chains = stitched.chains,
                threshold = stitched.threshold,
                "stitched elevation band"
            );
            ContourLine {
                elevation: band.elevation,
                label: band.label(),
                path: stitched.path,
                chains: stitched.chains,
                points: points.len(),
            }
        })
        .collect()
}

/// Run the whole pipeline from grid generation to stitched contours.
///
/// `fetch` is called once per batch. Failed batches are reported in the
/// returned map rather than aborting. Classification only starts once
/// every batch has been attempted.
pub fn extract_contours<F, E>(
    spec: &GridSpec,
    settings: &ContourSettings,
    fetch: F,
) -> Result<ContourMap>
where
    F: FnMut(&ElevationBatch) -> std::result::Result<Vec<ElevationSample>, E>,
    E: Display,
{
    settings.validate()?;
    let spec = GridSpec {
        points_per_side: settings.num_points,
        ..*spec
    };
    let grid = ElevationGrid::generate(spec)?;
    let batches = plan_batches(&grid.points, &settings.batch)?;
    tracing::info!(
        samples = grid.len(),
        batches = batches.len(),
        "requesting elevations"
    );

    let sampled = fetch_elevations(grid, &batches, fetch);
    let classification = classify(&sampled, &settings.filter());
    let lines = build_contours(&classification, settings.threshold_multiplier);

    tracing::info!(
        bands = lines.len(),
        failed_batches = sampled.failures.len(),
        "contour map built"
    );
    Ok(ContourMap {
        lines,
        range: classification.range,
        failures: sampled.failures,
        stats: classification.stats,
    })
}
