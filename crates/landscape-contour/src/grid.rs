//! Sampling grid over the document footprint.

use landscape_math::{meters_per_degree_lon, LatLon, Point2, METERS_PER_DEGREE_LAT};
use serde::{Deserialize, Serialize};

use crate::error::{ContourError, Result};

/// Parameters of a sampling grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridSpec {
    /// Document width in document units.
    pub width: f64,
    /// Document height in document units.
    pub height: f64,
    /// Number of samples along each side (N×N grid).
    pub points_per_side: usize,
    /// Document units per meter.
    pub scale_factor: f64,
    /// Geodetic position of the document center.
    pub center: LatLon,
}

impl GridSpec {
    /// Validate the spec.
    pub fn validate(&self) -> Result<()> {
        if self.points_per_side < 2 {
            return Err(ContourError::InvalidGrid(
                "points_per_side must be at least 2".into(),
            ));
        }
        if !(self.width > 0.0 && self.height > 0.0) {
            return Err(ContourError::InvalidGrid(
                "document width and height must be positive".into(),
            ));
        }
        if !(self.scale_factor > 0.0 && self.scale_factor.is_finite()) {
            return Err(ContourError::InvalidGrid(
                "scale factor must be positive".into(),
            ));
        }
        if !self.center.is_valid() {
            return Err(ContourError::InvalidGrid(format!(
                "center {},{} is out of range",
                self.center.latitude, self.center.longitude
            )));
        }
        Ok(())
    }

    /// Spacing between samples along X and Y.
    pub fn spacing(&self) -> (f64, f64) {
        let steps = (self.points_per_side - 1) as f64;
        (self.width / steps, self.height / steps)
    }

    /// Geodetic position of a document-space point.
    ///
    /// Offsets from the page center are converted to meters through the
    /// scale factor and then to degrees with a flat-earth approximation.
    /// Document Y grows downward while latitude grows northward.
    pub fn locate(&self, position: &Point2) -> LatLon {
        let north_m = (self.height / 2.0 - position.y) / self.scale_factor;
        let east_m = (position.x - self.width / 2.0) / self.scale_factor;
        LatLon::new(
            self.center.latitude + north_m / METERS_PER_DEGREE_LAT,
            self.center.longitude + east_m / meters_per_degree_lon(self.center.latitude),
        )
    }
}

/// One sample of the grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridPoint {
    /// Position in generation order.
    pub index: usize,
    /// Document-space position.
    pub position: Point2,
    /// Geodetic position.
    pub location: LatLon,
    /// Elevation in meters, once fetched.
    pub elevation: Option<f64>,
}

/// The N×N sample grid.
#[derive(Debug, Clone, PartialEq)]
pub struct ElevationGrid {
    /// Spec the grid was generated from.
    pub spec: GridSpec,
    /// Samples, column by column (X outer, Y inner).
    pub points: Vec<GridPoint>,
}

impl ElevationGrid {
    /// Generate the grid for `spec`.
    ///
    /// Columns run left to right; within a column rows run from the
    /// bottom edge (`y = height`) to the top edge (`y = 0`).
    pub fn generate(spec: GridSpec) -> Result<Self> {
        spec.validate()?;
        let n = spec.points_per_side;
        let (dx, dy) = spec.spacing();

        let mut points = Vec::with_capacity(n * n);
        for col in 0..n {
            for row in 0..n {
                let position = Point2::new(col as f64 * dx, spec.height - row as f64 * dy);
                points.push(GridPoint {
                    index: points.len(),
                    position,
                    location: spec.locate(&position),
                    elevation: None,
                });
            }
        }

        tracing::debug!(samples = points.len(), dx, dy, "generated elevation grid");
        Ok(Self { spec, points })
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// True when the grid holds no samples.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}
