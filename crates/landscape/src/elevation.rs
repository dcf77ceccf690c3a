//! Contour layer generation.

use landscape_contour::{
    extract_contours, BatchFailure, ClassifyStats, ContourSettings, ElevationRange, GridSpec,
};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Drawable, LayerPath, Shape};
use crate::error::{LandscapeError, Result};
use crate::fetch::DataFetcher;
use crate::metadata;

/// Layer holding one sub-layer per elevation band.
pub const ELEVATION_LAYER: &str = "elevation";

const CONTOUR_STYLE: &str = "fill:none;stroke:#000000;stroke-width:0.5";

/// One drawn elevation band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BandSummary {
    /// Rounded elevation in meters.
    pub elevation: i64,
    /// Strokes merged into the band's path.
    pub chains: usize,
    /// Samples in the band.
    pub points: usize,
}

/// Result of drawing contours.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevationReport {
    /// Drawn bands, highest first.
    pub bands: Vec<BandSummary>,
    /// Range of drawn elevations.
    pub range: Option<ElevationRange>,
    /// Batches that could not be fetched.
    pub failures: Vec<BatchFailure>,
    /// Sample classification counts.
    pub stats: ClassifyStats,
}

/// Sample elevations over the page and draw one contour path per band.
///
/// Bands go onto sub-layers of [`ELEVATION_LAYER`] labelled `"{e}m"`,
/// replacing earlier contours. Failed batches leave holes in the map;
/// if no batch succeeds the document is left unchanged.
pub fn draw_contours<D, F>(doc: &mut D, fetcher: &mut F, settings: &ContourSettings) -> Result<ElevationReport>
where
    D: Document + ?Sized,
    F: DataFetcher + ?Sized,
{
    let scale_factor = metadata::scale_factor(doc)?;
    let center = metadata::location(doc)?;
    let (width, height) = doc.page_size();
    let spec = GridSpec {
        width,
        height,
        points_per_side: settings.num_points,
        scale_factor,
        center,
    };

    let map = extract_contours(&spec, settings, |batch| fetcher.elevations(batch))?;
    let fetched = map.stats.kept + map.stats.rejected;
    if fetched == 0 && !map.failures.is_empty() {
        let reason = map
            .failures
            .first()
            .map(|f| f.message.clone())
            .unwrap_or_default();
        return Err(LandscapeError::ExternalFetchFailure(format!(
            "all {} elevation batches failed: {reason}",
            map.failures.len()
        )));
    }

    let root = LayerPath::top(ELEVATION_LAYER);
    doc.layer_mut(&root).layers.clear();
    for line in &map.lines {
        let id = doc.next_id("contour");
        doc.append_to_layer(
            &root.child(line.label.clone()),
            Drawable::new(id, Shape::path(&line.path))
                .with_label(line.label.clone())
                .with_style(CONTOUR_STYLE),
        );
    }

    tracing::info!(
        bands = map.lines.len(),
        failed_batches = map.failures.len(),
        "contours drawn"
    );
    Ok(ElevationReport {
        bands: map
            .lines
            .iter()
            .map(|l| BandSummary {
                elevation: l.elevation,
                chains: l.chains,
                points: l.points,
            })
            .collect(),
        range: map.range,
        failures: map.failures,
        stats: map.stats,
    })
}
