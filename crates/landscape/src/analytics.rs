//! Area and rainfall analytics over closed shapes.

use chrono::{Months, NaiveDate};
use landscape_geom::{scaled_area, PathData};
use landscape_math::{Bounds2, Point2};
use serde::{Deserialize, Serialize};

use crate::document::{Document, Drawable, LayerPath, Shape};
use crate::error::{LandscapeError, Result};
use crate::fetch::DataFetcher;
use crate::metadata::{self, ANNUAL_RAINFALL};

/// Layer receiving the site outline.
pub const SITE_LAYER: &str = "site boundaries";
/// Layer whose closed paths are labelled with rainfall volumes.
pub const PRECIPITATION_LAYER: &str = "Precipitation";

/// Annual rainfall volume in m³ over `area_m2` for `annual_rainfall_mm`.
pub fn rainfall_volume(area_m2: f64, annual_rainfall_mm: f64) -> f64 {
    area_m2 * (annual_rainfall_mm / 1000.0)
}

/// Area of every subpath of `path` in square meters.
///
/// Subpath areas are summed, so inner loops add to the total.
pub fn path_area(path: &PathData, scale_factor: f64) -> f64 {
    scaled_area(&path.subpaths(), scale_factor)
}

/// Path data of a drawable that must be a closed path.
pub fn closed_path(drawable: &Drawable) -> Result<PathData> {
    let Shape::Path { d } = &drawable.shape else {
        return Err(LandscapeError::InvalidSelection(format!(
            "'{}' is a {}, not a closed path",
            drawable.id,
            drawable.shape.kind()
        )));
    };
    let path = PathData::parse(d)
        .map_err(|e| LandscapeError::InvalidSelection(format!("'{}': {e}", drawable.id)))?;
    if !path.is_closed() {
        return Err(LandscapeError::InvalidSelection(format!(
            "'{}' is not a closed path",
            drawable.id
        )));
    }
    Ok(path)
}

pub(crate) fn selected<'d, D: Document + ?Sized>(
    doc: &'d D,
    selection: Option<&str>,
) -> Result<(LayerPath, &'d Drawable)> {
    let id = selection.ok_or_else(|| LandscapeError::InvalidSelection("nothing selected".into()))?;
    doc.find_drawable(id)
        .ok_or_else(|| LandscapeError::InvalidSelection(format!("no shape with id '{id}'")))
}

/// Result of outlining the site.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiteReport {
    /// Site area rounded to whole square meters.
    pub area_m2: f64,
}

/// Mark the selected closed path as the site boundary.
///
/// The outline moves to the site layer over a translucent page cover,
/// with a caption giving the area.
pub fn site_boundary<D: Document + ?Sized>(doc: &mut D, selection: Option<&str>) -> Result<SiteReport> {
    let (_, drawable) = selected(doc, selection)?;
    let id = drawable.id.clone();
    let path = closed_path(drawable)?;
    let scale = metadata::scale_factor(doc)?;
    let area_m2 = path_area(&path, scale).round();

    let (width, height) = doc.page_size();
    let cover_id = doc.next_id("site-cover");
    let caption_id = doc.next_id("site-area");
    let outline = doc
        .take_drawable(&id)
        .ok_or_else(|| LandscapeError::InvalidSelection(format!("no shape with id '{id}'")))?;

    let layer = LayerPath::top(SITE_LAYER);
    doc.append_to_layer(&layer, outline);
    doc.append_to_layer(
        &layer,
        Drawable::new(
            cover_id,
            Shape::Rect {
                origin: Point2::origin(),
                width,
                height,
            },
        )
        .with_style("fill:#ffffff;fill-opacity:0.7;stroke:none"),
    );
    doc.append_to_layer(
        &layer,
        Drawable::new(
            caption_id,
            Shape::Text {
                anchor: Point2::new(10.0, 20.0),
                text: format!("Site area: {area_m2:.0} m²"),
            },
        )
        .with_style("font-size:12px; font-family:Arial"),
    );
    tracing::info!(area_m2, "site boundary set");
    Ok(SiteReport { area_m2 })
}

/// Volume figures for one labelled shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatchmentLabel {
    /// Drawable id.
    pub id: String,
    /// Area in m².
    pub area_m2: f64,
    /// Annual rainfall volume in m³.
    pub volume_m3: f64,
}

/// Result of labelling the precipitation layer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PrecipitationReport {
    /// Shapes that received a label.
    pub labelled: Vec<CatchmentLabel>,
    /// Ids of shapes skipped because they are not closed paths.
    pub skipped: Vec<String>,
}

/// Label every closed path on the precipitation layer with its yearly
/// rainfall volume.
pub fn label_precipitation<D: Document + ?Sized>(doc: &mut D) -> Result<PrecipitationReport> {
    let layer_path = LayerPath::top(PRECIPITATION_LAYER);
    let layer = doc.find_layer(&layer_path).ok_or_else(|| {
        LandscapeError::MissingPrerequisite(format!("no '{PRECIPITATION_LAYER}' layer"))
    })?;
    let rainfall = metadata::require_annual_rainfall(doc)?;
    let scale = metadata::scale_factor(doc)?;

    let mut report = PrecipitationReport::default();
    for drawable in &layer.drawables {
        match closed_path(drawable) {
            Ok(path) => {
                let area_m2 = path_area(&path, scale);
                report.labelled.push(CatchmentLabel {
                    id: drawable.id.clone(),
                    area_m2,
                    volume_m3: rainfall_volume(area_m2, rainfall),
                });
            }
            Err(err) => {
                tracing::debug!(id = %drawable.id, error = %err, "skipping shape");
                report.skipped.push(drawable.id.clone());
            }
        }
    }

    let layer = doc.layer_mut(&layer_path);
    for label in &report.labelled {
        if let Some(d) = layer.drawables.iter_mut().find(|d| d.id == label.id) {
            d.label = Some(format!(
                "{:.2} m³/year [{:.2}m²]",
                label.volume_m3, label.area_m2
            ));
        }
        tracing::info!(
            id = %label.id,
            rainfall_mm = rainfall,
            area_m2 = label.area_m2,
            volume_m3 = label.volume_m3,
            "catchment labelled"
        );
    }
    Ok(report)
}

/// Result of annotating a structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StructureReport {
    /// Layer the structure now lives on.
    pub layer: LayerPath,
    /// Footprint area in m².
    pub area_m2: f64,
    /// Yearly rainfall on the footprint in m³, when rainfall is known.
    pub rainfall_m3: Option<f64>,
}

/// Move a structure onto its own layer and annotate its size and
/// rainfall catchment.
pub fn structure_information<D: Document + ?Sized>(
    doc: &mut D,
    selection: Option<&str>,
) -> Result<StructureReport> {
    let (parent, drawable) = selected(doc, selection)?;
    let id = drawable.id.clone();
    let name = drawable.label.clone().unwrap_or_else(|| "Structure".to_string());
    let path = closed_path(drawable)?;
    metadata::latitude(doc)?;
    let scale = metadata::scale_factor(doc)?;
    let rainfall = metadata::annual_rainfall(doc)?;

    let bounds = Bounds2::from_points(&path.vertices())
        .ok_or_else(|| LandscapeError::InvalidSelection(format!("'{id}' has no vertices")))?;
    let area_m2 = path_area(&path, scale);
    let rainfall_m3 = rainfall.map(|mm| rainfall_volume(area_m2, mm));

    let layer = parent.child(name);
    let structure = doc
        .take_drawable(&id)
        .ok_or_else(|| LandscapeError::InvalidSelection(format!("no shape with id '{id}'")))?;
    doc.append_to_layer(&layer, structure);
    annotate(doc, &layer, "size", format!("Area: {area_m2:.2} m²"), &bounds, 0.4);
    if let Some(volume) = rainfall_m3 {
        annotate(
            doc,
            &layer,
            "precipitation",
            format!("Rainfall: {volume:.2} m³"),
            &bounds,
            0.5,
        );
    } else {
        tracing::warn!(id = %id, "annual rainfall not set; rainfall volume omitted");
    }

    tracing::info!(id = %id, area_m2, "structure annotated");
    Ok(StructureReport {
        layer,
        area_m2,
        rainfall_m3,
    })
}

/// Centered caption on its own sub-layer, `depth` of the way down the box.
fn annotate<D: Document + ?Sized>(
    doc: &mut D,
    parent: &LayerPath,
    sublayer: &str,
    text: String,
    bounds: &Bounds2,
    depth: f64,
) {
    let anchor = Point2::new(
        bounds.min.x + bounds.width() / 2.0,
        bounds.min.y + bounds.height() * depth,
    );
    let font_size = (bounds.width() / 10.0).min(bounds.height() / 10.0);
    let id = doc.next_id("text");
    doc.append_to_layer(
        &parent.child(sublayer),
        Drawable::new(id, Shape::Text { anchor, text }).with_style(format!(
            "font-size:{font_size}px; font-family:Arial; text-anchor:middle;"
        )),
    );
}

/// Historical rainfall summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RainfallAverage {
    /// Average yearly rainfall in millimeters.
    pub annual_mm: f64,
    /// First day requested.
    pub start: NaiveDate,
    /// Day after the last day requested.
    pub end: NaiveDate,
    /// Days in the series.
    pub days: usize,
    /// Days without data.
    pub missing_days: usize,
}

/// Average yearly rainfall over the `years` before `end`, stored in the
/// document metadata.
///
/// Days without data count as dry. A failed request leaves the metadata
/// unchanged.
pub fn annual_rainfall_average<D, F>(
    doc: &mut D,
    fetcher: &mut F,
    end: NaiveDate,
    years: u32,
) -> Result<RainfallAverage>
where
    D: Document + ?Sized,
    F: DataFetcher + ?Sized,
{
    if years == 0 {
        return Err(LandscapeError::InvalidInput("history must span at least one year".into()));
    }
    let location = metadata::location(doc)?;
    let start = end
        .checked_sub_months(Months::new(years.saturating_mul(12)))
        .ok_or_else(|| LandscapeError::InvalidInput(format!("{years} years before {end}")))?;

    let series = fetcher.daily_precipitation(location, start, end)?;
    if series.is_empty() {
        return Err(LandscapeError::MalformedExternalData(
            "precipitation series is empty".into(),
        ));
    }
    let missing_days = series.iter().filter(|v| v.is_none()).count();
    let total: f64 = series.iter().flatten().sum();
    let annual_mm = total / f64::from(years);

    doc.set_metadata(ANNUAL_RAINFALL, annual_mm.to_string());
    tracing::info!(
        %start,
        %end,
        days = series.len(),
        missing_days,
        annual_mm,
        "annual rainfall average stored"
    );
    Ok(RainfallAverage {
        annual_mm,
        start,
        end,
        days: series.len(),
        missing_days,
    })
}
