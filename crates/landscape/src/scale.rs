//! Scale model: document units per meter.
//!
//! A document carries at most one scale factor. It is calibrated from a
//! reference line or path whose real-world length the user knows, and
//! every physical measurement divides by it.

use landscape_geom::PathData;
use landscape_math::Point2;
use serde::{Deserialize, Serialize};

use crate::document::{Document, Drawable, LayerPath, Shape};
use crate::error::{LandscapeError, Result};
use crate::metadata::SCALE_FACTOR;

/// Layer holding the scale bar.
pub const SCALE_LAYER: &str = "Scale Measure";

const MAJOR_TICK: f64 = 10.0;
const MINOR_TICK: f64 = 5.0;
/// Most ticks a scale bar may carry.
pub const MAX_SCALE_TICKS: usize = 10_000;

/// Length of a reference shape in document units.
///
/// Lines measure end to end. Paths measure the straight distances
/// between consecutive node vertices of every subpath; curve bulges are
/// ignored.
pub fn measure(shape: &Shape) -> Result<f64> {
    match shape {
        Shape::Line { from, to } => Ok((to - from).norm()),
        Shape::Path { d } => {
            let path = PathData::parse(d)
                .map_err(|e| LandscapeError::InvalidSelection(format!("unreadable path data: {e}")))?;
            if path.is_empty() {
                return Err(LandscapeError::InvalidSelection(
                    "path has no coordinate data".into(),
                ));
            }
            Ok(path.vertex_length())
        }
        other => Err(LandscapeError::InvalidSelection(format!(
            "expected a line or path, got a {}",
            other.kind()
        ))),
    }
}

/// Document units per meter for a reference of known length.
pub fn compute_scale_factor(measured_length: f64, real_length_m: f64) -> Result<f64> {
    if !(real_length_m > 0.0 && real_length_m.is_finite()) {
        return Err(LandscapeError::InvalidInput(format!(
            "real-world length must be positive, got {real_length_m}"
        )));
    }
    if !(measured_length > 0.0 && measured_length.is_finite()) {
        return Err(LandscapeError::InvalidInput(format!(
            "reference length must be positive, got {measured_length}"
        )));
    }
    Ok(measured_length / real_length_m)
}

/// Convert a document length to meters.
pub fn to_meters(document_length: f64, scale_factor: f64) -> f64 {
    document_length / scale_factor
}

/// Convert meters to a document length.
pub fn to_document_units(meters: f64, scale_factor: f64) -> f64 {
    meters * scale_factor
}

/// Store `scale_factor` as the document's scale.
///
/// Fails with [`LandscapeError::AlreadyExists`] when a scale is already
/// stored and `override_existing` is false.
pub fn store_scale_factor<D: Document + ?Sized>(
    doc: &mut D,
    scale_factor: f64,
    override_existing: bool,
) -> Result<()> {
    if !(scale_factor > 0.0 && scale_factor.is_finite()) {
        return Err(LandscapeError::InvalidInput(format!(
            "scale factor must be positive, got {scale_factor}"
        )));
    }
    if doc.metadata(SCALE_FACTOR).is_some() && !override_existing {
        return Err(LandscapeError::AlreadyExists("scale factor".into()));
    }
    doc.set_metadata(SCALE_FACTOR, scale_factor.to_string());
    Ok(())
}

/// Ruler drawn across the top of the page.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaleBar {
    /// One tick per meter; every fifth tick is taller.
    pub ticks: PathData,
    /// Page width in meters, e.g. `"42.0 meters"`.
    pub label: String,
    /// Where the label is centered.
    pub label_anchor: Point2,
}

/// Build the scale bar for a page of `page_width` document units.
///
/// Fails with [`LandscapeError::InvalidInput`] when the page spans more
/// than [`MAX_SCALE_TICKS`] meters.
pub fn scale_bar(page_width: f64, scale_factor: f64) -> Result<ScaleBar> {
    let meters = (page_width / scale_factor).floor();
    if !(meters >= 0.0 && meters < MAX_SCALE_TICKS as f64) {
        return Err(LandscapeError::InvalidInput(format!(
            "a page of {page_width} units at {scale_factor} units/m needs {meters} scale ticks \
             (limit {MAX_SCALE_TICKS})"
        )));
    }
    let count = meters as usize;
    let mut ticks = PathData::new();
    for i in 0..=count {
        let x = i as f64 * scale_factor;
        let height = if i % 5 == 0 { MAJOR_TICK } else { MINOR_TICK };
        ticks.move_to(Point2::new(x, 0.0)).line_to(Point2::new(x, -height));
    }
    Ok(ScaleBar {
        ticks,
        label: format!("{:.1} meters", to_meters(page_width, scale_factor)),
        label_anchor: Point2::new(page_width / 2.0, -20.0),
    })
}

/// Replace the contents of the scale layer with a fresh scale bar.
pub fn draw_scale_bar<D: Document + ?Sized>(doc: &mut D, scale_factor: f64) -> Result<()> {
    let (width, _) = doc.page_size();
    let bar = scale_bar(width, scale_factor)?;
    write_scale_bar(doc, bar);
    Ok(())
}

fn write_scale_bar<D: Document + ?Sized>(doc: &mut D, bar: ScaleBar) {
    let ticks_id = doc.next_id("scale-lines");
    let title_id = doc.next_id("scale-title");

    let layer = doc.layer_mut(&LayerPath::top(SCALE_LAYER));
    layer.drawables.clear();
    layer.drawables.push(
        Drawable::new(ticks_id, Shape::path(&bar.ticks)).with_style("stroke:black;stroke-width:1;"),
    );
    layer.drawables.push(
        Drawable::new(
            title_id,
            Shape::Text {
                anchor: bar.label_anchor,
                text: bar.label,
            },
        )
        .with_style("text-anchor:middle;font-size:12px;fill:black;"),
    );
}

/// Outcome of a scale calibration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Calibration {
    /// Length of the reference in document units.
    pub measured_length: f64,
    /// Stored document units per meter.
    pub scale_factor: f64,
}

/// Calibrate the document scale from the selected reference shape.
///
/// The reference is removed from the drawing and a scale bar drawn. All
/// checks run before the document is modified.
pub fn calibrate_scale<D: Document + ?Sized>(
    doc: &mut D,
    selection: Option<&str>,
    real_length_m: f64,
    override_existing: bool,
) -> Result<Calibration> {
    let id = selection
        .ok_or_else(|| LandscapeError::InvalidSelection("select a line or path".into()))?;
    let (_, reference) = doc
        .find_drawable(id)
        .ok_or_else(|| LandscapeError::InvalidSelection(format!("no shape with id '{id}'")))?;
    let measured_length = measure(&reference.shape)?;
    let scale_factor = compute_scale_factor(measured_length, real_length_m)?;
    if doc.metadata(SCALE_FACTOR).is_some() && !override_existing {
        return Err(LandscapeError::AlreadyExists("scale factor".into()));
    }
    let (width, _) = doc.page_size();
    let bar = scale_bar(width, scale_factor)?;

    store_scale_factor(doc, scale_factor, override_existing)?;
    doc.take_drawable(id);
    write_scale_bar(doc, bar);
    tracing::info!(measured_length, real_length_m, scale_factor, "scale calibrated");
    Ok(Calibration {
        measured_length,
        scale_factor,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;
    use crate::metadata;
    use approx::assert_relative_eq;
    use landscape_geom::PathCommand;

    fn doc_with(shape: Shape) -> MemoryDocument {
        let mut doc = MemoryDocument::new(100.0, 80.0);
        doc.append_to_layer(&LayerPath::top("Base"), Drawable::new("ref", shape));
        doc
    }

    #[test]
    fn test_measure_line_345() {
        let line = Shape::Line {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(3.0, 4.0),
        };
        assert_eq!(measure(&line).unwrap(), 5.0);
    }

    #[test]
    fn test_measure_path_uses_vertices() {
        let path = Shape::Path {
            d: "M 0,0 L 3,0 Q 10,10 3,4".into(),
        };
        assert_relative_eq!(measure(&path).unwrap(), 7.0);
        let closed = Shape::Path {
            d: "M 0,0 H 3 V 4 Z".into(),
        };
        assert_relative_eq!(measure(&closed).unwrap(), 12.0);
    }

    #[test]
    fn test_measure_rejects_other_shapes() {
        let circle = Shape::Circle {
            center: Point2::new(0.0, 0.0),
            radius: 1.0,
        };
        assert!(matches!(measure(&circle), Err(LandscapeError::InvalidSelection(_))));
        let empty = Shape::Path { d: "".into() };
        assert!(matches!(measure(&empty), Err(LandscapeError::InvalidSelection(_))));
    }

    #[test]
    fn test_scale_factor_and_conversion() {
        let factor = compute_scale_factor(50.0, 10.0).unwrap();
        assert_eq!(factor, 5.0);
        assert_eq!(to_meters(100.0, factor), 20.0);
        assert_eq!(to_document_units(20.0, factor), 100.0);
        assert!(matches!(
            compute_scale_factor(50.0, 0.0),
            Err(LandscapeError::InvalidInput(_))
        ));
        assert!(matches!(
            compute_scale_factor(50.0, -2.0),
            Err(LandscapeError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_store_respects_override() {
        let mut doc = MemoryDocument::new(10.0, 10.0);
        store_scale_factor(&mut doc, 2.0, false).unwrap();
        assert!(matches!(
            store_scale_factor(&mut doc, 3.0, false),
            Err(LandscapeError::AlreadyExists(_))
        ));
        assert_eq!(metadata::scale_factor(&doc).unwrap(), 2.0);
        store_scale_factor(&mut doc, 3.0, true).unwrap();
        assert_eq!(metadata::scale_factor(&doc).unwrap(), 3.0);
    }

    #[test]
    fn test_scale_bar_ticks() {
        let bar = scale_bar(23.0, 2.0).unwrap();
        // 11 whole meters fit, so 12 ticks at x = 0, 2, ..., 22.
        let tops: Vec<Point2> = bar
            .ticks
            .commands
            .iter()
            .filter_map(|c| match c {
                PathCommand::LineTo(p) => Some(*p),
                _ => None,
            })
            .collect();
        assert_eq!(tops.len(), 12);
        assert_eq!(tops[0], Point2::new(0.0, -10.0));
        assert_eq!(tops[1], Point2::new(2.0, -5.0));
        assert_eq!(tops[5], Point2::new(10.0, -10.0));
        assert_eq!(bar.label, "11.5 meters");
    }

    #[test]
    fn test_scale_bar_tick_limit() {
        assert!(matches!(
            scale_bar(100.0, 1e-9),
            Err(LandscapeError::InvalidInput(_))
        ));
        assert!(scale_bar(100.0, 0.01).is_ok());
    }

    #[test]
    fn test_calibrate_tiny_scale_leaves_document() {
        let mut doc = doc_with(Shape::Line {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(1.0, 0.0),
        });
        let before = doc.clone();
        assert!(matches!(
            calibrate_scale(&mut doc, Some("ref"), 1e9, false),
            Err(LandscapeError::InvalidInput(_))
        ));
        assert_eq!(doc, before);
    }

    #[test]
    fn test_calibrate_replaces_reference_with_scale_bar() {
        let mut doc = doc_with(Shape::Line {
            from: Point2::new(0.0, 0.0),
            to: Point2::new(30.0, 40.0),
        });
        let cal = calibrate_scale(&mut doc, Some("ref"), 10.0, false).unwrap();
        assert_eq!(cal.scale_factor, 5.0);
        assert!(doc.find_drawable("ref").is_none());

        let layer = doc.find_layer(&LayerPath::top(SCALE_LAYER)).unwrap();
        assert_eq!(layer.drawables.len(), 2);
        match &layer.drawables[1].shape {
            Shape::Text { text, .. } => assert_eq!(text, "20.0 meters"),
            other => panic!("unexpected {other:?}"),
        }

        // A second calibration without override leaves everything in place.
        doc.append_to_layer(
            &LayerPath::root(),
            Drawable::new(
                "ref2",
                Shape::Line {
                    from: Point2::new(0.0, 0.0),
                    to: Point2::new(10.0, 0.0),
                },
            ),
        );
        assert!(matches!(
            calibrate_scale(&mut doc, Some("ref2"), 1.0, false),
            Err(LandscapeError::AlreadyExists(_))
        ));
        assert!(doc.find_drawable("ref2").is_some());

        calibrate_scale(&mut doc, Some("ref2"), 1.0, true).unwrap();
        assert_eq!(metadata::scale_factor(&doc).unwrap(), 10.0);
        assert_eq!(
            doc.find_layer(&LayerPath::top(SCALE_LAYER)).unwrap().drawables.len(),
            2
        );
    }

    #[test]
    fn test_calibrate_without_selection() {
        let mut doc = MemoryDocument::new(10.0, 10.0);
        assert!(matches!(
            calibrate_scale(&mut doc, None, 1.0, false),
            Err(LandscapeError::InvalidSelection(_))
        ));
        assert!(matches!(
            calibrate_scale(&mut doc, Some("nope"), 1.0, false),
            Err(LandscapeError::InvalidSelection(_))
        ));
        assert!(doc.metadata.is_empty());
    }
}
