//! Seasonal shadow study for a structure.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use landscape_geom::{PathData, Polygon};
use landscape_math::LatLon;
use landscape_solar::{
    composite_shadow, project_shadow, seasonal_samples, shadow_vector, sun_position, Season,
    ShadowSample, ShadowSettings, SolarClock, SunPosition,
};
use serde::{Deserialize, Serialize};

use crate::analytics::selected;
use crate::document::{Document, Drawable, LayerPath, Shape};
use crate::error::{LandscapeError, Result};
use crate::fetch::{solar_clock, DataFetcher};
use crate::metadata;

const SHADOW_STYLE: &str = "fill:#000000;fill-opacity:0.25;stroke:none";

/// One drawn shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DrawnShadow {
    /// Season of the sample.
    pub season: Season,
    /// Local clock time, `HH:MM`.
    pub time: String,
    /// Sun altitude in degrees.
    pub altitude: f64,
    /// Sun azimuth in degrees.
    pub azimuth: f64,
    /// Shadow length in meters.
    pub length_m: f64,
    /// Compass bearing of the shadow.
    pub direction: f64,
}

/// A sample for which no shadow was drawn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedSample {
    /// Season of the sample.
    pub season: Season,
    /// Local clock time, `HH:MM`.
    pub time: String,
    /// Why it was skipped.
    pub reason: String,
}

/// Result of a shadow study.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShadowReport {
    /// Shadows drawn, in sample order.
    pub drawn: Vec<DrawnShadow>,
    /// Samples skipped.
    pub skipped: Vec<SkippedSample>,
}

struct Planned {
    sample: ShadowSample,
    hull: Polygon,
    summary: DrawnShadow,
}

/// Draw the winter and summer shadows cast by the selected structure.
///
/// `height` is the structure height in meters. Every check runs before
/// the first request. A sample whose clock calibration cannot be fetched,
/// or whose sun is below the horizon, is skipped and reported; the others
/// are still drawn. Each shadow lands on `"{Season} Shadow"/"HH:MM"`.
pub fn seasonal_shadows<D, F>(
    doc: &mut D,
    selection: Option<&str>,
    height: f64,
    fetcher: &mut F,
    settings: &ShadowSettings,
    year: i32,
) -> Result<ShadowReport>
where
    D: Document + ?Sized,
    F: DataFetcher + ?Sized,
{
    if !(height > 0.0 && height.is_finite()) {
        return Err(LandscapeError::InvalidInput(format!(
            "structure height must be positive, got {height}"
        )));
    }
    let footprint = footprint(doc, selection)?;
    let location = metadata::location(doc)?;
    let scale_factor = metadata::scale_factor(doc)?;
    let samples = seasonal_samples(location.latitude, year, settings)?;

    let mut clocks: BTreeMap<NaiveDate, std::result::Result<SolarClock, String>> = BTreeMap::new();
    let mut planned = Vec::new();
    let mut report = ShadowReport::default();

    for sample in samples {
        let date = sample.local.date();
        let clock = clocks
            .entry(date)
            .or_insert_with(|| solar_clock(&mut *fetcher, location, date).map_err(|e| e.to_string()));
        let clock = match clock {
            Ok(clock) => *clock,
            Err(reason) => {
                tracing::warn!(season = %sample.season, time = %sample.label(), %reason, "shadow sample skipped");
                report.skipped.push(SkippedSample {
                    season: sample.season,
                    time: sample.label(),
                    reason: reason.clone(),
                });
                continue;
            }
        };

        match plan(&footprint, location, &sample, &clock, height, scale_factor) {
            Some(p) => planned.push(p),
            None => {
                tracing::warn!(season = %sample.season, time = %sample.label(), "sun below horizon");
                report.skipped.push(SkippedSample {
                    season: sample.season,
                    time: sample.label(),
                    reason: "sun below horizon".into(),
                });
            }
        }
    }

    for p in planned {
        let layer = LayerPath::top(p.sample.season.layer_label()).child(p.sample.label());
        let id = doc.next_id("shadow");
        doc.append_to_layer(
            &layer,
            Drawable::new(id, Shape::path(&PathData::polygon(&p.hull.points)))
                .with_label(format!("{} {}", p.sample.season, p.sample.label()))
                .with_style(SHADOW_STYLE),
        );
        report.drawn.push(p.summary);
    }

    tracing::info!(
        drawn = report.drawn.len(),
        skipped = report.skipped.len(),
        "shadow study complete"
    );
    Ok(report)
}

fn footprint<D: Document + ?Sized>(doc: &D, selection: Option<&str>) -> Result<Polygon> {
    let (_, drawable) = selected(doc, selection)?;
    let Shape::Path { d } = &drawable.shape else {
        return Err(LandscapeError::InvalidSelection(format!(
            "'{}' is a {}, not a path",
            drawable.id,
            drawable.shape.kind()
        )));
    };
    let path = PathData::parse(d)
        .map_err(|e| LandscapeError::InvalidSelection(format!("'{}': {e}", drawable.id)))?;
    let vertices = path.vertices();
    if vertices.is_empty() {
        return Err(LandscapeError::InvalidSelection(format!(
            "'{}' has no vertices",
            drawable.id
        )));
    }
    Ok(Polygon::new(vertices))
}

fn plan(
    footprint: &Polygon,
    location: LatLon,
    sample: &ShadowSample,
    clock: &SolarClock,
    height: f64,
    scale_factor: f64,
) -> Option<Planned> {
    let sun = sun_position(location, sample.local, clock);
    plan_for_sun(footprint, sample, &sun, height, scale_factor)
}

fn plan_for_sun(
    footprint: &Polygon,
    sample: &ShadowSample,
    sun: &SunPosition,
    height: f64,
    scale_factor: f64,
) -> Option<Planned> {
    if !sun.casts_shadow() {
        return None;
    }
    let shadow = shadow_vector(height, sun);
    let on_page = shadow.scaled(scale_factor);
    let projected = project_shadow(footprint, on_page.length, on_page.direction);
    let hull = composite_shadow(footprint, &projected);
    tracing::debug!(
        season = %sample.season,
        time = %sample.label(),
        altitude = sun.altitude_degrees(),
        azimuth = sun.azimuth,
        length_m = shadow.length,
        "shadow computed"
    );
    Some(Planned {
        sample: *sample,
        hull,
        summary: DrawnShadow {
            season: sample.season,
            time: sample.label(),
            altitude: sun.altitude_degrees(),
            azimuth: sun.azimuth,
            length_m: shadow.length,
            direction: shadow.direction,
        },
    })
}
