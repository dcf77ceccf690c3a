#![warn(missing_docs)]

//! Permaculture drafting operations over a host drawing.
//!
//! Each operation reads what it needs from the document metadata, checks
//! its prerequisites, pulls external data through a [`DataFetcher`], and
//! writes its result onto named layers:
//!
//! | Operation                       | Needs                              | Writes                    |
//! |---------------------------------|------------------------------------|---------------------------|
//! | [`set_geo_reference`]           | -                                  | location metadata         |
//! | [`calibrate_scale`]             | reference line or path             | scale factor, scale bar   |
//! | [`annual_rainfall_average`]     | location                           | rainfall metadata         |
//! | [`site_boundary`]               | closed path, scale                 | `site boundaries`         |
//! | [`label_precipitation`]         | `Precipitation` layer, scale, rain | shape labels              |
//! | [`structure_information`]       | closed path, latitude, scale       | structure sub-layers      |
//! | [`draw_contours`]               | location, scale                    | `elevation/{e}m`          |
//! | [`seasonal_shadows`]            | path, location, scale              | `{Season} Shadow/HH:MM`   |

pub mod analytics;
pub mod document;
pub mod elevation;
pub mod error;
pub mod fetch;
pub mod metadata;
pub mod scale;
pub mod settings;
pub mod shadow;

#[cfg(test)]
mod testing;

pub use analytics::{
    annual_rainfall_average, closed_path, label_precipitation, path_area, rainfall_volume,
    site_boundary, structure_information, CatchmentLabel, PrecipitationReport, RainfallAverage,
    SiteReport, StructureReport,
};
pub use document::{Document, Drawable, Layer, LayerPath, MemoryDocument, Shape};
pub use elevation::{draw_contours, BandSummary, ElevationReport};
pub use error::{FetchError, LandscapeError, Result};
pub use fetch::{solar_clock, DataFetcher, UtcOffset};
pub use metadata::{set_geo_reference, GeoReference, SiteMetadata};
pub use scale::{
    calibrate_scale, compute_scale_factor, draw_scale_bar, measure, scale_bar, store_scale_factor,
    to_document_units, to_meters, Calibration, ScaleBar,
};
pub use settings::{ContourConfig, RainfallConfig, Settings};
pub use shadow::{seasonal_shadows, DrawnShadow, ShadowReport, SkippedSample};
