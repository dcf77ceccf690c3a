//! Typed access to document metadata.
//!
//! Metadata values are stored as strings. Reading a required value that
//! is absent yields [`LandscapeError::MissingPrerequisite`]; a value that
//! is present but unreadable yields [`LandscapeError::InvalidInput`].

use landscape_math::LatLon;
use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::error::{LandscapeError, Result};

/// Document units per meter.
pub const SCALE_FACTOR: &str = "scale_factor";
/// Latitude of the page center in degrees.
pub const LATITUDE: &str = "latitude";
/// Longitude of the page center in degrees.
pub const LONGITUDE: &str = "longitude";
/// Map zoom level of the base map.
pub const ZOOM: &str = "zoom";
/// Average annual rainfall in millimeters.
pub const ANNUAL_RAINFALL: &str = "annual_rainfall_avg";

/// Highest supported map zoom level.
pub const MAX_ZOOM: u8 = 21;

/// Geodetic placement of a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoReference {
    /// Page center.
    pub center: LatLon,
    /// Map zoom level.
    pub zoom: u8,
    /// Average annual rainfall in mm/year, when known.
    pub annual_rainfall_avg: Option<f64>,
}

impl GeoReference {
    /// Validate ranges.
    pub fn validate(&self) -> Result<()> {
        if !self.center.is_valid() {
            return Err(LandscapeError::InvalidInput(format!(
                "coordinates ({}, {}) out of range",
                self.center.latitude, self.center.longitude
            )));
        }
        if self.zoom > MAX_ZOOM {
            return Err(LandscapeError::InvalidInput(format!(
                "zoom {} exceeds {MAX_ZOOM}",
                self.zoom
            )));
        }
        if let Some(rain) = self.annual_rainfall_avg {
            if !(rain >= 0.0 && rain.is_finite()) {
                return Err(LandscapeError::InvalidInput(format!(
                    "annual rainfall {rain} must be a non-negative number"
                )));
            }
        }
        Ok(())
    }
}

/// Store a geo reference in the document metadata.
///
/// An absent rainfall value leaves any stored average untouched.
pub fn set_geo_reference<D: Document + ?Sized>(doc: &mut D, geo: &GeoReference) -> Result<()> {
    geo.validate()?;
    doc.set_metadata(LATITUDE, geo.center.latitude.to_string());
    doc.set_metadata(LONGITUDE, geo.center.longitude.to_string());
    doc.set_metadata(ZOOM, geo.zoom.to_string());
    if let Some(rain) = geo.annual_rainfall_avg {
        doc.set_metadata(ANNUAL_RAINFALL, rain.to_string());
    }
    tracing::info!(
        latitude = geo.center.latitude,
        longitude = geo.center.longitude,
        zoom = geo.zoom,
        "geo reference stored"
    );
    Ok(())
}

/// Numeric metadata value, `None` when absent.
pub fn read_f64<D: Document + ?Sized>(doc: &D, key: &str) -> Result<Option<f64>> {
    let Some(raw) = doc.metadata(key) else {
        return Ok(None);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| LandscapeError::InvalidInput(format!("metadata '{key}' is not a number: {raw}")))?;
    if !value.is_finite() {
        return Err(LandscapeError::InvalidInput(format!(
            "metadata '{key}' is not finite"
        )));
    }
    Ok(Some(value))
}

fn require_f64<D: Document + ?Sized>(doc: &D, key: &str, hint: &str) -> Result<f64> {
    read_f64(doc, key)?
        .ok_or_else(|| LandscapeError::MissingPrerequisite(format!("{key} not set; {hint}")))
}

/// The stored scale factor.
pub fn scale_factor<D: Document + ?Sized>(doc: &D) -> Result<f64> {
    let factor = require_f64(doc, SCALE_FACTOR, "calibrate the scale first")?;
    if factor <= 0.0 {
        return Err(LandscapeError::InvalidInput(format!(
            "stored scale factor {factor} is not positive"
        )));
    }
    Ok(factor)
}

/// The stored latitude.
pub fn latitude<D: Document + ?Sized>(doc: &D) -> Result<f64> {
    require_f64(doc, LATITUDE, "set the geo reference first")
}

/// The stored page-center location.
pub fn location<D: Document + ?Sized>(doc: &D) -> Result<LatLon> {
    let center = LatLon::new(
        latitude(doc)?,
        require_f64(doc, LONGITUDE, "set the geo reference first")?,
    );
    if !center.is_valid() {
        return Err(LandscapeError::InvalidInput(format!(
            "stored coordinates ({}, {}) out of range",
            center.latitude, center.longitude
        )));
    }
    Ok(center)
}

/// The stored annual rainfall average, `None` when unset.
pub fn annual_rainfall<D: Document + ?Sized>(doc: &D) -> Result<Option<f64>> {
    read_f64(doc, ANNUAL_RAINFALL)
}

/// The stored annual rainfall average.
pub fn require_annual_rainfall<D: Document + ?Sized>(doc: &D) -> Result<f64> {
    require_f64(doc, ANNUAL_RAINFALL, "set or fetch the rainfall average first")
}

/// Snapshot of every known metadata value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteMetadata {
    /// Document units per meter.
    pub scale_factor: Option<f64>,
    /// Page-center latitude.
    pub latitude: Option<f64>,
    /// Page-center longitude.
    pub longitude: Option<f64>,
    /// Map zoom level.
    pub zoom: Option<u8>,
    /// Annual rainfall in mm/year.
    pub annual_rainfall_avg: Option<f64>,
}

impl SiteMetadata {
    /// Read every key from `doc`.
    pub fn load<D: Document + ?Sized>(doc: &D) -> Result<Self> {
        let zoom = match doc.metadata(ZOOM) {
            Some(raw) => Some(raw.trim().parse::<u8>().map_err(|_| {
                LandscapeError::InvalidInput(format!("metadata '{ZOOM}' is not a zoom level: {raw}"))
            })?),
            None => None,
        };
        Ok(Self {
            scale_factor: read_f64(doc, SCALE_FACTOR)?,
            latitude: read_f64(doc, LATITUDE)?,
            longitude: read_f64(doc, LONGITUDE)?,
            zoom,
            annual_rainfall_avg: read_f64(doc, ANNUAL_RAINFALL)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MemoryDocument;

    fn geo(lat: f64, lon: f64) -> GeoReference {
        GeoReference {
            center: LatLon::new(lat, lon),
            zoom: 18,
            annual_rainfall_avg: Some(640.5),
        }
    }

    #[test]
    fn test_set_geo_reference_writes_keys() {
        let mut doc = MemoryDocument::new(100.0, 100.0);
        set_geo_reference(&mut doc, &geo(-33.865, 151.2094)).unwrap();
        assert_eq!(doc.metadata(LATITUDE), Some("-33.865"));
        assert_eq!(doc.metadata(LONGITUDE), Some("151.2094"));
        assert_eq!(doc.metadata(ZOOM), Some("18"));
        assert_eq!(doc.metadata(ANNUAL_RAINFALL), Some("640.5"));

        let loaded = SiteMetadata::load(&doc).unwrap();
        assert_eq!(loaded.zoom, Some(18));
        assert_eq!(loaded.scale_factor, None);
        assert_eq!(location(&doc).unwrap(), LatLon::new(-33.865, 151.2094));
    }

    #[test]
    fn test_invalid_geo_reference_leaves_document() {
        let mut doc = MemoryDocument::new(100.0, 100.0);
        for bad in [
            geo(91.0, 0.0),
            geo(0.0, -180.5),
            GeoReference {
                zoom: 22,
                ..geo(0.0, 0.0)
            },
            GeoReference {
                annual_rainfall_avg: Some(-1.0),
                ..geo(0.0, 0.0)
            },
        ] {
            assert!(matches!(
                set_geo_reference(&mut doc, &bad),
                Err(LandscapeError::InvalidInput(_))
            ));
        }
        assert!(doc.metadata.is_empty());
    }

    #[test]
    fn test_missing_and_malformed_values() {
        let mut doc = MemoryDocument::new(100.0, 100.0);
        assert!(matches!(
            scale_factor(&doc),
            Err(LandscapeError::MissingPrerequisite(_))
        ));
        assert!(matches!(location(&doc), Err(LandscapeError::MissingPrerequisite(_))));
        assert_eq!(annual_rainfall(&doc).unwrap(), None);

        doc.set_metadata(SCALE_FACTOR, "abc".into());
        assert!(matches!(scale_factor(&doc), Err(LandscapeError::InvalidInput(_))));
        doc.set_metadata(SCALE_FACTOR, "0".into());
        assert!(matches!(scale_factor(&doc), Err(LandscapeError::InvalidInput(_))));
        doc.set_metadata(SCALE_FACTOR, " 4.5 ".into());
        assert_eq!(scale_factor(&doc).unwrap(), 4.5);
    }
}
