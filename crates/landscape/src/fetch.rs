//! External data capability.
//!
//! Elevation, time-zone, solar-noon, and precipitation data come from
//! outside services. Operations receive them through [`DataFetcher`] so
//! the engine never performs I/O itself and tests can script responses.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use landscape_contour::{ElevationBatch, ElevationSample};
use landscape_math::LatLon;
use landscape_solar::SolarClock;
use serde::{Deserialize, Serialize};

use crate::error::FetchError;

/// Offset of local time from UTC as reported by a time-zone service.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UtcOffset {
    /// Standard offset in seconds.
    pub raw_offset: i64,
    /// Daylight-saving adjustment in seconds.
    pub dst_offset: i64,
}

impl UtcOffset {
    /// Total offset in hours.
    pub fn hours(&self) -> f64 {
        (self.raw_offset + self.dst_offset) as f64 / 3600.0
    }
}

/// Source of external data.
///
/// Every call is blocking and independent; a failure affects only the
/// request that produced it.
pub trait DataFetcher {
    /// Elevations for one batch, in request order.
    fn elevations(&mut self, batch: &ElevationBatch) -> Result<Vec<ElevationSample>, FetchError>;

    /// Instant of solar noon at `location` on `date`.
    fn solar_noon(&mut self, date: NaiveDate, location: LatLon) -> Result<DateTime<Utc>, FetchError>;

    /// Time-zone offset in effect at `location` at the unix `timestamp`.
    fn utc_offset(&mut self, location: LatLon, timestamp: i64) -> Result<UtcOffset, FetchError>;

    /// Daily precipitation sums in millimeters for `start..end`.
    ///
    /// Days without data are `None`.
    fn daily_precipitation(
        &mut self,
        location: LatLon,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Option<f64>>, FetchError>;
}

/// Calibrate local clock time against the sun for one date.
///
/// The time-zone offset is queried at local noon of `date`.
pub fn solar_clock<F: DataFetcher + ?Sized>(
    fetcher: &mut F,
    location: LatLon,
    date: NaiveDate,
) -> Result<SolarClock, FetchError> {
    let noon: NaiveDateTime = date
        .and_hms_opt(12, 0, 0)
        .ok_or_else(|| FetchError::Malformed(format!("no noon on {date}")))?;
    let offset = fetcher.utc_offset(location, noon.and_utc().timestamp())?;
    let solar_noon = fetcher.solar_noon(date, location)?;
    Ok(SolarClock {
        utc_offset_hours: offset.hours(),
        solar_noon,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_utc_offset_hours() {
        let offset = UtcOffset {
            raw_offset: 3600,
            dst_offset: 3600,
        };
        assert_eq!(offset.hours(), 2.0);
        let half = UtcOffset {
            raw_offset: 19800,
            dst_offset: 0,
        };
        assert_eq!(half.hours(), 5.5);
    }
}
