//! Fetcher that replays recorded service responses from a JSON file.
//!
//! ```json
//! {
//!   "elevations": [101.98, 102.03, null],
//!   "solar_noon": { "2025-06-21": "2025-06-21T11:14:05Z" },
//!   "utc_offset": { "raw_offset": 3600, "dst_offset": 3600 },
//!   "precipitation": [0.0, 2.4, null, 11.0]
//! }
//! ```
//!
//! Elevations are indexed by grid position. Missing solar noons fall back
//! to the equation-of-time estimate and a missing offset to the nautical
//! time zone of the longitude.

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use landscape::{DataFetcher, FetchError, UtcOffset};
use landscape_contour::{ElevationBatch, ElevationSample};
use landscape_math::LatLon;
use landscape_solar::approximate_solar_noon;
use serde::Deserialize;

/// Recorded responses.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecordedData {
    /// Elevation per grid index.
    pub elevations: Vec<Option<f64>>,
    /// Solar noon per date.
    pub solar_noon: BTreeMap<NaiveDate, DateTime<Utc>>,
    /// Time-zone offset for every query.
    pub utc_offset: Option<UtcOffset>,
    /// Daily precipitation series.
    pub precipitation: Option<Vec<Option<f64>>>,
}

impl RecordedData {
    /// Parse recorded data from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// [`DataFetcher`] over [`RecordedData`].
#[derive(Debug, Clone, Default)]
pub struct RecordedFetcher {
    data: RecordedData,
}

impl RecordedFetcher {
    /// Replay `data`.
    pub fn new(data: RecordedData) -> Self {
        Self { data }
    }
}

impl DataFetcher for RecordedFetcher {
    fn elevations(&mut self, batch: &ElevationBatch) -> Result<Vec<ElevationSample>, FetchError> {
        if self.data.elevations.is_empty() {
            return Err(FetchError::Transport("no recorded elevations".into()));
        }
        Ok(batch
            .locations
            .iter()
            .enumerate()
            .map(|(offset, &location)| ElevationSample {
                elevation: self.data.elevations.get(batch.start + offset).copied().flatten(),
                location: Some(location),
            })
            .collect())
    }

    fn solar_noon(&mut self, date: NaiveDate, location: LatLon) -> Result<DateTime<Utc>, FetchError> {
        match self.data.solar_noon.get(&date) {
            Some(noon) => Ok(*noon),
            None => {
                tracing::debug!(%date, "no recorded solar noon; estimating");
                Ok(approximate_solar_noon(date, location.longitude))
            }
        }
    }

    fn utc_offset(&mut self, location: LatLon, _timestamp: i64) -> Result<UtcOffset, FetchError> {
        Ok(self.data.utc_offset.unwrap_or_else(|| UtcOffset {
            raw_offset: (location.longitude / 15.0).round() as i64 * 3600,
            dst_offset: 0,
        }))
    }

    fn daily_precipitation(
        &mut self,
        _location: LatLon,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Option<f64>>, FetchError> {
        self.data
            .precipitation
            .clone()
            .ok_or_else(|| FetchError::Transport("no recorded precipitation".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn batch(start: usize, n: usize) -> ElevationBatch {
        ElevationBatch {
            index: 0,
            start,
            locations: vec![LatLon::new(1.0, 2.0); n],
            query: String::new(),
        }
    }

    #[test]
    fn test_parse_recorded_data() {
        let data = RecordedData::from_json(
            r#"{
                "elevations": [1.0, null, 3.0],
                "solar_noon": { "2025-06-21": "2025-06-21T11:14:05Z" },
                "utc_offset": { "raw_offset": 3600, "dst_offset": 3600 }
            }"#,
        )
        .unwrap();
        assert_eq!(data.elevations, vec![Some(1.0), None, Some(3.0)]);
        assert_eq!(data.solar_noon.len(), 1);
        assert!(data.precipitation.is_none());
    }

    #[test]
    fn test_elevations_by_grid_index() {
        let mut fetcher = RecordedFetcher::new(RecordedData {
            elevations: vec![Some(1.0), None, Some(3.0)],
            ..Default::default()
        });
        let samples = fetcher.elevations(&batch(1, 3)).unwrap();
        let values: Vec<Option<f64>> = samples.iter().map(|s| s.elevation).collect();
        assert_eq!(values, vec![None, Some(3.0), None]);

        let mut empty = RecordedFetcher::default();
        assert!(matches!(
            empty.elevations(&batch(0, 1)),
            Err(FetchError::Transport(_))
        ));
    }

    #[test]
    fn test_fallbacks() {
        let mut fetcher = RecordedFetcher::default();
        let offset = fetcher.utc_offset(LatLon::new(48.0, 11.6), 0).unwrap();
        assert_eq!(offset.hours(), 1.0);
        let date = NaiveDate::from_ymd_opt(2025, 6, 21).unwrap();
        let noon = fetcher.solar_noon(date, LatLon::new(0.0, 0.0)).unwrap();
        assert_eq!(noon.date_naive(), date);
        assert!(fetcher
            .daily_precipitation(LatLon::new(0.0, 0.0), date, date)
            .is_err());
    }
}
