//! Scripted fetcher shared by the operation tests.

use chrono::{DateTime, NaiveDate, Utc};
use landscape_contour::{ElevationBatch, ElevationSample};
use landscape_math::{LatLon, METERS_PER_DEGREE_LAT};
use landscape_solar::approximate_solar_noon;

use crate::error::FetchError;
use crate::fetch::{DataFetcher, UtcOffset};

pub(crate) struct FakeFetcher {
    /// Elevation of the terrain at a location.
    pub terrain: fn(LatLon) -> Option<f64>,
    pub failing_batches: Vec<usize>,
    pub offset: UtcOffset,
    pub failing_dates: Vec<NaiveDate>,
    pub precipitation: Vec<Option<f64>>,
    pub requests: usize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        Self {
            terrain: |_| Some(0.0),
            failing_batches: Vec::new(),
            offset: UtcOffset::default(),
            failing_dates: Vec::new(),
            precipitation: Vec::new(),
            requests: 0,
        }
    }
}

/// Ground rising one meter per meter northward from 100 m at 45°N.
pub(crate) fn north_slope(location: LatLon) -> Option<f64> {
    Some(100.0 + (location.latitude - 45.0) * METERS_PER_DEGREE_LAT)
}

impl DataFetcher for FakeFetcher {
    fn elevations(&mut self, batch: &ElevationBatch) -> Result<Vec<ElevationSample>, FetchError> {
        self.requests += 1;
        if self.failing_batches.contains(&batch.index) {
            return Err(FetchError::Transport(format!("batch {} timed out", batch.index)));
        }
        Ok(batch
            .locations
            .iter()
            .map(|&loc| ElevationSample {
                elevation: (self.terrain)(loc),
                location: Some(loc),
            })
            .collect())
    }

    fn solar_noon(&mut self, date: NaiveDate, location: LatLon) -> Result<DateTime<Utc>, FetchError> {
        self.requests += 1;
        if self.failing_dates.contains(&date) {
            return Err(FetchError::Transport(format!("no solar noon for {date}")));
        }
        Ok(approximate_solar_noon(date, location.longitude))
    }

    fn utc_offset(&mut self, _location: LatLon, _timestamp: i64) -> Result<UtcOffset, FetchError> {
        self.requests += 1;
        Ok(self.offset)
    }

    fn daily_precipitation(
        &mut self,
        _location: LatLon,
        _start: NaiveDate,
        _end: NaiveDate,
    ) -> Result<Vec<Option<f64>>, FetchError> {
        self.requests += 1;
        Ok(self.precipitation.clone())
    }
}
