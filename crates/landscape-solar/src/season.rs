//! Seasonal sampling plans for shadow studies.
//!
//! Shadows are drawn for the winter and summer solstice at a handful of
//! clock times. Which calendar date counts as "winter" depends on the
//! hemisphere.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SolarError};

/// Solstice season.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Season {
    /// Shortest day of the year.
    Winter,
    /// Longest day of the year.
    Summer,
}

impl Season {
    /// Layer label for the season's shadows.
    pub fn layer_label(self) -> &'static str {
        match self {
            Season::Winter => "Winter Shadow",
            Season::Summer => "Summer Shadow",
        }
    }

    /// Solstice date of the season in `year` at the given latitude.
    pub fn solstice(self, year: i32, latitude: f64) -> Result<NaiveDate> {
        let northern = latitude >= 0.0;
        let month = match (self, northern) {
            (Season::Winter, true) | (Season::Summer, false) => 12,
            (Season::Summer, true) | (Season::Winter, false) => 6,
        };
        NaiveDate::from_ymd_opt(year, month, 21)
            .ok_or_else(|| SolarError::InvalidDate(format!("{year}-{month:02}-21")))
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Season::Winter => f.write_str("winter"),
            Season::Summer => f.write_str("summer"),
        }
    }
}

/// One local clock time at which a shadow is computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowSample {
    /// Season the sample belongs to.
    pub season: Season,
    /// Local wall-clock date and time.
    pub local: NaiveDateTime,
}

impl ShadowSample {
    /// Sub-layer label, `HH:MM`.
    pub fn label(&self) -> String {
        format!("{:02}:{:02}", self.local.hour(), self.local.minute())
    }
}

/// Clock times sampled in each season.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShadowSettings {
    /// Winter clock times, `HH:MM`.
    pub winter_times: Vec<String>,
    /// Summer clock times, `HH:MM`.
    pub summer_times: Vec<String>,
    /// Year of the solstices; callers pick the current year when unset.
    pub year: Option<i32>,
}

impl Default for ShadowSettings {
    fn default() -> Self {
        Self {
            winter_times: vec!["08:30".into(), "12:00".into(), "15:00".into()],
            summer_times: vec!["07:00".into(), "12:00".into(), "18:00".into()],
            year: None,
        }
    }
}

impl ShadowSettings {
    /// Validate every configured time.
    pub fn validate(&self) -> Result<()> {
        for time in self.winter_times.iter().chain(&self.summer_times) {
            parse_clock_time(time)?;
        }
        Ok(())
    }

    /// Configured times for `season`.
    pub fn times(&self, season: Season) -> &[String] {
        match season {
            Season::Winter => &self.winter_times,
            Season::Summer => &self.summer_times,
        }
    }
}

/// Parse an `HH:MM` clock time.
pub fn parse_clock_time(s: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(s.trim(), "%H:%M").map_err(|_| SolarError::InvalidTime(s.to_string()))
}

/// All samples for a shadow study, winter first, times in configured order.
pub fn seasonal_samples(latitude: f64, year: i32, settings: &ShadowSettings) -> Result<Vec<ShadowSample>> {
    if !(-90.0..=90.0).contains(&latitude) {
        return Err(SolarError::InvalidInput(format!(
            "latitude {latitude} outside [-90, 90]"
        )));
    }
    let mut samples = Vec::new();
    for season in [Season::Winter, Season::Summer] {
        let date = season.solstice(year, latitude)?;
        for time in settings.times(season) {
            samples.push(ShadowSample {
                season,
                local: date.and_time(parse_clock_time(time)?),
            });
        }
    }
    Ok(samples)
}
