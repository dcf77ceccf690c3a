//! Tool settings loaded from TOML.
//!
//! ```toml
//! [contour]
//! num_points = 200
//! contour_gap = 2
//!
//! [shadow]
//! winter_times = ["09:00", "12:00", "15:00"]
//!
//! [rainfall]
//! history_years = 5
//! ```

use landscape_contour::{BatchBudget, ContourSettings};
use landscape_solar::ShadowSettings;
use serde::{Deserialize, Serialize};

use crate::error::{LandscapeError, Result};

/// Contour extraction options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContourConfig {
    /// Samples along each side of the page.
    pub num_points: usize,
    /// Stroke-break distance as a multiple of the average point step.
    pub threshold_multiplier: f64,
    /// Elevation step between drawn bands in meters.
    pub contour_gap: u32,
    /// Fractional elevations strictly inside this range are ignored.
    pub noise_band: [f64; 2],
    /// Maximum length of one elevation request in bytes.
    pub batch_byte_budget: usize,
    /// Bytes of each request taken by the URL prefix and API key.
    pub request_overhead_bytes: usize,
}

impl Default for ContourConfig {
    fn default() -> Self {
        let defaults = ContourSettings::default();
        Self {
            num_points: defaults.num_points,
            threshold_multiplier: defaults.threshold_multiplier,
            contour_gap: defaults.contour_gap,
            noise_band: [defaults.noise_band.0, defaults.noise_band.1],
            batch_byte_budget: defaults.batch.max_bytes,
            request_overhead_bytes: defaults.batch.overhead_bytes,
        }
    }
}

impl ContourConfig {
    /// Extraction settings for the contour crate.
    pub fn to_contour_settings(&self) -> ContourSettings {
        ContourSettings {
            num_points: self.num_points,
            threshold_multiplier: self.threshold_multiplier,
            contour_gap: self.contour_gap,
            noise_band: (self.noise_band[0], self.noise_band[1]),
            batch: BatchBudget {
                max_bytes: self.batch_byte_budget,
                overhead_bytes: self.request_overhead_bytes,
            },
        }
    }
}

/// Rainfall history options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RainfallConfig {
    /// Years of daily history averaged.
    pub history_years: u32,
}

impl Default for RainfallConfig {
    fn default() -> Self {
        Self { history_years: 10 }
    }
}

/// All tool settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Contour extraction.
    pub contour: ContourConfig,
    /// Shadow study sampling.
    pub shadow: ShadowSettings,
    /// Rainfall history.
    pub rainfall: RainfallConfig,
}

impl Settings {
    /// Parse settings from TOML; absent keys take their defaults.
    pub fn from_toml(source: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(source)
            .map_err(|e| LandscapeError::InvalidInput(format!("settings: {e}")))?;
        settings.validate()?;
        Ok(settings)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<()> {
        self.contour
            .to_contour_settings()
            .validate()
            .map_err(|e| LandscapeError::InvalidInput(e.to_string()))?;
        self.shadow
            .validate()
            .map_err(|e| LandscapeError::InvalidInput(e.to_string()))?;
        if self.rainfall.history_years == 0 {
            return Err(LandscapeError::InvalidInput(
                "rainfall history_years must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.contour.num_points, 350);
        assert_eq!(settings.contour.batch_byte_budget, 8192);
        assert_eq!(settings.contour.noise_band, [0.05, 0.95]);
        assert_eq!(settings.rainfall.history_years, 10);
        assert_eq!(settings.shadow.winter_times, vec!["08:30", "12:00", "15:00"]);
        assert_eq!(Settings::from_toml("").unwrap(), settings);
    }

    #[test]
    fn test_partial_toml() {
        let settings = Settings::from_toml(
            r#"
            [contour]
            num_points = 120
            contour_gap = 5
            request_overhead_bytes = 96

            [shadow]
            summer_times = ["06:00", "20:00"]
            year = 2030
            "#,
        )
        .unwrap();
        assert_eq!(settings.contour.num_points, 120);
        assert_eq!(settings.contour.threshold_multiplier, 2.0);
        let contour = settings.contour.to_contour_settings();
        assert_eq!(contour.contour_gap, 5);
        assert_eq!(contour.batch.overhead_bytes, 96);
        assert_eq!(settings.shadow.summer_times.len(), 2);
        assert_eq!(settings.shadow.winter_times.len(), 3);
        assert_eq!(settings.shadow.year, Some(2030));
    }

    #[test]
    fn test_invalid_settings() {
        for source in [
            "[contour]\nnum_points = 1",
            "[contour]\nnoise_band = [0.9, 0.1]",
            "[contour]\ncontour_gap = 0",
            "[shadow]\nwinter_times = [\"noon\"]",
            "[rainfall]\nhistory_years = 0",
            "[contour\n",
        ] {
            assert!(
                matches!(Settings::from_toml(source), Err(LandscapeError::InvalidInput(_))),
                "accepted {source:?}"
            );
        }
    }
}
