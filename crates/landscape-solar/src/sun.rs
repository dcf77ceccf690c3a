//! Sun position from date, time, and place.
//!
//! Declination follows Cooper's approximation and the hour angle is taken
//! from *true* solar time: the clock time is shifted by the distance
//! between clock noon and the observed solar noon for that day, which
//! folds in the time-zone meridian offset, daylight saving, and the
//! equation of time in one correction.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc};
use landscape_math::{normalize_degrees, LatLon};
use serde::{Deserialize, Serialize};

use crate::shadow::MIN_TAN_ALTITUDE;

/// Position of the sun in the local sky.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunPosition {
    /// Angle above the horizon, in radians.
    pub altitude: f64,
    /// Compass bearing in degrees (0 = north, clockwise).
    pub azimuth: f64,
    /// Hour angle in degrees (negative before solar noon).
    pub hour_angle: f64,
    /// Solar declination in degrees.
    pub declination: f64,
}

impl SunPosition {
    /// Altitude in degrees.
    pub fn altitude_degrees(&self) -> f64 {
        self.altitude.to_degrees()
    }

    /// True unless the sun is clearly below the horizon.
    ///
    /// A sun sitting on the horizon still casts a (floored) shadow.
    pub fn casts_shadow(&self) -> bool {
        self.altitude.tan() >= -MIN_TAN_ALTITUDE
    }
}

/// Local clock calibration for one day at one place.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarClock {
    /// Offset of local clock time from UTC, in hours (DST included).
    pub utc_offset_hours: f64,
    /// Instant of solar noon for the day.
    pub solar_noon: DateTime<Utc>,
}

impl SolarClock {
    /// Solar noon expressed in local clock time.
    pub fn local_solar_noon(&self) -> NaiveDateTime {
        let offset_ms = (self.utc_offset_hours * 3_600_000.0).round() as i64;
        self.solar_noon.naive_utc() + Duration::milliseconds(offset_ms)
    }

    /// Hours to add to clock time to obtain solar time on `date`.
    ///
    /// Positive when solar noon falls before clock noon.
    pub fn correction_hours(&self, date: NaiveDate) -> f64 {
        let clock_noon = date.and_time(NaiveTime::MIN) + Duration::hours(12);
        let delta = clock_noon - self.local_solar_noon();
        delta.num_milliseconds() as f64 / 3_600_000.0
    }
}

/// Solar declination in degrees for a day of the year (1-based).
pub fn declination(day_of_year: u32) -> f64 {
    23.45 * (360.0 * (284.0 + f64::from(day_of_year)) / 365.0).to_radians().sin()
}

/// Compute the sun's position for a local clock time.
///
/// `local` is wall-clock time at `location`; `clock` calibrates it to
/// true solar time. Azimuth is measured from north, clockwise, and is
/// reflected after solar noon so it increases through the day.
pub fn sun_position(location: LatLon, local: NaiveDateTime, clock: &SolarClock) -> SunPosition {
    let declination_deg = declination(local.ordinal());
    let decl = declination_deg.to_radians();
    let lat = location.latitude.to_radians();

    let clock_hours =
        f64::from(local.hour()) + f64::from(local.minute()) / 60.0 + f64::from(local.second()) / 3600.0;
    let solar_time = clock_hours + clock.correction_hours(local.date());
    let hour_angle_deg = 15.0 * (solar_time - 12.0);
    let hour_angle = hour_angle_deg.to_radians();

    let sin_alt = lat.sin() * decl.sin() + lat.cos() * decl.cos() * hour_angle.cos();
    let altitude = sin_alt.clamp(-1.0, 1.0).asin();

    let denom = lat.cos() * altitude.cos();
    let cos_az = if denom.abs() < 1e-12 {
        // At a pole, or with the sun at the zenith, every bearing is
        // equivalent; face the equator.
        if location.latitude >= 0.0 {
            -1.0
        } else {
            1.0
        }
    } else {
        ((decl.sin() - lat.sin() * altitude.sin()) / denom).clamp(-1.0, 1.0)
    };
    let mut azimuth = cos_az.acos().to_degrees();
    if hour_angle > 0.0 {
        azimuth = 360.0 - azimuth;
    }

    SunPosition {
        altitude,
        azimuth: normalize_degrees(azimuth),
        hour_angle: hour_angle_deg,
        declination: declination_deg,
    }
}

/// Estimate solar noon from longitude alone.
///
/// Uses the NOAA equation-of-time series. Useful when no solar-noon
/// service is available; accurate to well under a minute.
pub fn approximate_solar_noon(date: NaiveDate, longitude: f64) -> DateTime<Utc> {
    let gamma = 2.0 * std::f64::consts::PI / 365.0 * (f64::from(date.ordinal()) - 1.0);
    let equation_of_time = 229.18
        * (0.000075 + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin());
    let minutes = 720.0 - 4.0 * longitude - equation_of_time;
    let ms = (minutes * 60_000.0).round() as i64;
    (date.and_time(NaiveTime::MIN) + Duration::milliseconds(ms)).and_utc()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn at(d: NaiveDate, h: u32, min: u32) -> NaiveDateTime {
        d.and_hms_opt(h, min, 0).unwrap()
    }

    /// Clock whose solar noon coincides with clock noon.
    fn aligned(d: NaiveDate) -> SolarClock {
        SolarClock {
            utc_offset_hours: 0.0,
            solar_noon: at(d, 12, 0).and_utc(),
        }
    }

    #[test]
    fn test_declination_extremes() {
        // June solstice (day 172) and December solstice (day 355)
        assert_relative_eq!(declination(172), 23.45, epsilon = 0.01);
        assert_relative_eq!(declination(355), -23.45, epsilon = 0.01);
        assert!(declination(81).abs() < 1e-9);
    }

    #[test]
    fn test_equator_equinox_noon_is_overhead() {
        let d = date(2025, 3, 22); // day 81
        let sun = sun_position(LatLon::new(0.0, 0.0), at(d, 12, 0), &aligned(d));
        assert_relative_eq!(sun.altitude, std::f64::consts::FRAC_PI_2, epsilon = 1e-6);
        assert_relative_eq!(sun.hour_angle, 0.0);
    }

    #[test]
    fn test_noon_sun_faces_equator() {
        let d = date(2025, 6, 21);
        let north = sun_position(LatLon::new(45.0, 0.0), at(d, 12, 0), &aligned(d));
        assert_relative_eq!(north.azimuth, 180.0, epsilon = 1e-4);
        // Noon altitude = 90 - lat + decl
        assert_relative_eq!(
            north.altitude_degrees(),
            90.0 - 45.0 + north.declination,
            epsilon = 1e-6
        );

        let d = date(2025, 12, 21);
        let south = sun_position(LatLon::new(-35.0, 0.0), at(d, 12, 0), &aligned(d));
        assert!(south.azimuth < 1e-4 || south.azimuth > 360.0 - 1e-4);
    }

    #[test]
    fn test_morning_and_afternoon_mirror() {
        let d = date(2025, 9, 1);
        let loc = LatLon::new(40.0, -3.7);
        let morning = sun_position(loc, at(d, 9, 0), &aligned(d));
        let afternoon = sun_position(loc, at(d, 15, 0), &aligned(d));
        assert!(morning.azimuth > 0.0 && morning.azimuth < 180.0);
        assert!(afternoon.azimuth > 180.0 && afternoon.azimuth < 360.0);
        assert_relative_eq!(morning.azimuth + afternoon.azimuth, 360.0, epsilon = 1e-9);
        assert_relative_eq!(morning.altitude, afternoon.altitude, epsilon = 1e-12);
        assert!(morning.casts_shadow());
    }

    #[test]
    fn test_casts_shadow_at_horizon() {
        let mut sun = SunPosition {
            altitude: 0.0,
            azimuth: 90.0,
            hour_angle: -90.0,
            declination: 0.0,
        };
        assert!(sun.casts_shadow());
        sun.altitude = -MIN_TAN_ALTITUDE / 2.0;
        assert!(sun.casts_shadow());
        sun.altitude = -0.01;
        assert!(!sun.casts_shadow());
    }

    #[test]
    fn test_azimuth_increases_through_the_day() {
        let d = date(2025, 6, 21);
        let loc = LatLon::new(51.5, 0.0);
        let mut last = -1.0;
        for h in 6..=18 {
            let sun = sun_position(loc, at(d, h, 0), &aligned(d));
            assert!(sun.azimuth > last, "azimuth fell at {h}:00");
            last = sun.azimuth;
        }
    }

    #[test]
    fn test_solar_time_correction() {
        let d = date(2025, 6, 21);
        // Local clock runs UTC+2 and solar noon is 10:30 UTC = 12:30 local.
        let clock = SolarClock {
            utc_offset_hours: 2.0,
            solar_noon: at(d, 10, 30).and_utc(),
        };
        assert_eq!(clock.local_solar_noon(), at(d, 12, 30));
        assert_relative_eq!(clock.correction_hours(d), -0.5);

        let sun = sun_position(LatLon::new(48.0, 11.0), at(d, 12, 30), &clock);
        assert!(sun.hour_angle.abs() < 1e-9);
    }

    #[test]
    fn test_approximate_solar_noon() {
        // Near 15 April the equation of time is close to zero.
        let d = date(2025, 4, 15);
        let noon = approximate_solar_noon(d, 0.0);
        let minutes = (noon.naive_utc() - at(d, 12, 0)).num_seconds() as f64 / 60.0;
        assert!(minutes.abs() < 2.0, "off by {minutes} minutes");

        // Early November the sun runs ~16 minutes fast.
        let d = date(2025, 11, 3);
        let noon = approximate_solar_noon(d, 15.0);
        let minutes = (noon.naive_utc() - at(d, 11, 0)).num_seconds() as f64 / 60.0;
        assert!((minutes + 16.4).abs() < 1.0, "off by {minutes} minutes");
    }
}
