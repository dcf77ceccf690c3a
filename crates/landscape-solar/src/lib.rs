#![warn(missing_docs)]

//! Sun position and shadow projection for the landscape engine.
//!
//! A shadow study samples the sun at a few clock times on each solstice.
//! For every sample the structure footprint is copied to the tip of its
//! shadow and the two are wrapped in a convex hull, giving the area the
//! structure shades as the sun moves.

pub mod error;
pub mod season;
pub mod shadow;
pub mod sun;

pub use error::{Result, SolarError};
pub use season::{parse_clock_time, seasonal_samples, Season, ShadowSample, ShadowSettings};
pub use shadow::{
    composite_shadow, project_shadow, shadow_offset, shadow_vector, ShadowVector,
    MIN_TAN_ALTITUDE,
};
pub use sun::{approximate_solar_noon, declination, sun_position, SolarClock, SunPosition};
