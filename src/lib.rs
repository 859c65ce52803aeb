//! Hourly GHI (global horizontal irradiance) forecasting.
//!
//! A seasonal hour-of-day baseline is extracted from history, run through one
//! of four recurrence models, adjusted for current weather, clamped to
//! daylight and tagged with a decaying confidence score.

pub mod api;
pub mod config;
pub mod domain;
pub mod forecast;
pub mod history;
pub mod telemetry;
