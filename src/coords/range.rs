//! Temperature axis range
//!
//! [`compute_range`] is the only place that decides the vertical axis, so a
//! fixed global range can replace per-day auto-ranging through config alone.

use serde::{Deserialize, Serialize};

use crate::config::AxisRangeConfig;
use crate::types::{
    DaySchedule, DEFAULT_TEMPERATURE, MAX_TEMPERATURE, MIN_TEMPERATURE, TEMPERATURE_STEP,
};

/// Visible temperature interval, `min < max`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TemperatureRange {
    pub min: f64,
    pub max: f64,
}

impl TemperatureRange {
    /// Build a range; a degenerate or inverted pair is widened by one step.
    pub fn new(min: f64, max: f64) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        if max - min < f64::EPSILON {
            return Self {
                min,
                max: min + TEMPERATURE_STEP,
            };
        }
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }
}

/// Axis range for `day` under the configured policy.
pub fn compute_range(axis: &AxisRangeConfig, day: &DaySchedule) -> TemperatureRange {
    match *axis {
        AxisRangeConfig::Dynamic { padding, min_span } => dynamic_range(day, padding, min_span),
        AxisRangeConfig::Fixed { min, max } => TemperatureRange::new(
            min.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
            max.clamp(MIN_TEMPERATURE, MAX_TEMPERATURE),
        ),
    }
}

fn dynamic_range(day: &DaySchedule, padding: f64, min_span: f64) -> TemperatureRange {
    let (lo, hi) = day
        .temperature_bounds()
        .unwrap_or((DEFAULT_TEMPERATURE, DEFAULT_TEMPERATURE));

    let mut lo = (lo - padding).max(MIN_TEMPERATURE);
    let mut hi = (hi + padding).min(MAX_TEMPERATURE);

    let min_span = min_span.min(MAX_TEMPERATURE - MIN_TEMPERATURE);
    if hi - lo < min_span {
        let center = (lo + hi) / 2.0;
        lo = center - min_span / 2.0;
        hi = center + min_span / 2.0;

        // keep the widened window inside the absolute bounds
        if lo < MIN_TEMPERATURE {
            hi += MIN_TEMPERATURE - lo;
            lo = MIN_TEMPERATURE;
        }
        if hi > MAX_TEMPERATURE {
            lo -= hi - MAX_TEMPERATURE;
            hi = MAX_TEMPERATURE;
        }
    }

    TemperatureRange::new(lo, hi)
}
