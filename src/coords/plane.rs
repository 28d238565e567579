//! Domain ↔ logical plane mapping

use serde::{Deserialize, Serialize};

use super::range::TemperatureRange;
use crate::config::PlaneConfig;
use crate::types::{clamp_temperature, quantize_temperature, Transition};

/// Hours spanned by the horizontal axis
const HOURS_PER_DAY: f64 = 24.0;

/// A point in either screen pixels or logical plane units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Fixed-size logical plane with the margins around its plotting rectangle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl From<&PlaneConfig> for Plane {
    fn from(config: &PlaneConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            margin_left: config.margin_left,
            margin_right: config.margin_right,
            margin_top: config.margin_top,
            margin_bottom: config.margin_bottom,
        }
    }
}

impl Default for Plane {
    fn default() -> Self {
        Plane::from(&PlaneConfig::default())
    }
}

impl Plane {
    pub fn plot_width(&self) -> f64 {
        self.width - self.margin_left - self.margin_right
    }

    pub fn plot_height(&self) -> f64 {
        self.height - self.margin_top - self.margin_bottom
    }
}

/// Bidirectional mapping for one day's axis range
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    plane: Plane,
    range: TemperatureRange,
}

impl CoordinateMapper {
    pub fn new(plane: Plane, range: TemperatureRange) -> Self {
        Self { plane, range }
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn range(&self) -> TemperatureRange {
        self.range
    }

    pub fn hour_to_x(&self, hour: f64) -> f64 {
        self.plane.margin_left + (hour / HOURS_PER_DAY) * self.plane.plot_width()
    }

    pub fn temp_to_y(&self, temperature: f64) -> f64 {
        let fraction = (temperature - self.range.min) / self.range.span();
        self.plane.margin_top + self.plane.plot_height() * (1.0 - fraction)
    }

    /// Hour of day for a logical x, clamped to [0, 24].
    pub fn x_to_hour(&self, x: f64) -> f64 {
        let hour = (x - self.plane.margin_left) / self.plane.plot_width() * HOURS_PER_DAY;
        hour.clamp(0.0, HOURS_PER_DAY)
    }

    /// Temperature for a logical y, clamped to the axis range and snapped to 0.5 °C.
    pub fn y_to_temp(&self, y: f64) -> f64 {
        let fraction = 1.0 - (y - self.plane.margin_top) / self.plane.plot_height();
        let raw = self.range.min + fraction * self.range.span();
        clamp_temperature(quantize_temperature(raw.clamp(self.range.min, self.range.max)))
    }

    /// Marker position of a transition on the plane
    pub fn project(&self, transition: &Transition) -> Point {
        Point::new(
            self.hour_to_x(transition.time.as_hours()),
            self.temp_to_y(transition.temperature),
        )
    }
}
