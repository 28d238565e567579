//! Editor configuration
//!
//! Every field has a default, so an empty TOML document (or no file at all)
//! yields the stock editor geometry. Loaded values are checked before use.
//!
//! ```toml
//! [plane]
//! width = 800.0
//! height = 400.0
//!
//! [gesture]
//! drag_threshold_px = 5.0
//! snap_minutes = 15
//!
//! [axis]
//! mode = "dynamic"
//! padding = 2.0
//! min_span = 10.0
//! ```

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ScheduleError;
use crate::types::{MAX_TEMPERATURE, MIN_TEMPERATURE};

/// Top-level configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    pub plane: PlaneConfig,
    pub gesture: GestureConfig,
    pub axis: AxisRangeConfig,
}

/// Logical rendering plane and plot margins
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaneConfig {
    pub width: f64,
    pub height: f64,
    pub margin_left: f64,
    pub margin_right: f64,
    pub margin_top: f64,
    pub margin_bottom: f64,
}

impl Default for PlaneConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 400.0,
            margin_left: 50.0,
            margin_right: 20.0,
            margin_top: 20.0,
            margin_bottom: 40.0,
        }
    }
}

/// Drag gesture tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureConfig {
    /// Movement (screen pixels) that turns a press into a drag
    pub drag_threshold_px: f64,
    /// Time grid for non-anchor transitions while dragging
    pub snap_minutes: u32,
    /// Marker hit radius in logical plane units
    pub hit_radius: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            drag_threshold_px: 5.0,
            snap_minutes: 15,
            hit_radius: 12.0,
        }
    }
}

/// How the temperature axis range is chosen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum AxisRangeConfig {
    /// Fit the selected day's temperatures, padded and widened to `min_span`
    Dynamic {
        #[serde(default = "default_padding")]
        padding: f64,
        #[serde(default = "default_min_span")]
        min_span: f64,
    },
    /// One range for every day
    Fixed {
        #[serde(default = "default_fixed_min")]
        min: f64,
        #[serde(default = "default_fixed_max")]
        max: f64,
    },
}

fn default_padding() -> f64 {
    2.0
}

fn default_min_span() -> f64 {
    10.0
}

fn default_fixed_min() -> f64 {
    MIN_TEMPERATURE
}

fn default_fixed_max() -> f64 {
    MAX_TEMPERATURE
}

impl Default for AxisRangeConfig {
    fn default() -> Self {
        AxisRangeConfig::Dynamic {
            padding: default_padding(),
            min_span: default_min_span(),
        }
    }
}

impl EditorConfig {
    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ScheduleError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Parse and check a TOML document.
    pub fn from_toml_str(content: &str) -> Result<Self, ScheduleError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values that would make the coordinate mapping degenerate or
    /// the gesture thresholds meaningless.
    pub fn validate(&self) -> Result<(), ScheduleError> {
        let plane = &self.plane;
        let margins = [
            plane.margin_left,
            plane.margin_right,
            plane.margin_top,
            plane.margin_bottom,
        ];
        if margins.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(invalid("plane margins must be finite and non-negative"));
        }
        if !(plane.width.is_finite() && plane.height.is_finite()) {
            return Err(invalid("plane size must be finite"));
        }
        if plane.width - plane.margin_left - plane.margin_right <= 0.0
            || plane.height - plane.margin_top - plane.margin_bottom <= 0.0
        {
            return Err(invalid("plot area inside the margins must be non-empty"));
        }

        let gesture = &self.gesture;
        if !gesture.drag_threshold_px.is_finite() || gesture.drag_threshold_px < 0.0 {
            return Err(invalid("gesture.drag_threshold_px must be finite and non-negative"));
        }
        if !gesture.hit_radius.is_finite() || gesture.hit_radius <= 0.0 {
            return Err(invalid("gesture.hit_radius must be positive"));
        }
        if !(1..=60).contains(&gesture.snap_minutes) {
            return Err(invalid("gesture.snap_minutes must be within 1..=60"));
        }

        match self.axis {
            AxisRangeConfig::Dynamic { padding, min_span } => {
                if !(padding.is_finite() && padding >= 0.0 && min_span.is_finite() && min_span >= 0.0)
                {
                    return Err(invalid("axis padding and min_span must be finite and non-negative"));
                }
            }
            AxisRangeConfig::Fixed { min, max } => {
                if !(min.is_finite() && max.is_finite() && min < max) {
                    return Err(invalid("axis min must be below max"));
                }
            }
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> ScheduleError {
    ScheduleError::InvalidConfig(reason.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_document_uses_defaults() {
        let config = EditorConfig::from_toml_str("").unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn test_partial_sections() {
        let config = EditorConfig::from_toml_str(
            r#"
            [gesture]
            drag_threshold_px = 8.0

            [axis]
            mode = "fixed"
            min = 10.0
            max = 30.0
            "#,
        )
        .unwrap();

        assert_eq!(config.gesture.drag_threshold_px, 8.0);
        assert_eq!(config.gesture.snap_minutes, 15);
        assert_eq!(config.plane, PlaneConfig::default());
        assert_eq!(config.axis, AxisRangeConfig::Fixed { min: 10.0, max: 30.0 });
    }

    #[test]
    fn test_axis_fields_default_individually() {
        let config = EditorConfig::from_toml_str("[axis]\nmode = \"dynamic\"\npadding = 1.0\n").unwrap();
        assert_eq!(
            config.axis,
            AxisRangeConfig::Dynamic {
                padding: 1.0,
                min_span: 10.0
            }
        );

        let config = EditorConfig::from_toml_str("[axis]\nmode = \"fixed\"\nmax = 28.0\n").unwrap();
        assert_eq!(config.axis, AxisRangeConfig::Fixed { min: 4.0, max: 28.0 });
    }

    #[test]
    fn test_degenerate_values_rejected() {
        let bad = [
            "[plane]\nwidth = 70.0\n",
            "[plane]\nheight = 0.0\n",
            "[plane]\nmargin_left = -5.0\n",
            "[gesture]\ndrag_threshold_px = -1.0\n",
            "[gesture]\nhit_radius = 0.0\n",
            "[gesture]\nsnap_minutes = 0\n",
            "[axis]\nmode = \"fixed\"\nmin = 30.0\nmax = 10.0\n",
            "[axis]\nmode = \"dynamic\"\npadding = -2.0\n",
        ];
        for doc in bad {
            let err = EditorConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, ScheduleError::InvalidConfig(_)), "{doc:?} gave {err}");
        }
        assert!(EditorConfig::default().validate().is_ok());
    }

    #[test]
    fn test_invalid_toml_is_config_error() {
        let err = EditorConfig::from_toml_str("[plane\nwidth = ").unwrap_err();
        assert!(matches!(err, ScheduleError::ConfigError(_)));
    }
}
