//! Dashboard configuration.
//!
//! The reveal cadence and the viewport fitting parameters are plain values with
//! sensible defaults; hosts can override them from JSON.
//!
//! ```rust
//! use run_heatmap::DashboardConfig;
//!
//! let config = DashboardConfig::from_json(r#"{"reveal": {"steps": 10, "interval_ms": 50}}"#).unwrap();
//! assert_eq!(config.reveal.steps, 10);
//! assert_eq!(config.viewport.width, 800.0); // untouched values keep their defaults
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{DashboardError, Result};

/// Configuration for the incremental reveal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RevealConfig {
    /// Approximate number of ticks a filtered set is revealed over.
    /// Default: 20
    pub steps: u32,

    /// Wall-clock interval between reveal ticks in milliseconds.
    /// Default: 100
    pub interval_ms: u64,
}

impl RevealConfig {
    /// Tick interval as a `Duration`.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Default for RevealConfig {
    fn default() -> Self {
        Self {
            steps: 20,
            interval_ms: 100,
        }
    }
}

/// Configuration for fitting a viewport around the displayed tracks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewportConfig {
    /// Display width in pixels the bounds are fitted into.
    /// Default: 800.0
    pub width: f64,

    /// Display height in pixels.
    /// Default: 600.0
    pub height: f64,

    /// Padding kept on each side of the fitted bounds, in pixels.
    /// Default: 200.0
    pub padding: f64,

    /// Upper limit for the fitted zoom.
    /// Default: 20.0
    pub max_zoom: f64,

    /// Zoom used when all coordinates collapse onto one location.
    /// Default: 9.0
    pub single_point_zoom: f64,

    /// Zoom above which selecting a year resets the viewport before animating.
    /// Default: 3.0
    pub zoom_reset_threshold: f64,
}

impl Default for ViewportConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
            padding: 200.0,
            max_zoom: 20.0,
            single_point_zoom: 9.0,
            zoom_reset_threshold: 3.0,
        }
    }
}

/// Top-level configuration for a [`SelectionController`](crate::SelectionController).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    pub reveal: RevealConfig,
    pub viewport: ViewportConfig,
}

impl DashboardConfig {
    /// Parse a (possibly partial) configuration from JSON and validate it.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: DashboardConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that every value is usable.
    pub fn validate(&self) -> Result<()> {
        if self.reveal.steps == 0 {
            return Err(invalid("reveal.steps", "must be at least 1"));
        }
        if self.reveal.interval_ms == 0 {
            return Err(invalid("reveal.interval_ms", "must be greater than 0"));
        }

        let v = &self.viewport;
        if !(v.width.is_finite() && v.width > 0.0) {
            return Err(invalid("viewport.width", "must be a positive number"));
        }
        if !(v.height.is_finite() && v.height > 0.0) {
            return Err(invalid("viewport.height", "must be a positive number"));
        }
        if !(v.padding.is_finite() && v.padding >= 0.0) {
            return Err(invalid("viewport.padding", "must not be negative"));
        }
        for (field, value) in [
            ("viewport.max_zoom", v.max_zoom),
            ("viewport.single_point_zoom", v.single_point_zoom),
            ("viewport.zoom_reset_threshold", v.zoom_reset_threshold),
        ] {
            if !(value.is_finite() && value >= 0.0) {
                return Err(invalid(field, "must not be negative"));
            }
        }

        Ok(())
    }
}

fn invalid(field: &str, message: &str) -> DashboardError {
    DashboardError::InvalidConfig {
        field: field.to_string(),
        message: message.to_string(),
    }
}
