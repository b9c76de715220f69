// File: crates/chart-engine/src/options.rs
// Summary: Engine tuning knobs; deserializable so callers can load them from config files.

use serde::{Deserialize, Serialize};

use crate::gaps::DEFAULT_GAP_MULTIPLIER;
use crate::resolution::{MIN_DISPLAY_POINTS, PX_PER_POINT};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecimationOptions {
    pub enabled: bool,
    /// Points kept per horizontal pixel of the viewport.
    pub points_per_px: f64,
    /// Never decimate below this many points.
    pub min_points: usize,
}

impl Default for DecimationOptions {
    fn default() -> Self {
        Self { enabled: true, points_per_px: 2.0, min_points: 100 }
    }
}

impl DecimationOptions {
    /// Per-series point budget for a viewport `width_px` wide.
    pub fn target(&self, width_px: u32) -> usize {
        let by_width = (f64::from(width_px) * self.points_per_px.max(0.0)).floor() as usize;
        by_width.max(self.min_points).max(2)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Spacing above `frequency * gap_multiplier` is a gap.
    pub gap_multiplier: f64,
    /// Aggregate series to the display resolution before decimating.
    pub bucketing: bool,
    pub min_display_points: u32,
    pub px_per_point: u32,
    pub decimation: DecimationOptions,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            gap_multiplier: DEFAULT_GAP_MULTIPLIER,
            bucketing: false,
            min_display_points: MIN_DISPLAY_POINTS,
            px_per_point: PX_PER_POINT,
            decimation: DecimationOptions::default(),
        }
    }
}
