// File: crates/chart-engine/src/axis.rs
// Summary: Per-axis value range statistics (always showing the zero line).

use serde::Serialize;

use crate::series::AxisSide;

/// Running min/max for one axis.
/// Contract after `finish`: `min <= 0 <= max` and `min < max`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AxisStats {
    pub min: f64,
    pub max: f64,
}

impl AxisStats {
    pub fn new() -> Self {
        Self { min: f64::INFINITY, max: f64::NEG_INFINITY }
    }

    /// Fold one value in; non-finite values are ignored.
    pub fn fold(&mut self, value: f64) {
        if value.is_finite() {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
    }

    pub fn fold_all(&mut self, values: impl IntoIterator<Item = f64>) {
        for v in values {
            self.fold(v);
        }
    }

    /// Clamp to include zero and widen a zero-height range by one on each side.
    pub fn finish(self) -> Self {
        let (mut min, mut max) = if self.min <= self.max { (self.min, self.max) } else { (0.0, 0.0) };
        min = min.min(0.0);
        max = max.max(0.0);
        if min == max {
            min -= 1.0;
            max += 1.0;
        }
        Self { min, max }
    }
}

impl Default for AxisStats {
    fn default() -> Self { Self::new() }
}

/// Stats for both chart axes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct AxisPair {
    pub left: AxisStats,
    pub right: AxisStats,
}

impl AxisPair {
    pub fn get_mut(&mut self, side: AxisSide) -> &mut AxisStats {
        match side {
            AxisSide::Left => &mut self.left,
            AxisSide::Right => &mut self.right,
        }
    }

    pub fn finish(self) -> Self {
        Self { left: self.left.finish(), right: self.right.finish() }
    }
}
