// File: crates/chart-engine/src/gaps.rs
// Summary: Gap detection (synthetic "no data" breaks) and segment boundary marking.

use serde::Serialize;

use crate::frequency::parse_frequency;
use crate::series::{Sample, SampleMeta};

pub const DEFAULT_GAP_MULTIPLIER: f64 = 1.5;
/// Fraction of a gap after which the synthetic break is placed.
pub const GAP_OFFSET_RATIO: f64 = 0.1;

/// What a point on a processed series is. A real point always has a value;
/// absence is spelled `Missing` (in the data) or `Gap` (inserted).
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointKind {
    Real {
        value: f64,
        #[serde(skip_serializing_if = "Option::is_none")]
        meta: Option<SampleMeta>,
    },
    Missing {
        #[serde(skip_serializing_if = "Option::is_none")]
        meta: Option<SampleMeta>,
    },
    Gap,
    Crossing {
        value: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TimedPoint {
    pub timestamp: f64,
    #[serde(flatten)]
    pub kind: PointKind,
}

impl TimedPoint {
    pub fn real(timestamp: f64, value: f64) -> Self {
        Self { timestamp, kind: PointKind::Real { value, meta: None } }
    }

    pub fn gap(timestamp: f64) -> Self {
        Self { timestamp, kind: PointKind::Gap }
    }

    pub fn crossing(timestamp: f64, value: f64) -> Self {
        Self { timestamp, kind: PointKind::Crossing { value } }
    }

    pub fn from_sample(sample: &Sample) -> Self {
        let timestamp = sample.timestamp as f64;
        let meta = sample.meta.clone();
        match sample.finite_value() {
            Some(value) => Self { timestamp, kind: PointKind::Real { value, meta } },
            None => Self { timestamp, kind: PointKind::Missing { meta } },
        }
    }

    /// Numeric value, `None` for missing and gap points.
    pub fn value(&self) -> Option<f64> {
        match self.kind {
            PointKind::Real { value, .. } | PointKind::Crossing { value } => Some(value),
            PointKind::Missing { .. } | PointKind::Gap => None,
        }
    }

    pub fn is_gap(&self) -> bool {
        matches!(self.kind, PointKind::Gap | PointKind::Missing { .. })
    }

    pub fn is_synthetic(&self) -> bool {
        matches!(self.kind, PointKind::Gap | PointKind::Crossing { .. })
    }

    pub fn meta(&self) -> Option<&SampleMeta> {
        match &self.kind {
            PointKind::Real { meta, .. } | PointKind::Missing { meta } => meta.as_ref(),
            _ => None,
        }
    }
}

/// Largest spacing tolerated between consecutive points, in ms.
/// An absent or unparseable frequency disables gap detection.
pub fn gap_threshold_ms(frequency: Option<&str>, multiplier: f64) -> f64 {
    match frequency.and_then(parse_frequency) {
        Some(f) => spacing_threshold_ms(f.to_approx_ms(), multiplier),
        None => f64::INFINITY,
    }
}

/// Gap threshold for an expected spacing; a non-positive multiplier falls
/// back to [`DEFAULT_GAP_MULTIPLIER`].
pub fn spacing_threshold_ms(spacing_ms: i64, multiplier: f64) -> f64 {
    let multiplier = if multiplier.is_finite() && multiplier > 0.0 { multiplier } else { DEFAULT_GAP_MULTIPLIER };
    spacing_ms as f64 * multiplier
}

/// Insert one `Gap` point into every spacing wider than the gap threshold.
/// `points` must be sorted by timestamp.
pub fn insert_gap_points(points: &[TimedPoint], frequency: Option<&str>, multiplier: f64) -> Vec<TimedPoint> {
    insert_gap_points_with_threshold(points, gap_threshold_ms(frequency, multiplier))
}

pub fn insert_gap_points_with_threshold(points: &[TimedPoint], threshold: f64) -> Vec<TimedPoint> {
    if points.len() < 2 || threshold.is_nan() || threshold.is_infinite() {
        return points.to_vec();
    }
    let mut out = Vec::with_capacity(points.len() + 8);
    for (i, cur) in points.iter().enumerate() {
        out.push(cur.clone());
        if let Some(next) = points.get(i + 1) {
            let gap = next.timestamp - cur.timestamp;
            if gap > threshold {
                out.push(TimedPoint::gap(cur.timestamp + GAP_OFFSET_RATIO * gap));
            }
        }
    }
    if out.len() > points.len() {
        tracing::trace!(inserted = out.len() - points.len(), threshold_ms = threshold, "gap points inserted");
    }
    out
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MarkedPoint {
    #[serde(flatten)]
    pub point: TimedPoint,
    pub show_mark: bool,
}

/// Flag the first and last point of every contiguous run of non-gap points.
pub fn identify_segment_boundaries(points: Vec<TimedPoint>) -> Vec<MarkedPoint> {
    let mut out: Vec<MarkedPoint> =
        points.into_iter().map(|point| MarkedPoint { point, show_mark: false }).collect();
    let mut run_start: Option<usize> = None;
    for i in 0..=out.len() {
        let is_gap = out.get(i).map_or(true, |p| p.point.is_gap());
        match (is_gap, run_start) {
            (false, None) => run_start = Some(i),
            (true, Some(start)) => {
                out[start].show_mark = true;
                out[i - 1].show_mark = true;
                run_start = None;
            }
            _ => {}
        }
    }
    out
}

/// Gap insertion followed by boundary marking, so inserted gaps end segments.
pub fn process_time_series(points: &[TimedPoint], frequency: Option<&str>, multiplier: f64) -> Vec<MarkedPoint> {
    identify_segment_boundaries(insert_gap_points(points, frequency, multiplier))
}
