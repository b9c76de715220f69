// File: crates/chart-engine/src/threshold.rs
// Summary: Static and time-varying thresholds, point classification and exact crossing points.

use std::collections::HashMap;

use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::EngineError;

/// One breakpoint of a time-varying threshold (`x` is epoch ms).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdPoint {
    pub x: f64,
    pub y: f64,
}

impl ThresholdPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged, try_from = "serde_json::Value")]
pub enum Threshold {
    #[default]
    None,
    Static(f64),
    Dynamic(Vec<ThresholdPoint>),
}

impl Threshold {
    /// Interpret a loosely-typed threshold: `null`, a number, or an array of
    /// `{x, y}` / `{timestamp, value}` objects. Any other shape is a caller bug.
    pub fn from_json(value: &Value) -> Result<Self, EngineError> {
        match value {
            Value::Null => Ok(Threshold::None),
            Value::Number(n) => n
                .as_f64()
                .map(Threshold::Static)
                .ok_or_else(|| EngineError::InvalidThreshold(value.to_string())),
            Value::Array(items) => items
                .iter()
                .map(|item| {
                    parse_point(item).ok_or_else(|| EngineError::InvalidThreshold(item.to_string()))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Threshold::Dynamic),
            other => Err(EngineError::InvalidThreshold(other.to_string())),
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Threshold::None)
    }

    pub fn evaluator(&self) -> ThresholdEvaluator {
        build_threshold_evaluator(self)
    }
}

impl TryFrom<Value> for Threshold {
    type Error = EngineError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        Threshold::from_json(&value)
    }
}

fn parse_point(item: &Value) -> Option<ThresholdPoint> {
    let obj = item.as_object()?;
    let x = obj.get("x").or_else(|| obj.get("timestamp"))?;
    let y = obj.get("y").or_else(|| obj.get("value"))?;
    let x = match x {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => DateTime::parse_from_rfc3339(s).ok()?.timestamp_millis() as f64,
        _ => return None,
    };
    Some(ThresholdPoint { x, y: y.as_f64()? })
}

/// Threshold resolved once per series; evaluation is then a cheap lookup.
#[derive(Clone, Debug)]
pub enum ThresholdEvaluator {
    None,
    Static(f64),
    Dynamic {
        points: Vec<ThresholdPoint>,
        exact: HashMap<u64, f64>,
    },
}

pub fn build_threshold_evaluator(threshold: &Threshold) -> ThresholdEvaluator {
    match threshold {
        Threshold::None => ThresholdEvaluator::None,
        Threshold::Static(v) if v.is_finite() => ThresholdEvaluator::Static(*v),
        Threshold::Static(_) => ThresholdEvaluator::None,
        Threshold::Dynamic(raw) => {
            let mut points: Vec<ThresholdPoint> =
                raw.iter().copied().filter(|p| p.x.is_finite() && p.y.is_finite()).collect();
            if points.is_empty() {
                return ThresholdEvaluator::None;
            }
            points.sort_by(|a, b| a.x.total_cmp(&b.x));
            let exact = points.iter().map(|p| (p.x.to_bits(), p.y)).collect();
            ThresholdEvaluator::Dynamic { points, exact }
        }
    }
}

impl ThresholdEvaluator {
    pub fn is_configured(&self) -> bool {
        !matches!(self, ThresholdEvaluator::None)
    }

    /// Threshold value at `x`; dynamic thresholds interpolate linearly and
    /// hold their first/last value outside the defined range.
    pub fn evaluate(&self, x: f64) -> Option<f64> {
        match self {
            ThresholdEvaluator::None => None,
            ThresholdEvaluator::Static(v) => Some(*v),
            ThresholdEvaluator::Dynamic { points, exact } => {
                if let Some(y) = exact.get(&x.to_bits()) {
                    return Some(*y);
                }
                let first = points.first()?;
                let last = points.last()?;
                if x <= first.x {
                    return Some(first.y);
                }
                if x >= last.x {
                    return Some(last.y);
                }
                let hi = points.partition_point(|p| p.x <= x);
                let (a, b) = (points[hi - 1], points[hi]);
                if b.x == a.x {
                    return Some(a.y);
                }
                Some(a.y + (x - a.x) / (b.x - a.x) * (b.y - a.y))
            }
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Above,
    Below,
    Default,
}

/// `None` means unclassified: the point ends any running segment.
pub fn classify_point(y: Option<f64>, threshold: Option<f64>) -> Option<Classification> {
    let y = y.filter(|v| !v.is_nan())?;
    match threshold {
        None => Some(Classification::Default),
        Some(t) if y > t => Some(Classification::Above),
        Some(_) => Some(Classification::Below),
    }
}

/// Synthetic point where a series meets its threshold.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Crossing {
    pub timestamp: f64,
    pub value: f64,
    /// Index of the point preceding the crossing in the input slice.
    pub after_index: usize,
}

/// Exact crossings between adjacent real points whose offsets from the
/// threshold have strictly opposite signs. Both the series and the threshold
/// are taken as linear between the two points.
pub fn find_crossings(points: &[(f64, Option<f64>)], evaluator: &ThresholdEvaluator) -> Vec<Crossing> {
    if !evaluator.is_configured() {
        return Vec::new();
    }
    let mut out = Vec::new();
    for (i, pair) in points.windows(2).enumerate() {
        let ((t0, Some(y0)), (t1, Some(y1))) = (pair[0], pair[1]) else { continue };
        if !(y0.is_finite() && y1.is_finite()) {
            continue;
        }
        let (Some(th0), Some(th1)) = (evaluator.evaluate(t0), evaluator.evaluate(t1)) else { continue };
        let d0 = y0 - th0;
        let d1 = y1 - th1;
        if !((d0 < 0.0 && d1 > 0.0) || (d0 > 0.0 && d1 < 0.0)) {
            continue;
        }
        let u = d0 / (d0 - d1);
        let t = t0 + u * (t1 - t0);
        // lands on an endpoint only when the offset is below timestamp precision
        if !(t > t0 && t < t1) {
            continue;
        }
        out.push(Crossing {
            timestamp: t,
            value: th0 + u * (th1 - th0),
            after_index: i,
        });
    }
    out
}
