// File: crates/chart-engine/src/segment.rs
// Summary: Split a processed series into same-classification runs and project them onto the shared timeline.
// Notes:
// - A crossing point closes one run and opens the next, so adjacent colored
//   runs meet exactly on the threshold line.
// - A classification change without a crossing happens around a point sitting
//   exactly on the threshold. That point ends the old run and starts the new
//   one, so every edge keeps the color of the side it lies on.

use serde::Serialize;

use crate::gaps::{PointKind, TimedPoint};
use crate::threshold::{classify_point, Classification, ThresholdEvaluator};

/// Maximal run of one classification, as indices into the series' own points.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SegmentRun {
    pub classification: Classification,
    pub indices: Vec<usize>,
}

struct OpenRun {
    classification: Option<Classification>,
    indices: Vec<usize>,
}

fn close(open: Option<OpenRun>, out: &mut Vec<SegmentRun>) {
    if let Some(OpenRun { classification: Some(classification), indices }) = open {
        out.push(SegmentRun { classification, indices });
    }
}

/// `points` must be sorted and already carry gap and crossing points.
pub fn build_segments(points: &[TimedPoint], evaluator: &ThresholdEvaluator) -> Vec<SegmentRun> {
    let mut out = Vec::new();
    let mut open: Option<OpenRun> = None;

    for (i, p) in points.iter().enumerate() {
        match &p.kind {
            PointKind::Gap | PointKind::Missing { .. } => close(open.take(), &mut out),
            PointKind::Crossing { .. } => {
                if let Some(mut run) = open.take() {
                    run.indices.push(i);
                    close(Some(run), &mut out);
                }
                open = Some(OpenRun { classification: None, indices: vec![i] });
            }
            PointKind::Real { value, .. } => {
                let threshold = evaluator.evaluate(p.timestamp);
                let Some(class) = classify_point(Some(*value), threshold) else {
                    close(open.take(), &mut out);
                    continue;
                };
                let on_threshold = threshold == Some(*value);
                let continues = open.as_ref().map(|r| r.classification.map_or(true, |c| c == class));
                match continues {
                    Some(true) => {
                        if let Some(run) = open.as_mut() {
                            run.classification = Some(class);
                            run.indices.push(i);
                        }
                    }
                    Some(false) => {
                        let mut run = open.take();
                        let mut indices = Vec::new();
                        if on_threshold {
                            if let Some(r) = run.as_mut() {
                                r.indices.push(i);
                            }
                        } else if let Some(&last) = run.as_ref().and_then(|r| r.indices.last()) {
                            indices.push(last);
                        }
                        close(run, &mut out);
                        indices.push(i);
                        open = Some(OpenRun { classification: Some(class), indices });
                    }
                    None => open = Some(OpenRun { classification: Some(class), indices: vec![i] }),
                }
            }
        }
    }
    close(open, &mut out);
    out
}

/// A run laid out on the shared timeline: `values` has the timeline's length
/// and is `None` outside `start..=end`. Inside the span, `None` only appears at
/// timestamps that belong to other series.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub classification: Classification,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub start: usize,
    pub end: usize,
    pub values: Vec<Option<f64>>,
}

/// Position of `timestamp` on a sorted timeline.
pub fn timeline_index(timeline: &[f64], timestamp: f64) -> Option<usize> {
    timeline.binary_search_by(|t| t.total_cmp(&timestamp)).ok()
}

impl SegmentRun {
    pub fn project(&self, points: &[TimedPoint], timeline: &[f64], color: Option<String>) -> Option<Segment> {
        let mut values = vec![None; timeline.len()];
        let mut span: Option<(usize, usize)> = None;
        for &i in &self.indices {
            let p = points.get(i)?;
            let at = timeline_index(timeline, p.timestamp)?;
            values[at] = p.value();
            span = Some(match span {
                Some((lo, hi)) => (lo.min(at), hi.max(at)),
                None => (at, at),
            });
        }
        let (start, end) = span?;
        Some(Segment { classification: self.classification, color, start, end, values })
    }
}
