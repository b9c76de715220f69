// File: crates/chart-engine/src/align.rs
// Summary: Shared timeline construction, per-series resampling and the aligned output model.

use serde::Serialize;

use crate::axis::{AxisPair, AxisStats};
use crate::gaps::TimedPoint;
use crate::resolution::Resolution;
use crate::segment::{timeline_index, Segment, SegmentRun};
use crate::series::{AxisSide, SampleMeta, SeriesKind};
use crate::threshold::{Classification, ThresholdEvaluator};

/// Union of all timestamps, ascending and de-duplicated.
pub fn build_timeline<'a>(series: impl IntoIterator<Item = &'a [TimedPoint]>) -> Vec<f64> {
    let mut timeline: Vec<f64> = series
        .into_iter()
        .flat_map(|points| points.iter().map(|p| p.timestamp))
        .filter(|t| t.is_finite())
        .collect();
    timeline.sort_by(f64::total_cmp);
    timeline.dedup();
    timeline
}

/// Values of `points` on `timeline`; `None` where the series has no point.
pub fn resample(points: &[TimedPoint], timeline: &[f64]) -> Vec<Option<f64>> {
    let mut values = vec![None; timeline.len()];
    for p in points {
        if let Some(i) = timeline_index(timeline, p.timestamp) {
            values[i] = p.value();
        }
    }
    values
}

/// Annotated point handed to the renderer for a marker or tooltip.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnotationMarker {
    pub series_id: String,
    pub timestamp: i64,
    pub value: Option<f64>,
    pub meta: SampleMeta,
}

/// One series after gap insertion, decimation and threshold processing,
/// still on its own timestamps.
#[derive(Clone, Debug)]
pub struct ProcessedSeries {
    pub id: String,
    pub label: String,
    pub axis: AxisSide,
    pub kind: SeriesKind,
    pub color: Option<String>,
    pub above_color: Option<String>,
    pub below_color: Option<String>,
    pub resolution: Resolution,
    pub points: Vec<TimedPoint>,
    /// Timestamps of points flagged as segment boundaries.
    pub marks: Vec<f64>,
    pub runs: Vec<SegmentRun>,
    pub evaluator: ThresholdEvaluator,
    pub markers: Vec<AnnotationMarker>,
    pub did_decimate: bool,
}

impl ProcessedSeries {
    fn color_for(&self, classification: Classification) -> Option<String> {
        let hint = match classification {
            Classification::Above => self.above_color.as_ref(),
            Classification::Below => self.below_color.as_ref(),
            Classification::Default => None,
        };
        hint.or(self.color.as_ref()).cloned()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedSeries {
    pub id: String,
    pub label: String,
    pub axis: AxisSide,
    pub kind: SeriesKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    /// Bucket resolution when bucketing is on, otherwise the series' native
    /// resolution.
    pub resolution: Resolution,
    pub label_format: &'static str,
    pub values: Vec<Option<f64>>,
    /// Threshold evaluated on the timeline; empty when none is configured.
    pub threshold_values: Vec<Option<f64>>,
    pub segments: Vec<Segment>,
    pub marks: Vec<f64>,
    pub did_decimate: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AlignedModel {
    pub timeline: Vec<f64>,
    /// Regular bucket starts at the display resolution; empty when the range
    /// is too long for a linear axis.
    pub linear_timeline: Vec<i64>,
    pub display_resolution: Resolution,
    pub label_format: &'static str,
    pub series: Vec<AlignedSeries>,
    pub left: AxisStats,
    pub right: AxisStats,
    pub markers: Vec<AnnotationMarker>,
    pub did_decimate: bool,
}

impl AlignedModel {
    pub fn axis(&self, side: AxisSide) -> &AxisStats {
        match side {
            AxisSide::Left => &self.left,
            AxisSide::Right => &self.right,
        }
    }

    pub fn series(&self, id: &str) -> Option<&AlignedSeries> {
        self.series.iter().find(|s| s.id == id)
    }
}

/// Put every processed series on one shared timeline and compute axis stats.
pub fn align_series(
    processed: Vec<ProcessedSeries>,
    display_resolution: Resolution,
    linear_timeline: Vec<i64>,
) -> AlignedModel {
    let timeline = build_timeline(processed.iter().map(|s| s.points.as_slice()));
    let mut axes = AxisPair::default();
    let mut markers = Vec::new();
    let mut did_decimate = false;

    let series = processed
        .into_iter()
        .map(|s| {
            let values = resample(&s.points, &timeline);
            let threshold_values: Vec<Option<f64>> = if s.evaluator.is_configured() {
                timeline.iter().map(|&t| s.evaluator.evaluate(t)).collect()
            } else {
                Vec::new()
            };

            let stats = axes.get_mut(s.axis);
            stats.fold_all(values.iter().flatten().copied());
            stats.fold_all(threshold_values.iter().flatten().copied());

            let segments = s
                .runs
                .iter()
                .filter_map(|run| run.project(&s.points, &timeline, s.color_for(run.classification)))
                .collect();

            did_decimate |= s.did_decimate;
            markers.extend(s.markers.iter().cloned());
            AlignedSeries {
                label_format: s.resolution.label_format(),
                id: s.id,
                label: s.label,
                axis: s.axis,
                kind: s.kind,
                color: s.color,
                resolution: s.resolution,
                values,
                threshold_values,
                segments,
                marks: s.marks,
                did_decimate: s.did_decimate,
            }
        })
        .collect();

    let axes = axes.finish();
    AlignedModel {
        timeline,
        linear_timeline,
        display_resolution,
        label_format: display_resolution.label_format(),
        series,
        left: axes.left,
        right: axes.right,
        markers,
        did_decimate,
    }
}
