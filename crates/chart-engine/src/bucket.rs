// File: crates/chart-engine/src/bucket.rs
// Summary: Aggregation of raw samples into calendar-aware buckets (mean or sum, with min/max).

use std::collections::HashMap;

use chrono::TimeZone;
use serde::Serialize;

use crate::resolution::{
    choose_display_resolution_with, choose_series_bucket_resolution, floor_to_bucket, Resolution,
    MIN_DISPLAY_POINTS, PX_PER_POINT,
};
use crate::series::{Sample, SeriesDescriptor, SeriesKind, TimeRange};

/// Aggregate of the samples falling in one bucket.
/// Contract: `count >= 1` and `min <= value <= max` for instant series.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Bucket {
    pub start: i64,
    pub value: f64,
    pub min: f64,
    pub max: f64,
    pub count: usize,
}

impl Bucket {
    pub fn to_sample(&self) -> Sample {
        Sample::value(self.start, self.value)
    }
}

#[derive(Clone, Copy, Debug)]
pub struct BucketOptions {
    pub resolution: Resolution,
    pub time_range: Option<TimeRange>,
    pub kind: SeriesKind,
}

#[derive(Clone, Copy)]
struct Acc {
    sum: f64,
    min: f64,
    max: f64,
    count: usize,
}

pub fn aggregate_series_into_buckets<Tz: TimeZone>(samples: &[Sample], opts: &BucketOptions, tz: &Tz) -> Vec<Bucket> {
    let mut groups: HashMap<i64, Acc> = HashMap::new();
    for sample in samples {
        if let Some(range) = opts.time_range {
            if !range.contains(sample.timestamp) {
                continue;
            }
        }
        let Some(v) = sample.finite_value() else { continue };
        let start = floor_to_bucket(sample.timestamp, opts.resolution, tz);
        groups
            .entry(start)
            .and_modify(|acc| {
                acc.sum += v;
                acc.min = acc.min.min(v);
                acc.max = acc.max.max(v);
                acc.count += 1;
            })
            .or_insert(Acc { sum: v, min: v, max: v, count: 1 });
    }

    let mut out: Vec<Bucket> = groups
        .into_iter()
        .map(|(start, acc)| {
            let value = match opts.kind {
                SeriesKind::Cumulative => acc.sum,
                // float rounding may push the mean past min/max
                SeriesKind::Instant => (acc.sum / acc.count as f64).clamp(acc.min, acc.max),
            };
            Bucket { start, value, min: acc.min, max: acc.max, count: acc.count }
        })
        .collect();
    out.sort_by_key(|b| b.start);
    out
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedSeries {
    pub id: String,
    pub resolution: Resolution,
    pub buckets: Vec<Bucket>,
}

#[derive(Clone, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BucketedCollection {
    pub display_resolution: Resolution,
    pub series: Vec<BucketedSeries>,
}

/// Bucket every series at its own resolution under one shared display resolution.
pub fn bucket_series_collection<Tz: TimeZone>(
    series: &[SeriesDescriptor],
    time_range: Option<TimeRange>,
    width_px: u32,
    tz: &Tz,
) -> BucketedCollection {
    bucket_series_collection_with(series, time_range, width_px, MIN_DISPLAY_POINTS, PX_PER_POINT, tz)
}

pub fn bucket_series_collection_with<Tz: TimeZone>(
    series: &[SeriesDescriptor],
    time_range: Option<TimeRange>,
    width_px: u32,
    min_points: u32,
    px_per_point: u32,
    tz: &Tz,
) -> BucketedCollection {
    let span = time_range.or_else(|| TimeRange::union_of(series));
    let display_resolution = choose_display_resolution_with(
        span.map(|r| r.start),
        span.map(|r| r.end),
        width_px,
        min_points,
        px_per_point,
    );
    let series = series
        .iter()
        .map(|s| {
            let resolution = choose_series_bucket_resolution(display_resolution, s.native_resolution());
            let opts = BucketOptions { resolution, time_range, kind: s.kind };
            let buckets = aggregate_series_into_buckets(&s.samples, &opts, tz);
            tracing::debug!(series = %s.id, %resolution, buckets = buckets.len(), "series bucketed");
            BucketedSeries { id: s.id.clone(), resolution, buckets }
        })
        .collect();
    BucketedCollection { display_resolution, series }
}
