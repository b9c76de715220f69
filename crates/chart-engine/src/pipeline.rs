// File: crates/chart-engine/src/pipeline.rs
// Summary: End-to-end chart preparation: bucketing, gaps, decimation, thresholds, alignment.

use chrono::TimeZone;

use crate::align::{align_series, AlignedModel, AnnotationMarker, ProcessedSeries};
use crate::bucket::{aggregate_series_into_buckets, BucketOptions};
use crate::downsample::{decimate_points, take_indices};
use crate::frequency::frequency_to_ms;
use crate::gaps::{
    identify_segment_boundaries, insert_gap_points_with_threshold, spacing_threshold_ms, TimedPoint,
};
use crate::options::EngineOptions;
use crate::resolution::{choose_display_resolution_with, choose_series_bucket_resolution, Resolution};
use crate::segment::build_segments;
use crate::series::{Sample, SeriesDescriptor, TimeRange, ViewParams};
use crate::threshold::find_crossings;
use crate::timeline::generate_linear_timeline;

/// Prepare every series for rendering on one chart.
///
/// `tz` is the zone calendar buckets are floored in (the dashboard passes
/// `chrono::Local`).
pub fn prepare_chart<Tz: TimeZone>(
    series: &[SeriesDescriptor],
    view: &ViewParams,
    opts: &EngineOptions,
    tz: &Tz,
) -> AlignedModel {
    let span = view.range.or_else(|| TimeRange::union_of(series));
    let display_res = choose_display_resolution_with(
        span.map(|r| r.start),
        span.map(|r| r.end),
        view.width_px,
        opts.min_display_points,
        opts.px_per_point,
    );
    tracing::debug!(series = series.len(), width_px = view.width_px, display = %display_res, "preparing chart");

    let processed = series
        .iter()
        .map(|s| process_series(s, view, display_res, opts, tz))
        .collect();

    let linear_timeline = span
        .map(|r| generate_linear_timeline(r, display_res, tz))
        .unwrap_or_default();
    align_series(processed, display_res, linear_timeline)
}

/// Run one series through the per-series stages, leaving it on its own timestamps.
pub fn process_series<Tz: TimeZone>(
    descriptor: &SeriesDescriptor,
    view: &ViewParams,
    display: Resolution,
    opts: &EngineOptions,
    tz: &Tz,
) -> ProcessedSeries {
    let mut samples = descriptor.sorted_samples();
    // keep the last sample of each timestamp
    samples.reverse();
    samples.dedup_by_key(|s| s.timestamp);
    samples.reverse();
    if let Some(range) = view.range {
        samples.retain(|s| range.contains(s.timestamp));
    }

    let markers: Vec<AnnotationMarker> = samples
        .iter()
        .filter(|s| s.is_annotated())
        .filter_map(|s| {
            Some(AnnotationMarker {
                series_id: descriptor.id.clone(),
                timestamp: s.timestamp,
                value: s.finite_value(),
                meta: s.meta.clone()?,
            })
        })
        .collect();

    // raw data is reported at its own granularity
    let resolution = if opts.bucketing {
        choose_series_bucket_resolution(display, descriptor.native_resolution())
    } else {
        descriptor.native_resolution()
    };
    let mut spacing_ms = descriptor.frequency.as_deref().and_then(frequency_to_ms);
    if opts.bucketing {
        let bucket_opts = BucketOptions { resolution, time_range: view.range, kind: descriptor.kind };
        samples = aggregate_series_into_buckets(&samples, &bucket_opts, tz)
            .iter()
            .map(|b| b.to_sample())
            .collect::<Vec<Sample>>();
        spacing_ms = spacing_ms.map(|ms| ms.max(resolution.approx_ms()));
    }

    let points: Vec<TimedPoint> = samples.iter().map(TimedPoint::from_sample).collect();
    let gap_threshold = spacing_ms.map_or(f64::INFINITY, |ms| spacing_threshold_ms(ms, opts.gap_multiplier));
    let mut points = insert_gap_points_with_threshold(&points, gap_threshold);

    // gaps go in first so decimation cannot bridge them
    let mut did_decimate = false;
    if opts.decimation.enabled {
        let decimation = decimate_points(&points, opts.decimation.target(view.width_px));
        if decimation.did_decimate {
            points = take_indices(&points, &decimation);
            did_decimate = true;
        }
    }

    let marked = identify_segment_boundaries(points);
    let marks = marked.iter().filter(|m| m.show_mark).map(|m| m.point.timestamp).collect();
    let points: Vec<TimedPoint> = marked.into_iter().map(|m| m.point).collect();

    let evaluator = descriptor.threshold.evaluator();
    let pairs: Vec<(f64, Option<f64>)> = points.iter().map(|p| (p.timestamp, p.value())).collect();
    let crossings = find_crossings(&pairs, &evaluator);
    let points = if crossings.is_empty() {
        points
    } else {
        let mut merged = Vec::with_capacity(points.len() + crossings.len());
        let mut pending = crossings.iter().peekable();
        for (i, p) in points.into_iter().enumerate() {
            merged.push(p);
            while let Some(c) = pending.next_if(|c| c.after_index == i) {
                merged.push(TimedPoint::crossing(c.timestamp, c.value));
            }
        }
        merged
    };
    let runs = build_segments(&points, &evaluator);

    tracing::debug!(
        series = %descriptor.id,
        %resolution,
        points = points.len(),
        crossings = crossings.len(),
        segments = runs.len(),
        did_decimate,
        "series processed"
    );

    ProcessedSeries {
        id: descriptor.id.clone(),
        label: descriptor.label.clone(),
        axis: descriptor.axis,
        kind: descriptor.kind,
        color: descriptor.color.clone(),
        above_color: descriptor.above_color.clone(),
        below_color: descriptor.below_color.clone(),
        resolution,
        points,
        marks,
        runs,
        evaluator,
        markers,
        did_decimate,
    }
}
