// File: crates/chart-engine/tests/pipeline.rs
// Purpose: End-to-end chart preparation: shared timeline, segments, axis stats and markers.

use chart_engine::frequency::MINUTE_MS;
use chart_engine::{
    prepare_chart, AxisSide, AxisStats, Classification, EngineOptions, Resolution, Sample, SampleMeta,
    SeriesDescriptor, SeriesKind, Threshold, ViewParams,
};
use chrono::Utc;

const T0: i64 = 1_704_067_200_000; // 2024-01-01T00:00:00Z

fn at(minutes: f64) -> f64 {
    T0 as f64 + minutes * MINUTE_MS as f64
}

fn level_series() -> SeriesDescriptor {
    let values = [5.0, 15.0, 20.0, 8.0, 12.0, 3.0];
    let mut samples: Vec<Sample> =
        values.iter().enumerate().map(|(i, v)| Sample::value(T0 + i as i64 * MINUTE_MS, *v)).collect();
    samples[2] = samples[2].clone().with_meta(SampleMeta::comment("pump restarted"));
    SeriesDescriptor::new("level", samples)
        .with_label("Water level")
        .with_frequency("1 minute")
        .with_color("#1f77b4")
        .with_threshold_colors("#d62728", "#2ca02c")
        .with_threshold(Threshold::Static(10.0))
}

fn volume_series() -> SeriesDescriptor {
    let samples = vec![Sample::value(T0 + 30_000, -4.0), Sample::value(T0 + 90_000, -2.0)];
    SeriesDescriptor::new("volume", samples)
        .with_axis(AxisSide::Right)
        .with_kind(SeriesKind::Cumulative)
}

fn assert_axis_invariant(stats: &AxisStats) {
    assert!(stats.min <= 0.0 && 0.0 <= stats.max, "{stats:?}");
    assert!(stats.min < stats.max, "{stats:?}");
}

#[test]
fn aligns_series_on_a_shared_timeline() {
    let series = vec![level_series(), volume_series()];
    let model = prepare_chart(&series, &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);

    // 6 samples + 4 crossings for the level series, one extra timestamp for volume
    assert_eq!(model.timeline.len(), 11);
    assert!(model.timeline.windows(2).all(|w| w[0] < w[1]));
    for s in &model.series {
        assert_eq!(s.values.len(), model.timeline.len());
        for seg in &s.segments {
            assert_eq!(seg.values.len(), model.timeline.len());
        }
    }
    assert!(!model.did_decimate);
    assert_eq!(model.display_resolution, Resolution::M15);

    let volume = model.series("volume").unwrap();
    assert_eq!(volume.values.iter().flatten().count(), 2);
    assert!(volume.threshold_values.is_empty());
}

#[test]
fn segments_alternate_and_meet_on_the_threshold() {
    let model = prepare_chart(&[level_series()], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    let level = &model.series[0];
    let classes: Vec<Classification> = level.segments.iter().map(|s| s.classification).collect();
    use Classification::{Above, Below};
    assert_eq!(classes, vec![Below, Above, Below, Above, Below]);

    for pair in level.segments.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert_eq!(a.end, b.start, "segments share the crossing point");
        assert_eq!(a.values[a.end], Some(10.0));
        assert_eq!(b.values[b.start], Some(10.0));
    }
    assert_eq!(level.segments[1].color.as_deref(), Some("#d62728"));
    assert_eq!(level.segments[0].color.as_deref(), Some("#2ca02c"));

    let first_crossing = model.timeline.iter().position(|&t| t == at(0.5)).unwrap();
    assert_eq!(level.values[first_crossing], Some(10.0));
    assert_eq!(level.threshold_values.len(), model.timeline.len());
}

#[test]
fn axis_stats_include_zero_and_thresholds() {
    let series = vec![level_series(), volume_series()];
    let model = prepare_chart(&series, &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    assert_eq!((model.left.min, model.left.max), (0.0, 20.0));
    assert_eq!((model.right.min, model.right.max), (-4.0, 0.0));
    assert_axis_invariant(model.axis(AxisSide::Left));
    assert_axis_invariant(model.axis(AxisSide::Right));

    let high = SeriesDescriptor::new("flat", vec![Sample::value(T0, 3.0)]).with_threshold(Threshold::Static(50.0));
    let model = prepare_chart(&[high], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    assert_eq!((model.left.min, model.left.max), (0.0, 50.0));
    assert_eq!((model.right.min, model.right.max), (-1.0, 1.0));
}

#[test]
fn degenerate_axis_is_widened() {
    let zero = SeriesDescriptor::new("zero", vec![Sample::value(T0, 0.0), Sample::value(T0 + MINUTE_MS, 0.0)]);
    let model = prepare_chart(&[zero], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    assert_eq!((model.left.min, model.left.max), (-1.0, 1.0));
    assert_axis_invariant(&model.left);
}

#[test]
fn gaps_break_lines_and_marks_follow_segments() {
    let mut samples: Vec<Sample> = (0..5).map(|i| Sample::value(T0 + i * MINUTE_MS, 1.0)).collect();
    samples.extend((20..23).map(|i| Sample::value(T0 + i * MINUTE_MS, 2.0)));
    let s = SeriesDescriptor::new("flow", samples).with_frequency("1 minute");
    let model = prepare_chart(&[s], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    let flow = &model.series[0];

    let gap_at = at(4.0 + 1.6);
    let gap_index = model.timeline.iter().position(|&t| (t - gap_at).abs() < 1e-3).expect("gap point on timeline");
    assert_eq!(flow.values[gap_index], None);
    assert_eq!(flow.segments.len(), 2);
    assert!(flow.segments.iter().all(|s| s.classification == Classification::Default));
    assert_eq!(flow.marks, vec![at(0.0), at(4.0), at(20.0), at(22.0)]);
}

#[test]
fn annotations_survive_decimation_and_are_reported() {
    let mut samples: Vec<Sample> =
        (0..5_000).map(|i| Sample::value(T0 + i * MINUTE_MS, (i as f64 * 0.01).sin())).collect();
    samples[1234] = samples[1234].clone().with_meta(SampleMeta::alert("withdrawal above permit"));
    let s = SeriesDescriptor::new("flow", samples).with_frequency("1 minute");
    let model = prepare_chart(&[s], &ViewParams::new(None, 300), &EngineOptions::default(), &Utc);

    assert!(model.did_decimate);
    assert!(model.series[0].did_decimate);
    assert!(model.timeline.len() <= 600);
    assert!(model.timeline.contains(&((T0 + 1234 * MINUTE_MS) as f64)));
    assert_eq!(model.markers.len(), 1);
    assert_eq!(model.markers[0].series_id, "flow");
    assert_eq!(model.markers[0].timestamp, T0 + 1234 * MINUTE_MS);
}

#[test]
fn markers_listed_per_series() {
    let model = prepare_chart(&[level_series()], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    assert_eq!(model.markers.len(), 1);
    assert_eq!(model.markers[0].value, Some(20.0));
    assert_eq!(model.markers[0].meta.comment.as_deref(), Some("pump restarted"));
}

#[test]
fn empty_input_yields_empty_model() {
    let model = prepare_chart(&[], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    assert!(model.timeline.is_empty());
    assert!(model.linear_timeline.is_empty());
    assert_axis_invariant(&model.left);
    assert_axis_invariant(&model.right);
}

#[test]
fn model_serializes_for_the_renderer() {
    let model = prepare_chart(&[level_series()], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    let json = serde_json::to_value(&model).unwrap();
    assert_eq!(json["displayResolution"], "15m");
    assert_eq!(json["series"][0]["segments"][1]["classification"], "above");
    assert_eq!(json["didDecimate"], false);
}

#[test]
fn bucketing_aggregates_to_the_display_resolution() {
    let samples: Vec<Sample> =
        (0..192).map(|i| Sample::value(T0 + i * 15 * MINUTE_MS, 10.0 + (i % 4) as f64)).collect();
    let s = SeriesDescriptor::new("flow", samples).with_frequency("15 minutes");
    let opts = EngineOptions { bucketing: true, ..EngineOptions::default() };
    let model = prepare_chart(&[s], &ViewParams::new(None, 100), &opts, &Utc);
    let flow = &model.series[0];

    assert_eq!(flow.resolution, model.display_resolution);
    assert!(flow.resolution > Resolution::M15);
    assert!(model.timeline.len() < 192);
    // regular buckets leave no gaps
    assert!(flow.values.iter().all(Option::is_some));
    assert!(flow.values.iter().flatten().all(|v| (10.0..=13.0).contains(v)));
}

fn minute_samples(values: &[f64]) -> Vec<Sample> {
    values.iter().enumerate().map(|(i, v)| Sample::value(T0 + i as i64 * MINUTE_MS, *v)).collect()
}

fn edge_values(model: &chart_engine::AlignedModel) -> Vec<(Classification, Vec<f64>)> {
    model.series[0]
        .segments
        .iter()
        .map(|s| (s.classification, s.values.iter().flatten().copied().collect()))
        .collect()
}

#[test]
fn descent_onto_the_threshold_keeps_each_side_colored() {
    let s = SeriesDescriptor::new("level", minute_samples(&[15.0, 10.0, 5.0])).with_threshold(Threshold::Static(10.0));
    let model = prepare_chart(&[s], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);

    use Classification::{Above, Below};
    assert_eq!(edge_values(&model), vec![(Above, vec![15.0, 10.0]), (Below, vec![10.0, 5.0])]);
}

#[test]
fn ascent_onto_the_threshold_keeps_each_side_colored() {
    let s = SeriesDescriptor::new("level", minute_samples(&[5.0, 10.0, 15.0])).with_threshold(Threshold::Static(10.0));
    let model = prepare_chart(&[s], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);

    use Classification::{Above, Below};
    assert_eq!(edge_values(&model), vec![(Below, vec![5.0, 10.0]), (Above, vec![10.0, 15.0])]);
    for (class, values) in edge_values(&model) {
        match class {
            Above => assert!(values.iter().all(|v| *v >= 10.0)),
            _ => assert!(values.iter().all(|v| *v <= 10.0)),
        }
    }
}

#[test]
fn raw_series_report_their_native_resolution() {
    let samples: Vec<Sample> = (0..960).map(|i| Sample::value(T0 + i * 15 * MINUTE_MS, 1.0)).collect();
    let s = SeriesDescriptor::new("flow", samples).with_frequency("15 minutes");
    let model = prepare_chart(&[s], &ViewParams::new(None, 800), &EngineOptions::default(), &Utc);
    let flow = &model.series[0];

    assert_eq!(model.display_resolution, Resolution::D1);
    assert_eq!(flow.resolution, Resolution::M15);
    assert_eq!(flow.label_format, Resolution::M15.label_format());
    assert!(!flow.did_decimate);
}
