// File: crates/chart-engine/src/lib.rs
// Summary: Engine entry point; exports the resampling, decimation, threshold and alignment API.

pub mod error;
pub mod frequency;
pub mod resolution;
pub mod series;
pub mod bucket;
pub mod gaps;
pub mod downsample;
pub mod threshold;
pub mod segment;
pub mod axis;
pub mod align;
pub mod timeline;
pub mod selection;
pub mod options;
pub mod pipeline;

pub use error::EngineError;
pub use frequency::{parse_frequency, Frequency, FrequencyUnit};
pub use resolution::{
    choose_display_resolution, choose_series_bucket_resolution, floor_to_bucket, pick_resolution_by_ms, Resolution,
};
pub use series::{AxisSide, Sample, SampleMeta, SeriesDescriptor, SeriesKind, TimeRange, ViewParams};
pub use bucket::{aggregate_series_into_buckets, bucket_series_collection, Bucket, BucketOptions};
pub use gaps::{identify_segment_boundaries, insert_gap_points, process_time_series, PointKind, TimedPoint};
pub use downsample::{decimate_points, lttb, Decimation, DecimationPoint};
pub use threshold::{build_threshold_evaluator, classify_point, find_crossings, Classification, Threshold, ThresholdEvaluator};
pub use segment::{build_segments, Segment};
pub use axis::AxisStats;
pub use align::{AlignedModel, AlignedSeries, AnnotationMarker};
pub use timeline::{generate_linear_timeline, MAX_TIMELINE_POINTS};
pub use selection::{DaySlider, RangeSelection};
pub use options::{DecimationOptions, EngineOptions};
pub use pipeline::prepare_chart;
