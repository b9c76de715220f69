// File: crates/chart-engine/src/series.rs
// Summary: Input model: raw samples, annotation metadata and series descriptors.
// Notes:
// - Timestamps are epoch milliseconds.
// - Non-finite values are treated as explicit absence everywhere; use
//   `Sample::finite_value` rather than reading `value` directly.

use serde::{Deserialize, Serialize};

use crate::frequency::parse_frequency;
use crate::resolution::Resolution;
use crate::threshold::Threshold;

/// Annotation attached to a sample by operators (comment) or alerting (alert).
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SampleMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alert: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
}

impl SampleMeta {
    pub fn comment(text: impl Into<String>) -> Self {
        Self { comment: Some(text.into()), ..Self::default() }
    }

    pub fn alert(text: impl Into<String>) -> Self {
        Self { alert: Some(text.into()), ..Self::default() }
    }

    /// True when the point carries something a user must be able to see.
    pub fn is_annotation(&self) -> bool {
        let set = |s: &Option<String>| s.as_deref().is_some_and(|s| !s.trim().is_empty());
        set(&self.comment) || set(&self.alert)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub timestamp: i64,
    #[serde(default)]
    pub value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<SampleMeta>,
}

impl Sample {
    /// Build a sample; NaN and infinities become `None`.
    pub fn new(timestamp: i64, value: Option<f64>) -> Self {
        Self { timestamp, value: value.filter(|v| v.is_finite()), meta: None }
    }

    pub fn value(timestamp: i64, value: f64) -> Self {
        Self::new(timestamp, Some(value))
    }

    pub fn missing(timestamp: i64) -> Self {
        Self::new(timestamp, None)
    }

    pub fn with_meta(mut self, meta: SampleMeta) -> Self {
        self.meta = Some(meta);
        self
    }

    pub fn finite_value(&self) -> Option<f64> {
        self.value.filter(|v| v.is_finite())
    }

    pub fn is_annotated(&self) -> bool {
        self.meta.as_ref().is_some_and(SampleMeta::is_annotation)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    /// Point-in-time readings; buckets take the mean.
    #[default]
    Instant,
    /// Volumes accumulated over the interval; buckets take the sum.
    Cumulative,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AxisSide {
    #[default]
    Left,
    Right,
}

/// Inclusive `[start, end]` range of epoch milliseconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: i64,
    pub end: i64,
}

impl TimeRange {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    #[inline]
    pub fn contains(&self, t: i64) -> bool {
        t >= self.start && t <= self.end
    }

    /// Smallest range covering every sample of every series.
    pub fn union_of(series: &[SeriesDescriptor]) -> Option<Self> {
        let mut bounds: Option<(i64, i64)> = None;
        for s in series {
            for sample in &s.samples {
                let t = sample.timestamp;
                bounds = Some(match bounds {
                    Some((lo, hi)) => (lo.min(t), hi.max(t)),
                    None => (t, t),
                });
            }
        }
        bounds.map(|(start, end)| Self { start, end })
    }
}

/// Visible window and viewport width of the target chart.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewParams {
    pub range: Option<TimeRange>,
    pub width_px: u32,
}

impl ViewParams {
    pub const fn new(range: Option<TimeRange>, width_px: u32) -> Self {
        Self { range, width_px }
    }
}

/// One logical measured quantity with its raw samples.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeriesDescriptor {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub axis: AxisSide,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub above_color: Option<String>,
    #[serde(default)]
    pub below_color: Option<String>,
    #[serde(default)]
    pub kind: SeriesKind,
    /// Sampling frequency in the `"<integer> <unit>"` grammar.
    #[serde(default)]
    pub frequency: Option<String>,
    #[serde(default)]
    pub native_resolution: Option<Resolution>,
    #[serde(default)]
    pub threshold: Threshold,
    #[serde(default)]
    pub samples: Vec<Sample>,
}

impl SeriesDescriptor {
    pub fn new(id: impl Into<String>, samples: Vec<Sample>) -> Self {
        let id = id.into();
        Self {
            label: id.clone(),
            id,
            axis: AxisSide::Left,
            color: None,
            above_color: None,
            below_color: None,
            kind: SeriesKind::Instant,
            frequency: None,
            native_resolution: None,
            threshold: Threshold::None,
            samples,
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_axis(mut self, axis: AxisSide) -> Self {
        self.axis = axis;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_threshold_colors(mut self, above: impl Into<String>, below: impl Into<String>) -> Self {
        self.above_color = Some(above.into());
        self.below_color = Some(below.into());
        self
    }

    pub fn with_kind(mut self, kind: SeriesKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_frequency(mut self, frequency: impl Into<String>) -> Self {
        self.frequency = Some(frequency.into());
        self
    }

    pub fn with_native_resolution(mut self, resolution: Resolution) -> Self {
        self.native_resolution = Some(resolution);
        self
    }

    pub fn with_threshold(mut self, threshold: Threshold) -> Self {
        self.threshold = threshold;
        self
    }

    /// Explicit native resolution, else derived from the frequency, else the finest.
    pub fn native_resolution(&self) -> Resolution {
        self.native_resolution
            .or_else(|| {
                self.frequency
                    .as_deref()
                    .and_then(parse_frequency)
                    .and_then(|f| f.to_resolution())
            })
            .unwrap_or(Resolution::finest())
    }

    /// Samples ordered by timestamp (stable for equal timestamps).
    pub fn sorted_samples(&self) -> Vec<Sample> {
        let mut samples = self.samples.clone();
        samples.sort_by_key(|s| s.timestamp);
        samples
    }
}
