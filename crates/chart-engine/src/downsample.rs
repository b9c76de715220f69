// File: crates/chart-engine/src/downsample.rs
// Summary: Downsampling utilities (LTTB for XY; index-preserving decimation that keeps annotations and gaps).

use serde::Serialize;

use crate::gaps::{PointKind, TimedPoint};
use crate::series::{Sample, SampleMeta};

/// Largest-Triangle-Three-Buckets downsampling for XY series.
/// Returns up to `threshold` points preserving overall shape.
pub fn lttb(points: &[(f64, f64)], threshold: usize) -> Vec<(f64, f64)> {
    lttb_indices(points, threshold).into_iter().map(|i| points[i]).collect()
}

/// Same as [`lttb`] but returns the kept indices (ascending).
pub fn lttb_indices(points: &[(f64, f64)], threshold: usize) -> Vec<usize> {
    let n = points.len();
    if threshold == 0 || n == 0 { return Vec::new(); }
    if threshold >= n || n <= 2 { return (0..n).collect(); }
    if threshold == 1 { return vec![0]; }

    let candidates: Vec<usize> = (1..n - 1).collect();
    let mut kept = Vec::with_capacity(threshold);
    kept.push(0);
    kept.extend(select_by_triangles(&|i| points[i], &candidates, threshold - 2, points[0], points[n - 1]));
    kept.push(n - 1);
    kept
}

/// Split `candidates` into `buckets` contiguous groups and keep, per group, the
/// point forming the largest triangle with the previously kept point and the
/// centroid of the next group (`tail` stands in for the group after the last).
fn select_by_triangles(
    xy: &dyn Fn(usize) -> (f64, f64),
    candidates: &[usize],
    buckets: usize,
    anchor: (f64, f64),
    tail: (f64, f64),
) -> Vec<usize> {
    let m = candidates.len();
    if buckets == 0 { return Vec::new(); }
    if buckets >= m { return candidates.to_vec(); }

    let size = m as f64 / buckets as f64;
    let bounds = |b: usize| -> (usize, usize) {
        let start = (b as f64 * size).floor() as usize;
        let end = if b + 1 == buckets { m } else { ((b + 1) as f64 * size).floor() as usize };
        (start.min(m), end.min(m).max(start + 1))
    };

    let mut out = Vec::with_capacity(buckets);
    let (mut a_x, mut a_y) = anchor;
    for b in 0..buckets {
        let (start, end) = bounds(b);

        // Centroid of the next bucket
        let (avg_x, avg_y) = if b + 1 < buckets {
            let (ns, ne) = bounds(b + 1);
            let (mut sx, mut sy) = (0.0f64, 0.0f64);
            for &k in &candidates[ns..ne] {
                let (x, y) = xy(k);
                sx += x;
                sy += y;
            }
            let c = (ne - ns) as f64;
            (sx / c, sy / c)
        } else {
            tail
        };

        let mut max_area = -1.0f64;
        let mut max_idx = candidates[start];
        for &k in &candidates[start..end] {
            let (x, y) = xy(k);
            // Triangle area via cross product magnitude (factor 1/2 dropped)
            let area = ((a_x - x) * (avg_y - a_y) - (a_x - avg_x) * (y - a_y)).abs();
            if area > max_area {
                max_area = area;
                max_idx = k;
            }
        }
        out.push(max_idx);
        (a_x, a_y) = xy(max_idx);
    }
    out
}

/// A point decimation can work on.
pub trait DecimationPoint {
    /// Plot coordinates, `None` for explicit gaps.
    fn xy(&self) -> Option<(f64, f64)>;
    /// Points that must survive decimation whatever their shape contribution.
    fn must_keep(&self) -> bool;
}

impl DecimationPoint for Sample {
    fn xy(&self) -> Option<(f64, f64)> {
        self.finite_value().map(|v| (self.timestamp as f64, v))
    }

    fn must_keep(&self) -> bool {
        self.is_annotated() || self.finite_value().is_none()
    }
}

impl DecimationPoint for TimedPoint {
    fn xy(&self) -> Option<(f64, f64)> {
        match self.kind {
            PointKind::Real { value, .. } => Some((self.timestamp, value)),
            _ => None,
        }
    }

    /// Gaps, missing values, crossings and annotated points are kept.
    fn must_keep(&self) -> bool {
        match &self.kind {
            PointKind::Real { meta, .. } => meta.as_ref().is_some_and(SampleMeta::is_annotation),
            _ => true,
        }
    }
}

/// Kept point indices after decimation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Decimation {
    pub indices: Vec<usize>,
    pub did_decimate: bool,
}

/// Reduce `points` to about `threshold` points with LTTB.
///
/// First and last points, annotated points and explicit gaps are always kept;
/// LTTB fills the remaining slots from the other points. The result holds at
/// most `max(threshold, forced)` indices.
pub fn decimate_points<P: DecimationPoint>(points: &[P], threshold: usize) -> Decimation {
    let n = points.len();
    if n <= threshold {
        return Decimation { indices: (0..n).collect(), did_decimate: false };
    }

    let mut forced = vec![false; n];
    forced[0] = true;
    forced[n - 1] = true;
    for (i, p) in points.iter().enumerate() {
        if p.must_keep() || p.xy().is_none() {
            forced[i] = true;
        }
    }
    let forced_count = forced.iter().filter(|f| **f).count();

    let mut indices: Vec<usize> = (0..n).filter(|&i| forced[i]).collect();
    if forced_count < threshold {
        let candidates: Vec<usize> = (0..n).filter(|&i| !forced[i]).collect();
        let xy = |i: usize| -> (f64, f64) { points[i].xy().unwrap_or_default() };
        let first = candidates.first().copied().unwrap_or(0);
        let last = candidates.last().copied().unwrap_or(n - 1);
        let anchor = points[0].xy().unwrap_or_else(|| xy(first));
        let tail = points[n - 1].xy().unwrap_or_else(|| xy(last));
        indices.extend(select_by_triangles(&xy, &candidates, threshold - forced_count, anchor, tail));
        indices.sort_unstable();
    }
    tracing::trace!(from = n, to = indices.len(), forced = forced_count, "decimated");
    Decimation { indices, did_decimate: true }
}

/// Apply a decimation result to the points it was computed from.
pub fn take_indices<P: Clone>(points: &[P], decimation: &Decimation) -> Vec<P> {
    decimation.indices.iter().filter_map(|&i| points.get(i).cloned()).collect()
}
