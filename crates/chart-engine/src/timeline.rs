// File: crates/chart-engine/src/timeline.rs
// Summary: Bounded generation of a regular (linear) timeline at a ladder resolution.

use chrono::{DateTime, TimeZone};

use crate::resolution::{floor_to_bucket, local_to_millis, Resolution};
use crate::series::TimeRange;

/// Hard cap on generated timeline points.
pub const MAX_TIMELINE_POINTS: usize = 10_000;

/// Bucket starts from the bucket containing `range.start` through `range.end`.
///
/// Calendar resolutions step by real months. An empty result means either a
/// degenerate range or a timeline longer than [`MAX_TIMELINE_POINTS`]; callers
/// fall back to the non-linear (data-driven) timeline.
pub fn generate_linear_timeline<Tz: TimeZone>(range: TimeRange, resolution: Resolution, tz: &Tz) -> Vec<i64> {
    if range.end < range.start {
        return Vec::new();
    }
    // Cheap rejection before allocating anything.
    let estimate = range.end.saturating_sub(range.start) / resolution.approx_ms();
    if estimate > MAX_TIMELINE_POINTS as i64 * 2 {
        tracing::debug!(%resolution, estimate, "linear timeline over cap");
        return Vec::new();
    }

    let first = floor_to_bucket(range.start, resolution, tz);
    let Some(first_dt) = DateTime::from_timestamp_millis(first) else { return Vec::new() };
    let first_local = first_dt.with_timezone(tz);
    let offset = first_local.offset().clone();
    let mut local = first_local.naive_local();

    let mut out = Vec::new();
    let mut current = first;
    while current <= range.end {
        if out.len() == MAX_TIMELINE_POINTS {
            tracing::debug!(%resolution, "linear timeline over cap");
            return Vec::new();
        }
        if out.last().map_or(true, |&prev| current > prev) {
            out.push(current);
        }
        let Some(next) = resolution.step_local(local) else { break };
        local = next;
        current = local_to_millis(local, tz, &offset);
    }
    out
}
