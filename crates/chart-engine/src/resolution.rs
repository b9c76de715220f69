// File: crates/chart-engine/src/resolution.rs
// Summary: Resolution ladder, display/series resolution choice and calendar-aware bucket flooring.
// Notes:
// - Ladder comparisons use approximate durations (quarter = 90 d, semester = 182 d,
//   year = 365 d) while flooring uses real calendar arithmetic. The two are kept
//   apart on purpose: selection only needs an ordering, flooring needs exact edges.

use std::fmt;
use std::str::FromStr;

use chrono::{
    DateTime, Datelike, LocalResult, Months, NaiveDate, NaiveDateTime, Offset, TimeDelta, TimeZone,
    Timelike,
};
use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::frequency::{DAY_MS, HOUR_MS, MINUTE_MS};

/// Lower bound on the number of buckets a chart is asked to show.
pub const MIN_DISPLAY_POINTS: u32 = 50;
/// Horizontal pixels reserved per bucket.
pub const PX_PER_POINT: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Resolution {
    #[serde(rename = "15m")]
    M15,
    #[serde(rename = "1h")]
    H1,
    #[serde(rename = "1d")]
    D1,
    #[serde(rename = "1Q")]
    Q1,
    #[serde(rename = "6M")]
    M6,
    #[serde(rename = "1Y")]
    Y1,
}

impl Resolution {
    /// Ascending by duration.
    pub const LADDER: [Resolution; 6] = [
        Resolution::M15,
        Resolution::H1,
        Resolution::D1,
        Resolution::Q1,
        Resolution::M6,
        Resolution::Y1,
    ];

    pub const fn finest() -> Self { Resolution::M15 }
    pub const fn coarsest() -> Self { Resolution::Y1 }

    pub const fn id(self) -> &'static str {
        match self {
            Resolution::M15 => "15m",
            Resolution::H1 => "1h",
            Resolution::D1 => "1d",
            Resolution::Q1 => "1Q",
            Resolution::M6 => "6M",
            Resolution::Y1 => "1Y",
        }
    }

    pub const fn approx_ms(self) -> i64 {
        match self {
            Resolution::M15 => 15 * MINUTE_MS,
            Resolution::H1 => HOUR_MS,
            Resolution::D1 => DAY_MS,
            Resolution::Q1 => 90 * DAY_MS,
            Resolution::M6 => 182 * DAY_MS,
            Resolution::Y1 => 365 * DAY_MS,
        }
    }

    pub const fn is_calendar_based(self) -> bool {
        matches!(self, Resolution::Q1 | Resolution::M6 | Resolution::Y1)
    }

    /// strftime pattern suited to tick labels at this resolution.
    pub const fn label_format(self) -> &'static str {
        match self {
            Resolution::M15 | Resolution::H1 => "%d/%m %H:%M",
            Resolution::D1 => "%d/%m/%Y",
            Resolution::Q1 | Resolution::M6 => "%m/%Y",
            Resolution::Y1 => "%Y",
        }
    }

    /// Next bucket start after `local`, in local wall-clock time.
    pub(crate) fn step_local(self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        match self {
            Resolution::M15 => local.checked_add_signed(TimeDelta::minutes(15)),
            Resolution::H1 => local.checked_add_signed(TimeDelta::hours(1)),
            Resolution::D1 => local.checked_add_signed(TimeDelta::days(1)),
            Resolution::Q1 => local.checked_add_months(Months::new(3)),
            Resolution::M6 => local.checked_add_months(Months::new(6)),
            Resolution::Y1 => local.checked_add_months(Months::new(12)),
        }
    }

    /// Floor a local wall-clock time to this resolution's bucket start.
    pub(crate) fn floor_local(self, local: NaiveDateTime) -> Option<NaiveDateTime> {
        let date = local.date();
        match self {
            Resolution::M15 => date.and_hms_opt(local.hour(), local.minute() / 15 * 15, 0),
            Resolution::H1 => date.and_hms_opt(local.hour(), 0, 0),
            Resolution::D1 => date.and_hms_opt(0, 0, 0),
            Resolution::Q1 => month_start(date.year(), date.month0() / 3 * 3),
            Resolution::M6 => month_start(date.year(), if date.month0() < 6 { 0 } else { 6 }),
            Resolution::Y1 => month_start(date.year(), 0),
        }
    }
}

fn month_start(year: i32, month0: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month0 + 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Resolution {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::LADDER
            .into_iter()
            .find(|r| r.id() == s)
            .ok_or_else(|| EngineError::UnknownResolution(s.to_string()))
    }
}

/// Smallest ladder entry lasting at least `ms`, or the coarsest one.
pub fn pick_resolution_by_ms(ms: i64) -> Resolution {
    Resolution::LADDER
        .into_iter()
        .find(|r| r.approx_ms() >= ms)
        .unwrap_or(Resolution::coarsest())
}

/// Resolution for the visible range at the default density.
pub fn choose_display_resolution(start: Option<i64>, end: Option<i64>, width_px: u32) -> Resolution {
    choose_display_resolution_with(start, end, width_px, MIN_DISPLAY_POINTS, PX_PER_POINT)
}

pub fn choose_display_resolution_with(
    start: Option<i64>,
    end: Option<i64>,
    width_px: u32,
    min_points: u32,
    px_per_point: u32,
) -> Resolution {
    let (Some(start), Some(end)) = (start, end) else { return Resolution::finest() };
    if end <= start {
        return Resolution::finest();
    }
    let max_points = min_points.max(width_px / px_per_point.max(1)).max(1);
    let target_ms = end.saturating_sub(start) as f64 / f64::from(max_points);
    let floor_ms = Resolution::finest().approx_ms() as f64;
    let wanted = target_ms.max(floor_ms);
    Resolution::LADDER
        .into_iter()
        .find(|r| r.approx_ms() as f64 >= wanted)
        .unwrap_or(Resolution::coarsest())
}

/// A series is never bucketed finer than it was sampled.
pub fn choose_series_bucket_resolution(display: Resolution, native: Resolution) -> Resolution {
    pick_resolution_by_ms(display.approx_ms().max(native.approx_ms()))
}

/// Floor `timestamp` (epoch ms) to the start of its bucket in `tz`.
/// Out-of-range timestamps are returned unchanged.
pub fn floor_to_bucket<Tz: TimeZone>(timestamp: i64, resolution: Resolution, tz: &Tz) -> i64 {
    let Some(utc) = DateTime::from_timestamp_millis(timestamp) else { return timestamp };
    let local = utc.with_timezone(tz);
    let offset = local.offset().clone();
    match resolution.floor_local(local.naive_local()) {
        Some(floored) => local_to_millis(floored, tz, &offset),
        None => timestamp,
    }
}

/// Resolve a local wall-clock time to epoch ms. Ambiguous times take the
/// earliest instant; times skipped by a DST jump reuse `offset_hint`.
pub(crate) fn local_to_millis<Tz: TimeZone>(naive: NaiveDateTime, tz: &Tz, offset_hint: &Tz::Offset) -> i64 {
    match tz.from_local_datetime(&naive) {
        LocalResult::Single(dt) => dt.timestamp_millis(),
        LocalResult::Ambiguous(earliest, _) => earliest.timestamp_millis(),
        LocalResult::None => {
            let secs = i64::from(offset_hint.fix().local_minus_utc());
            (naive - TimeDelta::seconds(secs)).and_utc().timestamp_millis()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip() {
        for r in Resolution::LADDER {
            assert_eq!(r.id().parse::<Resolution>().unwrap(), r);
        }
        assert!("2h".parse::<Resolution>().is_err());
    }

    #[test]
    fn ladder_is_ordered_by_duration() {
        for pair in Resolution::LADDER.windows(2) {
            assert!(pair[0].approx_ms() < pair[1].approx_ms());
            assert!(pair[0] < pair[1]);
        }
    }
}
