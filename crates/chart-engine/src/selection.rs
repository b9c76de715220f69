// File: crates/chart-engine/src/selection.rs
// Summary: Day-resolution range slider over the union of sample dates, with calendar-click resolution.
// Notes:
// - Slider positions are day boundaries: position `i` sits before day `i`, so a
//   slider over `n` days has positions `0..=n` and `max_index() == n`.
// - Selections are half-open `[start, end)` over days.

use chrono::{DateTime, Datelike, Months, NaiveDate, TimeDelta, TimeZone};
use serde::Serialize;

use crate::resolution::local_to_millis;
use crate::series::{SeriesDescriptor, TimeRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct RangeSelection {
    pub start: usize,
    pub end: usize,
}

impl RangeSelection {
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DaySlider {
    days: Vec<NaiveDate>,
}

impl DaySlider {
    /// Every day from the earliest to the latest given date, gaps filled.
    pub fn from_dates(dates: impl IntoIterator<Item = NaiveDate>) -> Self {
        let mut bounds: Option<(NaiveDate, NaiveDate)> = None;
        for d in dates {
            bounds = Some(match bounds {
                Some((lo, hi)) => (lo.min(d), hi.max(d)),
                None => (d, d),
            });
        }
        let Some((first, last)) = bounds else { return Self::default() };
        let days = first.iter_days().take_while(|d| *d <= last).collect();
        Self { days }
    }

    /// Slider over the local calendar dates of every sample of every series.
    pub fn from_series<Tz: TimeZone>(series: &[SeriesDescriptor], tz: &Tz) -> Self {
        let dates = series
            .iter()
            .flat_map(|s| s.samples.iter())
            .filter_map(|sample| DateTime::from_timestamp_millis(sample.timestamp))
            .map(|utc| utc.with_timezone(tz).date_naive());
        Self::from_dates(dates)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn max_index(&self) -> usize {
        self.days.len()
    }

    pub fn days(&self) -> &[NaiveDate] {
        &self.days
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        self.days.get(index).copied()
    }

    pub fn clamp(&self, index: usize) -> usize {
        index.min(self.max_index())
    }

    /// Selection from raw slider positions, clamped and ordered.
    pub fn select(&self, start: usize, end: usize) -> RangeSelection {
        let (a, b) = (self.clamp(start), self.clamp(end));
        RangeSelection { start: a.min(b), end: a.max(b) }
    }

    /// The whole slider selected.
    pub fn full(&self) -> RangeSelection {
        RangeSelection { start: 0, end: self.max_index() }
    }

    /// Inclusive time range covered by a selection, from local midnight of its
    /// first day to the last millisecond of its last day.
    pub fn time_range<Tz: TimeZone>(&self, selection: RangeSelection, tz: &Tz) -> Option<TimeRange> {
        let selection = self.select(selection.start, selection.end);
        if selection.is_empty() {
            return None;
        }
        let first = *self.days.get(selection.start)?;
        let after_last = self.days.get(selection.end - 1)?.succ_opt()?;
        let start = day_start_millis(first, tz)?;
        let end = day_start_millis(after_last, tz)? - 1;
        Some(TimeRange { start, end })
    }

    /// Resolve a calendar click: `YYYY-MM-DD` (a day), `YYYY-MM` (a month) or
    /// `YYYY` (a year), told apart by length alone. Returns the clamped slice
    /// of the slider covered by that period, `None` when it does not parse or
    /// does not overlap the slider.
    pub fn resolve_click(&self, text: &str) -> Option<RangeSelection> {
        let (from, until) = calendar_span(text.trim())?;
        let start = self.days.partition_point(|d| *d < from);
        let end = self.days.partition_point(|d| *d < until);
        let selection = self.select(start, end);
        (!selection.is_empty()).then_some(selection)
    }
}

/// Half-open `[from, until)` date span named by a calendar click.
fn calendar_span(text: &str) -> Option<(NaiveDate, NaiveDate)> {
    match text.len() {
        10 => {
            let day = NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()?;
            Some((day, day.succ_opt()?))
        }
        7 => {
            let first = NaiveDate::parse_from_str(&format!("{text}-01"), "%Y-%m-%d").ok()?;
            Some((first, first.checked_add_months(Months::new(1))?))
        }
        4 => {
            if !text.bytes().all(|b| b.is_ascii_digit()) {
                return None;
            }
            let year: i32 = text.parse().ok()?;
            let first = NaiveDate::from_ymd_opt(year, 1, 1)?;
            Some((first, first.with_year(year + 1)?))
        }
        _ => None,
    }
}

fn day_start_millis<Tz: TimeZone>(day: NaiveDate, tz: &Tz) -> Option<i64> {
    let midnight = day.and_hms_opt(0, 0, 0)?;
    // offset of noon that day stands in when midnight does not exist locally
    let noon = tz.from_local_datetime(&(midnight + TimeDelta::hours(12))).earliest()?;
    Some(local_to_millis(midnight, tz, noon.offset()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn calendar_span_by_length() {
        let d = |y, m, day| NaiveDate::from_ymd_opt(y, m, day).unwrap();
        assert_eq!(calendar_span("2024-02-10"), Some((d(2024, 2, 10), d(2024, 2, 11))));
        assert_eq!(calendar_span("2024-12"), Some((d(2024, 12, 1), d(2025, 1, 1))));
        assert_eq!(calendar_span("2024"), Some((d(2024, 1, 1), d(2025, 1, 1))));
        assert_eq!(calendar_span("24-1-1"), None);
        assert_eq!(calendar_span("abcd"), None);
    }
}
