// File: crates/chart-engine/tests/timeline.rs
// Purpose: Linear timeline generation and the point cap.

use chart_engine::frequency::{DAY_MS, HOUR_MS, MINUTE_MS};
use chart_engine::{generate_linear_timeline, Resolution, TimeRange, MAX_TIMELINE_POINTS};
use chrono::{TimeZone, Utc};

fn utc(y: i32, mo: u32, d: u32) -> i64 {
    Utc.with_ymd_and_hms(y, mo, d, 0, 0, 0).unwrap().timestamp_millis()
}

#[test]
fn hourly_day_includes_both_ends() {
    let start = utc(2024, 3, 1);
    let range = TimeRange { start, end: start + DAY_MS };
    let ts = generate_linear_timeline(range, Resolution::H1, &Utc);
    assert_eq!(ts.len(), 25);
    assert_eq!(ts[0], start);
    assert!(ts.windows(2).all(|w| w[1] - w[0] == HOUR_MS));
}

#[test]
fn start_is_floored_to_its_bucket() {
    let start = utc(2024, 3, 1) + 7 * MINUTE_MS;
    let range = TimeRange { start, end: start + HOUR_MS };
    let ts = generate_linear_timeline(range, Resolution::M15, &Utc);
    assert_eq!(ts[0], utc(2024, 3, 1));
    assert_eq!(ts.len(), 5);
}

#[test]
fn quarters_step_by_calendar_months() {
    let range = TimeRange { start: utc(2024, 2, 15), end: utc(2025, 1, 10) };
    let ts = generate_linear_timeline(range, Resolution::Q1, &Utc);
    let expected = vec![utc(2024, 1, 1), utc(2024, 4, 1), utc(2024, 7, 1), utc(2024, 10, 1), utc(2025, 1, 1)];
    assert_eq!(ts, expected);
}

#[test]
fn capped_timelines_come_back_empty() {
    let start = utc(2024, 1, 1);
    // rejected on the estimate alone
    let year = TimeRange { start, end: start + 365 * DAY_MS };
    assert!(generate_linear_timeline(year, Resolution::M15, &Utc).is_empty());
    // estimate passes, the walk hits the cap
    let long = TimeRange { start, end: start + 150 * DAY_MS };
    assert!(generate_linear_timeline(long, Resolution::M15, &Utc).is_empty());
}

#[test]
fn just_under_the_cap_is_generated() {
    let start = utc(2024, 1, 1);
    let range = TimeRange { start, end: start + 100 * DAY_MS };
    let ts = generate_linear_timeline(range, Resolution::M15, &Utc);
    assert_eq!(ts.len(), 9_601);
    assert!(ts.len() <= MAX_TIMELINE_POINTS);
}

#[test]
fn reversed_range_is_empty() {
    let start = utc(2024, 1, 1);
    let range = TimeRange { start, end: start - 1 };
    assert!(generate_linear_timeline(range, Resolution::D1, &Utc).is_empty());
}

#[test]
fn extreme_ranges_do_not_overflow() {
    let range = TimeRange { start: i64::MIN, end: i64::MAX };
    assert!(generate_linear_timeline(range, Resolution::D1, &Utc).is_empty());
    assert!(generate_linear_timeline(range, Resolution::Y1, &Utc).is_empty());
}
