// File: crates/chart-engine/src/frequency.rs
// Summary: Frequency mini-language ("<integer> <unit>") parsing, formatting and approximate durations.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::resolution::{pick_resolution_by_ms, Resolution};

pub const SECOND_MS: i64 = 1_000;
pub const MINUTE_MS: i64 = 60 * SECOND_MS;
pub const HOUR_MS: i64 = 60 * MINUTE_MS;
pub const DAY_MS: i64 = 24 * HOUR_MS;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

impl FrequencyUnit {
    pub const ALL: [FrequencyUnit; 8] = [
        FrequencyUnit::Second,
        FrequencyUnit::Minute,
        FrequencyUnit::Hour,
        FrequencyUnit::Day,
        FrequencyUnit::Week,
        FrequencyUnit::Month,
        FrequencyUnit::Quarter,
        FrequencyUnit::Year,
    ];

    pub fn name(self) -> &'static str {
        match self {
            FrequencyUnit::Second => "second",
            FrequencyUnit::Minute => "minute",
            FrequencyUnit::Hour => "hour",
            FrequencyUnit::Day => "day",
            FrequencyUnit::Week => "week",
            FrequencyUnit::Month => "month",
            FrequencyUnit::Quarter => "quarter",
            FrequencyUnit::Year => "year",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|u| u.name() == name)
    }

    /// Approximate duration of one unit. Month, quarter and year are
    /// 30, 90 and 365 days; their true length depends on the date.
    pub const fn approx_ms(self) -> i64 {
        match self {
            FrequencyUnit::Second => SECOND_MS,
            FrequencyUnit::Minute => MINUTE_MS,
            FrequencyUnit::Hour => HOUR_MS,
            FrequencyUnit::Day => DAY_MS,
            FrequencyUnit::Week => 7 * DAY_MS,
            FrequencyUnit::Month => 30 * DAY_MS,
            FrequencyUnit::Quarter => 90 * DAY_MS,
            FrequencyUnit::Year => 365 * DAY_MS,
        }
    }

    pub const fn is_calendar_based(self) -> bool {
        matches!(self, FrequencyUnit::Month | FrequencyUnit::Quarter | FrequencyUnit::Year)
    }
}

/// A parsed sampling frequency such as `15 minutes` or `1 day`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Frequency {
    pub value: u32,
    pub unit: FrequencyUnit,
}

impl Frequency {
    pub const fn new(value: u32, unit: FrequencyUnit) -> Self {
        Self { value, unit }
    }

    pub fn to_approx_ms(&self) -> i64 {
        self.unit.approx_ms() * i64::from(self.value)
    }

    pub fn is_calendar_based(&self) -> bool {
        self.unit.is_calendar_based()
    }

    /// Closest ladder resolution that is not finer than this frequency.
    /// Second-based frequencies have no ladder counterpart.
    pub fn to_resolution(&self) -> Option<Resolution> {
        if self.unit == FrequencyUnit::Second {
            return None;
        }
        Some(pick_resolution_by_ms(self.to_approx_ms()))
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.value == 1 {
            write!(f, "{} {}", self.value, self.unit.name())
        } else {
            write!(f, "{} {}s", self.value, self.unit.name())
        }
    }
}

impl FromStr for Frequency {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_frequency(s).ok_or_else(|| EngineError::InvalidFrequency(s.to_string()))
    }
}

/// Parse `"<positive integer> <unit>[s]"`, case-insensitive.
/// Anything else yields `None`; callers treat that as "feature disabled".
pub fn parse_frequency(text: &str) -> Option<Frequency> {
    let mut parts = text.split_whitespace();
    let value = parts.next()?;
    let unit = parts.next()?;
    if parts.next().is_some() {
        return None;
    }
    if value.is_empty() || !value.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value: u32 = value.parse().ok()?;
    if value == 0 {
        return None;
    }
    let unit = unit.to_ascii_lowercase();
    let unit = FrequencyUnit::from_name(&unit)
        .or_else(|| unit.strip_suffix('s').and_then(FrequencyUnit::from_name))?;
    Some(Frequency { value, unit })
}

/// Approximate duration of a frequency string, `None` when it does not parse.
pub fn frequency_to_ms(text: &str) -> Option<i64> {
    parse_frequency(text).map(|f| f.to_approx_ms())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plural_and_mixed_case() {
        assert_eq!(parse_frequency("15 Minutes"), Some(Frequency::new(15, FrequencyUnit::Minute)));
        assert_eq!(parse_frequency("  1   DAY "), Some(Frequency::new(1, FrequencyUnit::Day)));
    }

    #[test]
    fn rejects_malformed() {
        for bad in ["", "day", "1", "0 day", "-1 day", "1.5 day", "1 fortnight", "1 day extra", "1 dayss"] {
            assert_eq!(parse_frequency(bad), None, "{bad:?}");
        }
    }
}
