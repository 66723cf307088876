//! Reporting window resolution.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Requested range mode.
///
/// Unknown strings and non-string values resolve to `Week`, matching the
/// dashboard's default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RangeMode {
    #[default]
    Week,
    Month,
    Custom,
}

impl RangeMode {
    pub fn parse_lenient(input: &str) -> Self {
        match input.trim().to_ascii_lowercase().as_str() {
            "month" => RangeMode::Month,
            "custom" => RangeMode::Custom,
            _ => RangeMode::Week,
        }
    }
}

impl<'de> Deserialize<'de> for RangeMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value
            .as_str()
            .map(RangeMode::parse_lenient)
            .unwrap_or_default())
    }
}

/// Inclusive `[start, end]` instant pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReportingWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl ReportingWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Elapsed time of the window. Negative for inverted windows.
    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    /// `start <= t <= end`; the membership test for the current window.
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }

    /// `start <= t < end`; the membership test for the comparison window,
    /// so the shared boundary instant is counted only once.
    pub fn contains_half_open(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t < self.end
    }

    /// Window of identical duration ending exactly at `self.start`.
    pub fn preceding(&self) -> ReportingWindow {
        ReportingWindow {
            start: self.start - self.duration(),
            end: self.start,
        }
    }
}

/// Current window plus its comparison window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedWindows {
    pub current: ReportingWindow,
    pub previous: ReportingWindow,
}

/// Resolve the current and previous windows for a range selection.
///
/// `from`/`to` are only consulted in `Custom` mode; a missing bound falls back
/// to the 7-day default. Inverted custom ranges are passed through unchanged
/// and simply match nothing.
pub fn resolve_windows(
    mode: RangeMode,
    from: Option<DateTime<Utc>>,
    to: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> ResolvedWindows {
    let current = match mode {
        RangeMode::Week => ReportingWindow::new(now - Duration::days(7), now),
        RangeMode::Month => ReportingWindow::new(now - Duration::days(30), now),
        RangeMode::Custom => ReportingWindow::new(
            from.unwrap_or_else(|| now - Duration::days(7)),
            to.unwrap_or(now),
        ),
    };

    ResolvedWindows {
        current,
        previous: current.preceding(),
    }
}
