// Reporting period domain model and the live/archive policy
use std::fmt;

use chrono::{DateTime, Datelike, Utc};

use super::error::DashboardError;

/// First year for which archived snapshots exist.
pub const EARLIEST_YEAR: i32 = 2020;

const MONTH_LABELS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// A calendar month. Field order gives the derived `Ord` its (year, month) ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Period {
    year: i32,
    month: u32,
}

/// Which data source a period is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodClass {
    /// The running month, served from the rolling live snapshots.
    Current,
    /// A finished month, served from the monthly archive.
    Past,
}

impl Period {
    pub fn new(year: i32, month: u32) -> Result<Self, DashboardError> {
        if !(1..=12).contains(&month) {
            return Err(DashboardError::InvalidPeriod {
                year,
                month,
                reason: "month must be between 1 and 12".to_string(),
            });
        }
        if year < EARLIEST_YEAR {
            return Err(DashboardError::InvalidPeriod {
                year,
                month,
                reason: format!("no data before {}", EARLIEST_YEAR),
            });
        }
        Ok(Self { year, month })
    }

    /// The calendar month containing `now`. Not range-checked: the clock is authoritative.
    pub fn current(now: DateTime<Utc>) -> Self {
        Self {
            year: now.year(),
            month: now.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    /// Four-digit year as used in archive identifiers.
    pub fn year_token(&self) -> String {
        format!("{:04}", self.year)
    }

    /// Zero-padded two-digit month as used in archive identifiers.
    pub fn month_token(&self) -> String {
        format!("{:02}", self.month)
    }

    pub fn month_label(&self) -> &'static str {
        month_label(self.month).unwrap_or("")
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{:02}", self.year, self.month)
    }
}

/// Decide whether `requested` is served live or from the archive.
///
/// Periods after `now` are rejected; selectors are expected to clamp to `[2020-01, now]`.
pub fn classify(requested: Period, now: Period) -> Result<PeriodClass, DashboardError> {
    if requested == now {
        Ok(PeriodClass::Current)
    } else if requested < now {
        Ok(PeriodClass::Past)
    } else {
        Err(DashboardError::InvalidPeriod {
            year: requested.year,
            month: requested.month,
            reason: format!("period is after the current month {}", now),
        })
    }
}

pub fn month_label(month: u32) -> Option<&'static str> {
    let idx = usize::try_from(month).ok()?.checked_sub(1)?;
    MONTH_LABELS.get(idx).copied()
}

/// Years a period selector may offer, most recent first.
pub fn selectable_years(now: Period) -> Vec<i32> {
    (EARLIEST_YEAR..=now.year.max(EARLIEST_YEAR)).rev().collect()
}

/// Months a period selector may offer for `year`, never past the current month.
pub fn selectable_months(year: i32, now: Period) -> Vec<(u32, &'static str)> {
    let last = if year == now.year {
        now.month
    } else if year < now.year && year >= EARLIEST_YEAR {
        12
    } else {
        0
    };

    MONTH_LABELS
        .iter()
        .enumerate()
        .map(|(idx, label)| (idx as u32 + 1, *label))
        .take_while(|(month, _)| *month <= last)
        .collect()
}
