// Data freshness derived from source last-modified timestamps
use chrono::{DateTime, Duration, Utc};

pub const DEFAULT_STALE_THRESHOLD_HOURS: i64 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FreshnessState {
    pub most_recent: Option<DateTime<Utc>>,
    pub is_fresh: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessIndicator {
    Fresh,
    Stale,
    Unknown,
}

impl FreshnessState {
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn indicator(&self) -> FreshnessIndicator {
        match (self.most_recent, self.is_fresh) {
            (None, _) => FreshnessIndicator::Unknown,
            (Some(_), true) => FreshnessIndicator::Fresh,
            (Some(_), false) => FreshnessIndicator::Stale,
        }
    }
}

impl FreshnessIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            FreshnessIndicator::Fresh => "fresh",
            FreshnessIndicator::Stale => "stale",
            FreshnessIndicator::Unknown => "unknown",
        }
    }
}

/// Fold per-resource timestamps into one freshness signal.
///
/// Absent entries mean the metadata could not be read and are skipped.
/// With nothing left the state is unknown and never fresh.
pub fn fold<I>(timestamps: I, stale_threshold: Duration, now: DateTime<Utc>) -> FreshnessState
where
    I: IntoIterator<Item = Option<DateTime<Utc>>>,
{
    let most_recent = timestamps.into_iter().flatten().max();

    FreshnessState {
        most_recent,
        is_fresh: most_recent.is_some_and(|ts| now - ts < stale_threshold),
    }
}

/// Coarse relative label such as "5m ago".
pub fn time_ago(instant: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let secs = (now - instant).num_seconds();

    if secs < 60 {
        "Just now".to_string()
    } else if secs < 3_600 {
        format!("{}m ago", secs / 60)
    } else if secs < 86_400 {
        format!("{}h ago", secs / 3_600)
    } else {
        format!("{}d ago", secs / 86_400)
    }
}
