// Mapper to convert domain models to JSON payloads
use crate::domain::dashboard::{DashboardViewModel, LoadingState};
use crate::domain::entity::{EntityDetail, Profile, RankedEntity, RecentPlay};
use crate::domain::freshness::{time_ago, FreshnessState};
use crate::domain::period::{selectable_months, selectable_years, Period};
use crate::domain::resource::ResourceKind;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub domain: String,
    pub period: PeriodPayload,
    pub is_historical: bool,
    pub loading_state: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub profile: Option<ProfilePayload>,
    pub ranked_lists: Vec<RankedListPayload>,
    pub freshness: FreshnessPayload,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPayload {
    pub year: i32,
    pub month: u32,
    pub label: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePayload {
    pub id: String,
    pub display_name: String,
    pub image_url: Option<String>,
    pub follower_count: u64,
    pub country: Option<String>,
    pub external_link: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedListPayload {
    pub kind: &'static str,
    /// False when the slot failed to load and needs a placeholder.
    pub available: bool,
    pub items: Vec<RankedEntityPayload>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedEntityPayload {
    pub id: String,
    pub display_name: String,
    pub rank: u32,
    pub popularity: u8,
    pub image_url: Option<String>,
    pub external_link: String,
    pub subtitle: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub follower_count: Option<u64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FreshnessPayload {
    pub most_recent: Option<String>,
    pub is_fresh: bool,
    pub indicator: &'static str,
    pub age: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentPlayPayload {
    pub track_id: String,
    pub track_name: String,
    pub artists: String,
    pub album: String,
    pub image_url: Option<String>,
    pub external_link: Option<String>,
    pub played_at: Option<String>,
    pub played_ago: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodOptionsPayload {
    pub current: PeriodPayload,
    pub years: Vec<YearOptionPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct YearOptionPayload {
    pub year: i32,
    pub months: Vec<MonthOptionPayload>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthOptionPayload {
    pub value: u32,
    pub label: &'static str,
}

/// Every kind in `ranked_kinds` gets an entry, empty ones included.
pub fn dashboard_to_json(
    domain: &str,
    view: &DashboardViewModel,
    ranked_kinds: &[ResourceKind],
    now: DateTime<Utc>,
) -> DashboardPayload {
    let error = match view.loading_state() {
        LoadingState::Failed(reason) => Some(reason.clone()),
        _ => None,
    };

    let ranked_lists = ranked_kinds
        .iter()
        .map(|&kind| RankedListPayload {
            kind: kind.as_str(),
            available: view.ranked_lists().contains_key(&kind),
            items: view.ranked_list(kind).iter().map(entity_to_json).collect(),
        })
        .collect();

    DashboardPayload {
        domain: domain.to_string(),
        period: period_to_json(view.period()),
        is_historical: view.is_historical(),
        loading_state: view.loading_state().as_str(),
        error,
        profile: view.profile().map(profile_to_json),
        ranked_lists,
        freshness: freshness_to_json(view.freshness(), now),
    }
}

pub fn period_to_json(period: Period) -> PeriodPayload {
    PeriodPayload {
        year: period.year(),
        month: period.month(),
        label: format!("{} {}", period.month_label(), period.year()),
    }
}

pub fn period_options_to_json(now: Period) -> PeriodOptionsPayload {
    let years = selectable_years(now)
        .into_iter()
        .map(|year| YearOptionPayload {
            year,
            months: selectable_months(year, now)
                .into_iter()
                .map(|(value, label)| MonthOptionPayload { value, label })
                .collect(),
        })
        .collect();

    PeriodOptionsPayload {
        current: period_to_json(now),
        years,
    }
}

pub fn recent_play_to_json(play: RecentPlay, now: DateTime<Utc>) -> RecentPlayPayload {
    RecentPlayPayload {
        artists: play.artists.join(", "),
        played_at: play.played_at.map(|ts| ts.to_rfc3339()),
        played_ago: play.played_at.map(|ts| time_ago(ts, now)),
        track_id: play.track_id,
        track_name: play.track_name,
        album: play.album,
        image_url: play.image_url,
        external_link: play.external_link,
    }
}

fn profile_to_json(profile: &Profile) -> ProfilePayload {
    ProfilePayload {
        id: profile.id.clone(),
        display_name: profile.display_name.clone(),
        image_url: profile.image_url.clone(),
        follower_count: profile.follower_count,
        country: profile.country.clone(),
        external_link: profile.external_link.clone(),
    }
}

fn entity_to_json(entity: &RankedEntity) -> RankedEntityPayload {
    let (album, follower_count) = match &entity.detail {
        EntityDetail::Track { album, .. } => (Some(album.clone()), None),
        EntityDetail::Artist { follower_count, .. } => (None, Some(*follower_count)),
    };

    RankedEntityPayload {
        id: entity.id.clone(),
        display_name: entity.display_name.clone(),
        rank: entity.rank,
        popularity: entity.popularity,
        image_url: entity.image_url.clone(),
        external_link: entity.external_link.clone(),
        subtitle: entity.subtitle(),
        album,
        follower_count,
    }
}

fn freshness_to_json(freshness: FreshnessState, now: DateTime<Utc>) -> FreshnessPayload {
    FreshnessPayload {
        most_recent: freshness.most_recent.map(|ts| ts.to_rfc3339()),
        is_fresh: freshness.is_fresh,
        indicator: freshness.indicator().as_str(),
        age: freshness.most_recent.map(|ts| time_ago(ts, now)),
    }
}
