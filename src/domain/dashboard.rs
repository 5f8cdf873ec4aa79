// Dashboard view model published to presentation
use std::collections::BTreeMap;

use super::entity::{Profile, RankedEntity};
use super::freshness::FreshnessState;
use super::period::Period;
use super::resource::ResourceKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadingState {
    Idle,
    Loading,
    Ready,
    Failed(String),
}

impl LoadingState {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoadingState::Idle => "idle",
            LoadingState::Loading => "loading",
            LoadingState::Ready => "ready",
            LoadingState::Failed(_) => "failed",
        }
    }
}

/// Immutable snapshot of one dashboard for one period.
///
/// Only the dashboard loader builds these; each fetch cycle replaces the whole value.
#[derive(Debug, Clone)]
pub struct DashboardViewModel {
    period: Period,
    is_historical: bool,
    profile: Option<Profile>,
    ranked_lists: BTreeMap<ResourceKind, Vec<RankedEntity>>,
    freshness: FreshnessState,
    loading_state: LoadingState,
}

impl DashboardViewModel {
    pub(crate) fn idle(period: Period) -> Self {
        Self::empty(period, false, LoadingState::Idle)
    }

    pub(crate) fn loading(period: Period, is_historical: bool) -> Self {
        Self::empty(period, is_historical, LoadingState::Loading)
    }

    pub(crate) fn failed(period: Period, is_historical: bool, reason: String) -> Self {
        Self::empty(period, is_historical, LoadingState::Failed(reason))
    }

    pub(crate) fn ready(
        period: Period,
        is_historical: bool,
        profile: Option<Profile>,
        ranked_lists: BTreeMap<ResourceKind, Vec<RankedEntity>>,
        freshness: FreshnessState,
    ) -> Self {
        Self {
            period,
            is_historical,
            profile,
            ranked_lists,
            freshness,
            loading_state: LoadingState::Ready,
        }
    }

    fn empty(period: Period, is_historical: bool, loading_state: LoadingState) -> Self {
        Self {
            period,
            is_historical,
            profile: None,
            ranked_lists: BTreeMap::new(),
            freshness: FreshnessState::unknown(),
            loading_state,
        }
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn is_historical(&self) -> bool {
        self.is_historical
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    /// Entries for `kind` in rank order; empty when the slot failed to load.
    pub fn ranked_list(&self, kind: ResourceKind) -> &[RankedEntity] {
        self.ranked_lists
            .get(&kind)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn ranked_lists(&self) -> &BTreeMap<ResourceKind, Vec<RankedEntity>> {
        &self.ranked_lists
    }

    pub fn freshness(&self) -> FreshnessState {
        self.freshness
    }

    pub fn loading_state(&self) -> &LoadingState {
        &self.loading_state
    }
}
