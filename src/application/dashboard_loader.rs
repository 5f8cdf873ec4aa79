// Dashboard loader - Resolves, fetches and publishes one dashboard per period
use crate::application::resource_locator::ResourceLocator;
use crate::application::snapshot_repository::{FetchError, SnapshotRepository};
use crate::domain::dashboard::DashboardViewModel;
use crate::domain::entity::{Profile, RankedEntity};
use crate::domain::error::DashboardError;
use crate::domain::freshness::{self, FreshnessState};
use crate::domain::period::{classify, Period, PeriodClass};
use crate::domain::resource::ResourceKind;
use crate::infrastructure::snapshot_documents::{decode_profile, decode_ranked};
use chrono::{DateTime, Utc};
use futures::future::join_all;
use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[derive(Debug, Clone)]
pub struct LoaderSettings {
    /// Ranked lists shown on this dashboard, in display order.
    pub ranked_kinds: Vec<ResourceKind>,
    pub fetch_timeout: Duration,
    pub stale_threshold: chrono::Duration,
}

/// Content of one fetch cycle after every slot settled.
struct ContentOutcome {
    profile: Option<Profile>,
    ranked_lists: BTreeMap<ResourceKind, Vec<RankedEntity>>,
    attempted: usize,
    failures: Vec<DashboardError>,
}

/// Owns the published view model of one dashboard domain.
///
/// Every `load` takes a new sequence number and only the latest issued number may
/// publish, so a slow request for an older period can never overwrite a newer one.
pub struct DashboardDataLoader {
    repository: Arc<dyn SnapshotRepository>,
    locator: ResourceLocator,
    clock: Arc<dyn Clock>,
    settings: LoaderSettings,
    sequence: AtomicU64,
    published: watch::Sender<Arc<DashboardViewModel>>,
}

impl DashboardDataLoader {
    pub fn new(
        repository: Arc<dyn SnapshotRepository>,
        locator: ResourceLocator,
        clock: Arc<dyn Clock>,
        settings: LoaderSettings,
    ) -> Self {
        let initial = DashboardViewModel::idle(Period::current(clock.now()));
        let (published, _) = watch::channel(Arc::new(initial));

        Self {
            repository,
            locator,
            clock,
            settings,
            sequence: AtomicU64::new(0),
            published,
        }
    }

    pub fn domain(&self) -> &str {
        self.locator.domain()
    }

    pub fn ranked_kinds(&self) -> &[ResourceKind] {
        &self.settings.ranked_kinds
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// The currently published snapshot
    pub fn current(&self) -> Arc<DashboardViewModel> {
        self.published.borrow().clone()
    }

    /// Receiver notified on every publication
    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardViewModel>> {
        self.published.subscribe()
    }

    /// Run one fetch cycle for `period` and publish its result.
    ///
    /// Returns `Superseded` when a newer `load` was issued before this one settled;
    /// its result is then dropped unpublished.
    pub async fn load(&self, period: Period) -> Result<Arc<DashboardViewModel>, DashboardError> {
        let class = classify(period, Period::current(self.clock.now()))?;
        let is_historical = class == PeriodClass::Past;

        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(seq, DashboardViewModel::loading(period, is_historical));

        tracing::debug!(
            "Loading {} for {} (seq {}, historical={})",
            self.domain(),
            period,
            seq,
            is_historical
        );

        let (content, freshness) =
            tokio::join!(self.fetch_content(class, period), self.probe_freshness());

        let view = if content.failures.len() == content.attempted {
            let reason = DashboardError::AllResourcesFailed {
                period: period.to_string(),
            };
            tracing::warn!("{} for {}: {}", self.domain(), period, reason);
            DashboardViewModel::failed(period, is_historical, reason.to_string())
        } else {
            DashboardViewModel::ready(
                period,
                is_historical,
                content.profile,
                content.ranked_lists,
                freshness,
            )
        };

        match self.publish(seq, view) {
            Some(view) => {
                tracing::info!(
                    "Published {} for {} ({}, {} slot(s) unavailable)",
                    self.domain(),
                    period,
                    view.loading_state().as_str(),
                    content.failures.len()
                );
                Ok(view)
            }
            None => {
                tracing::debug!("Dropping superseded result for {} (seq {})", period, seq);
                Err(DashboardError::Superseded {
                    period: period.to_string(),
                })
            }
        }
    }

    /// Replace the published snapshot if `seq` is still the latest request.
    fn publish(&self, seq: u64, view: DashboardViewModel) -> Option<Arc<DashboardViewModel>> {
        let view = Arc::new(view);
        let replaced = self.published.send_if_modified(|current| {
            if self.sequence.load(Ordering::SeqCst) != seq {
                return false;
            }
            *current = view.clone();
            true
        });
        replaced.then_some(view)
    }

    async fn fetch_content(&self, class: PeriodClass, period: Period) -> ContentOutcome {
        let kinds: Vec<ResourceKind> = std::iter::once(ResourceKind::Profile)
            .chain(self.settings.ranked_kinds.iter().copied())
            .collect();

        let fetches = kinds.iter().map(|&kind| {
            let url = self.locator.resolve(kind, class, period);
            async move {
                let result = self
                    .bounded(&url, self.repository.fetch_document(&url))
                    .await;
                (kind, result)
            }
        });

        let mut outcome = ContentOutcome {
            profile: None,
            ranked_lists: BTreeMap::new(),
            attempted: kinds.len(),
            failures: Vec::new(),
        };

        for (kind, result) in join_all(fetches).await {
            let decoded = result.map_err(|e| e.to_string()).and_then(|doc| {
                let slot = if kind == ResourceKind::Profile {
                    decode_profile(doc).map(Slot::Profile)
                } else {
                    decode_ranked(kind, doc).map(Slot::Ranked)
                };
                slot.map_err(|e| e.to_string())
            });

            match decoded {
                Ok(Slot::Profile(profile)) => outcome.profile = Some(profile),
                Ok(Slot::Ranked(entities)) => {
                    outcome.ranked_lists.insert(kind, entities);
                }
                Err(reason) => {
                    let err = DashboardError::ResourceUnavailable { kind, reason };
                    tracing::warn!("{}: {}", self.domain(), err);
                    outcome.failures.push(err);
                }
            }
        }

        outcome
    }

    /// Freshness always describes the live feed, also when an archive is displayed.
    async fn probe_freshness(&self) -> FreshnessState {
        let kinds = std::iter::once(ResourceKind::Profile)
            .chain(self.settings.ranked_kinds.iter().copied());

        let probes = kinds.map(|kind| {
            let url = self.locator.fixed_url(kind);
            async move {
                match self.bounded(&url, self.repository.last_modified(&url)).await {
                    Ok(ts) => ts,
                    Err(e) => {
                        let err = DashboardError::MetadataUnavailable {
                            kind,
                            reason: e.to_string(),
                        };
                        tracing::debug!("{}: {}", self.domain(), err);
                        None
                    }
                }
            }
        });

        let timestamps = join_all(probes).await;
        freshness::fold(timestamps, self.settings.stale_threshold, self.clock.now())
    }

    async fn bounded<T>(
        &self,
        url: &str,
        request: impl Future<Output = Result<T, FetchError>>,
    ) -> Result<T, FetchError> {
        match tokio::time::timeout(self.settings.fetch_timeout, request).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                secs: self.settings.fetch_timeout.as_secs(),
            }),
        }
    }
}

enum Slot {
    Profile(Profile),
    Ranked(Vec<RankedEntity>),
}
