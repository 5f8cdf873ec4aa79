// Application state for HTTP handlers
use crate::application::dashboard_loader::{Clock, DashboardDataLoader, LoaderSettings};
use crate::application::recently_played_service::RecentlyPlayedService;
use crate::application::resource_locator::ResourceLocator;
use crate::application::snapshot_repository::SnapshotRepository;
use crate::domain::error::DashboardError;
use crate::domain::freshness::DEFAULT_STALE_THRESHOLD_HOURS;
use crate::infrastructure::config::AppConfig;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

pub struct DomainDashboard {
    pub title: String,
    pub loader: Arc<DashboardDataLoader>,
    pub recently_played: RecentlyPlayedService,
}

pub struct AppState {
    pub dashboards: BTreeMap<String, DomainDashboard>,
}

impl AppState {
    /// One loader per configured domain, all sharing the repository and clock
    pub fn from_config(
        config: &AppConfig,
        repository: Arc<dyn SnapshotRepository>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let dashboards = config
            .domains
            .iter()
            .map(|domain| {
                let locator = ResourceLocator::new(&config.store, &domain.name);
                let settings = LoaderSettings {
                    ranked_kinds: domain.ranked.iter().copied().filter(|k| k.is_ranked()).collect(),
                    fetch_timeout: Duration::from_secs(config.store.timeout_secs),
                    stale_threshold: chrono::Duration::try_hours(config.freshness.stale_after_hours)
                        .unwrap_or_else(|| chrono::Duration::hours(DEFAULT_STALE_THRESHOLD_HOURS)),
                };
                let loader = DashboardDataLoader::new(
                    repository.clone(),
                    locator.clone(),
                    clock.clone(),
                    settings,
                );

                let dashboard = DomainDashboard {
                    title: domain.title().to_string(),
                    loader: Arc::new(loader),
                    recently_played: RecentlyPlayedService::new(repository.clone(), locator),
                };
                (domain.name.clone(), dashboard)
            })
            .collect();

        Self { dashboards }
    }

    pub fn dashboard(&self, domain: &str) -> Result<&DomainDashboard, DashboardError> {
        self.dashboards
            .get(domain)
            .ok_or_else(|| DashboardError::UnknownDomain(domain.to_string()))
    }
}
