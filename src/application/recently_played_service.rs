// Recently played service - Use case for the recent plays feed
use crate::application::resource_locator::ResourceLocator;
use crate::application::snapshot_repository::{FetchError, SnapshotRepository};
use crate::domain::entity::RecentPlay;
use crate::domain::resource::ResourceKind;
use crate::infrastructure::snapshot_documents::decode_recent_plays;
use std::sync::Arc;

#[derive(Clone)]
pub struct RecentlyPlayedService {
    repository: Arc<dyn SnapshotRepository>,
    locator: ResourceLocator,
}

impl RecentlyPlayedService {
    pub fn new(repository: Arc<dyn SnapshotRepository>, locator: ResourceLocator) -> Self {
        Self {
            repository,
            locator,
        }
    }

    /// Latest plays in feed order; incomplete entries are skipped.
    pub async fn recent(&self) -> Result<Vec<RecentPlay>, FetchError> {
        let url = self.locator.fixed_url(ResourceKind::RecentlyPlayed);
        let doc = self.repository.fetch_document(&url).await?;
        let plays = decode_recent_plays(doc);

        tracing::debug!("{} recent plays for {}", plays.len(), self.locator.domain());
        Ok(plays)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_loader::tests::{store, url, FakeRepository};
    use serde_json::json;

    #[tokio::test]
    async fn test_recent_reads_profile_scoped_feed() {
        let mut repo = FakeRepository::default();
        repo.documents.insert(
            url("profile/recently_played.json"),
            json!({"items": [{
                "track": {
                    "id": "t1",
                    "name": "Song",
                    "artists": [{"id": "a", "name": "Singer"}],
                    "album": {"name": "Record", "images": [{"url": "https://img/r"}]},
                    "external_urls": {"spotify": "https://open.spotify.com/track/t1"}
                },
                "played_at": "2024-06-01T12:30:00.000Z"
            }]}),
        );

        let service =
            RecentlyPlayedService::new(Arc::new(repo), ResourceLocator::new(&store(), "spotify"));
        let plays = service.recent().await.unwrap();

        assert_eq!(plays.len(), 1);
        assert_eq!(plays[0].artists, vec!["Singer".to_string()]);
        assert_eq!(plays[0].image_url.as_deref(), Some("https://img/r"));
    }

    #[tokio::test]
    async fn test_recent_propagates_missing_feed() {
        let service = RecentlyPlayedService::new(
            Arc::new(FakeRepository::default()),
            ResourceLocator::new(&store(), "spotify"),
        );

        let err = service.recent().await.unwrap_err();
        assert!(matches!(err, FetchError::UnexpectedStatus { status: 404, .. }));
    }
}
