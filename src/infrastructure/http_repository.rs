// Object store repository implementation over plain HTTPS
use crate::application::snapshot_repository::{FetchError, SnapshotRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, header};
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct HttpSnapshotRepository {
    client: Client,
}

impl HttpSnapshotRepository {
    pub fn new(timeout_secs: u64) -> Result<Self, FetchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.min(5)))
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl SnapshotRepository for HttpSnapshotRepository {
    async fn fetch_document(&self, url: &str) -> Result<serde_json::Value, FetchError> {
        tracing::debug!("GET {}", url);

        let response = self
            .client
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Deserialize {
            url: url.to_string(),
            source,
        })
    }

    async fn last_modified(&self, url: &str) -> Result<Option<DateTime<Utc>>, FetchError> {
        tracing::debug!("HEAD {}", url);

        let response = self.client.head(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        Ok(response
            .headers()
            .get(header::LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_http_date))
    }
}

/// Parse an HTTP-date such as `Sat, 01 Jun 2024 12:00:00 GMT`.
fn parse_http_date(value: &str) -> Option<DateTime<Utc>> {
    match DateTime::parse_from_rfc2822(value) {
        Ok(ts) => Some(ts.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!("Ignoring unparseable Last-Modified {:?}: {}", value, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn repository() -> HttpSnapshotRepository {
        HttpSnapshotRepository::new(5).unwrap()
    }

    #[test]
    fn test_parse_http_date() {
        assert_eq!(
            parse_http_date("Sat, 01 Jun 2024 12:00:00 GMT"),
            Some(Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap())
        );
        assert_eq!(parse_http_date("yesterday"), None);
    }

    #[tokio::test]
    async fn test_fetch_document() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/spotify/live/30_day_tracks.json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .mount(&server)
            .await;

        let url = format!("{}/spotify/live/30_day_tracks.json", server.uri());
        let doc = repository().fetch_document(&url).await.unwrap();

        assert_eq!(doc, json!({"items": []}));
    }

    #[tokio::test]
    async fn test_fetch_document_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let url = format!("{}/spotify/archive/2019_01_tracks.json", server.uri());
        let err = repository().fetch_document(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedStatus { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_fetch_document_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&server)
            .await;

        let url = format!("{}/spotify/profile/profile.json", server.uri());
        let err = repository().fetch_document(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::Deserialize { .. }));
    }

    #[tokio::test]
    async fn test_last_modified_header() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .and(path("/spotify/profile/profile.json"))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("Last-Modified", "Sat, 01 Jun 2024 10:00:00 GMT"),
            )
            .mount(&server)
            .await;

        let url = format!("{}/spotify/profile/profile.json", server.uri());
        let ts = repository().last_modified(&url).await.unwrap();

        assert_eq!(ts, Some(Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()));
    }

    #[tokio::test]
    async fn test_last_modified_missing_header() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let url = format!("{}/spotify/live/30_day_artists.json", server.uri());
        assert_eq!(repository().last_modified(&url).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_last_modified_not_found() {
        let server = MockServer::start().await;
        Mock::given(method("HEAD"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let url = format!("{}/spotify/live/30_day_artists.json", server.uri());
        let err = repository().last_modified(&url).await.unwrap_err();

        assert!(matches!(err, FetchError::UnexpectedStatus { status: 404, .. }));
    }
}
