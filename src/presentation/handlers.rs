// HTTP request handlers
use crate::domain::error::DashboardError;
use crate::domain::period::Period;
use crate::infrastructure::chunked_json::stream_from_watch;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::infrastructure::json_mapper::{
    dashboard_to_json, period_options_to_json, recent_play_to_json,
};
use crate::presentation::app_state::AppState;
use axum::{
    body::Body,
    extract::{Path, Query, State},
    http::{HeaderMap, Response, StatusCode},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Default, Deserialize)]
pub struct PeriodQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

#[derive(Debug, Serialize)]
struct ErrorPayload {
    error: String,
}

#[derive(Debug, Serialize)]
struct DomainPayload<'a> {
    name: &'a str,
    title: &'a str,
}

fn status_for(err: &DashboardError) -> StatusCode {
    match err {
        DashboardError::InvalidPeriod { .. } => StatusCode::BAD_REQUEST,
        DashboardError::UnknownDomain(_) => StatusCode::NOT_FOUND,
        DashboardError::Superseded { .. } => StatusCode::CONFLICT,
        DashboardError::ResourceUnavailable { .. }
        | DashboardError::MetadataUnavailable { .. }
        | DashboardError::AllResourcesFailed { .. } => StatusCode::BAD_GATEWAY,
    }
}

async fn respond<T: Serialize>(status: StatusCode, data: &T, compress: bool) -> Response<Body> {
    match json_response(status, data, compress).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    }
}

async fn error_response(err: DashboardError, compress: bool) -> Response<Body> {
    let status = status_for(&err);
    tracing::debug!("Responding {}: {}", status, err);
    respond(status, &ErrorPayload { error: err.to_string() }, compress).await
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// List configured dashboard domains
pub async fn list_domains(headers: HeaderMap, State(state): State<Arc<AppState>>) -> Response<Body> {
    let domains: Vec<DomainPayload> = state
        .dashboards
        .iter()
        .map(|(name, dashboard)| DomainPayload {
            name,
            title: &dashboard.title,
        })
        .collect();

    respond(StatusCode::OK, &domains, accepts_brotli(&headers)).await
}

/// Load a dashboard for the requested period (current month by default)
pub async fn get_dashboard(
    Path(domain): Path<String>,
    Query(query): Query<PeriodQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    let dashboard = match state.dashboard(&domain) {
        Ok(dashboard) => dashboard,
        Err(e) => return error_response(e, compress).await,
    };
    let loader = &dashboard.loader;

    let now = Period::current(loader.now());
    let requested = Period::new(
        query.year.unwrap_or(now.year()),
        query.month.unwrap_or(now.month()),
    );

    let result = match requested {
        Ok(period) => loader.load(period).await,
        Err(e) => Err(e),
    };

    match result {
        Ok(view) => {
            let payload = dashboard_to_json(&domain, &view, loader.ranked_kinds(), loader.now());
            respond(StatusCode::OK, &payload, compress).await
        }
        Err(e) => error_response(e, compress).await,
    }
}

/// The currently published view model without triggering a load
pub async fn current_dashboard(
    Path(domain): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    match state.dashboard(&domain) {
        Ok(dashboard) => {
            let loader = &dashboard.loader;
            let view = loader.current();
            let payload = dashboard_to_json(&domain, &view, loader.ranked_kinds(), loader.now());
            respond(StatusCode::OK, &payload, compress).await
        }
        Err(e) => error_response(e, compress).await,
    }
}

/// Stream every view model the loader publishes (progressive updates)
pub async fn watch_dashboard(
    Path(domain): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    let loader = match state.dashboard(&domain) {
        Ok(dashboard) => dashboard.loader.clone(),
        Err(e) => return error_response(e, compress).await,
    };

    let rx = loader.subscribe();
    stream_from_watch(rx, compress, move |view| {
        dashboard_to_json(&domain, &view, loader.ranked_kinds(), loader.now())
    })
    .into_response()
}

/// Periods a selector may offer for this dashboard
pub async fn list_periods(
    Path(domain): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    match state.dashboard(&domain) {
        Ok(dashboard) => {
            let now = Period::current(dashboard.loader.now());
            respond(StatusCode::OK, &period_options_to_json(now), compress).await
        }
        Err(e) => error_response(e, compress).await,
    }
}

/// Recently played feed; an unreachable feed yields 502
pub async fn recently_played(
    Path(domain): Path<String>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Response<Body> {
    let compress = accepts_brotli(&headers);

    let dashboard = match state.dashboard(&domain) {
        Ok(dashboard) => dashboard,
        Err(e) => return error_response(e, compress).await,
    };

    match dashboard.recently_played.recent().await {
        Ok(plays) => {
            let now = dashboard.loader.now();
            let payload: Vec<_> = plays
                .into_iter()
                .map(|play| recent_play_to_json(play, now))
                .collect();
            respond(StatusCode::OK, &payload, compress).await
        }
        Err(e) => {
            tracing::warn!("Error fetching recently played for {}: {}", domain, e);
            let payload = ErrorPayload {
                error: format!("Failed to load recently played tracks: {}", e),
            };
            respond(StatusCode::BAD_GATEWAY, &payload, compress).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_loader::tests::{
        june_13h, populated_repository, store, FixedClock,
    };
    use crate::domain::resource::ResourceKind;
    use crate::infrastructure::config::{AppConfig, DomainConfig, FreshnessSettings, ServerSettings};

    fn state() -> Arc<AppState> {
        let config = AppConfig {
            server: ServerSettings::default(),
            store: store(),
            freshness: FreshnessSettings::default(),
            domains: vec![
                DomainConfig {
                    name: "spotify".to_string(),
                    title: Some("Music".to_string()),
                    ranked: vec![ResourceKind::TopTracks, ResourceKind::TopArtists],
                },
                DomainConfig {
                    name: "fitness".to_string(),
                    title: None,
                    ranked: vec![],
                },
            ],
        };

        Arc::new(AppState::from_config(
            &config,
            Arc::new(populated_repository()),
            Arc::new(FixedClock(june_13h())),
        ))
    }

    async fn body_json(response: Response<Body>) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn query(year: Option<i32>, month: Option<u32>) -> Query<PeriodQuery> {
        Query(PeriodQuery { year, month })
    }

    #[tokio::test]
    async fn test_historical_dashboard() {
        let response = get_dashboard(
            Path("spotify".to_string()),
            query(Some(2024), Some(3)),
            HeaderMap::new(),
            State(state()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["isHistorical"], true);
        assert_eq!(json["loadingState"], "ready");
        assert_eq!(json["rankedLists"][0]["kind"], "top-tracks");
        assert_eq!(json["rankedLists"][0]["items"][0]["id"], "m1");
        assert_eq!(json["freshness"]["indicator"], "fresh");
    }

    #[tokio::test]
    async fn test_defaults_to_current_month() {
        let response = get_dashboard(
            Path("spotify".to_string()),
            query(None, None),
            HeaderMap::new(),
            State(state()),
        )
        .await;

        let json = body_json(response).await;
        assert_eq!(json["period"]["year"], 2024);
        assert_eq!(json["period"]["month"], 6);
        assert_eq!(json["isHistorical"], false);
    }

    #[tokio::test]
    async fn test_invalid_period_is_bad_request() {
        let state = state();
        for (year, month) in [(2024, 13), (2019, 5), (2024, 7)] {
            let response = get_dashboard(
                Path("spotify".to_string()),
                query(Some(year), Some(month)),
                HeaderMap::new(),
                State(state.clone()),
            )
            .await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}-{}", year, month);
        }
    }

    #[tokio::test]
    async fn test_unknown_domain_is_not_found() {
        let response = get_dashboard(
            Path("movies".to_string()),
            query(None, None),
            HeaderMap::new(),
            State(state()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_profile_only_domain_fails_without_documents() {
        let response = get_dashboard(
            Path("fitness".to_string()),
            query(None, None),
            HeaderMap::new(),
            State(state()),
        )
        .await;

        let json = body_json(response).await;
        assert_eq!(json["loadingState"], "failed");
        assert_eq!(json["rankedLists"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_current_dashboard_before_any_load_is_idle() {
        let response =
            current_dashboard(Path("spotify".to_string()), HeaderMap::new(), State(state())).await;

        let json = body_json(response).await;
        assert_eq!(json["loadingState"], "idle");
        assert_eq!(json["rankedLists"][1]["available"], false);
    }

    #[tokio::test]
    async fn test_list_periods() {
        let response =
            list_periods(Path("spotify".to_string()), HeaderMap::new(), State(state())).await;

        let json = body_json(response).await;
        assert_eq!(json["years"][0]["year"], 2024);
        assert_eq!(json["years"][0]["months"].as_array().unwrap().len(), 6);
        assert_eq!(json["years"].as_array().unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_recently_played_missing_feed_is_bad_gateway() {
        let response =
            recently_played(Path("spotify".to_string()), HeaderMap::new(), State(state())).await;

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_list_domains() {
        let response = list_domains(HeaderMap::new(), State(state())).await;

        let json = body_json(response).await;
        assert_eq!(json[0]["name"], "fitness");
        assert_eq!(json[0]["title"], "fitness");
        assert_eq!(json[1]["title"], "Music");
    }
}
