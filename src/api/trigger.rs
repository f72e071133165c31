use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use tracing::{error, info};

use crate::{
    app::AppState,
    pipeline::RunOutcome,
    scheduler::{RunError, Trigger},
};

#[derive(Debug, Serialize)]
struct TriggerResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    item_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    status_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

/// 手動トリガー。ランをこの場で実行し、結果をそのまま返す。
///
/// 実行中ランがある場合はキューに積まず 409 で拒否する。
pub(crate) async fn trigger(State(state): State<AppState>) -> impl IntoResponse {
    state.telemetry().record_manual_trigger_invocation();

    match state.scheduler().run_once(Trigger::Manual).await {
        Ok(RunOutcome::Published { item_id, status_id }) => {
            info!(item_id = %item_id, status_id = %status_id, "manual repost run published");
            (
                StatusCode::OK,
                Json(TriggerResponse {
                    status: "published",
                    item_id: Some(item_id),
                    status_id: Some(status_id),
                }),
            )
                .into_response()
        }
        Ok(RunOutcome::NoCandidate) => (
            StatusCode::OK,
            Json(TriggerResponse {
                status: "no_candidate",
                item_id: None,
                status_id: None,
            }),
        )
            .into_response(),
        Err(RunError::Busy) => (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: "a repost run is already in flight".into(),
            }),
        )
            .into_response(),
        Err(error) => {
            error!(error = %error, "manual repost run failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: error.to_string(),
                }),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::{body::Body, http::Request, http::StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use crate::{
        app::{ComponentRegistry, build_router},
        config::{Config, ENV_MUTEX},
    };

    #[tokio::test]
    async fn trigger_reports_no_candidate_for_empty_listing() {
        let feed = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v1/channels/BestofRedditorUpdates/hot"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"items": []})),
            )
            .mount(&feed)
            .await;

        let dir = TempDir::new().expect("tempdir");
        let config = {
            let _lock = ENV_MUTEX.lock().expect("env mutex");
            // SAFETY: test code adjusts deterministic environment state sequentially.
            unsafe {
                std::env::set_var("COMMUNITY_FEED_BASE_URL", feed.uri());
                std::env::set_var("MICROBLOG_BASE_URL", "http://127.0.0.1:59209/");
                std::env::set_var("MICROBLOG_ACCESS_TOKEN", "test-token");
                std::env::set_var("REPOST_PUBLISH_DELAY_SECS", "0");
                std::env::set_var("REPOST_LEDGER_PATH", dir.path().join("posted.json"));
                std::env::remove_var("REPOST_CHANNEL");
                std::env::remove_var("REPOST_FETCH_LIMIT");
                std::env::remove_var("REPOST_MESSAGE_LIMIT");
                std::env::remove_var("REPOST_LOW_SIGNAL_MARKERS");
                std::env::remove_var("COMMUNITY_FEED_SERVICE_TOKEN");
            }
            Config::from_env().expect("config loads")
        };

        let registry = ComponentRegistry::build(config).expect("registry builds");
        let app = build_router(registry);

        let request = Request::post("/v1/repost/trigger")
            .body(Body::empty())
            .expect("request builds");

        let response = app.oneshot(request).await.expect("request succeeds");

        assert_eq!(response.status(), StatusCode::OK);

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let payload: serde_json::Value = serde_json::from_slice(&body_bytes).expect("valid json");
        assert_eq!(payload["status"], "no_candidate");

        {
            let _lock = ENV_MUTEX.lock().expect("env mutex cleanup");
            // SAFETY: removes only the keys set above.
            unsafe {
                std::env::remove_var("COMMUNITY_FEED_BASE_URL");
                std::env::remove_var("MICROBLOG_BASE_URL");
                std::env::remove_var("MICROBLOG_ACCESS_TOKEN");
                std::env::remove_var("REPOST_PUBLISH_DELAY_SECS");
                std::env::remove_var("REPOST_LEDGER_PATH");
            }
        }
    }
}
