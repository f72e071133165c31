use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::Serialize;
use tracing::error;

use crate::app::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) struct HealthReport {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    detail: Option<String>,
}

impl HealthReport {
    fn ready() -> Self {
        Self {
            status: "ready",
            detail: None,
        }
    }

    fn degraded(detail: impl Into<String>) -> Self {
        Self {
            status: "degraded",
            detail: Some(detail.into()),
        }
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct LiveReport {
    status: &'static str,
    timestamp: String,
}

/// 両方の依存サービスに到達できる場合のみ ready を返す。
pub(crate) async fn ready(
    State(state): State<AppState>,
) -> Result<Json<HealthReport>, (StatusCode, Json<HealthReport>)> {
    state.telemetry().record_ready_probe();

    if let Err(error) = state.feed_client().ping(state.config().channel()).await {
        error!(%error, "community feed readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport::degraded(format!("community_feed: {error:#}"))),
        ));
    }

    if let Err(error) = state.microblog_client().verify_credentials().await {
        error!(%error, "microblog readiness check failed");
        return Err((
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthReport::degraded(format!("microblog: {error:#}"))),
        ));
    }

    Ok(Json(HealthReport::ready()))
}

pub(crate) async fn live(State(state): State<AppState>) -> Json<LiveReport> {
    state.telemetry().record_live_probe();
    Json(LiveReport {
        status: "live",
        timestamp: Utc::now().to_rfc3339(),
    })
}
