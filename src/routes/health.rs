use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

const DB_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Serialize)]
struct WelcomeResponse {
    message: &'static str,
    status: &'static str,
    timestamp: String,
    endpoints: WelcomeEndpoints,
}

#[derive(Serialize)]
struct WelcomeEndpoints {
    health: &'static str,
    words: &'static str,
    search: &'static str,
    stats: &'static str,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime: u64,
    timestamp: String,
    database: &'static str,
}

pub async fn root() -> Response {
    Json(WelcomeResponse {
        message: "Welcome to Sanakota Backend API",
        status: "Server is running successfully",
        timestamp: now_iso(),
        endpoints: WelcomeEndpoints {
            health: "/health",
            words: "/api/words",
            search: "/api/words/search",
            stats: "/api/words/stats",
        },
    })
    .into_response()
}

pub async fn health(State(state): State<AppState>) -> Response {
    let connected = match state.database() {
        Some(db) => matches!(
            tokio::time::timeout(DB_CHECK_TIMEOUT, db.ping()).await,
            Ok(Ok(_))
        ),
        None => false,
    };

    let response = HealthResponse {
        status: if connected { "ok" } else { "degraded" },
        uptime: state.uptime_seconds(),
        timestamp: now_iso(),
        database: if connected { "connected" } else { "disconnected" },
    };

    let status_code = if connected {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status_code, Json(response)).into_response()
}

fn now_iso() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
