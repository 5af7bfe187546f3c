//! Health, debug and fallback handlers.

use std::net::SocketAddr;

use axum::Json;
use axum::extract::{ConnectInfo, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use credgate_core::{PublicUser, StoreConfig};
use serde::Serialize;
use serde_json::json;
use tracing::{error, warn};

use crate::error::ApiError;
use crate::state::AppState;

pub(super) async fn health(State(state): State<AppState>) -> Response {
    let timestamp = Utc::now().to_rfc3339();

    match state.gateway.user_count().await {
        Ok(count) => Json(json!({
            "status": "healthy",
            "database": "connected",
            "users_count": count,
            "timestamp": timestamp,
        }))
        .into_response(),
        Err(err) if err.is_connection() => {
            warn!("Health check: store unreachable: {err}");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "status": "unhealthy",
                    "database": "disconnected",
                    "message": "Could not establish database connection",
                    "timestamp": timestamp,
                })),
            )
                .into_response()
        }
        Err(err) => {
            error!("Health check query failed: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "status": "unhealthy",
                    "database": "connected",
                    "message": "Database query failed",
                    "timestamp": timestamp,
                })),
            )
                .into_response()
        }
    }
}

/// A sample row with the password column masked.
#[derive(Serialize)]
struct RedactedUser<'a> {
    #[serde(flatten)]
    user: &'a PublicUser,
    password: &'static str,
}

/// Store settings safe to show: never the password.
#[derive(Serialize)]
struct StoreSummary<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'static str>,
    host: &'a str,
    port: u16,
    database: &'a str,
    user: &'a str,
    ssl_mode: &'static str,
}

impl<'a> From<&'a StoreConfig> for StoreSummary<'a> {
    fn from(config: &'a StoreConfig) -> Self {
        Self {
            url: config.url.as_ref().map(|_| "<set>"),
            host: &config.host,
            port: config.port,
            database: &config.database,
            user: &config.user,
            ssl_mode: config.tls.ssl_mode(),
        }
    }
}

pub(super) async fn debug(
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    State(state): State<AppState>,
) -> Response {
    // Only allow requests from loopback addresses.
    if !peer.ip().to_canonical().is_loopback() {
        warn!("Refused /debug request from {peer}");
        return (
            StatusCode::FORBIDDEN,
            Json(json!({
                "error": "debug endpoint is only accessible from localhost"
            })),
        )
            .into_response();
    }

    let db_config = StoreSummary::from(&state.config.store);

    match state.gateway.snapshot().await {
        Ok(snapshot) => {
            let sample_users: Vec<_> = snapshot
                .sample_users
                .iter()
                .map(|user| RedactedUser {
                    user,
                    password: "HIDDEN",
                })
                .collect();
            Json(json!({
                "database_connected": true,
                "backend": snapshot.backend,
                "tables": snapshot.tables,
                "user_info_columns": snapshot.user_info_columns,
                "sample_users": sample_users,
                "total_users": snapshot.total_users,
                "db_config": db_config,
            }))
            .into_response()
        }
        Err(err) => {
            let api = ApiError::from(err);
            (
                api.status,
                Json(json!({
                    "database_connected": false,
                    "error": api.message,
                    "db_config": db_config,
                })),
            )
                .into_response()
        }
    }
}

pub(super) async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Endpoint not found" })),
    )
}
