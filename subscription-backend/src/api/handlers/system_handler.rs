use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::{Deserialize, Serialize};
use tracing::error;

use crate::{api::AppState, db, error::AppResult};

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// DB疎通確認（失敗時は503）
pub async fn db_health_handler(
    State(app_state): State<AppState>,
) -> AppResult<(StatusCode, Json<HealthResponse>)> {
    match db::ping(&app_state.db).await {
        Ok(()) => Ok((
            StatusCode::OK,
            Json(HealthResponse {
                status: "ok".to_string(),
            }),
        )),
        Err(e) => {
            error!(error = %e, "Database health check failed");
            Ok((
                StatusCode::SERVICE_UNAVAILABLE,
                Json(HealthResponse {
                    status: "unavailable".to_string(),
                }),
            ))
        }
    }
}

pub fn system_router(app_state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/health/db", get(db_health_handler))
        .with_state(app_state)
}
