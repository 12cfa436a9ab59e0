use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;
use sqlx::PgPool;

use crate::config::Environment;
use crate::database::DatabaseManager;

#[derive(Clone)]
pub struct HealthState {
    pub environment: Environment,
    /// `None` when serving from memory.
    pub pool: Option<PgPool>,
    pub timeout: Duration,
}

/// GET /api/v1/healthcheck
pub async fn healthcheck(State(state): State<HealthState>) -> impl IntoResponse {
    let (status, code, database) = match &state.pool {
        None => ("available", StatusCode::OK, "in-memory".to_string()),
        Some(pool) => match DatabaseManager::health_check(pool, state.timeout).await {
            Ok(()) => ("available", StatusCode::OK, "ok".to_string()),
            Err(e) => {
                tracing::error!("Health check failed: {}", e);
                ("degraded", StatusCode::SERVICE_UNAVAILABLE, "unavailable".to_string())
            }
        },
    };

    (
        code,
        Json(json!({
            "status": status,
            "system_info": {
                "environment": state.environment.as_str(),
                "version": env!("CARGO_PKG_VERSION"),
                "database": database
            }
        })),
    )
}
