//! Health check endpoint

use axum::{Json, extract::State};

use crate::dto::HealthResponse;
use crate::error::ApiResult;
use crate::state::AppState;

/// Reports "healthy" once a pooled connection answers a trivial query.
pub async fn health_check(State(state): State<AppState>) -> ApiResult<Json<HealthResponse>> {
    state
        .with_connection(|conn| {
            conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
            Ok(())
        })
        .await?;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: state.version.clone(),
    }))
}
