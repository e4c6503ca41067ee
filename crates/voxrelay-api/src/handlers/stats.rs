use crate::error::HttpAppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use voxrelay_services::ResourceStats;

#[utoipa::path(
    get,
    path = "/api/v0/stats",
    tag = "system",
    responses(
        (status = 200, description = "Current resource usage", body = ResourceStats),
        (status = 500, description = "Internal server error", body = crate::error::ErrorResponse)
    )
)]
pub async fn get_stats(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpAppError> {
    let stats = state
        .monitor
        .snapshot_async()
        .await
        .map_err(HttpAppError::from)?;
    Ok(Json(stats))
}
