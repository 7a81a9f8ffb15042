//! Statistics endpoint handler.

use axum::{extract::State, Json};

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::WarrantyStatistics;
use persistence::repositories::StatisticsRepository;

/// Get aggregate warranty statistics.
///
/// GET /api/v1/warranties/statistics
///
/// Served through the fixed-TTL cache; `cache_expires_at` in the response
/// tells callers how stale the numbers may be.
pub async fn get_statistics(
    State(state): State<AppState>,
) -> Result<Json<WarrantyStatistics>, ApiError> {
    let repo = StatisticsRepository::new(state.pool.clone());
    let stats = state.stats_cache.get_or_compute(&repo).await?;

    Ok(Json(stats))
}
