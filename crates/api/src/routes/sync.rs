//! Reference data sync endpoint handlers.
//!
//! Batches are processed per record: records failing validation are skipped
//! and counted, valid records are upserted by external id with last-write-wins
//! semantics. A database error aborts the request.

use axum::{extract::State, Json};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{
    SyncCategoriesRequest, SyncDepartmentsRequest, SyncProfilesRequest, SyncResponse,
};
use persistence::repositories::ReferenceDataRepository;

/// Bulk sync departments from the external system.
///
/// POST /api/v1/sync/departments
pub async fn sync_departments(
    State(state): State<AppState>,
    Json(request): Json<SyncDepartmentsRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    let repo = ReferenceDataRepository::new(state.pool.clone());
    let mut response = SyncResponse {
        success: true,
        created: 0,
        updated: 0,
        skipped: 0,
    };

    for record in &request.departments {
        if record.id.trim().is_empty() || record.name.trim().is_empty() {
            response.skipped += 1;
            continue;
        }
        if repo.upsert_department(record).await? {
            response.created += 1;
        } else {
            response.updated += 1;
        }
    }

    info!(
        created = response.created,
        updated = response.updated,
        skipped = response.skipped,
        "Departments synced"
    );

    Ok(Json(response))
}

/// Bulk sync categories from the external system.
///
/// POST /api/v1/sync/categories
pub async fn sync_categories(
    State(state): State<AppState>,
    Json(request): Json<SyncCategoriesRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    let repo = ReferenceDataRepository::new(state.pool.clone());
    let mut response = SyncResponse {
        success: true,
        created: 0,
        updated: 0,
        skipped: 0,
    };

    for record in &request.categories {
        if record.id.trim().is_empty() || record.name.trim().is_empty() {
            response.skipped += 1;
            continue;
        }
        if repo.upsert_category(record).await? {
            response.created += 1;
        } else {
            response.updated += 1;
        }
    }

    info!(
        created = response.created,
        updated = response.updated,
        skipped = response.skipped,
        "Categories synced"
    );

    Ok(Json(response))
}

/// Bulk sync user profiles from the external system.
///
/// POST /api/v1/sync/profiles
pub async fn sync_profiles(
    State(state): State<AppState>,
    Json(request): Json<SyncProfilesRequest>,
) -> Result<Json<SyncResponse>, ApiError> {
    let repo = ReferenceDataRepository::new(state.pool.clone());
    let mut response = SyncResponse {
        success: true,
        created: 0,
        updated: 0,
        skipped: 0,
    };

    for record in &request.profiles {
        if record.id.trim().is_empty() || record.full_name.trim().is_empty() {
            response.skipped += 1;
            continue;
        }
        if repo.upsert_profile(record).await? {
            response.created += 1;
        } else {
            response.updated += 1;
        }
    }

    info!(
        created = response.created,
        updated = response.updated,
        skipped = response.skipped,
        "Profiles synced"
    );

    Ok(Json(response))
}
