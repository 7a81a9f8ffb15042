//! Audit log endpoint handlers (read-only).

use axum::{
    extract::{Path, Query, State},
    Json,
};

use crate::app::AppState;
use crate::error::ApiError;
use domain::models::{ListAuditLogsQuery, ListAuditLogsResponse, Pagination};
use persistence::repositories::audit_log::row_to_response;
use persistence::repositories::{AuditLogRepository, WarrantyRepository};

/// List audit entries across all warranties, optionally filtered.
///
/// GET /api/v1/audit-logs?warranty_id=&action=
pub async fn list_audit_logs(
    State(state): State<AppState>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<ListAuditLogsResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let repo = AuditLogRepository::new(state.pool.clone());
    let (rows, total) = repo.list(&query).await?;

    Ok(Json(ListAuditLogsResponse {
        data: rows.into_iter().map(row_to_response).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// List the audit trail of one warranty, newest first.
///
/// GET /api/v1/warranties/:warranty_id/audit-logs
pub async fn list_warranty_audit_logs(
    State(state): State<AppState>,
    Path(warranty_id): Path<i64>,
    Query(query): Query<ListAuditLogsQuery>,
) -> Result<Json<ListAuditLogsResponse>, ApiError> {
    let warranty_repo = WarrantyRepository::new(state.pool.clone());
    if warranty_repo.find_by_id(warranty_id).await?.is_none() {
        return Err(ApiError::NotFound(
            "Warranty registration not found".to_string(),
        ));
    }

    let scoped = ListAuditLogsQuery {
        warranty_id: Some(warranty_id),
        ..query
    };
    let page = scoped.page.unwrap_or(1).max(1);
    let per_page = scoped.per_page.unwrap_or(50).clamp(1, 100);

    let repo = AuditLogRepository::new(state.pool.clone());
    let (rows, total) = repo.list(&scoped).await?;

    Ok(Json(ListAuditLogsResponse {
        data: rows.into_iter().map(row_to_response).collect(),
        pagination: Pagination::new(page, per_page, total),
    }))
}
