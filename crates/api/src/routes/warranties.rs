//! Warranty endpoint handlers.

use axum::{
    extract::{Extension, Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{audit_context, ApiKeyAuth, OptionalApiKeyAuth, RequestMeta};
use crate::middleware::metrics::{record_status_change, record_warranty_registered};
use domain::models::{
    ExpiringQuery, ExpiringWarrantiesResponse, ListWarrantiesQuery, ListWarrantiesResponse,
    NewWarrantyRegistration, Pagination, RegisterWarrantyRequest, RegisterWarrantyResponse,
    UpdateWarrantyStatusRequest, UpdateWarrantyStatusResponse, WarrantyCheckResponse,
    WarrantyResponse, WarrantyStatus,
};
use persistence::repositories::warranty::{entity_to_domain, is_unique_violation};
use persistence::repositories::WarrantyRepository;

/// Register an asset for warranty.
///
/// POST /api/v1/warranty/register
///
/// This is the endpoint the external application calls when a user clicks
/// "Register Warranty" on an asset. Duplicate submissions are rejected by the
/// unique constraint on the asset id, surfaced as a validation error.
pub async fn register_warranty(
    State(state): State<AppState>,
    meta: RequestMeta,
    OptionalApiKeyAuth(auth): OptionalApiKeyAuth,
    Json(request): Json<RegisterWarrantyRequest>,
) -> Result<(StatusCode, Json<RegisterWarrantyResponse>), ApiError> {
    request.validate()?;

    let today = Utc::now().date_naive();
    let input =
        NewWarrantyRegistration::from_request(request, auth.as_ref().map(|a| a.api_key_id), today);
    let context = audit_context(auth.as_ref(), meta);

    let repo = WarrantyRepository::new(state.pool.clone());
    let entity = repo.create(&input, context).await.map_err(|e| {
        if is_unique_violation(&e) {
            ApiError::duplicate_registration()
        } else {
            ApiError::Internal(format!("Failed to register warranty: {}", e))
        }
    })?;

    let warranty = entity_to_domain(entity);
    record_warranty_registered();

    info!(
        warranty_id = warranty.id,
        asset_external_id = %warranty.asset_external_id,
        "Warranty registered"
    );

    let response = RegisterWarrantyResponse {
        success: true,
        message: "Warranty registered successfully".to_string(),
        status: warranty.status.as_str().to_string(),
        status_label: warranty.status.label().to_string(),
        warranty_id: warranty.id,
        asset_id: warranty.asset_external_id,
        registered_at: warranty.registered_at,
        warranty_start_date: warranty.warranty_start_date,
        warranty_end_date: warranty.warranty_end_date,
    };

    Ok((StatusCode::CREATED, Json(response)))
}

/// Check whether an asset is registered for warranty.
///
/// GET /api/v1/warranty/check/:asset_id
///
/// An unregistered asset is a normal outcome, not an error: the response
/// carries `is_registered: false` with all detail fields null.
pub async fn check_warranty(
    State(state): State<AppState>,
    Path(asset_id): Path<String>,
) -> Result<Json<WarrantyCheckResponse>, ApiError> {
    let repo = WarrantyRepository::new(state.pool.clone());

    let response = match repo.find_by_asset_external_id(&asset_id).await? {
        Some(entity) => {
            let warranty = entity_to_domain(entity);
            WarrantyCheckResponse::registered(&warranty, Utc::now().date_naive())
        }
        None => WarrantyCheckResponse::not_registered(),
    };

    Ok(Json(response))
}

/// List warranty registrations with filters and pagination.
///
/// GET /api/v1/warranties
pub async fn list_warranties(
    State(state): State<AppState>,
    Query(query): Query<ListWarrantiesQuery>,
) -> Result<Json<ListWarrantiesResponse>, ApiError> {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(50).clamp(1, 100);

    let repo = WarrantyRepository::new(state.pool.clone());
    let (entities, total) = repo.list(&query).await?;

    let today = Utc::now().date_naive();
    let data = entities
        .into_iter()
        .map(|e| WarrantyResponse::from_registration(entity_to_domain(e), today))
        .collect();

    Ok(Json(ListWarrantiesResponse {
        data,
        pagination: Pagination::new(page, per_page, total),
    }))
}

/// Get a single warranty registration by id.
///
/// GET /api/v1/warranties/:warranty_id
pub async fn get_warranty(
    State(state): State<AppState>,
    Path(warranty_id): Path<i64>,
) -> Result<Json<WarrantyResponse>, ApiError> {
    let repo = WarrantyRepository::new(state.pool.clone());
    let entity = repo
        .find_by_id(warranty_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warranty registration not found".to_string()))?;

    let today = Utc::now().date_naive();
    Ok(Json(WarrantyResponse::from_registration(
        entity_to_domain(entity),
        today,
    )))
}

/// Update the status of a warranty registration.
///
/// POST /api/v1/warranties/:warranty_id/status
///
/// Appends a status_change audit entry capturing the before/after pair. Any
/// status may move to any other status; the trail, not a transition table, is
/// the control.
pub async fn update_status(
    State(state): State<AppState>,
    meta: RequestMeta,
    Extension(auth): Extension<ApiKeyAuth>,
    Path(warranty_id): Path<i64>,
    Json(request): Json<UpdateWarrantyStatusRequest>,
) -> Result<Json<UpdateWarrantyStatusResponse>, ApiError> {
    let new_status: WarrantyStatus = request.status.parse().map_err(|_| {
        ApiError::field_error(
            "status",
            &format!("\"{}\" is not a valid choice", request.status),
        )
    })?;

    let context = audit_context(Some(&auth), meta);
    let repo = WarrantyRepository::new(state.pool.clone());

    let entity = repo
        .update_status(warranty_id, new_status, request.notes.as_deref(), context)
        .await?
        .ok_or_else(|| ApiError::NotFound("Warranty registration not found".to_string()))?;

    record_status_change(new_status.as_str());

    info!(
        warranty_id = entity.id,
        status = %new_status,
        performed_by = %auth.name,
        "Warranty status updated"
    );

    Ok(Json(UpdateWarrantyStatusResponse {
        success: true,
        message: format!("Status updated to {}", new_status.label()),
        status: new_status.as_str().to_string(),
        status_label: new_status.label().to_string(),
    }))
}

/// List registered warranties expiring within the given number of days.
///
/// GET /api/v1/warranties/expiring?days=N
pub async fn list_expiring(
    State(state): State<AppState>,
    Query(query): Query<ExpiringQuery>,
) -> Result<Json<ExpiringWarrantiesResponse>, ApiError> {
    let days = query.days.unwrap_or(30).clamp(0, 3650) as i32;

    let repo = WarrantyRepository::new(state.pool.clone());
    let entities = repo.list_expiring(days).await?;

    let today = Utc::now().date_naive();
    let data: Vec<WarrantyResponse> = entities
        .into_iter()
        .map(|e| WarrantyResponse::from_registration(entity_to_domain(e), today))
        .collect();
    let total = data.len();

    Ok(Json(ExpiringWarrantiesResponse { data, total }))
}
