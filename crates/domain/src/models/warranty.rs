//! Warranty registration domain model.
//!
//! Holds the registration record itself, the status enumeration, and the
//! warranty window derivation rules (start defaulting, calendar-month end
//! date computation, active/expiry calculations).

use chrono::{DateTime, Months, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use validator::Validate;

/// Warranty lifecycle statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WarrantyStatus {
    Pending,
    Registered,
    Expired,
    Claimed,
    Void,
}

impl WarrantyStatus {
    /// All statuses, in display order. Statistics are zero-filled over this set.
    pub const ALL: [WarrantyStatus; 5] = [
        WarrantyStatus::Pending,
        WarrantyStatus::Registered,
        WarrantyStatus::Expired,
        WarrantyStatus::Claimed,
        WarrantyStatus::Void,
    ];

    /// Database/wire string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarrantyStatus::Pending => "pending",
            WarrantyStatus::Registered => "registered",
            WarrantyStatus::Expired => "expired",
            WarrantyStatus::Claimed => "claimed",
            WarrantyStatus::Void => "void",
        }
    }

    /// Human-readable label shown to callers.
    pub fn label(&self) -> &'static str {
        match self {
            WarrantyStatus::Pending => "Pending",
            WarrantyStatus::Registered => "Warranty Registered",
            WarrantyStatus::Expired => "Warranty Expired",
            WarrantyStatus::Claimed => "Warranty Claimed",
            WarrantyStatus::Void => "Void",
        }
    }
}

impl FromStr for WarrantyStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WarrantyStatus::Pending),
            "registered" => Ok(WarrantyStatus::Registered),
            "expired" => Ok(WarrantyStatus::Expired),
            "claimed" => Ok(WarrantyStatus::Claimed),
            "void" => Ok(WarrantyStatus::Void),
            _ => Err(format!("Unknown warranty status: {}", s)),
        }
    }
}

impl std::fmt::Display for WarrantyStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolves the warranty window at registration time.
///
/// The start date defaults to `today` when the caller did not supply one. The
/// end date, when absent, is derived as start plus the duration in calendar
/// months (2024-01-31 plus one month is 2024-02-29, not a fixed 30 days).
/// Once persisted, neither date is recomputed.
pub fn resolve_warranty_window(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    duration_months: u32,
    today: NaiveDate,
) -> (NaiveDate, Option<NaiveDate>) {
    let start = start.unwrap_or(today);
    let end = end.or_else(|| start.checked_add_months(Months::new(duration_months)));
    (start, end)
}

/// Whether the warranty is active as of `today`.
///
/// A warranty with no end date is considered active.
pub fn is_warranty_active(end: Option<NaiveDate>, today: NaiveDate) -> bool {
    match end {
        Some(end) => today <= end,
        None => true,
    }
}

/// Signed number of days until the warranty expires, as of `today`.
///
/// Negative exactly when the end date is in the past, zero when it is today,
/// `None` when no end date is set.
pub fn days_until_expiry(end: Option<NaiveDate>, today: NaiveDate) -> Option<i64> {
    end.map(|end| (end - today).num_days())
}

/// A warranty registration record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WarrantyRegistration {
    pub id: i64,
    pub asset_external_id: String,
    pub asset_name: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub cost: Option<Decimal>,
    pub date_purchased: Option<NaiveDate>,
    pub asset_created_by: Option<String>,
    pub asset_created_at: Option<DateTime<Utc>>,
    pub status: WarrantyStatus,
    pub registered_by_key_id: Option<i64>,
    pub registered_by_name: Option<String>,
    pub registered_by_external_id: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub warranty_start_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    pub warranty_duration_months: u32,
    pub notes: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
}

impl WarrantyRegistration {
    pub fn is_warranty_active(&self, today: NaiveDate) -> bool {
        is_warranty_active(self.warranty_end_date, today)
    }

    pub fn days_until_expiry(&self, today: NaiveDate) -> Option<i64> {
        days_until_expiry(self.warranty_end_date, today)
    }
}

fn default_warranty_duration() -> u32 {
    12
}

/// Registration payload submitted by the external application.
///
/// Field names mirror the asset record of the external system, hence `id`
/// for the asset identifier.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterWarrantyRequest {
    /// Asset identifier in the external system. Globally unique.
    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 255, message = "Asset id must be at most 255 characters")
    )]
    pub id: String,

    #[validate(
        custom(function = "shared::validation::validate_not_blank"),
        length(max = 255, message = "Asset name must be at most 255 characters")
    )]
    pub name: String,

    #[validate(length(max = 255, message = "Category must be at most 255 characters"))]
    pub category: Option<String>,

    #[validate(length(max = 255, message = "Department must be at most 255 characters"))]
    pub department: Option<String>,

    #[validate(custom(function = "shared::validation::validate_cost"))]
    pub cost: Option<Decimal>,

    pub date_purchased: Option<NaiveDate>,

    /// Identity of whoever created the asset in the external system.
    pub created_by: Option<String>,
    pub created_at: Option<DateTime<Utc>>,

    /// External identity of the person registering the warranty.
    pub registered_by_id: Option<String>,
    pub registered_by_name: Option<String>,

    #[serde(default = "default_warranty_duration")]
    #[validate(custom(function = "shared::validation::validate_duration_months"))]
    pub warranty_duration_months: u32,

    pub warranty_start_date: Option<NaiveDate>,

    #[validate(length(max = 255, message = "Serial number must be at most 255 characters"))]
    pub serial_number: Option<String>,

    #[validate(length(max = 255, message = "Manufacturer must be at most 255 characters"))]
    pub manufacturer: Option<String>,

    #[validate(length(max = 255, message = "Model number must be at most 255 characters"))]
    pub model_number: Option<String>,

    pub notes: Option<String>,
}

/// Values persisted for a new registration, after window resolution.
#[derive(Debug, Clone)]
pub struct NewWarrantyRegistration {
    pub asset_external_id: String,
    pub asset_name: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub cost: Option<Decimal>,
    pub date_purchased: Option<NaiveDate>,
    pub asset_created_by: Option<String>,
    pub asset_created_at: Option<DateTime<Utc>>,
    pub status: WarrantyStatus,
    pub registered_by_key_id: Option<i64>,
    pub registered_by_name: Option<String>,
    pub registered_by_external_id: Option<String>,
    pub warranty_start_date: NaiveDate,
    pub warranty_end_date: Option<NaiveDate>,
    pub warranty_duration_months: u32,
    pub notes: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
}

impl NewWarrantyRegistration {
    /// Builds the persisted values from a validated request.
    ///
    /// Registration always lands in `registered` status; the warranty window
    /// is resolved against `today` per the derivation rules.
    pub fn from_request(
        request: RegisterWarrantyRequest,
        registered_by_key_id: Option<i64>,
        today: NaiveDate,
    ) -> Self {
        let (start, end) = resolve_warranty_window(
            request.warranty_start_date,
            None,
            request.warranty_duration_months,
            today,
        );

        Self {
            asset_external_id: request.id,
            asset_name: request.name,
            category: request.category,
            department: request.department,
            cost: request.cost,
            date_purchased: request.date_purchased,
            asset_created_by: request.created_by,
            asset_created_at: request.created_at,
            status: WarrantyStatus::Registered,
            registered_by_key_id,
            registered_by_name: request.registered_by_name,
            registered_by_external_id: request.registered_by_id,
            warranty_start_date: start,
            warranty_end_date: end,
            warranty_duration_months: request.warranty_duration_months,
            notes: request.notes,
            serial_number: request.serial_number,
            manufacturer: request.manufacturer,
            model_number: request.model_number,
        }
    }
}

/// Success payload returned to the external application after registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterWarrantyResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub status_label: String,
    pub warranty_id: i64,
    pub asset_id: String,
    pub registered_at: DateTime<Utc>,
    pub warranty_start_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
}

/// Response for the warranty status check endpoint.
///
/// An unknown asset id is a normal outcome: `is_registered` is false and all
/// detail fields are null.
#[derive(Debug, Clone, Serialize)]
pub struct WarrantyCheckResponse {
    pub is_registered: bool,
    pub warranty_id: Option<i64>,
    pub status: Option<String>,
    pub status_label: Option<String>,
    pub registered_at: Option<DateTime<Utc>>,
    pub warranty_end_date: Option<NaiveDate>,
    pub is_active: Option<bool>,
}

impl WarrantyCheckResponse {
    pub fn not_registered() -> Self {
        Self {
            is_registered: false,
            warranty_id: None,
            status: None,
            status_label: None,
            registered_at: None,
            warranty_end_date: None,
            is_active: None,
        }
    }

    pub fn registered(warranty: &WarrantyRegistration, today: NaiveDate) -> Self {
        Self {
            is_registered: true,
            warranty_id: Some(warranty.id),
            status: Some(warranty.status.as_str().to_string()),
            status_label: Some(warranty.status.label().to_string()),
            registered_at: Some(warranty.registered_at),
            warranty_end_date: warranty.warranty_end_date,
            is_active: Some(warranty.is_warranty_active(today)),
        }
    }
}

/// Request body for a status transition.
///
/// The status is carried as a string and checked against the enumeration
/// before any mutation, so an invalid value yields a field-level validation
/// error rather than a deserialization failure.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateWarrantyStatusRequest {
    pub status: String,
    pub notes: Option<String>,
}

/// Response for a status transition.
#[derive(Debug, Clone, Serialize)]
pub struct UpdateWarrantyStatusResponse {
    pub success: bool,
    pub message: String,
    pub status: String,
    pub status_label: String,
}

/// Query parameters for the warranty listing endpoint.
///
/// Filter dimensions compose with AND; the free-text `search` matches any of
/// asset name, serial number, registrant name, or asset external id.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListWarrantiesQuery {
    pub status: Option<String>,
    pub department: Option<String>,
    pub category: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub search: Option<String>,
    pub registered_by: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

/// Query parameters for the expiring warranties endpoint.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ExpiringQuery {
    pub days: Option<i64>,
}

/// Pagination block for list responses.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub page: i32,
    pub per_page: i32,
    pub total: i64,
    pub total_pages: i32,
}

impl Pagination {
    pub fn new(page: i32, per_page: i32, total: i64) -> Self {
        let total_pages = if total == 0 {
            0
        } else {
            ((total + per_page as i64 - 1) / per_page as i64) as i32
        };
        Self {
            page,
            per_page,
            total,
            total_pages,
        }
    }
}

/// Full warranty record as returned by list/detail endpoints, including the
/// read-time derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct WarrantyResponse {
    pub id: i64,
    pub asset_external_id: String,
    pub asset_name: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub cost: Option<Decimal>,
    pub date_purchased: Option<NaiveDate>,
    pub asset_created_by: Option<String>,
    pub asset_created_at: Option<DateTime<Utc>>,
    pub status: String,
    pub status_display: String,
    pub registered_by_name: Option<String>,
    pub registered_by_external_id: Option<String>,
    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub warranty_start_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    pub warranty_duration_months: u32,
    pub is_warranty_active: bool,
    pub days_until_expiry: Option<i64>,
    pub notes: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
}

impl WarrantyResponse {
    pub fn from_registration(warranty: WarrantyRegistration, today: NaiveDate) -> Self {
        Self {
            is_warranty_active: warranty.is_warranty_active(today),
            days_until_expiry: warranty.days_until_expiry(today),
            id: warranty.id,
            asset_external_id: warranty.asset_external_id,
            asset_name: warranty.asset_name,
            category: warranty.category,
            department: warranty.department,
            cost: warranty.cost,
            date_purchased: warranty.date_purchased,
            asset_created_by: warranty.asset_created_by,
            asset_created_at: warranty.asset_created_at,
            status: warranty.status.as_str().to_string(),
            status_display: warranty.status.label().to_string(),
            registered_by_name: warranty.registered_by_name,
            registered_by_external_id: warranty.registered_by_external_id,
            registered_at: warranty.registered_at,
            updated_at: warranty.updated_at,
            warranty_start_date: warranty.warranty_start_date,
            warranty_end_date: warranty.warranty_end_date,
            warranty_duration_months: warranty.warranty_duration_months,
            notes: warranty.notes,
            serial_number: warranty.serial_number,
            manufacturer: warranty.manufacturer,
            model_number: warranty.model_number,
        }
    }
}

/// Response for the warranty listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListWarrantiesResponse {
    pub data: Vec<WarrantyResponse>,
    pub pagination: Pagination,
}

/// Response for the expiring warranties endpoint (unpaginated).
#[derive(Debug, Clone, Serialize)]
pub struct ExpiringWarrantiesResponse {
    pub data: Vec<WarrantyResponse>,
    pub total: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use validator::Validate;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_status_round_trip() {
        for status in WarrantyStatus::ALL {
            assert_eq!(status.as_str().parse::<WarrantyStatus>().unwrap(), status);
        }
        assert!("active".parse::<WarrantyStatus>().is_err());
        assert!("".parse::<WarrantyStatus>().is_err());
    }

    #[test]
    fn test_status_labels() {
        assert_eq!(WarrantyStatus::Registered.label(), "Warranty Registered");
        assert_eq!(WarrantyStatus::Pending.label(), "Pending");
        assert_eq!(WarrantyStatus::Void.label(), "Void");
    }

    #[test]
    fn test_window_defaults_start_to_today() {
        let today = date(2024, 3, 15);
        let (start, end) = resolve_warranty_window(None, None, 12, today);
        assert_eq!(start, today);
        assert_eq!(end, Some(date(2025, 3, 15)));
    }

    #[test]
    fn test_window_calendar_month_arithmetic() {
        // End-of-month start dates clamp rather than spilling into the next month.
        let today = date(2024, 1, 31);
        let (start, end) = resolve_warranty_window(Some(today), None, 1, today);
        assert_eq!(start, date(2024, 1, 31));
        assert_eq!(end, Some(date(2024, 2, 29)));

        let (_, end) = resolve_warranty_window(Some(date(2023, 1, 31)), None, 1, today);
        assert_eq!(end, Some(date(2023, 2, 28)));

        let (_, end) = resolve_warranty_window(Some(date(2024, 8, 31)), None, 1, today);
        assert_eq!(end, Some(date(2024, 9, 30)));
    }

    #[test]
    fn test_window_preserves_supplied_end_date() {
        let today = date(2024, 3, 15);
        let supplied = date(2030, 1, 1);
        let (_, end) = resolve_warranty_window(Some(today), Some(supplied), 12, today);
        assert_eq!(end, Some(supplied));
    }

    #[test]
    fn test_window_long_duration() {
        let today = date(2024, 2, 29);
        let (_, end) = resolve_warranty_window(None, None, 120, today);
        assert_eq!(end, Some(date(2034, 2, 28)));
    }

    #[test]
    fn test_days_until_expiry_sign() {
        let today = date(2024, 6, 15);
        assert_eq!(days_until_expiry(Some(date(2024, 6, 20)), today), Some(5));
        assert_eq!(days_until_expiry(Some(today), today), Some(0));
        assert_eq!(days_until_expiry(Some(date(2024, 6, 10)), today), Some(-5));
        assert_eq!(days_until_expiry(None, today), None);
    }

    #[test]
    fn test_is_active() {
        let today = date(2024, 6, 15);
        assert!(is_warranty_active(Some(date(2024, 6, 15)), today));
        assert!(is_warranty_active(Some(date(2025, 1, 1)), today));
        assert!(!is_warranty_active(Some(date(2024, 6, 14)), today));
        // No end date means the warranty never expires.
        assert!(is_warranty_active(None, today));
    }

    #[test]
    fn test_register_request_defaults() {
        let request: RegisterWarrantyRequest = serde_json::from_str(
            r#"{"id": "asset-1", "name": "MacBook Pro 16"}"#,
        )
        .unwrap();
        assert_eq!(request.warranty_duration_months, 12);
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_register_request_rejects_blank_id() {
        let request: RegisterWarrantyRequest =
            serde_json::from_str(r#"{"id": "  ", "name": "Printer"}"#).unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("id"));
    }

    #[test]
    fn test_register_request_rejects_out_of_range_duration() {
        let request: RegisterWarrantyRequest = serde_json::from_str(
            r#"{"id": "asset-1", "name": "Printer", "warranty_duration_months": 121}"#,
        )
        .unwrap();
        let errors = request.validate().unwrap_err();
        assert!(errors
            .field_errors()
            .contains_key("warranty_duration_months"));
    }

    #[test]
    fn test_new_registration_from_request() {
        let request: RegisterWarrantyRequest = serde_json::from_str(
            r#"{"id": "asset-7", "name": "Scanner", "warranty_duration_months": 24,
                "registered_by_id": "user-9", "registered_by_name": "Jane Roe"}"#,
        )
        .unwrap();
        let today = date(2024, 5, 31);
        let new = NewWarrantyRegistration::from_request(request, Some(3), today);

        assert_eq!(new.status, WarrantyStatus::Registered);
        assert_eq!(new.warranty_start_date, today);
        assert_eq!(new.warranty_end_date, Some(date(2026, 5, 31)));
        assert_eq!(new.registered_by_key_id, Some(3));
        assert_eq!(new.registered_by_external_id.as_deref(), Some("user-9"));
    }

    #[test]
    fn test_check_response_not_registered() {
        let response = WarrantyCheckResponse::not_registered();
        assert!(!response.is_registered);
        assert!(response.warranty_id.is_none());
        assert!(response.is_active.is_none());
    }

    #[test]
    fn test_pagination_total_pages() {
        assert_eq!(Pagination::new(1, 50, 0).total_pages, 0);
        assert_eq!(Pagination::new(1, 50, 50).total_pages, 1);
        assert_eq!(Pagination::new(1, 50, 51).total_pages, 2);
        assert_eq!(Pagination::new(2, 10, 95).total_pages, 10);
    }
}
