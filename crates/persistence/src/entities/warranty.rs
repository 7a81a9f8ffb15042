//! Warranty registration entity.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;

/// Database row mapping for the warranty_registrations table.
#[derive(Debug, Clone, FromRow)]
pub struct WarrantyRegistrationEntity {
    pub id: i64,

    /// Asset identifier in the external system. Unique.
    pub asset_external_id: String,
    pub asset_name: String,
    pub category: Option<String>,
    pub department: Option<String>,
    pub cost: Option<Decimal>,
    pub date_purchased: Option<NaiveDate>,

    /// Creator identity in the external system, stored verbatim.
    pub asset_created_by: Option<String>,
    pub asset_created_at: Option<DateTime<Utc>>,

    pub status: String,

    pub registered_by_key_id: Option<i64>,
    pub registered_by_name: Option<String>,
    pub registered_by_external_id: Option<String>,

    pub registered_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,

    pub warranty_start_date: Option<NaiveDate>,
    pub warranty_end_date: Option<NaiveDate>,
    pub warranty_duration_months: i32,

    pub notes: Option<String>,
    pub serial_number: Option<String>,
    pub manufacturer: Option<String>,
    pub model_number: Option<String>,
}
