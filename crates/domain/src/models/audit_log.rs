//! Warranty audit trail domain models.
//!
//! Every mutation of a warranty registration appends exactly one audit entry,
//! written in the same transaction as the mutation. Entries are append-only:
//! no API exists to update or delete them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::str::FromStr;

/// Kinds of audited events against a warranty registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    StatusChange,
    Delete,
}

impl AuditAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuditAction::Create => "create",
            AuditAction::Update => "update",
            AuditAction::StatusChange => "status_change",
            AuditAction::Delete => "delete",
        }
    }

    /// Human-readable label shown in listings.
    pub fn label(&self) -> &'static str {
        match self {
            AuditAction::Create => "Created",
            AuditAction::Update => "Updated",
            AuditAction::StatusChange => "Status Changed",
            AuditAction::Delete => "Deleted",
        }
    }
}

impl FromStr for AuditAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "create" => Ok(AuditAction::Create),
            "update" => Ok(AuditAction::Update),
            "status_change" => Ok(AuditAction::StatusChange),
            "delete" => Ok(AuditAction::Delete),
            _ => Err(format!("Unknown audit action: {}", s)),
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Request-level context captured alongside every audit entry.
///
/// The acting identity is stored twice on purpose: a weak reference to the
/// authenticated key (may be absent, nulled if the key is deleted) and a
/// display-name snapshot taken at write time. The snapshot is never derived
/// from the live key record afterwards.
#[derive(Debug, Clone, Default)]
pub struct AuditContext {
    pub performed_by_key_id: Option<i64>,
    pub performed_by_name: Option<String>,
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

/// Values for one new audit entry.
#[derive(Debug, Clone)]
pub struct NewAuditEntry {
    pub action: AuditAction,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub context: AuditContext,
}

impl NewAuditEntry {
    pub fn new(action: AuditAction, context: AuditContext) -> Self {
        Self {
            action,
            old_value: None,
            new_value: None,
            context,
        }
    }

    pub fn with_old_value(mut self, value: JsonValue) -> Self {
        self.old_value = Some(value);
        self
    }

    pub fn with_new_value(mut self, value: JsonValue) -> Self {
        self.new_value = Some(value);
        self
    }
}

/// Audit entry as returned by the listing endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct AuditLogResponse {
    pub id: i64,
    pub warranty_id: i64,
    pub asset_name: Option<String>,
    pub action: String,
    pub action_display: String,
    pub performed_by_name: Option<String>,
    pub old_value: Option<JsonValue>,
    pub new_value: Option<JsonValue>,
    pub ip_address: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Query parameters for listing audit entries.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct ListAuditLogsQuery {
    pub warranty_id: Option<i64>,
    pub action: Option<String>,
    pub page: Option<i32>,
    pub per_page: Option<i32>,
}

/// Response for the audit log listing endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct ListAuditLogsResponse {
    pub data: Vec<AuditLogResponse>,
    pub pagination: super::warranty::Pagination,
}
