//! Reference data sync types.
//!
//! Departments, categories, and profiles are mirrors of records owned by the
//! external system. They are upserted by external id, last write wins, and
//! are never linked by foreign key from warranty registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One department record in a sync batch.
#[derive(Debug, Clone, Deserialize)]
pub struct DepartmentRecord {
    /// Identifier in the external system.
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Batch sync request for departments.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncDepartmentsRequest {
    #[serde(default)]
    pub departments: Vec<DepartmentRecord>,
}

/// One category record in a sync batch.
#[derive(Debug, Clone, Deserialize)]
pub struct CategoryRecord {
    pub id: String,
    pub name: String,
    pub created_at: Option<DateTime<Utc>>,
}

/// Batch sync request for categories.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncCategoriesRequest {
    #[serde(default)]
    pub categories: Vec<CategoryRecord>,
}

/// One profile record in a sync batch.
#[derive(Debug, Clone, Deserialize)]
pub struct ProfileRecord {
    pub id: String,
    pub full_name: String,
    pub role: Option<String>,
    pub department: Option<String>,
}

/// Batch sync request for profiles.
#[derive(Debug, Clone, Deserialize)]
pub struct SyncProfilesRequest {
    #[serde(default)]
    pub profiles: Vec<ProfileRecord>,
}

/// Result of a batch upsert.
///
/// `skipped` counts records dropped by per-record validation (blank external
/// id or display name); the rest of the batch still goes through.
#[derive(Debug, Clone, Serialize)]
pub struct SyncResponse {
    pub success: bool,
    pub created: i64,
    pub updated: i64,
    pub skipped: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sync_request_defaults_to_empty_batch() {
        let request: SyncDepartmentsRequest = serde_json::from_str("{}").unwrap();
        assert!(request.departments.is_empty());
    }

    #[test]
    fn test_department_record_deserialization() {
        let request: SyncDepartmentsRequest = serde_json::from_str(
            r#"{"departments": [{"id": "dept-1", "name": "IT"},
                                {"id": "dept-2", "name": "Finance", "created_at": "2024-01-15T10:30:00Z"}]}"#,
        )
        .unwrap();
        assert_eq!(request.departments.len(), 2);
        assert_eq!(request.departments[0].id, "dept-1");
        assert!(request.departments[1].created_at.is_some());
    }

    #[test]
    fn test_sync_response_serialization() {
        let response = SyncResponse {
            success: true,
            created: 2,
            updated: 1,
            skipped: 0,
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"created\":2"));
        assert!(json.contains("\"updated\":1"));
    }
}
