//! Audit log repository (read side).
//!
//! Audit entries are written by the warranty repository inside the mutating
//! transactions; this repository only serves the listing endpoints. There is
//! deliberately no update or delete here: the trail is append-only.

use domain::models::{AuditAction, AuditLogResponse, ListAuditLogsQuery};
use sqlx::{FromRow, PgPool};

/// Audit row joined with its warranty's asset name for display.
#[derive(Debug, Clone, FromRow)]
pub struct AuditLogListRow {
    pub id: i64,
    pub warranty_id: i64,
    pub asset_name: String,
    pub action: String,
    pub performed_by_name: Option<String>,
    pub old_value: Option<serde_json::Value>,
    pub new_value: Option<serde_json::Value>,
    pub ip_address: Option<String>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Repository for audit log queries.
#[derive(Clone)]
pub struct AuditLogRepository {
    pool: PgPool,
}

impl AuditLogRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List audit entries with optional warranty/action filters, newest first.
    ///
    /// Returns the page of rows and the total count matching the filters.
    pub async fn list(
        &self,
        query: &ListAuditLogsQuery,
    ) -> Result<(Vec<AuditLogListRow>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let mut conditions = Vec::new();
        let mut param_count = 0;

        if query.warranty_id.is_some() {
            param_count += 1;
            conditions.push(format!("a.warranty_id = ${}", param_count));
        }
        if query.action.is_some() {
            param_count += 1;
            conditions.push(format!("a.action = ${}", param_count));
        }

        let where_clause = if conditions.is_empty() {
            "TRUE".to_string()
        } else {
            conditions.join(" AND ")
        };

        let count_sql =
            format!("SELECT COUNT(*) FROM warranty_audit_log a WHERE {where_clause}");
        let mut count_builder = sqlx::query_scalar::<_, i64>(&count_sql);
        if let Some(warranty_id) = query.warranty_id {
            count_builder = count_builder.bind(warranty_id);
        }
        if let Some(ref action) = query.action {
            count_builder = count_builder.bind(action);
        }
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_sql = format!(
            r#"
            SELECT a.id, a.warranty_id, w.asset_name, a.action, a.performed_by_name,
                   a.old_value, a.new_value, a.ip_address::text AS ip_address, a.timestamp
            FROM warranty_audit_log a
            JOIN warranty_registrations w ON w.id = a.warranty_id
            WHERE {where_clause}
            ORDER BY a.timestamp DESC
            LIMIT ${} OFFSET ${}
            "#,
            param_count + 1,
            param_count + 2
        );

        let mut list_builder = sqlx::query_as::<_, AuditLogListRow>(&list_sql);
        if let Some(warranty_id) = query.warranty_id {
            list_builder = list_builder.bind(warranty_id);
        }
        if let Some(ref action) = query.action {
            list_builder = list_builder.bind(action);
        }
        let rows = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }
}

/// Convert a joined row into the listing response shape.
pub fn row_to_response(row: AuditLogListRow) -> AuditLogResponse {
    let action_display = row
        .action
        .parse::<AuditAction>()
        .map(|a| a.label().to_string())
        .unwrap_or_else(|_| row.action.clone());

    AuditLogResponse {
        id: row.id,
        warranty_id: row.warranty_id,
        asset_name: Some(row.asset_name),
        action: row.action,
        action_display,
        performed_by_name: row.performed_by_name,
        old_value: row.old_value,
        new_value: row.new_value,
        ip_address: row.ip_address,
        timestamp: row.timestamp,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    #[test]
    fn test_row_to_response_labels_action() {
        let row = AuditLogListRow {
            id: 1,
            warranty_id: 5,
            asset_name: "MacBook Pro 16".to_string(),
            action: "status_change".to_string(),
            performed_by_name: Some("Staff Key".to_string()),
            old_value: Some(json!({"status": "registered"})),
            new_value: Some(json!({"status": "claimed"})),
            ip_address: Some("10.0.0.1".to_string()),
            timestamp: Utc::now(),
        };

        let response = row_to_response(row);
        assert_eq!(response.action, "status_change");
        assert_eq!(response.action_display, "Status Changed");
        assert_eq!(response.asset_name.as_deref(), Some("MacBook Pro 16"));
    }

    #[test]
    fn test_row_to_response_unknown_action_passes_through() {
        let row = AuditLogListRow {
            id: 2,
            warranty_id: 5,
            asset_name: "Printer".to_string(),
            action: "legacy_action".to_string(),
            performed_by_name: None,
            old_value: None,
            new_value: None,
            ip_address: None,
            timestamp: Utc::now(),
        };

        let response = row_to_response(row);
        assert_eq!(response.action_display, "legacy_action");
    }
}
