//! Warranty registration repository.
//!
//! Owns the warranty_registrations aggregate, including its audit rows: every
//! mutating operation writes its audit entry inside the same transaction, so
//! a registration can never exist without its create entry and a status
//! change can never be recorded without its before/after pair.

use domain::models::{
    AuditAction, AuditContext, ListWarrantiesQuery, NewAuditEntry, NewWarrantyRegistration,
    WarrantyRegistration, WarrantyStatus,
};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};

use crate::entities::WarrantyRegistrationEntity;

/// Column list shared by all queries returning full warranty rows.
const WARRANTY_COLUMNS: &str = "id, asset_external_id, asset_name, category, department, cost, \
     date_purchased, asset_created_by, asset_created_at, status, registered_by_key_id, \
     registered_by_name, registered_by_external_id, registered_at, updated_at, \
     warranty_start_date, warranty_end_date, warranty_duration_months, notes, serial_number, \
     manufacturer, model_number";

/// Helper for building dynamic WHERE clauses from listing filters.
/// Tracks conditions and parameter positions so count and list queries share
/// one source of truth.
struct WarrantyFilterBuilder {
    conditions: Vec<String>,
    param_count: i32,
}

impl WarrantyFilterBuilder {
    fn build(query: &ListWarrantiesQuery) -> Self {
        let mut conditions = Vec::new();
        let mut param_count = 0;

        if query.status.is_some() {
            param_count += 1;
            conditions.push(format!("status = ${}", param_count));
        }

        if query.department.is_some() {
            param_count += 1;
            conditions.push(format!("department ILIKE '%' || ${} || '%'", param_count));
        }

        if query.category.is_some() {
            param_count += 1;
            conditions.push(format!("category ILIKE '%' || ${} || '%'", param_count));
        }

        if query.start_date.is_some() {
            param_count += 1;
            conditions.push(format!("registered_at::date >= ${}", param_count));
        }

        if query.end_date.is_some() {
            param_count += 1;
            conditions.push(format!("registered_at::date <= ${}", param_count));
        }

        if query.search.is_some() {
            param_count += 1;
            // One bound parameter, matched disjunctively across the four
            // searchable fields.
            conditions.push(format!(
                "(asset_name ILIKE '%' || ${p} || '%' \
                 OR serial_number ILIKE '%' || ${p} || '%' \
                 OR registered_by_name ILIKE '%' || ${p} || '%' \
                 OR asset_external_id ILIKE '%' || ${p} || '%')",
                p = param_count
            ));
        }

        if query.registered_by.is_some() {
            param_count += 1;
            conditions.push(format!("registered_by_external_id = ${}", param_count));
        }

        Self {
            conditions,
            param_count,
        }
    }

    fn where_clause(&self) -> String {
        if self.conditions.is_empty() {
            "TRUE".to_string()
        } else {
            self.conditions.join(" AND ")
        }
    }

    fn param_count(&self) -> i32 {
        self.param_count
    }
}

/// Macro to bind listing filter parameters to a SQLx builder in the same
/// order the filter builder numbered them.
macro_rules! bind_warranty_filters {
    ($builder:expr, $query:expr) => {{
        let mut b = $builder;
        if let Some(ref status) = $query.status {
            b = b.bind(status);
        }
        if let Some(ref department) = $query.department {
            b = b.bind(department);
        }
        if let Some(ref category) = $query.category {
            b = b.bind(category);
        }
        if let Some(ref start_date) = $query.start_date {
            b = b.bind(start_date);
        }
        if let Some(ref end_date) = $query.end_date {
            b = b.bind(end_date);
        }
        if let Some(ref search) = $query.search {
            b = b.bind(search);
        }
        if let Some(ref registered_by) = $query.registered_by {
            b = b.bind(registered_by);
        }
        b
    }};
}

/// Repository for warranty registration database operations.
#[derive(Clone)]
pub struct WarrantyRepository {
    pool: PgPool,
}

impl WarrantyRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Insert a new registration and its create audit entry atomically.
    ///
    /// Duplicate asset ids surface as a unique-constraint violation from the
    /// insert itself; there is no separate existence check to race against.
    /// Use [`is_unique_violation`] to classify the error.
    pub async fn create(
        &self,
        input: &NewWarrantyRegistration,
        context: AuditContext,
    ) -> Result<WarrantyRegistrationEntity, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let insert_sql = format!(
            r#"
            INSERT INTO warranty_registrations (
                asset_external_id, asset_name, category, department, cost, date_purchased,
                asset_created_by, asset_created_at, status, registered_by_key_id,
                registered_by_name, registered_by_external_id, warranty_start_date,
                warranty_end_date, warranty_duration_months, notes, serial_number,
                manufacturer, model_number
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18, $19)
            RETURNING {WARRANTY_COLUMNS}
            "#
        );

        let entity = sqlx::query_as::<_, WarrantyRegistrationEntity>(&insert_sql)
            .bind(&input.asset_external_id)
            .bind(&input.asset_name)
            .bind(&input.category)
            .bind(&input.department)
            .bind(input.cost)
            .bind(input.date_purchased)
            .bind(&input.asset_created_by)
            .bind(input.asset_created_at)
            .bind(input.status.as_str())
            .bind(input.registered_by_key_id)
            .bind(&input.registered_by_name)
            .bind(&input.registered_by_external_id)
            .bind(input.warranty_start_date)
            .bind(input.warranty_end_date)
            .bind(input.warranty_duration_months as i32)
            .bind(&input.notes)
            .bind(&input.serial_number)
            .bind(&input.manufacturer)
            .bind(&input.model_number)
            .fetch_one(&mut *tx)
            .await?;

        let entry = NewAuditEntry::new(AuditAction::Create, context).with_new_value(json!({
            "asset_id": entity.asset_external_id,
            "asset_name": entity.asset_name,
            "status": entity.status,
        }));
        insert_audit_entry(&mut tx, entity.id, &entry).await?;

        tx.commit().await?;

        Ok(entity)
    }

    /// Find a registration by its numeric id.
    pub async fn find_by_id(
        &self,
        id: i64,
    ) -> Result<Option<WarrantyRegistrationEntity>, sqlx::Error> {
        let sql = format!("SELECT {WARRANTY_COLUMNS} FROM warranty_registrations WHERE id = $1");
        sqlx::query_as::<_, WarrantyRegistrationEntity>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    /// Find a registration by the external asset identifier.
    ///
    /// Absence is a normal outcome for the status-check path.
    pub async fn find_by_asset_external_id(
        &self,
        asset_external_id: &str,
    ) -> Result<Option<WarrantyRegistrationEntity>, sqlx::Error> {
        let sql = format!(
            "SELECT {WARRANTY_COLUMNS} FROM warranty_registrations WHERE asset_external_id = $1"
        );
        sqlx::query_as::<_, WarrantyRegistrationEntity>(&sql)
            .bind(asset_external_id)
            .fetch_optional(&self.pool)
            .await
    }

    /// List registrations with filtering and pagination, newest first.
    ///
    /// Returns the page of rows and the total count matching the filters.
    pub async fn list(
        &self,
        query: &ListWarrantiesQuery,
    ) -> Result<(Vec<WarrantyRegistrationEntity>, i64), sqlx::Error> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(50).clamp(1, 100);
        let offset = ((page - 1) * per_page) as i64;

        let filter = WarrantyFilterBuilder::build(query);
        let where_clause = filter.where_clause();
        let param_count = filter.param_count();

        let count_sql = format!("SELECT COUNT(*) FROM warranty_registrations WHERE {where_clause}");
        let count_builder = sqlx::query_scalar::<_, i64>(&count_sql);
        let count_builder = bind_warranty_filters!(count_builder, query);
        let total: i64 = count_builder.fetch_one(&self.pool).await?;

        let list_sql = format!(
            r#"
            SELECT {WARRANTY_COLUMNS}
            FROM warranty_registrations
            WHERE {where_clause}
            ORDER BY registered_at DESC
            LIMIT ${} OFFSET ${}
            "#,
            param_count + 1,
            param_count + 2
        );

        let list_builder = sqlx::query_as::<_, WarrantyRegistrationEntity>(&list_sql);
        let list_builder = bind_warranty_filters!(list_builder, query);
        let entities = list_builder
            .bind(per_page as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((entities, total))
    }

    /// List registered warranties whose end date falls within the next
    /// `days` days, both endpoints inclusive, soonest expiry first.
    pub async fn list_expiring(
        &self,
        days: i32,
    ) -> Result<Vec<WarrantyRegistrationEntity>, sqlx::Error> {
        let sql = format!(
            r#"
            SELECT {WARRANTY_COLUMNS}
            FROM warranty_registrations
            WHERE status = 'registered'
              AND warranty_end_date >= CURRENT_DATE
              AND warranty_end_date <= CURRENT_DATE + $1
            ORDER BY warranty_end_date ASC
            "#
        );
        sqlx::query_as::<_, WarrantyRegistrationEntity>(&sql)
            .bind(days)
            .fetch_all(&self.pool)
            .await
    }

    /// Update the status of a registration and append the status_change audit
    /// entry with the before/after pair, all in one transaction.
    ///
    /// Returns `None` when no registration with the given id exists. Any
    /// status may move to any other status; no transition table is enforced.
    pub async fn update_status(
        &self,
        id: i64,
        new_status: WarrantyStatus,
        notes: Option<&str>,
        context: AuditContext,
    ) -> Result<Option<WarrantyRegistrationEntity>, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let old_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM warranty_registrations WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;

        let Some(old_status) = old_status else {
            return Ok(None);
        };

        let update_sql = format!(
            r#"
            UPDATE warranty_registrations
            SET status = $2, notes = COALESCE($3, notes), updated_at = NOW()
            WHERE id = $1
            RETURNING {WARRANTY_COLUMNS}
            "#
        );
        let entity = sqlx::query_as::<_, WarrantyRegistrationEntity>(&update_sql)
            .bind(id)
            .bind(new_status.as_str())
            .bind(notes)
            .fetch_one(&mut *tx)
            .await?;

        let entry = NewAuditEntry::new(AuditAction::StatusChange, context)
            .with_old_value(json!({ "status": old_status }))
            .with_new_value(json!({ "status": new_status.as_str() }));
        insert_audit_entry(&mut tx, id, &entry).await?;

        tx.commit().await?;

        Ok(Some(entity))
    }
}

/// Insert one audit entry within an open transaction.
async fn insert_audit_entry(
    tx: &mut Transaction<'_, Postgres>,
    warranty_id: i64,
    entry: &NewAuditEntry,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO warranty_audit_log (
            warranty_id, action, performed_by_key_id, performed_by_name,
            old_value, new_value, ip_address, user_agent
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7::inet, $8)
        "#,
    )
    .bind(warranty_id)
    .bind(entry.action.as_str())
    .bind(entry.context.performed_by_key_id)
    .bind(&entry.context.performed_by_name)
    .bind(&entry.old_value)
    .bind(&entry.new_value)
    .bind(&entry.context.ip_address)
    .bind(&entry.context.user_agent)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

/// True when the error is a unique-constraint violation, i.e. the asset is
/// already registered.
pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505")
    )
}

/// Convert an entity to the domain model.
pub fn entity_to_domain(entity: WarrantyRegistrationEntity) -> WarrantyRegistration {
    let status = entity
        .status
        .parse::<WarrantyStatus>()
        .unwrap_or(WarrantyStatus::Registered);

    WarrantyRegistration {
        id: entity.id,
        asset_external_id: entity.asset_external_id,
        asset_name: entity.asset_name,
        category: entity.category,
        department: entity.department,
        cost: entity.cost,
        date_purchased: entity.date_purchased,
        asset_created_by: entity.asset_created_by,
        asset_created_at: entity.asset_created_at,
        status,
        registered_by_key_id: entity.registered_by_key_id,
        registered_by_name: entity.registered_by_name,
        registered_by_external_id: entity.registered_by_external_id,
        registered_at: entity.registered_at,
        updated_at: entity.updated_at,
        warranty_start_date: entity.warranty_start_date,
        warranty_end_date: entity.warranty_end_date,
        warranty_duration_months: entity.warranty_duration_months.max(0) as u32,
        notes: entity.notes,
        serial_number: entity.serial_number,
        manufacturer: entity.manufacturer,
        model_number: entity.model_number,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};

    #[test]
    fn test_filter_builder_no_filters() {
        let query = ListWarrantiesQuery::default();
        let filter = WarrantyFilterBuilder::build(&query);
        assert_eq!(filter.where_clause(), "TRUE");
        assert_eq!(filter.param_count(), 0);
    }

    #[test]
    fn test_filter_builder_all_dimensions_conjoined() {
        let query = ListWarrantiesQuery {
            status: Some("registered".to_string()),
            department: Some("IT".to_string()),
            category: Some("Electronics".to_string()),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            end_date: NaiveDate::from_ymd_opt(2024, 12, 31),
            search: Some("macbook".to_string()),
            registered_by: Some("user-1".to_string()),
            page: None,
            per_page: None,
        };
        let filter = WarrantyFilterBuilder::build(&query);
        let clause = filter.where_clause();

        assert_eq!(filter.param_count(), 7);
        assert_eq!(clause.matches(" AND ").count(), 6);
        assert!(clause.contains("status = $1"));
        assert!(clause.contains("registered_by_external_id = $7"));
    }

    #[test]
    fn test_filter_builder_search_is_disjunctive_over_one_param() {
        let query = ListWarrantiesQuery {
            search: Some("C02XL".to_string()),
            ..Default::default()
        };
        let filter = WarrantyFilterBuilder::build(&query);
        let clause = filter.where_clause();

        // A single parameter is referenced by all four OR branches.
        assert_eq!(filter.param_count(), 1);
        assert_eq!(clause.matches("$1").count(), 4);
        assert_eq!(clause.matches(" OR ").count(), 3);
        assert!(clause.contains("asset_name"));
        assert!(clause.contains("serial_number"));
        assert!(clause.contains("registered_by_name"));
        assert!(clause.contains("asset_external_id"));
    }

    #[test]
    fn test_entity_to_domain_parses_status() {
        let now = Utc::now();
        let entity = WarrantyRegistrationEntity {
            id: 9,
            asset_external_id: "asset-9".to_string(),
            asset_name: "Projector".to_string(),
            category: None,
            department: None,
            cost: None,
            date_purchased: None,
            asset_created_by: None,
            asset_created_at: None,
            status: "claimed".to_string(),
            registered_by_key_id: None,
            registered_by_name: None,
            registered_by_external_id: None,
            registered_at: now,
            updated_at: now,
            warranty_start_date: None,
            warranty_end_date: None,
            warranty_duration_months: 24,
            notes: None,
            serial_number: None,
            manufacturer: None,
            model_number: None,
        };

        let warranty = entity_to_domain(entity);
        assert_eq!(warranty.status, WarrantyStatus::Claimed);
        assert_eq!(warranty.warranty_duration_months, 24);
    }
}
