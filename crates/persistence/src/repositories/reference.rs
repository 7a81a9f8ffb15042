//! Reference data repository.
//!
//! Upsert-only mirrors of departments, categories, and profiles owned by the
//! external system. Upserts are keyed strictly on external_id with
//! last-write-wins semantics on the mirrored fields; synced_at advances on
//! every upsert, including no-op ones.

use domain::models::{CategoryRecord, DepartmentRecord, ProfileRecord};
use sqlx::PgPool;

/// Repository for reference data upserts.
#[derive(Clone)]
pub struct ReferenceDataRepository {
    pool: PgPool,
}

impl ReferenceDataRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Upsert one department. Returns true when a new row was created.
    pub async fn upsert_department(&self, record: &DepartmentRecord) -> Result<bool, sqlx::Error> {
        // xmax = 0 only holds for rows freshly inserted by this statement
        sqlx::query_scalar(
            r#"
            INSERT INTO departments (external_id, name, created_at)
            VALUES ($1, $2, COALESCE($3, NOW()))
            ON CONFLICT (external_id)
            DO UPDATE SET name = EXCLUDED.name, synced_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Upsert one category. Returns true when a new row was created.
    pub async fn upsert_category(&self, record: &CategoryRecord) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO categories (external_id, name, created_at)
            VALUES ($1, $2, COALESCE($3, NOW()))
            ON CONFLICT (external_id)
            DO UPDATE SET name = EXCLUDED.name, synced_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.created_at)
        .fetch_one(&self.pool)
        .await
    }

    /// Upsert one profile. Returns true when a new row was created.
    pub async fn upsert_profile(&self, record: &ProfileRecord) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            INSERT INTO profiles (external_id, full_name, role, department)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (external_id)
            DO UPDATE SET full_name = EXCLUDED.full_name,
                          role = EXCLUDED.role,
                          department = EXCLUDED.department,
                          synced_at = NOW()
            RETURNING (xmax = 0)
            "#,
        )
        .bind(&record.id)
        .bind(&record.full_name)
        .bind(&record.role)
        .bind(&record.department)
        .fetch_one(&self.pool)
        .await
    }
}
