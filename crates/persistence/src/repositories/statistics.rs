//! Aggregate statistics repository.

use chrono::Utc;
use domain::models::{DepartmentCount, StatusBreakdown, WarrantyStatistics};
use sqlx::{PgPool, Row};

/// Window for the expiring-soon count, inclusive of both endpoints.
const EXPIRING_SOON_DAYS: i32 = 30;

/// How many departments the by-department breakdown returns.
const TOP_DEPARTMENTS: i64 = 10;

/// Repository for aggregate statistics over warranty registrations.
#[derive(Clone)]
pub struct StatisticsRepository {
    pool: PgPool,
}

impl StatisticsRepository {
    /// Create a new repository instance.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Compute the full statistics aggregate.
    ///
    /// `cache_expires_at` is left unset here; the caching layer stamps it
    /// with its own TTL.
    pub async fn get_statistics(&self) -> Result<WarrantyStatistics, sqlx::Error> {
        // Run the independent aggregates in parallel
        let (by_status, expiring_soon, by_department) = tokio::try_join!(
            self.get_status_counts(),
            self.get_expiring_soon_count(),
            self.get_department_counts(),
        )?;

        Ok(WarrantyStatistics {
            total_registrations: by_status.total(),
            by_status,
            expiring_soon,
            by_department,
            generated_at: Utc::now(),
            cache_expires_at: None,
        })
    }

    /// Count registrations per status, zero-filled across all five statuses.
    async fn get_status_counts(&self) -> Result<StatusBreakdown, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) FILTER (WHERE status = 'registered') AS registered,
                COUNT(*) FILTER (WHERE status = 'pending') AS pending,
                COUNT(*) FILTER (WHERE status = 'expired') AS expired,
                COUNT(*) FILTER (WHERE status = 'claimed') AS claimed,
                COUNT(*) FILTER (WHERE status = 'void') AS void
            FROM warranty_registrations
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(StatusBreakdown {
            registered: row.get::<i64, _>("registered"),
            pending: row.get::<i64, _>("pending"),
            expired: row.get::<i64, _>("expired"),
            claimed: row.get::<i64, _>("claimed"),
            void: row.get::<i64, _>("void"),
        })
    }

    /// Count registered warranties expiring within the next 30 days.
    async fn get_expiring_soon_count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM warranty_registrations
            WHERE status = 'registered'
              AND warranty_end_date >= CURRENT_DATE
              AND warranty_end_date <= CURRENT_DATE + $1
            "#,
        )
        .bind(EXPIRING_SOON_DAYS)
        .fetch_one(&self.pool)
        .await
    }

    /// Top departments by registration count. Null and empty departments are
    /// excluded.
    async fn get_department_counts(&self) -> Result<Vec<DepartmentCount>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT department, COUNT(*) AS count
            FROM warranty_registrations
            WHERE department IS NOT NULL AND department <> ''
            GROUP BY department
            ORDER BY count DESC
            LIMIT $1
            "#,
        )
        .bind(TOP_DEPARTMENTS)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| DepartmentCount {
                department: row.get::<String, _>("department"),
                count: row.get::<i64, _>("count"),
            })
            .collect())
    }
}
