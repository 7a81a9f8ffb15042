//! Aggregate warranty statistics.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts per warranty status. All five statuses are always present,
/// zero-filled when no records exist.
#[derive(Debug, Clone, Default, Serialize)]
pub struct StatusBreakdown {
    pub registered: i64,
    pub pending: i64,
    pub expired: i64,
    pub claimed: i64,
    pub void: i64,
}

impl StatusBreakdown {
    pub fn total(&self) -> i64 {
        self.registered + self.pending + self.expired + self.claimed + self.void
    }
}

/// Registration count for one department.
#[derive(Debug, Clone, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

/// Aggregate statistics over all warranty registrations.
///
/// Served through a fixed-TTL cache; `cache_expires_at` makes the staleness
/// window visible to callers. Writes do not invalidate the cache.
#[derive(Debug, Clone, Serialize)]
pub struct WarrantyStatistics {
    pub total_registrations: i64,
    pub by_status: StatusBreakdown,
    pub expiring_soon: i64,
    pub by_department: Vec<DepartmentCount>,
    pub generated_at: DateTime<Utc>,
    pub cache_expires_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_breakdown_total() {
        let breakdown = StatusBreakdown {
            registered: 10,
            pending: 2,
            expired: 3,
            claimed: 1,
            void: 0,
        };
        assert_eq!(breakdown.total(), 16);
        assert_eq!(StatusBreakdown::default().total(), 0);
    }

    #[test]
    fn test_statistics_serialization_keys() {
        let stats = WarrantyStatistics {
            total_registrations: 5,
            by_status: StatusBreakdown::default(),
            expiring_soon: 1,
            by_department: vec![DepartmentCount {
                department: "IT".to_string(),
                count: 3,
            }],
            generated_at: Utc::now(),
            cache_expires_at: None,
        };
        let json = serde_json::to_string(&stats).unwrap();
        assert!(json.contains("\"total_registrations\":5"));
        assert!(json.contains("\"by_status\""));
        assert!(json.contains("\"expiring_soon\":1"));
        assert!(json.contains("\"by_department\""));
    }
}
