//! In-process cache for the statistics aggregate.
//!
//! The aggregate is recomputed at most once per TTL window and served stale in
//! between. There is deliberately no invalidation hook on the write path: a
//! new registration does not evict the cache, and callers may observe up to
//! `ttl` of staleness. `cache_expires_at` on the response makes that window
//! explicit. The cache is best-effort; a TTL of zero disables it entirely.

use chrono::{DateTime, Duration, Utc};
use domain::models::WarrantyStatistics;
use persistence::repositories::StatisticsRepository;
use tokio::sync::RwLock;

struct CachedStatistics {
    stats: WarrantyStatistics,
    fetched_at: DateTime<Utc>,
}

/// Fixed-TTL, single-entry cache in front of the statistics repository.
pub struct StatisticsCache {
    ttl_secs: u64,
    inner: RwLock<Option<CachedStatistics>>,
}

impl StatisticsCache {
    pub fn new(ttl_secs: u64) -> Self {
        Self {
            ttl_secs,
            inner: RwLock::new(None),
        }
    }

    /// Returns the cached aggregate when fresh, recomputing it otherwise.
    pub async fn get_or_compute(
        &self,
        repo: &StatisticsRepository,
    ) -> Result<WarrantyStatistics, sqlx::Error> {
        if self.ttl_secs == 0 {
            // Cache disabled: always recompute
            return repo.get_statistics().await;
        }

        let ttl = Duration::seconds(self.ttl_secs as i64);
        let now = Utc::now();

        {
            let cache = self.inner.read().await;
            if let Some(ref cached) = *cache {
                if now - cached.fetched_at < ttl {
                    return Ok(cached.stats.clone());
                }
            }
        }

        let mut stats = repo.get_statistics().await?;
        stats.cache_expires_at = Some(stats.generated_at + ttl);

        {
            let mut cache = self.inner.write().await;
            *cache = Some(CachedStatistics {
                stats: stats.clone(),
                fetched_at: now,
            });
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::models::StatusBreakdown;

    fn sample_stats() -> WarrantyStatistics {
        WarrantyStatistics {
            total_registrations: 3,
            by_status: StatusBreakdown {
                registered: 3,
                ..Default::default()
            },
            expiring_soon: 0,
            by_department: vec![],
            generated_at: Utc::now(),
            cache_expires_at: None,
        }
    }

    #[tokio::test]
    async fn test_fresh_entry_is_served_from_cache() {
        let cache = StatisticsCache::new(300);
        {
            let mut inner = cache.inner.write().await;
            *inner = Some(CachedStatistics {
                stats: sample_stats(),
                fetched_at: Utc::now(),
            });
        }

        let inner = cache.inner.read().await;
        let cached = inner.as_ref().unwrap();
        assert!(Utc::now() - cached.fetched_at < Duration::seconds(300));
        assert_eq!(cached.stats.total_registrations, 3);
    }

    #[tokio::test]
    async fn test_stale_entry_is_detected() {
        let cache = StatisticsCache::new(300);
        {
            let mut inner = cache.inner.write().await;
            *inner = Some(CachedStatistics {
                stats: sample_stats(),
                fetched_at: Utc::now() - Duration::seconds(301),
            });
        }

        let inner = cache.inner.read().await;
        let cached = inner.as_ref().unwrap();
        assert!(Utc::now() - cached.fetched_at >= Duration::seconds(300));
    }
}
