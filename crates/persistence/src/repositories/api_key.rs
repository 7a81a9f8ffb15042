//! Repository for API key database operations.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::entities::ApiKeyEntity;

/// Repository for API key operations.
#[derive(Clone)]
pub struct ApiKeyRepository {
    pool: PgPool,
}

impl ApiKeyRepository {
    /// Creates a new API key repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Finds an API key by its hash.
    ///
    /// Returns `None` if no key with the given hash exists.
    pub async fn find_by_key_hash(
        &self,
        key_hash: &str,
    ) -> Result<Option<ApiKeyEntity>, sqlx::Error> {
        sqlx::query_as::<_, ApiKeyEntity>(
            r#"
            SELECT id, name, key_prefix, key_hash, is_active, is_admin,
                   last_used_at, created_at, expires_at
            FROM api_keys
            WHERE key_hash = $1
            "#,
        )
        .bind(key_hash)
        .fetch_optional(&self.pool)
        .await
    }

    /// Inserts a new API key record.
    pub async fn insert(
        &self,
        name: &str,
        key_prefix: &str,
        key_hash: &str,
        is_admin: bool,
    ) -> Result<ApiKeyEntity, sqlx::Error> {
        sqlx::query_as::<_, ApiKeyEntity>(
            r#"
            INSERT INTO api_keys (name, key_prefix, key_hash, is_admin)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, key_prefix, key_hash, is_active, is_admin,
                      last_used_at, created_at, expires_at
            "#,
        )
        .bind(name)
        .bind(key_prefix)
        .bind(key_hash)
        .bind(is_admin)
        .fetch_one(&self.pool)
        .await
    }

    /// Counts all API keys, active or not.
    pub async fn count(&self) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM api_keys")
            .fetch_one(&self.pool)
            .await
    }

    /// Updates the last_used_at timestamp for an API key.
    ///
    /// Called asynchronously after successful authentication.
    pub async fn update_last_used(&self, key_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE api_keys SET last_used_at = NOW() WHERE id = $1")
            .bind(key_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Checks if an API key is valid for authentication.
    ///
    /// Returns `true` if the key is active and not expired.
    pub fn is_key_valid(key: &ApiKeyEntity) -> bool {
        Self::is_key_valid_at(key, Utc::now())
    }

    /// Checks if an API key is valid at a specific time.
    pub fn is_key_valid_at(key: &ApiKeyEntity, at: DateTime<Utc>) -> bool {
        if !key.is_active {
            return false;
        }
        if let Some(expires_at) = key.expires_at {
            if expires_at < at {
                return false;
            }
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn key(is_active: bool, expires_at: Option<DateTime<Utc>>) -> ApiKeyEntity {
        ApiKeyEntity {
            id: 1,
            name: "test".to_string(),
            key_prefix: "abcdefgh".to_string(),
            key_hash: "hash".to_string(),
            is_active,
            is_admin: false,
            last_used_at: None,
            created_at: Utc::now(),
            expires_at,
        }
    }

    #[test]
    fn test_active_key_without_expiry_is_valid() {
        assert!(ApiKeyRepository::is_key_valid(&key(true, None)));
    }

    #[test]
    fn test_inactive_key_is_invalid() {
        assert!(!ApiKeyRepository::is_key_valid(&key(false, None)));
    }

    #[test]
    fn test_expired_key_is_invalid() {
        let now = Utc::now();
        let expired = key(true, Some(now - Duration::hours(1)));
        assert!(!ApiKeyRepository::is_key_valid_at(&expired, now));

        let future = key(true, Some(now + Duration::hours(1)));
        assert!(ApiKeyRepository::is_key_valid_at(&future, now));
    }
}
