//! API key authentication extractor.
//!
//! Validates the `X-API-Key` header against the api_keys table. The key name
//! travels with the authentication info so mutations can snapshot the acting
//! identity into the audit trail.

use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use sqlx::PgPool;

use crate::app::AppState;
use crate::error::ApiError;
use persistence::repositories::ApiKeyRepository;
use shared::crypto::sha256_hex;

/// Authenticated API key information.
#[derive(Debug, Clone)]
pub struct ApiKeyAuth {
    /// Database ID of the authenticated API key.
    pub api_key_id: i64,
    /// Display name of the key, snapshotted into audit entries.
    pub name: String,
    /// Key prefix for identification (e.g., "aBcDeFgH").
    pub key_prefix: String,
    /// Whether this is an admin API key.
    pub is_admin: bool,
}

impl ApiKeyAuth {
    /// Validates an API key and returns authentication info.
    pub async fn validate(pool: &PgPool, api_key: &str) -> Result<Self, ApiError> {
        // Reject keys that cannot be well-formed before touching the database
        if api_key.len() < 11 || !api_key.starts_with("wr_") {
            return Err(ApiError::Unauthorized(
                "Invalid or missing API key".to_string(),
            ));
        }

        let key_hash = sha256_hex(api_key);

        let repo = ApiKeyRepository::new(pool.clone());
        let key = repo
            .find_by_key_hash(&key_hash)
            .await
            .map_err(|e| {
                tracing::error!("Database error during API key lookup: {}", e);
                ApiError::Internal("Authentication service unavailable".to_string())
            })?
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        if !ApiKeyRepository::is_key_valid(&key) {
            let message = if key.is_active {
                "API key has expired"
            } else {
                "Invalid or missing API key"
            };
            return Err(ApiError::Unauthorized(message.to_string()));
        }

        // Update last_used_at asynchronously (fire and forget)
        let pool_clone = pool.clone();
        let key_id = key.id;
        tokio::spawn(async move {
            let repo = ApiKeyRepository::new(pool_clone);
            if let Err(e) = repo.update_last_used(key_id).await {
                tracing::warn!("Failed to update API key last_used_at: {}", e);
            }
        });

        Ok(ApiKeyAuth {
            api_key_id: key.id,
            name: key.name,
            key_prefix: key.key_prefix,
            is_admin: key.is_admin,
        })
    }
}

#[async_trait]
impl FromRequestParts<AppState> for ApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts
            .headers
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("Invalid or missing API key".to_string()))?;

        Self::validate(&state.pool, api_key).await
    }
}

/// Optional API key authentication.
///
/// Used by the external-application endpoints: an absent or invalid key does
/// not reject the request, it only leaves the acting principal unknown.
#[derive(Debug, Clone)]
pub struct OptionalApiKeyAuth(pub Option<ApiKeyAuth>);

#[async_trait]
impl FromRequestParts<AppState> for OptionalApiKeyAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let api_key = parts.headers.get("X-API-Key").and_then(|v| v.to_str().ok());

        match api_key {
            Some(key) => match ApiKeyAuth::validate(&state.pool, key).await {
                Ok(auth) => Ok(OptionalApiKeyAuth(Some(auth))),
                Err(_) => Ok(OptionalApiKeyAuth(None)),
            },
            None => Ok(OptionalApiKeyAuth(None)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_key_auth_struct() {
        let auth = ApiKeyAuth {
            api_key_id: 1,
            name: "External app".to_string(),
            key_prefix: "aBcDeFgH".to_string(),
            is_admin: false,
        };
        assert_eq!(auth.api_key_id, 1);
        assert_eq!(auth.name, "External app");
        assert!(!auth.is_admin);
    }

    #[test]
    fn test_optional_api_key_auth() {
        assert!(OptionalApiKeyAuth(None).0.is_none());

        let auth = ApiKeyAuth {
            api_key_id: 2,
            name: "Staff".to_string(),
            key_prefix: "12345678".to_string(),
            is_admin: true,
        };
        let optional = OptionalApiKeyAuth(Some(auth));
        assert!(optional.0.unwrap().is_admin);
    }
}
