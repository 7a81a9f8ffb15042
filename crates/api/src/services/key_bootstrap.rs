//! Admin API key bootstrap for initial setup.
//!
//! Creates the first admin API key on startup when configured and the
//! api_keys table is empty. Idempotent: once any key exists, it does nothing.

use sqlx::PgPool;
use tracing::{info, warn};

use crate::config::AdminConfig;
use persistence::repositories::ApiKeyRepository;
use shared::crypto::{extract_key_prefix, generate_api_key, sha256_hex};

/// Bootstrap the admin key if configured and not already done.
///
/// Should be called after migrations on startup.
pub async fn bootstrap_admin_key(pool: &PgPool, config: &AdminConfig) -> Result<(), sqlx::Error> {
    if !config.bootstrap_enabled {
        return Ok(());
    }

    let repo = ApiKeyRepository::new(pool.clone());

    if repo.count().await? > 0 {
        info!("API keys already exist - skipping admin key bootstrap");
        return Ok(());
    }

    let api_key = generate_api_key();
    let key_hash = sha256_hex(&api_key);
    // extract_key_prefix always succeeds for generated keys (wr_ + 32 chars)
    let key_prefix = extract_key_prefix(&api_key).unwrap_or(&api_key[..8]);

    let created = repo
        .insert(&config.bootstrap_key_name, key_prefix, &key_hash, true)
        .await?;

    info!(
        api_key_id = created.id,
        key_prefix = %created.key_prefix,
        "Bootstrap admin API key created"
    );

    warn!(
        "SECURITY: Disable WR__ADMIN__BOOTSTRAP_ENABLED after initial setup. \
         Admin API key: {}",
        api_key
    );

    Ok(())
}
