//! Request extractors.

pub mod api_key;
pub mod request_meta;

pub use api_key::{ApiKeyAuth, OptionalApiKeyAuth};
pub use request_meta::RequestMeta;

use domain::models::AuditContext;

/// Builds the audit context for a mutation from the authenticated key (if
/// any) and the request metadata.
pub fn audit_context(auth: Option<&ApiKeyAuth>, meta: RequestMeta) -> AuditContext {
    AuditContext {
        performed_by_key_id: auth.map(|a| a.api_key_id),
        performed_by_name: auth.map(|a| a.name.clone()),
        ip_address: meta.ip_address,
        user_agent: meta.user_agent,
    }
}
