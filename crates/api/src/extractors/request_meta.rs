//! Request metadata extractor for audit logging.
//!
//! Captures the client IP (honouring X-Forwarded-For) and the user agent,
//! the request-origin fields recorded with every audit entry.

use axum::{async_trait, extract::FromRequestParts, http::header, http::request::Parts, http::HeaderMap};
use std::convert::Infallible;
use std::net::IpAddr;

/// Stored user agents are capped at the audit column width.
const MAX_USER_AGENT_LEN: usize = 500;

/// Client metadata recorded in the audit trail.
#[derive(Debug, Clone, Default)]
pub struct RequestMeta {
    pub ip_address: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMeta {
    /// Extracts metadata from request headers.
    ///
    /// The first entry of `X-Forwarded-For` wins, then `X-Real-IP`. Values
    /// that do not parse as an IP address are discarded rather than stored.
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let forwarded = headers
            .get("X-Forwarded-For")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim);

        let real_ip = headers.get("X-Real-IP").and_then(|v| v.to_str().ok());

        let ip_address = forwarded
            .or(real_ip)
            .and_then(|s| s.parse::<IpAddr>().ok())
            .map(|ip| ip.to_string());

        let user_agent = headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| {
                if ua.chars().count() > MAX_USER_AGENT_LEN {
                    ua.chars().take(MAX_USER_AGENT_LEN).collect()
                } else {
                    ua.to_string()
                }
            });

        Self {
            ip_address,
            user_agent,
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for RequestMeta
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let meta = RequestMeta::from_headers(&headers(&[(
            "x-forwarded-for",
            "203.0.113.7, 10.0.0.1",
        )]));
        assert_eq!(meta.ip_address.as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_real_ip_fallback() {
        let meta = RequestMeta::from_headers(&headers(&[("x-real-ip", "198.51.100.4")]));
        assert_eq!(meta.ip_address.as_deref(), Some("198.51.100.4"));
    }

    #[test]
    fn test_invalid_ip_is_discarded() {
        let meta = RequestMeta::from_headers(&headers(&[("x-forwarded-for", "not-an-ip")]));
        assert!(meta.ip_address.is_none());
    }

    #[test]
    fn test_user_agent_is_truncated() {
        let long_agent = "a".repeat(600);
        let meta = RequestMeta::from_headers(&headers(&[("user-agent", long_agent.as_str())]));
        assert_eq!(meta.user_agent.unwrap().len(), 500);
    }

    #[test]
    fn test_empty_headers() {
        let meta = RequestMeta::from_headers(&HeaderMap::new());
        assert!(meta.ip_address.is_none());
        assert!(meta.user_agent.is_none());
    }
}
