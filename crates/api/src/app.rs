use axum::{
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::Config;
use crate::middleware::{
    metrics_handler, metrics_middleware, require_auth, security_headers_middleware, trace_id,
};
use crate::routes::{audit_logs, health, statistics, sync, warranties};
use crate::services::StatisticsCache;

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Arc<Config>,
    pub stats_cache: Arc<StatisticsCache>,
}

pub fn create_app(config: Config, pool: PgPool) -> Router {
    let config = Arc::new(config);
    let stats_cache = Arc::new(StatisticsCache::new(config.cache.statistics_ttl_secs));

    let state = AppState {
        pool,
        config: config.clone(),
        stats_cache,
    };

    // Build CORS layer based on configuration
    let cors = if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        use tower_http::cors::AllowOrigin;
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    };

    // External-application routes. No authentication is required; the
    // registration handler attributes the action to a key when a valid one
    // happens to be presented.
    let external_routes = Router::new()
        .route("/api/v1/warranty/register", post(warranties::register_warranty))
        .route("/api/v1/warranty/check/:asset_id", get(warranties::check_warranty))
        .route("/api/v1/sync/departments", post(sync::sync_departments))
        .route("/api/v1/sync/categories", post(sync::sync_categories))
        .route("/api/v1/sync/profiles", post(sync::sync_profiles));

    // Management routes for staff tooling (require API key authentication)
    let management_routes = Router::new()
        .route("/api/v1/warranties", get(warranties::list_warranties))
        .route("/api/v1/warranties/statistics", get(statistics::get_statistics))
        .route("/api/v1/warranties/expiring", get(warranties::list_expiring))
        .route("/api/v1/warranties/:warranty_id", get(warranties::get_warranty))
        .route(
            "/api/v1/warranties/:warranty_id/status",
            post(warranties::update_status),
        )
        .route(
            "/api/v1/warranties/:warranty_id/audit-logs",
            get(audit_logs::list_warranty_audit_logs),
        )
        .route("/api/v1/audit-logs", get(audit_logs::list_audit_logs))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth));

    // Public routes (no authentication required)
    let public_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/ready", get(health::ready))
        .route("/api/health/live", get(health::live))
        .route("/metrics", get(metrics_handler));

    // Merge all routes
    Router::new()
        .merge(public_routes)
        .merge(external_routes)
        .merge(management_routes)
        // Global middleware (order matters: bottom layers run first)
        .layer(middleware::from_fn(security_headers_middleware))
        .layer(CompressionLayer::new())
        .layer(TimeoutLayer::new(Duration::from_secs(
            config.server.request_timeout_secs,
        )))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
