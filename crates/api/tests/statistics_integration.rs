//! Integration tests for the statistics endpoint.

mod common;

use axum::http::{Method, StatusCode};
use common::{
    cleanup_all_test_data, create_test_api_key, create_test_app, create_test_pool, get_request,
    get_request_with_api_key, json_request_with_api_key, parse_response_body,
    register_test_warranty, run_migrations, test_config, TestAsset,
};
use serial_test::serial;
use tower::ServiceExt;

#[tokio::test]
#[serial]
async fn test_statistics_requires_api_key() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());

    let response = app
        .clone()
        .oneshot(get_request("/api/v1/warranties/statistics"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[serial]
async fn test_statistics_zero_filled_when_empty() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let api_key = create_test_api_key(&pool, "Staff key").await;

    let request = get_request_with_api_key("/api/v1/warranties/statistics", &api_key);
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = parse_response_body(response).await;
    assert_eq!(body["total_registrations"], 0);
    // All five statuses are present even with no data
    for status in ["pending", "registered", "expired", "claimed", "void"] {
        assert_eq!(body["by_status"][status], 0, "missing zero for {status}");
    }
    assert_eq!(body["expiring_soon"], 0);
    assert_eq!(body["by_department"].as_array().unwrap().len(), 0);
}

#[tokio::test]
#[serial]
async fn test_statistics_counts_sum_to_total() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let api_key = create_test_api_key(&pool, "Staff key").await;

    let registrations: Vec<_> = {
        let mut out = Vec::new();
        for i in 0..4 {
            let asset = TestAsset::new().with_department(if i < 3 { "IT" } else { "" });
            out.push(register_test_warranty(&app, &asset).await);
        }
        out
    };

    // Move one to claimed and one to void
    for (body, status) in [(&registrations[0], "claimed"), (&registrations[1], "void")] {
        let request = json_request_with_api_key(
            Method::POST,
            &format!(
                "/api/v1/warranties/{}/status",
                body["warranty_id"].as_i64().unwrap()
            ),
            serde_json::json!({"status": status}),
            &api_key,
        );
        app.clone().oneshot(request).await.unwrap();
    }

    let request = get_request_with_api_key("/api/v1/warranties/statistics", &api_key);
    let body = parse_response_body(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(body["total_registrations"], 4);
    assert_eq!(body["by_status"]["registered"], 2);
    assert_eq!(body["by_status"]["claimed"], 1);
    assert_eq!(body["by_status"]["void"], 1);

    let sum: i64 = ["pending", "registered", "expired", "claimed", "void"]
        .iter()
        .map(|s| body["by_status"][*s].as_i64().unwrap())
        .sum();
    assert_eq!(sum, body["total_registrations"].as_i64().unwrap());

    // Empty departments are excluded from the breakdown
    let departments = body["by_department"].as_array().unwrap();
    assert_eq!(departments.len(), 1);
    assert_eq!(departments[0]["department"], "IT");
    assert_eq!(departments[0]["count"], 3);
}

#[tokio::test]
#[serial]
async fn test_statistics_expiring_soon_only_counts_registered() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    let app = create_test_app(test_config(), pool.clone());
    let api_key = create_test_api_key(&pool, "Staff key").await;

    let in_window = register_test_warranty(&app, &TestAsset::new()).await;
    let outside = register_test_warranty(&app, &TestAsset::new()).await;
    let voided = register_test_warranty(&app, &TestAsset::new()).await;

    for (body, days) in [(&in_window, 15), (&outside, 45), (&voided, 15)] {
        sqlx::query(
            "UPDATE warranty_registrations SET warranty_end_date = CURRENT_DATE + $2 WHERE id = $1",
        )
        .bind(body["warranty_id"].as_i64().unwrap())
        .bind(days)
        .execute(&pool)
        .await
        .unwrap();
    }
    sqlx::query("UPDATE warranty_registrations SET status = 'void' WHERE id = $1")
        .bind(voided["warranty_id"].as_i64().unwrap())
        .execute(&pool)
        .await
        .unwrap();

    let request = get_request_with_api_key("/api/v1/warranties/statistics", &api_key);
    let body = parse_response_body(app.clone().oneshot(request).await.unwrap()).await;

    assert_eq!(body["expiring_soon"], 1);
}

#[tokio::test]
#[serial]
async fn test_statistics_are_cached_within_ttl() {
    let pool = create_test_pool().await;
    run_migrations(&pool).await;
    cleanup_all_test_data(&pool).await;

    // A single app instance holds one cache
    let app = create_test_app(test_config(), pool.clone());
    let api_key = create_test_api_key(&pool, "Staff key").await;

    register_test_warranty(&app, &TestAsset::new()).await;

    let request = get_request_with_api_key("/api/v1/warranties/statistics", &api_key);
    let first = parse_response_body(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(first["total_registrations"], 1);
    assert!(first["cache_expires_at"].is_string());

    // A write after the aggregate was cached is not visible within the TTL
    register_test_warranty(&app, &TestAsset::new()).await;

    let request = get_request_with_api_key("/api/v1/warranties/statistics", &api_key);
    let second = parse_response_body(app.clone().oneshot(request).await.unwrap()).await;
    assert_eq!(second["total_registrations"], 1);
    assert_eq!(second["generated_at"], first["generated_at"]);
}
