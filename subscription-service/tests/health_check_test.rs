mod common;

use common::{subscription_body, TestApp, TEST_USER_ID};
use serde_json::Value;

#[tokio::test]
async fn health_check_works() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .send()
        .await
        .expect("Failed to execute request");

    assert!(response.status().is_success());
    let body: Value = response.json().await.unwrap();
    assert_eq!(body["status"], "ok");
    assert_eq!(body["service"], "subscription-service-test");
}

#[tokio::test]
async fn readiness_check_works() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/ready")).send().await.unwrap();

    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn request_id_is_echoed_or_generated() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/health"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(response.headers()["x-request-id"], "trace-me");

    let response = app.client.get(app.url("/health")).send().await.unwrap();
    let generated = response.headers()["x-request-id"].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn metrics_expose_subscription_counters() {
    let app = TestApp::spawn().await;
    app.create_subscription(subscription_body("A", 100, TEST_USER_ID, "01-2024", None))
        .await;

    let response = app.client.get(app.url("/metrics")).send().await.unwrap();

    assert_eq!(response.status(), 200);
    let body = response.text().await.unwrap();
    assert!(body.contains("subscriptions_operations_total"));
    assert!(body.contains("http_requests_total"));
}

#[tokio::test]
async fn total_cost_parameter_errors_are_counted() {
    let app = TestApp::spawn().await;

    let response = app.total_cost(&[("start_month", "1")]).await;
    assert_eq!(response.status(), 400);

    let body = app
        .client
        .get(app.url("/metrics"))
        .send()
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.lines().any(|line| {
        line.starts_with("subscriptions_errors_total")
            && line.contains(r#"error_type="bad_request""#)
            && line.contains(r#"operation="total_cost""#)
    }));
}

#[tokio::test]
async fn openapi_document_lists_subscription_routes() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/api-docs/openapi.json"))
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(response.status(), 200);

    let doc: Value = response.json().await.unwrap();
    let paths = doc["paths"].as_object().expect("paths object");
    for path in [
        "/subscriptions",
        "/subscriptions/{id}",
        "/subscriptions/total-cost",
        "/health",
    ] {
        assert!(paths.contains_key(path), "missing {}", path);
    }
    assert!(paths["/subscriptions"]["post"].is_object());
    assert!(paths["/subscriptions/{id}"]["delete"].is_object());
    assert!(doc["components"]["schemas"]["SubscriptionRequest"].is_object());
}

#[tokio::test]
async fn swagger_ui_is_served() {
    let app = TestApp::spawn().await;

    let response = app
        .client
        .get(app.url("/swagger/"))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status(), 200);
}
