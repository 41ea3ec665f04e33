//! End-to-end tests: inbound request → router → REST adapter → mock provider.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use spay_api::state::{AppConfig, AppState};
use spay_provider_client::{CredentialCache, ProviderConfig, RestShopperPaymentsAdapter};

async fn app_against(server: &MockServer) -> axum::Router {
    let config = ProviderConfig::local_mock(&server.uri(), "provider-key").unwrap();
    let adapter =
        RestShopperPaymentsAdapter::from_config(&config, Arc::new(CredentialCache::new())).unwrap();
    spay_api::app(AppState::new(Arc::new(adapter), AppConfig::default()))
}

async fn read_json(response: axum::http::Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn card_balance_flows_through_to_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/cards/ISS-7/balance"))
        .and(header("x-api-key", "provider-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"balance": 42})))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_against(&server)
        .await
        .oneshot(
            Request::builder()
                .uri("/card/ISS-7/balance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await, json!({"balance": 42}));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn provider_401_is_retried_once_transparently() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cards/ISS-7/load"))
        .respond_with(ResponseTemplate::new(401))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/cards/ISS-7/load"))
        .and(body_json(json!({"amount": "5.00"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "COMPLETED"})))
        .expect(1)
        .mount(&server)
        .await;

    let response = app_against(&server)
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/card/ISS-7/load")
                .header("content-type", "application/json")
                .body(Body::from(json!({"amount": "5.00"}).to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(read_json(response).await["status"], "COMPLETED");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn provider_rejection_becomes_error_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/cards/ISS-7/activate"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"detail": "card already active"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = app_against(&server)
        .await
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/card/ISS-7/activate")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        read_json(response).await,
        json!({
            "status": "FAILED",
            "data": null,
            "error_details": [{"code": "400", "message": {"detail": "card already active"}}]
        })
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn empty_provider_success_is_reported_as_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/wallet/balance"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let response = app_against(&server)
        .await
        .oneshot(
            Request::builder()
                .uri("/wallet/balance")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(read_json(response).await["error_details"][0]["code"], "404");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn external_health_follows_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let response = app_against(&server)
        .await
        .oneshot(
            Request::builder()
                .uri("/external_health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
