//! Integration tests for `CatalogClient::fetch_products`.
//!
//! Uses `wiremock` to stand up a local HTTP server for each test so no real
//! network traffic is made.

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use shopfeed_catalog::{CatalogClient, CatalogError};

/// 5-second timeout, descriptive UA, no retries.
fn test_client() -> CatalogClient {
    CatalogClient::new(5, "shopfeed-test/0.1", 0, 0).expect("failed to build test CatalogClient")
}

fn catalog_json() -> serde_json::Value {
    json!({
        "products": [
            {
                "id": 1,
                "name": "Canvas Sneaker",
                "category": "Shoes",
                "subCategory": "Sneakers",
                "sellingPrice": "49.00",
                "listPrice": "59.00",
                "trending": true,
                "variants": [
                    {"color": "white", "images": ["https://cdn.example.com/w1.jpg"], "sizes": [{"size": "9", "stock": 2}]},
                    {"color": "black", "images": ["https://cdn.example.com/b1.jpg"], "sizes": []}
                ]
            },
            {
                "id": "bag-7",
                "name": "Tote",
                "category": "Bags",
                "variants": null
            }
        ]
    })
}

#[tokio::test]
async fn fetch_products_normalizes_listing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    let products = test_client().fetch_products(&url).await.unwrap();

    assert_eq!(products.len(), 2);
    assert_eq!(products[0].id, "1");
    assert_eq!(products[0].variants.len(), 2);
    assert_eq!(products[0].variants[0].size_hint(), Some("9"));
    assert!(products[0].trending);
    assert_eq!(products[1].id, "bag-7");
    assert!(products[1].variants.is_empty());
}

#[tokio::test]
async fn fetch_products_accepts_bare_array_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a"}])))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    let products = test_client().fetch_products(&url).await.unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0].id, "a");
}

#[tokio::test]
async fn fetch_products_propagates_rate_limit_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "30"))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    match test_client().fetch_products(&url).await.unwrap_err() {
        CatalogError::RateLimited {
            retry_after_secs, ..
        } => assert_eq!(retry_after_secs, 30),
        other => panic!("expected CatalogError::RateLimited, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_products_retries_rate_limit_then_succeeds() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "0"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_json(catalog_json()))
        .mount(&server)
        .await;

    let client = CatalogClient::new(5, "shopfeed-test/0.1", 2, 0).unwrap();
    let url = format!("{}/api/products", server.uri());
    let products = client.fetch_products(&url).await.unwrap();
    assert_eq!(products.len(), 2);
}

#[tokio::test]
async fn fetch_products_propagates_not_found_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    let err = test_client().fetch_products(&url).await.unwrap_err();
    assert!(
        matches!(err, CatalogError::NotFound { .. }),
        "expected NotFound, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_products_propagates_unexpected_status_for_5xx() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    match test_client().fetch_products(&url).await.unwrap_err() {
        CatalogError::UnexpectedStatus { status, .. } => assert_eq!(status, 503),
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}

#[tokio::test]
async fn fetch_products_invalid_json_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/products"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .mount(&server)
        .await;

    let url = format!("{}/api/products", server.uri());
    let err = test_client().fetch_products(&url).await.unwrap_err();
    assert!(
        matches!(err, CatalogError::Deserialize { .. }),
        "expected Deserialize, got: {err:?}"
    );
}

#[tokio::test]
async fn fetch_products_rejects_invalid_url_without_request() {
    let err = test_client().fetch_products("not-a-url").await.unwrap_err();
    assert!(matches!(err, CatalogError::InvalidUrl { .. }));
}
