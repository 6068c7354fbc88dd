//! HTTP gateway integration tests.
//!
//! Runs the gateway against a local wiremock server speaking the data
//! service's JSON contract.

use db_atlas::config::GatewayConfig;
use db_atlas::error::AtlasError;
use db_atlas::gateway::{DataGateway, HttpGateway, QueryRequest, Value};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::time::Duration;
use wiremock::{
    matchers::{body_json, method, path},
    Mock, MockServer, ResponseTemplate,
};

fn gateway(server: &MockServer) -> HttpGateway {
    HttpGateway::new(&GatewayConfig::new(server.uri())).unwrap()
}

async fn mock_get(server: &MockServer, route: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_databases() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/databases",
        ResponseTemplate::new(200).set_body_json(json!(["shop", "analytics"])),
    )
    .await;

    let databases = gateway(&server).list_databases().await.unwrap();
    assert_eq!(databases, vec!["shop", "analytics"]);
}

#[tokio::test]
async fn test_database_detail() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/database/shop",
        ResponseTemplate::new(200)
            .set_body_json(json!({"name": "shop", "tables": ["customers", "orders"]})),
    )
    .await;

    let detail = gateway(&server).database_detail("shop").await.unwrap();
    assert_eq!(detail.name, "shop");
    assert_eq!(detail.tables, vec!["customers", "orders"]);
}

#[tokio::test]
async fn test_names_are_percent_encoded() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/table/sales%20eu/order%2Flines",
        ResponseTemplate::new(200).set_body_json(json!({"data": []})),
    )
    .await;

    let rows = gateway(&server)
        .table_preview("sales eu", "order/lines")
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_table_preview_keeps_column_order() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/table/shop/customers",
        ResponseTemplate::new(200).set_body_string(
            r#"{"data": [{"zeta": 1, "alpha": "x", "mid": null, "flag": true}]}"#,
        ),
    )
    .await;

    let rows = gateway(&server)
        .table_preview("shop", "customers")
        .await
        .unwrap();
    let first = rows.first().unwrap();
    let keys: Vec<&str> = first.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["zeta", "alpha", "mid", "flag"]);
    assert_eq!(first["mid"], Value::Null);
    assert_eq!(first["flag"], Value::Bool(true));
}

#[tokio::test]
async fn test_execute_sends_database() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_json(json!({"query": "SELECT 1", "database": "shop"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{"1": 1}]})))
        .expect(1)
        .mount(&server)
        .await;

    let request = QueryRequest::new("SELECT 1").in_database(Some("shop".to_string()));
    let rows = gateway(&server).execute_query(&request).await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn test_execute_omits_missing_database() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .and(body_json(json!({"query": "UPDATE t SET x = 1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": []})))
        .expect(1)
        .mount(&server)
        .await;

    let rows = gateway(&server)
        .execute_query(&QueryRequest::new("UPDATE t SET x = 1"))
        .await
        .unwrap();
    assert!(rows.is_empty());
}

#[tokio::test]
async fn test_service_error_carries_detail() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/execute"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"detail": "syntax error near SELECT"})),
        )
        .mount(&server)
        .await;

    let err = gateway(&server)
        .execute_query(&QueryRequest::new("SELEC 1"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        AtlasError::service(500, Some("syntax error near SELECT".to_string()))
    );
    assert_eq!(err.detail(), Some("syntax error near SELECT"));
}

#[tokio::test]
async fn test_service_error_without_json_body() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/databases",
        ResponseTemplate::new(502).set_body_string("Bad Gateway"),
    )
    .await;

    let err = gateway(&server).list_databases().await.unwrap_err();
    assert_eq!(err, AtlasError::service(502, None));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/database/shop",
        ResponseTemplate::new(200).set_body_json(json!({"tables": "not a list"})),
    )
    .await;

    let err = gateway(&server).database_detail("shop").await.unwrap_err();
    assert!(matches!(err, AtlasError::Decode(_)));
}

#[tokio::test]
async fn test_timeout_is_connection_error() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/databases",
        ResponseTemplate::new(200)
            .set_body_json(json!([]))
            .set_delay(Duration::from_secs(3)),
    )
    .await;

    let config = GatewayConfig::new(server.uri()).with_timeout(Some(1));
    let err = HttpGateway::new(&config)
        .unwrap()
        .list_databases()
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::Connection(_)));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    mock_get(
        &server,
        "/health",
        ResponseTemplate::new(200).set_body_json(json!({"status": "healthy", "database": "connected"})),
    )
    .await;

    let health = gateway(&server).health().await.unwrap();
    assert!(health.is_healthy());
    assert_eq!(health.database.as_deref(), Some("connected"));
}

#[tokio::test]
async fn test_unreachable_service_is_connection_error() {
    // Nothing listens on the discard port
    let config = GatewayConfig::new("http://127.0.0.1:9");
    let err = HttpGateway::new(&config)
        .unwrap()
        .list_databases()
        .await
        .unwrap_err();
    assert!(matches!(err, AtlasError::Connection(_)));
}
