//! HTTP implementation of the data service gateway.
//!
//! Talks to the data service over its JSON contract:
//! `GET /databases`, `GET /database/{db}`, `GET /table/{db}/{table}`,
//! `POST /execute` and `GET /health`.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;
use url::Url;

use super::{DataGateway, DatabaseDetail, DatabaseName, HealthStatus, QueryRequest, RowSet};
use crate::config::GatewayConfig;
use crate::error::{AtlasError, Result};

/// Response body of `GET /table/{db}/{table}`.
#[derive(Debug, Deserialize)]
struct PreviewResponse {
    data: RowSet,
}

/// Response body of `POST /execute`.
#[derive(Debug, Deserialize)]
struct ExecuteResponse {
    results: RowSet,
}

/// Error body returned by the service on failure.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    detail: serde_json::Value,
}

/// Data service client over HTTP.
#[derive(Debug, Clone)]
pub struct HttpGateway {
    base_url: Url,
    client: Client,
}

impl HttpGateway {
    /// Creates a new gateway with the given configuration.
    pub fn new(config: &GatewayConfig) -> Result<Self> {
        let base_url = config.parsed_url()?;

        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        let client = builder
            .build()
            .map_err(|e| AtlasError::internal(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { base_url, client })
    }

    /// Returns the base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Builds an endpoint URL, percent-encoding each path segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AtlasError::config(format!("Cannot use {} as a base URL", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Sends a request and decodes a successful JSON body.
    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                AtlasError::connection("Request to the data service timed out")
            } else if e.is_connect() {
                AtlasError::connection(format!(
                    "Failed to connect to the data service at {}. Is it running?",
                    self.base_url
                ))
            } else {
                AtlasError::connection(format!("Request failed: {}", e))
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AtlasError::connection(format!("Failed to read response: {}", e)))?;

        if !status.is_success() {
            debug!("Data service returned {}: {}", status, body);
            return Err(AtlasError::service(status.as_u16(), extract_detail(status, &body)));
        }

        serde_json::from_str(&body)
            .map_err(|e| AtlasError::decode(format!("Failed to parse response: {}", e)))
    }
}

/// Extracts the human-readable failure detail from an error body.
///
/// A string `detail` is used verbatim, any other non-null detail (such as a
/// list of validation errors) as its JSON text. Bodies that are not JSON
/// yield no detail.
fn extract_detail(status: StatusCode, body: &str) -> Option<String> {
    let parsed: ErrorBody = match serde_json::from_str(body) {
        Ok(parsed) => parsed,
        Err(_) => {
            debug!("Non-JSON error body for status {}", status);
            return None;
        }
    };

    match parsed.detail {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) if s.is_empty() => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    }
}

#[async_trait]
impl DataGateway for HttpGateway {
    async fn list_databases(&self) -> Result<Vec<DatabaseName>> {
        let url = self.endpoint(&["databases"])?;
        self.send(self.client.get(url)).await
    }

    async fn database_detail(&self, database: &str) -> Result<DatabaseDetail> {
        let url = self.endpoint(&["database", database])?;
        self.send(self.client.get(url)).await
    }

    async fn table_preview(&self, database: &str, table: &str) -> Result<RowSet> {
        let url = self.endpoint(&["table", database, table])?;
        let response: PreviewResponse = self.send(self.client.get(url)).await?;
        Ok(response.data)
    }

    async fn execute_query(&self, request: &QueryRequest) -> Result<RowSet> {
        let url = self.endpoint(&["execute"])?;
        let response: ExecuteResponse = self.send(self.client.post(url).json(request)).await?;
        Ok(response.results)
    }

    async fn health(&self) -> Result<HealthStatus> {
        let url = self.endpoint(&["health"])?;
        self.send(self.client.get(url)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gateway(url: &str) -> HttpGateway {
        HttpGateway::new(&GatewayConfig::new(url)).unwrap()
    }

    #[test]
    fn test_endpoint_joins_segments() {
        let gw = gateway("http://localhost:8000");
        let url = gw.endpoint(&["table", "shop", "orders"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/table/shop/orders");
    }

    #[test]
    fn test_endpoint_keeps_base_path_prefix() {
        let gw = gateway("http://localhost:8000/api/");
        let url = gw.endpoint(&["databases"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/databases");
    }

    #[test]
    fn test_endpoint_percent_encodes_names() {
        let gw = gateway("http://localhost:8000");
        let url = gw.endpoint(&["database", "my db/x"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/database/my%20db%2Fx");
    }

    #[test]
    fn test_extract_detail_string() {
        let detail = extract_detail(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"detail": "Table 'shop.nope' doesn't exist"}"#,
        );
        assert_eq!(detail.as_deref(), Some("Table 'shop.nope' doesn't exist"));
    }

    #[test]
    fn test_extract_detail_structured() {
        let detail = extract_detail(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail": [{"loc": ["body", "query"], "msg": "field required"}]}"#,
        )
        .unwrap();
        assert!(detail.contains("field required"));
    }

    #[test]
    fn test_extract_detail_missing_or_invalid() {
        assert_eq!(extract_detail(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"), None);
        assert_eq!(extract_detail(StatusCode::INTERNAL_SERVER_ERROR, "{}"), None);
        assert_eq!(
            extract_detail(StatusCode::INTERNAL_SERVER_ERROR, r#"{"detail": ""}"#),
            None
        );
    }
}
