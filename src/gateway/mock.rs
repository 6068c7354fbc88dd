//! In-memory data gateway for testing and demos.
//!
//! Serves a fixed catalog built up front, counts the calls made against it,
//! and can hold individual responses back until released so tests can
//! control the order in which concurrent requests settle.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

use super::{
    row, DataGateway, DatabaseDetail, DatabaseName, HealthStatus, QueryRequest, RowSet, Value,
};
use crate::error::{AtlasError, Result};

/// Status code used for every simulated service failure.
const MOCK_FAILURE_STATUS: u16 = 500;

/// Calls made against a [`MockGateway`], by operation.
#[derive(Debug, Default)]
struct CallCounts {
    list: AtomicUsize,
    detail: AtomicUsize,
    preview: AtomicUsize,
    query: AtomicUsize,
}

/// A mock data gateway that returns predefined results.
#[derive(Debug, Default)]
pub struct MockGateway {
    databases: Vec<DatabaseName>,
    details: HashMap<String, DatabaseDetail>,
    previews: HashMap<(String, String), RowSet>,
    queries: HashMap<String, RowSet>,
    list_failure: Option<String>,
    failing_details: HashMap<String, String>,
    failing_previews: HashMap<(String, String), String>,
    failing_queries: HashMap<String, Option<String>>,
    preview_holds: HashMap<(String, String), Arc<Notify>>,
    query_hold: Option<Arc<Notify>>,
    panic_on_query: bool,
    calls: CallCounts,
}

impl MockGateway {
    /// Creates an empty mock gateway.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a mock gateway with a small demo catalog.
    pub fn demo() -> Self {
        Self::new()
            .with_database(DatabaseDetail::new("shop", ["customers", "orders"]))
            .with_database(DatabaseDetail::new("analytics", ["events"]))
            .with_database(DatabaseDetail::new("archive", Vec::<String>::new()))
            .with_preview(
                "shop",
                "customers",
                RowSet::new(vec![
                    row([
                        ("id", Value::from(1)),
                        ("name", Value::from("Alice")),
                        ("email", Value::from("alice@example.com")),
                    ]),
                    row([
                        ("id", Value::from(2)),
                        ("name", Value::from("Bob")),
                        ("email", Value::Null),
                    ]),
                ]),
            )
            .with_preview(
                "shop",
                "orders",
                RowSet::new(vec![
                    row([
                        ("id", Value::from(10)),
                        ("customer_id", Value::from(1)),
                        ("total", Value::from(42.5)),
                        ("shipped", Value::from(true)),
                    ]),
                    row([
                        ("id", Value::from(11)),
                        ("customer_id", Value::from(2)),
                        ("total", Value::from(7.25)),
                        ("shipped", Value::from(false)),
                    ]),
                ]),
            )
            .with_preview("analytics", "events", RowSet::empty())
            .with_query("SELECT 1", RowSet::new(vec![row([("1", 1)])]))
            .with_query("UPDATE orders SET shipped = 1", RowSet::empty())
    }

    /// Adds a database and its tables to the catalog.
    pub fn with_database(mut self, detail: DatabaseDetail) -> Self {
        self.databases.push(detail.name.clone());
        self.details.insert(detail.name.clone(), detail);
        self
    }

    /// Sets the preview rows of a table.
    pub fn with_preview(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        rows: RowSet,
    ) -> Self {
        self.previews.insert((database.into(), table.into()), rows);
        self
    }

    /// Sets the result of a query, matched on its trimmed text.
    pub fn with_query(mut self, query: impl Into<String>, rows: RowSet) -> Self {
        self.queries.insert(query.into().trim().to_string(), rows);
        self
    }

    /// Makes the database listing fail.
    pub fn with_list_failure(mut self, detail: impl Into<String>) -> Self {
        self.list_failure = Some(detail.into());
        self
    }

    /// Makes the detail fetch of a database fail.
    pub fn with_detail_failure(mut self, database: impl Into<String>, detail: impl Into<String>) -> Self {
        self.failing_details.insert(database.into(), detail.into());
        self
    }

    /// Makes the preview of a table fail.
    pub fn with_preview_failure(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        self.failing_previews
            .insert((database.into(), table.into()), detail.into());
        self
    }

    /// Makes a query fail, with or without a service-provided detail.
    pub fn with_query_failure(mut self, query: impl Into<String>, detail: Option<String>) -> Self {
        self.failing_queries
            .insert(query.into().trim().to_string(), detail);
        self
    }

    /// Holds the preview of a table back until `release` is notified.
    pub fn with_preview_hold(
        mut self,
        database: impl Into<String>,
        table: impl Into<String>,
        release: Arc<Notify>,
    ) -> Self {
        self.preview_holds
            .insert((database.into(), table.into()), release);
        self
    }

    /// Holds every query back until `release` is notified.
    pub fn with_query_hold(mut self, release: Arc<Notify>) -> Self {
        self.query_hold = Some(release);
        self
    }

    /// Makes query execution panic, simulating a fault while handling the response.
    pub fn with_query_panic(mut self) -> Self {
        self.panic_on_query = true;
        self
    }

    /// Number of `list_databases` calls made so far.
    pub fn list_calls(&self) -> usize {
        self.calls.list.load(Ordering::SeqCst)
    }

    /// Number of `database_detail` calls made so far.
    pub fn detail_calls(&self) -> usize {
        self.calls.detail.load(Ordering::SeqCst)
    }

    /// Number of `table_preview` calls made so far.
    pub fn preview_calls(&self) -> usize {
        self.calls.preview.load(Ordering::SeqCst)
    }

    /// Number of `execute_query` calls made so far.
    pub fn query_calls(&self) -> usize {
        self.calls.query.load(Ordering::SeqCst)
    }

    fn failure(detail: impl Into<String>) -> AtlasError {
        AtlasError::service(MOCK_FAILURE_STATUS, Some(detail.into()))
    }
}

#[async_trait]
impl DataGateway for MockGateway {
    async fn list_databases(&self) -> Result<Vec<DatabaseName>> {
        self.calls.list.fetch_add(1, Ordering::SeqCst);

        match &self.list_failure {
            Some(detail) => Err(Self::failure(detail.clone())),
            None => Ok(self.databases.clone()),
        }
    }

    async fn database_detail(&self, database: &str) -> Result<DatabaseDetail> {
        self.calls.detail.fetch_add(1, Ordering::SeqCst);

        if let Some(detail) = self.failing_details.get(database) {
            return Err(Self::failure(detail.clone()));
        }

        self.details
            .get(database)
            .cloned()
            .ok_or_else(|| Self::failure(format!("Unknown database '{}'", database)))
    }

    async fn table_preview(&self, database: &str, table: &str) -> Result<RowSet> {
        self.calls.preview.fetch_add(1, Ordering::SeqCst);

        let key = (database.to_string(), table.to_string());
        if let Some(release) = self.preview_holds.get(&key) {
            release.notified().await;
        }

        if let Some(detail) = self.failing_previews.get(&key) {
            return Err(Self::failure(detail.clone()));
        }

        self.previews.get(&key).cloned().ok_or_else(|| {
            Self::failure(format!("Table '{}.{}' doesn't exist", database, table))
        })
    }

    async fn execute_query(&self, request: &QueryRequest) -> Result<RowSet> {
        self.calls.query.fetch_add(1, Ordering::SeqCst);

        if let Some(release) = &self.query_hold {
            release.notified().await;
        }

        if self.panic_on_query {
            panic!("mock gateway fault while executing {:?}", request.query);
        }

        let query = request.query.trim();
        if let Some(detail) = self.failing_queries.get(query) {
            return Err(AtlasError::service(MOCK_FAILURE_STATUS, detail.clone()));
        }

        self.queries.get(query).cloned().ok_or_else(|| {
            Self::failure(format!("Mock gateway has no result for query: {}", query))
        })
    }

    async fn health(&self) -> Result<HealthStatus> {
        Ok(HealthStatus {
            status: "healthy".to_string(),
            database: Some("connected".to_string()),
        })
    }
}
