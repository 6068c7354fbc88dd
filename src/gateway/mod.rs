//! Data service gateway for Atlas.
//!
//! All network I/O goes through the [`DataGateway`] trait. Components never
//! talk to the network themselves; they issue typed requests and receive
//! typed responses or an [`AtlasError`](crate::error::AtlasError).

mod http;
mod mock;
mod types;

pub use http::HttpGateway;
pub use mock::MockGateway;
pub use types::{
    row, DatabaseDetail, DatabaseName, HealthStatus, QueryRequest, Row, RowSet, TableName, Value,
};

use crate::error::Result;
use async_trait::async_trait;

/// Trait defining the operations exposed by the remote data service.
///
/// Implementations must be shareable across spawned tasks.
#[async_trait]
pub trait DataGateway: Send + Sync {
    /// Lists every database known to the service.
    async fn list_databases(&self) -> Result<Vec<DatabaseName>>;

    /// Fetches the table list of one database.
    async fn database_detail(&self, database: &str) -> Result<DatabaseDetail>;

    /// Fetches the preview rows of one table.
    async fn table_preview(&self, database: &str, table: &str) -> Result<RowSet>;

    /// Executes a free-form query.
    async fn execute_query(&self, request: &QueryRequest) -> Result<RowSet>;

    /// Reports service and database health.
    async fn health(&self) -> Result<HealthStatus>;
}
