//! Data types exchanged with the data service.
//!
//! Rows are schema-less: each one is an ordered mapping from column name to a
//! scalar value, and the column set is only known once a response arrives.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A database name as reported by the data service.
pub type DatabaseName = String;

/// A table name, unique within its owning database.
pub type TableName = String;

/// A single row. Keys keep the order in which the service returned them.
pub type Row = IndexMap<String, Value>;

/// The table list of one database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseDetail {
    /// Database name.
    pub name: DatabaseName,

    /// Tables in the order the service listed them.
    #[serde(default)]
    pub tables: Vec<TableName>,
}

impl DatabaseDetail {
    /// Creates a detail record with the given tables.
    pub fn new<I, S>(name: impl Into<String>, tables: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            tables: tables.into_iter().map(Into::into).collect(),
        }
    }

    /// Returns true if the database contains the named table.
    pub fn has_table(&self, table: &str) -> bool {
        self.tables.iter().any(|t| t == table)
    }
}

/// An ordered sequence of rows returned by a preview or a query.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RowSet {
    rows: Vec<Row>,
}

impl RowSet {
    /// Creates a row set from the given rows.
    pub fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    /// Creates an empty row set.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Returns the rows.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Returns the number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns true if there are no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the first row, whose keys define the display columns.
    pub fn first(&self) -> Option<&Row> {
        self.rows.first()
    }
}

impl From<Vec<Row>> for RowSet {
    fn from(rows: Vec<Row>) -> Self {
        Self::new(rows)
    }
}

/// A scalar cell value of dynamic type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    /// NULL value.
    #[default]
    Null,

    /// Boolean value.
    Bool(bool),

    /// Any JSON number, integer or floating point.
    Number(serde_json::Number),

    /// Text value.
    String(String),

    /// Nested JSON (object or array), shown as its JSON text.
    Other(serde_json::Value),
}

impl Value {
    /// Returns true if this value is NULL.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the canonical string form used for display.
    pub fn to_display_string(&self) -> String {
        match self {
            Value::Null => "NULL".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.clone(),
            Value::Other(json) => json.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Number(v.into())
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Number(i64::from(v).into())
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        // NaN and infinities have no JSON representation
        serde_json::Number::from_f64(v).map_or(Value::Null, Value::Number)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl<T> From<Option<T>> for Value
where
    T: Into<Value>,
{
    fn from(v: Option<T>) -> Self {
        match v {
            Some(val) => val.into(),
            None => Value::Null,
        }
    }
}

/// Builds a row from `(column, value)` pairs, keeping their order.
pub fn row<I, K, V>(pairs: I) -> Row
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Body of `POST /execute`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryRequest {
    /// Query text, forwarded verbatim to the service.
    pub query: String,

    /// Database to run the query in, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseName>,
}

impl QueryRequest {
    /// Creates an unscoped query request.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            database: None,
        }
    }

    /// Scopes the request to the given database.
    pub fn in_database(mut self, database: Option<DatabaseName>) -> Self {
        self.database = database;
        self
    }
}

/// Health report returned by `GET /health`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthStatus {
    /// Overall service status, e.g. "healthy".
    pub status: String,

    /// Database connectivity, e.g. "connected".
    #[serde(default)]
    pub database: Option<String>,
}

impl HealthStatus {
    /// Returns true if the service reported itself healthy.
    pub fn is_healthy(&self) -> bool {
        self.status.eq_ignore_ascii_case("healthy")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_value_display() {
        assert_eq!(Value::Null.to_display_string(), "NULL");
        assert_eq!(Value::Bool(true).to_display_string(), "true");
        assert_eq!(Value::from(42).to_display_string(), "42");
        assert_eq!(Value::from(2.5).to_display_string(), "2.5");
        assert_eq!(Value::from("hello").to_display_string(), "hello");
    }

    #[test]
    fn test_value_from_conversions() {
        assert_eq!(Value::from(true), Value::Bool(true));
        assert_eq!(Value::from(None::<i64>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::String("x".to_string()));
        assert_eq!(Value::from(f64::NAN), Value::Null);
    }

    #[test]
    fn test_row_preserves_response_key_order() {
        let row: Row = serde_json::from_str(r#"{"zeta": 1, "alpha": null, "mid": "x"}"#).unwrap();
        let keys: Vec<&str> = row.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
        assert_eq!(row["alpha"], Value::Null);
        assert_eq!(row["mid"], Value::from("x"));
    }

    #[test]
    fn test_value_deserializes_each_scalar_kind() {
        let row: Row =
            serde_json::from_str(r#"{"n": null, "b": false, "i": -7, "f": 1.25, "s": "txt"}"#)
                .unwrap();
        assert_eq!(row["n"], Value::Null);
        assert_eq!(row["b"], Value::Bool(false));
        assert_eq!(row["i"].to_display_string(), "-7");
        assert_eq!(row["f"].to_display_string(), "1.25");
        assert_eq!(row["s"], Value::from("txt"));
    }

    #[test]
    fn test_nested_cells_fall_back_to_json_text() {
        let set: RowSet =
            serde_json::from_str(r#"[{"id": 1, "tags": ["a", "b"], "meta": {"k": null}}]"#)
                .unwrap();
        let first = set.first().unwrap();
        assert_eq!(first["id"], Value::from(1));
        assert!(matches!(first["tags"], Value::Other(_)));
        assert_eq!(first["tags"].to_display_string(), r#"["a","b"]"#);
        assert_eq!(first["meta"].to_display_string(), r#"{"k":null}"#);
        assert!(!first["meta"].is_null());
    }

    #[test]
    fn test_row_set_from_json_array() {
        let set: RowSet = serde_json::from_str(r#"[{"a": 1}, {"a": 2}]"#).unwrap();
        assert_eq!(set.len(), 2);
        assert!(!set.is_empty());
        assert_eq!(set.first().unwrap()["a"], Value::from(1));
    }

    #[test]
    fn test_query_request_omits_missing_database() {
        let body = serde_json::to_string(&QueryRequest::new("SELECT 1")).unwrap();
        assert_eq!(body, r#"{"query":"SELECT 1"}"#);

        let scoped = QueryRequest::new("SELECT 1").in_database(Some("shop".to_string()));
        let body = serde_json::to_string(&scoped).unwrap();
        assert_eq!(body, r#"{"query":"SELECT 1","database":"shop"}"#);
    }

    #[test]
    fn test_database_detail_has_table() {
        let detail = DatabaseDetail::new("shop", ["orders", "customers"]);
        assert!(detail.has_table("orders"));
        assert!(!detail.has_table("invoices"));
    }

    #[test]
    fn test_health_status() {
        let health: HealthStatus =
            serde_json::from_str(r#"{"status": "healthy", "database": "connected"}"#).unwrap();
        assert!(health.is_healthy());
        assert_eq!(health.database.as_deref(), Some("connected"));
    }
}
