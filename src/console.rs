//! Query console state machine.
//!
//! Owns the query buffer and a single execution slot. Like the catalog
//! explorer it performs no I/O: [`QueryConsole::begin_execute`] hands out a
//! ticket carrying the request, and the outcome is merged back with
//! [`QueryConsole::finish`].

use tracing::{debug, info};

use crate::error::Result;
use crate::gateway::{DatabaseName, QueryRequest, RowSet};

/// Message shown when a query succeeds without returning rows.
pub const EMPTY_RESULT_MESSAGE: &str = "Query executed successfully";

/// Message shown when a query fails without a service-provided detail.
pub const GENERIC_FAILURE_MESSAGE: &str = "Error executing query";

/// Status of the execution slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExecutionStatus {
    /// Nothing has run yet.
    #[default]
    Idle,
    /// A query is in flight.
    Running,
    /// The last query succeeded.
    Succeeded,
    /// The last query failed.
    Failed,
}

impl ExecutionStatus {
    /// Returns a short label for status displays.
    pub fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

/// The single, overwritten execution slot.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QueryExecution {
    /// Query text that was submitted.
    pub query_text: String,
    /// Current status.
    pub status: ExecutionStatus,
    /// Rows of the last successful run.
    pub rows: Option<RowSet>,
    /// Informational or error message of the last run.
    pub message: Option<String>,
}

/// Ticket for an in-flight execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecuteTicket {
    run: u64,
    request: QueryRequest,
}

impl ExecuteTicket {
    /// Request to send to the data service.
    pub fn request(&self) -> &QueryRequest {
        &self.request
    }
}

/// Query console state.
#[derive(Debug, Default)]
pub struct QueryConsole {
    buffer: String,
    target_database: Option<DatabaseName>,
    execution: QueryExecution,
    runs: u64,
}

impl QueryConsole {
    /// Creates an empty console.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the query buffer. No validation happens client-side.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.buffer = text.into();
    }

    /// Current query buffer.
    pub fn query_text(&self) -> &str {
        &self.buffer
    }

    /// Sets the database subsequent queries run in.
    pub fn set_target_database(&mut self, database: Option<DatabaseName>) {
        self.target_database = database;
    }

    /// Database subsequent queries run in.
    pub fn target_database(&self) -> Option<&str> {
        self.target_database.as_deref()
    }

    /// Returns true if `begin_execute` would start a run.
    pub fn can_execute(&self) -> bool {
        !self.is_running() && !self.buffer.trim().is_empty()
    }

    /// Returns true while a query is in flight.
    pub fn is_running(&self) -> bool {
        self.execution.status == ExecutionStatus::Running
    }

    /// Starts an execution of the current buffer.
    ///
    /// Returns `None` without changing anything if the buffer is blank or a
    /// query is already running. Previous rows stay visible until the new
    /// run settles; the previous message is cleared.
    pub fn begin_execute(&mut self) -> Option<ExecuteTicket> {
        if !self.can_execute() {
            debug!(
                "Execute ignored (status: {})",
                self.execution.status.label()
            );
            return None;
        }

        let query = self.buffer.trim().to_string();
        self.runs += 1;
        self.execution.query_text = query.clone();
        self.execution.status = ExecutionStatus::Running;
        self.execution.message = None;

        Some(ExecuteTicket {
            run: self.runs,
            request: QueryRequest::new(query).in_database(self.target_database.clone()),
        })
    }

    /// Settles the running execution.
    ///
    /// Returns false if the ticket does not belong to the running execution.
    pub fn finish(&mut self, ticket: ExecuteTicket, result: Result<RowSet>) -> bool {
        if ticket.run != self.runs || !self.is_running() {
            debug!("Discarding result of superseded run {}", ticket.run);
            return false;
        }

        match result {
            Ok(rows) => {
                info!("Query returned {} rows", rows.len());
                self.execution.status = ExecutionStatus::Succeeded;
                self.execution.message = rows.is_empty().then(|| EMPTY_RESULT_MESSAGE.to_string());
                self.execution.rows = Some(rows);
            }
            Err(e) => {
                info!("Query failed: {}", e);
                self.execution.status = ExecutionStatus::Failed;
                self.execution.rows = None;
                self.execution.message =
                    Some(e.detail().unwrap_or(GENERIC_FAILURE_MESSAGE).to_string());
            }
        }
        true
    }

    /// The execution slot.
    pub fn execution(&self) -> &QueryExecution {
        &self.execution
    }

    /// Current status.
    pub fn status(&self) -> ExecutionStatus {
        self.execution.status
    }

    /// Rows of the last successful run.
    pub fn rows(&self) -> Option<&RowSet> {
        self.execution.rows.as_ref()
    }

    /// Message of the last run.
    pub fn message(&self) -> Option<&str> {
        self.execution.message.as_deref()
    }

    /// Returns true if the current message reports a failure.
    pub fn is_error(&self) -> bool {
        self.execution.status == ExecutionStatus::Failed
    }
}
