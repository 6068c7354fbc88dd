//! Session: one catalog explorer and one query console over a shared gateway.
//!
//! The session issues gateway calls as spawned tasks and receives their
//! outcomes as [`SessionEvent`]s over a channel, so several fetches can be in
//! flight at once while all state is mutated only by the owner of the
//! session. Operations that spawn must be called from within a tokio runtime.

use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, error};

use crate::catalog::{CatalogExplorer, ExpandTicket, PreviewTicket, ToggleOutcome};
use crate::console::{ExecuteTicket, QueryConsole};
use crate::error::{AtlasError, Result};
use crate::gateway::{DataGateway, DatabaseDetail, DatabaseName, RowSet};

/// Outcome of a gateway call, tagged with the ticket it was issued for.
#[derive(Debug)]
pub enum SessionEvent {
    /// Database listing settled.
    Databases(Result<Vec<DatabaseName>>),
    /// Database detail fetch settled.
    Detail(ExpandTicket, Result<DatabaseDetail>),
    /// Table preview fetch settled.
    Preview(PreviewTicket, Result<RowSet>),
    /// Query execution settled.
    Query(ExecuteTicket, Result<RowSet>),
}

/// Explorer and console state plus the machinery to feed them.
pub struct Session {
    gateway: Arc<dyn DataGateway>,
    explorer: CatalogExplorer,
    console: QueryConsole,
    tx: mpsc::UnboundedSender<SessionEvent>,
    rx: mpsc::UnboundedReceiver<SessionEvent>,
    in_flight: usize,
    tasks: TaskTracker,
    shutdown: CancellationToken,
}

impl Session {
    /// Creates a session over the given gateway.
    pub fn new(gateway: Arc<dyn DataGateway>) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            gateway,
            explorer: CatalogExplorer::new(),
            console: QueryConsole::new(),
            tx,
            rx,
            in_flight: 0,
            tasks: TaskTracker::new(),
            shutdown: CancellationToken::new(),
        }
    }

    /// Catalog explorer state.
    pub fn explorer(&self) -> &CatalogExplorer {
        &self.explorer
    }

    /// Query console state.
    pub fn console(&self) -> &QueryConsole {
        &self.console
    }

    /// Number of gateway calls whose outcome has not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Requests the database listing.
    pub fn load_databases(&mut self) {
        self.explorer.begin_load();
        let gateway = Arc::clone(&self.gateway);
        self.spawn(
            async move { gateway.list_databases().await },
            SessionEvent::Databases,
        );
    }

    /// Expands or collapses a database, fetching its detail when not cached.
    pub fn toggle_database(&mut self, name: &str) {
        match self.explorer.toggle_database(name) {
            ToggleOutcome::Fetch(ticket) => {
                let gateway = Arc::clone(&self.gateway);
                let database = ticket.database().to_string();
                self.spawn(
                    async move { gateway.database_detail(&database).await },
                    move |result| SessionEvent::Detail(ticket, result),
                );
            }
            outcome => debug!("Toggled '{}' locally: {:?}", name, outcome),
        }
    }

    /// Selects a table of the expanded database and fetches its preview.
    pub fn select_table(&mut self, name: &str) {
        let Some(ticket) = self.explorer.select_table(name) else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let database = ticket.database().to_string();
        let table = ticket.table().to_string();
        self.spawn(
            async move { gateway.table_preview(&database, &table).await },
            move |result| SessionEvent::Preview(ticket, result),
        );
    }

    /// Replaces the query buffer.
    pub fn set_query_text(&mut self, text: impl Into<String>) {
        self.console.set_query_text(text);
    }

    /// Sets the database queries run in.
    pub fn set_target_database(&mut self, database: Option<DatabaseName>) {
        self.console.set_target_database(database);
    }

    /// Executes the query buffer unless it is blank or a query is running.
    pub fn execute(&mut self) {
        let Some(ticket) = self.console.begin_execute() else {
            return;
        };

        let gateway = Arc::clone(&self.gateway);
        let request = ticket.request().clone();
        self.spawn(
            async move { gateway.execute_query(&request).await },
            move |result| SessionEvent::Query(ticket, result),
        );
    }

    /// Waits for the next settled gateway call.
    ///
    /// Cancel-safe, so it can be used as a `tokio::select!` branch.
    pub async fn next_event(&mut self) -> Option<SessionEvent> {
        self.rx.recv().await
    }

    /// Merges a settled gateway call into the explorer or console.
    pub fn apply(&mut self, event: SessionEvent) {
        self.in_flight = self.in_flight.saturating_sub(1);

        match event {
            SessionEvent::Databases(result) => self.explorer.apply_databases(result),
            SessionEvent::Detail(ticket, result) => {
                self.explorer.apply_detail(ticket, result);
            }
            SessionEvent::Preview(ticket, result) => {
                self.explorer.apply_preview(ticket, result);
            }
            SessionEvent::Query(ticket, result) => {
                self.console.finish(ticket, result);
            }
        }
    }

    /// Applies events until no gateway call is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            match self.next_event().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Cancels outstanding gateway calls and waits for their tasks to end.
    ///
    /// Cancelled calls never report back, so nothing is left in flight.
    pub async fn shutdown(&mut self) {
        self.shutdown.cancel();
        self.tasks.close();
        self.tasks.wait().await;
        self.in_flight = 0;
    }

    /// Runs a gateway call on its own task and reports the outcome.
    ///
    /// The call runs inside a nested task so that a panic still settles as
    /// an [`AtlasError::Internal`] instead of leaving the caller waiting.
    fn spawn<T, F, M>(&mut self, call: F, into_event: M)
    where
        T: Send + 'static,
        F: Future<Output = Result<T>> + Send + 'static,
        M: FnOnce(Result<T>) -> SessionEvent + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        let shutdown = self.shutdown.clone();

        self.tasks.spawn(async move {
            let mut call = tokio::spawn(call);
            let outcome = tokio::select! {
                _ = shutdown.cancelled() => {
                    call.abort();
                    return;
                }
                joined = &mut call => match joined {
                    Ok(result) => result,
                    Err(e) => {
                        error!("Gateway task failed: {}", e);
                        Err(AtlasError::internal(format!("Gateway task failed: {e}")))
                    }
                },
            };

            // The receiver lives as long as the session
            let _ = tx.send(into_event(outcome));
        });
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
