//! Catalog explorer state machine.
//!
//! Owns the database list, the lazily fetched table lists, and the current
//! selection (expanded database, selected table, previewed rows). Fetches are
//! not performed here: transitions that need data hand out a ticket, and the
//! result is merged back with the matching `apply_*` method. A ticket issued
//! for a selection context that has since changed is stale and its result is
//! discarded.

use std::collections::HashMap;
use tracing::{debug, warn};

use crate::error::Result;
use crate::gateway::{DatabaseDetail, DatabaseName, RowSet, TableName};

/// State of the preview area for the selected table.
#[derive(Debug, Clone, PartialEq)]
pub enum Preview {
    /// Rows have been requested and not yet arrived.
    Loading,
    /// Rows arrived.
    Ready(RowSet),
    /// The fetch failed; there is no data to show.
    Unavailable,
}

/// Ticket for a database detail fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandTicket {
    database: DatabaseName,
    seq: u64,
}

impl ExpandTicket {
    /// Database whose detail is being fetched.
    pub fn database(&self) -> &str {
        &self.database
    }
}

/// Ticket for a table preview fetch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewTicket {
    database: DatabaseName,
    table: TableName,
    generation: u64,
}

impl PreviewTicket {
    /// Database the previewed table belongs to.
    pub fn database(&self) -> &str {
        &self.database
    }

    /// Table being previewed.
    pub fn table(&self) -> &str {
        &self.table
    }
}

/// Result of toggling a database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    /// The database was expanded and is now collapsed.
    Collapsed,
    /// The database was expanded from the detail cache.
    Expanded,
    /// The detail must be fetched before the database can expand.
    Fetch(ExpandTicket),
}

/// The expanded database, the selected table and its preview, changed together.
#[derive(Debug, Clone, Default, PartialEq)]
struct Selection {
    expanded: Option<DatabaseName>,
    table: Option<TableName>,
    preview: Option<Preview>,
}

impl Selection {
    fn expanded(database: DatabaseName) -> Self {
        Self {
            expanded: Some(database),
            table: None,
            preview: None,
        }
    }
}

/// Catalog explorer state.
#[derive(Debug, Default)]
pub struct CatalogExplorer {
    databases: Vec<DatabaseName>,
    loading: bool,
    details: HashMap<DatabaseName, DatabaseDetail>,
    selection: Selection,
    /// Pending detail fetch that may still expand its database.
    expanding: Option<DatabaseName>,
    /// Bumped by every expansion change; detail tickets must match it.
    expand_seq: u64,
    /// Bumped by every selection change; preview tickets must match it.
    generation: u64,
}

impl CatalogExplorer {
    /// Creates an explorer with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the database listing as requested.
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Applies the database listing.
    ///
    /// A failure leaves the list empty; it is logged and never surfaced.
    pub fn apply_databases(&mut self, result: Result<Vec<DatabaseName>>) {
        self.loading = false;
        match result {
            Ok(databases) => {
                debug!("Catalog lists {} databases", databases.len());
                self.databases = databases;
            }
            Err(e) => {
                warn!("Failed to list databases: {}", e);
                self.databases.clear();
            }
        }
    }

    /// Expands or collapses a database.
    ///
    /// Collapsing and expanding from the cache take effect immediately.
    /// Otherwise nothing changes until the detail arrives through
    /// [`apply_detail`](Self::apply_detail).
    pub fn toggle_database(&mut self, name: &str) -> ToggleOutcome {
        self.expand_seq += 1;
        self.expanding = None;

        if self.selection.expanded.as_deref() == Some(name) {
            self.replace_selection(Selection::default());
            return ToggleOutcome::Collapsed;
        }

        if self.details.contains_key(name) {
            self.replace_selection(Selection::expanded(name.to_string()));
            return ToggleOutcome::Expanded;
        }

        self.expanding = Some(name.to_string());
        ToggleOutcome::Fetch(ExpandTicket {
            database: name.to_string(),
            seq: self.expand_seq,
        })
    }

    /// Applies a fetched database detail.
    ///
    /// On success the detail is cached and, if the ticket is still current,
    /// the database is expanded with a fresh selection. On failure nothing
    /// changes. Returns true if the database was expanded.
    pub fn apply_detail(&mut self, ticket: ExpandTicket, result: Result<DatabaseDetail>) -> bool {
        let current = ticket.seq == self.expand_seq;
        if current {
            self.expanding = None;
        }

        let detail = match result {
            Ok(detail) => detail,
            Err(e) => {
                warn!("Failed to load tables of '{}': {}", ticket.database, e);
                return false;
            }
        };

        self.details.insert(ticket.database.clone(), detail);

        if !current {
            debug!("Discarding stale expansion of '{}'", ticket.database);
            return false;
        }

        self.replace_selection(Selection::expanded(ticket.database));
        true
    }

    /// Selects a table of the expanded database.
    ///
    /// The selection is visible immediately; the rows arrive through
    /// [`apply_preview`](Self::apply_preview). Returns `None`, changing
    /// nothing, when no database is expanded or the table is not one of its
    /// tables.
    pub fn select_table(&mut self, name: &str) -> Option<PreviewTicket> {
        let database = self.selection.expanded.clone()?;
        let owns_table = self
            .details
            .get(&database)
            .is_some_and(|detail| detail.has_table(name));
        if !owns_table {
            debug!("Ignoring selection of '{}' outside '{}'", name, database);
            return None;
        }

        self.replace_selection(Selection {
            expanded: Some(database.clone()),
            table: Some(name.to_string()),
            preview: Some(Preview::Loading),
        });

        Some(PreviewTicket {
            database,
            table: name.to_string(),
            generation: self.generation,
        })
    }

    /// Applies fetched preview rows.
    ///
    /// Results for a selection that is no longer current are discarded.
    /// A failure keeps the table selected with no data. Returns true if the
    /// result was applied.
    pub fn apply_preview(&mut self, ticket: PreviewTicket, result: Result<RowSet>) -> bool {
        if ticket.generation != self.generation {
            debug!(
                "Discarding stale preview of '{}.{}'",
                ticket.database, ticket.table
            );
            return false;
        }

        self.selection.preview = Some(match result {
            Ok(rows) => Preview::Ready(rows),
            Err(e) => {
                warn!(
                    "Failed to preview '{}.{}': {}",
                    ticket.database, ticket.table, e
                );
                Preview::Unavailable
            }
        });
        true
    }

    fn replace_selection(&mut self, selection: Selection) {
        self.generation += 1;
        self.selection = selection;
    }

    /// Database names in service order.
    pub fn databases(&self) -> &[DatabaseName] {
        &self.databases
    }

    /// Returns true while the database listing is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Currently expanded database.
    pub fn expanded_database(&self) -> Option<&str> {
        self.selection.expanded.as_deref()
    }

    /// Database whose detail fetch may still expand it.
    pub fn expanding_database(&self) -> Option<&str> {
        self.expanding.as_deref()
    }

    /// Currently selected table.
    pub fn selected_table(&self) -> Option<&str> {
        self.selection.table.as_deref()
    }

    /// Preview state of the selected table, `None` when nothing is selected.
    pub fn preview(&self) -> Option<&Preview> {
        self.selection.preview.as_ref()
    }

    /// Previewed rows, present only once they have arrived successfully.
    pub fn rows(&self) -> Option<&RowSet> {
        match self.selection.preview.as_ref()? {
            Preview::Ready(rows) => Some(rows),
            Preview::Loading | Preview::Unavailable => None,
        }
    }

    /// Cached detail of a database.
    pub fn detail(&self, database: &str) -> Option<&DatabaseDetail> {
        self.details.get(database)
    }

    /// Tables of the expanded database.
    pub fn expanded_tables(&self) -> &[TableName] {
        self.selection
            .expanded
            .as_ref()
            .and_then(|db| self.details.get(db))
            .map(|detail| detail.tables.as_slice())
            .unwrap_or(&[])
    }
}
