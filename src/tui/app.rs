//! Application state for the TUI.
//!
//! Wraps a [`Session`] with the purely visual state: which pane has focus,
//! the editor cursor, the catalog cursor and the scroll offsets.

use crate::catalog::CatalogExplorer;
use crate::session::{Session, SessionEvent};
use crate::tui::events::Event;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tracing::debug;

/// Rows moved by PageUp/PageDown.
const PAGE_SIZE: usize = 10;

/// Which pane receives key input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    /// The database and table tree.
    #[default]
    Catalog,
    /// The query editor.
    Editor,
    /// The query results.
    Results,
}

impl Focus {
    /// Returns the pane after this one.
    pub fn next(self) -> Self {
        match self {
            Self::Catalog => Self::Editor,
            Self::Editor => Self::Results,
            Self::Results => Self::Catalog,
        }
    }

    /// Returns the pane before this one.
    pub fn previous(self) -> Self {
        match self {
            Self::Catalog => Self::Results,
            Self::Editor => Self::Catalog,
            Self::Results => Self::Editor,
        }
    }
}

/// Single-line text input with a character-indexed cursor.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputState {
    /// Current input text.
    pub text: String,
    /// Cursor position (character index).
    pub cursor: usize,
}

impl InputState {
    /// Creates a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.text
            .char_indices()
            .nth(cursor)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len())
    }

    /// Inserts a character at the cursor position.
    pub fn insert(&mut self, c: char) {
        let at = self.byte_index(self.cursor);
        self.text.insert(at, c);
        self.cursor += 1;
    }

    /// Deletes the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Deletes the character at the cursor (delete key).
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.text.remove(at);
        }
    }

    /// Moves the cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Moves the cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Moves the cursor to the start of the input.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Moves the cursor to the end of the input.
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }
}

/// One visible line of the catalog tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogEntry {
    /// A database row.
    Database(String),
    /// A table row under the expanded database.
    Table { database: String, table: String },
}

/// Flattens the explorer into the rows of the catalog tree.
///
/// Tables appear only under the expanded database.
pub fn catalog_entries(explorer: &CatalogExplorer) -> Vec<CatalogEntry> {
    let mut entries = Vec::new();
    for database in explorer.databases() {
        entries.push(CatalogEntry::Database(database.clone()));
        if explorer.expanded_database() == Some(database.as_str()) {
            entries.extend(
                explorer
                    .expanded_tables()
                    .iter()
                    .map(|table| CatalogEntry::Table {
                        database: database.clone(),
                        table: table.clone(),
                    }),
            );
        }
    }
    entries
}

/// Main application state.
pub struct App {
    /// Whether the application is running.
    pub running: bool,
    /// Pane receiving key input.
    pub focus: Focus,
    /// Query editor input.
    pub editor: InputState,
    /// Preview rows skipped from the top.
    pub preview_scroll: usize,
    /// Result rows skipped from the top.
    pub results_scroll: usize,
    /// Description of the data source shown in the header.
    pub source_info: String,
    session: Session,
    /// Catalog cursor, kept by identity so it survives tree changes.
    cursor: Option<CatalogEntry>,
}

impl App {
    /// Creates a new application over a session.
    pub fn new(session: Session, source_info: impl Into<String>) -> Self {
        Self {
            running: true,
            focus: Focus::default(),
            editor: InputState::new(),
            preview_scroll: 0,
            results_scroll: 0,
            source_info: source_info.into(),
            session,
            cursor: None,
        }
    }

    /// The session driving this app.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Mutable access to the session, for feeding it events.
    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    /// Merges a settled gateway call.
    pub fn apply(&mut self, event: SessionEvent) {
        self.session.apply(event);
        self.sync_target_database();
    }

    /// Applies session events until no gateway call is outstanding.
    pub async fn settle(&mut self) {
        while self.session.in_flight() > 0 {
            match self.session.next_event().await {
                Some(event) => self.apply(event),
                None => break,
            }
        }
    }

    /// Points the console at the expanded database.
    ///
    /// Left alone while a query runs, so the title keeps naming the
    /// database that query was sent to.
    fn sync_target_database(&mut self) {
        if self.session.console().is_running() {
            return;
        }

        let expanded = self.session.explorer().expanded_database();
        if self.session.console().target_database() != expanded {
            let database = expanded.map(str::to_string);
            self.session.set_target_database(database);
        }
    }

    /// Current rows of the catalog tree.
    pub fn catalog_entries(&self) -> Vec<CatalogEntry> {
        catalog_entries(self.session.explorer())
    }

    /// Index of the catalog cursor within `entries`.
    ///
    /// A cursor on a table that is no longer visible falls back to its
    /// database, anything else unknown to the first row.
    pub fn cursor_index(&self, entries: &[CatalogEntry]) -> usize {
        let Some(cursor) = &self.cursor else {
            return 0;
        };

        entries
            .iter()
            .position(|entry| entry == cursor)
            .or_else(|| match cursor {
                CatalogEntry::Table { database, .. } => entries
                    .iter()
                    .position(|entry| matches!(entry, CatalogEntry::Database(d) if d == database)),
                CatalogEntry::Database(_) => None,
            })
            .unwrap_or(0)
    }

    /// Handles an application event.
    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Resize(_, _) => {}
        }
    }

    /// Handles a key press.
    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(KeyModifiers::CONTROL)
            && matches!(key.code, KeyCode::Char('c') | KeyCode::Char('q'))
        {
            self.running = false;
            return;
        }

        match key.code {
            KeyCode::Tab => {
                self.focus = self.focus.next();
                return;
            }
            KeyCode::BackTab => {
                self.focus = self.focus.previous();
                return;
            }
            KeyCode::F(5) => {
                self.execute();
                return;
            }
            _ => {}
        }

        match self.focus {
            Focus::Catalog => self.handle_catalog_key(key),
            Focus::Editor => self.handle_editor_key(key),
            Focus::Results => self.handle_results_key(key),
        }
    }

    fn handle_catalog_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => self.move_cursor(-1),
            KeyCode::Down | KeyCode::Char('j') => self.move_cursor(1),
            KeyCode::Home => self.move_cursor(isize::MIN),
            KeyCode::End => self.move_cursor(isize::MAX),
            KeyCode::Enter | KeyCode::Char(' ') => self.activate_cursor(),
            KeyCode::PageUp => {
                self.preview_scroll = self.preview_scroll.saturating_sub(PAGE_SIZE);
            }
            KeyCode::PageDown => {
                self.preview_scroll = self.preview_scroll.saturating_add(PAGE_SIZE);
            }
            _ => {}
        }
    }

    fn handle_editor_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => {
                self.execute();
                return;
            }
            KeyCode::Char(c) => self.editor.insert(c),
            KeyCode::Backspace => self.editor.backspace(),
            KeyCode::Delete => self.editor.delete(),
            KeyCode::Left => self.editor.move_left(),
            KeyCode::Right => self.editor.move_right(),
            KeyCode::Home => self.editor.move_home(),
            KeyCode::End => self.editor.move_end(),
            _ => return,
        }
        self.session.set_query_text(self.editor.text.clone());
    }

    fn handle_results_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.results_scroll = self.results_scroll.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.results_scroll = self.results_scroll.saturating_add(1);
            }
            KeyCode::PageUp => {
                self.results_scroll = self.results_scroll.saturating_sub(PAGE_SIZE);
            }
            KeyCode::PageDown => {
                self.results_scroll = self.results_scroll.saturating_add(PAGE_SIZE);
            }
            KeyCode::Home => self.results_scroll = 0,
            _ => {}
        }
    }

    /// Moves the catalog cursor by `delta` rows, clamped to the tree.
    fn move_cursor(&mut self, delta: isize) {
        let entries = self.catalog_entries();
        if entries.is_empty() {
            return;
        }

        let current = self.cursor_index(&entries) as isize;
        let last = entries.len() as isize - 1;
        let target = current.saturating_add(delta).clamp(0, last) as usize;
        self.cursor = entries.get(target).cloned();
    }

    /// Toggles the database or selects the table under the cursor.
    fn activate_cursor(&mut self) {
        let entries = self.catalog_entries();
        let Some(entry) = entries.get(self.cursor_index(&entries)).cloned() else {
            return;
        };

        match &entry {
            CatalogEntry::Database(name) => self.session.toggle_database(name),
            CatalogEntry::Table { table, .. } => {
                self.session.select_table(table);
                self.preview_scroll = 0;
            }
        }
        self.cursor = Some(entry);
        self.sync_target_database();
    }

    /// Runs the editor text in the expanded database.
    fn execute(&mut self) {
        self.sync_target_database();

        if !self.session.console().can_execute() {
            debug!("Nothing to execute");
            return;
        }
        self.session.execute();
        self.results_scroll = 0;
    }
}
