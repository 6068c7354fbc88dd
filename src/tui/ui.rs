//! UI rendering for the TUI.
//!
//! Defines the layout and renders all UI components.

use super::app::{App, Focus};
use super::widgets::{catalog, editor, header, table};
use crate::catalog::Preview;
use crate::tabular::TabularView;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    Frame,
};

/// Renders the entire UI.
pub fn render(frame: &mut Frame, app: &App) {
    let area = frame.area();

    // Main layout: header, content
    let main_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1), // Header
            Constraint::Min(3),    // Content
        ])
        .split(area);

    // Content layout: catalog (30%) and workspace (70%)
    let content_layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(30), Constraint::Percentage(70)])
        .split(main_layout[1]);

    let workspace = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage(45), // Preview
            Constraint::Length(3),      // Editor
            Constraint::Length(1),      // Status line
            Constraint::Min(3),         // Results
        ])
        .split(content_layout[1]);

    render_header(frame, main_layout[0], app);
    render_catalog(frame, content_layout[0], app);
    render_preview(frame, workspace[0], app);
    render_editor(frame, workspace[1], app);
    render_status(frame, workspace[2], app);
    render_results(frame, workspace[3], app);
}

/// Renders the header bar.
fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let widget = header::Header::new(&app.source_info, app.session().in_flight());
    frame.render_widget(widget, area);
}

/// Renders the database tree.
fn render_catalog(frame: &mut Frame, area: Rect, app: &App) {
    let entries = app.catalog_entries();
    let cursor = app.cursor_index(&entries);
    let widget = catalog::CatalogTree::new(
        app.session().explorer(),
        &entries,
        cursor,
        app.focus == Focus::Catalog,
    );
    frame.render_widget(widget, area);
}

/// Renders the preview of the selected table.
fn render_preview(frame: &mut Frame, area: Rect, app: &App) {
    let explorer = app.session().explorer();

    let title = match (explorer.expanded_database(), explorer.selected_table()) {
        (Some(database), Some(table)) => format!("Preview: {database}.{table}"),
        _ => "Preview".to_string(),
    };

    let (view, placeholder) = match explorer.preview() {
        None => (None, Some("Select a table to preview its rows")),
        Some(Preview::Loading) => (None, Some("Loading...")),
        Some(Preview::Unavailable) => (None, Some("No data available")),
        Some(Preview::Ready(rows)) => (TabularView::from_rows(rows), None),
    };

    let widget = table::RowTable::new(view.as_ref(), title)
        .placeholder(placeholder)
        .focused(app.focus == Focus::Catalog)
        .scroll(app.preview_scroll);
    frame.render_widget(widget, area);
}

/// Renders the query editor.
fn render_editor(frame: &mut Frame, area: Rect, app: &App) {
    let focused = app.focus == Focus::Editor;
    let console = app.session().console();
    let widget = editor::QueryEditor::new(&app.editor, console, focused);
    frame.render_widget(widget, area);

    // Position cursor in the editor when focused
    if focused {
        let available_width = area.width.saturating_sub(5) as usize;
        let offset = editor::calculate_scroll_offset(app.editor.cursor, available_width);
        // Account for border (1) and prompt "> " (2)
        let cursor_x = area.x + 1 + 2 + (app.editor.cursor - offset) as u16;
        frame.set_cursor_position((cursor_x, area.y + 1));
    }
}

/// Renders the execution status line.
fn render_status(frame: &mut Frame, area: Rect, app: &App) {
    let widget = editor::StatusLine::new(app.session().console());
    frame.render_widget(widget, area);
}

/// Renders the query results.
fn render_results(frame: &mut Frame, area: Rect, app: &App) {
    let view = app.session().console().rows().and_then(TabularView::from_rows);
    let widget = table::RowTable::new(view.as_ref(), "Results")
        .focused(app.focus == Focus::Results)
        .scroll(app.results_scroll);
    frame.render_widget(widget, area);
}
