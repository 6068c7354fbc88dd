//! Catalog tree widget for the TUI.
//!
//! Lists databases with the expanded one's tables nested beneath it.

use crate::catalog::CatalogExplorer;
use crate::tui::app::CatalogEntry;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Database and table tree.
pub struct CatalogTree<'a> {
    explorer: &'a CatalogExplorer,
    entries: &'a [CatalogEntry],
    cursor: usize,
    focused: bool,
}

impl<'a> CatalogTree<'a> {
    /// Creates a new catalog tree widget.
    pub fn new(
        explorer: &'a CatalogExplorer,
        entries: &'a [CatalogEntry],
        cursor: usize,
        focused: bool,
    ) -> Self {
        Self {
            explorer,
            entries,
            cursor,
            focused,
        }
    }

    fn entry_line(&self, entry: &CatalogEntry) -> Line<'static> {
        match entry {
            CatalogEntry::Database(name) => {
                let expanded = self.explorer.expanded_database() == Some(name.as_str());
                let marker = if expanded { "▾ " } else { "▸ " };
                let mut spans = vec![
                    Span::styled(marker, Style::default().fg(Color::DarkGray)),
                    Span::styled(
                        name.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ];
                if self.explorer.expanding_database() == Some(name.as_str()) {
                    spans.push(Span::styled(" …", Style::default().fg(Color::Yellow)));
                }
                Line::from(spans)
            }
            CatalogEntry::Table { table, .. } => {
                let selected = self.explorer.selected_table() == Some(table.as_str());
                let style = if selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                Line::from(vec![Span::raw("    "), Span::styled(table.clone(), style)])
            }
        }
    }
}

impl Widget for CatalogTree<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(" Databases ");

        let muted = Style::default().fg(Color::DarkGray);
        let lines: Vec<Line> = if self.explorer.is_loading() {
            vec![Line::from(Span::styled("Loading databases...", muted))]
        } else if self.entries.is_empty() {
            vec![Line::from(Span::styled("No databases", muted))]
        } else {
            let height = area.height.saturating_sub(2) as usize;
            let offset = (self.cursor + 1).saturating_sub(height.max(1));
            self.entries
                .iter()
                .enumerate()
                .skip(offset)
                .take(height)
                .map(|(i, entry)| {
                    let line = self.entry_line(entry);
                    if i == self.cursor && self.focused {
                        line.patch_style(Style::default().add_modifier(Modifier::REVERSED))
                    } else {
                        line
                    }
                })
                .collect()
        };

        Paragraph::new(lines).block(block).render(area, buf);
    }
}
