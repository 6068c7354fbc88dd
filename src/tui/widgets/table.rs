//! Row table widget for the TUI.
//!
//! Renders a [`TabularView`] inside a titled block with column headers,
//! auto-sized columns and styled NULL values. Used for both the table
//! preview and the query results.

use crate::tabular::TabularView;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Maximum width for any column.
const MAX_COLUMN_WIDTH: usize = 40;

/// Minimum width for any column.
const MIN_COLUMN_WIDTH: usize = 4;

/// Widget for rendering rows as a table.
pub struct RowTable<'a> {
    view: Option<&'a TabularView>,
    title: String,
    placeholder: Option<&'a str>,
    focused: bool,
    scroll: usize,
}

impl<'a> RowTable<'a> {
    /// Creates a new table widget. `None` renders only the block.
    pub fn new(view: Option<&'a TabularView>, title: impl Into<String>) -> Self {
        Self {
            view,
            title: title.into(),
            placeholder: None,
            focused: false,
            scroll: 0,
        }
    }

    /// Text shown in place of the table when there is no view.
    pub fn placeholder(mut self, placeholder: Option<&'a str>) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Highlights the border.
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Skips this many data rows from the top.
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Calculates the width for each column, capped to sane bounds.
    fn calculate_column_widths(view: &TabularView) -> Vec<usize> {
        view.column_widths()
            .into_iter()
            .map(|w| w.clamp(MIN_COLUMN_WIDTH, MAX_COLUMN_WIDTH))
            .collect()
    }

    /// Truncates a string to fit within the given width, adding ellipsis if needed.
    fn truncate(s: &str, max_width: usize) -> String {
        if s.chars().count() <= max_width {
            s.to_string()
        } else if max_width <= 3 {
            s.chars().take(max_width).collect()
        } else {
            let kept: String = s.chars().take(max_width - 3).collect();
            format!("{kept}...")
        }
    }

    /// Renders the table to lines for embedding in other widgets.
    pub fn render_to_lines(&self, available_width: usize) -> Vec<Line<'static>> {
        let Some(view) = self.view else {
            return self
                .placeholder
                .map(|text| {
                    vec![Line::from(Span::styled(
                        text.to_string(),
                        Style::default().fg(Color::DarkGray),
                    ))]
                })
                .unwrap_or_default();
        };

        let widths = Self::calculate_column_widths(view);

        // Borders and padding
        let total_width: usize = widths.iter().sum::<usize>() + widths.len() * 3 + 1;
        let scale_factor = if total_width > available_width && available_width > 0 {
            available_width as f64 / total_width as f64
        } else {
            1.0
        };

        let adjusted_widths: Vec<usize> = widths
            .iter()
            .map(|&w| ((w as f64 * scale_factor) as usize).max(MIN_COLUMN_WIDTH))
            .collect();

        let mut lines = vec![
            Self::render_border(&adjusted_widths, '┌', '┬', '┐'),
            Self::render_header_row(view, &adjusted_widths),
            Self::render_border(&adjusted_widths, '├', '┼', '┤'),
        ];

        for row in self.scroll.min(view.row_count())..view.row_count() {
            lines.push(Self::render_data_row(view, row, &adjusted_widths));
        }

        lines.push(Self::render_border(&adjusted_widths, '└', '┴', '┘'));

        let count = view.row_count();
        lines.push(Line::from(Span::styled(
            format!("{} row{}", count, if count == 1 { "" } else { "s" }),
            Style::default().fg(Color::DarkGray),
        )));

        lines
    }

    /// Renders a horizontal border line.
    fn render_border(widths: &[usize], left: char, mid: char, right: char) -> Line<'static> {
        let mut border = String::new();
        border.push(left);

        for (i, &width) in widths.iter().enumerate() {
            border.push_str(&"─".repeat(width + 2));
            if i + 1 < widths.len() {
                border.push(mid);
            }
        }

        border.push(right);

        Line::from(Span::styled(border, Style::default().fg(Color::DarkGray)))
    }

    /// Renders the header row with column names.
    fn render_header_row(view: &TabularView, widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (i, name) in view.columns().iter().enumerate() {
            let width = widths.get(i).copied().unwrap_or(MIN_COLUMN_WIDTH);
            let padded = format!(" {:width$} ", Self::truncate(name, width), width = width);

            spans.push(Span::styled(
                padded,
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }

    /// Renders a data row.
    fn render_data_row(view: &TabularView, row: usize, widths: &[usize]) -> Line<'static> {
        let mut spans = vec![Span::styled("│", Style::default().fg(Color::DarkGray))];

        for (i, &width) in widths.iter().enumerate() {
            let display = view.cell(row, i).unwrap_or("");
            let padded = format!(" {:width$} ", Self::truncate(display, width), width = width);

            let style = if view.is_null(row, i) {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::ITALIC)
            } else {
                Style::default()
            };

            spans.push(Span::styled(padded, style));
            spans.push(Span::styled("│", Style::default().fg(Color::DarkGray)));
        }

        Line::from(spans)
    }
}

impl Widget for RowTable<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(format!(" {} ", self.title));

        let lines = self.render_to_lines(area.width.saturating_sub(2) as usize);
        Paragraph::new(lines).block(block).render(area, buf);
    }
}
