//! Query editor and status line widgets for the TUI.
//!
//! The editor shows the query buffer with an Execute affordance that reads
//! as busy while a query runs. The status line below it reports the outcome
//! of the last run.

use crate::console::{ExecutionStatus, QueryConsole};
use crate::tui::app::InputState;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};

/// Calculates the scroll offset needed to keep the cursor visible.
///
/// Returns the number of characters to skip from the start of the text.
pub fn calculate_scroll_offset(cursor: usize, available_width: usize) -> usize {
    cursor.saturating_sub(available_width)
}

/// Label of the Execute affordance.
pub fn execute_label(console: &QueryConsole) -> &'static str {
    if console.is_running() {
        " [ Running... ] "
    } else {
        " [ Execute ] "
    }
}

/// Query editor widget.
pub struct QueryEditor<'a> {
    input: &'a InputState,
    console: &'a QueryConsole,
    focused: bool,
}

impl<'a> QueryEditor<'a> {
    /// Creates a new query editor widget.
    pub fn new(input: &'a InputState, console: &'a QueryConsole, focused: bool) -> Self {
        Self {
            input,
            console,
            focused,
        }
    }
}

impl Widget for QueryEditor<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let border_style = if self.focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let action_style = if self.console.is_running() {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else if self.console.can_execute() {
            Style::default()
                .fg(Color::Green)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };

        let title = match self.console.target_database() {
            Some(database) => format!(" Query ({database}) "),
            None => " Query ".to_string(),
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(title)
            .title_top(
                Line::from(Span::styled(execute_label(self.console), action_style))
                    .right_aligned(),
            );

        // Border left (1) + prompt "> " (2) + border right (1) + cursor space (1) = 5
        let available_width = area.width.saturating_sub(5) as usize;
        let scroll_offset = calculate_scroll_offset(self.input.cursor, available_width);
        let visible_text: String = self.input.text.chars().skip(scroll_offset).collect();

        let line = Line::from(vec![
            Span::styled(
                "> ",
                Style::default()
                    .fg(Color::Green)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::raw(visible_text),
        ]);

        Paragraph::new(line).block(block).render(area, buf);
    }
}

/// One-line summary of the last execution.
pub struct StatusLine<'a> {
    console: &'a QueryConsole,
}

impl<'a> StatusLine<'a> {
    /// Creates a new status line widget.
    pub fn new(console: &'a QueryConsole) -> Self {
        Self { console }
    }

    fn line(&self) -> Option<Line<'static>> {
        let (text, style) = match self.console.status() {
            ExecutionStatus::Idle => return None,
            ExecutionStatus::Running => (
                "Running query...".to_string(),
                Style::default().fg(Color::Yellow),
            ),
            ExecutionStatus::Failed => (
                format!("✗ {}", self.console.message().unwrap_or_default()),
                Style::default().fg(Color::Red),
            ),
            ExecutionStatus::Succeeded => match self.console.message() {
                Some(message) => (format!("✓ {message}"), Style::default().fg(Color::Green)),
                None => {
                    let count = self.console.rows().map_or(0, |rows| rows.len());
                    (
                        format!("{} row{}", count, if count == 1 { "" } else { "s" }),
                        Style::default().fg(Color::DarkGray),
                    )
                }
            },
        };
        Some(Line::from(Span::styled(format!(" {text}"), style)))
    }
}

impl Widget for StatusLine<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if let Some(line) = self.line() {
            buf.set_line(area.x, area.y, &line, area.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AtlasError;
    use crate::gateway::RowSet;

    fn console(text: &str) -> QueryConsole {
        let mut console = QueryConsole::new();
        console.set_query_text(text);
        console
    }

    #[test]
    fn test_scroll_offset() {
        assert_eq!(calculate_scroll_offset(5, 20), 0);
        assert_eq!(calculate_scroll_offset(20, 20), 0);
        assert_eq!(calculate_scroll_offset(30, 20), 10);
    }

    #[test]
    fn test_execute_label_busy_while_running() {
        let mut console = console("SELECT 1");
        assert_eq!(execute_label(&console), " [ Execute ] ");
        console.begin_execute();
        assert_eq!(execute_label(&console), " [ Running... ] ");
    }

    #[test]
    fn test_status_line_idle_is_blank() {
        assert!(StatusLine::new(&QueryConsole::new()).line().is_none());
    }

    #[test]
    fn test_status_line_reports_error_detail() {
        let mut console = console("SELEC 1");
        let ticket = console.begin_execute().unwrap();
        console.finish(
            ticket,
            Err(AtlasError::service(500, Some("syntax error".to_string()))),
        );

        let line = StatusLine::new(&console).line().unwrap();
        assert_eq!(line.to_string(), " ✗ syntax error");
        assert_eq!(line.spans[0].style.fg, Some(Color::Red));
    }

    #[test]
    fn test_status_line_reports_empty_success() {
        let mut console = console("UPDATE t SET x = 1");
        let ticket = console.begin_execute().unwrap();
        console.finish(ticket, Ok(RowSet::empty()));

        let line = StatusLine::new(&console).line().unwrap();
        assert_eq!(line.to_string(), " ✓ Query executed successfully");
        assert_eq!(line.spans[0].style.fg, Some(Color::Green));
    }
}
