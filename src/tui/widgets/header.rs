//! Header widget for the TUI.
//!
//! Displays the application name, version, pending requests and the data
//! source.

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
    widgets::Widget,
};

/// Header bar widget.
pub struct Header<'a> {
    source_info: &'a str,
    pending: usize,
}

impl<'a> Header<'a> {
    /// Creates a new header widget.
    pub fn new(source_info: &'a str, pending: usize) -> Self {
        Self {
            source_info,
            pending,
        }
    }
}

impl Widget for Header<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = Style::default()
            .bg(Color::Blue)
            .fg(Color::White)
            .add_modifier(Modifier::BOLD);

        for x in area.left()..area.right() {
            buf[(x, area.y)].set_style(style);
        }

        let left_text = format!(" Atlas v{}", env!("CARGO_PKG_VERSION"));
        buf.set_span(area.x, area.y, &Span::styled(left_text, style), area.width);

        if self.pending > 0 {
            let pending_text = format!("⟳ {} pending", self.pending);
            let pending_style = style.fg(Color::Yellow);
            let pending_width = pending_text.chars().count() as u16;
            let pending_x = area.x + (area.width.saturating_sub(pending_width)) / 2;
            buf.set_string(pending_x, area.y, &pending_text, pending_style);
        }

        let right_text = format!(" [{}] ", self.source_info);
        let right_width = right_text.chars().count() as u16;
        if right_width < area.width {
            let right_x = area.right().saturating_sub(right_width);
            buf.set_string(right_x, area.y, &right_text, style);
        }
    }
}
