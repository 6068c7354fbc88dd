//! Event handling for the TUI.
//!
//! Reads keyboard and terminal events from crossterm's async event stream,
//! which is cancel-safe and can share a `tokio::select!` with session events.

use crossterm::event::{Event as CrosstermEvent, EventStream, KeyEvent, KeyEventKind};
use crate::error::{AtlasError, Result};
use futures::StreamExt;

/// Application events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
}

/// Maps a crossterm event to an application event.
///
/// Key releases and repeats (reported on some platforms) are dropped, as are
/// mouse and focus events.
pub fn translate(event: CrosstermEvent) -> Option<Event> {
    match event {
        CrosstermEvent::Key(key) if key.kind == KeyEventKind::Press => Some(Event::Key(key)),
        CrosstermEvent::Resize(width, height) => Some(Event::Resize(width, height)),
        _ => None,
    }
}

/// Handles terminal events.
pub struct EventHandler {
    stream: EventStream,
}

impl EventHandler {
    /// Creates a new event handler.
    pub fn new() -> Self {
        Self {
            stream: EventStream::new(),
        }
    }

    /// Waits for the next terminal event.
    ///
    /// Returns `None` for events the application ignores.
    pub async fn next(&mut self) -> Result<Option<Event>> {
        match self.stream.next().await {
            Some(Ok(event)) => Ok(translate(event)),
            Some(Err(e)) => Err(AtlasError::internal(format!("Failed to read event: {e}"))),
            None => Err(AtlasError::internal("Terminal event stream closed")),
        }
    }
}

impl Default for EventHandler {
    fn default() -> Self {
        Self::new()
    }
}
