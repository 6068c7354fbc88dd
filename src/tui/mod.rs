//! Terminal User Interface for Atlas.
//!
//! Provides the main TUI application loop using ratatui and crossterm.

pub mod app;
mod events;
mod ui;
pub mod widgets;

pub use app::App;
pub use events::{Event, EventHandler};

use crate::error::{AtlasError, Result};
use crate::session::{Session, SessionEvent};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use tracing::{debug, info};

/// Input that woke the main loop.
enum Incoming {
    Terminal(Result<Option<Event>>),
    Session(Option<SessionEvent>),
}

/// The main TUI application runner.
pub struct Tui {
    terminal: Terminal<CrosstermBackend<Stdout>>,
    event_handler: EventHandler,
}

impl Tui {
    /// Creates a new TUI instance, initializing the terminal.
    pub fn new() -> Result<Self> {
        Ok(Self {
            terminal: Self::setup_terminal()?,
            event_handler: EventHandler::new(),
        })
    }

    /// Sets up the terminal for TUI rendering.
    fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
        enable_raw_mode()
            .map_err(|e| AtlasError::internal(format!("Failed to enable raw mode: {e}")))?;

        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen)
            .map_err(|e| AtlasError::internal(format!("Failed to enter alternate screen: {e}")))?;

        let backend = CrosstermBackend::new(stdout);
        Terminal::new(backend)
            .map_err(|e| AtlasError::internal(format!("Failed to create terminal: {e}")))
    }

    /// Restores the terminal to its original state.
    fn restore_terminal(&mut self) -> Result<()> {
        disable_raw_mode()
            .map_err(|e| AtlasError::internal(format!("Failed to disable raw mode: {e}")))?;

        execute!(self.terminal.backend_mut(), LeaveAlternateScreen)
            .map_err(|e| AtlasError::internal(format!("Failed to leave alternate screen: {e}")))?;

        self.terminal
            .show_cursor()
            .map_err(|e| AtlasError::internal(format!("Failed to show cursor: {e}")))?;

        Ok(())
    }

    /// Runs the main event loop until the user quits.
    pub async fn run(&mut self, app: &mut App) -> Result<()> {
        // Restore the terminal before the default hook prints the panic
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            let _ = disable_raw_mode();
            let _ = execute!(io::stdout(), LeaveAlternateScreen);
            original_hook(panic_info);
        }));

        app.session_mut().load_databases();
        let result = self.run_event_loop(app).await;

        info!("Shutting down");
        app.session_mut().shutdown().await;

        let _ = panic::take_hook();

        result
    }

    async fn run_event_loop(&mut self, app: &mut App) -> Result<()> {
        while app.running {
            self.terminal
                .draw(|frame| ui::render(frame, app))
                .map_err(|e| AtlasError::internal(format!("Failed to draw: {e}")))?;

            // Both branches are cancel-safe
            let incoming = tokio::select! {
                event = self.event_handler.next() => Incoming::Terminal(event),
                event = app.session_mut().next_event() => Incoming::Session(event),
            };

            match incoming {
                Incoming::Terminal(event) => {
                    if let Some(event) = event? {
                        app.handle_event(event);
                    }
                }
                Incoming::Session(Some(event)) => {
                    debug!("Session event: {:?}", event);
                    app.apply(event);
                }
                // The session holds its own sender, so the channel never closes
                Incoming::Session(None) => {}
            }
        }

        Ok(())
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        let _ = self.restore_terminal();
    }
}

/// Runs the TUI over a session until the user quits.
pub async fn run(session: Session, source_info: impl Into<String>) -> Result<()> {
    let mut app = App::new(session, source_info);
    let mut tui = Tui::new()?;
    tui.run(&mut app).await
}
