//! Terminal event handling.
//!
//! Captures keyboard and resize events from the terminal. When nothing
//! happens within the refresh period a [`TerminalEvent::Tick`] is produced
//! so the dashboard redraws with whatever the pollers delivered meanwhile.

use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};

/// Terminal input events.
#[derive(Debug, Clone)]
pub enum TerminalEvent {
    /// A key was pressed.
    Key(KeyEvent),
    /// The terminal was resized.
    Resize(u16, u16),
    /// A periodic tick for UI refresh.
    Tick,
}

/// Waits up to `timeout` for the next terminal event.
///
/// # Errors
///
/// Returns an error if the terminal cannot be polled or read.
pub fn next(timeout: Duration) -> std::io::Result<TerminalEvent> {
    if !event::poll(timeout)? {
        return Ok(TerminalEvent::Tick);
    }
    Ok(match event::read()? {
        Event::Key(key) if key.kind == KeyEventKind::Press => TerminalEvent::Key(key),
        Event::Resize(width, height) => TerminalEvent::Resize(width, height),
        _ => TerminalEvent::Tick,
    })
}
