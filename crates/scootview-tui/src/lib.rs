//! # scootview-tui
//!
//! Interactive terminal dashboard for scootview.
//!
//! Built with `ratatui` and `crossterm`, providing:
//! - One panel per buffer (`{buffer}_graphs`) that can be shown or hidden.
//! - One line chart per metric (`{buffer}-{metric}`), redrawn from the
//!   shared [`ChartBoard`](scootview_poller::board::ChartBoard).
//! - A status line with update counters and the most recent fetch failure.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod app;
pub mod event;
pub mod ui;

pub use app::{App, KeyOutcome};

use std::time::Duration;

use ratatui::DefaultTerminal;

use crate::event::TerminalEvent;

/// Takes over the terminal and runs the dashboard until the user quits.
///
/// `on_pause` is called with the new state whenever polling is paused or
/// resumed from the keyboard. The terminal is restored on every exit path.
///
/// # Errors
///
/// Returns an error if the terminal cannot be drawn to or read from.
pub fn run<F>(app: &mut App, refresh: Duration, on_pause: F) -> std::io::Result<()>
where
    F: FnMut(bool),
{
    let mut terminal = ratatui::init();
    let result = event_loop(&mut terminal, app, refresh, on_pause);
    ratatui::restore();
    result
}

fn event_loop<F>(
    terminal: &mut DefaultTerminal,
    app: &mut App,
    refresh: Duration,
    mut on_pause: F,
) -> std::io::Result<()>
where
    F: FnMut(bool),
{
    tracing::info!(buffers = app.buffers.len(), "dashboard started");
    while app.running {
        let _ = terminal.draw(|frame| ui::render(frame, app))?;

        match event::next(refresh)? {
            TerminalEvent::Key(key) => {
                if let KeyOutcome::PauseChanged(paused) = app.handle_key(key) {
                    on_pause(paused);
                }
            }
            TerminalEvent::Resize(width, height) => {
                tracing::trace!(width, height, "terminal resized");
            }
            TerminalEvent::Tick => {}
        }
    }
    tracing::info!("dashboard closed");
    Ok(())
}
