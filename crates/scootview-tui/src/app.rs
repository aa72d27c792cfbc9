//! TUI application state.
//!
//! Holds the buffer selection and pause flag, and shares panel visibility
//! and chart contents with the pollers.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use scootview_common::types::BufferId;
use scootview_poller::board::ChartBoard;
use scootview_poller::visibility::PanelVisibility;

/// What a key press changed that the caller must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyOutcome {
    /// Nothing outside the dashboard changed.
    Handled,
    /// Polling should be paused (`true`) or resumed (`false`).
    PauseChanged(bool),
}

/// Root application state for the TUI.
#[derive(Debug)]
pub struct App {
    /// Whether the app should continue running.
    pub running: bool,
    /// Buffers in display order.
    pub buffers: Vec<BufferId>,
    /// Index of the selected buffer tab.
    pub selected_index: usize,
    /// Whether polling is paused.
    pub paused: bool,
    /// Endpoint shown in the header.
    pub endpoint: String,
    /// Panel visibility shared with the aggregate poller.
    pub panels: PanelVisibility,
    /// Chart contents written by the pollers.
    pub board: ChartBoard,
}

impl App {
    /// Creates application state over shared panels and board.
    #[must_use]
    pub fn new(
        buffers: Vec<BufferId>,
        endpoint: impl Into<String>,
        panels: PanelVisibility,
        board: ChartBoard,
    ) -> Self {
        Self {
            running: true,
            buffers,
            selected_index: 0,
            paused: false,
            endpoint: endpoint.into(),
            panels,
            board,
        }
    }

    /// Signals the app to quit.
    pub fn quit(&mut self) {
        self.running = false;
    }

    /// Currently selected buffer.
    #[must_use]
    pub fn selected_buffer(&self) -> Option<&BufferId> {
        self.buffers.get(self.selected_index)
    }

    /// Moves the selection one tab to the right, wrapping around.
    pub fn select_next(&mut self) {
        if !self.buffers.is_empty() {
            self.selected_index = (self.selected_index + 1) % self.buffers.len();
        }
    }

    /// Moves the selection one tab to the left, wrapping around.
    pub fn select_previous(&mut self) {
        if !self.buffers.is_empty() {
            self.selected_index = self
                .selected_index
                .checked_sub(1)
                .unwrap_or(self.buffers.len() - 1);
        }
    }

    /// Shows or hides the selected buffer's panel. Returns the new visibility.
    pub fn toggle_selected(&mut self) -> Option<bool> {
        let buffer = self.selected_buffer()?.clone();
        Some(self.panels.toggle(&buffer))
    }

    /// Flips the pause flag and returns the new state.
    pub fn toggle_pause(&mut self) -> bool {
        self.paused = !self.paused;
        self.paused
    }

    /// Applies a key press.
    pub fn handle_key(&mut self, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.quit(),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => self.quit(),
            KeyCode::Tab | KeyCode::Right => self.select_next(),
            KeyCode::BackTab | KeyCode::Left => self.select_previous(),
            KeyCode::Char('v') => {
                let _ = self.toggle_selected();
            }
            KeyCode::Char('p') => return KeyOutcome::PauseChanged(self.toggle_pause()),
            _ => {}
        }
        KeyOutcome::Handled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_app() -> App {
        App::new(
            vec![BufferId::new("playback"), BufferId::new("download")],
            "http://127.0.0.1:5000",
            PanelVisibility::new(),
            ChartBoard::new(),
        )
    }

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn tab_selection_wraps_both_ways() {
        let mut app = new_app();
        let _ = app.handle_key(press(KeyCode::Left));
        assert_eq!(app.selected_buffer(), Some(&BufferId::new("download")));
        let _ = app.handle_key(press(KeyCode::Tab));
        assert_eq!(app.selected_buffer(), Some(&BufferId::new("playback")));
    }

    #[test]
    fn v_toggles_the_selected_panel_only() {
        let mut app = new_app();
        let _ = app.handle_key(press(KeyCode::Char('v')));
        assert!(!app.panels.is_visible(&BufferId::new("playback")));
        assert!(app.panels.is_visible(&BufferId::new("download")));
    }

    #[test]
    fn p_reports_pause_changes() {
        let mut app = new_app();
        assert_eq!(
            app.handle_key(press(KeyCode::Char('p'))),
            KeyOutcome::PauseChanged(true)
        );
        assert_eq!(
            app.handle_key(press(KeyCode::Char('p'))),
            KeyOutcome::PauseChanged(false)
        );
    }

    #[test]
    fn q_and_ctrl_c_quit() {
        let mut app = new_app();
        let _ = app.handle_key(press(KeyCode::Char('q')));
        assert!(!app.running);

        let mut app = new_app();
        let _ = app.handle_key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL));
        assert!(!app.running);
    }

    #[test]
    fn empty_buffer_list_is_harmless() {
        let mut app = App::new(Vec::new(), "", PanelVisibility::new(), ChartBoard::new());
        app.select_next();
        app.select_previous();
        assert_eq!(app.toggle_selected(), None);
    }
}
