//! Main dashboard layout.
//!
//! Header with one tab per buffer, a panel per buffer stacked vertically,
//! and a status footer with counters, the last failure, and keybindings.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Tabs};

use crate::app::App;
use crate::ui::metrics::render_panel;

/// Renders the main dashboard view.
pub fn render_dashboard(frame: &mut Frame, app: &App) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Fill(1),
        Constraint::Length(2),
    ])
    .areas(frame.area());

    render_header(frame, header, app);
    render_panels(frame, body, app);
    render_footer(frame, footer, app);
}

fn render_header(frame: &mut Frame, area: Rect, app: &App) {
    let titles: Vec<Line<'_>> = app
        .buffers
        .iter()
        .map(|buffer| {
            let marker = if app.panels.is_visible(buffer) { "●" } else { "○" };
            Line::from(format!("{marker} {buffer}"))
        })
        .collect();

    let state = if app.paused { "paused" } else { "polling" };
    let tabs = Tabs::new(titles)
        .select(app.selected_index)
        .highlight_style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" scootview: {} [{state}] ", app.endpoint)),
        );
    frame.render_widget(tabs, area);
}

fn render_panels(frame: &mut Frame, area: Rect, app: &App) {
    if app.buffers.is_empty() {
        frame.render_widget(Paragraph::new("No buffers configured."), area);
        return;
    }

    let constraints: Vec<Constraint> = app
        .buffers
        .iter()
        .map(|buffer| {
            if app.panels.is_visible(buffer) {
                Constraint::Fill(1)
            } else {
                Constraint::Length(3)
            }
        })
        .collect();
    let areas = Layout::vertical(constraints).split(area);

    for (buffer, panel) in app.buffers.iter().zip(areas.iter()) {
        if app.panels.is_visible(buffer) {
            render_panel(frame, *panel, app, buffer);
        } else {
            let hidden = Paragraph::new("hidden, press v to show")
                .style(Style::default().fg(Color::DarkGray))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .title(format!(" {} ", buffer.panel_id())),
                );
            frame.render_widget(hidden, *panel);
        }
    }
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
    let stats = app.board.stats();
    let failure = app.board.last_failure().map_or_else(
        || Span::styled("no failures", Style::default().fg(Color::Green)),
        |f| {
            Span::styled(
                format!("{} {}", f.at.format("%H:%M:%S"), f.message),
                Style::default().fg(Color::Red),
            )
        },
    );

    let lines = vec![
        Line::from(vec![
            Span::raw(format!(
                "applied {}  stale {}  failed {}  │ ",
                stats.applied, stats.stale, stats.failed
            )),
            failure,
        ]),
        Line::from(Span::styled(
            "q quit · tab/←/→ select · v show/hide panel · p pause",
            Style::default().fg(Color::DarkGray),
        )),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}
