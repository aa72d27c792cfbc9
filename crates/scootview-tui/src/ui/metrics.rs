//! Metric chart widgets.
//!
//! Every chart is redrawn wholesale from the board's latest points.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::symbols::Marker;
use ratatui::text::Span;
use ratatui::widgets::{Axis, Block, Borders, Chart, Dataset, GraphType, Paragraph};
use scootview_common::types::{BufferId, ChartId, Point};
use scootview_poller::board::ChartState;
use scootview_poller::event::PollerKind;

use crate::app::App;

/// Width at which a panel switches from two to four chart columns.
const WIDE_PANEL: u16 = 160;

/// Axis ranges covering `points`, as `([x_min, x_max], [y_min, y_max])`.
///
/// Degenerate ranges are widened so the chart never divides by zero, and
/// the y range gets five percent of headroom on each side.
#[must_use]
pub fn axis_bounds(points: &[Point]) -> ([f64; 2], [f64; 2]) {
    if points.is_empty() {
        return ([0.0, 1.0], [0.0, 1.0]);
    }

    let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in points {
        x_min = x_min.min(x);
        x_max = x_max.max(x);
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }

    if x_max <= x_min {
        x_max = x_min + 1.0;
    }
    if y_max <= y_min {
        y_min -= 1.0;
        y_max += 1.0;
    }
    let pad = (y_max - y_min) * 0.05;
    ([x_min, x_max], [y_min - pad, y_max + pad])
}

/// Short axis label, e.g. `1.5k` or `2.0M`.
#[must_use]
pub fn format_value(value: f64) -> String {
    let magnitude = value.abs();
    if magnitude >= 1_000_000.0 {
        format!("{:.1}M", value / 1_000_000.0)
    } else if magnitude >= 1_000.0 {
        format!("{:.1}k", value / 1_000.0)
    } else {
        format!("{value:.1}")
    }
}

const fn series_color(origin: PollerKind) -> Color {
    match origin {
        PollerKind::Aggregate => Color::Cyan,
        PollerKind::PerMetric => Color::Yellow,
    }
}

/// Renders every chart of `buffer` in a grid inside `area`.
pub fn render_panel(frame: &mut Frame, area: Rect, app: &App, buffer: &BufferId) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {} ", buffer.panel_id()));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let charts = app.board.charts_for(buffer);
    if charts.is_empty() {
        let waiting = Paragraph::new("Waiting for data...").style(Style::default().fg(Color::DarkGray));
        frame.render_widget(waiting, inner);
        return;
    }

    let columns = (if inner.width >= WIDE_PANEL { 4 } else { 2 }).min(charts.len());
    let rows = charts.len().div_ceil(columns);
    let row_areas = Layout::vertical(ratios(rows)).split(inner);

    for (row, row_area) in row_areas.iter().enumerate() {
        let cells = Layout::horizontal(ratios(columns)).split(*row_area);
        for (column, cell) in cells.iter().enumerate() {
            if let Some((id, state)) = charts.get(row * columns + column) {
                render_chart(frame, *cell, id, state);
            }
        }
    }
}

fn ratios(parts: usize) -> Vec<Constraint> {
    let parts = u32::try_from(parts.max(1)).unwrap_or(u32::MAX);
    (0..parts).map(|_| Constraint::Ratio(1, parts)).collect()
}

/// Renders one chart mount point.
pub fn render_chart(frame: &mut Frame, area: Rect, id: &ChartId, state: &ChartState) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(format!(" {id} "))
        .title_bottom(format!(" {} #{} ", state.origin, state.tick));

    if state.points.is_empty() {
        frame.render_widget(Paragraph::new("no samples").block(block), area);
        return;
    }

    let ([x_min, x_max], [y_min, y_max]) = axis_bounds(&state.points);
    let dataset = Dataset::default()
        .marker(Marker::Braille)
        .graph_type(GraphType::Line)
        .style(Style::default().fg(series_color(state.origin)))
        .data(&state.points);

    let axis_style = Style::default().fg(Color::DarkGray);
    let chart = Chart::new(vec![dataset])
        .block(block)
        .x_axis(
            Axis::default()
                .style(axis_style)
                .bounds([x_min, x_max])
                .labels(vec![Span::from(format_value(x_min)), Span::from(format_value(x_max))]),
        )
        .y_axis(
            Axis::default()
                .style(axis_style)
                .bounds([y_min, y_max])
                .labels(vec![
                    Span::from(format_value(y_min)),
                    Span::from(format_value((y_min + y_max) / 2.0)),
                    Span::from(format_value(y_max)),
                ]),
        );

    frame.render_widget(chart, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_cover_all_points() {
        let (x, y) = axis_bounds(&[(0.0, 10.0), (2.0, 30.0), (1.0, 20.0)]);
        assert_eq!(x, [0.0, 2.0]);
        assert!((y[0] - 9.0).abs() < 1e-9);
        assert!((y[1] - 31.0).abs() < 1e-9);
    }

    #[test]
    fn single_point_gets_a_usable_range() {
        let (x, y) = axis_bounds(&[(3.0, 5.0)]);
        assert_eq!(x, [3.0, 4.0]);
        assert!(y[0] < 5.0 && y[1] > 5.0);
    }

    #[test]
    fn empty_series_uses_unit_range() {
        assert_eq!(axis_bounds(&[]), ([0.0, 1.0], [0.0, 1.0]));
    }

    #[test]
    fn labels_are_abbreviated() {
        assert_eq!(format_value(12.34), "12.3");
        assert_eq!(format_value(1_500.0), "1.5k");
        assert_eq!(format_value(-2_000_000.0), "-2.0M");
    }
}
