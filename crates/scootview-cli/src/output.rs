//! Formatted output helpers for CLI commands.
//!
//! Summarizes the chart board as a plain table or as JSON.

use std::collections::BTreeMap;
use std::fmt::Write as _;

use scootview_common::error::Result;
use scootview_common::types::{ChartId, Point};
use scootview_poller::board::{BoardStats, ChartState, FailureRecord};
use scootview_poller::event::PollerKind;
use serde::Serialize;

/// One chart reduced to what fits on a line.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSummary {
    /// Number of points drawn.
    pub points: usize,
    /// Poller that drew the chart last.
    pub origin: PollerKind,
    /// Tick that drew it.
    pub tick: u64,
    /// Y value of the last point, if any.
    pub last: Option<f64>,
    /// Smallest and largest Y value, if any.
    pub range: Option<(f64, f64)>,
}

impl ChartSummary {
    fn from_state(state: &ChartState) -> Self {
        Self {
            points: state.points.len(),
            origin: state.origin,
            tick: state.tick,
            last: state.points.last().map(|&(_, y)| y),
            range: y_range(&state.points),
        }
    }
}

/// Everything the `poll` command reports when it finishes.
#[derive(Debug, Clone, Serialize)]
pub struct PollSummary {
    /// Board counters.
    pub stats: BoardStats,
    /// Charts keyed by mount point.
    pub charts: BTreeMap<String, ChartSummary>,
    /// Most recent failures, oldest first.
    pub failures: Vec<FailureRecord>,
}

/// Builds the summary of a board snapshot.
#[must_use]
pub fn summarize(
    charts: &BTreeMap<ChartId, ChartState>,
    stats: BoardStats,
    failures: Vec<FailureRecord>,
) -> PollSummary {
    PollSummary {
        stats,
        charts: charts
            .iter()
            .map(|(id, state)| (id.to_string(), ChartSummary::from_state(state)))
            .collect(),
        failures,
    }
}

/// Renders the summary as pretty-printed JSON.
///
/// # Errors
///
/// Returns `ScootviewError::Serialization` if the summary cannot be encoded.
pub fn to_json(summary: &PollSummary) -> Result<String> {
    Ok(serde_json::to_string_pretty(summary)?)
}

fn y_range(points: &[Point]) -> Option<(f64, f64)> {
    points.iter().fold(None, |range, &(_, y)| match range {
        None => Some((y, y)),
        Some((lo, hi)) => Some((f64::min(lo, y), f64::max(hi, y))),
    })
}

fn format_optional(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"))
}

/// Renders the summary as a fixed-width table followed by the counters.
#[must_use]
pub fn format_table(summary: &PollSummary) -> String {
    let mut out = String::new();
    if summary.charts.is_empty() {
        out.push_str("No charts drawn.\n");
    } else {
        let _ = writeln!(
            out,
            "{:<40} {:>6} {:<11} {:>6} {:>12} {:>25}",
            "CHART", "POINTS", "ORIGIN", "TICK", "LAST", "RANGE"
        );
        for (id, chart) in &summary.charts {
            let range = chart.range.map_or_else(
                || "-".to_string(),
                |(lo, hi)| format!("{lo:.2}..{hi:.2}"),
            );
            let _ = writeln!(
                out,
                "{:<40} {:>6} {:<11} {:>6} {:>12} {:>25}",
                id,
                chart.points,
                chart.origin.to_string(),
                chart.tick,
                format_optional(chart.last),
                range
            );
        }
    }

    let _ = writeln!(
        out,
        "\napplied {}  stale {}  failed {}",
        summary.stats.applied, summary.stats.stale, summary.stats.failed
    );
    for failure in &summary.failures {
        let _ = writeln!(
            out,
            "  {} {} #{} {}",
            failure.at.format("%H:%M:%S"),
            failure.origin,
            failure.tick,
            failure.message
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use chrono::Local;
    use scootview_common::types::{BufferId, MetricName};

    use super::*;

    fn board_with(points: Vec<Point>) -> BTreeMap<ChartId, ChartState> {
        let mut charts = BTreeMap::new();
        let _ = charts.insert(
            ChartId::new(BufferId::new("playback"), MetricName::new("bandwidth")),
            ChartState {
                points,
                origin: PollerKind::PerMetric,
                tick: 4,
                updated_at: Local::now(),
            },
        );
        charts
    }

    #[test]
    fn summary_keys_charts_by_mount_point() {
        let summary = summarize(
            &board_with(vec![(0.0, 3.0), (1.0, 1.0), (2.0, 2.0)]),
            BoardStats::default(),
            Vec::new(),
        );
        let chart = &summary.charts["playback-bandwidth"];
        assert_eq!(chart.points, 3);
        assert_eq!(chart.last, Some(2.0));
        assert_eq!(chart.range, Some((1.0, 3.0)));
    }

    #[test]
    fn empty_chart_has_no_range() {
        let summary = summarize(&board_with(Vec::new()), BoardStats::default(), Vec::new());
        let chart = &summary.charts["playback-bandwidth"];
        assert_eq!(chart.last, None);
        assert_eq!(chart.range, None);
    }

    #[test]
    fn table_lists_each_chart() {
        let summary = summarize(
            &board_with(vec![(0.0, 1.5)]),
            BoardStats {
                applied: 1,
                stale: 0,
                failed: 2,
            },
            Vec::new(),
        );
        let table = format_table(&summary);
        assert!(table.starts_with("CHART"));
        assert!(table.contains("playback-bandwidth"));
        assert!(table.contains("per-metric"));
        assert!(table.contains("1.50..1.50"));
        assert!(table.contains("applied 1  stale 0  failed 2"));
    }

    #[test]
    fn table_reports_empty_board() {
        let summary = summarize(&BTreeMap::new(), BoardStats::default(), Vec::new());
        assert!(format_table(&summary).starts_with("No charts drawn."));
    }

    #[test]
    fn json_uses_string_keys() {
        let summary = summarize(&board_with(vec![(0.0, 1.0)]), BoardStats::default(), Vec::new());
        let json: serde_json::Value = serde_json::from_str(&to_json(&summary).unwrap()).unwrap();
        assert_eq!(json["charts"]["playback-bandwidth"]["origin"], "per-metric");
        assert_eq!(json["stats"]["applied"], 0);
    }
}
