//! Latest contents of every chart.
//!
//! The board is the rendering target the dashboard draws from. Clones share
//! state, so one clone can be handed to the pollers as their handler while
//! another is read by the UI.

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Local};
use scootview_common::constants::FAILURE_HISTORY;
use scootview_common::types::{BufferId, ChartId, Point};
use serde::Serialize;

use crate::error::FailureKind;
use crate::event::{ChartUpdate, PollEvent, PollFailure, PollHandler, PollerKind};

/// What a chart currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartState {
    /// Points from the most recent applied update.
    pub points: Vec<Point>,
    /// Poller that produced them.
    pub origin: PollerKind,
    /// Tick of `origin` that produced them.
    pub tick: u64,
    /// When the update was applied.
    pub updated_at: DateTime<Local>,
}

/// A failed request, kept for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// When the failure was recorded.
    pub at: DateTime<Local>,
    /// Poller that issued the request.
    pub origin: PollerKind,
    /// Tick of `origin` that issued it.
    pub tick: u64,
    /// Buffer the request was for.
    pub buffer: BufferId,
    /// Network or payload failure.
    #[serde(skip)]
    pub kind: FailureKind,
    /// Rendered error message.
    pub message: String,
}

/// Running totals since the board was created.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BoardStats {
    /// Updates applied to a chart.
    pub applied: u64,
    /// Updates dropped because a newer tick of the same poller had landed.
    pub stale: u64,
    /// Failure events received.
    pub failed: u64,
}

#[derive(Debug, Default)]
struct BoardInner {
    charts: BTreeMap<ChartId, ChartState>,
    newest_tick: BTreeMap<(ChartId, PollerKind), u64>,
    failures: VecDeque<FailureRecord>,
    stats: BoardStats,
}

/// Shared store of chart contents and recent failures.
#[derive(Debug, Clone, Default)]
pub struct ChartBoard {
    inner: Arc<Mutex<BoardInner>>,
}

impl ChartBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, BoardInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Redraws a chart. Returns `false` if the update came from an older
    /// tick of the same poller than the one already shown.
    pub fn apply(&self, update: ChartUpdate) -> bool {
        let mut inner = self.lock();
        let key = (update.chart.clone(), update.origin);

        if let Some(&newest) = inner.newest_tick.get(&key) {
            if update.tick < newest {
                inner.stats.stale += 1;
                tracing::debug!(
                    chart = %update.chart,
                    origin = %update.origin,
                    tick = update.tick,
                    newest,
                    "dropping stale chart update"
                );
                return false;
            }
        }

        let _ = inner.newest_tick.insert(key, update.tick);
        let _ = inner.charts.insert(update.chart, ChartState {
            points: update.points,
            origin: update.origin,
            tick: update.tick,
            updated_at: Local::now(),
        });
        inner.stats.applied += 1;
        true
    }

    /// Remembers a failed request, evicting the oldest beyond the history limit.
    pub fn record_failure(&self, failure: &PollFailure) {
        let mut inner = self.lock();
        inner.stats.failed += 1;
        if inner.failures.len() == FAILURE_HISTORY {
            let _ = inner.failures.pop_front();
        }
        inner.failures.push_back(FailureRecord {
            at: Local::now(),
            origin: failure.origin,
            tick: failure.tick,
            buffer: failure.buffer.clone(),
            kind: failure.error.kind(),
            message: failure.error.to_string(),
        });
    }

    /// Current contents of one chart.
    #[must_use]
    pub fn chart(&self, id: &ChartId) -> Option<ChartState> {
        self.lock().charts.get(id).cloned()
    }

    /// Every chart of a buffer, ordered by metric name.
    #[must_use]
    pub fn charts_for(&self, buffer: &BufferId) -> Vec<(ChartId, ChartState)> {
        self.lock()
            .charts
            .iter()
            .filter(|(id, _)| id.buffer() == buffer)
            .map(|(id, state)| (id.clone(), state.clone()))
            .collect()
    }

    /// Copy of every chart.
    #[must_use]
    pub fn snapshot(&self) -> BTreeMap<ChartId, ChartState> {
        self.lock().charts.clone()
    }

    /// Recent failures, oldest first.
    #[must_use]
    pub fn recent_failures(&self) -> Vec<FailureRecord> {
        self.lock().failures.iter().cloned().collect()
    }

    /// The most recent failure, if any.
    #[must_use]
    pub fn last_failure(&self) -> Option<FailureRecord> {
        self.lock().failures.back().cloned()
    }

    /// Running totals.
    #[must_use]
    pub fn stats(&self) -> BoardStats {
        self.lock().stats
    }
}

impl PollHandler for ChartBoard {
    fn handle(&self, event: PollEvent) {
        match event {
            PollEvent::ChartDrawn(update) => {
                let _ = self.apply(update);
            }
            PollEvent::FetchFailed(failure) => self.record_failure(&failure),
        }
    }
}

#[cfg(test)]
mod tests {
    use scootview_common::types::MetricName;

    use super::*;
    use crate::error::FetchError;

    fn chart(buffer: &str, metric: &str) -> ChartId {
        ChartId::new(BufferId::new(buffer), MetricName::new(metric))
    }

    fn update(id: &ChartId, origin: PollerKind, tick: u64, y: f64) -> ChartUpdate {
        ChartUpdate {
            chart: id.clone(),
            origin,
            tick,
            points: vec![(0.0, y)],
        }
    }

    #[test]
    fn newer_update_replaces_points() {
        let board = ChartBoard::new();
        let id = chart("playback", "bandwidth");

        assert!(board.apply(update(&id, PollerKind::Aggregate, 1, 10.0)));
        assert!(board.apply(update(&id, PollerKind::Aggregate, 2, 20.0)));
        assert_eq!(board.chart(&id).expect("chart").points, vec![(0.0, 20.0)]);
    }

    #[test]
    fn late_response_from_older_tick_is_dropped() {
        let board = ChartBoard::new();
        let id = chart("playback", "bandwidth");

        assert!(board.apply(update(&id, PollerKind::PerMetric, 5, 50.0)));
        assert!(!board.apply(update(&id, PollerKind::PerMetric, 4, 40.0)));

        let state = board.chart(&id).expect("chart");
        assert_eq!(state.tick, 5);
        assert_eq!(board.stats().stale, 1);
    }

    #[test]
    fn different_pollers_are_last_write_wins() {
        let board = ChartBoard::new();
        let id = chart("download", "time_buffer");

        assert!(board.apply(update(&id, PollerKind::PerMetric, 9, 1.0)));
        assert!(board.apply(update(&id, PollerKind::Aggregate, 1, 2.0)));
        assert_eq!(board.chart(&id).expect("chart").origin, PollerKind::Aggregate);
    }

    #[test]
    fn charts_for_filters_by_buffer() {
        let board = ChartBoard::new();
        let _ = board.apply(update(&chart("playback", "a"), PollerKind::Aggregate, 1, 1.0));
        let _ = board.apply(update(&chart("playback", "b"), PollerKind::Aggregate, 1, 1.0));
        let _ = board.apply(update(&chart("download", "a"), PollerKind::Aggregate, 1, 1.0));

        let playback = board.charts_for(&BufferId::new("playback"));
        assert_eq!(playback.len(), 2);
        assert!(playback.iter().all(|(id, _)| id.buffer().as_str() == "playback"));
    }

    #[test]
    fn failure_history_is_bounded() {
        let board = ChartBoard::new();
        for tick in 0..(FAILURE_HISTORY as u64 + 5) {
            board.handle(PollEvent::FetchFailed(PollFailure {
                origin: PollerKind::Aggregate,
                tick,
                buffer: BufferId::new("playback"),
                error: FetchError::Status {
                    path: "playback".into(),
                    status: 500,
                },
            }));
        }

        let failures = board.recent_failures();
        assert_eq!(failures.len(), FAILURE_HISTORY);
        assert_eq!(failures[0].tick, 5);
        assert_eq!(board.last_failure().expect("failure").kind, FailureKind::Network);
        assert_eq!(board.stats().failed, FAILURE_HISTORY as u64 + 5);
        assert!(board.snapshot().is_empty());
    }
}
