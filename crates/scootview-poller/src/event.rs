//! Poll outcomes and the handler that receives them.
//!
//! Every request of every tick ends in exactly one call to
//! [`PollHandler::handle`] per chart drawn, or one failure event.

use std::fmt;

use scootview_common::types::{BufferId, ChartId, Point};
use serde::Serialize;

use crate::error::FetchError;

/// Which poller produced an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PollerKind {
    /// Whole-buffer fetches.
    Aggregate,
    /// One fetch per metric.
    PerMetric,
}

impl fmt::Display for PollerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => write!(f, "aggregate"),
            Self::PerMetric => write!(f, "per-metric"),
        }
    }
}

/// New contents for one chart. Charts are redrawn wholesale.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartUpdate {
    /// Chart to redraw.
    pub chart: ChartId,
    /// Poller that fetched the data.
    pub origin: PollerKind,
    /// Tick of `origin` that issued the request.
    pub tick: u64,
    /// Points to draw.
    pub points: Vec<Point>,
}

/// A request that produced no chart update.
#[derive(Debug)]
pub struct PollFailure {
    /// Poller that issued the request.
    pub origin: PollerKind,
    /// Tick of `origin` that issued the request.
    pub tick: u64,
    /// Buffer the request was for.
    pub buffer: BufferId,
    /// What went wrong.
    pub error: FetchError,
}

/// Outcome of a single request.
#[derive(Debug)]
pub enum PollEvent {
    /// A chart received new points.
    ChartDrawn(ChartUpdate),
    /// A request failed; no chart was touched.
    FetchFailed(PollFailure),
}

/// Receives poll outcomes. Called from poller tasks, in completion order.
pub trait PollHandler: Send + Sync + 'static {
    /// Handles one event.
    fn handle(&self, event: PollEvent);
}

impl<F> PollHandler for F
where
    F: Fn(PollEvent) + Send + Sync + 'static,
{
    fn handle(&self, event: PollEvent) {
        self(event);
    }
}
