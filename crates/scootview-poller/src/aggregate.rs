//! Whole-buffer poller.
//!
//! Each tick requests `{buffer}` for every visible buffer and draws one
//! chart per metric key found in the response, using the sample index as x.

use std::sync::Arc;

use scootview_common::types::BufferId;

use crate::event::{PollHandler, PollerKind};
use crate::request::{self, Request, Target};
use crate::source::MetricSource;
use crate::task::{Poller, TickReport};
use crate::visibility::Visibility;

/// Fetches every metric of a buffer in one request.
pub struct AggregatePoller<S> {
    source: Arc<S>,
    buffers: Vec<BufferId>,
    visibility: Visibility,
    handler: Arc<dyn PollHandler>,
}

impl<S: MetricSource> AggregatePoller<S> {
    /// Creates a poller over `buffers`. Every buffer is visible until a
    /// predicate is installed with [`with_visibility`](Self::with_visibility).
    pub fn new(source: Arc<S>, buffers: Vec<BufferId>, handler: Arc<dyn PollHandler>) -> Self {
        Self {
            source,
            buffers,
            visibility: Visibility::always(),
            handler,
        }
    }

    /// Replaces the visibility predicate consulted before each request.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Buffers polled by this poller, in request order.
    #[must_use]
    pub fn buffers(&self) -> &[BufferId] {
        &self.buffers
    }
}

impl<S: MetricSource> Poller for AggregatePoller<S> {
    fn kind(&self) -> PollerKind {
        PollerKind::Aggregate
    }

    async fn tick(&self, tick: u64) -> TickReport {
        let (visible, hidden): (Vec<_>, Vec<_>) = self
            .buffers
            .iter()
            .partition(|buffer| self.visibility.is_visible(buffer));

        for buffer in &hidden {
            tracing::trace!(buffer = %buffer, tick, "panel hidden, skipping");
        }

        let requests = visible
            .into_iter()
            .map(|buffer| Request {
                buffer: buffer.clone(),
                target: Target::Aggregate,
            })
            .collect();

        let mut report =
            request::fan_out(&self.source, &self.handler, PollerKind::Aggregate, tick, requests).await;
        report.skipped = hidden.len();
        report
    }
}
