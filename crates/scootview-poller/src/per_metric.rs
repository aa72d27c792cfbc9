//! Per-metric poller.
//!
//! Each tick requests `{buffer}/{metric}` for every configured metric and
//! draws the metric against the `time_elapsed` series sent alongside it.
//! Unlike the aggregate poller it does not consult panel visibility unless
//! a predicate is installed.

use std::sync::Arc;

use scootview_common::config::BufferConfig;
use scootview_common::types::{BufferId, MetricName};

use crate::event::{PollHandler, PollerKind};
use crate::request::{self, Request, Target};
use crate::source::MetricSource;
use crate::task::{Poller, TickReport};
use crate::visibility::Visibility;

/// A buffer and the metrics fetched for it.
pub type MetricTargets = (BufferId, Vec<MetricName>);

/// Fetches one metric per request.
pub struct PerMetricPoller<S> {
    source: Arc<S>,
    targets: Vec<MetricTargets>,
    visibility: Visibility,
    handler: Arc<dyn PollHandler>,
}

impl<S: MetricSource> PerMetricPoller<S> {
    /// Creates a poller over explicit `(buffer, metrics)` targets.
    pub fn new(source: Arc<S>, targets: Vec<MetricTargets>, handler: Arc<dyn PollHandler>) -> Self {
        Self {
            source,
            targets,
            visibility: Visibility::always(),
            handler,
        }
    }

    /// Creates a poller from configured buffers and their metric lists.
    pub fn from_buffers(
        source: Arc<S>,
        buffers: &[BufferConfig],
        handler: Arc<dyn PollHandler>,
    ) -> Self {
        let targets = buffers
            .iter()
            .map(|b| (b.id.clone(), b.metrics.clone()))
            .collect();
        Self::new(source, targets, handler)
    }

    /// Installs a visibility predicate. Without one every buffer is polled.
    #[must_use]
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Number of requests a tick issues when every buffer is visible.
    #[must_use]
    pub fn requests_per_tick(&self) -> usize {
        self.targets.iter().map(|(_, metrics)| metrics.len()).sum()
    }
}

impl<S: MetricSource> Poller for PerMetricPoller<S> {
    fn kind(&self) -> PollerKind {
        PollerKind::PerMetric
    }

    async fn tick(&self, tick: u64) -> TickReport {
        let mut skipped = 0;
        let mut requests = Vec::with_capacity(self.requests_per_tick());

        for (buffer, metrics) in &self.targets {
            if !self.visibility.is_visible(buffer) {
                skipped += 1;
                continue;
            }
            requests.extend(metrics.iter().map(|metric| Request {
                buffer: buffer.clone(),
                target: Target::Metric(metric.clone()),
            }));
        }

        let mut report =
            request::fan_out(&self.source, &self.handler, PollerKind::PerMetric, tick, requests).await;
        report.skipped = skipped;
        report
    }
}
