//! Fan-out of one tick's requests.

use std::sync::Arc;

use scootview_common::types::{BufferId, ChartId, MetricName, Point};
use tokio::task::JoinSet;

use crate::error::FetchError;
use crate::event::{ChartUpdate, PollEvent, PollFailure, PollHandler, PollerKind};
use crate::payload;
use crate::source::MetricSource;
use crate::task::TickReport;

/// What a request asks for.
#[derive(Debug, Clone)]
pub(crate) enum Target {
    /// Every metric of the buffer.
    Aggregate,
    /// One metric paired with `time_elapsed`.
    Metric(MetricName),
}

/// A single request of a tick.
#[derive(Debug, Clone)]
pub(crate) struct Request {
    pub(crate) buffer: BufferId,
    pub(crate) target: Target,
}

impl Request {
    pub(crate) fn path(&self) -> String {
        match &self.target {
            Target::Aggregate => self.buffer.aggregate_path(),
            Target::Metric(metric) => self.buffer.metric_path(metric),
        }
    }

    fn decode(&self, path: &str, body: &str) -> Result<Vec<(MetricName, Vec<Point>)>, FetchError> {
        match &self.target {
            Target::Aggregate => payload::decode_aggregate(path, body),
            Target::Metric(metric) => {
                payload::decode_metric(path, body, metric).map(|points| vec![(metric.clone(), points)])
            }
        }
    }
}

/// Issues every request concurrently and reports each outcome to `handler`
/// as it completes.
pub(crate) async fn fan_out<S: MetricSource>(
    source: &Arc<S>,
    handler: &Arc<dyn PollHandler>,
    origin: PollerKind,
    tick: u64,
    requests: Vec<Request>,
) -> TickReport {
    let mut report = TickReport {
        requested: requests.len(),
        ..TickReport::default()
    };
    let mut in_flight = JoinSet::new();

    for request in requests {
        let source = Arc::clone(source);
        let handler = Arc::clone(handler);
        let _ = in_flight.spawn(async move {
            complete(source.as_ref(), handler.as_ref(), origin, tick, request).await
        });
    }

    while let Some(joined) = in_flight.join_next().await {
        match joined {
            Ok(Some(drawn)) => report.charts_drawn += drawn,
            Ok(None) => report.failures += 1,
            Err(e) => {
                tracing::warn!(origin = %origin, tick, error = %e, "poll request task failed");
                report.failures += 1;
            }
        }
    }
    report
}

/// Runs one request. Returns the number of charts drawn, or `None` on failure.
async fn complete<S: MetricSource>(
    source: &S,
    handler: &dyn PollHandler,
    origin: PollerKind,
    tick: u64,
    request: Request,
) -> Option<usize> {
    let path = request.path();
    let outcome = match source.fetch(&path).await {
        Ok(body) => request.decode(&path, &body),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(charts) => {
            let drawn = charts.len();
            for (metric, points) in charts {
                handler.handle(PollEvent::ChartDrawn(ChartUpdate {
                    chart: ChartId::new(request.buffer.clone(), metric),
                    origin,
                    tick,
                    points,
                }));
            }
            Some(drawn)
        }
        Err(error) => {
            tracing::debug!(origin = %origin, tick, path = %path, error = %error, "poll request failed");
            handler.handle(PollEvent::FetchFailed(PollFailure {
                origin,
                tick,
                buffer: request.buffer,
                error,
            }));
            None
        }
    }
}
