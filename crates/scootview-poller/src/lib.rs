//! # scootview-poller
//!
//! Periodically fetches metric series from a player's HTTP endpoint and
//! turns every response into chart updates.
//!
//! Provides:
//! - [`MetricSource`](source::MetricSource): where responses come from, with
//!   [`HttpSource`](source::HttpSource) as the production implementation.
//! - [`AggregatePoller`](aggregate::AggregatePoller): one request per visible
//!   buffer, one chart per metric in the response.
//! - [`PerMetricPoller`](per_metric::PerMetricPoller): one request per
//!   configured metric, paired with `time_elapsed`.
//! - [`spawn_poll_task`](task::spawn_poll_task): drives a poller on its own
//!   timer and returns a cancellable [`PollHandle`](task::PollHandle).
//! - [`ChartBoard`](board::ChartBoard): a [`PollHandler`](event::PollHandler)
//!   holding the latest points of every chart.

#![cfg_attr(test, allow(clippy::expect_used, clippy::unwrap_used))]

pub mod aggregate;
pub mod board;
pub mod error;
pub mod event;
pub mod payload;
pub mod per_metric;
mod request;
pub mod source;
pub mod task;
pub mod visibility;
