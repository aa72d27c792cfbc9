//! Timer-driven poll tasks.
//!
//! Each poller runs on its own tokio task with its own interval. The task is
//! owned through the [`PollHandle`] returned by [`spawn_poll_task`]; dropping
//! the handle stops the timer and aborts requests still in flight.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Duration;

use tokio::task::{JoinHandle, JoinSet};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::event::PollerKind;

/// Summary of one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Requests issued.
    pub requested: usize,
    /// Buffers skipped because their panel was hidden.
    pub skipped: usize,
    /// Chart updates delivered to the handler.
    pub charts_drawn: usize,
    /// Requests that ended in a failure event.
    pub failures: usize,
}

/// A fetch-and-render cycle that can be driven by a timer.
pub trait Poller: Send + Sync + 'static {
    /// Which poller this is, for events and logs.
    fn kind(&self) -> PollerKind;

    /// Runs one tick: issues every request and waits for all of them.
    fn tick(&self, tick: u64) -> impl Future<Output = TickReport> + Send;
}

/// Owned handle to a running poll task.
#[derive(Debug)]
pub struct PollHandle {
    kind: PollerKind,
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
}

impl PollHandle {
    /// Which poller the task drives.
    #[must_use]
    pub const fn kind(&self) -> PollerKind {
        self.kind
    }

    /// Skips ticks until [`resume`](Self::resume) is called. The timer keeps running.
    pub fn pause(&self) {
        self.paused.store(true, Ordering::Relaxed);
        tracing::info!(poller = %self.kind, "poll task paused");
    }

    /// Resumes ticking after [`pause`](Self::pause).
    pub fn resume(&self) {
        self.paused.store(false, Ordering::Relaxed);
        tracing::info!(poller = %self.kind, "poll task resumed");
    }

    /// Whether ticks are currently skipped.
    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    /// Number of ticks that issued requests so far.
    #[must_use]
    pub fn ticks_fired(&self) -> u64 {
        self.ticks.load(Ordering::Relaxed)
    }

    /// Signals the task to stop and returns immediately.
    ///
    /// Requests already in flight may still deliver events until the task
    /// observes the signal and aborts them. Await [`shutdown`](Self::shutdown)
    /// to be sure no further events reach the handler.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Whether the task has exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.as_ref().is_none_or(JoinHandle::is_finished)
    }

    /// Waits until the task exits on its own, which only happens for tasks
    /// started with [`spawn_bounded_poll_task`] or after [`cancel`](Self::cancel).
    pub async fn wait(&mut self) {
        if let Some(task) = self.task.as_mut() {
            if let Err(e) = task.await {
                tracing::warn!(poller = %self.kind, error = %e, "poll task ended abnormally");
            }
            self.task = None;
        }
    }

    /// Cancels the task and waits for it to exit. In-flight requests are
    /// aborted; once this returns the handler receives no further events.
    pub async fn shutdown(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::warn!(poller = %self.kind, error = %e, "poll task ended abnormally");
            }
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Starts `poller` on a timer firing every `period`.
///
/// The first tick fires immediately. Ticks may overlap when responses are
/// slower than `period`. Must be called from within a tokio runtime.
pub fn spawn_poll_task<P: Poller>(poller: P, period: Duration) -> PollHandle {
    spawn(poller, period, None)
}

/// Like [`spawn_poll_task`], but stops firing after `max_ticks` ticks.
///
/// Once the last tick has fired, outstanding ticks get one more `period` to
/// complete. Whatever is still in flight after that is aborted and the task
/// exits, so [`PollHandle::wait`] returns even if the endpoint never answers.
pub fn spawn_bounded_poll_task<P: Poller>(poller: P, period: Duration, max_ticks: u64) -> PollHandle {
    spawn(poller, period, Some(max_ticks))
}

fn spawn<P: Poller>(poller: P, period: Duration, max_ticks: Option<u64>) -> PollHandle {
    let kind = poller.kind();
    let cancel = CancellationToken::new();
    let paused = Arc::new(AtomicBool::new(false));
    let ticks = Arc::new(AtomicU64::new(0));

    let task = tokio::spawn(run(
        Arc::new(poller),
        period.max(Duration::from_millis(1)),
        max_ticks,
        cancel.clone(),
        Arc::clone(&paused),
        Arc::clone(&ticks),
    ));

    PollHandle {
        kind,
        cancel,
        paused,
        ticks,
        task: Some(task),
    }
}

async fn run<P: Poller>(
    poller: Arc<P>,
    period: Duration,
    max_ticks: Option<u64>,
    cancel: CancellationToken,
    paused: Arc<AtomicBool>,
    ticks: Arc<AtomicU64>,
) {
    let kind = poller.kind();
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight = JoinSet::new();
    // Set once the last allowed tick has fired.
    let mut drain_until: Option<Instant> = None;

    tracing::info!(poller = %kind, period_ms = period.as_millis(), max_ticks, "poll task started");

    loop {
        tokio::select! {
            () = cancel.cancelled() => break,

            _ = interval.tick(), if drain_until.is_none() => {
                if paused.load(Ordering::Relaxed) {
                    continue;
                }
                let tick = ticks.fetch_add(1, Ordering::Relaxed) + 1;
                let poller = Arc::clone(&poller);
                let _ = in_flight.spawn(async move { (tick, poller.tick(tick).await) });

                if max_ticks.is_some_and(|max| tick >= max) {
                    tracing::debug!(poller = %kind, tick, "tick limit reached");
                    drain_until = Some(Instant::now() + period);
                }
            }

            Some(joined) = in_flight.join_next(), if !in_flight.is_empty() => {
                match joined {
                    Ok((tick, report)) => tracing::debug!(
                        poller = %kind,
                        tick,
                        requested = report.requested,
                        skipped = report.skipped,
                        drawn = report.charts_drawn,
                        failures = report.failures,
                        "tick complete"
                    ),
                    Err(e) => tracing::warn!(poller = %kind, error = %e, "tick task failed"),
                }
            }

            () = tokio::time::sleep_until(drain_until.unwrap_or_else(Instant::now)), if drain_until.is_some() => {
                tracing::debug!(poller = %kind, pending = in_flight.len(), "abandoning unfinished ticks");
                break;
            }
        }

        if drain_until.is_some() && in_flight.is_empty() {
            break;
        }
    }

    in_flight.abort_all();
    tracing::info!(poller = %kind, ticks = ticks.load(Ordering::Relaxed), "poll task stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    struct CountingPoller {
        seen: Arc<std::sync::Mutex<Vec<u64>>>,
    }

    impl Poller for CountingPoller {
        fn kind(&self) -> PollerKind {
            PollerKind::Aggregate
        }

        async fn tick(&self, tick: u64) -> TickReport {
            self.seen.lock().unwrap().push(tick);
            TickReport::default()
        }
    }

    /// Starts every tick and never finishes one.
    struct StuckPoller {
        started: Arc<AtomicU64>,
    }

    impl Poller for StuckPoller {
        fn kind(&self) -> PollerKind {
            PollerKind::PerMetric
        }

        async fn tick(&self, _tick: u64) -> TickReport {
            let _ = self.started.fetch_add(1, Ordering::Relaxed);
            std::future::pending::<()>().await;
            TickReport::default()
        }
    }

    fn counting() -> (CountingPoller, Arc<std::sync::Mutex<Vec<u64>>>) {
        let seen = Arc::new(std::sync::Mutex::new(Vec::new()));
        (
            CountingPoller {
                seen: Arc::clone(&seen),
            },
            seen,
        )
    }

    #[tokio::test]
    async fn timer_keeps_firing_until_shutdown() {
        let (poller, seen) = counting();
        let handle = spawn_poll_task(poller, Duration::from_millis(10));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert!(handle.ticks_fired() >= 3, "fired {}", handle.ticks_fired());

        handle.shutdown().await;
        let after_shutdown = seen.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(seen.lock().unwrap().len(), after_shutdown);
    }

    #[tokio::test]
    async fn ticks_are_numbered_from_one() {
        let (poller, seen) = counting();
        let handle = spawn_poll_task(poller, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.shutdown().await;

        let mut ticks = seen.lock().unwrap().clone();
        ticks.sort_unstable();
        assert_eq!(ticks.first(), Some(&1));
        assert!(ticks.windows(2).all(|w| w[1] == w[0] + 1));
    }

    #[tokio::test]
    async fn paused_task_skips_ticks() {
        let (poller, _seen) = counting();
        let handle = spawn_poll_task(poller, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;

        handle.pause();
        assert!(handle.is_paused());
        tokio::time::sleep(Duration::from_millis(15)).await;
        let frozen = handle.ticks_fired();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(handle.ticks_fired(), frozen);

        handle.resume();
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.ticks_fired() > frozen);
        handle.shutdown().await;
    }

    #[tokio::test]
    async fn dropping_the_handle_stops_the_task() {
        let (poller, seen) = counting();
        let handle = spawn_poll_task(poller, Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(30)).await;
        drop(handle);

        tokio::time::sleep(Duration::from_millis(20)).await;
        let settled = seen.lock().unwrap().len();
        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(seen.lock().unwrap().len(), settled);
    }

    #[tokio::test]
    async fn bounded_task_stops_after_its_tick_limit() {
        let (poller, seen) = counting();
        let mut handle = spawn_bounded_poll_task(poller, Duration::from_millis(10), 3);

        tokio::time::timeout(Duration::from_secs(1), handle.wait())
            .await
            .expect("bounded task exits");

        assert!(handle.is_finished());
        assert_eq!(handle.ticks_fired(), 3);
        let mut ticks = seen.lock().unwrap().clone();
        ticks.sort_unstable();
        assert_eq!(ticks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn bounded_task_abandons_ticks_that_never_complete() {
        let started = Arc::new(AtomicU64::new(0));
        let poller = StuckPoller {
            started: Arc::clone(&started),
        };
        let mut handle = spawn_bounded_poll_task(poller, Duration::from_millis(10), 2);

        tokio::time::timeout(Duration::from_millis(500), handle.wait())
            .await
            .expect("stuck ticks are abandoned");

        assert_eq!(handle.ticks_fired(), 2);
        assert_eq!(started.load(Ordering::Relaxed), 2);
    }

    #[tokio::test]
    async fn wait_after_cancel_returns() {
        let (poller, _seen) = counting();
        let mut handle = spawn_poll_task(poller, Duration::from_millis(10));
        handle.cancel();
        tokio::time::timeout(Duration::from_millis(500), handle.wait())
            .await
            .expect("cancelled task exits");
        assert!(handle.is_finished());
    }
}
