//! `scootview poll`: headless polling with a summary at the end.

use std::sync::Arc;

use anyhow::Context;
use clap::Args;
use scootview_common::config::ViewerConfig;
use scootview_poller::board::ChartBoard;
use scootview_poller::event::{PollEvent, PollHandler};
use scootview_poller::task::PollHandle;

use super::{Pollers, initial_panels};
use crate::output;

/// Arguments for the `poll` command.
#[derive(Args, Debug)]
pub struct PollArgs {
    /// Stop after this many ticks of each poller. Without it, poll until Ctrl-C.
    #[arg(long, short = 'n', value_parser = clap::value_parser!(u64).range(1..))]
    pub ticks: Option<u64>,

    /// Print the summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

/// Executes the `poll` command.
///
/// Every chart update and failure is logged as it arrives; the final state
/// of each chart is printed once polling stops.
///
/// # Errors
///
/// Returns an error if the runtime or HTTP client cannot be created, or if
/// the summary cannot be serialized.
pub fn execute(config: &ViewerConfig, args: &PollArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let _guard = runtime.enter();

    let board = ChartBoard::new();
    let panels = initial_panels(config);
    let handler = logging_handler(board.clone());
    let pollers = Pollers::build(config, &handler, &panels)?;

    match args.ticks {
        Some(ticks) => runtime.block_on(run_ticks(pollers, config, ticks))?,
        None => runtime.block_on(run_until_interrupted(pollers, config))?,
    }

    let summary = output::summarize(&board.snapshot(), board.stats(), board.recent_failures());
    if args.json {
        println!("{}", output::to_json(&summary)?);
    } else {
        print!("{}", output::format_table(&summary));
    }
    Ok(())
}

/// Logs each event, then hands it to `board`.
fn logging_handler(board: ChartBoard) -> Arc<dyn PollHandler> {
    Arc::new(move |event: PollEvent| {
        match &event {
            PollEvent::ChartDrawn(update) => tracing::info!(
                chart = %update.chart,
                poller = %update.origin,
                tick = update.tick,
                points = update.points.len(),
                "chart drawn"
            ),
            PollEvent::FetchFailed(failure) => tracing::warn!(
                buffer = %failure.buffer,
                poller = %failure.origin,
                tick = failure.tick,
                error = %failure.error,
                "fetch failed"
            ),
        }
        board.handle(event);
    })
}

/// Runs `ticks` ticks of each poller on its own timer, then stops.
///
/// Ticks still overlap as in the dashboard; a tick that has not finished
/// one period after the last one fired is abandoned. Ctrl-C stops early.
async fn run_ticks(pollers: Pollers, config: &ViewerConfig, ticks: u64) -> anyhow::Result<()> {
    let mut handles = pollers.spawn(config, Some(ticks));
    tracing::info!(
        endpoint = %config.endpoint,
        pollers = handles.len(),
        ticks,
        "polling"
    );

    tokio::select! {
        () = async {
            for handle in &mut handles {
                handle.wait().await;
            }
        } => {}
        signal = tokio::signal::ctrl_c() => {
            signal.context("waiting for Ctrl-C")?;
            tracing::info!("interrupted");
        }
    }

    stop(handles).await;
    Ok(())
}

async fn run_until_interrupted(pollers: Pollers, config: &ViewerConfig) -> anyhow::Result<()> {
    let handles = pollers.spawn(config, None);
    tracing::info!(
        endpoint = %config.endpoint,
        pollers = handles.len(),
        "polling until interrupted"
    );

    let signal = tokio::signal::ctrl_c().await;
    stop(handles).await;
    signal.context("waiting for Ctrl-C")
}

async fn stop(handles: Vec<PollHandle>) {
    for handle in handles {
        let ticks = handle.ticks_fired();
        let kind = handle.kind();
        handle.shutdown().await;
        tracing::info!(poller = %kind, ticks, "poll task stopped");
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use clap::Parser;
    use scootview_common::config::PollMode;
    use scootview_poller::visibility::PanelVisibility;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    /// Accepts connections and holds them open without ever answering.
    async fn silent_endpoint() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                open.push(stream);
            }
        });
        format!("http://{addr}")
    }

    /// Answers every request with the same JSON body.
    async fn answering_endpoint(body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let _server = tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let _ = tokio::spawn(async move {
                    let mut buf = [0u8; 2048];
                    let _ = stream.read(&mut buf).await;
                    let response = format!(
                        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        format!("http://{addr}")
    }

    fn aggregate_config(endpoint: String) -> ViewerConfig {
        ViewerConfig {
            endpoint,
            interval_ms: 10,
            mode: PollMode::Aggregate,
            ..ViewerConfig::default()
        }
    }

    #[tokio::test]
    async fn bounded_run_finishes_when_endpoint_never_answers() {
        let config = aggregate_config(silent_endpoint().await);
        let board = ChartBoard::new();
        let pollers =
            Pollers::build(&config, &logging_handler(board.clone()), &PanelVisibility::new())
                .unwrap();

        tokio::time::timeout(Duration::from_millis(500), run_ticks(pollers, &config, 3))
            .await
            .expect("bounded run returns")
            .unwrap();

        assert!(board.snapshot().is_empty());
    }

    #[tokio::test]
    async fn bounded_run_draws_charts_from_answered_ticks() {
        let mut config = aggregate_config(answering_endpoint(r#"{"bandwidth":[5,6]}"#).await);
        config.interval_ms = 100;
        let board = ChartBoard::new();
        let pollers =
            Pollers::build(&config, &logging_handler(board.clone()), &PanelVisibility::new())
                .unwrap();

        tokio::time::timeout(Duration::from_secs(2), run_ticks(pollers, &config, 2))
            .await
            .expect("bounded run returns")
            .unwrap();

        let charts = board.snapshot();
        assert_eq!(charts.len(), 2);
        assert!(charts.values().all(|c| c.points == vec![(0.0, 5.0), (1.0, 6.0)]));
    }

    #[test]
    fn zero_ticks_is_rejected() {
        assert!(crate::commands::Cli::try_parse_from(["scootview", "poll", "--ticks", "0"]).is_err());
    }
}
