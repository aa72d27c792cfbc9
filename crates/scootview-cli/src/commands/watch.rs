//! `scootview watch`: interactive chart dashboard.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use clap::Args;
use scootview_common::config::ViewerConfig;
use scootview_poller::board::ChartBoard;
use scootview_poller::event::PollHandler;
use scootview_poller::task::PollHandle;
use scootview_tui::App;

use super::{Pollers, initial_panels};

/// Arguments for the `watch` command.
#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Append logs to this file. Without it, logs are discarded while the
    /// dashboard owns the terminal.
    #[arg(long)]
    pub log_file: Option<PathBuf>,

    /// Screen refresh period in milliseconds.
    #[arg(long, default_value_t = 250)]
    pub refresh_ms: u64,
}

/// Executes the `watch` command.
///
/// Starts the configured pollers on a background runtime and runs the
/// dashboard on the current thread until the user quits.
///
/// # Errors
///
/// Returns an error if the runtime, HTTP client, or terminal fails.
pub fn execute(config: &ViewerConfig, args: &WatchArgs) -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new().context("starting async runtime")?;
    let _guard = runtime.enter();

    let board = ChartBoard::new();
    let panels = initial_panels(config);
    let handler: Arc<dyn PollHandler> = Arc::new(board.clone());

    let handles = Pollers::build(config, &handler, &panels)?.spawn(config, None);
    tracing::info!(
        endpoint = %config.endpoint,
        pollers = handles.len(),
        "polling started"
    );

    let mut app = App::new(config.buffer_ids(), config.endpoint.clone(), panels, board);
    let result = scootview_tui::run(
        &mut app,
        Duration::from_millis(args.refresh_ms.max(1)),
        |paused| set_paused(&handles, paused),
    );

    runtime.block_on(async {
        for handle in handles {
            handle.shutdown().await;
        }
    });
    tracing::info!("polling stopped");

    result.context("running dashboard")
}

fn set_paused(handles: &[PollHandle], paused: bool) {
    for handle in handles {
        if paused {
            handle.pause();
        } else {
            handle.resume();
        }
    }
}
