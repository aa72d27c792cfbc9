//! CLI command definitions and dispatch.

pub mod poll;
pub mod watch;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use scootview_common::config::{PollMode, ViewerConfig};
use scootview_common::constants::DEFAULT_CONFIG_FILE;
use scootview_poller::aggregate::AggregatePoller;
use scootview_poller::event::PollHandler;
use scootview_poller::per_metric::PerMetricPoller;
use scootview_poller::source::HttpSource;
use scootview_poller::task::{PollHandle, Poller, spawn_bounded_poll_task, spawn_poll_task};
use scootview_poller::visibility::PanelVisibility;

/// scootview: live charts of a media player's buffer metrics.
#[derive(Parser, Debug)]
#[command(name = "scootview", version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,

    /// YAML configuration file. Defaults to ./scootview.yaml when present.
    #[arg(long, short, global = true, env = "SCOOTVIEW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Base URL of the metric endpoint.
    #[arg(long, global = true, env = "SCOOTVIEW_ENDPOINT")]
    pub endpoint: Option<String>,

    /// Polling period in milliseconds.
    #[arg(long, global = true)]
    pub interval_ms: Option<u64>,

    /// Which pollers to run: aggregate, per-metric, or both.
    #[arg(long, global = true)]
    pub mode: Option<PollMode>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Open the interactive chart dashboard.
    Watch(watch::WatchArgs),
    /// Poll without a terminal UI and print a summary of the charts.
    Poll(poll::PollArgs),
}

impl Cli {
    /// Builds the effective configuration: file, then flags and environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be loaded or the result is invalid.
    pub fn resolve_config(&self) -> anyhow::Result<ViewerConfig> {
        let mut config = match &self.config {
            Some(path) => load(path)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => load(Path::new(DEFAULT_CONFIG_FILE))?,
            None => ViewerConfig::default(),
        };

        if let Some(endpoint) = &self.endpoint {
            config.endpoint.clone_from(endpoint);
        }
        if let Some(interval_ms) = self.interval_ms {
            config.interval_ms = interval_ms;
        }
        if let Some(mode) = self.mode {
            config.mode = mode;
        }

        config.validate()?;
        Ok(config)
    }
}

fn load(path: &Path) -> anyhow::Result<ViewerConfig> {
    tracing::info!(path = %path.display(), "loading configuration");
    ViewerConfig::load(path).with_context(|| format!("loading {}", path.display()))
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the configuration is invalid or the command fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    let config = cli.resolve_config()?;
    tracing::debug!(
        endpoint = %config.endpoint,
        interval_ms = config.interval_ms,
        mode = %config.mode,
        buffers = config.buffers.len(),
        "configuration resolved"
    );
    match cli.command {
        Command::Watch(args) => watch::execute(&config, &args),
        Command::Poll(args) => poll::execute(&config, &args),
    }
}

/// The pollers selected by the configured mode.
pub struct Pollers {
    /// Whole-buffer poller, gated by panel visibility.
    pub aggregate: Option<AggregatePoller<HttpSource>>,
    /// Per-metric poller, not gated by visibility.
    pub per_metric: Option<PerMetricPoller<HttpSource>>,
}

impl Pollers {
    /// Builds the pollers for `config`, all reporting to `handler`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn build(
        config: &ViewerConfig,
        handler: &Arc<dyn PollHandler>,
        panels: &PanelVisibility,
    ) -> anyhow::Result<Self> {
        let source = Arc::new(HttpSource::new(&config.endpoint)?);

        let aggregate = config.mode.runs_aggregate().then(|| {
            AggregatePoller::new(Arc::clone(&source), config.buffer_ids(), Arc::clone(handler))
                .with_visibility(panels.predicate())
        });
        let per_metric = config.mode.runs_per_metric().then(|| {
            PerMetricPoller::from_buffers(Arc::clone(&source), &config.buffers, Arc::clone(handler))
        });

        Ok(Self {
            aggregate,
            per_metric,
        })
    }

    /// Starts each poller on its own timer. The caller owns the handles.
    ///
    /// With `max_ticks`, each task stops by itself after that many ticks.
    pub fn spawn(self, config: &ViewerConfig, max_ticks: Option<u64>) -> Vec<PollHandle> {
        let mut handles = Vec::with_capacity(2);
        if let Some(poller) = self.aggregate {
            handles.push(start(poller, config, max_ticks));
        }
        if let Some(poller) = self.per_metric {
            handles.push(start(poller, config, max_ticks));
        }
        handles
    }
}

fn start<P: Poller>(poller: P, config: &ViewerConfig, max_ticks: Option<u64>) -> PollHandle {
    match max_ticks {
        Some(max) => spawn_bounded_poll_task(poller, config.interval(), max),
        None => spawn_poll_task(poller, config.interval()),
    }
}

/// Applies each buffer's configured initial visibility.
pub fn initial_panels(config: &ViewerConfig) -> PanelVisibility {
    let panels = PanelVisibility::new();
    for buffer in &config.buffers {
        panels.set_visible(&buffer.id, buffer.visible);
    }
    panels
}
