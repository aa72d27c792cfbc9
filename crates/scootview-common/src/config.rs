//! Viewer configuration model.
//!
//! Loaded from an optional YAML file and then overridden from the command line.

use std::collections::BTreeSet;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_BUFFERS, DEFAULT_ENDPOINT, DEFAULT_INTERVAL_MS, DEFAULT_METRICS};
use crate::error::{Result, ScootviewError};
use crate::types::{BufferId, MetricName};

/// Which pollers to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PollMode {
    /// Fetch each buffer as a whole.
    Aggregate,
    /// Fetch each metric separately, paired with `time_elapsed`.
    PerMetric,
    /// Run both pollers side by side.
    #[default]
    Both,
}

impl PollMode {
    /// Whether the aggregate poller runs in this mode.
    #[must_use]
    pub const fn runs_aggregate(self) -> bool {
        matches!(self, Self::Aggregate | Self::Both)
    }

    /// Whether the per-metric poller runs in this mode.
    #[must_use]
    pub const fn runs_per_metric(self) -> bool {
        matches!(self, Self::PerMetric | Self::Both)
    }
}

impl fmt::Display for PollMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Aggregate => write!(f, "aggregate"),
            Self::PerMetric => write!(f, "per-metric"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl FromStr for PollMode {
    type Err = ScootviewError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "aggregate" => Ok(Self::Aggregate),
            "per-metric" => Ok(Self::PerMetric),
            "both" => Ok(Self::Both),
            other => Err(ScootviewError::config(format!(
                "unknown poll mode {other:?} (expected aggregate, per-metric or both)"
            ))),
        }
    }
}

fn default_metrics() -> Vec<MetricName> {
    DEFAULT_METRICS.iter().copied().map(MetricName::new).collect()
}

const fn default_visible() -> bool {
    true
}

/// One buffer to chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferConfig {
    /// Buffer identifier, also the aggregate request path.
    pub id: BufferId,
    /// Metrics fetched individually by the per-metric poller.
    #[serde(default = "default_metrics")]
    pub metrics: Vec<MetricName>,
    /// Whether the buffer's panel starts out visible.
    #[serde(default = "default_visible")]
    pub visible: bool,
}

impl BufferConfig {
    /// A visible buffer with the default metric list.
    #[must_use]
    pub fn new(id: BufferId) -> Self {
        Self {
            id,
            metrics: default_metrics(),
            visible: true,
        }
    }
}

/// Root configuration for the viewer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ViewerConfig {
    /// Base URL of the metric endpoint.
    pub endpoint: String,
    /// Polling period in milliseconds.
    pub interval_ms: u64,
    /// Which pollers to run.
    pub mode: PollMode,
    /// Buffers to chart, in display order.
    pub buffers: Vec<BufferConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            interval_ms: DEFAULT_INTERVAL_MS,
            mode: PollMode::default(),
            buffers: DEFAULT_BUFFERS
                .iter()
                .map(|id| BufferConfig::new(BufferId::new(*id)))
                .collect(),
        }
    }
}

impl ViewerConfig {
    /// Parses a configuration from YAML text. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid or the result fails validation.
    pub fn from_yaml_str(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Loads a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or validated.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ScootviewError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_yaml_str(&content)
    }

    /// Polling period as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Ids of every configured buffer, in display order.
    #[must_use]
    pub fn buffer_ids(&self) -> Vec<BufferId> {
        self.buffers.iter().map(|b| b.id.clone()).collect()
    }

    /// Checks invariants that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns `ScootviewError::Config` describing the first violation.
    pub fn validate(&self) -> Result<()> {
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(ScootviewError::config(format!(
                "endpoint {:?} must start with http:// or https://",
                self.endpoint
            )));
        }
        if self.interval_ms == 0 {
            return Err(ScootviewError::config("interval_ms must be positive"));
        }
        if self.buffers.is_empty() {
            return Err(ScootviewError::config("at least one buffer is required"));
        }

        let mut seen = BTreeSet::new();
        for buffer in &self.buffers {
            let _ = BufferId::parse(buffer.id.as_str())?;
            if !seen.insert(buffer.id.as_str()) {
                return Err(ScootviewError::config(format!(
                    "duplicate buffer {:?}",
                    buffer.id.as_str()
                )));
            }
            for metric in &buffer.metrics {
                let _ = MetricName::parse(metric.as_str())?;
            }
        }
        Ok(())
    }
}
