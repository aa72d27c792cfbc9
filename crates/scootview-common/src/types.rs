//! Domain primitive types used across the scootview workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::constants::{CHART_SEPARATOR, PANEL_SUFFIX};
use crate::error::{Result, ScootviewError};

/// A single chart sample as `(x, y)`.
pub type Point = (f64, f64);

/// Checks that `value` can be used as a URL path segment and inside a chart id.
fn validate_name(kind: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(ScootviewError::config(format!("{kind} name must not be empty")));
    }
    if let Some(bad) = value
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '.'))
    {
        return Err(ScootviewError::config(format!(
            "{kind} name {value:?} contains invalid character {bad:?}"
        )));
    }
    Ok(())
}

/// Identifier of a logical media buffer, e.g. `playback` or `download`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BufferId(String);

impl BufferId {
    /// Creates a buffer id without validation.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Creates a buffer id, rejecting names that cannot form a path segment.
    ///
    /// # Errors
    ///
    /// Returns `ScootviewError::Config` if the name is empty or contains
    /// characters outside `[A-Za-z0-9_.]`.
    pub fn parse(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        validate_name("buffer", &id)?;
        Ok(Self(id))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of the panel holding this buffer's charts.
    #[must_use]
    pub fn panel_id(&self) -> String {
        format!("{}{PANEL_SUFFIX}", self.0)
    }

    /// Request path returning every metric of this buffer at once.
    #[must_use]
    pub fn aggregate_path(&self) -> String {
        self.0.clone()
    }

    /// Request path returning a single metric paired with `time_elapsed`.
    #[must_use]
    pub fn metric_path(&self, metric: &MetricName) -> String {
        format!("{}/{}", self.0, metric.as_str())
    }
}

impl fmt::Display for BufferId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Name of a numeric measurement sampled for a buffer.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetricName(String);

impl MetricName {
    /// Creates a metric name without validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Creates a metric name, rejecting names that cannot form a path segment.
    ///
    /// # Errors
    ///
    /// Returns `ScootviewError::Config` if the name is empty or contains
    /// characters outside `[A-Za-z0-9_.]`.
    pub fn parse(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        validate_name("metric", &name)?;
        Ok(Self(name))
    }

    /// Returns the inner string representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MetricName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Mount point of one chart, `{buffer}-{metric}`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ChartId {
    buffer: BufferId,
    metric: MetricName,
}

impl ChartId {
    /// Creates the chart id for a buffer's metric.
    #[must_use]
    pub const fn new(buffer: BufferId, metric: MetricName) -> Self {
        Self { buffer, metric }
    }

    /// Buffer this chart belongs to.
    #[must_use]
    pub const fn buffer(&self) -> &BufferId {
        &self.buffer
    }

    /// Metric drawn by this chart.
    #[must_use]
    pub const fn metric(&self) -> &MetricName {
        &self.metric
    }
}

impl fmt::Display for ChartId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{CHART_SEPARATOR}{}", self.buffer, self.metric)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_id_joins_buffer_and_metric() {
        let id = ChartId::new(BufferId::new("playback"), MetricName::new("time_buffer"));
        assert_eq!(id.to_string(), "playback-time_buffer");
    }

    #[test]
    fn buffer_paths_and_panel() {
        let buffer = BufferId::new("download");
        assert_eq!(buffer.aggregate_path(), "download");
        assert_eq!(
            buffer.metric_path(&MetricName::new("bandwidth")),
            "download/bandwidth"
        );
        assert_eq!(buffer.panel_id(), "download_graphs");
    }

    #[test]
    fn parse_rejects_separators() {
        assert!(BufferId::parse("play-back").is_err());
        assert!(MetricName::parse("a/b").is_err());
        assert!(MetricName::parse("").is_err());
        assert!(MetricName::parse("url_bitrate").is_ok());
    }

    #[test]
    fn ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&BufferId::new("playback")).expect("serialize");
        assert_eq!(json, "\"playback\"");
    }
}
