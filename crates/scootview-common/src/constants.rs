//! Defaults and well-known names shared by the pollers and the dashboard.

/// Base URL of the player's metric endpoint.
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:5000";

/// Default polling period in milliseconds.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Buffers charted when no configuration says otherwise.
pub const DEFAULT_BUFFERS: [&str; 2] = ["playback", "download"];

/// Metrics fetched one by one by the per-metric poller.
pub const DEFAULT_METRICS: [&str; 8] = [
    "time_buffer",
    "bandwidth",
    "id",
    "time_position",
    "moving_average_bandwidth",
    "max_encoded_bitrate",
    "url_bitrate",
    "mean_average_bandwidth",
];

/// Key of the elapsed-time series paired with every per-metric response.
pub const TIME_ELAPSED_KEY: &str = "time_elapsed";

/// Suffix appended to a buffer id to name its panel.
pub const PANEL_SUFFIX: &str = "_graphs";

/// Separator between buffer and metric in a chart id.
pub const CHART_SEPARATOR: char = '-';

/// Number of fetch failures the chart board remembers.
pub const FAILURE_HISTORY: usize = 32;

/// Default configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "scootview.yaml";
