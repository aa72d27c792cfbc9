//! Response body decoding.
//!
//! Aggregate bodies map metric names to series. Per-metric bodies carry the
//! requested metric next to a `time_elapsed` series of the same length.

use std::collections::BTreeMap;

use scootview_common::constants::TIME_ELAPSED_KEY;
use scootview_common::types::{MetricName, Point};
use serde::Deserialize;

use crate::error::FetchError;

/// One sample as sent by the player. Some metrics arrive as numeric strings.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Sample {
    Number(f64),
    Text(String),
}

impl Sample {
    fn value(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(s) => s.trim().parse().ok(),
        }
    }
}

fn decode_series_map(path: &str, body: &str) -> Result<BTreeMap<String, Vec<f64>>, FetchError> {
    let raw: BTreeMap<String, Vec<Sample>> =
        serde_json::from_str(body).map_err(|e| FetchError::malformed(path, e.to_string()))?;

    raw.into_iter()
        .map(|(key, samples)| {
            let values = samples
                .iter()
                .map(Sample::value)
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| {
                    FetchError::malformed(path, format!("series {key:?} has a non-numeric sample"))
                })?;
            Ok((key, values))
        })
        .collect()
}

/// Charts a lone series against its sample index.
#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn index_points(values: &[f64]) -> Vec<Point> {
    values
        .iter()
        .enumerate()
        .map(|(i, &y)| (i as f64, y))
        .collect()
}

/// Pairs `values` with `elapsed` as `(elapsed[i], values[i])`, stopping at
/// the shorter of the two.
#[must_use]
pub fn pair_with_elapsed(elapsed: &[f64], values: &[f64]) -> Vec<Point> {
    elapsed.iter().copied().zip(values.iter().copied()).collect()
}

/// Decodes an aggregate body into one point list per metric, sorted by name.
///
/// # Errors
///
/// Returns `FetchError::Malformed` if the body is not an object of numeric arrays.
pub fn decode_aggregate(path: &str, body: &str) -> Result<Vec<(MetricName, Vec<Point>)>, FetchError> {
    Ok(decode_series_map(path, body)?
        .into_iter()
        .map(|(key, values)| (MetricName::new(key), index_points(&values)))
        .collect())
}

/// Decodes a per-metric body into `(time_elapsed, value)` points.
///
/// # Errors
///
/// Returns `FetchError::Malformed` if the body is not an object of numeric
/// arrays or lacks either `metric` or `time_elapsed`.
pub fn decode_metric(path: &str, body: &str, metric: &MetricName) -> Result<Vec<Point>, FetchError> {
    let series = decode_series_map(path, body)?;
    let values = series
        .get(metric.as_str())
        .ok_or_else(|| FetchError::malformed(path, format!("missing key {:?}", metric.as_str())))?;
    let elapsed = series
        .get(TIME_ELAPSED_KEY)
        .ok_or_else(|| FetchError::malformed(path, format!("missing key {TIME_ELAPSED_KEY:?}")))?;

    if elapsed.len() != values.len() {
        tracing::debug!(
            path,
            values = values.len(),
            elapsed = elapsed.len(),
            "series length mismatch, truncating"
        );
    }
    Ok(pair_with_elapsed(elapsed, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn metric(name: &str) -> MetricName {
        MetricName::new(name)
    }

    #[test]
    fn metric_is_zipped_with_time_elapsed() {
        let body = r#"{"time_buffer":[1,2,3],"time_elapsed":[0,1,2]}"#;
        let points = decode_metric("playback/time_buffer", body, &metric("time_buffer"))
            .expect("decode");
        assert_eq!(points, vec![(0.0, 1.0), (1.0, 2.0), (2.0, 3.0)]);
    }

    #[test]
    fn mismatched_lengths_truncate_to_shorter() {
        let body = r#"{"time_buffer":[1,2,3],"time_elapsed":[0,1]}"#;
        let points = decode_metric("playback/time_buffer", body, &metric("time_buffer"))
            .expect("decode");
        assert_eq!(points, vec![(0.0, 1.0), (1.0, 2.0)]);
    }

    #[test]
    fn missing_time_elapsed_is_malformed() {
        let body = r#"{"bandwidth":[1,2]}"#;
        let err = decode_metric("download/bandwidth", body, &metric("bandwidth"))
            .expect_err("should fail");
        assert!(err.to_string().contains("time_elapsed"));
    }

    #[test]
    fn missing_metric_is_malformed() {
        let body = r#"{"time_elapsed":[0.5]}"#;
        assert!(decode_metric("download/bandwidth", body, &metric("bandwidth")).is_err());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        let body = r#"{"url_bitrate":["500","1000"],"time_elapsed":[0.25,1.5]}"#;
        let points = decode_metric("playback/url_bitrate", body, &metric("url_bitrate"))
            .expect("decode");
        assert_eq!(points, vec![(0.25, 500.0), (1.5, 1000.0)]);
    }

    #[test]
    fn non_numeric_sample_is_malformed() {
        let body = r#"{"bandwidth":["fast"]}"#;
        assert!(decode_aggregate("download", body).is_err());
    }

    #[test]
    fn aggregate_charts_every_key_against_index() {
        let body = r#"{"bandwidth":[10,20],"time_buffer":[4]}"#;
        let charts = decode_aggregate("playback", body).expect("decode");
        assert_eq!(charts, vec![
            (metric("bandwidth"), vec![(0.0, 10.0), (1.0, 20.0)]),
            (metric("time_buffer"), vec![(0.0, 4.0)]),
        ]);
    }

    #[test]
    fn aggregate_of_empty_object_has_no_charts() {
        assert!(decode_aggregate("playback", "{}").expect("decode").is_empty());
    }

    #[test]
    fn non_object_body_is_malformed() {
        let err = decode_aggregate("playback", "<html>500</html>").expect_err("should fail");
        assert_eq!(err.kind(), crate::error::FailureKind::Malformed);
    }
}
