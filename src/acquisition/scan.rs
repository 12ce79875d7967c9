//! Multi-segment scans.
//!
//! A scan runs [`collect_single`](crate::acquisition::collect_single) once
//! per frequency segment and stitches the traces together in segment order.
//! Per-segment settings are column vectors broadcast against the segment
//! list: length 1 applies one value to every segment, length N maps
//! one-to-one. Any other length is rejected before the instrument is
//! touched.

use std::time::Duration;

use tracing::info;

use crate::acquisition::{collect_single, SweepConfig, WaitPolicy};
use crate::error::{Result, SweepError};
use crate::instrument::NetworkAnalyzer;
use crate::trace::Trace;
use crate::transport::Transport;

/// One frequency segment of a scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// Segment start frequency in Hz.
    pub start_hz: f64,
    /// Segment stop frequency in Hz.
    pub stop_hz: f64,
}

impl From<(f64, f64)> for Segment {
    fn from((start_hz, stop_hz): (f64, f64)) -> Self {
        Self { start_hz, stop_hz }
    }
}

/// Per-segment acquisition settings, broadcast against the segment list.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanSettings {
    /// Point count per segment.
    pub points: Vec<u32>,
    /// Averaging count per segment (`0` disables averaging).
    pub averages: Vec<u32>,
    /// Source power per segment in dBm.
    pub power_dbm: Vec<f64>,
    /// IF bandwidth per segment in Hz.
    pub if_bandwidth_hz: Vec<f64>,
    /// Wait policy per segment.
    pub wait: Vec<WaitPolicy>,
}

impl Default for ScanSettings {
    fn default() -> Self {
        Self {
            points: vec![1601],
            averages: vec![999],
            power_dbm: vec![-50.0],
            if_bandwidth_hz: vec![1e3],
            wait: vec![WaitPolicy::FixedDelay(Duration::from_secs(1))],
        }
    }
}

/// Broadcast a settings column against `n` segments.
///
/// Length 1 repeats the single value; length `n` maps one-to-one; anything
/// else is a [`SweepError::SettingsLength`].
pub(crate) fn broadcast<V: Clone>(values: &[V], n: usize, name: &'static str) -> Result<Vec<V>> {
    match values.len() {
        1 => Ok(vec![values[0].clone(); n]),
        len if len == n => Ok(values.to_vec()),
        len => Err(SweepError::SettingsLength {
            name,
            expected: n,
            got: len,
        }),
    }
}

/// Acquire every segment in order and concatenate the traces.
pub async fn collect_scan<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    segments: &[Segment],
    settings: &ScanSettings,
) -> Result<Trace> {
    let n = segments.len();
    // Validate every column before the first segment runs.
    let points = broadcast(&settings.points, n, "points")?;
    let averages = broadcast(&settings.averages, n, "averages")?;
    let power = broadcast(&settings.power_dbm, n, "power_dbm")?;
    let bandwidth = broadcast(&settings.if_bandwidth_hz, n, "if_bandwidth_hz")?;
    let wait = broadcast(&settings.wait, n, "wait")?;

    let mut scan = Trace::empty();
    for (i, segment) in segments.iter().enumerate() {
        info!(
            segment = i,
            start_hz = segment.start_hz,
            stop_hz = segment.stop_hz,
            "scan segment"
        );
        let config = SweepConfig {
            start_hz: segment.start_hz,
            stop_hz: segment.stop_hz,
            points: points[i],
            power_dbm: power[i],
            if_bandwidth_hz: bandwidth[i],
            averages: averages[i],
        };
        let trace = collect_single(vna, &config, &wait[i]).await?;
        scan.extend_from(&trace);
    }
    Ok(scan)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn broadcast_repeats_singletons() {
        assert_eq!(broadcast(&[7u32], 3, "points").unwrap(), vec![7, 7, 7]);
    }

    #[test]
    fn broadcast_passes_matching_lengths() {
        assert_eq!(
            broadcast(&[1u32, 2, 3], 3, "points").unwrap(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn broadcast_rejects_mismatched_lengths() {
        let err = broadcast(&[1u32, 2], 3, "averages").unwrap_err();
        match err {
            SweepError::SettingsLength {
                name,
                expected,
                got,
            } => {
                assert_eq!(name, "averages");
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
