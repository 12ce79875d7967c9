//! Sweep acquisition orchestration.
//!
//! One acquisition walks a fixed sequence against the analyzer:
//!
//! ```text
//! Configuring -> Resetting -> Waiting -> Reading -> Trace
//! ```
//!
//! Configuration applies IF bandwidth, point count, frequency range, power,
//! and averaging, in that order, completely, before anything else; the reset
//! clears the averaging accumulator; the wait is either an unverified fixed
//! delay or a bounded completion poll; the read selects the named measurement
//! and parses the frequency axis plus trace data. The orchestrator is a pure
//! function of (configuration, facade) and holds no state between calls.

pub mod correction;
pub mod scan;

pub use correction::{collect_corrected, collect_scan_corrected, CorrectionSettings};
pub use scan::{collect_scan, ScanSettings, Segment};

use std::time::Duration;

use tracing::{debug, info};

use crate::error::{Result, SweepError};
use crate::instrument::NetworkAnalyzer;
use crate::trace::Trace;
use crate::transport::Transport;

/// Bit position (0-based, from LSB) of "averaging complete" in the
/// condition register.
pub const AVERAGING_DONE_BIT: u32 = 1;

/// Default pause between completion polls.
pub const DEFAULT_POLL_PAUSE: Duration = Duration::from_secs(1);

/// Default poll bound: 10 minutes at the default pause.
pub const DEFAULT_MAX_POLLS: u32 = 600;

/// Everything the instrument needs before a sweep can run.
#[derive(Debug, Clone, PartialEq)]
pub struct SweepConfig {
    /// Sweep start frequency in Hz.
    pub start_hz: f64,
    /// Sweep stop frequency in Hz.
    pub stop_hz: f64,
    /// Number of frequency points.
    pub points: u32,
    /// Source power in dBm.
    pub power_dbm: f64,
    /// IF bandwidth in Hz.
    pub if_bandwidth_hz: f64,
    /// Averaging count; `0` disables averaging entirely.
    pub averages: u32,
}

impl SweepConfig {
    /// Sweep over `[start_hz, stop_hz]` with conventional defaults
    /// (1601 points, −50 dBm, 1 kHz IF bandwidth, 999 averages).
    pub fn new(start_hz: f64, stop_hz: f64) -> Self {
        Self {
            start_hz,
            stop_hz,
            points: 1601,
            power_dbm: -50.0,
            if_bandwidth_hz: 1e3,
            averages: 999,
        }
    }

    /// Set the point count.
    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    /// Set the source power in dBm.
    pub fn with_power(mut self, dbm: f64) -> Self {
        self.power_dbm = dbm;
        self
    }

    /// Set the IF bandwidth in Hz.
    pub fn with_if_bandwidth(mut self, hz: f64) -> Self {
        self.if_bandwidth_hz = hz;
        self
    }

    /// Set the averaging count (`0` disables averaging).
    pub fn with_averages(mut self, averages: u32) -> Self {
        self.averages = averages;
        self
    }
}

/// How to wait for the sweep to finish after the averaging reset.
#[derive(Debug, Clone, PartialEq)]
pub enum WaitPolicy {
    /// Sleep a caller-chosen duration assumed sufficient; no verification.
    FixedDelay(Duration),
    /// Poll the averaging condition register until the completion bit sets.
    ///
    /// Bounded: after `max_polls` unsuccessful polls the acquisition fails
    /// with [`SweepError::AcquisitionTimeout`] instead of stalling forever.
    PollAveraging {
        /// Pause between polls.
        interval: Duration,
        /// Maximum number of polls before giving up.
        max_polls: u32,
    },
}

impl WaitPolicy {
    /// Completion polling with the default pause and bound.
    pub fn poll() -> Self {
        WaitPolicy::PollAveraging {
            interval: DEFAULT_POLL_PAUSE,
            max_polls: DEFAULT_MAX_POLLS,
        }
    }
}

/// Test the completion bit of the averaging condition register.
///
/// `2` (binary `10`) is complete; `0` and `1` are not.
pub fn averaging_complete(status: u64) -> bool {
    status & (1 << AVERAGING_DONE_BIT) != 0
}

/// Run one sweep acquisition and return its trace.
pub async fn collect_single<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    config: &SweepConfig,
    wait: &WaitPolicy,
) -> Result<Trace> {
    configure(vna, config).await?;

    debug!("clearing averaging accumulator");
    vna.average_reset().await?;

    wait_for_sweep(vna, wait).await?;

    // Reading: make the named measurement active, then pull both axes.
    vna.define_measurement().await?;
    vna.select_measurement().await?;
    let frequency = vna.read_frequency_axis().await?;
    let magnitude = vna.read_trace_data().await?;

    let trace = Trace::new(frequency, magnitude)?;
    info!(
        points = trace.len(),
        start_hz = config.start_hz,
        stop_hz = config.stop_hz,
        "sweep acquired"
    );
    Ok(trace)
}

/// Apply the full sweep configuration, in order, before anything else runs.
async fn configure<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    config: &SweepConfig,
) -> Result<()> {
    debug!(?config, "configuring sweep");
    vna.set_if_bandwidth(config.if_bandwidth_hz).await?;
    vna.set_sweep_points(config.points).await?;
    vna.set_freq_start(config.start_hz).await?;
    vna.set_freq_stop(config.stop_hz).await?;
    vna.set_power(config.power_dbm).await?;

    if config.averages == 0 {
        vna.set_average_enabled(false).await?;
    } else {
        vna.set_average_enabled(true).await?;
        vna.set_average_count(config.averages).await?;
    }
    Ok(())
}

/// Wait for sweep completion according to the policy.
async fn wait_for_sweep<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    wait: &WaitPolicy,
) -> Result<()> {
    match wait {
        WaitPolicy::FixedDelay(delay) => {
            debug!(?delay, "fixed-delay wait");
            tokio::time::sleep(*delay).await;
            Ok(())
        }
        WaitPolicy::PollAveraging {
            interval,
            max_polls,
        } => {
            let started = tokio::time::Instant::now();
            for poll in 0..*max_polls {
                if vna.average_completed().await? {
                    debug!(polls = poll + 1, "averaging complete");
                    return Ok(());
                }
                tokio::time::sleep(*interval).await;
            }
            Err(SweepError::AcquisitionTimeout {
                polls: *max_polls,
                waited: started.elapsed(),
            })
        }
    }
}
