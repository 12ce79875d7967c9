//! Background-corrected acquisitions.
//!
//! A corrected acquisition takes two sweeps over the same frequency range: a
//! reference (background) sweep at the reference power, then the measurement
//! sweep at the requested power. The corrected trace is the point-wise
//! difference `measurement - reference` on the measurement's frequency axis.
//!
//! Between the two sweeps the source can be parked at a low idle power for a
//! settling period, so the device under test relaxes before the measurement.

use std::time::Duration;

use tracing::{debug, info};

use crate::acquisition::{collect_single, SweepConfig, WaitPolicy};
use crate::acquisition::scan::{broadcast, ScanSettings, Segment};
use crate::error::Result;
use crate::instrument::NetworkAnalyzer;
use crate::trace::Trace;
use crate::transport::Transport;

/// How the reference sweep and the inter-sweep idle are run.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionSettings {
    /// Source power of the reference sweep in dBm.
    pub reference_power_dbm: f64,
    /// Averaging count of the reference sweep.
    pub reference_averages: u32,
    /// Wait policy of the reference sweep.
    pub reference_wait: WaitPolicy,
    /// Power to park the source at between the sweeps; `None` skips parking.
    pub idle_power_dbm: Option<f64>,
    /// Settling period after parking, before the measurement sweep.
    pub settle: Duration,
}

impl Default for CorrectionSettings {
    fn default() -> Self {
        Self {
            reference_power_dbm: -10.0,
            reference_averages: 999,
            reference_wait: WaitPolicy::poll(),
            idle_power_dbm: Some(-70.0),
            settle: Duration::from_secs(2),
        }
    }
}

/// One background-corrected sweep.
pub async fn collect_corrected<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    config: &SweepConfig,
    wait: &WaitPolicy,
    correction: &CorrectionSettings,
) -> Result<Trace> {
    let reference_config = SweepConfig {
        power_dbm: correction.reference_power_dbm,
        averages: correction.reference_averages,
        ..config.clone()
    };

    info!(
        power_dbm = reference_config.power_dbm,
        "reference sweep"
    );
    let reference = collect_single(vna, &reference_config, &correction.reference_wait).await?;

    settle(vna, correction).await?;

    info!(power_dbm = config.power_dbm, "measurement sweep");
    let measurement = collect_single(vna, config, wait).await?;

    measurement.subtract(&reference)
}

/// Background-corrected scan: a reference and measurement sweep per segment,
/// each corrected before the next segment runs, concatenated in order.
pub async fn collect_scan_corrected<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    segments: &[Segment],
    settings: &ScanSettings,
    correction: &CorrectionSettings,
) -> Result<Trace> {
    let n = segments.len();
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
            "corrected scan segment"
        );
        let config = SweepConfig {
            start_hz: segment.start_hz,
            stop_hz: segment.stop_hz,
            points: points[i],
            power_dbm: power[i],
            if_bandwidth_hz: bandwidth[i],
            averages: averages[i],
        };
        let trace = collect_corrected(vna, &config, &wait[i], correction).await?;
        scan.extend_from(&trace);
    }
    Ok(scan)
}

/// Park the source at the idle power and let the device under test relax.
async fn settle<T: Transport>(
    vna: &mut NetworkAnalyzer<T>,
    correction: &CorrectionSettings,
) -> Result<()> {
    if let Some(idle) = correction.idle_power_dbm {
        debug!(idle_power_dbm = idle, settle = ?correction.settle, "settling");
        vna.set_power(idle).await?;
        tokio::time::sleep(correction.settle).await;
    }
    Ok(())
}
