//! Trace value types produced by sweep acquisition.
//!
//! A [`Trace`] is the result of one sweep: two equal-length numeric sequences
//! (frequency axis, magnitude) plus the acquisition timestamp. Multi-segment
//! scans concatenate traces in segment order and background correction
//! subtracts one trace from another; both yield plain `Trace` values again.
//! Traces are produced once and returned by value; nothing is cached.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{Result, SweepError};

/// Ordered (frequency, magnitude) data from one sweep or stitched scan.
///
/// Within a single sweep the frequency axis is strictly ascending. A stitched
/// scan preserves segment order instead; overlapping segments are kept as-is,
/// so the axis may be non-monotonic (caller responsibility).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trace {
    /// Frequency axis in Hz.
    pub frequency: Vec<f64>,
    /// Magnitude values, one per frequency point.
    pub magnitude: Vec<f64>,
    /// When the trace was read back from the instrument.
    pub acquired_at: DateTime<Utc>,
}

impl Trace {
    /// Build a trace from matching frequency and magnitude vectors.
    ///
    /// Fails with [`SweepError::Parse`] if the lengths differ: an instrument
    /// that reports a different number of axis points than trace points is
    /// returning garbage.
    pub fn new(frequency: Vec<f64>, magnitude: Vec<f64>) -> Result<Self> {
        if frequency.len() != magnitude.len() {
            return Err(SweepError::Parse(format!(
                "frequency axis has {} points but trace has {}",
                frequency.len(),
                magnitude.len()
            )));
        }
        Ok(Self {
            frequency,
            magnitude,
            acquired_at: Utc::now(),
        })
    }

    /// An empty trace.
    pub fn empty() -> Self {
        Self {
            frequency: Vec::new(),
            magnitude: Vec::new(),
            acquired_at: Utc::now(),
        }
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.frequency.len()
    }

    /// True when the trace holds no points.
    pub fn is_empty(&self) -> bool {
        self.frequency.is_empty()
    }

    /// Iterate over (frequency, magnitude) pairs.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.frequency
            .iter()
            .copied()
            .zip(self.magnitude.iter().copied())
    }

    /// Append another trace's points, preserving order. Used by scan stitching.
    pub fn extend_from(&mut self, other: &Trace) {
        self.frequency.extend_from_slice(&other.frequency);
        self.magnitude.extend_from_slice(&other.magnitude);
    }

    /// Pointwise `self − reference`, keeping this trace's frequency axis.
    ///
    /// Lengths must match; whether the two traces share a frequency grid is
    /// not checked. The caller is responsible for acquiring both over the
    /// same segments.
    pub fn subtract(&self, reference: &Trace) -> Result<Trace> {
        if self.len() != reference.len() {
            return Err(SweepError::TraceLength {
                measurement: self.len(),
                reference: reference.len(),
            });
        }
        let magnitude = self
            .magnitude
            .iter()
            .zip(reference.magnitude.iter())
            .map(|(m, r)| m - r)
            .collect();
        Trace::new(self.frequency.clone(), magnitude)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subtract_is_pointwise() {
        let measurement = Trace::new(vec![1.0, 2.0, 3.0], vec![1.0, 2.0, 3.0]).unwrap();
        let reference = Trace::new(vec![1.0, 2.0, 3.0], vec![0.1, 0.2, 0.3]).unwrap();
        let corrected = measurement.subtract(&reference).unwrap();

        assert_eq!(corrected.frequency, vec![1.0, 2.0, 3.0]);
        for (got, want) in corrected.magnitude.iter().zip([0.9, 1.8, 2.7]) {
            assert!((got - want).abs() < 1e-12);
        }
    }

    #[test]
    fn subtract_keeps_measurement_axis() {
        let measurement = Trace::new(vec![5.0, 6.0], vec![1.0, 1.0]).unwrap();
        let reference = Trace::new(vec![7.0, 8.0], vec![0.5, 0.5]).unwrap();
        let corrected = measurement.subtract(&reference).unwrap();
        assert_eq!(corrected.frequency, vec![5.0, 6.0]);
    }

    #[test]
    fn subtract_rejects_length_mismatch() {
        let measurement = Trace::new(vec![1.0, 2.0], vec![1.0, 2.0]).unwrap();
        let reference = Trace::new(vec![1.0], vec![0.1]).unwrap();
        let err = measurement.subtract(&reference).unwrap_err();
        assert!(matches!(
            err,
            SweepError::TraceLength {
                measurement: 2,
                reference: 1
            }
        ));
    }

    #[test]
    fn new_rejects_axis_mismatch() {
        let err = Trace::new(vec![1.0, 2.0], vec![1.0]).unwrap_err();
        assert!(matches!(err, SweepError::Parse(_)));
    }

    #[test]
    fn extend_preserves_order() {
        let mut scan = Trace::new(vec![0.0, 5.0], vec![1.0, 2.0]).unwrap();
        let next = Trace::new(vec![5.0, 10.0], vec![3.0, 4.0]).unwrap();
        scan.extend_from(&next);
        assert_eq!(scan.frequency, vec![0.0, 5.0, 5.0, 10.0]);
        assert_eq!(scan.magnitude, vec![1.0, 2.0, 3.0, 4.0]);
    }
}
