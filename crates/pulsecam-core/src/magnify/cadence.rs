use tracing::warn;

use crate::consts::{CADENCE_MIN_SAMPLES, CADENCE_TOLERANCE};

/// Tracks the real inter-frame interval from frame timestamps.
///
/// The temporal filter assumes uniformly spaced samples at the configured
/// frame rate. This only measures how far the actual feed is from that; it
/// never resamples.
#[derive(Clone, Debug)]
pub struct CadenceMonitor {
    assumed_rate: f64,
    last_timestamp_us: Option<u64>,
    interval_sum_us: f64,
    intervals: usize,
    warned: bool,
}

impl CadenceMonitor {
    pub fn new(assumed_rate: f64) -> Self {
        Self {
            assumed_rate,
            last_timestamp_us: None,
            interval_sum_us: 0.0,
            intervals: 0,
            warned: false,
        }
    }

    /// Feed the timestamp of the frame just received.
    pub fn observe(&mut self, timestamp_us: u64) {
        if let Some(last) = self.last_timestamp_us {
            // Non-monotonic stamps are ignored rather than counted as zero
            if timestamp_us > last {
                self.interval_sum_us += (timestamp_us - last) as f64;
                self.intervals += 1;
            }
        }
        self.last_timestamp_us = Some(timestamp_us);

        if self.warned || self.intervals < CADENCE_MIN_SAMPLES {
            return;
        }
        if let Some(measured) = self.measured_rate() {
            let deviation = (measured - self.assumed_rate).abs() / self.assumed_rate;
            if deviation > CADENCE_TOLERANCE {
                warn!(
                    measured_fps = measured,
                    assumed_fps = self.assumed_rate,
                    "Frame cadence differs from the assumed frame rate; BPM will be scaled incorrectly"
                );
                self.warned = true;
            }
        }
    }

    /// Mean frame rate over all observed intervals.
    pub fn measured_rate(&self) -> Option<f64> {
        if self.intervals == 0 || self.interval_sum_us <= 0.0 {
            return None;
        }
        let mean_interval_s = self.interval_sum_us / self.intervals as f64 / 1_000_000.0;
        Some(1.0 / mean_interval_s)
    }

    pub fn drift_detected(&self) -> bool {
        self.warned
    }
}
