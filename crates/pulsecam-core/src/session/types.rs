use serde::Serialize;

use crate::magnify::BpmReading;

/// Session processing stage, used for progress reporting.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionStage {
    Reading,
    Estimating,
    Writing,
}

impl std::fmt::Display for SessionStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Reading => write!(f, "Reading video"),
            Self::Estimating => write!(f, "Estimating pulse"),
            Self::Writing => write!(f, "Writing output"),
        }
    }
}

/// Thread-safe progress reporting for a session.
///
/// All methods have default no-op implementations.
pub trait ProgressReporter: Send + Sync {
    /// A new stage has started. `total_items` is the number of work items in
    /// this stage (e.g., frame count), if known.
    fn begin_stage(&self, _stage: SessionStage, _total_items: Option<usize>) {}

    /// One work item within the current stage has completed.
    fn advance(&self, _items_done: usize) {}

    /// A recalculated heart rate is available.
    fn reading(&self, _frame_index: usize, _combined: BpmReading) {}

    /// The current stage is finished.
    fn finish_stage(&self) {}
}

/// No-op progress reporter.
pub struct NoOpReporter;
impl ProgressReporter for NoOpReporter {}

/// Readings at one point of the video.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BpmSample {
    pub frame_index: usize,
    /// Seconds into the video at the assumed frame rate.
    pub time_s: f64,
    pub combined: BpmReading,
    pub regions: Vec<(String, BpmReading)>,
}

/// Summary of a processed video.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    pub frames_processed: usize,
    /// One sample per BPM recalculation.
    pub timeline: Vec<BpmSample>,
    pub final_reading: BpmReading,
    pub region_readings: Vec<(String, BpmReading)>,
    /// Frame rate measured from SER timestamps, when present.
    pub measured_frame_rate: Option<f64>,
    /// Timestamps disagreed with the configured frame rate, so the BPM scale
    /// is off.
    pub cadence_drift: bool,
}

impl SessionReport {
    /// Combined readings of the timeline that are past warm-up.
    pub fn ready_values(&self) -> Vec<f64> {
        self.timeline
            .iter()
            .filter_map(|s| s.combined.value())
            .collect()
    }
}
