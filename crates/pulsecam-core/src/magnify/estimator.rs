use ndarray::{Array3, Zip};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::consts::{
    COLOR_CHANNEL_COUNT, DEFAULT_ALPHA, DEFAULT_BPM_BUFFER_SIZE, DEFAULT_BPM_CALCULATION_STRIDE,
    DEFAULT_BUFFER_SIZE, DEFAULT_FRAME_RATE, DEFAULT_MAX_FREQUENCY, DEFAULT_MIN_FREQUENCY,
    DEFAULT_PYRAMID_LEVELS,
};
use crate::error::{PulseError, Result};
use crate::frame::Frame;

use super::bpm::{bin_to_bpm, dominant_bin, BpmReading, BpmSmoother};
use super::cadence::CadenceMonitor;
use super::pyramid::{level_shape, max_levels, pyramid_level, reconstruct};
use super::ring_buffer::TemporalRingBuffer;
use super::spectrum::{BandpassMask, FrequencyBins, TemporalFilter};

/// Parameters of a pulse estimator, fixed for its lifetime.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EstimatorConfig {
    /// Assumed capture rate in Hz.
    pub frame_rate: f64,
    /// Number of pyramid reductions before temporal filtering.
    pub pyramid_levels: usize,
    /// Gain applied to the band-passed signal.
    pub alpha: f32,
    /// Passband lower edge in Hz.
    pub min_frequency: f64,
    /// Passband upper edge in Hz.
    pub max_frequency: f64,
    /// Temporal window length in frames.
    pub buffer_size: usize,
    /// Recalculate the BPM every this many frames.
    pub bpm_calculation_stride: usize,
    /// Number of BPM estimates averaged into the reported value.
    pub bpm_buffer_size: usize,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            frame_rate: DEFAULT_FRAME_RATE,
            pyramid_levels: DEFAULT_PYRAMID_LEVELS,
            alpha: DEFAULT_ALPHA,
            min_frequency: DEFAULT_MIN_FREQUENCY,
            max_frequency: DEFAULT_MAX_FREQUENCY,
            buffer_size: DEFAULT_BUFFER_SIZE,
            bpm_calculation_stride: DEFAULT_BPM_CALCULATION_STRIDE,
            bpm_buffer_size: DEFAULT_BPM_BUFFER_SIZE,
        }
    }
}

impl EstimatorConfig {
    /// Reject parameters the estimator cannot run with.
    ///
    /// A passband that selects no bin (e.g. `min_frequency > max_frequency`)
    /// is accepted: the filter then produces no amplification.
    pub fn validate(&self) -> Result<()> {
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(PulseError::InvalidConfig(format!(
                "frame_rate must be a positive number, got {}",
                self.frame_rate
            )));
        }
        if !self.min_frequency.is_finite() || !self.max_frequency.is_finite() {
            return Err(PulseError::InvalidConfig(
                "passband edges must be finite".into(),
            ));
        }
        if !self.alpha.is_finite() {
            return Err(PulseError::InvalidConfig("alpha must be finite".into()));
        }
        if self.buffer_size == 0 {
            return Err(PulseError::InvalidConfig("buffer_size must be > 0".into()));
        }
        if self.bpm_calculation_stride == 0 {
            return Err(PulseError::InvalidConfig(
                "bpm_calculation_stride must be > 0".into(),
            ));
        }
        if self.bpm_buffer_size == 0 {
            return Err(PulseError::InvalidConfig(
                "bpm_buffer_size must be > 0".into(),
            ));
        }
        Ok(())
    }

    /// Number of frames fed before the first numeric BPM is reported.
    pub fn warm_up_frames(&self) -> usize {
        self.bpm_buffer_size * self.bpm_calculation_stride
    }

    /// Seconds of history held by the temporal window.
    pub fn window_seconds(&self) -> f64 {
        self.buffer_size as f64 / self.frame_rate
    }
}

impl std::fmt::Display for EstimatorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{:.2}-{:.2} Hz @ {} fps, window {}, levels {}, alpha {}",
            self.min_frequency,
            self.max_frequency,
            self.frame_rate,
            self.buffer_size,
            self.pyramid_levels,
            self.alpha
        )
    }
}

/// Snapshot of the mutable counters of an estimator.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EstimatorState {
    /// Ring buffer slot the next frame will be written to.
    pub buffer_index: usize,
    /// Smoothing ring slot the next BPM estimate will be written to.
    pub bpm_buffer_index: usize,
    /// Number of BPM recalculations performed.
    pub recalculations: usize,
    /// Number of frames accepted by `update`.
    pub frames_seen: u64,
}

/// Result of one estimator update.
#[derive(Clone, Debug)]
pub struct PulseUpdate {
    /// Input frame with the amplified band-passed signal added.
    pub frame: Frame,
    pub bpm: BpmReading,
}

/// Eulerian color-magnification pulse estimator for one fixed-size ROI.
#[derive(Debug)]
pub struct PulseEstimator {
    config: EstimatorConfig,
    width: usize,
    height: usize,
    bins: FrequencyBins,
    filter: TemporalFilter,
    buffer: TemporalRingBuffer,
    smoother: BpmSmoother,
    cadence: CadenceMonitor,
    frames_seen: u64,
}

impl PulseEstimator {
    pub fn new(width: usize, height: usize, config: EstimatorConfig) -> Result<Self> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(PulseError::InvalidConfig(format!(
                "ROI size must be non-zero, got {}x{}",
                width, height
            )));
        }
        let deepest = max_levels(height, width);
        if config.pyramid_levels > deepest {
            return Err(PulseError::InvalidConfig(format!(
                "pyramid_levels {} exceeds {} for a {}x{} ROI",
                config.pyramid_levels, deepest, width, height
            )));
        }

        let bins = FrequencyBins::new(config.frame_rate, config.buffer_size);
        let mask = BandpassMask::new(&bins, config.min_frequency, config.max_frequency);
        if mask.selects_nothing() {
            warn!(
                min_hz = config.min_frequency,
                max_hz = config.max_frequency,
                "Passband selects no frequency bin; output will not be amplified"
            );
        }

        let (level_h, level_w) = level_shape(height, width, config.pyramid_levels);
        let buffer = TemporalRingBuffer::new(
            config.buffer_size,
            (level_h, level_w, COLOR_CHANNEL_COUNT),
        )?;

        Ok(Self {
            filter: TemporalFilter::new(mask)?,
            smoother: BpmSmoother::new(config.bpm_buffer_size)?,
            cadence: CadenceMonitor::new(config.frame_rate),
            bins,
            buffer,
            width,
            height,
            config,
            frames_seen: 0,
        })
    }

    /// Feed the next ROI frame.
    ///
    /// Frames must arrive in chronological order at `config.frame_rate`: the
    /// ring buffer slot order is the time axis of the FFT, so skipped,
    /// repeated or irregular frames shift the detected frequency. Timestamps
    /// in the frame metadata are only used to warn about a mismatch.
    pub fn update(&mut self, frame: &Frame) -> Result<PulseUpdate> {
        self.check_dimensions(frame)?;
        if let Some(ts) = frame.metadata.timestamp_us {
            self.cadence.observe(ts);
        }

        let original = frame.to_f32();
        let level = pyramid_level(&original, self.config.pyramid_levels);
        let slot = self.buffer.push(&level)?;

        let spectrum = self.filter.forward(self.buffer.view())?;

        if self.frames_seen % self.config.bpm_calculation_stride as u64 == 0 {
            let bin = dominant_bin(&spectrum.bin_means(), self.filter.mask());
            self.smoother.record(bin_to_bpm(&self.bins, bin));
        }
        self.frames_seen += 1;

        let amplified = self
            .filter
            .amplified_slot(&spectrum, slot, self.config.alpha)?;
        let detail = reconstruct(
            &amplified,
            self.config.pyramid_levels,
            self.width,
            self.height,
        );

        let mut output = composite(&original, &detail);
        output.metadata = frame.metadata.clone();

        Ok(PulseUpdate {
            frame: output,
            bpm: self.smoother.reading(),
        })
    }

    /// Current BPM reading without feeding a frame.
    pub fn reading(&self) -> BpmReading {
        self.smoother.reading()
    }

    pub fn state(&self) -> EstimatorState {
        EstimatorState {
            buffer_index: self.buffer.cursor(),
            bpm_buffer_index: self.smoother.cursor(),
            recalculations: self.smoother.recalculations(),
            frames_seen: self.frames_seen,
        }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn frequency_bins(&self) -> &FrequencyBins {
        &self.bins
    }

    pub fn mask(&self) -> &BandpassMask {
        self.filter.mask()
    }

    /// Frame rate measured from frame timestamps, if any were supplied.
    pub fn measured_frame_rate(&self) -> Option<f64> {
        self.cadence.measured_rate()
    }

    /// Whether the timestamped cadence has strayed from `config.frame_rate`.
    pub fn cadence_drift(&self) -> bool {
        self.cadence.drift_detected()
    }

    fn check_dimensions(&self, frame: &Frame) -> Result<()> {
        if frame.width() != self.width || frame.height() != self.height {
            return Err(PulseError::InvalidDimensions {
                expected_width: self.width,
                expected_height: self.height,
                width: frame.width(),
                height: frame.height(),
            });
        }
        if frame.channels() != COLOR_CHANNEL_COUNT {
            return Err(PulseError::InvalidChannelCount(frame.channels()));
        }
        Ok(())
    }
}

/// Add the amplified signal to the original frame and saturate to 8 bits.
pub fn composite(original: &Array3<f32>, amplified: &Array3<f32>) -> Frame {
    let sum = Zip::from(original)
        .and(amplified)
        .map_collect(|&o, &a| o + a);
    Frame::from_f32_saturating(&sum)
}
