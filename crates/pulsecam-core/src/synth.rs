//! Synthetic pulsing video, for demos and tests.
//!
//! Every pixel of a uniform skin-colored frame is modulated by the same
//! sinusoid, mimicking the blood-volume color change at a known heart rate.

use std::f64::consts::TAU;
use std::path::Path;

use ndarray::Array3;
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_CHANNEL_COUNT, SECONDS_PER_MINUTE};
use crate::error::{PulseError, Result};
use crate::frame::{Frame, FrameMetadata};
use crate::io::ser::SerHeader;
use crate::io::ser_writer::SerWriter;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SynthParams {
    pub width: usize,
    pub height: usize,
    pub frames: usize,
    /// Simulated heart rate.
    pub bpm: f64,
    /// Peak brightness deviation in 8-bit levels.
    pub amplitude: f64,
    pub frame_rate: f64,
    /// Base skin tone (R, G, B).
    pub base_color: [u8; 3],
}

impl Default for SynthParams {
    fn default() -> Self {
        Self {
            width: 320,
            height: 240,
            frames: 600,
            bpm: 72.0,
            amplitude: 3.0,
            frame_rate: 60.0,
            base_color: [190, 140, 120],
        }
    }
}

impl SynthParams {
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(PulseError::InvalidConfig(format!(
                "Synthetic frame size must be non-zero, got {}x{}",
                self.width, self.height
            )));
        }
        if !self.frame_rate.is_finite() || self.frame_rate <= 0.0 {
            return Err(PulseError::InvalidConfig(format!(
                "frame_rate must be a positive number, got {}",
                self.frame_rate
            )));
        }
        if !self.bpm.is_finite() || !self.amplitude.is_finite() {
            return Err(PulseError::InvalidConfig(
                "bpm and amplitude must be finite".into(),
            ));
        }
        Ok(())
    }

    /// Brightness offset of frame `index`.
    pub fn modulation(&self, index: usize) -> f64 {
        let hz = self.bpm / SECONDS_PER_MINUTE;
        let t = index as f64 / self.frame_rate;
        self.amplitude * (TAU * hz * t).cos()
    }

    pub fn timestamp_us(&self, index: usize) -> u64 {
        (index as f64 / self.frame_rate * 1_000_000.0).round() as u64
    }
}

/// Frame `index` of the synthetic sequence, stamped with its capture time.
pub fn synth_frame(params: &SynthParams, index: usize) -> Frame {
    let offset = params.modulation(index);
    let data = Array3::from_shape_fn(
        (params.height, params.width, COLOR_CHANNEL_COUNT),
        |(_, _, ch)| (params.base_color[ch] as f64 + offset).round().clamp(0.0, 255.0) as u8,
    );
    Frame::new(data).with_metadata(FrameMetadata {
        frame_index: index,
        timestamp_us: Some(params.timestamp_us(index)),
    })
}

/// Write the whole sequence as an 8-bit RGB SER file with timestamps.
pub fn write_synthetic_ser(path: &Path, params: &SynthParams) -> Result<()> {
    params.validate()?;
    let header = SerHeader::rgb8_sized(params.width, params.height, params.frames)?;
    let mut writer = SerWriter::create(path, &header)?;
    for index in 0..params.frames {
        writer.write_frame(&synth_frame(params, index))?;
    }
    writer.finalize()
}
