use std::path::PathBuf;

use ndarray::{Array3, Zip};

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{PulseError, Result};

/// A single 8-bit RGB frame.
///
/// Used both for full video frames and for the fixed-size region crops fed to
/// a [`PulseEstimator`](crate::magnify::PulseEstimator).
#[derive(Clone, Debug)]
pub struct Frame {
    /// Pixel data, shape = (height, width, 3), channel order R, G, B.
    pub data: Array3<u8>,
    /// Optional per-frame metadata
    pub metadata: FrameMetadata,
}

impl Frame {
    pub fn new(data: Array3<u8>) -> Self {
        Self {
            data,
            metadata: FrameMetadata::default(),
        }
    }

    /// Build a frame from interleaved RGB bytes, row-major.
    pub fn from_raw_rgb(width: usize, height: usize, pixels: Vec<u8>) -> Result<Self> {
        let expected = width * height * COLOR_CHANNEL_COUNT;
        if pixels.len() != expected {
            return Err(PulseError::InvalidConfig(format!(
                "RGB buffer holds {} bytes, {}x{} needs {}",
                pixels.len(),
                width,
                height,
                expected
            )));
        }
        let data = Array3::from_shape_vec((height, width, COLOR_CHANNEL_COUNT), pixels)?;
        Ok(Self::new(data))
    }

    /// A frame of uniform color.
    pub fn filled(width: usize, height: usize, rgb: [u8; 3]) -> Self {
        let data =
            Array3::from_shape_fn((height, width, COLOR_CHANNEL_COUNT), |(_, _, ch)| rgb[ch]);
        Self::new(data)
    }

    pub fn width(&self) -> usize {
        self.data.dim().1
    }

    pub fn height(&self) -> usize {
        self.data.dim().0
    }

    pub fn channels(&self) -> usize {
        self.data.dim().2
    }

    pub fn with_metadata(mut self, metadata: FrameMetadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Widen to f32 in [0.0, 255.0].
    pub fn to_f32(&self) -> Array3<f32> {
        self.data.mapv(f32::from)
    }

    /// Round and saturate a floating-point image back to 8 bits.
    pub fn from_f32_saturating(data: &Array3<f32>) -> Self {
        let mut out = Array3::<u8>::zeros(data.dim());
        Zip::from(&mut out)
            .and(data)
            .for_each(|o, &v| *o = v.round().clamp(0.0, 255.0) as u8);
        Self::new(out)
    }

    /// Interleaved RGB bytes, row-major.
    pub fn to_raw_rgb(&self) -> Vec<u8> {
        self.data.iter().copied().collect()
    }

    /// Mean over all pixels and channels.
    pub fn mean_intensity(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().map(|&v| v as f64).sum::<f64>() / self.data.len() as f64
    }
}

#[derive(Clone, Debug, Default)]
pub struct FrameMetadata {
    pub frame_index: usize,
    pub timestamp_us: Option<u64>,
}

/// Color/Bayer mode of the source data.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum ColorMode {
    Mono,
    BayerRGGB,
    BayerGRBG,
    BayerGBRG,
    BayerBGGR,
    RGB,
    BGR,
}

impl std::fmt::Display for ColorMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mono => write!(f, "Mono"),
            Self::BayerRGGB => write!(f, "Bayer RGGB"),
            Self::BayerGRBG => write!(f, "Bayer GRBG"),
            Self::BayerGBRG => write!(f, "Bayer GBRG"),
            Self::BayerBGGR => write!(f, "Bayer BGGR"),
            Self::RGB => write!(f, "RGB"),
            Self::BGR => write!(f, "BGR"),
        }
    }
}

/// Metadata about the source file.
#[derive(Clone, Debug)]
pub struct SourceInfo {
    pub filename: PathBuf,
    pub total_frames: usize,
    pub width: u32,
    pub height: u32,
    pub bit_depth: u8,
    pub color_mode: ColorMode,
    pub observer: Option<String>,
    pub telescope: Option<String>,
    pub instrument: Option<String>,
    pub has_timestamps: bool,
}
