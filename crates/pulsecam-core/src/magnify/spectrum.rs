//! Temporal bandpass filtering of a ring buffer of pyramid levels.
//!
//! Every pixel/channel of the buffered levels is treated as a time series of
//! `buffer_size` samples in slot order. The series are transformed with an
//! FFT along time, bins outside the passband are zeroed and the inverse FFT
//! yields the band-limited signal.

use std::sync::Arc;

use ndarray::{Array2, Array3, ArrayView1, ArrayView4, Axis};
use num_complex::Complex;
use num_traits::Zero;
use rustfft::{Fft, FftPlanner};

use crate::error::{PulseError, Result};

/// Frequency (Hz) of each FFT bin for a window of `len` samples at
/// `frame_rate`: `f[k] = frame_rate * k / len`.
///
/// Bins are one-sided; the upper half is not folded to negative frequencies.
#[derive(Clone, Debug, PartialEq)]
pub struct FrequencyBins {
    frequencies: Vec<f64>,
    frame_rate: f64,
}

impl FrequencyBins {
    pub fn new(frame_rate: f64, len: usize) -> Self {
        let frequencies = (0..len)
            .map(|k| frame_rate * k as f64 / len as f64)
            .collect();
        Self {
            frequencies,
            frame_rate,
        }
    }

    pub fn len(&self) -> usize {
        self.frequencies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frequencies.is_empty()
    }

    pub fn hz(&self, bin: usize) -> f64 {
        self.frequencies[bin]
    }

    /// Spacing between adjacent bins in Hz.
    pub fn bin_width(&self) -> f64 {
        if self.frequencies.is_empty() {
            0.0
        } else {
            self.frame_rate / self.frequencies.len() as f64
        }
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.frequencies
    }
}

/// Bins whose frequency lies in `[min_hz, max_hz]` (inclusive).
#[derive(Clone, Debug, PartialEq)]
pub struct BandpassMask {
    pass: Vec<bool>,
}

impl BandpassMask {
    pub fn new(bins: &FrequencyBins, min_hz: f64, max_hz: f64) -> Self {
        let pass = bins
            .as_slice()
            .iter()
            .map(|&f| f >= min_hz && f <= max_hz)
            .collect();
        Self { pass }
    }

    pub fn passes(&self, bin: usize) -> bool {
        self.pass.get(bin).copied().unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.pass.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pass.is_empty()
    }

    /// True when no bin is selected. Filtering still works and yields zero.
    pub fn selects_nothing(&self) -> bool {
        !self.pass.iter().any(|&p| p)
    }

    /// Indices of selected bins, ascending.
    pub fn passband(&self) -> impl Iterator<Item = usize> + '_ {
        self.pass
            .iter()
            .enumerate()
            .filter_map(|(k, &p)| p.then_some(k))
    }
}

/// Masked spectra of all pixel/channel series.
#[derive(Clone, Debug)]
pub struct FilteredSpectrum {
    /// Shape = (series, bins), one row per pixel/channel series.
    data: Array2<Complex<f64>>,
    /// Spatial shape (height, width, channels) of a single time slot.
    level_dim: (usize, usize, usize),
}

impl FilteredSpectrum {
    pub fn bins(&self) -> usize {
        self.data.ncols()
    }

    pub fn series(&self) -> usize {
        self.data.nrows()
    }

    /// All series' coefficients for one bin.
    pub fn bin(&self, k: usize) -> ArrayView1<'_, Complex<f64>> {
        self.data.column(k)
    }

    /// Mean real part of every bin over all pixels and channels.
    pub fn bin_means(&self) -> Vec<f64> {
        let series = self.series().max(1) as f64;
        self.data
            .columns()
            .into_iter()
            .map(|col| col.iter().map(|c| c.re).sum::<f64>() / series)
            .collect()
    }
}

/// FFT-based temporal bandpass filter for a fixed window length.
pub struct TemporalFilter {
    forward: Arc<dyn Fft<f64>>,
    inverse: Arc<dyn Fft<f64>>,
    mask: BandpassMask,
}

impl TemporalFilter {
    pub fn new(mask: BandpassMask) -> Result<Self> {
        let len = mask.len();
        if len == 0 {
            return Err(PulseError::InvalidConfig(
                "Temporal window must hold at least one frame".into(),
            ));
        }
        let mut planner = FftPlanner::new();
        Ok(Self {
            forward: planner.plan_fft_forward(len),
            inverse: planner.plan_fft_inverse(len),
            mask,
        })
    }

    pub fn len(&self) -> usize {
        self.mask.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mask.is_empty()
    }

    pub fn mask(&self) -> &BandpassMask {
        &self.mask
    }

    /// Forward-transform every series of `buffer` (time on axis 0) and zero
    /// the bins outside the passband.
    pub fn forward(&self, buffer: ArrayView4<'_, f32>) -> Result<FilteredSpectrum> {
        let (len, h, w, c) = buffer.dim();
        if len != self.len() {
            return Err(PulseError::InvalidConfig(format!(
                "Buffer holds {} frames, filter expects {}",
                len,
                self.len()
            )));
        }

        let series = h * w * c;
        let mut data = Vec::with_capacity(series * len);
        for lane in buffer.lanes(Axis(0)) {
            data.extend(lane.iter().map(|&v| Complex::new(v as f64, 0.0)));
        }

        let mut scratch = vec![Complex::zero(); self.forward.get_inplace_scratch_len()];
        for chunk in data.chunks_mut(len) {
            self.forward.process_with_scratch(chunk, &mut scratch);
            for (k, v) in chunk.iter_mut().enumerate() {
                if !self.mask.passes(k) {
                    *v = Complex::zero();
                }
            }
        }

        Ok(FilteredSpectrum {
            data: Array2::from_shape_vec((series, len), data)?,
            level_dim: (h, w, c),
        })
    }

    /// Inverse-transform the spectrum, take the real part of the sample at
    /// time slot `slot` and multiply it by `gain`.
    pub fn amplified_slot(
        &self,
        spectrum: &FilteredSpectrum,
        slot: usize,
        gain: f32,
    ) -> Result<Array3<f32>> {
        let len = self.len();
        if slot >= len {
            return Err(PulseError::FrameIndexOutOfRange {
                index: slot,
                total: len,
            });
        }

        let scale = gain as f64 / len as f64;
        let mut series = vec![Complex::zero(); len];
        let mut scratch = vec![Complex::zero(); self.inverse.get_inplace_scratch_len()];
        let mut values = Vec::with_capacity(spectrum.series());
        for row in spectrum.data.rows() {
            for (dst, &src) in series.iter_mut().zip(row.iter()) {
                *dst = src;
            }
            self.inverse.process_with_scratch(&mut series, &mut scratch);
            values.push((series[slot].re * scale) as f32);
        }

        Ok(Array3::from_shape_vec(spectrum.level_dim, values)?)
    }
}

impl std::fmt::Debug for TemporalFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemporalFilter")
            .field("len", &self.len())
            .field("mask", &self.mask)
            .finish()
    }
}
