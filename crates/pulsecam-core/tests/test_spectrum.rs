use std::f64::consts::TAU;

use approx::assert_abs_diff_eq;
use ndarray::Array3;
use num_complex::Complex;

use pulsecam_core::error::PulseError;
use pulsecam_core::magnify::bpm::dominant_bin;
use pulsecam_core::magnify::ring_buffer::TemporalRingBuffer;
use pulsecam_core::magnify::spectrum::{BandpassMask, FrequencyBins, TemporalFilter};

const FPS: f64 = 60.0;
const LEN: usize = 150;

/// Buffer filled with `base + amplitude * cos(2 pi k t / LEN)` in every cell.
fn sinusoid_buffer(bin: usize, base: f64, amplitude: f64) -> TemporalRingBuffer {
    let mut buffer = TemporalRingBuffer::new(LEN, (2, 2, 3)).unwrap();
    for t in 0..LEN {
        let v = base + amplitude * (TAU * bin as f64 * t as f64 / LEN as f64).cos();
        buffer.push(&Array3::from_elem((2, 2, 3), v as f32)).unwrap();
    }
    buffer
}

fn default_filter() -> TemporalFilter {
    let bins = FrequencyBins::new(FPS, LEN);
    TemporalFilter::new(BandpassMask::new(&bins, 1.0, 2.0)).unwrap()
}

#[test]
fn test_frequency_table() {
    let bins = FrequencyBins::new(FPS, LEN);
    assert_eq!(bins.len(), LEN);
    assert_eq!(bins.hz(0), 0.0);
    assert_abs_diff_eq!(bins.hz(1), 0.4, epsilon = 1e-12);
    assert_abs_diff_eq!(bins.hz(149), 59.6, epsilon = 1e-9);
    assert_abs_diff_eq!(bins.bin_width(), 0.4, epsilon = 1e-12);
    assert_eq!(bins.as_slice().len(), LEN);
}

#[test]
fn test_passband_is_inclusive() {
    let bins = FrequencyBins::new(FPS, LEN);
    let mask = BandpassMask::new(&bins, 1.0, 2.0);
    // 1.2, 1.6 and 2.0 Hz; the upper edge sits exactly on bin 5
    assert_eq!(mask.passband().collect::<Vec<_>>(), vec![3, 4, 5]);
    assert!(!mask.passes(2));
    assert!(mask.passes(5));
    assert!(!mask.passes(6));
    assert!(!mask.selects_nothing());
    assert_eq!(mask.len(), LEN);
}

#[test]
fn test_inverted_passband_selects_nothing() {
    let bins = FrequencyBins::new(FPS, LEN);
    let mask = BandpassMask::new(&bins, 3.0, 2.0);
    assert!(mask.selects_nothing());
    assert_eq!(mask.passband().count(), 0);
}

#[test]
fn test_out_of_band_bins_are_zero() {
    let mut buffer = TemporalRingBuffer::new(LEN, (3, 2, 3)).unwrap();
    for t in 0..LEN {
        let level = Array3::from_shape_fn((3, 2, 3), |(r, c, ch)| {
            ((t * 31 + r * 17 + c * 5 + ch * 3) % 97) as f32
        });
        buffer.push(&level).unwrap();
    }
    let filter = default_filter();
    let spectrum = filter.forward(buffer.view()).unwrap();

    assert_eq!(spectrum.series(), 18);
    assert_eq!(spectrum.bins(), LEN);
    for k in 0..LEN {
        if filter.mask().passes(k) {
            continue;
        }
        assert!(spectrum.bin(k).iter().all(|&v| v == Complex::new(0.0, 0.0)));
    }
}

#[test]
fn test_constant_buffer_has_no_passband_energy() {
    let buffer = sinusoid_buffer(4, 120.0, 0.0);
    let spectrum = default_filter().forward(buffer.view()).unwrap();
    for k in [3, 4, 5] {
        for v in spectrum.bin(k) {
            assert!(v.norm() < 1e-6, "bin {} = {}", k, v);
        }
    }
}

#[test]
fn test_sinusoid_dominates_its_bin() {
    let buffer = sinusoid_buffer(4, 120.0, 10.0);
    let filter = default_filter();
    let spectrum = filter.forward(buffer.view()).unwrap();
    let means = spectrum.bin_means();

    assert_eq!(means.len(), LEN);
    // N * A / 2 on the positive-frequency bin
    assert_abs_diff_eq!(means[4], 750.0, epsilon = 1e-2);
    assert_eq!(dominant_bin(&means, filter.mask()), 4);
}

#[test]
fn test_amplified_slot_is_scaled_real_part() {
    let buffer = sinusoid_buffer(4, 120.0, 10.0);
    let filter = default_filter();
    let spectrum = filter.forward(buffer.view()).unwrap();

    // One-sided spectrum: only half the amplitude comes back
    let slot0 = filter.amplified_slot(&spectrum, 0, 1.0).unwrap();
    assert_eq!(slot0.dim(), (2, 2, 3));
    for &v in slot0.iter() {
        assert_abs_diff_eq!(v, 5.0, epsilon = 1e-3);
    }

    let gained = filter.amplified_slot(&spectrum, 0, 170.0).unwrap();
    for &v in gained.iter() {
        assert_abs_diff_eq!(v, 850.0, epsilon = 0.1);
    }
}

#[test]
fn test_empty_passband_yields_zero_signal() {
    let bins = FrequencyBins::new(FPS, LEN);
    let filter = TemporalFilter::new(BandpassMask::new(&bins, 3.0, 2.0)).unwrap();
    let buffer = sinusoid_buffer(4, 120.0, 10.0);
    let spectrum = filter.forward(buffer.view()).unwrap();

    assert!(spectrum.bin_means().iter().all(|&m| m == 0.0));
    assert_eq!(dominant_bin(&spectrum.bin_means(), filter.mask()), 0);

    let amplified = filter.amplified_slot(&spectrum, 17, 170.0).unwrap();
    assert!(amplified.iter().all(|&v| v == 0.0));
}

#[test]
fn test_buffer_length_mismatch() {
    let buffer = TemporalRingBuffer::new(10, (1, 1, 3)).unwrap();
    let err = default_filter().forward(buffer.view()).unwrap_err();
    assert!(matches!(err, PulseError::InvalidConfig(_)));
}

#[test]
fn test_slot_out_of_range() {
    let buffer = sinusoid_buffer(4, 120.0, 1.0);
    let filter = default_filter();
    let spectrum = filter.forward(buffer.view()).unwrap();
    assert!(matches!(
        filter.amplified_slot(&spectrum, LEN, 1.0),
        Err(PulseError::FrameIndexOutOfRange { index: 150, total: 150 })
    ));
}
