#![allow(dead_code)]

use std::f64::consts::TAU;

use ndarray::Array3;
use pulsecam_core::frame::Frame;
use pulsecam_core::io::ser::SER_HEADER_SIZE;

/// Build a SER file header with configurable bit depth and color mode.
///
/// `color_id`: 0=MONO, 8=BAYER_RGGB, 100=RGB, 101=BGR
pub fn build_ser_header_full(
    width: u32,
    height: u32,
    bit_depth: u32,
    num_frames: usize,
    color_id: i32,
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(SER_HEADER_SIZE);

    // Magic (14 bytes)
    buf.extend_from_slice(b"LUCAM-RECORDER");
    // LuID
    buf.extend_from_slice(&0i32.to_le_bytes());
    // ColorID
    buf.extend_from_slice(&color_id.to_le_bytes());
    // LittleEndian = 0 (little-endian)
    buf.extend_from_slice(&0i32.to_le_bytes());
    buf.extend_from_slice(&(width as i32).to_le_bytes());
    buf.extend_from_slice(&(height as i32).to_le_bytes());
    buf.extend_from_slice(&(bit_depth as i32).to_le_bytes());
    buf.extend_from_slice(&(num_frames as i32).to_le_bytes());
    // Observer, Instrument, Telescope (40 bytes each)
    buf.extend_from_slice(&[0u8; 120]);
    // DateTime, DateTimeUTC
    buf.extend_from_slice(&0u64.to_le_bytes());
    buf.extend_from_slice(&0u64.to_le_bytes());

    assert_eq!(buf.len(), SER_HEADER_SIZE);
    buf
}

/// Write a SER buffer to a temporary file and return the temp file handle.
///
/// The file stays alive as long as the returned `NamedTempFile` is not dropped.
pub fn write_test_ser(data: &[u8]) -> tempfile::NamedTempFile {
    use std::io::Write;
    let mut f = tempfile::NamedTempFile::new().expect("create temp file");
    f.write_all(data).expect("write SER data");
    f.flush().expect("flush");
    f
}

pub fn gray_frame(width: usize, height: usize, value: u8) -> Frame {
    Frame::filled(width, height, [value, value, value])
}

/// Uniform frame whose brightness follows `base + amplitude * cos(2 pi f t)`
/// sampled at `frame_rate`.
pub fn oscillating_frame(
    width: usize,
    height: usize,
    base: f64,
    amplitude: f64,
    hz: f64,
    frame_rate: f64,
    index: usize,
) -> Frame {
    let t = index as f64 / frame_rate;
    let v = (base + amplitude * (TAU * hz * t).cos()).round().clamp(0.0, 255.0) as u8;
    gray_frame(width, height, v)
}

/// Horizontal/vertical ramp, different per channel.
pub fn ramp_frame(width: usize, height: usize) -> Frame {
    let data = Array3::from_shape_fn((height, width, 3), |(r, c, ch)| {
        ((r * 7 + c * 3 + ch * 40) % 256) as u8
    });
    Frame::new(data)
}
