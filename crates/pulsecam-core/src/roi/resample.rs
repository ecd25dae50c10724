use ndarray::{s, Array3, ArrayView3};
use tracing::warn;

use crate::error::{PulseError, Result};
use crate::frame::Frame;

use super::geometry::{RoiRect, RoiSize};

/// Cut `rect` out of `frame` and bilinearly resample it to `size`.
///
/// The rectangle is clipped to the frame first; a rectangle with no overlap
/// is an error.
pub fn crop_and_resize(frame: &Frame, rect: &RoiRect, size: RoiSize) -> Result<Frame> {
    if size.width == 0 || size.height == 0 {
        return Err(PulseError::InvalidRoi(format!(
            "Output size must be non-zero, got {}",
            size
        )));
    }

    let (x, y, w, h) = rect.clipped(frame.width(), frame.height())?;
    if w != rect.width as usize || h != rect.height as usize {
        warn!(
            region = %rect,
            clipped_width = w,
            clipped_height = h,
            "Region partially outside the frame, clipping"
        );
    }

    let window = frame.data.slice(s![y..y + h, x..x + w, ..]);
    let channels = frame.channels();
    let scale_x = w as f64 / size.width as f64;
    let scale_y = h as f64 / size.height as f64;

    let mut out = Array3::<u8>::zeros((size.height, size.width, channels));
    for row in 0..size.height {
        // Pixel-center mapping: destination centers land between source centers
        let src_y = ((row as f64 + 0.5) * scale_y - 0.5).clamp(0.0, (h - 1) as f64);
        for col in 0..size.width {
            let src_x = ((col as f64 + 0.5) * scale_x - 0.5).clamp(0.0, (w - 1) as f64);
            for ch in 0..channels {
                let v = bilinear_sample(&window, src_y, src_x, ch);
                out[[row, col, ch]] = v.round().clamp(0.0, 255.0) as u8;
            }
        }
    }

    Ok(Frame::new(out).with_metadata(frame.metadata.clone()))
}

/// Sample one channel at a fractional position already clamped to the window.
fn bilinear_sample(window: &ArrayView3<'_, u8>, y: f64, x: f64, ch: usize) -> f32 {
    let (h, w, _) = window.dim();
    let r0 = y.floor() as usize;
    let c0 = x.floor() as usize;
    let r1 = (r0 + 1).min(h - 1);
    let c1 = (c0 + 1).min(w - 1);

    let fy = (y - r0 as f64) as f32;
    let fx = (x - c0 as f64) as f32;

    let sample = |r: usize, c: usize| -> f32 { window[[r, c, ch]] as f32 };

    sample(r0, c0) * (1.0 - fx) * (1.0 - fy)
        + sample(r0, c1) * fx * (1.0 - fy)
        + sample(r1, c0) * (1.0 - fx) * fy
        + sample(r1, c1) * fx * fy
}
