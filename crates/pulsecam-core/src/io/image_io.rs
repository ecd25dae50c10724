use std::path::Path;

use image::{ImageFormat, RgbImage};
use ndarray::Array3;

use crate::consts::COLOR_CHANNEL_COUNT;
use crate::error::{PulseError, Result};
use crate::frame::Frame;

/// Save a frame as 8-bit RGB PNG.
pub fn save_png(frame: &Frame, path: &Path) -> Result<()> {
    let img = to_rgb_image(frame)?;
    img.save_with_format(path, ImageFormat::Png)?;
    Ok(())
}

/// Load any image the `image` crate can decode as an 8-bit RGB frame.
pub fn load_image(path: &Path) -> Result<Frame> {
    let rgb = image::open(path)?.to_rgb8();
    let (w, h) = rgb.dimensions();
    let data = Array3::from_shape_vec(
        (h as usize, w as usize, COLOR_CHANNEL_COUNT),
        rgb.into_raw(),
    )?;
    Ok(Frame::new(data))
}

fn to_rgb_image(frame: &Frame) -> Result<RgbImage> {
    if frame.channels() != COLOR_CHANNEL_COUNT {
        return Err(PulseError::InvalidChannelCount(frame.channels()));
    }
    RgbImage::from_raw(
        frame.width() as u32,
        frame.height() as u32,
        frame.to_raw_rgb(),
    )
    .ok_or_else(|| {
        PulseError::InvalidConfig(format!(
            "Pixel buffer does not match {}x{}",
            frame.width(),
            frame.height()
        ))
    })
}
