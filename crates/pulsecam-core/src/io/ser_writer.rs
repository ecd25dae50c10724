use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::consts::SER_TICKS_PER_MICROSECOND;
use crate::error::{PulseError, Result};
use crate::frame::Frame;
use crate::io::ser::{SerHeader, SER_COLOR_RGB, SER_HEADER_SIZE, SER_MAGIC};

/// Writes an 8-bit RGB SER stream frame by frame.
pub struct SerWriter {
    writer: BufWriter<File>,
    header: SerHeader,
    frames_written: u32,
    timestamps_us: Vec<u64>,
}

impl SerWriter {
    /// Create a new SER file and write the header.
    ///
    /// The header's frame count is written up front, so it must match the
    /// number of frames that will follow.
    pub fn create(path: &Path, header: &SerHeader) -> Result<Self> {
        if header.color_id != SER_COLOR_RGB || header.pixel_depth != 8 {
            return Err(PulseError::UnsupportedColorMode(format!(
                "writer only emits 8-bit RGB, got color id {} at {} bits",
                header.color_id, header.pixel_depth
            )));
        }
        let limit = i32::MAX as u32;
        if header.width > limit || header.height > limit || header.frame_count > limit {
            return Err(PulseError::InvalidSer(format!(
                "{}x{} with {} frames does not fit a SER header",
                header.width, header.height, header.frame_count
            )));
        }
        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);
        write_header(&mut writer, header)?;
        Ok(Self {
            writer,
            header: header.clone(),
            frames_written: 0,
            timestamps_us: Vec::new(),
        })
    }

    /// Append one frame. Its timestamp, if any, goes to the trailer.
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        let width = self.header.width as usize;
        let height = self.header.height as usize;
        if frame.width() != width || frame.height() != height {
            return Err(PulseError::InvalidDimensions {
                expected_width: width,
                expected_height: height,
                width: frame.width(),
                height: frame.height(),
            });
        }
        if self.frames_written >= self.header.frame_count {
            return Err(PulseError::FrameIndexOutOfRange {
                index: self.frames_written as usize,
                total: self.header.frame_count as usize,
            });
        }

        match frame.data.as_slice() {
            Some(bytes) => self.writer.write_all(bytes)?,
            None => self.writer.write_all(&frame.to_raw_rgb())?,
        }
        if let Some(ts) = frame.metadata.timestamp_us {
            self.timestamps_us.push(ts);
        }
        self.frames_written += 1;
        Ok(())
    }

    pub fn frames_written(&self) -> u32 {
        self.frames_written
    }

    /// Write the timestamp trailer (when every frame carried one), flush and
    /// close the file.
    pub fn finalize(mut self) -> Result<()> {
        if self.frames_written != self.header.frame_count {
            return Err(PulseError::InvalidSer(format!(
                "Header announces {} frames, {} written",
                self.header.frame_count, self.frames_written
            )));
        }
        if self.timestamps_us.len() == self.frames_written as usize {
            for &ts in &self.timestamps_us {
                let ticks = ts * SER_TICKS_PER_MICROSECOND;
                self.writer.write_all(&ticks.to_le_bytes())?;
            }
        }
        self.writer.flush()?;
        Ok(())
    }
}

fn write_header(w: &mut impl Write, header: &SerHeader) -> Result<()> {
    // Magic (14 bytes)
    w.write_all(SER_MAGIC)?;
    // LuID (4 bytes)
    w.write_all(&0i32.to_le_bytes())?;
    // ColorID (4 bytes)
    w.write_all(&header.color_id.to_le_bytes())?;
    // LittleEndian flag: 0 = little-endian
    let le_flag: i32 = if header.little_endian { 0 } else { 1 };
    w.write_all(&le_flag.to_le_bytes())?;
    w.write_all(&(header.width as i32).to_le_bytes())?;
    w.write_all(&(header.height as i32).to_le_bytes())?;
    w.write_all(&(header.pixel_depth as i32).to_le_bytes())?;
    w.write_all(&(header.frame_count as i32).to_le_bytes())?;
    // Observer, Instrument, Telescope (40 bytes each)
    write_fixed_string(w, &header.observer, 40)?;
    write_fixed_string(w, &header.instrument, 40)?;
    write_fixed_string(w, &header.telescope, 40)?;
    w.write_all(&header.date_time.to_le_bytes())?;
    w.write_all(&header.date_time_utc.to_le_bytes())?;

    debug_assert_eq!(
        14 + 4 + 4 + 4 + 4 + 4 + 4 + 4 + 40 + 40 + 40 + 8 + 8,
        SER_HEADER_SIZE
    );
    Ok(())
}

fn write_fixed_string(w: &mut impl Write, s: &str, len: usize) -> Result<()> {
    let bytes = s.as_bytes();
    let to_write = bytes.len().min(len);
    w.write_all(&bytes[..to_write])?;
    w.write_all(&vec![0u8; len - to_write])?;
    Ok(())
}
