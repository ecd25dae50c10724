use std::fs::File;
use std::path::Path;

use byteorder::{LittleEndian, ReadBytesExt};
use memmap2::Mmap;
use ndarray::Array3;

use crate::consts::{COLOR_CHANNEL_COUNT, SER_TICKS_PER_MICROSECOND};
use crate::error::{PulseError, Result};
use crate::frame::{ColorMode, Frame, FrameMetadata, SourceInfo};

pub const SER_HEADER_SIZE: usize = 178;
pub(crate) const SER_MAGIC: &[u8; 14] = b"LUCAM-RECORDER";

pub const SER_COLOR_MONO: i32 = 0;
pub const SER_COLOR_RGB: i32 = 100;
pub const SER_COLOR_BGR: i32 = 101;

/// SER file header (178 bytes).
#[derive(Clone, Debug)]
pub struct SerHeader {
    pub color_id: i32,
    pub little_endian: bool,
    pub width: u32,
    pub height: u32,
    pub pixel_depth: u32,
    pub frame_count: u32,
    pub observer: String,
    pub instrument: String,
    pub telescope: String,
    pub date_time: u64,
    pub date_time_utc: u64,
}

impl SerHeader {
    /// Header for an 8-bit interleaved RGB stream.
    pub fn rgb8(width: u32, height: u32, frame_count: u32) -> Self {
        Self {
            color_id: SER_COLOR_RGB,
            little_endian: true,
            width,
            height,
            pixel_depth: 8,
            frame_count,
            observer: String::new(),
            instrument: String::from("pulsecam"),
            telescope: String::new(),
            date_time: 0,
            date_time_utc: 0,
        }
    }

    /// Bytes per pixel plane (1 for 8-bit, 2 for 9-16 bit).
    pub fn bytes_per_pixel_plane(&self) -> usize {
        if self.pixel_depth <= 8 {
            1
        } else {
            2
        }
    }

    /// Number of planes per pixel (1 for mono/bayer, 3 for RGB/BGR).
    pub fn planes_per_pixel(&self) -> usize {
        match self.color_id {
            SER_COLOR_RGB | SER_COLOR_BGR => COLOR_CHANNEL_COUNT,
            _ => 1,
        }
    }

    /// [`SerHeader::rgb8`] from in-memory sizes, each of which must fit the
    /// header's signed 32-bit fields.
    pub fn rgb8_sized(width: usize, height: usize, frame_count: usize) -> Result<Self> {
        Ok(Self::rgb8(
            header_field("width", width)?,
            header_field("height", height)?,
            header_field("frame count", frame_count)?,
        ))
    }

    /// Total bytes per frame.
    pub fn frame_byte_size(&self) -> Result<usize> {
        (self.width as usize)
            .checked_mul(self.height as usize)
            .and_then(|pixels| pixels.checked_mul(self.bytes_per_pixel_plane()))
            .and_then(|samples| samples.checked_mul(self.planes_per_pixel()))
            .ok_or_else(|| {
                PulseError::InvalidSer(format!(
                    "Frame size overflows: {}x{} at {} bits",
                    self.width, self.height, self.pixel_depth
                ))
            })
    }

    pub fn color_mode(&self) -> ColorMode {
        match self.color_id {
            0 => ColorMode::Mono,
            8 => ColorMode::BayerRGGB,
            9 => ColorMode::BayerGRBG,
            10 => ColorMode::BayerGBRG,
            11 => ColorMode::BayerBGGR,
            100 => ColorMode::RGB,
            101 => ColorMode::BGR,
            _ => ColorMode::Mono,
        }
    }
}

/// Memory-mapped SER video reader yielding 8-bit RGB frames.
pub struct SerReader {
    mmap: Mmap,
    pub header: SerHeader,
    frame_bytes: usize,
    data_end: usize,
}

impl SerReader {
    /// Open a SER file and parse its header.
    pub fn open(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        // SAFETY: the map is read-only and the file is not modified while mapped.
        let mmap = unsafe { Mmap::map(&file)? };

        if mmap.len() < SER_HEADER_SIZE {
            return Err(PulseError::InvalidSer(
                "File too small for SER header".into(),
            ));
        }

        if &mmap[0..14] != SER_MAGIC {
            return Err(PulseError::InvalidSer(
                "Missing LUCAM-RECORDER magic".into(),
            ));
        }

        let header = parse_header(&mmap[..SER_HEADER_SIZE])?;

        let frame_bytes = header.frame_byte_size()?;
        let expected_data_size = frame_bytes
            .checked_mul(header.frame_count as usize)
            .and_then(|data| data.checked_add(SER_HEADER_SIZE))
            .ok_or_else(|| {
                PulseError::InvalidSer(format!(
                    "Data size overflows: {} frames of {} bytes",
                    header.frame_count, frame_bytes
                ))
            })?;
        if mmap.len() < expected_data_size {
            return Err(PulseError::InvalidSer(format!(
                "File truncated: expected at least {} bytes, got {}",
                expected_data_size,
                mmap.len()
            )));
        }

        Ok(Self {
            mmap,
            header,
            frame_bytes,
            data_end: expected_data_size,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.header.frame_count as usize
    }

    /// Bytes of one frame in the file, already checked against the file size.
    pub fn frame_byte_size(&self) -> usize {
        self.frame_bytes
    }

    /// Get the raw bytes for a single frame (zero-copy from mmap).
    pub fn frame_raw(&self, index: usize) -> Result<&[u8]> {
        let count = self.frame_count();
        if index >= count {
            return Err(PulseError::FrameIndexOutOfRange {
                index,
                total: count,
            });
        }
        let offset = SER_HEADER_SIZE + index * self.frame_bytes;
        let end = offset + self.frame_bytes;
        Ok(&self.mmap[offset..end])
    }

    /// Read a single frame as 8-bit RGB. Mono frames are replicated into all
    /// three channels, deeper samples are scaled down to 8 bits.
    pub fn read_frame(&self, index: usize) -> Result<Frame> {
        let mode = self.header.color_mode();
        let channel_map: [usize; 3] = match mode {
            ColorMode::Mono => [0, 0, 0],
            ColorMode::RGB => [0, 1, 2],
            ColorMode::BGR => [2, 1, 0],
            other => return Err(PulseError::UnsupportedColorMode(other.to_string())),
        };

        let raw = self.frame_raw(index)?;
        let h = self.header.height as usize;
        let w = self.header.width as usize;
        let bps = self.header.bytes_per_pixel_plane();
        let planes = self.header.planes_per_pixel();
        let max_val = ((1u32 << self.header.pixel_depth.clamp(1, 16)) - 1) as f32;
        let little_endian = self.header.little_endian;

        let data = Array3::from_shape_fn((h, w, COLOR_CHANNEL_COUNT), |(row, col, ch)| {
            let idx = ((row * w + col) * planes + channel_map[ch]) * bps;
            if bps == 1 {
                raw[idx]
            } else {
                let pair = [raw[idx], raw[idx + 1]];
                let v = if little_endian {
                    u16::from_le_bytes(pair)
                } else {
                    u16::from_be_bytes(pair)
                };
                (v as f32 / max_val * 255.0).round().clamp(0.0, 255.0) as u8
            }
        });

        Ok(Frame::new(data).with_metadata(FrameMetadata {
            frame_index: index,
            timestamp_us: self.read_timestamp(index),
        }))
    }

    pub fn has_timestamps(&self) -> bool {
        self.frame_count() > 0 && self.read_timestamp(self.frame_count() - 1).is_some()
    }

    /// Per-frame timestamp from the optional trailer, in microseconds.
    fn read_timestamp(&self, index: usize) -> Option<u64> {
        let ts_offset = self.data_end + index * 8;
        if ts_offset + 8 <= self.mmap.len() {
            let bytes = &self.mmap[ts_offset..ts_offset + 8];
            let ticks = u64::from_le_bytes(bytes.try_into().ok()?);
            Some(ticks / SER_TICKS_PER_MICROSECOND)
        } else {
            None
        }
    }

    /// Build SourceInfo from the header.
    pub fn source_info(&self, path: &Path) -> SourceInfo {
        SourceInfo {
            filename: path.to_path_buf(),
            total_frames: self.frame_count(),
            width: self.header.width,
            height: self.header.height,
            bit_depth: self.header.pixel_depth as u8,
            color_mode: self.header.color_mode(),
            observer: non_empty(&self.header.observer),
            telescope: non_empty(&self.header.telescope),
            instrument: non_empty(&self.header.instrument),
            has_timestamps: self.has_timestamps(),
        }
    }

    /// Iterator over all frames.
    pub fn frames(&self) -> impl Iterator<Item = Result<Frame>> + '_ {
        (0..self.frame_count()).map(move |i| self.read_frame(i))
    }
}

fn header_field(name: &str, value: usize) -> Result<u32> {
    i32::try_from(value).map(|v| v as u32).map_err(|_| {
        PulseError::InvalidSer(format!("{} {} does not fit a SER header", name, value))
    })
}

fn parse_header(buf: &[u8]) -> Result<SerHeader> {
    let mut cursor = std::io::Cursor::new(&buf[14..]); // skip magic

    let _lu_id = cursor.read_i32::<LittleEndian>()?;
    let color_id = cursor.read_i32::<LittleEndian>()?;
    let le_flag = cursor.read_i32::<LittleEndian>()?;
    let width = cursor.read_i32::<LittleEndian>()?;
    let height = cursor.read_i32::<LittleEndian>()?;
    let pixel_depth = cursor.read_i32::<LittleEndian>()?;
    let frame_count = cursor.read_i32::<LittleEndian>()?;

    let observer = read_fixed_string(&buf[42..82]);
    let instrument = read_fixed_string(&buf[82..122]);
    let telescope = read_fixed_string(&buf[122..162]);

    let mut cursor = std::io::Cursor::new(&buf[162..]);
    let date_time = cursor.read_u64::<LittleEndian>()?;
    let date_time_utc = cursor.read_u64::<LittleEndian>()?;

    if width <= 0 || height <= 0 {
        return Err(PulseError::InvalidSer(format!(
            "Invalid frame dimensions {}x{}",
            width, height
        )));
    }
    if !(1..=16).contains(&pixel_depth) {
        return Err(PulseError::InvalidSer(format!(
            "Unsupported pixel depth {}",
            pixel_depth
        )));
    }
    if frame_count < 0 {
        return Err(PulseError::InvalidSer(format!(
            "Negative frame count {}",
            frame_count
        )));
    }

    // Treat 0 as little-endian, as most capture software writes it.
    let little_endian = le_flag != 1;

    Ok(SerHeader {
        color_id,
        little_endian,
        width: width as u32,
        height: height as u32,
        pixel_depth: pixel_depth as u32,
        frame_count: frame_count as u32,
        observer,
        instrument,
        telescope,
        date_time,
        date_time_utc,
    })
}

fn read_fixed_string(buf: &[u8]) -> String {
    String::from_utf8_lossy(buf)
        .trim_end_matches('\0')
        .trim()
        .to_string()
}

fn non_empty(s: &str) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s.to_string())
    }
}
