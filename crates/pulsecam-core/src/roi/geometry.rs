use serde::{Deserialize, Serialize};

use crate::consts::{CHEEK_ROI_SIZE, FOREHEAD_ROI_SIZE};
use crate::error::{PulseError, Result};

/// Index of the inner left eyebrow point in the 68-point landmark layout.
pub const LANDMARK_LEFT_BROW: usize = 19;
/// Index of the inner right eyebrow point.
pub const LANDMARK_RIGHT_BROW: usize = 24;
/// Index of the lower left eyelid point.
pub const LANDMARK_LEFT_EYE: usize = 41;
/// Index of the lower right eyelid point.
pub const LANDMARK_RIGHT_EYE: usize = 46;

const FOREHEAD_TOP_OFFSET: i64 = 40;
const FOREHEAD_BOTTOM_OFFSET: i64 = 10;
const CHEEK_HALF_WIDTH: i64 = 20;
const CHEEK_TOP_OFFSET: i64 = 25;
const CHEEK_BOTTOM_OFFSET: i64 = 50;

/// A point in image coordinates, as returned by a landmark detector.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// A rectangle in image coordinates. May extend past the image edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl RoiRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two opposite corners, given in any order.
    ///
    /// Fails with `InvalidRoi` when a side is longer than `u32::MAX`.
    pub fn from_corners(x1: i64, y1: i64, x2: i64, y2: i64) -> Result<Self> {
        let side = |a: i64, b: i64| {
            u32::try_from(a.abs_diff(b)).map_err(|_| {
                PulseError::InvalidRoi(format!(
                    "Corners ({}, {}) and ({}, {}) span more than {} pixels",
                    x1,
                    y1,
                    x2,
                    y2,
                    u32::MAX
                ))
            })
        };
        Ok(Self {
            x: x1.min(x2),
            y: y1.min(y2),
            width: side(x1, x2)?,
            height: side(y1, y2)?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Intersection with an image of the given size.
    ///
    /// Returns `(x, y, width, height)` in pixels, or `InvalidRoi` when the
    /// rectangle does not overlap the image.
    pub fn clipped(
        &self,
        image_width: usize,
        image_height: usize,
    ) -> Result<(usize, usize, usize, usize)> {
        let x0 = self.x.max(0);
        let y0 = self.y.max(0);
        let x1 = self
            .x
            .saturating_add(self.width as i64)
            .min(image_width as i64);
        let y1 = self
            .y
            .saturating_add(self.height as i64)
            .min(image_height as i64);

        if x1 <= x0 || y1 <= y0 {
            return Err(PulseError::InvalidRoi(format!(
                "Region {} lies outside the {}x{} image",
                self, image_width, image_height
            )));
        }

        Ok((
            x0 as usize,
            y0 as usize,
            (x1 - x0) as usize,
            (y1 - y0) as usize,
        ))
    }
}

impl std::fmt::Display for RoiRect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{},{} {}x{}", self.x, self.y, self.width, self.height)
    }
}

/// Fixed pixel size an ROI crop is resampled to before estimation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoiSize {
    pub width: usize,
    pub height: usize,
}

impl RoiSize {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    pub fn forehead() -> Self {
        Self::new(FOREHEAD_ROI_SIZE.0, FOREHEAD_ROI_SIZE.1)
    }

    pub fn cheek() -> Self {
        Self::new(CHEEK_ROI_SIZE.0, CHEEK_ROI_SIZE.1)
    }
}

impl std::fmt::Display for RoiSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The four landmarks the skin regions are anchored on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FacialAnchors {
    pub left_brow: Point,
    pub right_brow: Point,
    pub left_eye: Point,
    pub right_eye: Point,
}

/// Forehead and cheek rectangles of one face.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FaceRegions {
    pub forehead: RoiRect,
    pub left_cheek: RoiRect,
    pub right_cheek: RoiRect,
}

impl FacialAnchors {
    /// Pick the anchors out of a full 68-point landmark set.
    pub fn from_landmarks(points: &[Point]) -> Result<Self> {
        let needed = LANDMARK_RIGHT_EYE + 1;
        if points.len() < needed {
            return Err(PulseError::InvalidRoi(format!(
                "Expected at least {} landmarks, got {}",
                needed,
                points.len()
            )));
        }
        Ok(Self {
            left_brow: points[LANDMARK_LEFT_BROW],
            right_brow: points[LANDMARK_RIGHT_BROW],
            left_eye: points[LANDMARK_LEFT_EYE],
            right_eye: points[LANDMARK_RIGHT_EYE],
        })
    }

    /// Forehead band above the brows, cheek patches below the eyes.
    pub fn regions(&self) -> Result<FaceRegions> {
        let forehead = RoiRect::from_corners(
            self.left_brow.x,
            self.left_brow.y - FOREHEAD_TOP_OFFSET,
            self.right_brow.x,
            self.right_brow.y - FOREHEAD_BOTTOM_OFFSET,
        )?;
        Ok(FaceRegions {
            forehead,
            left_cheek: cheek_below(self.left_eye)?,
            right_cheek: cheek_below(self.right_eye)?,
        })
    }
}

fn cheek_below(eye: Point) -> Result<RoiRect> {
    RoiRect::from_corners(
        eye.x - CHEEK_HALF_WIDTH,
        eye.y + CHEEK_TOP_OFFSET,
        eye.x + CHEEK_HALF_WIDTH,
        eye.y + CHEEK_BOTTOM_OFFSET,
    )
}
