//! Skin regions of interest: landmark-anchored geometry and the crop/resize
//! step that turns a video frame into a fixed-size estimator input.

pub mod geometry;
pub mod resample;

pub use geometry::{FaceRegions, FacialAnchors, Point, RoiRect, RoiSize};
pub use resample::crop_and_resize;
