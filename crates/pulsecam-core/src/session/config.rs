use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::error::{PulseError, Result};
use crate::magnify::EstimatorConfig;
use crate::roi::{FacialAnchors, RoiRect, RoiSize};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SessionConfig {
    pub input: PathBuf,
    /// Directory receiving one magnified SER stream and a last-frame PNG per
    /// region. Nothing is written when unset.
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
    #[serde(default)]
    pub estimator: EstimatorConfig,
    #[serde(default = "default_regions")]
    pub regions: Vec<RegionConfig>,
}

impl SessionConfig {
    pub fn new(input: PathBuf) -> Self {
        Self {
            input,
            output_dir: None,
            estimator: EstimatorConfig::default(),
            regions: default_regions(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.estimator.validate()?;
        if self.regions.is_empty() {
            return Err(PulseError::InvalidConfig(
                "At least one region is required".into(),
            ));
        }
        for region in &self.regions {
            region.validate()?;
        }
        for (i, region) in self.regions.iter().enumerate() {
            if self.regions[..i].iter().any(|r| r.name == region.name) {
                return Err(PulseError::InvalidConfig(format!(
                    "Duplicate region name '{}'",
                    region.name
                )));
            }
        }
        Ok(())
    }
}

/// A named skin region: where to crop it and what size to feed the
/// estimator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegionConfig {
    pub name: String,
    pub rect: RoiRect,
    pub size: RoiSize,
}

impl RegionConfig {
    pub fn new(name: impl Into<String>, rect: RoiRect, size: RoiSize) -> Self {
        Self {
            name: name.into(),
            rect,
            size,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(PulseError::InvalidConfig("Region name is empty".into()));
        }
        if self.rect.is_empty() {
            return Err(PulseError::InvalidRoi(format!(
                "Region '{}' has an empty rectangle",
                self.name
            )));
        }
        if self.size.width == 0 || self.size.height == 0 {
            return Err(PulseError::InvalidRoi(format!(
                "Region '{}' has a zero output size",
                self.name
            )));
        }
        Ok(())
    }

    /// Forehead and both cheeks placed from facial landmarks.
    pub fn from_anchors(anchors: &FacialAnchors) -> Result<Vec<RegionConfig>> {
        let regions = anchors.regions()?;
        Ok(vec![
            Self::new("forehead", regions.forehead, RoiSize::forehead()),
            Self::new("left_cheek", regions.left_cheek, RoiSize::cheek()),
            Self::new("right_cheek", regions.right_cheek, RoiSize::cheek()),
        ])
    }
}

impl std::fmt::Display for RegionConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} @ {} -> {}", self.name, self.rect, self.size)
    }
}

/// Forehead and cheek regions for a face centered in a 320x240 frame.
pub fn default_regions() -> Vec<RegionConfig> {
    vec![
        RegionConfig::new("forehead", RoiRect::new(110, 60, 100, 40), RoiSize::forehead()),
        RegionConfig::new("left_cheek", RoiRect::new(90, 140, 40, 25), RoiSize::cheek()),
        RegionConfig::new("right_cheek", RoiRect::new(190, 140, 40, 25), RoiSize::cheek()),
    ]
}
