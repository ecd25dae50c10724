//! Several independent pulse estimators driven in lock-step, one per skin
//! region, with a combined heart-rate reading.

use rayon::prelude::*;

use crate::consts::COMBINED_BPM_DECIMALS;
use crate::error::{PulseError, Result};
use crate::frame::Frame;
use crate::magnify::{BpmReading, EstimatorConfig, PulseEstimator, PulseUpdate};
use crate::roi::RoiSize;
use crate::session::config::RegionConfig;

/// One named region and its estimator.
#[derive(Debug)]
pub struct RegionEstimator {
    pub name: String,
    pub estimator: PulseEstimator,
}

/// Per-region output of a monitor update.
#[derive(Clone, Debug)]
pub struct RegionUpdate {
    pub name: String,
    pub update: PulseUpdate,
}

#[derive(Clone, Debug)]
pub struct MonitorUpdate {
    pub regions: Vec<RegionUpdate>,
    /// Mean of all region readings once every region is ready.
    pub combined: BpmReading,
}

/// Independent estimators for a fixed set of regions.
#[derive(Debug)]
pub struct MultiRoiMonitor {
    regions: Vec<RegionEstimator>,
}

impl MultiRoiMonitor {
    pub fn new(regions: &[RegionConfig], config: &EstimatorConfig) -> Result<Self> {
        let sized: Vec<(String, RoiSize)> = regions
            .iter()
            .map(|r| (r.name.clone(), r.size))
            .collect();
        Self::from_sizes(&sized, config)
    }

    /// Forehead plus left and right cheek at their default ROI sizes.
    pub fn face(config: &EstimatorConfig) -> Result<Self> {
        Self::from_sizes(
            &[
                ("forehead".to_string(), RoiSize::forehead()),
                ("left_cheek".to_string(), RoiSize::cheek()),
                ("right_cheek".to_string(), RoiSize::cheek()),
            ],
            config,
        )
    }

    pub fn from_sizes(regions: &[(String, RoiSize)], config: &EstimatorConfig) -> Result<Self> {
        if regions.is_empty() {
            return Err(PulseError::InvalidConfig(
                "At least one region is required".into(),
            ));
        }
        let regions = regions
            .iter()
            .map(|(name, size)| {
                Ok(RegionEstimator {
                    name: name.clone(),
                    estimator: PulseEstimator::new(size.width, size.height, config.clone())?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { regions })
    }

    /// Feed one frame per region, in region order. Regions are updated in
    /// parallel; they share no state.
    pub fn update(&mut self, frames: &[Frame]) -> Result<MonitorUpdate> {
        if frames.len() != self.regions.len() {
            return Err(PulseError::RegionCountMismatch {
                expected: self.regions.len(),
                actual: frames.len(),
            });
        }

        let regions = self
            .regions
            .par_iter_mut()
            .zip(frames.par_iter())
            .map(|(region, frame)| {
                region.estimator.update(frame).map(|update| RegionUpdate {
                    name: region.name.clone(),
                    update,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let readings: Vec<BpmReading> = regions.iter().map(|r| r.update.bpm).collect();
        Ok(MonitorUpdate {
            combined: combine_readings(&readings),
            regions,
        })
    }

    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    pub fn regions(&self) -> &[RegionEstimator] {
        &self.regions
    }

    /// Current readings without feeding frames, in region order.
    pub fn readings(&self) -> Vec<(String, BpmReading)> {
        self.regions
            .iter()
            .map(|r| (r.name.clone(), r.estimator.reading()))
            .collect()
    }

    pub fn combined(&self) -> BpmReading {
        let readings: Vec<BpmReading> = self
            .regions
            .iter()
            .map(|r| r.estimator.reading())
            .collect();
        combine_readings(&readings)
    }
}

/// Mean of the readings rounded to two decimals, or `WarmingUp` while any
/// of them is still warming up.
pub fn combine_readings(readings: &[BpmReading]) -> BpmReading {
    if readings.is_empty() {
        return BpmReading::WarmingUp;
    }
    let mut sum = 0.0;
    for reading in readings {
        match reading {
            BpmReading::Ready(bpm) => sum += bpm,
            BpmReading::WarmingUp => return BpmReading::WarmingUp,
        }
    }
    let scale = 10f64.powi(COMBINED_BPM_DECIMALS);
    BpmReading::Ready((sum / readings.len() as f64 * scale).round() / scale)
}
