use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::consts::SECONDS_PER_MINUTE;
use crate::error::{PulseError, Result};

use super::spectrum::{BandpassMask, FrequencyBins};

/// Heart-rate output of an estimator.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum BpmReading {
    /// Not enough recalculations have been collected yet.
    WarmingUp,
    /// Mean of the smoothing ring, in beats per minute.
    Ready(f64),
}

impl BpmReading {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::WarmingUp => None,
            Self::Ready(bpm) => Some(*bpm),
        }
    }
}

impl std::fmt::Display for BpmReading {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WarmingUp => write!(f, "warming up"),
            Self::Ready(bpm) => write!(f, "{:.1} BPM", bpm),
        }
    }
}

/// Index of the passband bin with the greatest mean.
///
/// Ties resolve to the lowest index. With an empty passband bin 0 is
/// returned.
pub fn dominant_bin(bin_means: &[f64], mask: &BandpassMask) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for k in mask.passband() {
        let Some(&value) = bin_means.get(k) else {
            continue;
        };
        match best {
            Some((_, best_value)) if value <= best_value => {}
            _ => best = Some((k, value)),
        }
    }
    best.map(|(k, _)| k).unwrap_or(0)
}

/// Beats per minute for a bin of the frequency table.
pub fn bin_to_bpm(bins: &FrequencyBins, bin: usize) -> f64 {
    SECONDS_PER_MINUTE * bins.hz(bin)
}

/// Ring of recent point estimates whose mean is the reported BPM.
#[derive(Clone, Debug)]
pub struct BpmSmoother {
    values: Vec<f64>,
    cursor: usize,
    recalculations: usize,
}

impl BpmSmoother {
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(PulseError::InvalidConfig(
                "BPM smoothing capacity must be > 0".into(),
            ));
        }
        Ok(Self {
            values: vec![0.0; capacity],
            cursor: 0,
            recalculations: 0,
        })
    }

    /// Store a new point estimate.
    pub fn record(&mut self, bpm: f64) {
        self.values[self.cursor] = bpm;
        self.cursor = (self.cursor + 1) % self.values.len();
        self.recalculations += 1;
        debug!(
            bpm,
            recalculations = self.recalculations,
            ready = self.is_ready(),
            "BPM point estimate"
        );
    }

    /// Ready once strictly more estimates than the ring holds were recorded.
    pub fn is_ready(&self) -> bool {
        self.recalculations > self.values.len()
    }

    pub fn reading(&self) -> BpmReading {
        if self.is_ready() {
            BpmReading::Ready(self.values.iter().sum::<f64>() / self.values.len() as f64)
        } else {
            BpmReading::WarmingUp
        }
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn recalculations(&self) -> usize {
        self.recalculations
    }

    pub fn capacity(&self) -> usize {
        self.values.len()
    }

    /// Stored point estimates in slot order.
    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
