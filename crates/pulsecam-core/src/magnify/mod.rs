//! Eulerian color magnification and temporal-frequency pulse estimation.
//!
//! A [`PulseEstimator`] owns everything needed for one region of interest:
//! the pyramid shape, the temporal ring buffer, the frequency table and mask,
//! and the BPM smoothing ring. Estimators share no state and can be driven
//! from different threads.

pub mod bpm;
pub mod cadence;
pub mod estimator;
pub mod pyramid;
pub mod ring_buffer;
pub mod spectrum;

pub use bpm::{BpmReading, BpmSmoother};
pub use estimator::{EstimatorConfig, EstimatorState, PulseEstimator, PulseUpdate};
