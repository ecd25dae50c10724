/// Number of channels in an RGB frame.
pub const COLOR_CHANNEL_COUNT: usize = 3;

/// Binomial 5-tap low-pass kernel [1, 4, 6, 4, 1] / 16, applied separably
/// for Gaussian pyramid down/up sampling.
pub const PYRAMID_KERNEL: [f32; 5] = [1.0 / 16.0, 4.0 / 16.0, 6.0 / 16.0, 4.0 / 16.0, 1.0 / 16.0];

pub const SECONDS_PER_MINUTE: f64 = 60.0;

/// Default assumed capture rate in Hz.
pub const DEFAULT_FRAME_RATE: f64 = 60.0;

/// Default number of pyramid reductions applied before temporal filtering.
pub const DEFAULT_PYRAMID_LEVELS: usize = 3;

/// Default amplification gain for the band-passed signal.
pub const DEFAULT_ALPHA: f32 = 170.0;

/// Default passband lower edge (Hz), 60 BPM.
pub const DEFAULT_MIN_FREQUENCY: f64 = 1.0;

/// Default passband upper edge (Hz), 120 BPM.
pub const DEFAULT_MAX_FREQUENCY: f64 = 2.0;

/// Default temporal window length in frames (2.5 s at 60 fps).
pub const DEFAULT_BUFFER_SIZE: usize = 150;

/// Default number of frames between two BPM recalculations.
pub const DEFAULT_BPM_CALCULATION_STRIDE: usize = 15;

/// Default number of BPM estimates averaged into the reported value.
pub const DEFAULT_BPM_BUFFER_SIZE: usize = 10;

/// Relative deviation between measured and assumed frame interval above
/// which a cadence warning is logged.
pub const CADENCE_TOLERANCE: f64 = 0.25;

/// Number of frame intervals observed before the cadence check kicks in.
pub const CADENCE_MIN_SAMPLES: usize = 30;

/// Combined multi-region BPM is rounded to this many decimals.
pub const COMBINED_BPM_DECIMALS: i32 = 2;

/// Forehead ROI size (width, height) fed to its estimator.
pub const FOREHEAD_ROI_SIZE: (usize, usize) = (100, 40);

/// Cheek ROI size (width, height) fed to its estimator.
pub const CHEEK_ROI_SIZE: (usize, usize) = (40, 25);

/// SER timestamps count 100 ns ticks.
pub const SER_TICKS_PER_MICROSECOND: u64 = 10;
