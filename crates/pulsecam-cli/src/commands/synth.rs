use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use pulsecam_core::synth::{write_synthetic_ser, SynthParams};

#[derive(Args)]
pub struct SynthArgs {
    /// Output SER file
    pub output: PathBuf,

    /// Frame width in pixels
    #[arg(long, default_value = "320")]
    pub width: usize,

    /// Frame height in pixels
    #[arg(long, default_value = "240")]
    pub height: usize,

    /// Number of frames
    #[arg(long, default_value = "600")]
    pub frames: usize,

    /// Simulated heart rate
    #[arg(long, default_value = "72")]
    pub bpm: f64,

    /// Peak brightness modulation in 8-bit levels
    #[arg(long, default_value = "3")]
    pub amplitude: f64,

    /// Capture rate in Hz
    #[arg(long, default_value = "60")]
    pub frame_rate: f64,
}

pub fn run(args: &SynthArgs) -> Result<()> {
    let params = SynthParams {
        width: args.width,
        height: args.height,
        frames: args.frames,
        bpm: args.bpm,
        amplitude: args.amplitude,
        frame_rate: args.frame_rate,
        ..Default::default()
    };

    write_synthetic_ser(&args.output, &params)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!(
        "Wrote {} frames of {}x{} at {} fps ({} BPM) to {}",
        params.frames,
        params.width,
        params.height,
        params.frame_rate,
        params.bpm,
        args.output.display()
    );
    Ok(())
}
