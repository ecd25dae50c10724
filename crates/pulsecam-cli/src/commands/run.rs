use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use pulsecam_core::magnify::BpmReading;
use pulsecam_core::roi::{RoiRect, RoiSize};
use pulsecam_core::session::{
    run_session_reported, ProgressReporter, RegionConfig, SessionConfig, SessionStage,
};
use tracing::debug;

use crate::summary::{print_report, print_session_summary};

#[derive(Args)]
pub struct RunArgs {
    /// Input SER file
    pub file: PathBuf,

    /// Session config file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Region as name:x,y,w,h or name:x,y,w,h:WxH (repeatable; replaces the defaults)
    #[arg(long = "region")]
    pub regions: Vec<String>,

    /// Directory for magnified region videos
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// Assumed capture rate in Hz
    #[arg(long)]
    pub frame_rate: Option<f64>,

    /// Recalculate the BPM every N frames
    #[arg(long)]
    pub stride: Option<usize>,

    /// Passband lower edge in Hz
    #[arg(long)]
    pub min_hz: Option<f64>,

    /// Passband upper edge in Hz
    #[arg(long)]
    pub max_hz: Option<f64>,

    /// Amplification gain
    #[arg(long)]
    pub alpha: Option<f32>,
}

/// Drives an indicatif bar from session progress.
struct BarReporter {
    bar: ProgressBar,
}

impl ProgressReporter for BarReporter {
    fn begin_stage(&self, stage: SessionStage, total_items: Option<usize>) {
        self.bar.set_message(stage.to_string());
        self.bar.set_length(total_items.unwrap_or(1) as u64);
        self.bar.set_position(0);
    }

    fn advance(&self, items_done: usize) {
        self.bar.set_position(items_done as u64);
    }

    fn reading(&self, _frame_index: usize, combined: BpmReading) {
        self.bar.set_message(format!("{}", combined));
    }

    fn finish_stage(&self) {
        if let Some(len) = self.bar.length() {
            self.bar.set_position(len);
        }
    }
}

pub fn run(args: &RunArgs) -> Result<()> {
    let config = build_config(args)?;
    debug!(?config, "Session config");
    print_session_summary(&config);

    let bar = ProgressBar::new(1);
    bar.set_style(
        ProgressStyle::default_bar()
            .template("{msg:20} [{bar:40}] {pos}/{len}")?
            .progress_chars("=> "),
    );
    let reporter = BarReporter { bar };

    let report = run_session_reported(&config, &reporter)?;
    reporter.bar.finish_with_message("Done");

    print_report(&report);
    if let Some(ref dir) = config.output_dir {
        println!("Magnified regions saved to {}", dir.display());
    }

    Ok(())
}

fn build_config(args: &RunArgs) -> Result<SessionConfig> {
    let mut config = if let Some(ref config_path) = args.config {
        let contents = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config {}", config_path.display()))?;
        let mut config: SessionConfig =
            toml::from_str(&contents).context("Invalid session config")?;
        config.input = args.file.clone();
        config
    } else {
        SessionConfig::new(args.file.clone())
    };

    if !args.regions.is_empty() {
        config.regions = args
            .regions
            .iter()
            .map(String::as_str)
            .map(parse_region)
            .collect::<Result<Vec<_>>>()?;
    }
    if args.output_dir.is_some() {
        config.output_dir = args.output_dir.clone();
    }
    if let Some(rate) = args.frame_rate {
        config.estimator.frame_rate = rate;
    }
    if let Some(stride) = args.stride {
        config.estimator.bpm_calculation_stride = stride;
    }
    if let Some(min_hz) = args.min_hz {
        config.estimator.min_frequency = min_hz;
    }
    if let Some(max_hz) = args.max_hz {
        config.estimator.max_frequency = max_hz;
    }
    if let Some(alpha) = args.alpha {
        config.estimator.alpha = alpha;
    }

    config.validate()?;
    Ok(config)
}

/// Parse `name:x,y,w,h` with an optional `:WxH` estimator input size. Without
/// it the crop is fed at its own size.
fn parse_region(text: &str) -> Result<RegionConfig> {
    let parts: Vec<&str> = text.split(':').collect();
    if parts.len() < 2 || parts.len() > 3 {
        bail!("Region '{}' must look like name:x,y,w,h[:WxH]", text);
    }

    let name = parts[0].trim();
    let coords: Vec<i64> = parts[1]
        .split(',')
        .map(|v| v.trim().parse::<i64>())
        .collect::<std::result::Result<_, _>>()
        .with_context(|| format!("Invalid coordinates in region '{}'", text))?;
    if coords.len() != 4 || coords[2] <= 0 || coords[3] <= 0 {
        bail!("Region '{}' needs x,y and a positive width,height", text);
    }
    let width = u32::try_from(coords[2])
        .with_context(|| format!("Width {} out of range in region '{}'", coords[2], text))?;
    let height = u32::try_from(coords[3])
        .with_context(|| format!("Height {} out of range in region '{}'", coords[3], text))?;
    let rect = RoiRect::new(coords[0], coords[1], width, height);

    let size = match parts.get(2) {
        Some(size) => {
            let (w, h) = size
                .split_once(['x', 'X'])
                .with_context(|| format!("Invalid size '{}' in region '{}'", size, text))?;
            RoiSize::new(
                w.trim().parse().context("Invalid region width")?,
                h.trim().parse().context("Invalid region height")?,
            )
        }
        None => RoiSize::new(rect.width as usize, rect.height as usize),
    };

    Ok(RegionConfig::new(name, rect, size))
}
