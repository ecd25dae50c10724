use std::path::Path;

use tracing::{debug, info};

use crate::error::{PulseError, Result};
use crate::frame::Frame;
use crate::io::image_io::save_png;
use crate::io::ser::{SerHeader, SerReader};
use crate::io::ser_writer::SerWriter;
use crate::monitor::MultiRoiMonitor;
use crate::roi::crop_and_resize;

use super::config::SessionConfig;
use super::types::{BpmSample, NoOpReporter, ProgressReporter, SessionReport, SessionStage};

/// Process a SER video end to end.
pub fn run_session(config: &SessionConfig) -> Result<SessionReport> {
    run_session_reported(config, &NoOpReporter)
}

/// Process a SER video end to end, reporting progress.
///
/// Each frame is cropped into the configured regions, fed to one estimator
/// per region, and the magnified crops are optionally written out.
pub fn run_session_reported(
    config: &SessionConfig,
    reporter: &dyn ProgressReporter,
) -> Result<SessionReport> {
    config.validate()?;

    reporter.begin_stage(SessionStage::Reading, None);
    let reader = SerReader::open(&config.input)?;
    let total = reader.frame_count();
    if total == 0 {
        return Err(PulseError::EmptySequence);
    }
    info!(
        total_frames = total,
        width = reader.header.width,
        height = reader.header.height,
        color_mode = %reader.header.color_mode(),
        "Reading SER video"
    );
    reporter.finish_stage();

    let mut monitor = MultiRoiMonitor::new(&config.regions, &config.estimator)?;
    let mut writers = match &config.output_dir {
        Some(dir) => open_region_writers(dir, config, total)?,
        None => Vec::new(),
    };

    let stride = config.estimator.bpm_calculation_stride;
    let mut timeline = Vec::with_capacity(total / stride + 1);
    let mut last_frames: Vec<Frame> = Vec::new();

    reporter.begin_stage(SessionStage::Estimating, Some(total));
    for index in 0..total {
        let frame = reader.read_frame(index)?;
        let crops = config
            .regions
            .iter()
            .map(|region| crop_and_resize(&frame, &region.rect, region.size))
            .collect::<Result<Vec<_>>>()?;

        let update = monitor.update(&crops)?;

        for (writer, region) in writers.iter_mut().zip(&update.regions) {
            writer.write_frame(&region.update.frame)?;
        }

        if index % stride == 0 {
            debug!(frame = index, combined = %update.combined, "BPM recalculated");
            reporter.reading(index, update.combined);
            timeline.push(BpmSample {
                frame_index: index,
                time_s: index as f64 / config.estimator.frame_rate,
                combined: update.combined,
                regions: update
                    .regions
                    .iter()
                    .map(|r| (r.name.clone(), r.update.bpm))
                    .collect(),
            });
        }

        last_frames = update.regions.into_iter().map(|r| r.update.frame).collect();
        reporter.advance(index + 1);
    }
    reporter.finish_stage();

    if let Some(dir) = &config.output_dir {
        reporter.begin_stage(SessionStage::Writing, Some(writers.len()));
        for (i, writer) in writers.into_iter().enumerate() {
            writer.finalize()?;
            reporter.advance(i + 1);
        }
        for (region, frame) in config.regions.iter().zip(&last_frames) {
            save_png(frame, &dir.join(format!("{}.png", region.name)))?;
        }
        reporter.finish_stage();
    }

    let final_reading = monitor.combined();
    let measured_frame_rate = monitor
        .regions()
        .first()
        .and_then(|r| r.estimator.measured_frame_rate());
    let cadence_drift = monitor.regions().iter().any(|r| r.estimator.cadence_drift());
    info!(
        frames = total,
        bpm = %final_reading,
        measured_fps = ?measured_frame_rate,
        cadence_drift,
        "Session complete"
    );

    Ok(SessionReport {
        frames_processed: total,
        timeline,
        final_reading,
        region_readings: monitor.readings(),
        measured_frame_rate,
        cadence_drift,
    })
}

fn open_region_writers(
    dir: &Path,
    config: &SessionConfig,
    total: usize,
) -> Result<Vec<SerWriter>> {
    std::fs::create_dir_all(dir)?;
    config
        .regions
        .iter()
        .map(|region| {
            let header = SerHeader::rgb8_sized(region.size.width, region.size.height, total)?;
            SerWriter::create(&dir.join(format!("{}.ser", region.name)), &header)
        })
        .collect()
}
