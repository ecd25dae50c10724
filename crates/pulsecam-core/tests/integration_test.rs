use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use approx::assert_abs_diff_eq;

use pulsecam_core::error::PulseError;
use pulsecam_core::io::image_io::load_image;
use pulsecam_core::io::ser::SerReader;
use pulsecam_core::magnify::BpmReading;
use pulsecam_core::roi::{RoiRect, RoiSize};
use pulsecam_core::session::{
    run_session, run_session_reported, ProgressReporter, RegionConfig, SessionConfig,
    SessionStage,
};
use pulsecam_core::synth::{write_synthetic_ser, SynthParams};

fn synth_video(dir: &std::path::Path, frames: usize) -> PathBuf {
    let path = dir.join("face.ser");
    let params = SynthParams {
        frames,
        ..SynthParams::default()
    };
    write_synthetic_ser(&path, &params).unwrap();
    path
}

#[derive(Default)]
struct RecordingReporter {
    stages: Mutex<Vec<SessionStage>>,
    advanced: AtomicUsize,
    readings: Mutex<Vec<(usize, BpmReading)>>,
}

impl ProgressReporter for RecordingReporter {
    fn begin_stage(&self, stage: SessionStage, _total_items: Option<usize>) {
        self.stages.lock().unwrap().push(stage);
    }

    fn advance(&self, _items_done: usize) {
        self.advanced.fetch_add(1, Ordering::Relaxed);
    }

    fn reading(&self, frame_index: usize, combined: BpmReading) {
        self.readings.lock().unwrap().push((frame_index, combined));
    }
}

#[test]
fn test_session_recovers_synthetic_heart_rate() {
    let dir = tempfile::tempdir().unwrap();
    let input = synth_video(dir.path(), 300);
    let out_dir = dir.path().join("magnified");

    let mut config = SessionConfig::new(input);
    config.output_dir = Some(out_dir.clone());
    let report = run_session(&config).unwrap();

    assert_eq!(report.frames_processed, 300);
    assert_eq!(report.timeline.len(), 20);
    assert_eq!(report.timeline[0].combined, BpmReading::WarmingUp);
    assert_eq!(report.timeline[3].frame_index, 45);
    assert_abs_diff_eq!(report.timeline[3].time_s, 0.75);
    assert_eq!(report.timeline[3].regions.len(), 3);

    let bpm = report.final_reading.value().expect("ready after 300 frames");
    assert_abs_diff_eq!(bpm, 72.0, epsilon = 24.0);
    assert!(report
        .region_readings
        .iter()
        .all(|(_, r)| r.is_ready()));
    assert!(!report.ready_values().is_empty());
    assert_abs_diff_eq!(report.measured_frame_rate.unwrap(), 60.0, epsilon = 0.1);
    assert!(!report.cadence_drift);

    for region in &config.regions {
        let ser = SerReader::open(&out_dir.join(format!("{}.ser", region.name))).unwrap();
        assert_eq!(ser.frame_count(), 300);
        assert_eq!(ser.header.width as usize, region.size.width);
        assert_eq!(ser.header.height as usize, region.size.height);
        assert!(ser.has_timestamps());

        let png = load_image(&out_dir.join(format!("{}.png", region.name))).unwrap();
        assert_eq!(png.width(), region.size.width);
        assert_eq!(png.height(), region.size.height);
    }
}

#[test]
fn test_session_without_output_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let input = synth_video(dir.path(), 20);

    let report = run_session(&SessionConfig::new(input)).unwrap();
    assert_eq!(report.frames_processed, 20);
    assert_eq!(report.final_reading, BpmReading::WarmingUp);
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_session_reports_progress() {
    let dir = tempfile::tempdir().unwrap();
    let input = synth_video(dir.path(), 40);

    let mut config = SessionConfig::new(input);
    config.output_dir = Some(dir.path().join("out"));
    let reporter = RecordingReporter::default();
    run_session_reported(&config, &reporter).unwrap();

    assert_eq!(
        *reporter.stages.lock().unwrap(),
        vec![
            SessionStage::Reading,
            SessionStage::Estimating,
            SessionStage::Writing
        ]
    );
    // 40 frames plus 3 finalized writers
    assert_eq!(reporter.advanced.load(Ordering::Relaxed), 43);
    let frames: Vec<usize> = reporter
        .readings
        .lock()
        .unwrap()
        .iter()
        .map(|(i, _)| *i)
        .collect();
    assert_eq!(frames, vec![0, 15, 30]);
}

#[test]
fn test_session_flags_cadence_drift() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("slow.ser");
    let params = SynthParams {
        frames: 40,
        frame_rate: 30.0,
        ..SynthParams::default()
    };
    write_synthetic_ser(&input, &params).unwrap();

    // Estimators keep assuming 60 fps
    let report = run_session(&SessionConfig::new(input)).unwrap();
    assert!(report.cadence_drift);
    assert_abs_diff_eq!(report.measured_frame_rate.unwrap(), 30.0, epsilon = 0.1);
}

#[test]
fn test_empty_video() {
    let dir = tempfile::tempdir().unwrap();
    let input = synth_video(dir.path(), 0);
    assert!(matches!(
        run_session(&SessionConfig::new(input)),
        Err(PulseError::EmptySequence)
    ));
}

#[test]
fn test_region_outside_frame() {
    let dir = tempfile::tempdir().unwrap();
    let input = synth_video(dir.path(), 5);

    let mut config = SessionConfig::new(input);
    config.regions = vec![RegionConfig::new(
        "nowhere",
        RoiRect::new(1000, 1000, 10, 10),
        RoiSize::new(10, 10),
    )];
    assert!(matches!(run_session(&config), Err(PulseError::InvalidRoi(_))));
}

#[test]
fn test_missing_input() {
    let config = SessionConfig::new(PathBuf::from("/nonexistent/face.ser"));
    assert!(matches!(run_session(&config), Err(PulseError::Io(_))));
}
