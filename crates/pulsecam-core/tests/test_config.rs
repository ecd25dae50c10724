use std::path::PathBuf;

use approx::assert_abs_diff_eq;

use pulsecam_core::error::PulseError;
use pulsecam_core::magnify::EstimatorConfig;
use pulsecam_core::roi::{FacialAnchors, Point, RoiRect, RoiSize};
use pulsecam_core::session::{default_regions, RegionConfig, SessionConfig, SessionStage};

#[test]
fn test_estimator_defaults() {
    let config = EstimatorConfig::default();
    assert_eq!(config.frame_rate, 60.0);
    assert_eq!(config.pyramid_levels, 3);
    assert_eq!(config.alpha, 170.0);
    assert_eq!(config.min_frequency, 1.0);
    assert_eq!(config.max_frequency, 2.0);
    assert_eq!(config.buffer_size, 150);
    assert_eq!(config.bpm_calculation_stride, 15);
    assert_eq!(config.bpm_buffer_size, 10);
    assert_eq!(config.warm_up_frames(), 150);
    assert_abs_diff_eq!(config.window_seconds(), 2.5);
    assert!(config.validate().is_ok());
}

#[test]
fn test_estimator_partial_json() {
    let config: EstimatorConfig =
        serde_json::from_str(r#"{"frame_rate": 30.0, "alpha": 50.0}"#).unwrap();
    assert_eq!(config.frame_rate, 30.0);
    assert_eq!(config.alpha, 50.0);
    assert_eq!(config.buffer_size, 150);
    assert_eq!(config.bpm_buffer_size, 10);
}

#[test]
fn test_estimator_validation() {
    let bad = [
        EstimatorConfig {
            frame_rate: 0.0,
            ..EstimatorConfig::default()
        },
        EstimatorConfig {
            frame_rate: f64::NAN,
            ..EstimatorConfig::default()
        },
        EstimatorConfig {
            buffer_size: 0,
            ..EstimatorConfig::default()
        },
        EstimatorConfig {
            bpm_buffer_size: 0,
            ..EstimatorConfig::default()
        },
        EstimatorConfig {
            max_frequency: f64::INFINITY,
            ..EstimatorConfig::default()
        },
    ];
    for config in &bad {
        assert!(
            matches!(config.validate(), Err(PulseError::InvalidConfig(_))),
            "{:?}",
            config
        );
    }

    // An inverted passband is legal; it just amplifies nothing
    let inverted = EstimatorConfig {
        min_frequency: 3.0,
        max_frequency: 1.0,
        ..EstimatorConfig::default()
    };
    assert!(inverted.validate().is_ok());
}

#[test]
fn test_estimator_display() {
    assert_eq!(
        EstimatorConfig::default().to_string(),
        "1.00-2.00 Hz @ 60 fps, window 150, levels 3, alpha 170"
    );
}

#[test]
fn test_session_config_defaults_from_json() {
    let config: SessionConfig = serde_json::from_str(r#"{"input": "face.ser"}"#).unwrap();
    assert_eq!(config.input, PathBuf::from("face.ser"));
    assert_eq!(config.output_dir, None);
    assert_eq!(config.estimator, EstimatorConfig::default());
    assert_eq!(config.regions, default_regions());
    assert!(config.validate().is_ok());
}

#[test]
fn test_session_config_json_round_trip() {
    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.output_dir = Some(PathBuf::from("out"));
    config.estimator.bpm_calculation_stride = 60;
    config.regions.truncate(1);

    let json = serde_json::to_string(&config).unwrap();
    let back: SessionConfig = serde_json::from_str(&json).unwrap();
    assert_eq!(back, config);
}

#[test]
fn test_session_config_validation() {
    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.regions.clear();
    assert!(matches!(config.validate(), Err(PulseError::InvalidConfig(_))));

    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.regions[2].name = "forehead".into();
    assert!(matches!(config.validate(), Err(PulseError::InvalidConfig(_))));

    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.regions[0].size = RoiSize::new(0, 40);
    assert!(matches!(config.validate(), Err(PulseError::InvalidRoi(_))));

    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.regions[1].rect = RoiRect::new(0, 0, 0, 10);
    assert!(matches!(config.validate(), Err(PulseError::InvalidRoi(_))));

    let mut config = SessionConfig::new(PathBuf::from("in.ser"));
    config.estimator.bpm_calculation_stride = 0;
    assert!(config.validate().is_err());
}

#[test]
fn test_regions_from_anchors() {
    let anchors = FacialAnchors {
        left_brow: Point::new(100, 100),
        right_brow: Point::new(200, 100),
        left_eye: Point::new(110, 130),
        right_eye: Point::new(190, 130),
    };
    let regions = RegionConfig::from_anchors(&anchors).unwrap();
    assert_eq!(regions.len(), 3);
    assert_eq!(regions[0].name, "forehead");
    assert_eq!(regions[0].size, RoiSize::forehead());
    assert_eq!(regions[1].rect, RoiRect::new(90, 155, 40, 25));
    assert_eq!(regions[2].size, RoiSize::cheek());
}

#[test]
fn test_display() {
    assert_eq!(
        default_regions()[0].to_string(),
        "forehead @ 110,60 100x40 -> 100x40"
    );
    assert_eq!(SessionStage::Estimating.to_string(), "Estimating pulse");
}
