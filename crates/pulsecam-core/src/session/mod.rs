pub mod config;
mod runner;
mod types;

pub use config::{default_regions, RegionConfig, SessionConfig};
pub use runner::{run_session, run_session_reported};
pub use types::{BpmSample, NoOpReporter, ProgressReporter, SessionReport, SessionStage};
