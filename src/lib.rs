// Library interface for sleeprs
// The binary and the integration tests both build on these modules

pub mod chronotype;
pub mod circadian;
pub mod config;
pub mod cycles;
pub mod deficit;
pub mod error;
pub mod export;
pub mod logging;
pub mod models;
pub mod pacing;
pub mod schedule;

// Re-export commonly used types for convenience
pub use models::*;
pub use chronotype::{adjust_time_labels, chronotype_advice, personalized_recommendation};
pub use circadian::{CircadianCalculator, DerivedLandmarks, NapSlot};
pub use cycles::{Candidate, CycleCalculator, SleepStageEstimate};
pub use deficit::{DeficitAssessment, DeficitClassifier};
pub use schedule::{
    compute_from_selection, compute_schedule, DerivedResult, ScheduleRequest, ScheduleResult,
    ScheduleSession,
};
pub use pacing::PacedScheduler;
pub use export::{ExportError, ExportFormat};
pub use config::AppConfig;
pub use error::{ErrorSeverity, Result, SleepCalcError};
pub use logging::{LogConfig, LogFormat, LogLevel};
