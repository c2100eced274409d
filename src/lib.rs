//! Oposiplan - deterministic study planning for oposiciones
//!
//! This library generates a personalized, day-by-day study plan for a
//! teacher-certification exam from three things: the exam date, a weekly
//! availability pattern, and the student's progress so far. It covers:
//! - Capacity modelling (planable minutes, reserve window, buffer status)
//! - Student state with per-unit workload ledgers
//! - A remaining-ratio allocator balancing theory, cases and programming
//! - A day builder that chunks availability into study blocks
//! - Feedback-driven, fully deterministic replanning

// Main modules
pub mod planner;
pub mod types;

// Re-export commonly used types
pub use types::{
    Activity, BlockFormat, BlockType, CoverageStatus, DayPlan, FeedbackEvent, FormInputs,
    GenerateOptions, GlobalLedger, Phase, Plan, PlanCapacity, PlanDebugInfo, Preferences,
    SessionFeel, SlackInfo, Stage, Stream, StudentState, StudentType, StudyBlock, UnitLedger,
    WeekSummary,
};

// Re-export core functionality
pub use planner::{
    apply_feedback_events, calculate_capacity, derive_initial_state, generate_plan,
    generate_plan_from_state,
};

// Error types
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlanError {
    #[error("Invalid inputs: {0}")]
    InvalidInputs(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PlanError>;
