//! Planning engine for Oposiplan
//!
//! This module turns user inputs and student state into a day-by-day study
//! plan. The pipeline runs leaves-first: date arithmetic, capacity, state
//! derivation, then the allocator-driven day builder and the feedback
//! replanner on top.

pub mod allocator;
pub mod budget;
pub mod capacity;
pub mod dates;
pub mod feedback;
pub mod generator;
pub mod state;


// Re-export the engine's public operations
pub use capacity::calculate_capacity;
pub use feedback::apply_feedback_events;
pub use generator::{generate_plan, generate_plan_from_state};
pub use state::derive_initial_state;

use crate::PlanError;
use crate::types::FormInputs;

/// Numeric planning constants. Everything is whole minutes.
pub struct PlanningDefaults;

impl PlanningDefaults {
    /// Default number of curriculum units per exam
    pub const UNIT_COUNT: u32 = 20;

    /// Required STUDY_THEME minutes per unit
    pub const STUDY_THEME_MINUTES: u32 = 240;

    /// Cumulative STUDY_THEME minutes on unit k before unit k+1 may start
    pub const START_NEXT_UNIT_THRESHOLD: u32 = 120;

    /// Cumulative STUDY_THEME minutes that unlock REVIEW for a unit
    pub const STUDY_THEME_COMPLETE_THRESHOLD: u32 = 240;

    /// Required REVIEW minutes per unit
    pub const REVIEW_MINUTES: u32 = 60;

    /// Required PODCAST minutes per unit
    pub const PODCAST_MINUTES: u32 = 60;

    /// Required FLASHCARD minutes per unit
    pub const FLASHCARD_MINUTES: u32 = 60;

    /// Required QUIZ minutes per unit
    pub const QUIZ_MAX_MINUTES: u32 = 90;

    /// Total theory envelope per unit (sum of the five activities)
    pub const THEORY_ENVELOPE_MINUTES: u32 = 510;

    /// Maximum single-block duration
    pub const MAX_BLOCK_DURATION: u32 = 60;

    /// Minimum single-block duration; days under this stay empty
    pub const MIN_BLOCK_DURATION: u32 = 15;

    /// Weekly per-stream floor from week 3 onward
    pub const WEEKLY_MINIMUM_MINUTES: u32 = 60;

    /// Quiz scores strictly below this add review workload
    pub const QUIZ_FAIL_THRESHOLD: u32 = 60;

    /// Review minutes added per failed quiz
    pub const REVIEW_BOOST_MINUTES: u32 = 30;

    /// Step for session-feedback preference adjustments
    pub const SESSION_FEEDBACK_STEP: u32 = 15;

    /// Final weeks before the exam that receive no blocks
    pub const RESERVE_WEEKS: u32 = 2;
}

/// Allowed values for `FormInputs::theme_count`.
const ALLOWED_THEME_COUNTS: [u8; 3] = [15, 20, 25];

/// Boundary validation for planning inputs.
///
/// The engine itself never fails on well-typed inputs; malformed shapes
/// are rejected here before any planning runs.
pub fn validate_inputs(inputs: &FormInputs) -> Result<(), PlanError> {
    for (i, &hours) in inputs.weekly_availability.iter().enumerate() {
        if !hours.is_finite() {
            return Err(PlanError::InvalidInputs(format!(
                "availability for weekday {i} is not finite"
            )));
        }
        if hours < 0.0 {
            return Err(PlanError::InvalidInputs(format!(
                "availability for weekday {i} is negative ({hours})"
            )));
        }
    }

    if let Some(count) = inputs.theme_count {
        if !ALLOWED_THEME_COUNTS.contains(&count) {
            return Err(PlanError::InvalidInputs(format!(
                "theme_count must be one of {ALLOWED_THEME_COUNTS:?}, got {count}"
            )));
        }
    }

    Ok(())
}

/// Canonical key for unit `k`, 1-based.
pub fn unit_key(k: u32) -> String {
    format!("Unidad {k}")
}
