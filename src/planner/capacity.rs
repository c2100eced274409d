/*!
Capacity model: from calendar availability to planable minutes.

This module centralizes logic for:
- Computing the exam window and the effective planning window (the final
  two weeks are reserved and receive no blocks)
- Summing effective minutes from the Monday-first availability pattern
- Fixing planned totals per stream with the 50/30/20 target mix
- Classifying the buffer between capacity and planned workload

Everything here is a pure function of `(inputs, today)`.
*/

use chrono::NaiveDate;

use crate::planner::PlanningDefaults;
use crate::planner::dates::{add_days, diff_days, weekday_monday_index};
use crate::types::{CoverageStatus, FormInputs, PlanCapacity};

/// Buffer ratio at or above which coverage is comfortable.
pub const BUFFER_GOOD_RATIO: f64 = 0.20;

/// Buffer ratio at or above which coverage is tight but workable.
pub const BUFFER_EDGE_RATIO: f64 = 0.10;

/// Availability of `date` in whole minutes, rounded once per day.
#[inline]
pub fn availability_minutes(inputs: &FormInputs, date: NaiveDate) -> u32 {
    let hours = inputs.weekly_availability[weekday_monday_index(date)];
    (hours * 60.0).round().max(0.0) as u32
}

/// Three-tier classification shared by buffer and slack.
pub fn coverage_status(ratio: f64) -> CoverageStatus {
    if ratio >= BUFFER_GOOD_RATIO {
        CoverageStatus::Good
    } else if ratio >= BUFFER_EDGE_RATIO {
        CoverageStatus::Edge
    } else {
        CoverageStatus::Warning
    }
}

/// Derive planning capacity for `(inputs, today)`.
///
/// A past exam date yields a zero-week window and an all-empty plan
/// downstream; this function never fails.
pub fn calculate_capacity(inputs: &FormInputs, today: NaiveDate) -> PlanCapacity {
    let days_until_exam = diff_days(today, inputs.exam_date).max(0);
    let total_weeks = (days_until_exam as u64).div_ceil(7) as u32;
    let effective_planning_weeks = total_weeks.saturating_sub(PlanningDefaults::RESERVE_WEEKS);

    let mut available_effective_minutes = 0u32;
    for offset in 0..(effective_planning_weeks as i64 * 7) {
        available_effective_minutes += availability_minutes(inputs, add_days(today, offset));
    }

    let units_count = inputs.units_count();
    let theory_planned = units_count * PlanningDefaults::THEORY_ENVELOPE_MINUTES;
    // Target mix 50/30/20: cases and programming as tenths of theory.
    let cases_planned = theory_planned * 6 / 10;
    let programming_planned =
        if inputs.plans_programming() { theory_planned * 4 / 10 } else { 0 };
    let planned_minutes = theory_planned + cases_planned + programming_planned;

    let buffer_minutes = available_effective_minutes as i64 - planned_minutes as i64;
    let buffer_ratio = if available_effective_minutes == 0 {
        0.0
    } else {
        buffer_minutes as f64 / available_effective_minutes as f64
    };

    PlanCapacity {
        days_until_exam,
        total_weeks,
        effective_planning_weeks,
        available_effective_minutes,
        units_count,
        theory_planned,
        cases_planned,
        programming_planned,
        planned_minutes,
        buffer_minutes,
        buffer_ratio,
        buffer_status: coverage_status(buffer_ratio),
    }
}
