//! Student state derivation.
//!
//! The initial state is a pure function of `(inputs, capacity, today)`:
//! one required/done ledger per curriculum unit, the global cases and
//! programming ledger, default block-duration preferences and the slack
//! summary. Pass 1 starts with every `done` counter at zero.

use chrono::{NaiveDate, Utc};

use crate::planner::{PlanningDefaults, unit_key};
use crate::types::{
    ActivityMinutes, FormInputs, GlobalLedger, PlanCapacity, Preferences, SlackInfo, StudentState,
    UnitLedger,
};

use super::capacity::coverage_status;

/// Required theory minutes per unit, per activity.
fn unit_required() -> ActivityMinutes {
    ActivityMinutes {
        study_theme: PlanningDefaults::STUDY_THEME_MINUTES,
        review: PlanningDefaults::REVIEW_MINUTES,
        podcast: PlanningDefaults::PODCAST_MINUTES,
        flashcard: PlanningDefaults::FLASHCARD_MINUTES,
        quiz: PlanningDefaults::QUIZ_MAX_MINUTES,
    }
}

/// Slack of the remaining horizon: planable capacity minus outstanding
/// workload, with the same three-tier status as the capacity buffer.
pub fn compute_slack(
    units: &[UnitLedger],
    global: &GlobalLedger,
    effective_capacity_future: u32,
) -> SlackInfo {
    let theory_required: u32 = units.iter().map(|u| u.required.total()).sum();
    let theory_done: u32 = units.iter().map(|u| u.done.total()).sum();
    let total_required = theory_required + global.cases_required + global.programming_required;
    let total_done = theory_done + global.cases_done + global.programming_done;
    let required_minutes_future = total_required.saturating_sub(total_done);

    let slack_minutes = effective_capacity_future as i64 - required_minutes_future as i64;
    let slack_ratio = if effective_capacity_future == 0 {
        0.0
    } else {
        slack_minutes as f64 / effective_capacity_future as f64
    };

    SlackInfo {
        effective_capacity_future,
        required_minutes_future,
        slack_minutes,
        slack_ratio,
        status: coverage_status(slack_ratio),
    }
}

/// Build the pass-1 student state for `(inputs, capacity, today)`.
pub fn derive_initial_state(
    inputs: &FormInputs,
    capacity: &PlanCapacity,
    today: NaiveDate,
) -> StudentState {
    let units: Vec<UnitLedger> = (1..=capacity.units_count)
        .map(|k| UnitLedger {
            key: unit_key(k),
            index: k,
            required: unit_required(),
            done: ActivityMinutes::default(),
        })
        .collect();

    let global = GlobalLedger {
        cases_required: capacity.cases_planned,
        cases_done: 0,
        programming_required: capacity.programming_planned,
        programming_done: 0,
    };

    let slack = compute_slack(&units, &global, capacity.available_effective_minutes);

    log::debug!(
        "Derived initial state: {} units, {} required minutes, slack {:?}",
        units.len(),
        slack.required_minutes_future,
        slack.status
    );

    StudentState {
        version: 1,
        created_at: Utc::now(),
        today,
        exam_date: inputs.exam_date,
        units,
        global,
        slack,
        preferences: Preferences::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::calculate_capacity;
    use crate::types::Stage;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    fn baseline_inputs() -> FormInputs {
        FormInputs {
            exam_date: date("2026-03-12"),
            weekly_availability: [4.0, 4.0, 4.0, 4.0, 4.0, 0.0, 0.0],
            presented_before: false,
            already_studying: false,
            region: "Madrid".to_string(),
            stage: Stage::Primaria,
            theme_count: None,
            plan_programming: None,
            student_type: None,
        }
    }

    #[test]
    fn test_initial_state_shape() {
        let inputs = baseline_inputs();
        let today = date("2026-01-01");
        let capacity = calculate_capacity(&inputs, today);
        let state = derive_initial_state(&inputs, &capacity, today);

        assert_eq!(state.version, 1);
        assert_eq!(state.units.len(), 20);
        assert_eq!(state.units[0].key, "Unidad 1");
        assert_eq!(state.units[19].key, "Unidad 20");
        assert_eq!(state.units[0].required.total(), 510);
        assert_eq!(state.units[0].done.total(), 0);
        assert_eq!(state.global.cases_required, capacity.cases_planned);
        assert_eq!(state.global.programming_required, capacity.programming_planned);
    }

    #[test]
    fn test_initial_slack_matches_buffer_arithmetic() {
        let inputs = baseline_inputs();
        let today = date("2026-01-01");
        let capacity = calculate_capacity(&inputs, today);
        let state = derive_initial_state(&inputs, &capacity, today);

        assert_eq!(state.slack.effective_capacity_future, capacity.available_effective_minutes);
        assert_eq!(state.slack.required_minutes_future, capacity.planned_minutes);
        assert_eq!(
            state.slack.slack_minutes,
            capacity.available_effective_minutes as i64 - capacity.planned_minutes as i64
        );
    }

    #[test]
    fn test_slack_with_zero_capacity() {
        let slack = compute_slack(&[], &GlobalLedger::default(), 0);
        assert_eq!(slack.slack_minutes, 0);
        assert_eq!(slack.slack_ratio, 0.0);
    }
}
