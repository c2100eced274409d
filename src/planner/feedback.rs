//! Feedback fold: completion, quiz and session events over student state.
//!
//! `apply_feedback_events` is a pure fold. The input state is untouched;
//! the returned state has `required`, `done` and preference targets
//! updated and slack recomputed against the same future capacity.
//! Required minutes only ever grow; done minutes are clamped to required.

use log::warn;

use crate::planner::PlanningDefaults;
use crate::types::{Activity, FeedbackEvent, SessionFeel, Stream, StudentState};

use super::state::compute_slack;

/// Apply `events` in order to `state`, producing a new state.
pub fn apply_feedback_events(state: &StudentState, events: &[FeedbackEvent]) -> StudentState {
    let mut next = state.clone();

    for event in events {
        apply_event(&mut next, event);
    }

    next.slack = compute_slack(&next.units, &next.global, state.slack.effective_capacity_future);
    next
}

fn apply_event(state: &mut StudentState, event: &FeedbackEvent) {
    match event {
        FeedbackEvent::QuizResult { unit, score } => apply_quiz_result(state, unit, *score),
        FeedbackEvent::BlockCompleted { activity, unit, completed_minutes } => {
            apply_block_completed(state, *activity, unit.as_deref(), *completed_minutes)
        },
        FeedbackEvent::SessionFeedback { activity, feel } => {
            apply_session_feedback(state, *activity, *feel)
        },
    }
}

fn apply_quiz_result(state: &mut StudentState, unit: &str, score: u32) {
    if score >= PlanningDefaults::QUIZ_FAIL_THRESHOLD {
        return;
    }
    match state.unit_mut(unit) {
        Some(ledger) => {
            ledger.required.review += PlanningDefaults::REVIEW_BOOST_MINUTES;
        },
        None => warn!("Quiz result for unknown unit '{unit}' skipped"),
    }
}

fn apply_block_completed(
    state: &mut StudentState,
    activity: Activity,
    unit: Option<&str>,
    completed_minutes: f64,
) {
    let minutes = completed_minutes.max(0.0).floor() as u32;

    match activity.stream() {
        Stream::Theory => {
            let Some(key) = unit else {
                warn!("Completed {} block without a unit skipped", activity.tag());
                return;
            };
            let Some(ledger) = state.unit_mut(key) else {
                warn!("Completed block for unknown unit '{key}' skipped");
                return;
            };
            let required = ledger.required.get(activity);
            if let Some(done) = ledger.done.get_mut(activity) {
                *done = (*done + minutes).min(required);
            }
        },
        Stream::Cases => {
            state.global.cases_done =
                (state.global.cases_done + minutes).min(state.global.cases_required);
        },
        Stream::Programming => {
            state.global.programming_done =
                (state.global.programming_done + minutes).min(state.global.programming_required);
        },
    }
}

fn apply_session_feedback(state: &mut StudentState, activity: Activity, feel: SessionFeel) {
    let step = PlanningDefaults::SESSION_FEEDBACK_STEP as i32;
    match feel {
        SessionFeel::Ok => {},
        SessionFeel::TooMuch => state.preferences.adjust(activity, -step),
        SessionFeel::More => state.preferences.adjust(activity, step),
    }
}
