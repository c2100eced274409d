use serde::{Deserialize, Serialize};

use super::activity::Activity;

/// Student's perception of a session's length.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum SessionFeel {
    TooMuch,
    Ok,
    More,
}

/// Feedback events folded into student state by `apply_feedback_events`.
///
/// Events are applied strictly in the order given. Unknown unit keys are
/// skipped with a warning; the engine never fails on feedback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind")]
pub enum FeedbackEvent {
    /// A unit quiz result. Scores below the fail threshold add review
    /// workload to that unit.
    #[serde(rename = "QUIZ_RESULT")]
    QuizResult { unit: String, score: u32 },

    /// Completed study minutes for an activity. Theory activities require
    /// a unit; cases and programming credit the global ledger.
    #[serde(rename = "BLOCK_COMPLETED")]
    BlockCompleted {
        activity: Activity,
        #[serde(default)]
        unit: Option<String>,
        completed_minutes: f64,
    },

    /// Perceived session length; nudges the activity's target block
    /// duration up or down.
    #[serde(rename = "SESSION_FEEDBACK")]
    SessionFeedback { activity: Activity, feel: SessionFeel },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_wire_format() {
        let event: FeedbackEvent = serde_json::from_str(
            r#"{"kind": "QUIZ_RESULT", "unit": "Unidad 3", "score": 45}"#,
        )
        .unwrap();
        assert_eq!(event, FeedbackEvent::QuizResult { unit: "Unidad 3".to_string(), score: 45 });

        let event: FeedbackEvent = serde_json::from_str(
            r#"{"kind": "BLOCK_COMPLETED", "activity": "CASE_PRACTICE", "completed_minutes": 60}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            FeedbackEvent::BlockCompleted {
                activity: Activity::CasePractice,
                unit: None,
                completed_minutes: 60.0,
            }
        );

        let event: FeedbackEvent = serde_json::from_str(
            r#"{"kind": "SESSION_FEEDBACK", "activity": "STUDY_THEME", "feel": "too_much"}"#,
        )
        .unwrap();
        assert_eq!(
            event,
            FeedbackEvent::SessionFeedback {
                activity: Activity::StudyTheme,
                feel: SessionFeel::TooMuch,
            }
        );
    }
}
