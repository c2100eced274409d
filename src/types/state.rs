use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::activity::Activity;
use super::plan::CoverageStatus;

/// Minutes broken down by theory activity. Used for both the required and
/// the done side of a unit ledger.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActivityMinutes {
    pub study_theme: u32,
    pub review: u32,
    pub podcast: u32,
    pub flashcard: u32,
    pub quiz: u32,
}

impl ActivityMinutes {
    pub fn total(&self) -> u32 {
        self.study_theme + self.review + self.podcast + self.flashcard + self.quiz
    }

    /// Minutes for a theory activity. Non-theory activities have no
    /// per-unit ledger and return 0.
    pub fn get(&self, activity: Activity) -> u32 {
        match activity {
            Activity::StudyTheme => self.study_theme,
            Activity::Review => self.review,
            Activity::Podcast => self.podcast,
            Activity::Flashcard => self.flashcard,
            Activity::Quiz => self.quiz,
            _ => 0,
        }
    }

    pub fn get_mut(&mut self, activity: Activity) -> Option<&mut u32> {
        match activity {
            Activity::StudyTheme => Some(&mut self.study_theme),
            Activity::Review => Some(&mut self.review),
            Activity::Podcast => Some(&mut self.podcast),
            Activity::Flashcard => Some(&mut self.flashcard),
            Activity::Quiz => Some(&mut self.quiz),
            _ => None,
        }
    }
}

/// Required/done minute ledger for one curriculum unit ("Unidad k").
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnitLedger {
    pub key: String,
    /// 1-based unit number; units are studied in this order.
    pub index: u32,
    pub required: ActivityMinutes,
    pub done: ActivityMinutes,
}

impl UnitLedger {
    pub fn remaining(&self, activity: Activity) -> u32 {
        self.required.get(activity).saturating_sub(self.done.get(activity))
    }

    pub fn total_remaining(&self) -> u32 {
        self.required.total().saturating_sub(self.done.total())
    }
}

/// Global (non-unit) workload ledger for cases and programming.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct GlobalLedger {
    pub cases_required: u32,
    pub cases_done: u32,
    pub programming_required: u32,
    pub programming_done: u32,
}

/// Per-activity target block duration in minutes, adjustable by session
/// feedback within fixed bounds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Preferences {
    pub block_minutes: BTreeMap<Activity, u32>,
}

impl Default for Preferences {
    fn default() -> Self {
        let mut block_minutes = BTreeMap::new();
        for activity in Activity::all() {
            block_minutes.insert(activity, Self::default_minutes(activity));
        }
        Self { block_minutes }
    }
}

impl Preferences {
    pub fn default_minutes(activity: Activity) -> u32 {
        match activity {
            Activity::StudyTheme => 60,
            Activity::Review => 30,
            Activity::Podcast => 60,
            Activity::Flashcard => 30,
            Activity::Quiz => 15,
            Activity::CasePractice => 60,
            Activity::CaseMock => 60,
            Activity::ProgrammingBlock => 60,
        }
    }

    /// Inclusive (min, max) bounds that clamp user adjustments.
    pub fn bounds(activity: Activity) -> (u32, u32) {
        match activity {
            Activity::StudyTheme => (30, 90),
            Activity::Review => (15, 60),
            Activity::Podcast => (30, 90),
            Activity::Flashcard => (15, 60),
            Activity::Quiz => (15, 30),
            Activity::CasePractice => (30, 90),
            Activity::CaseMock => (30, 90),
            Activity::ProgrammingBlock => (30, 90),
        }
    }

    pub fn target_for(&self, activity: Activity) -> u32 {
        self.block_minutes.get(&activity).copied().unwrap_or_else(|| Self::default_minutes(activity))
    }

    /// Shift an activity's target by `delta` minutes, clamped into bounds.
    pub fn adjust(&mut self, activity: Activity, delta: i32) {
        let (min, max) = Self::bounds(activity);
        let current = self.target_for(activity) as i64;
        let next = (current + delta as i64).clamp(min as i64, max as i64) as u32;
        self.block_minutes.insert(activity, next);
    }
}

/// Capacity-versus-workload summary for the remaining horizon.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct SlackInfo {
    pub effective_capacity_future: u32,
    pub required_minutes_future: u32,
    pub slack_minutes: i64,
    pub slack_ratio: f64,
    pub status: CoverageStatus,
}

/// Complete student state: everything the generator needs to (re)build a
/// plan. Created by `derive_initial_state`, evolved only through
/// `apply_feedback_events`, which returns a new value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudentState {
    pub version: u32,
    pub created_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub exam_date: NaiveDate,
    pub units: Vec<UnitLedger>,
    pub global: GlobalLedger,
    pub slack: SlackInfo,
    pub preferences: Preferences,
}

impl StudentState {
    pub fn unit(&self, key: &str) -> Option<&UnitLedger> {
        self.units.iter().find(|u| u.key == key)
    }

    pub fn unit_mut(&mut self, key: &str) -> Option<&mut UnitLedger> {
        self.units.iter_mut().find(|u| u.key == key)
    }

    pub fn total_required(&self) -> u32 {
        let theory: u32 = self.units.iter().map(|u| u.required.total()).sum();
        theory + self.global.cases_required + self.global.programming_required
    }

    pub fn total_done(&self) -> u32 {
        let theory: u32 = self.units.iter().map(|u| u.done.total()).sum();
        theory + self.global.cases_done + self.global.programming_done
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_adjust_clamps() {
        let mut prefs = Preferences::default();
        assert_eq!(prefs.target_for(Activity::StudyTheme), 60);

        for _ in 0..20 {
            prefs.adjust(Activity::StudyTheme, -15);
        }
        assert_eq!(prefs.target_for(Activity::StudyTheme), 30);

        for _ in 0..20 {
            prefs.adjust(Activity::StudyTheme, 15);
        }
        assert_eq!(prefs.target_for(Activity::StudyTheme), 90);
    }

    #[test]
    fn test_unit_remaining_saturates() {
        let unit = UnitLedger {
            key: "Unidad 1".to_string(),
            index: 1,
            required: ActivityMinutes { study_theme: 240, review: 60, ..Default::default() },
            done: ActivityMinutes { study_theme: 300, review: 20, ..Default::default() },
        };
        assert_eq!(unit.remaining(Activity::StudyTheme), 0);
        assert_eq!(unit.remaining(Activity::Review), 40);
    }

    #[test]
    fn test_activity_minutes_total() {
        let m = ActivityMinutes { study_theme: 240, review: 60, podcast: 60, flashcard: 60, quiz: 90 };
        assert_eq!(m.total(), 510);
    }
}
