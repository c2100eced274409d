//! Per-generation scheduling budget.
//!
//! A `GlobalBudget` is derived from student state at the start of one
//! generation pass (remaining = required − done) and discarded afterwards.
//! The allocator drains it monotonically through `commit`; no counter ever
//! goes below zero.

use crate::planner::PlanningDefaults;
use crate::types::{Activity, ActivityMinutes, PlanCapacity, Stream, StudentState};

/// Remaining workload for one curriculum unit within a generation pass.
#[derive(Debug, Clone)]
pub struct UnitBudget {
    pub key: String,
    /// 1-based unit number.
    pub index: u32,
    pub remaining: ActivityMinutes,
    pub total_remaining: u32,
    /// Cumulative STUDY_THEME minutes: historical done plus minutes
    /// scheduled so far in this pass. Drives activation and gating.
    pub study_theme_done: u32,
    pub study_theme_complete: bool,
}

impl UnitBudget {
    /// A unit is active once it has any STUDY_THEME minutes.
    pub fn is_active(&self) -> bool {
        self.study_theme_done > 0
    }
}

#[derive(Debug, Clone)]
pub struct GlobalBudget {
    pub units: Vec<UnitBudget>,
    pub theory_planned: u32,
    pub theory_remaining: u32,
    pub cases_planned: u32,
    pub cases_remaining: u32,
    pub case_practice_scheduled: u32,
    pub case_mock_scheduled: u32,
    pub programming_planned: u32,
    pub programming_remaining: u32,
}

impl GlobalBudget {
    pub fn from_state(state: &StudentState, capacity: &PlanCapacity) -> Self {
        let units: Vec<UnitBudget> = state
            .units
            .iter()
            .map(|u| {
                let study_theme_done = u.done.study_theme;
                UnitBudget {
                    key: u.key.clone(),
                    index: u.index,
                    remaining: ActivityMinutes {
                        study_theme: u.remaining(Activity::StudyTheme),
                        review: u.remaining(Activity::Review),
                        podcast: u.remaining(Activity::Podcast),
                        flashcard: u.remaining(Activity::Flashcard),
                        quiz: u.remaining(Activity::Quiz),
                    },
                    total_remaining: u.total_remaining(),
                    study_theme_done,
                    study_theme_complete: study_theme_done
                        >= PlanningDefaults::STUDY_THEME_COMPLETE_THRESHOLD,
                }
            })
            .collect();

        let theory_remaining = units.iter().map(|u| u.total_remaining).sum();

        Self {
            units,
            theory_planned: capacity.theory_planned,
            theory_remaining,
            cases_planned: capacity.cases_planned,
            cases_remaining: state.global.cases_required.saturating_sub(state.global.cases_done),
            case_practice_scheduled: 0,
            case_mock_scheduled: 0,
            programming_planned: capacity.programming_planned,
            programming_remaining: state
                .global
                .programming_required
                .saturating_sub(state.global.programming_done),
        }
    }

    pub fn stream_remaining(&self, stream: Stream) -> u32 {
        match stream {
            Stream::Theory => self.theory_remaining,
            Stream::Cases => self.cases_remaining,
            Stream::Programming => self.programming_remaining,
        }
    }

    /// Remaining-to-planned ratio for stream selection. A drained or
    /// unplanned stream reads as 0.
    pub fn remaining_ratio(&self, stream: Stream) -> f64 {
        let planned = match stream {
            Stream::Theory => self.theory_planned,
            Stream::Cases => self.cases_planned,
            Stream::Programming => self.programming_planned,
        };
        if planned == 0 {
            return 0.0;
        }
        self.stream_remaining(stream) as f64 / planned as f64
    }

    /// Record a committed block against the budget.
    ///
    /// Theory commits are split per unit: the unit's per-activity and
    /// total counters drop alongside the stream counter, and STUDY_THEME
    /// advances the unit's activation/completion trackers.
    pub fn commit(&mut self, activity: Activity, unit_index: Option<usize>, minutes: u32) {
        match activity.stream() {
            Stream::Theory => {
                debug_assert!(unit_index.is_some(), "theory block committed without a unit");
                if let Some(i) = unit_index {
                    let unit = &mut self.units[i];
                    if let Some(remaining) = unit.remaining.get_mut(activity) {
                        *remaining = remaining.saturating_sub(minutes);
                    }
                    unit.total_remaining = unit.total_remaining.saturating_sub(minutes);
                    if activity == Activity::StudyTheme {
                        unit.study_theme_done += minutes;
                        if unit.study_theme_done
                            >= PlanningDefaults::STUDY_THEME_COMPLETE_THRESHOLD
                        {
                            unit.study_theme_complete = true;
                        }
                    }
                }
                self.theory_remaining = self.theory_remaining.saturating_sub(minutes);
            },
            Stream::Cases => {
                self.cases_remaining = self.cases_remaining.saturating_sub(minutes);
                match activity {
                    Activity::CasePractice => self.case_practice_scheduled += minutes,
                    Activity::CaseMock => self.case_mock_scheduled += minutes,
                    _ => unreachable!(),
                }
            },
            Stream::Programming => {
                self.programming_remaining = self.programming_remaining.saturating_sub(minutes);
            },
        }
    }
}
