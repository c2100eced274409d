use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::activity::{Activity, BlockFormat, BlockType, Phase, Stream};
use super::inputs::Stage;

/// Three-tier coverage status shared by the capacity buffer and the slack
/// summary: good ≥ 20 %, edge ≥ 10 %, warning below.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CoverageStatus {
    Good,
    Edge,
    Warning,
}

/// Derived planning capacity for one `(inputs, today)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanCapacity {
    pub days_until_exam: i64,
    pub total_weeks: u32,
    /// Weeks that actually receive blocks; the final two weeks before the
    /// exam are reserved.
    pub effective_planning_weeks: u32,
    pub available_effective_minutes: u32,
    pub units_count: u32,
    pub theory_planned: u32,
    pub cases_planned: u32,
    pub programming_planned: u32,
    pub planned_minutes: u32,
    pub buffer_minutes: i64,
    pub buffer_ratio: f64,
    pub buffer_status: CoverageStatus,
}

/// One scheduled study block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StudyBlock {
    /// `"{dateISO}__{indexInDay}__{activity}__{unit|NA}"` - unique across
    /// the plan given deterministic iteration.
    pub id: String,
    pub activity: Activity,
    pub unit: Option<String>,
    pub duration_minutes: u32,
    pub phase: Phase,
    #[serde(rename = "type")]
    pub block_type: BlockType,
    pub format: BlockFormat,
}

/// One calendar day of the plan. Days outside the planning window, or with
/// less than a minimum block of availability, carry an empty block list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DayPlan {
    pub date: NaiveDate,
    /// Calendar weekday, 0 = Sunday through 6 = Saturday.
    pub weekday: u8,
    pub total_hours: f64,
    pub blocks: Vec<StudyBlock>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PhaseDefinition {
    pub phase: Phase,
    pub title: String,
    pub description: String,
}

impl PhaseDefinition {
    pub fn all() -> Vec<Self> {
        Phase::all()
            .into_iter()
            .map(|phase| Self {
                phase,
                title: phase.title().to_string(),
                description: phase.description().to_string(),
            })
            .collect()
    }
}

/// Monday-anchored weekly totals for presentation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekSummary {
    pub week_start: NaiveDate,
    pub total_hours: f64,
    pub minutes_per_phase: BTreeMap<Phase, u32>,
}

/// Actual scheduled minutes of one allocator week (7-day offsets from the
/// planning origin), recorded for debugging.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct WeekActuals {
    pub week_index: u32,
    pub theory_minutes: u32,
    pub cases_minutes: u32,
    pub programming_minutes: u32,
    /// Streams under the weekly floor while workload remained.
    pub missing_streams: Vec<Stream>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanDebugInfo {
    pub capacity: PlanCapacity,
    pub theory_scheduled: u32,
    pub cases_scheduled: u32,
    pub programming_scheduled: u32,
    pub total_scheduled: u32,
    pub weekly_actuals: Vec<WeekActuals>,
    pub cases_starved_weeks: u32,
    pub programming_starved_weeks: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlanMeta {
    /// The only wall-clock value in a plan; everything else is a pure
    /// function of `(inputs, state, today)`.
    pub generated_at: DateTime<Utc>,
    pub today: NaiveDate,
    pub exam_date: NaiveDate,
    pub region: String,
    pub stage: Stage,
    pub total_units: u32,
}

/// A complete generated study plan. Immutable once returned.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Plan {
    pub meta: PlanMeta,
    pub phases: Vec<PhaseDefinition>,
    pub days: Vec<DayPlan>,
    pub weekly_summaries: Vec<WeekSummary>,
    pub explanations: Vec<String>,
    pub debug: Option<PlanDebugInfo>,
}

impl Plan {
    pub fn blocks(&self) -> impl Iterator<Item = &StudyBlock> {
        self.days.iter().flat_map(|d| d.blocks.iter())
    }

    pub fn total_scheduled_minutes(&self) -> u32 {
        self.blocks().map(|b| b.duration_minutes).sum()
    }

    /// Scheduled minutes for one stream across the whole plan.
    pub fn stream_minutes(&self, stream: Stream) -> u32 {
        self.blocks().filter(|b| b.activity.stream() == stream).map(|b| b.duration_minutes).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phase_definitions_cover_all_phases() {
        let defs = PhaseDefinition::all();
        assert_eq!(defs.len(), 4);
        assert_eq!(defs[0].phase, Phase::P1Context);
        assert!(defs.iter().all(|d| !d.title.is_empty() && !d.description.is_empty()));
    }

    #[test]
    fn test_block_type_serializes_as_type() {
        let block = StudyBlock {
            id: "2026-01-01__0__STUDY_THEME__Unidad 1".to_string(),
            activity: Activity::StudyTheme,
            unit: Some("Unidad 1".to_string()),
            duration_minutes: 60,
            phase: Activity::StudyTheme.phase(),
            block_type: Activity::StudyTheme.block_type(),
            format: Activity::StudyTheme.format(),
        };
        let json = serde_json::to_value(&block).unwrap();
        assert_eq!(json["type"], "new_content");
        assert_eq!(json["format"], "raw_content");
        assert_eq!(json["phase"], "P2_DEPTH");
    }
}
