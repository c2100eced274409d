/*!
Plan generation: the day builder and weekly roll-up.

`generate_plan_from_state` converts student state into a scheduling budget
and walks every day from the planning origin to the exam. Inside a day it
drains available minutes by repeatedly asking the allocator for the next
block; across days it rolls weekly actuals, starvation counters and the
last-week stream totals the allocator's guardrails feed on.

Generation is deterministic: for a fixed `(inputs, state, today)` the
result is identical apart from `meta.generated_at`.
*/

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate, Utc};
use log::{debug, info};

use crate::planner::dates::{add_days, monday_of_week, weekday_sunday_index};
use crate::planner::{PlanningDefaults, validate_inputs};
use crate::types::{
    Activity, CoverageStatus, DayPlan, FormInputs, GenerateOptions, Phase, Plan, PlanCapacity,
    PlanDebugInfo, PlanMeta, PhaseDefinition, Preferences, Stream, StudentState, StudyBlock,
    WeekActuals, WeekSummary,
};

use super::allocator::{DayContext, Selection, daily_study_theme_cap, next_block};
use super::budget::GlobalBudget;
use super::capacity::{availability_minutes, calculate_capacity};
use super::state::derive_initial_state;

/// Presentation unit label for programming blocks.
const PROGRAMMING_UNIT_LABEL: &str = "Programación";

/// Generate a plan from scratch: capacity, initial state, then the day
/// builder. Convenience composition of the engine's other operations.
pub fn generate_plan(inputs: &FormInputs, options: &GenerateOptions) -> crate::Result<Plan> {
    validate_inputs(inputs)?;
    let today = options.today.unwrap_or_else(|| Local::now().date_naive());
    let capacity = calculate_capacity(inputs, today);
    let state = derive_initial_state(inputs, &capacity, today);
    Ok(build_plan(inputs, &state, capacity, today))
}

/// Regenerate the future plan from evolved student state. Calling twice
/// with the same state yields field-identical plans apart from
/// `meta.generated_at`.
pub fn generate_plan_from_state(
    inputs: &FormInputs,
    state: &StudentState,
    options: &GenerateOptions,
) -> crate::Result<Plan> {
    validate_inputs(inputs)?;
    let today = options.today.unwrap_or(state.today);
    let capacity = calculate_capacity(inputs, today);
    Ok(build_plan(inputs, state, capacity, today))
}

/// Scheduled minutes per stream across the whole pass.
#[derive(Debug, Clone, Copy, Default)]
struct StreamTotals {
    theory: u32,
    cases: u32,
    programming: u32,
}

impl StreamTotals {
    fn add(&mut self, stream: Stream, minutes: u32) {
        match stream {
            Stream::Theory => self.theory += minutes,
            Stream::Cases => self.cases += minutes,
            Stream::Programming => self.programming += minutes,
        }
    }

    fn total(&self) -> u32 {
        self.theory + self.cases + self.programming
    }
}

/// Week-scoped bookkeeping: current-week stream minutes, the previous
/// week's cases/programming totals, archived actuals and starvation
/// counters.
#[derive(Debug, Default)]
struct WeekTracker {
    theory: u32,
    cases: u32,
    programming: u32,
    last_cases: u32,
    last_programming: u32,
    actuals: Vec<WeekActuals>,
    cases_starved_weeks: u32,
    programming_starved_weeks: u32,
}

impl WeekTracker {
    fn add(&mut self, stream: Stream, minutes: u32) {
        match stream {
            Stream::Theory => self.theory += minutes,
            Stream::Cases => self.cases += minutes,
            Stream::Programming => self.programming += minutes,
        }
    }

    /// Archive the week that just finished and reset current-week counters.
    fn roll(&mut self, completed_week: u32, budget: &GlobalBudget) {
        let mut missing_streams = Vec::new();
        for (stream, minutes) in [
            (Stream::Theory, self.theory),
            (Stream::Cases, self.cases),
            (Stream::Programming, self.programming),
        ] {
            if minutes < PlanningDefaults::WEEKLY_MINIMUM_MINUTES
                && budget.stream_remaining(stream) > 0
            {
                missing_streams.push(stream);
            }
        }

        // Starvation only counts once the theory-only ramp is over.
        if completed_week > 2 {
            if self.cases == 0 && budget.cases_remaining > 0 {
                self.cases_starved_weeks += 1;
            }
            if self.programming == 0 && budget.programming_remaining > 0 {
                self.programming_starved_weeks += 1;
            }
        }

        self.actuals.push(WeekActuals {
            week_index: completed_week,
            theory_minutes: self.theory,
            cases_minutes: self.cases,
            programming_minutes: self.programming,
            missing_streams,
        });

        self.last_cases = self.cases;
        self.last_programming = self.programming;
        self.theory = 0;
        self.cases = 0;
        self.programming = 0;
    }
}

fn build_plan(
    inputs: &FormInputs,
    state: &StudentState,
    capacity: PlanCapacity,
    today: NaiveDate,
) -> Plan {
    info!(
        "Generating plan: {} days to exam, {} effective weeks, buffer {:?}",
        capacity.days_until_exam, capacity.effective_planning_weeks, capacity.buffer_status
    );

    let mut budget = GlobalBudget::from_state(state, &capacity);
    let horizon = capacity.days_until_exam;
    let planning_days = capacity.effective_planning_weeks as i64 * 7;

    let availability: Vec<u32> =
        (0..horizon).map(|d| availability_minutes(inputs, add_days(today, d))).collect();

    let mut days: Vec<DayPlan> = Vec::with_capacity(horizon.max(0) as usize);
    let mut tracker = WeekTracker::default();
    let mut totals = StreamTotals::default();

    for d in 0..horizon {
        if d > 0 && d % 7 == 0 {
            tracker.roll((d / 7) as u32, &budget);
        }

        let date = add_days(today, d);
        let available = availability[d as usize];
        let week_index = (d / 7) as u32 + 1;

        let blocks = if d < planning_days && available >= PlanningDefaults::MIN_BLOCK_DURATION {
            build_day(
                date,
                d,
                week_index,
                available,
                &availability,
                planning_days,
                &state.preferences,
                &mut budget,
                &mut tracker,
                &mut totals,
            )
        } else {
            Vec::new()
        };

        let minutes: u32 = blocks.iter().map(|b| b.duration_minutes).sum();
        days.push(DayPlan {
            date,
            weekday: weekday_sunday_index(date),
            total_hours: minutes as f64 / 60.0,
            blocks,
        });
    }

    // Archive the in-progress week so weekly actuals cover the horizon.
    if horizon > 0 {
        tracker.roll(((horizon - 1) / 7) as u32 + 1, &budget);
    }

    info!(
        "Generated plan: {} scheduled minutes over {} days (theory {}, cases {}, programming {})",
        totals.total(),
        days.iter().filter(|day| !day.blocks.is_empty()).count(),
        totals.theory,
        totals.cases,
        totals.programming
    );

    let explanations = build_explanations(&capacity, &totals);
    let weekly_summaries = build_week_summaries(&days);

    Plan {
        meta: PlanMeta {
            generated_at: Utc::now(),
            today,
            exam_date: inputs.exam_date,
            region: inputs.region.clone(),
            stage: inputs.stage,
            total_units: capacity.units_count,
        },
        phases: PhaseDefinition::all(),
        days,
        weekly_summaries,
        explanations,
        debug: Some(PlanDebugInfo {
            theory_scheduled: totals.theory,
            cases_scheduled: totals.cases,
            programming_scheduled: totals.programming,
            total_scheduled: totals.total(),
            weekly_actuals: tracker.actuals,
            cases_starved_weeks: tracker.cases_starved_weeks,
            programming_starved_weeks: tracker.programming_starved_weeks,
            capacity,
        }),
    }
}

/// Drain one day's availability into blocks.
///
/// Main drain emits full-size blocks while at least `MAX_BLOCK_DURATION`
/// minutes remain; a 15-59 minute tail gets one block for everything left.
/// Days with less than an hour total are filled by a single call.
#[allow(clippy::too_many_arguments)]
fn build_day(
    date: NaiveDate,
    day_offset: i64,
    week_index: u32,
    available: u32,
    availability: &[u32],
    planning_days: i64,
    preferences: &Preferences,
    budget: &mut GlobalBudget,
    tracker: &mut WeekTracker,
    totals: &mut StreamTotals,
) -> Vec<StudyBlock> {
    let week_end = week_index as i64 * 7;
    let lookahead_end = week_end.min(planning_days).min(availability.len() as i64);
    let future_in_week: u32 =
        ((day_offset + 1)..lookahead_end).map(|i| availability[i as usize]).sum();

    let mut ctx = DayContext {
        week_index,
        available_today: available,
        remaining_today: available,
        study_theme_today: 0,
        today_unit: None,
        week_theory_minutes: tracker.theory,
        week_cases_minutes: tracker.cases,
        week_programming_minutes: tracker.programming,
        week_remaining_available: available + future_in_week,
        last_week_cases: tracker.last_cases,
        last_week_programming: tracker.last_programming,
    };

    let mut blocks = Vec::new();

    if available < PlanningDefaults::MAX_BLOCK_DURATION {
        // Short-day fallback: one block takes the whole day.
        if let Some(selection) = next_block(budget, &ctx) {
            let duration = study_theme_capped(selection.activity, ctx.remaining_today, &ctx);
            commit_block(date, selection, duration, &mut blocks, budget, &mut ctx, tracker, totals);
        }
        return blocks;
    }

    // Main drain
    while ctx.remaining_today >= PlanningDefaults::MAX_BLOCK_DURATION {
        let Some(selection) = next_block(budget, &ctx) else { break };
        let base = PlanningDefaults::MAX_BLOCK_DURATION.min(ctx.remaining_today);
        let preferred = preferences.target_for(selection.activity).clamp(
            PlanningDefaults::MIN_BLOCK_DURATION,
            PlanningDefaults::MAX_BLOCK_DURATION,
        );
        let duration = study_theme_capped(selection.activity, base.min(preferred), &ctx);
        commit_block(date, selection, duration, &mut blocks, budget, &mut ctx, tracker, totals);
    }

    // Tail: one more block for the 15-59 minutes left over.
    if ctx.remaining_today >= PlanningDefaults::MIN_BLOCK_DURATION {
        if let Some(selection) = next_block(budget, &ctx) {
            let duration = study_theme_capped(selection.activity, ctx.remaining_today, &ctx);
            commit_block(date, selection, duration, &mut blocks, budget, &mut ctx, tracker, totals);
        }
    }

    debug!("{date}: {} blocks, {} minutes left undrained", blocks.len(), ctx.remaining_today);
    blocks
}

/// Trim a STUDY_THEME duration to the day's remaining cap headroom. Other
/// activities pass through.
fn study_theme_capped(activity: Activity, duration: u32, ctx: &DayContext) -> u32 {
    if activity != Activity::StudyTheme {
        return duration;
    }
    let cap = daily_study_theme_cap(ctx.available_today);
    duration.min(cap.saturating_sub(ctx.study_theme_today))
}

/// Emit one block and update every tracker that depends on it.
#[allow(clippy::too_many_arguments)]
fn commit_block(
    date: NaiveDate,
    selection: Selection,
    duration: u32,
    blocks: &mut Vec<StudyBlock>,
    budget: &mut GlobalBudget,
    ctx: &mut DayContext,
    tracker: &mut WeekTracker,
    totals: &mut StreamTotals,
) {
    debug_assert!(duration >= PlanningDefaults::MIN_BLOCK_DURATION);
    debug_assert!(duration <= ctx.remaining_today);

    let activity = selection.activity;
    let stream = activity.stream();
    let unit = match stream {
        Stream::Theory => selection.unit.map(|i| budget.units[i].key.clone()),
        Stream::Cases => None,
        Stream::Programming => Some(PROGRAMMING_UNIT_LABEL.to_string()),
    };

    let id = format!(
        "{date}__{index}__{tag}__{unit}",
        index = blocks.len(),
        tag = activity.tag(),
        unit = unit.as_deref().unwrap_or("NA"),
    );

    blocks.push(StudyBlock {
        id,
        activity,
        unit,
        duration_minutes: duration,
        phase: activity.phase(),
        block_type: activity.block_type(),
        format: activity.format(),
    });

    budget.commit(activity, selection.unit, duration);

    ctx.remaining_today -= duration;
    ctx.week_remaining_available = ctx.week_remaining_available.saturating_sub(duration);
    match stream {
        Stream::Theory => ctx.week_theory_minutes += duration,
        Stream::Cases => ctx.week_cases_minutes += duration,
        Stream::Programming => ctx.week_programming_minutes += duration,
    }
    if activity == Activity::StudyTheme {
        ctx.study_theme_today += duration;
        if ctx.today_unit.is_none() {
            ctx.today_unit = selection.unit;
        }
    }

    tracker.add(stream, duration);
    totals.add(stream, duration);
}

/// Monday-anchored weekly totals for presentation.
fn build_week_summaries(days: &[DayPlan]) -> Vec<WeekSummary> {
    let mut grouped: BTreeMap<NaiveDate, (u32, BTreeMap<Phase, u32>)> = BTreeMap::new();

    for day in days {
        let entry = grouped.entry(monday_of_week(day.date)).or_default();
        for block in &day.blocks {
            entry.0 += block.duration_minutes;
            *entry.1.entry(block.phase).or_insert(0) += block.duration_minutes;
        }
    }

    grouped
        .into_iter()
        .map(|(week_start, (minutes, minutes_per_phase))| WeekSummary {
            week_start,
            total_hours: minutes as f64 / 60.0,
            minutes_per_phase,
        })
        .collect()
}

fn build_explanations(capacity: &PlanCapacity, totals: &StreamTotals) -> Vec<String> {
    let mut lines = vec![
        format!(
            "Plan de {} semanas hasta el examen; las {} últimas quedan reservadas para repaso libre y simulacros.",
            capacity.total_weeks,
            PlanningDefaults::RESERVE_WEEKS
        ),
        format!(
            "Reparto programado: {} min de teoría, {} min de casos prácticos y {} min de programación didáctica.",
            capacity.theory_planned, capacity.cases_planned, capacity.programming_planned
        ),
    ];

    lines.push(match capacity.buffer_status {
        CoverageStatus::Good => format!(
            "Tu disponibilidad ({} min) cubre el temario con un margen cómodo.",
            capacity.available_effective_minutes
        ),
        CoverageStatus::Edge => format!(
            "Tu disponibilidad ({} min) cubre el temario con un margen justo: evita saltarte sesiones.",
            capacity.available_effective_minutes
        ),
        CoverageStatus::Warning => format!(
            "Tu disponibilidad ({} min) no llega al total programado; el plan prioriza por proporción restante.",
            capacity.available_effective_minutes
        ),
    });

    if totals.total() > 0 {
        lines.push(format!(
            "Minutos planificados en esta pasada: {} ({} de teoría, {} de casos, {} de programación).",
            totals.total(),
            totals.theory,
            totals.cases,
            totals.programming
        ));
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn options() -> GenerateOptions {
        GenerateOptions::with_today(date("2026-01-01"))
    }

    #[test]
    fn test_plan_spans_today_to_exam_exclusive() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        assert_eq!(plan.days.len(), 70);
        assert_eq!(plan.days[0].date, date("2026-01-01"));
        assert_eq!(plan.days.last().unwrap().date, date("2026-03-11"));
    }

    #[test]
    fn test_reserve_weeks_get_no_blocks() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        // 8 effective weeks of 7 days; everything after is reserve
        for day in &plan.days[56..] {
            assert!(day.blocks.is_empty(), "reserve day {} has blocks", day.date);
        }
        assert!(plan.days[..56].iter().any(|d| !d.blocks.is_empty()));
    }

    #[test]
    fn test_zero_availability_days_stay_empty() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        for day in &plan.days {
            // weekday: 0 = Sunday, 6 = Saturday
            if day.weekday == 0 || day.weekday == 6 {
                assert!(day.blocks.is_empty(), "weekend day {} has blocks", day.date);
            }
        }
    }

    #[test]
    fn test_degenerate_inputs_yield_empty_plan() {
        let mut inputs = baseline_inputs();
        inputs.weekly_availability = [0.0; 7];
        let plan = generate_plan(&inputs, &options()).unwrap();
        assert!(plan.days.iter().all(|d| d.blocks.is_empty()));
        assert_eq!(plan.debug.as_ref().unwrap().total_scheduled, 0);

        inputs = baseline_inputs();
        inputs.exam_date = date("2025-06-01");
        let plan = generate_plan(&inputs, &options()).unwrap();
        assert!(plan.days.is_empty());
        assert_eq!(plan.debug.as_ref().unwrap().total_scheduled, 0);
    }

    #[test]
    fn test_sub_minimum_days_stay_empty() {
        let mut inputs = baseline_inputs();
        // 0.2 h = 12 min, below the minimum block
        inputs.weekly_availability = [0.2; 7];
        let plan = generate_plan(&inputs, &options()).unwrap();
        assert!(plan.days.iter().all(|d| d.blocks.is_empty()));
    }

    #[test]
    fn test_short_day_single_block_fills_day() {
        let mut inputs = baseline_inputs();
        inputs.weekly_availability = [0.75, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0];
        let plan = generate_plan(&inputs, &options()).unwrap();
        let mondays: Vec<&DayPlan> =
            plan.days.iter().filter(|d| !d.blocks.is_empty()).collect();
        assert!(!mondays.is_empty());
        for day in mondays {
            assert_eq!(day.blocks.len(), 1);
            assert_eq!(day.blocks[0].duration_minutes, 45);
        }
    }

    #[test]
    fn test_block_ids_are_deterministic_and_unique() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        let ids: Vec<&str> = plan.blocks().map(|b| b.id.as_str()).collect();
        let unique: std::collections::HashSet<&str> = ids.iter().copied().collect();
        assert_eq!(ids.len(), unique.len());

        let first = &plan.days[0].blocks[0];
        assert_eq!(first.id, "2026-01-01__0__STUDY_THEME__Unidad 1");
    }

    #[test]
    fn test_programming_blocks_carry_label() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        for block in plan.blocks() {
            match block.activity {
                Activity::ProgrammingBlock => {
                    assert_eq!(block.unit.as_deref(), Some(PROGRAMMING_UNIT_LABEL));
                },
                Activity::CasePractice | Activity::CaseMock => assert!(block.unit.is_none()),
                _ => assert!(block.unit.as_deref().unwrap_or("").starts_with("Unidad ")),
            }
        }
    }

    #[test]
    fn test_week_summaries_are_monday_anchored() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        for summary in &plan.weekly_summaries {
            assert_eq!(monday_of_week(summary.week_start), summary.week_start);
        }
        let total_from_weeks: f64 = plan.weekly_summaries.iter().map(|w| w.total_hours).sum();
        let total_from_days: f64 = plan.days.iter().map(|d| d.total_hours).sum();
        assert!((total_from_weeks - total_from_days).abs() < 1e-9);
    }

    #[test]
    fn test_debug_totals_are_consistent() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        let debug = plan.debug.as_ref().unwrap();
        assert_eq!(
            debug.theory_scheduled + debug.cases_scheduled + debug.programming_scheduled,
            debug.total_scheduled
        );
        assert_eq!(debug.total_scheduled, plan.total_scheduled_minutes());
        assert_eq!(debug.theory_scheduled, plan.stream_minutes(Stream::Theory));
    }

    #[test]
    fn test_weekly_actuals_cover_horizon() {
        let plan = generate_plan(&baseline_inputs(), &options()).unwrap();
        let debug = plan.debug.as_ref().unwrap();
        // 70 days: 9 completed rolls + final partial
        assert_eq!(debug.weekly_actuals.len(), 10);
        assert_eq!(debug.weekly_actuals[0].week_index, 1);
        assert_eq!(debug.weekly_actuals.last().unwrap().week_index, 10);
        // Weeks 1-2 are theory-only
        assert_eq!(debug.weekly_actuals[0].cases_minutes, 0);
        assert_eq!(debug.weekly_actuals[1].programming_minutes, 0);
    }
}
