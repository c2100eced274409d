/*!
Block allocator: picks the next activity and its attribution unit.

Four cooperating selection stages, driven by a per-day context:
- Stage A (week >= 3): stream selection by greatest remaining ratio, with
  guardrails that prefer a stream starved the previous week
- Stage A' (week >= 3): weekly smoothing against the 60-minute per-stream
  floor, with end-of-week forcing in the order cases -> programming ->
  theory
- Stage B: theory selection under the daily STUDY_THEME cap, the today-unit
  lock, the start-next-unit threshold and interleaving into secondaries
- Stage C: cases split between practice and mock at the 0.7 practice target

Weeks 1 and 2 are theory-only; stages A/A' never run there.
*/

use crate::planner::PlanningDefaults;
use crate::types::{Activity, Stream};

use super::budget::{GlobalBudget, UnitBudget};

/// Weeks at the start of the plan that schedule nothing but theory.
const THEORY_ONLY_WEEKS: u32 = 2;

/// Week minutes under which end-of-week forcing kicks in.
const WEEK_TAIL_MINUTES: u32 = 120;

/// Mutable per-day view the allocator works against. Reset for every day;
/// weekly fields roll over in the generator.
#[derive(Debug, Clone)]
pub struct DayContext {
    /// 1-based week number, anchored at the planning origin.
    pub week_index: u32,
    pub available_today: u32,
    pub remaining_today: u32,
    /// Cumulative STUDY_THEME minutes scheduled today.
    pub study_theme_today: u32,
    /// Unit locked by the first STUDY_THEME block of the day, as an index
    /// into `GlobalBudget::units`.
    pub today_unit: Option<usize>,
    pub week_theory_minutes: u32,
    pub week_cases_minutes: u32,
    pub week_programming_minutes: u32,
    /// Availability left in the current 7-day window, today included.
    pub week_remaining_available: u32,
    pub last_week_cases: u32,
    pub last_week_programming: u32,
}

impl DayContext {
    pub fn week_minutes(&self, stream: Stream) -> u32 {
        match stream {
            Stream::Theory => self.week_theory_minutes,
            Stream::Cases => self.week_cases_minutes,
            Stream::Programming => self.week_programming_minutes,
        }
    }
}

/// The allocator's answer: what to schedule next and, for theory, which
/// unit the minutes belong to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub activity: Activity,
    /// Index into `GlobalBudget::units`; `None` for cases/programming.
    pub unit: Option<usize>,
}

/// Produce the next block selection, or `None` when nothing fits - which
/// ends the day's drain cleanly.
pub fn next_block(budget: &GlobalBudget, ctx: &DayContext) -> Option<Selection> {
    if ctx.week_index <= THEORY_ONLY_WEEKS {
        return theory_selection(budget, ctx);
    }

    if budget.theory_remaining == 0
        && budget.cases_remaining == 0
        && budget.programming_remaining == 0
    {
        return None;
    }

    match pick_stream(budget, ctx) {
        Stream::Theory => theory_selection(budget, ctx),
        Stream::Cases => Some(cases_selection(budget)),
        Stream::Programming => Some(Selection { activity: Activity::ProgrammingBlock, unit: None }),
    }
}

/// Stages A' + A: choose the stream for the next block (week >= 3 only).
pub fn pick_stream(budget: &GlobalBudget, ctx: &DayContext) -> Stream {
    // Forcing order for smoothing: cases -> programming -> theory.
    const FORCING_ORDER: [Stream; 3] = [Stream::Cases, Stream::Programming, Stream::Theory];

    // Stage A': streams under the weekly floor while workload remains.
    let missing: Vec<Stream> = FORCING_ORDER
        .iter()
        .copied()
        .filter(|&s| {
            ctx.week_minutes(s) < PlanningDefaults::WEEKLY_MINIMUM_MINUTES
                && budget.stream_remaining(s) > 0
        })
        .collect();

    if let Some(&first_missing) = missing.first() {
        if ctx.week_remaining_available < WEEK_TAIL_MINUTES {
            return first_missing;
        }

        // Force a missing stream only when it is also the least-scheduled
        // one this week (ties resolve in forcing order).
        let mut least = FORCING_ORDER[0];
        for &stream in &FORCING_ORDER[1..] {
            if ctx.week_minutes(stream) < ctx.week_minutes(least) {
                least = stream;
            }
        }
        if missing.contains(&least) {
            return least;
        }
    }

    // Stage A guardrails: a stream that got nothing last week goes first.
    if ctx.last_week_cases == 0 && budget.cases_remaining > 0 {
        return Stream::Cases;
    }
    if ctx.last_week_programming == 0 && budget.programming_remaining > 0 {
        return Stream::Programming;
    }

    // Stage A: greatest remaining ratio; ties theory > cases > programming.
    let mut best = Stream::Theory;
    for stream in [Stream::Cases, Stream::Programming] {
        if budget.remaining_ratio(stream) > budget.remaining_ratio(best) {
            best = stream;
        }
    }
    best
}

/// Daily STUDY_THEME cap: half the day from 240 minutes up, otherwise at
/// most 120 minutes.
pub fn daily_study_theme_cap(available: u32) -> u32 {
    if available >= 240 { available / 2 } else { available.min(120) }
}

/// Stage B: theory selection.
fn theory_selection(budget: &GlobalBudget, ctx: &DayContext) -> Option<Selection> {
    let cap = daily_study_theme_cap(ctx.available_today);
    let cap_headroom = cap.saturating_sub(ctx.study_theme_today);
    let primary = find_primary_unit(budget, ctx);

    // The cap needs at least one minimum block of headroom; below that the
    // day switches to secondary activities.
    if cap_headroom < PlanningDefaults::MIN_BLOCK_DURATION || primary.is_none() {
        return secondary_selection(budget, ctx);
    }

    Some(Selection { activity: Activity::StudyTheme, unit: primary })
}

/// First unit eligible for STUDY_THEME: has remaining minutes, is unit 1
/// or its predecessor crossed the start-next-unit threshold, and respects
/// the today-unit lock.
fn find_primary_unit(budget: &GlobalBudget, ctx: &DayContext) -> Option<usize> {
    for (i, unit) in budget.units.iter().enumerate() {
        if unit.remaining.study_theme == 0 {
            continue;
        }
        if i > 0
            && budget.units[i - 1].study_theme_done < PlanningDefaults::START_NEXT_UNIT_THRESHOLD
        {
            continue;
        }
        if let Some(locked) = ctx.today_unit {
            if locked != i {
                continue;
            }
        }
        return Some(i);
    }
    None
}

/// Pick a secondary activity. With two or more active units, interleave
/// into a unit other than today's; otherwise stay on today's unit (or the
/// first active one).
fn secondary_selection(budget: &GlobalBudget, ctx: &DayContext) -> Option<Selection> {
    let active: Vec<usize> = budget
        .units
        .iter()
        .enumerate()
        .filter(|(i, u)| u.is_active() || ctx.today_unit == Some(*i))
        .map(|(i, _)| i)
        .collect();

    if active.len() >= 2 {
        for &i in &active {
            if ctx.today_unit == Some(i) {
                continue;
            }
            if let Some(activity) = secondary_for_unit(&budget.units[i]) {
                return Some(Selection { activity, unit: Some(i) });
            }
        }
    }

    let target = ctx.today_unit.or_else(|| active.first().copied())?;
    let activity = secondary_for_unit(&budget.units[target])?;
    Some(Selection { activity, unit: Some(target) })
}

/// Secondary precedence for one unit: REVIEW once the unit's STUDY_THEME
/// is complete, then the first of PODCAST, FLASHCARD, QUIZ with remaining
/// minutes.
fn secondary_for_unit(unit: &UnitBudget) -> Option<Activity> {
    if unit.study_theme_done >= PlanningDefaults::STUDY_THEME_COMPLETE_THRESHOLD
        && unit.remaining.review > 0
    {
        return Some(Activity::Review);
    }
    if unit.remaining.podcast > 0 {
        return Some(Activity::Podcast);
    }
    if unit.remaining.flashcard > 0 {
        return Some(Activity::Flashcard);
    }
    if unit.remaining.quiz > 0 {
        return Some(Activity::Quiz);
    }
    None
}

/// Stage C: split cases between practice and mock at the 0.7 target.
fn cases_selection(budget: &GlobalBudget) -> Selection {
    // Integer form of: practice_scheduled < 0.7 * cases_planned
    let activity = if budget.case_practice_scheduled * 10 < budget.cases_planned * 7 {
        Activity::CasePractice
    } else {
        Activity::CaseMock
    };
    Selection { activity, unit: None }
}
