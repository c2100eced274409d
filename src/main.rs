//! Oposiplan - deterministic study plans for oposiciones
//!
//! Reads planning inputs as JSON (file argument or stdin), optionally a
//! feedback-event file, and prints the generated plan as JSON.

use std::fs;
use std::io::Read;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use oposiplan::types::{FeedbackEvent, FormInputs, GenerateOptions};
use oposiplan::{apply_feedback_events, calculate_capacity, derive_initial_state};

/// Runtime configuration for the demo binary.
///
/// Load from environment with `RunConfig::from_env()`.
#[derive(Debug, Clone)]
struct RunConfig {
    /// Planning origin override (OPOSIPLAN_TODAY, ISO date). Defaults to
    /// the system's local date.
    today: Option<NaiveDate>,
    /// Compact JSON output instead of pretty (OPOSIPLAN_COMPACT=1).
    compact: bool,
}

impl RunConfig {
    fn from_env() -> Result<Self> {
        let today = match std::env::var("OPOSIPLAN_TODAY") {
            Ok(value) if !value.is_empty() => {
                Some(value.parse().context("OPOSIPLAN_TODAY is not a valid ISO date")?)
            },
            _ => None,
        };
        let compact = std::env::var("OPOSIPLAN_COMPACT").is_ok_and(|v| v == "1");
        Ok(Self { today, compact })
    }
}

fn read_inputs(path: Option<&str>) -> Result<FormInputs> {
    let raw = match path {
        Some(path) => fs::read_to_string(path).with_context(|| format!("reading {path}"))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin().read_to_string(&mut buffer).context("reading stdin")?;
            buffer
        },
    };
    serde_json::from_str(&raw).context("parsing planning inputs")
}

fn read_events(path: &str) -> Result<Vec<FeedbackEvent>> {
    let raw = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    serde_json::from_str(&raw).context("parsing feedback events")
}

fn main() -> Result<()> {
    env_logger::init();

    let config = RunConfig::from_env()?;
    let mut args = std::env::args().skip(1);
    let inputs_path = args.next();
    let events_path = args.next();

    let inputs = read_inputs(inputs_path.as_deref())?;
    let options = GenerateOptions { today: config.today };

    log::info!(
        "Planning for exam on {} ({} units, stage {:?})",
        inputs.exam_date,
        inputs.units_count(),
        inputs.stage
    );

    let today = config.today.unwrap_or_else(|| chrono::Local::now().date_naive());
    let capacity = calculate_capacity(&inputs, today);
    let mut state = derive_initial_state(&inputs, &capacity, today);

    if let Some(path) = events_path.as_deref() {
        let events = read_events(path)?;
        log::info!("Applying {} feedback events", events.len());
        state = apply_feedback_events(&state, &events);
    }

    let plan = oposiplan::generate_plan_from_state(&inputs, &state, &options)?;

    let rendered = if config.compact {
        serde_json::to_string(&plan)?
    } else {
        serde_json::to_string_pretty(&plan)?
    };
    println!("{rendered}");

    Ok(())
}
