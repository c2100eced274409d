use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Exam stage the student is preparing for.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum Stage {
    Infantil,
    Primaria,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum StudentType {
    New,
    Repeat,
}

/// User-provided planning inputs, immutable for the duration of a run.
///
/// `weekly_availability` holds hours per weekday, index 0 = Monday through
/// index 6 = Sunday. Fractions are allowed; values are converted to whole
/// minutes once per day during planning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FormInputs {
    pub exam_date: NaiveDate,
    pub weekly_availability: [f64; 7],
    pub presented_before: bool,
    pub already_studying: bool,
    pub region: String,
    pub stage: Stage,
    /// Number of curriculum units: 15, 20 or 25. Defaults to 20.
    #[serde(default)]
    pub theme_count: Option<u8>,
    /// Whether the programming stream should receive planned minutes.
    /// Defaults to true.
    #[serde(default)]
    pub plan_programming: Option<bool>,
    #[serde(default)]
    pub student_type: Option<StudentType>,
}

impl FormInputs {
    pub fn units_count(&self) -> u32 {
        self.theme_count.map(u32::from).unwrap_or(crate::planner::PlanningDefaults::UNIT_COUNT)
    }

    pub fn plans_programming(&self) -> bool {
        self.plan_programming.unwrap_or(true)
    }
}

/// Options for plan generation. `today` pins the planning origin for
/// deterministic testing; when absent the system's local date is used.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq)]
pub struct GenerateOptions {
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

impl GenerateOptions {
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_units_count_default() {
        let json = r#"{
            "exam_date": "2026-03-12",
            "weekly_availability": [4, 4, 4, 4, 4, 0, 0],
            "presented_before": false,
            "already_studying": false,
            "region": "Madrid",
            "stage": "Primaria"
        }"#;
        let inputs: FormInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.units_count(), 20);
        assert!(inputs.plans_programming());
        assert_eq!(inputs.student_type, None);
    }

    #[test]
    fn test_explicit_theme_count() {
        let json = r#"{
            "exam_date": "2026-03-12",
            "weekly_availability": [2, 2, 2, 2, 2, 3, 0],
            "presented_before": true,
            "already_studying": true,
            "region": "Andalucía",
            "stage": "Infantil",
            "theme_count": 25,
            "plan_programming": false,
            "student_type": "repeat"
        }"#;
        let inputs: FormInputs = serde_json::from_str(json).unwrap();
        assert_eq!(inputs.units_count(), 25);
        assert!(!inputs.plans_programming());
        assert_eq!(inputs.student_type, Some(StudentType::Repeat));
    }
}
