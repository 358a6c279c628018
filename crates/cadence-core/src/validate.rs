use serde::Serialize;

use crate::models::{Frequency, PatternRecord};

/// Outcome of checking a pattern record against the rule invariants.
///
/// Validation never fails as an operation: every violation is collected as
/// a message so a form layer can render all of them at once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Checks a stored pattern record for internal consistency.
///
/// # Behavior
/// - Collect every violated invariant as one error string; order is not
///   significant
/// - Frequency-conditional checks only fire for the frequency that owns
///   the field (a stray `dayOfMonth` on a weekly record is ignored)
/// - A record that fails validation must not be handed to the calculator;
///   conversion to [`RecurrencePattern`](crate::models::RecurrencePattern)
///   enforces this
pub fn validate_record(record: &PatternRecord) -> ValidationReport {
    let mut errors = Vec::new();

    let frequency = record.frequency.parse::<Frequency>().ok();
    if frequency.is_none() {
        errors.push(format!(
            "frequency must be one of daily, weekly, monthly, yearly, custom (got \"{}\")",
            record.frequency
        ));
    }

    if record.interval < 1 {
        errors.push("interval must be at least 1".to_string());
    }

    if frequency == Some(Frequency::Weekly) {
        if let Some(days) = &record.days_of_week {
            if days.iter().any(|day| !(0..=6).contains(day)) {
                errors.push("daysOfWeek values must be between 0 (Sunday) and 6 (Saturday)".to_string());
            }
        }
    }

    if frequency == Some(Frequency::Monthly) {
        if let Some(day) = record.day_of_month {
            if !(1..=31).contains(&day) {
                errors.push("dayOfMonth must be between 1 and 31".to_string());
            }
        }
    }

    if frequency == Some(Frequency::Yearly) {
        if let Some(month) = record.month_of_year {
            if !(1..=12).contains(&month) {
                errors.push("monthOfYear must be between 1 and 12".to_string());
            }
        }
    }

    if frequency == Some(Frequency::Custom) {
        if let Some(offsets) = &record.custom_days {
            if offsets.iter().any(|offset| *offset < 1) {
                errors.push("customDays values must be at least 1".to_string());
            }
        }
    }

    if record.end_date.is_some() && record.max_occurrences.is_some() {
        errors.push("endDate and maxOccurrences are mutually exclusive".to_string());
    }

    ValidationReport::from_errors(errors)
}
