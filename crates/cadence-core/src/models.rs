use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::error::CoreError;

/// Unit of repetition for a recurrence pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frequency {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Custom,
}

impl Frequency {
    /// All known frequency names, in wire order.
    pub const NAMES: [&'static str; 5] = ["daily", "weekly", "monthly", "yearly", "custom"];
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Daily => write!(f, "daily"),
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Yearly => write!(f, "yearly"),
            Frequency::Custom => write!(f, "custom"),
        }
    }
}

impl FromStr for Frequency {
    type Err = ParseFrequencyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Frequency::Daily),
            "weekly" => Ok(Frequency::Weekly),
            "monthly" => Ok(Frequency::Monthly),
            "yearly" => Ok(Frequency::Yearly),
            "custom" => Ok(Frequency::Custom),
            _ => Err(ParseFrequencyError(s.to_string())),
        }
    }
}

#[derive(Error, Debug, PartialEq)]
#[error("Invalid frequency: {0}")]
pub struct ParseFrequencyError(String);

/// When a pattern stops producing occurrences.
///
/// The variants are mutually exclusive by construction; the flat record
/// form enforces the same exclusion through validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The pattern repeats indefinitely.
    None,
    /// No occurrence is produced after this date.
    OnDate(NaiveDate),
    /// At most this many occurrences are produced.
    AfterCount(u32),
}

impl Termination {
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self {
            Termination::OnDate(date) => Some(*date),
            _ => None,
        }
    }

    pub fn max_occurrences(&self) -> Option<u32> {
        match self {
            Termination::AfterCount(count) => Some(*count),
            _ => None,
        }
    }
}

/// Frequency-specific rule data.
///
/// Each variant carries only the fields meaningful for its frequency, so a
/// weekly rule with a day-of-month is unrepresentable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rule {
    Daily,
    /// Weekday indices 0-6 with 0 = Sunday. An empty set means no day
    /// selection: the rule steps whole weeks from the anchor.
    Weekly { days_of_week: BTreeSet<u8> },
    /// Day 1-31; days past the end of a target month clamp to its last day.
    Monthly { day_of_month: Option<u32> },
    /// Month 1-12, day 1-31.
    Yearly {
        month_of_year: Option<u32>,
        day_of_month: Option<u32>,
    },
    /// Ordered day offsets from the anchor date.
    Custom { offsets: Vec<i64> },
}

/// A recurrence rule attached to a task.
///
/// Immutable value object: edits replace the whole pattern rather than
/// mutating it in place. The typed shape serializes as [`PatternRecord`],
/// so stored records are unaffected by the internal representation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PatternRecord", into = "PatternRecord")]
pub struct RecurrencePattern {
    pub rule: Rule,
    /// Step size in units of the frequency, at least 1.
    pub interval: u32,
    pub termination: Termination,
}

impl RecurrencePattern {
    fn new(rule: Rule, interval: u32) -> Self {
        Self {
            rule,
            interval: interval.max(1),
            termination: Termination::None,
        }
    }

    pub fn daily(interval: u32) -> Self {
        Self::new(Rule::Daily, interval)
    }

    pub fn weekly(interval: u32, days_of_week: impl IntoIterator<Item = u8>) -> Self {
        Self::new(
            Rule::Weekly {
                days_of_week: days_of_week.into_iter().collect(),
            },
            interval,
        )
    }

    pub fn monthly(interval: u32, day_of_month: Option<u32>) -> Self {
        Self::new(Rule::Monthly { day_of_month }, interval)
    }

    pub fn yearly(interval: u32, month_of_year: Option<u32>, day_of_month: Option<u32>) -> Self {
        Self::new(
            Rule::Yearly {
                month_of_year,
                day_of_month,
            },
            interval,
        )
    }

    pub fn custom(interval: u32, offsets: Vec<i64>) -> Self {
        Self::new(Rule::Custom { offsets }, interval)
    }

    /// Stops the pattern after the given date. Replaces any occurrence cap.
    pub fn with_end_date(mut self, end_date: NaiveDate) -> Self {
        self.termination = Termination::OnDate(end_date);
        self
    }

    /// Caps the pattern at the given occurrence count. Replaces any end date.
    pub fn with_max_occurrences(mut self, max_occurrences: u32) -> Self {
        self.termination = Termination::AfterCount(max_occurrences.max(1));
        self
    }

    pub fn frequency(&self) -> Frequency {
        match self.rule {
            Rule::Daily => Frequency::Daily,
            Rule::Weekly { .. } => Frequency::Weekly,
            Rule::Monthly { .. } => Frequency::Monthly,
            Rule::Yearly { .. } => Frequency::Yearly,
            Rule::Custom { .. } => Frequency::Custom,
        }
    }
}

/// Flat serialized form of a recurrence pattern.
///
/// This is the record shape the surrounding system stores alongside a task:
/// one struct with every optional field, camelCase keys, dates as ISO-8601.
/// Numeric fields are wide signed integers so out-of-range input still
/// deserializes and can be reported by the validator instead of failing at
/// the serde layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PatternRecord {
    pub frequency: String,
    pub interval: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_of_week: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_of_month: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month_of_year: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<Vec<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_occurrences: Option<i64>,
}

impl Default for PatternRecord {
    fn default() -> Self {
        Self {
            frequency: String::new(),
            interval: 1,
            days_of_week: None,
            day_of_month: None,
            month_of_year: None,
            custom_days: None,
            end_date: None,
            max_occurrences: None,
        }
    }
}

impl PatternRecord {
    /// Checks this record against the pattern invariants.
    pub fn validate(&self) -> crate::validate::ValidationReport {
        crate::validate::validate_record(self)
    }
}

impl TryFrom<PatternRecord> for RecurrencePattern {
    type Error = CoreError;

    fn try_from(record: PatternRecord) -> Result<Self, Self::Error> {
        let report = crate::validate::validate_record(&record);
        if !report.valid {
            return Err(CoreError::InvalidPattern(report.errors));
        }

        let frequency: Frequency = record
            .frequency
            .parse()
            .map_err(|e: ParseFrequencyError| CoreError::InvalidPattern(vec![e.to_string()]))?;

        let rule = match frequency {
            Frequency::Daily => Rule::Daily,
            Frequency::Weekly => Rule::Weekly {
                days_of_week: record
                    .days_of_week
                    .unwrap_or_default()
                    .into_iter()
                    .map(|day| day.clamp(0, 6) as u8)
                    .collect(),
            },
            Frequency::Monthly => Rule::Monthly {
                day_of_month: record.day_of_month.map(|day| day.clamp(1, 31) as u32),
            },
            Frequency::Yearly => Rule::Yearly {
                month_of_year: record.month_of_year.map(|month| month.clamp(1, 12) as u32),
                day_of_month: record.day_of_month.map(|day| day.clamp(1, 31) as u32),
            },
            Frequency::Custom => Rule::Custom {
                offsets: record.custom_days.unwrap_or_default(),
            },
        };

        let termination = match (record.end_date, record.max_occurrences) {
            (Some(date), _) => Termination::OnDate(date),
            (None, Some(count)) => {
                Termination::AfterCount(count.clamp(1, i64::from(u32::MAX)) as u32)
            }
            (None, None) => Termination::None,
        };

        Ok(Self {
            rule,
            interval: record.interval.clamp(1, i64::from(u32::MAX)) as u32,
            termination,
        })
    }
}

impl From<&RecurrencePattern> for PatternRecord {
    fn from(pattern: &RecurrencePattern) -> Self {
        let mut record = PatternRecord {
            frequency: pattern.frequency().to_string(),
            interval: i64::from(pattern.interval),
            ..PatternRecord::default()
        };

        match &pattern.rule {
            Rule::Daily => {}
            Rule::Weekly { days_of_week } => {
                if !days_of_week.is_empty() {
                    record.days_of_week =
                        Some(days_of_week.iter().map(|day| i64::from(*day)).collect());
                }
            }
            Rule::Monthly { day_of_month } => {
                record.day_of_month = (*day_of_month).map(i64::from);
            }
            Rule::Yearly {
                month_of_year,
                day_of_month,
            } => {
                record.month_of_year = (*month_of_year).map(i64::from);
                record.day_of_month = (*day_of_month).map(i64::from);
            }
            Rule::Custom { offsets } => {
                if !offsets.is_empty() {
                    record.custom_days = Some(offsets.clone());
                }
            }
        }

        match pattern.termination {
            Termination::None => {}
            Termination::OnDate(date) => record.end_date = Some(date),
            Termination::AfterCount(count) => record.max_occurrences = Some(i64::from(count)),
        }

        record
    }
}

impl From<RecurrencePattern> for PatternRecord {
    fn from(pattern: RecurrencePattern) -> Self {
        Self::from(&pattern)
    }
}

/// One occurrence produced by enumerating a pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneratedInstance {
    pub due_date: NaiveDate,
    /// 1-based position in the generated sequence.
    pub occurrence_number: u32,
    /// Whether the occurrence satisfied the rule at generation time.
    pub is_valid: bool,
}

impl GeneratedInstance {
    /// Builds the persistable instance record for this occurrence.
    ///
    /// The engine hands the result to the storage collaborator; it never
    /// reads an instance back except through
    /// [`MaterializationPolicy`](crate::materialize::MaterializationPolicy).
    pub fn into_task_instance(self, parent_task_id: Uuid) -> RecurringTaskInstance {
        RecurringTaskInstance {
            instance_id: Uuid::now_v7(),
            parent_task_id,
            due_date: self.due_date,
            occurrence_number: self.occurrence_number,
            completed: false,
            modified: false,
        }
    }
}

/// Materialized occurrence of a recurring task, owned by storage.
///
/// `parent_task_id` is a weak reference: the engine threads it through and
/// never dereferences it. Records are append-only; the engine only decides
/// whether a new one should exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecurringTaskInstance {
    pub instance_id: Uuid,
    pub parent_task_id: Uuid,
    pub due_date: NaiveDate,
    pub occurrence_number: u32,
    pub completed: bool,
    /// True once a user edits this occurrence independently of the pattern.
    pub modified: bool,
}
