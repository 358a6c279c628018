use chrono::NaiveDate;
use log::debug;

use crate::models::{GeneratedInstance, RecurrencePattern, RecurringTaskInstance};
use crate::recurrence::RecurrenceManager;

/// Configuration for materialization behavior
#[derive(Debug, Clone)]
pub struct MaterializationConfig {
    /// Limit for batch materialization operations
    pub max_batch_size: usize,
}

impl Default for MaterializationConfig {
    fn default() -> Self {
        Self { max_batch_size: 100 }
    }
}

/// MaterializationPolicy: decides when a recurring task is due for a new
/// concrete instance.
///
/// Responsibilities:
/// 1. Compare the existing instance set against the pattern's termination
/// 2. Determine whether the next occurrence has become due
/// 3. Stay idempotent: repeated checks with the same inputs agree, and the
///    answer flips to `false` as soon as the due instance is materialized
///    and included in the input
///
/// The policy holds no state about instances; at-most-once creation under
/// racing callers is the storage collaborator's job (uniqueness on
/// `(parentTaskId, occurrenceNumber)`).
#[derive(Debug, Clone)]
pub struct MaterializationPolicy {
    config: MaterializationConfig,
}

impl MaterializationPolicy {
    pub fn new(config: MaterializationConfig) -> Self {
        Self { config }
    }

    pub fn with_defaults() -> Self {
        Self::new(MaterializationConfig::default())
    }

    pub fn config(&self) -> &MaterializationConfig {
        &self.config
    }

    pub fn update_config(&mut self, config: MaterializationConfig) {
        self.config = config;
    }

    /// Decides whether a new instance should be created for the pattern.
    ///
    /// # Arguments
    /// * `existing` - Every instance already materialized for this task
    /// * `pattern` - The task's recurrence pattern
    /// * `check_date` - The caller's notion of "now"
    ///
    /// # Behavior
    /// Rules are checked in order; the first failing rule short-circuits
    /// to `false`:
    /// 1. The pattern's occurrence cap is already reached
    /// 2. `check_date` is past the pattern's end date
    /// 3. No instances exist yet: the first occurrence is always due
    /// 4. Otherwise the next occurrence computed from the latest existing
    ///    due date must have arrived (`check_date >= next_due`)
    pub fn should_generate_instance(
        &self,
        existing: &[RecurringTaskInstance],
        pattern: &RecurrencePattern,
        check_date: NaiveDate,
    ) -> bool {
        if let Some(max) = pattern.termination.max_occurrences() {
            if existing.len() >= max as usize {
                debug!("occurrence cap {} reached; nothing to materialize", max);
                return false;
            }
        }

        if let Some(until) = pattern.termination.end_date() {
            if check_date > until {
                debug!("pattern ended {}; nothing to materialize", until);
                return false;
            }
        }

        let Some(last) = existing.iter().max_by_key(|instance| instance.due_date) else {
            return true;
        };

        let next_due = RecurrenceManager::new(pattern.clone()).next_occurrence(last.due_date);
        check_date >= next_due
    }

    /// Enumerates the occurrences inside a window, capped at the configured
    /// batch size. Convenience for callers refreshing a lookahead window.
    pub fn due_window(
        &self,
        pattern: &RecurrencePattern,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Vec<GeneratedInstance> {
        RecurrenceManager::new(pattern.clone()).occurrences_between(
            start,
            end,
            self.config.max_batch_size,
        )
    }
}
