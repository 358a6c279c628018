use chrono::{Datelike, Duration, NaiveDate};
use std::collections::BTreeSet;

use crate::models::{GeneratedInstance, RecurrencePattern, Rule};

/// Conventional cap on instances produced by a single enumeration pass.
pub const DEFAULT_MAX_INSTANCES: usize = 100;

/// RecurrenceManager: occurrence calculation for a single pattern.
///
/// Responsibilities:
/// 1. Compute the single next occurrence after an anchor date
/// 2. Enumerate occurrences inside a bounded window
/// 3. Preview upcoming occurrences for display
/// 4. Honor the pattern's own termination (end date or occurrence cap)
///
/// Every method is a pure function of the pattern and its arguments:
/// no clock reads, no I/O, identical inputs always produce identical
/// output.
#[derive(Debug, Clone)]
pub struct RecurrenceManager {
    pattern: RecurrencePattern,
}

impl RecurrenceManager {
    pub fn new(pattern: RecurrencePattern) -> Self {
        Self { pattern }
    }

    pub fn pattern(&self) -> &RecurrencePattern {
        &self.pattern
    }

    /// Computes the next occurrence strictly after the anchor date.
    ///
    /// # Arguments
    /// * `from` - Anchor date the step is taken from
    ///
    /// # Returns
    /// * `NaiveDate` - The next occurrence; always later than `from`
    ///
    /// # Behavior
    /// - Daily: advance `interval` days
    /// - Weekly without day selection: advance `interval` whole weeks
    /// - Weekly with day selection: the nearest selected day later in the
    ///   anchor's own week wins and the interval is not consumed; once the
    ///   week is exhausted, wrap to the first selected day `interval`
    ///   weeks ahead. A multi-day rule visits every selected day before
    ///   skipping cycles.
    /// - Monthly: advance `interval` months, then pin the configured day,
    ///   clamping into short months (Jan 31 + 1 month lands on the last
    ///   day of February, never in March)
    /// - Yearly: advance `interval` years, pinning month and day when
    ///   configured, with the same clamping
    /// - Custom: advance by the first configured offset
    pub fn next_occurrence(&self, from: NaiveDate) -> NaiveDate {
        let interval = self.pattern.interval.max(1);

        match &self.pattern.rule {
            Rule::Daily => add_days(from, i64::from(interval)),
            Rule::Weekly { days_of_week } => match days_of_week.iter().next() {
                None => add_days(from, 7 * i64::from(interval)),
                Some(&first) => next_selected_weekday(from, days_of_week, first, interval),
            },
            Rule::Monthly { day_of_month } => {
                let (year, month) = month_after(from, interval);
                match day_of_month {
                    Some(day) => clamped_date(year, month, *day),
                    None => clamped_date(year, month, from.day()),
                }
            }
            Rule::Yearly {
                month_of_year,
                day_of_month,
            } => match month_of_year {
                Some(month) => clamped_date(
                    from.year().saturating_add(interval as i32),
                    *month,
                    (*day_of_month).unwrap_or(from.day()),
                ),
                None => {
                    let (year, month) = month_after(from, 12 * interval);
                    clamped_date(year, month, from.day())
                }
            },
            Rule::Custom { offsets } => {
                // Only the first offset is consumed; the configured tail is
                // currently ignored.
                let offset = offsets.first().copied().unwrap_or(i64::from(interval));
                add_days(from, offset.max(1))
            }
        }
    }

    /// Enumerates every occurrence inside a window, eagerly.
    ///
    /// # Arguments
    /// * `start` - First candidate date; emitted as occurrence 1
    /// * `end` - Inclusive end of the window
    /// * `max_instances` - Hard cap on the number of emitted instances
    ///   (conventionally [`DEFAULT_MAX_INSTANCES`])
    ///
    /// # Behavior
    /// - The pattern's own occurrence cap tightens `max_instances`
    /// - Stops before emitting once the current date passes the pattern's
    ///   end date, even when the window extends further
    /// - Occurrence numbers are 1-based sequence positions
    pub fn occurrences_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        max_instances: usize,
    ) -> Vec<GeneratedInstance> {
        let cap = self.instance_cap(max_instances);
        let mut instances = Vec::new();
        let mut current = start;
        let mut occurrence_number: u32 = 1;

        while current <= end && instances.len() < cap {
            if self.past_pattern_end(current) {
                break;
            }
            instances.push(GeneratedInstance {
                due_date: current,
                occurrence_number,
                is_valid: true,
            });
            current = self.next_occurrence(current);
            occurrence_number += 1;
        }

        instances
    }

    /// Previews the next `count` occurrences starting at `from`.
    ///
    /// Same enumeration as [`occurrences_between`](Self::occurrences_between)
    /// without a window bound; the pattern's termination still applies. The
    /// caller supplies its notion of "now" as `from`.
    pub fn preview_occurrences(&self, from: NaiveDate, count: usize) -> Vec<GeneratedInstance> {
        let cap = self.instance_cap(count);
        let mut instances = Vec::with_capacity(cap);
        let mut current = from;
        let mut occurrence_number: u32 = 1;

        while instances.len() < cap {
            if self.past_pattern_end(current) {
                break;
            }
            instances.push(GeneratedInstance {
                due_date: current,
                occurrence_number,
                is_valid: true,
            });
            current = self.next_occurrence(current);
            occurrence_number += 1;
        }

        instances
    }

    fn instance_cap(&self, requested: usize) -> usize {
        match self.pattern.termination.max_occurrences() {
            Some(max) => requested.min(max as usize),
            None => requested,
        }
    }

    fn past_pattern_end(&self, current: NaiveDate) -> bool {
        self.pattern
            .termination
            .end_date()
            .is_some_and(|until| current > until)
    }
}

/// Nearest selected day later in the anchor's week, or the first selected
/// day `interval` cycles ahead once the week is exhausted.
fn next_selected_weekday(
    from: NaiveDate,
    days: &BTreeSet<u8>,
    first: u8,
    interval: u32,
) -> NaiveDate {
    let current = from.weekday().num_days_from_sunday() as u8;
    match days.iter().find(|&&day| day > current) {
        Some(&day) => add_days(from, i64::from(day - current)),
        None => add_days(
            from,
            7 - i64::from(current) + i64::from(first) + 7 * (i64::from(interval) - 1),
        ),
    }
}

/// Target (year, month) after stepping a number of calendar months.
fn month_after(from: NaiveDate, months: u32) -> (i32, u32) {
    let total = i64::from(from.year()) * 12 + i64::from(from.month0()) + i64::from(months);
    let year = total
        .div_euclid(12)
        .clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
    let month = total.rem_euclid(12) as u32 + 1;
    (year, month)
}

/// Builds a date from parts, clamping the day into the target month and the
/// month into the calendar year.
fn clamped_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    let day = day.clamp(1, days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MAX)
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year.saturating_add(1), 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day())
        .unwrap_or(28)
}

/// Day arithmetic that saturates at the calendar's representable bounds.
fn add_days(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days))
        .unwrap_or(NaiveDate::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrencePattern;

    fn date(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn manager(pattern: RecurrencePattern) -> RecurrenceManager {
        RecurrenceManager::new(pattern)
    }

    mod next_occurrence_tests {
        use super::*;

        #[test]
        fn test_daily_steps_by_interval() {
            let m = manager(RecurrencePattern::daily(1));
            assert_eq!(m.next_occurrence(date(2024, 3, 10)), date(2024, 3, 11));

            let m = manager(RecurrencePattern::daily(4));
            assert_eq!(m.next_occurrence(date(2024, 3, 10)), date(2024, 3, 14));
        }

        #[test]
        fn test_daily_crosses_month_and_year_boundaries() {
            let m = manager(RecurrencePattern::daily(1));
            assert_eq!(m.next_occurrence(date(2023, 12, 31)), date(2024, 1, 1));
        }

        #[test]
        fn test_weekly_without_selection_steps_whole_weeks() {
            let m = manager(RecurrencePattern::weekly(1, []));
            assert_eq!(m.next_occurrence(date(2024, 1, 1)), date(2024, 1, 8));

            let m = manager(RecurrencePattern::weekly(3, []));
            assert_eq!(m.next_occurrence(date(2024, 1, 1)), date(2024, 1, 22));
        }

        #[test]
        fn test_weekly_selection_visits_every_day_before_wrapping() {
            // 2024-01-01 is a Monday.
            let m = manager(RecurrencePattern::weekly(1, [1, 3, 5]));

            let wednesday = m.next_occurrence(date(2024, 1, 1));
            assert_eq!(wednesday, date(2024, 1, 3));

            let friday = m.next_occurrence(wednesday);
            assert_eq!(friday, date(2024, 1, 5));

            let next_monday = m.next_occurrence(friday);
            assert_eq!(next_monday, date(2024, 1, 8));
        }

        #[test]
        fn test_weekly_interval_applies_only_on_wrap() {
            // Within the week the interval is ignored; wrapping from Friday
            // skips ahead a full extra cycle.
            let m = manager(RecurrencePattern::weekly(2, [1, 3, 5]));

            assert_eq!(m.next_occurrence(date(2024, 1, 1)), date(2024, 1, 3));
            assert_eq!(m.next_occurrence(date(2024, 1, 3)), date(2024, 1, 5));
            assert_eq!(m.next_occurrence(date(2024, 1, 5)), date(2024, 1, 15));
        }

        #[test]
        fn test_weekly_from_unselected_day_picks_next_selected() {
            // 2024-01-02 is a Tuesday; the set selects Mon and Fri.
            let m = manager(RecurrencePattern::weekly(1, [1, 5]));
            assert_eq!(m.next_occurrence(date(2024, 1, 2)), date(2024, 1, 5));
        }

        #[test]
        fn test_weekly_from_saturday_wraps_to_sunday_selection() {
            // 2024-01-06 is a Saturday; only Sunday (0) is selected, so the
            // next occurrence is the following Sunday.
            let m = manager(RecurrencePattern::weekly(1, [0]));
            assert_eq!(m.next_occurrence(date(2024, 1, 6)), date(2024, 1, 7));
        }

        #[test]
        fn test_monthly_clamps_to_short_month() {
            let m = manager(RecurrencePattern::monthly(1, Some(31)));
            // 2024 is a leap year: the clamp lands on Feb 29, not in March.
            assert_eq!(m.next_occurrence(date(2024, 1, 31)), date(2024, 2, 29));
        }

        #[test]
        fn test_monthly_clamps_in_non_leap_year() {
            let m = manager(RecurrencePattern::monthly(1, Some(31)));
            assert_eq!(m.next_occurrence(date(2023, 1, 31)), date(2023, 2, 28));
        }

        #[test]
        fn test_monthly_recovers_pinned_day_after_clamp() {
            let m = manager(RecurrencePattern::monthly(1, Some(31)));
            assert_eq!(m.next_occurrence(date(2024, 2, 29)), date(2024, 3, 31));
        }

        #[test]
        fn test_monthly_advances_even_when_pinned_day_is_later_in_month() {
            // Day 31 from Jan 15 goes to February, not back to Jan 31.
            let m = manager(RecurrencePattern::monthly(1, Some(31)));
            assert_eq!(m.next_occurrence(date(2024, 1, 15)), date(2024, 2, 29));
        }

        #[test]
        fn test_monthly_without_day_keeps_anchor_day() {
            let m = manager(RecurrencePattern::monthly(1, None));
            assert_eq!(m.next_occurrence(date(2024, 3, 15)), date(2024, 4, 15));
        }

        #[test]
        fn test_monthly_without_day_clamps_anchor_day() {
            let m = manager(RecurrencePattern::monthly(1, None));
            assert_eq!(m.next_occurrence(date(2024, 1, 31)), date(2024, 2, 29));
        }

        #[test]
        fn test_monthly_interval_crosses_year_boundary() {
            let m = manager(RecurrencePattern::monthly(3, Some(15)));
            assert_eq!(m.next_occurrence(date(2024, 11, 15)), date(2025, 2, 15));
        }

        #[test]
        fn test_yearly_pins_month_and_day() {
            let m = manager(RecurrencePattern::yearly(1, Some(3), Some(14)));
            assert_eq!(m.next_occurrence(date(2024, 7, 1)), date(2025, 3, 14));
        }

        #[test]
        fn test_yearly_without_day_keeps_anchor_day() {
            let m = manager(RecurrencePattern::yearly(1, Some(6), None));
            assert_eq!(m.next_occurrence(date(2024, 2, 21)), date(2025, 6, 21));
        }

        #[test]
        fn test_yearly_without_month_keeps_anchor_date() {
            let m = manager(RecurrencePattern::yearly(2, None, None));
            assert_eq!(m.next_occurrence(date(2024, 5, 9)), date(2026, 5, 9));
        }

        #[test]
        fn test_yearly_clamps_leap_day() {
            let m = manager(RecurrencePattern::yearly(1, None, None));
            assert_eq!(m.next_occurrence(date(2024, 2, 29)), date(2025, 2, 28));
        }

        #[test]
        fn test_custom_consumes_first_offset_only() {
            let m = manager(RecurrencePattern::custom(1, vec![10, 3, 99]));
            assert_eq!(m.next_occurrence(date(2024, 1, 1)), date(2024, 1, 11));
            // The second offset is never reached; stepping again reuses the
            // first.
            assert_eq!(m.next_occurrence(date(2024, 1, 11)), date(2024, 1, 21));
        }

        #[test]
        fn test_custom_without_offsets_falls_back_to_interval_days() {
            let m = manager(RecurrencePattern::custom(5, Vec::new()));
            assert_eq!(m.next_occurrence(date(2024, 1, 1)), date(2024, 1, 6));
        }
    }

    mod enumeration_tests {
        use super::*;

        #[test]
        fn test_emits_window_start_as_first_occurrence() {
            let m = manager(RecurrencePattern::daily(1));
            let instances = m.occurrences_between(date(2024, 1, 1), date(2024, 1, 3), 10);

            let due: Vec<NaiveDate> = instances.iter().map(|i| i.due_date).collect();
            assert_eq!(due, vec![date(2024, 1, 1), date(2024, 1, 2), date(2024, 1, 3)]);
            assert_eq!(
                instances.iter().map(|i| i.occurrence_number).collect::<Vec<_>>(),
                vec![1, 2, 3]
            );
            assert!(instances.iter().all(|i| i.is_valid));
        }

        #[test]
        fn test_occurrence_cap_bounds_the_window() {
            let pattern = RecurrencePattern::daily(1).with_max_occurrences(3);
            let m = manager(pattern);

            let instances = m.occurrences_between(date(2024, 1, 1), date(2024, 12, 31), 500);
            assert_eq!(instances.len(), 3);
        }

        #[test]
        fn test_requested_cap_bounds_the_window() {
            let m = manager(RecurrencePattern::daily(1));
            let instances = m.occurrences_between(date(2024, 1, 1), date(2024, 12, 31), 5);
            assert_eq!(instances.len(), 5);
        }

        #[test]
        fn test_pattern_end_date_stops_before_window_end() {
            let pattern = RecurrencePattern::daily(1).with_end_date(date(2024, 1, 4));
            let m = manager(pattern);

            let instances = m.occurrences_between(date(2024, 1, 1), date(2024, 1, 31), 100);
            assert_eq!(instances.len(), 4);
            assert_eq!(instances.last().map(|i| i.due_date), Some(date(2024, 1, 4)));
        }

        #[test]
        fn test_empty_window_emits_nothing() {
            let m = manager(RecurrencePattern::daily(1));
            assert!(m
                .occurrences_between(date(2024, 2, 1), date(2024, 1, 1), 100)
                .is_empty());
        }

        #[test]
        fn test_preview_stops_strictly_at_count() {
            let m = manager(RecurrencePattern::weekly(1, [1, 3, 5]));
            let instances = m.preview_occurrences(date(2024, 1, 1), 4);

            let due: Vec<NaiveDate> = instances.iter().map(|i| i.due_date).collect();
            assert_eq!(
                due,
                vec![date(2024, 1, 1), date(2024, 1, 3), date(2024, 1, 5), date(2024, 1, 8)]
            );
        }

        #[test]
        fn test_preview_honors_pattern_termination() {
            let pattern = RecurrencePattern::daily(1).with_max_occurrences(2);
            let m = manager(pattern);
            assert_eq!(m.preview_occurrences(date(2024, 1, 1), 10).len(), 2);
        }
    }
}
