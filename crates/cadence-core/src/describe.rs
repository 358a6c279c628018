use std::collections::BTreeSet;

use crate::models::{RecurrencePattern, Rule};

/// Short weekday names indexed by weekday number (0 = Sunday).
const WEEKDAY_NAMES: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Full month names indexed by month number minus one.
const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

/// Renders a pattern as display text, e.g. "Every 2 weeks on Mon, Wed".
///
/// Total: every pattern gets a string, with "Custom schedule" as the
/// generic fallback. Plain text only, fit for direct display.
pub fn describe(pattern: &RecurrencePattern) -> String {
    let interval = pattern.interval.max(1);

    match &pattern.rule {
        Rule::Daily => match interval {
            1 => "Daily".to_string(),
            n => format!("Every {} days", n),
        },
        Rule::Weekly { days_of_week } => describe_weekly(days_of_week, interval),
        Rule::Monthly { day_of_month } => describe_monthly(*day_of_month, interval),
        Rule::Yearly {
            month_of_year,
            day_of_month,
        } => describe_yearly(*month_of_year, *day_of_month, interval),
        Rule::Custom { .. } => "Custom schedule".to_string(),
    }
}

impl std::fmt::Display for RecurrencePattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", describe(self))
    }
}

fn describe_weekly(days: &BTreeSet<u8>, interval: u32) -> String {
    let names: Vec<&str> = days
        .iter()
        .filter_map(|day| WEEKDAY_NAMES.get(*day as usize).copied())
        .collect();

    if names.is_empty() {
        return match interval {
            1 => "Weekly".to_string(),
            n => format!("Every {} weeks", n),
        };
    }

    if interval == 1 {
        if is_weekday_set(days) {
            return "Weekdays".to_string();
        }
        if is_weekend_set(days) {
            return "Weekends".to_string();
        }
        return format!("Weekly on {}", names.join(", "));
    }

    format!("Every {} weeks on {}", interval, names.join(", "))
}

fn is_weekday_set(days: &BTreeSet<u8>) -> bool {
    days.len() == 5 && (1..=5).all(|day| days.contains(&day))
}

fn is_weekend_set(days: &BTreeSet<u8>) -> bool {
    days.len() == 2 && days.contains(&0) && days.contains(&6)
}

fn describe_monthly(day_of_month: Option<u32>, interval: u32) -> String {
    match (day_of_month, interval) {
        (Some(day), 1) => format!("Monthly on the {}", ordinal(day)),
        (Some(day), n) => format!("Every {} months on the {}", n, ordinal(day)),
        (None, 1) => "Monthly".to_string(),
        (None, n) => format!("Every {} months", n),
    }
}

fn describe_yearly(month_of_year: Option<u32>, day_of_month: Option<u32>, interval: u32) -> String {
    let prefix = match interval {
        1 => "Yearly".to_string(),
        n => format!("Every {} years", n),
    };

    match month_of_year.and_then(month_name) {
        Some(month) => match day_of_month {
            Some(day) => format!("{} on {} {}", prefix, month, day),
            None => format!("{} in {}", prefix, month),
        },
        None => prefix,
    }
}

fn month_name(month: u32) -> Option<&'static str> {
    MONTH_NAMES.get(month.checked_sub(1)? as usize).copied()
}

/// English ordinal with the 11th-13th exception.
fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (1, hundreds) if hundreds != 11 => "st",
        (2, hundreds) if hundreds != 12 => "nd",
        (3, hundreds) if hundreds != 13 => "rd",
        _ => "th",
    };
    format!("{}{}", day, suffix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RecurrencePattern;

    #[test]
    fn test_daily_phrasings() {
        assert_eq!(describe(&RecurrencePattern::daily(1)), "Daily");
        assert_eq!(describe(&RecurrencePattern::daily(3)), "Every 3 days");
    }

    #[test]
    fn test_weekly_phrasings() {
        assert_eq!(describe(&RecurrencePattern::weekly(1, [])), "Weekly");
        assert_eq!(describe(&RecurrencePattern::weekly(2, [])), "Every 2 weeks");
        assert_eq!(
            describe(&RecurrencePattern::weekly(1, [1, 3])),
            "Weekly on Mon, Wed"
        );
        assert_eq!(
            describe(&RecurrencePattern::weekly(2, [1, 3])),
            "Every 2 weeks on Mon, Wed"
        );
    }

    #[test]
    fn test_weekday_and_weekend_shorthands() {
        assert_eq!(
            describe(&RecurrencePattern::weekly(1, [1, 2, 3, 4, 5])),
            "Weekdays"
        );
        assert_eq!(describe(&RecurrencePattern::weekly(1, [0, 6])), "Weekends");
        // The shorthand only names the exact sets.
        assert_eq!(
            describe(&RecurrencePattern::weekly(1, [1, 2, 3, 4, 5, 6])),
            "Weekly on Mon, Tue, Wed, Thu, Fri, Sat"
        );
    }

    #[test]
    fn test_monthly_phrasings() {
        assert_eq!(describe(&RecurrencePattern::monthly(1, None)), "Monthly");
        assert_eq!(
            describe(&RecurrencePattern::monthly(1, Some(15))),
            "Monthly on the 15th"
        );
        assert_eq!(
            describe(&RecurrencePattern::monthly(2, Some(1))),
            "Every 2 months on the 1st"
        );
    }

    #[test]
    fn test_yearly_phrasings() {
        assert_eq!(describe(&RecurrencePattern::yearly(1, None, None)), "Yearly");
        assert_eq!(
            describe(&RecurrencePattern::yearly(1, Some(1), None)),
            "Yearly in January"
        );
        assert_eq!(
            describe(&RecurrencePattern::yearly(1, Some(7), Some(4))),
            "Yearly on July 4"
        );
        assert_eq!(
            describe(&RecurrencePattern::yearly(5, Some(12), Some(25))),
            "Every 5 years on December 25"
        );
    }

    #[test]
    fn test_custom_fallback() {
        assert_eq!(
            describe(&RecurrencePattern::custom(1, vec![2, 5])),
            "Custom schedule"
        );
    }

    #[test]
    fn test_ordinal_suffixes() {
        assert_eq!(ordinal(1), "1st");
        assert_eq!(ordinal(2), "2nd");
        assert_eq!(ordinal(3), "3rd");
        assert_eq!(ordinal(4), "4th");
        assert_eq!(ordinal(11), "11th");
        assert_eq!(ordinal(12), "12th");
        assert_eq!(ordinal(13), "13th");
        assert_eq!(ordinal(21), "21st");
        assert_eq!(ordinal(22), "22nd");
        assert_eq!(ordinal(23), "23rd");
        assert_eq!(ordinal(31), "31st");
    }

    #[test]
    fn test_display_delegates_to_describe() {
        let pattern = RecurrencePattern::weekly(1, [0, 6]);
        assert_eq!(pattern.to_string(), "Weekends");
    }
}
