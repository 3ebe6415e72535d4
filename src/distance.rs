//! Human-readable distance between two dates.
//!
//! [`CalendarSpan`] is the years/months/days breakdown shown in the status bar
//! and, by default, in the note date notice. [`approximate_distance`] is the
//! coarser largest-unit phrase that can be selected for the notice instead.
use std::fmt;

use chrono::{Datelike, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Signed years/months/days difference between two dates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarSpan {
    pub years: i32,
    pub months: i32,
    pub days: i32,
    /// `from` is strictly later than `to`: the span is time remaining.
    pub is_negative: bool,
}

/// Which phrase the note date notice uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceStyle {
    #[default]
    Calendar,
    Approximate,
}

/// Computes the calendar span from `from` to `to`.
pub fn distance(from: NaiveDateTime, to: NaiveDateTime) -> CalendarSpan {
    let mut years = to.year() - from.year();
    let mut months = to.month() as i32 - from.month() as i32;
    let mut days = to.day() as i32 - from.day() as i32;

    if days < 0 {
        months -= 1;
        days += days_in_month_before(to);
    }

    if months < 0 {
        years -= 1;
        months += 12;
    }

    CalendarSpan {
        years,
        months,
        days,
        is_negative: from > to,
    }
}

/// Day count of the month preceding `date`'s month.
fn days_in_month_before(date: NaiveDateTime) -> i32 {
    date.date()
        .with_day(1)
        .and_then(|first| first.pred_opt())
        .map(|last| last.day() as i32)
        .unwrap_or(31)
}

impl CalendarSpan {
    pub fn is_zero(&self) -> bool {
        self.years == 0 && self.months == 0 && self.days == 0
    }
}

impl fmt::Display for CalendarSpan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return f.write_str("Age: Today");
        }

        let parts: Vec<String> = [
            (self.years, "year"),
            (self.months, "month"),
            (self.days, "day"),
        ]
        .iter()
        .filter(|(n, _)| *n != 0)
        .map(|(n, unit)| format!("{} {}(s)", n.abs(), unit))
        .collect();

        let suffix = if self.is_negative { "remaining" } else { "ago" };
        write!(f, "Age: {} {}", parts.join(", "), suffix)
    }
}

/// Coarse distance phrase in the largest sensible unit.
pub fn approximate_distance(from: NaiveDateTime, to: NaiveDateTime) -> String {
    let (earlier, later) = if from <= to { (from, to) } else { (to, from) };
    let seconds = (later - earlier).num_seconds();
    let minutes = (seconds as f64 / 60.0).round() as i64;

    let phrase = if minutes < 1 {
        "less than a minute".to_string()
    } else if minutes < 45 {
        plural(minutes, "minute")
    } else if minutes < 90 {
        "about 1 hour".to_string()
    } else if minutes < 24 * 60 {
        format!("about {}", plural((minutes as f64 / 60.0).round() as i64, "hour"))
    } else if minutes < 42 * 60 {
        "1 day".to_string()
    } else if minutes < 30 * 24 * 60 {
        plural((minutes as f64 / 1440.0).round() as i64, "day")
    } else if minutes < 60 * 24 * 60 {
        format!(
            "about {}",
            plural((minutes as f64 / 43200.0).round() as i64, "month")
        )
    } else {
        let months = whole_months_between(earlier, later);
        if months < 12 {
            plural(months.max(2), "month")
        } else {
            let years = months / 12;
            match months % 12 {
                0..=2 => format!("about {}", plural(years, "year")),
                3..=8 => format!("over {}", plural(years, "year")),
                _ => format!("almost {}", plural(years + 1, "year")),
            }
        }
    };

    if from <= to {
        format!("{} ago", phrase)
    } else {
        format!("in {}", phrase)
    }
}

fn whole_months_between(earlier: NaiveDateTime, later: NaiveDateTime) -> i64 {
    let mut months = i64::from(later.year() - earlier.year()) * 12
        + i64::from(later.month()) - i64::from(earlier.month());

    let later_in_month = (later.day(), later.time());
    let earlier_in_month = (earlier.day(), earlier.time());
    if months > 0 && later_in_month < earlier_in_month {
        months -= 1;
    }

    months
}

fn plural(n: i64, unit: &str) -> String {
    if n == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", n, unit)
    }
}
