//! Zettelkasten identifiers.
//!
//! An identifier is a 12-digit `YYYYMMDDhhmm` token at the start of a note's
//! filename. Parsing only checks the shape; calendar plausibility is never
//! validated, so a month of `13` rolls over into the next year.
use std::{fmt, str::FromStr, sync::LazyLock};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use regex::Regex;

use crate::ZettelError;

/// Number of digits in an identifier.
pub const ZETTEL_ID_LEN: usize = 12;

// `[0-9]` rather than `\d`: the latter also matches non-ASCII digits.
static IDENTIFIER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^[0-9]{{{}}}$", ZETTEL_ID_LEN)).unwrap());

static FILENAME_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"^([0-9]{{{}}})(?: (.*))?$", ZETTEL_ID_LEN)).unwrap());

/// A 12-digit `YYYYMMDDhhmm` timestamp identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ZettelId(String);

/// The pieces of a filename that starts with an identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZettelName {
    pub id: ZettelId,
    /// Whatever follows the separating space, if anything.
    pub title: Option<String>,
}

/// Returns the identifier when `text` is exactly 12 ASCII digits.
pub fn parse_identifier(text: &str) -> Option<ZettelId> {
    IDENTIFIER_PATTERN
        .is_match(text)
        .then(|| ZettelId(text.to_string()))
}

/// Splits a note basename into its identifier and optional title.
///
/// The basename must start with exactly 12 digits, optionally followed by a
/// single space and a title. `"202401151230extra"` does not match.
pub fn extract_identifier_from_filename(basename: &str) -> Option<ZettelName> {
    let captures = FILENAME_PATTERN.captures(basename)?;
    let id = ZettelId(captures.get(1)?.as_str().to_string());
    let title = captures
        .get(2)
        .map(|m| m.as_str().to_string())
        .filter(|t| !t.is_empty());

    Some(ZettelName { id, title })
}

/// Builds the identifier for `now`, truncated to the minute.
pub fn generate_identifier(now: NaiveDateTime) -> ZettelId {
    ZettelId(format!(
        "{:04}{:02}{:02}{:02}{:02}",
        now.year(),
        now.month(),
        now.day(),
        now.hour(),
        now.minute()
    ))
}

impl ZettelId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn year(&self) -> i32 {
        self.digits(0, 4) as i32
    }

    /// 1-indexed month as written in the identifier (may be 0 or above 12).
    pub fn month(&self) -> u32 {
        self.digits(4, 6)
    }

    pub fn day(&self) -> u32 {
        self.digits(6, 8)
    }

    pub fn hour(&self) -> u32 {
        self.digits(8, 10)
    }

    pub fn minute(&self) -> u32 {
        self.digits(10, ZETTEL_ID_LEN)
    }

    /// Converts the identifier to a local date-time.
    ///
    /// Fields outside their calendar range roll over the way ordinary date
    /// arithmetic does: month `13` is January of the next year, day `00` is
    /// the last day of the previous month, hour `25` is 1am the next day.
    pub fn to_date(&self) -> NaiveDateTime {
        let total_months = i64::from(self.year()) * 12 + i64::from(self.month()) - 1;
        let year = total_months.div_euclid(12) as i32;
        let month = total_months.rem_euclid(12) as u32 + 1;

        let first_of_month = NaiveDate::from_ymd_opt(year, month, 1)
            .unwrap_or_default()
            .and_time(NaiveTime::MIN);

        first_of_month
            + Duration::days(i64::from(self.day()) - 1)
            + Duration::hours(i64::from(self.hour()))
            + Duration::minutes(i64::from(self.minute()))
    }

    fn digits(&self, start: usize, end: usize) -> u32 {
        self.0.as_bytes()[start..end]
            .iter()
            .fold(0, |acc, b| acc * 10 + u32::from(b - b'0'))
    }
}

impl fmt::Display for ZettelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ZettelId {
    type Err = ZettelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_identifier(s).ok_or_else(|| ZettelError::MalformedIdentifier {
            name: s.to_string(),
        })
    }
}
