//! Inclusive date ranges and their query syntax.

use std::str::FromStr;

use chrono::NaiveDate;
use serde_json::json;

use crate::store::Filter;

/// Inclusive date window. Missing bounds are open.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    InvalidToken(String),
    InvalidDate(String),
    /// The start bound falls after the end bound.
    Reversed { start: NaiveDate, end: NaiveDate },
}

impl std::fmt::Display for ParseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ParseError::InvalidToken(t) => write!(f, "invalid token: {t}"),
            ParseError::InvalidDate(d) => write!(f, "invalid date: {d}"),
            ParseError::Reversed { start, end } => {
                write!(f, "range starts on {start} but ends on {end}")
            }
        }
    }
}

impl std::error::Error for ParseError {}

/// Accepts `start:YYYY-MM-DD`, `end:YYYY-MM-DD` and `date:START..END` tokens.
/// Later tokens override earlier bounds; a blank string is unbounded.
impl FromStr for DateRange {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut range = DateRange::default();
        for token in s.split_whitespace() {
            let invalid = || ParseError::InvalidToken(token.to_string());
            let (key, value) = token.split_once(':').ok_or_else(invalid)?;
            match key {
                "start" => range.start = Some(parse_date(value)?),
                "end" => range.end = Some(parse_date(value)?),
                "date" => {
                    let (from, to) = value.split_once("..").ok_or_else(invalid)?;
                    if let Some(d) = parse_bound(from)? {
                        range.start = Some(d);
                    }
                    if let Some(d) = parse_bound(to)? {
                        range.end = Some(d);
                    }
                }
                _ => return Err(invalid()),
            }
        }
        range.checked()
    }
}

pub fn parse_date(s: &str) -> Result<NaiveDate, ParseError> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|_| ParseError::InvalidDate(s.into()))
}

/// Empty side of a `START..END` span.
fn parse_bound(s: &str) -> Result<Option<NaiveDate>, ParseError> {
    if s.is_empty() { Ok(None) } else { parse_date(s).map(Some) }
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Rejects a window whose start lies after its end.
    pub fn checked(self) -> Result<Self, ParseError> {
        match (self.start, self.end) {
            (Some(start), Some(end)) if start > end => Err(ParseError::Reversed { start, end }),
            _ => Ok(self),
        }
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        if let Some(start) = self.start {
            if date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if date > end {
                return false;
            }
        }
        true
    }

    /// Store filters restricting `column` to this window.
    pub fn filters(&self, column: &str) -> Vec<Filter> {
        let mut out = Vec::new();
        if let Some(start) = self.start {
            out.push(Filter::Gte(column.to_string(), json!(start.to_string())));
        }
        if let Some(end) = self.end {
            out.push(Filter::Lte(column.to_string(), json!(end.to_string())));
        }
        out
    }
}

impl std::fmt::Display for DateRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.start, self.end) {
            (None, None) => write!(f, "all dates"),
            (Some(s), None) => write!(f, "from {s}"),
            (None, Some(e)) => write!(f, "until {e}"),
            (Some(s), Some(e)) => write!(f, "{s} to {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_tokens() {
        let r = DateRange::from_str("start:2024-01-01 end:2024-01-31").unwrap();
        assert_eq!(r.start, NaiveDate::from_ymd_opt(2024, 1, 1));
        assert_eq!(r.end, NaiveDate::from_ymd_opt(2024, 1, 31));
    }

    #[test]
    fn parse_open_ended_span() {
        let r = DateRange::from_str("date:..2024-02-29").unwrap();
        assert_eq!(r.start, None);
        assert_eq!(r.end, NaiveDate::from_ymd_opt(2024, 2, 29));
    }

    #[test]
    fn rejects_unknown_tokens() {
        let err = DateRange::from_str("month:1").unwrap_err();
        assert_eq!(err, ParseError::InvalidToken("month:1".into()));
        let err = DateRange::from_str("start:2024-13-01").unwrap_err();
        assert_eq!(err, ParseError::InvalidDate("2024-13-01".into()));
    }

    #[test]
    fn rejects_start_after_end() {
        let err = DateRange::from_str("start:2024-02-01 end:2024-01-01").unwrap_err();
        assert_eq!(
            err,
            ParseError::Reversed {
                start: NaiveDate::from_ymd_opt(2024, 2, 1).unwrap(),
                end: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            }
        );
        assert!(DateRange::from_str("date:2024-03-05..2024-03-04").is_err());
        let single_day = DateRange::from_str("date:2024-03-05..2024-03-05").unwrap();
        assert_eq!(single_day.start, single_day.end);
    }

    #[test]
    fn missing_separator_is_an_invalid_token() {
        let err = DateRange::from_str("date:2024-01-01").unwrap_err();
        assert_eq!(err, ParseError::InvalidToken("date:2024-01-01".into()));
        let err = DateRange::from_str("2024-01-01").unwrap_err();
        assert_eq!(err, ParseError::InvalidToken("2024-01-01".into()));
    }

    #[test]
    fn bounds_are_inclusive() {
        let day = |d| NaiveDate::from_ymd_opt(2024, 1, d).unwrap();
        let r = DateRange::new(Some(day(3)), Some(day(5)));
        assert!(r.contains(day(3)));
        assert!(r.contains(day(5)));
        assert!(!r.contains(day(6)));
        assert!(DateRange::unbounded().contains(day(1)));
    }
}
