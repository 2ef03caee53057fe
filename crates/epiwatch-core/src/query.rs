//! Query inputs that need validation before reaching a store.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// The only date format accepted from callers.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// An inclusive calendar date range.
///
/// A range whose `start` is after its `end` is well-formed and simply matches
/// nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
  pub start: NaiveDate,
  pub end:   NaiveDate,
}

impl DateRange {
  pub fn new(start: NaiveDate, end: NaiveDate) -> Self { Self { start, end } }

  /// Parse both bounds as `YYYY-MM-DD`.
  pub fn parse(start: &str, end: &str) -> Result<Self> {
    Ok(Self { start: parse_date(start)?, end: parse_date(end)? })
  }

  pub fn contains(&self, date: NaiveDate) -> bool {
    self.start <= date && date <= self.end
  }
}

/// Parse a single `YYYY-MM-DD` date, mapping failure to
/// [`Error::InvalidQueryInput`].
pub fn parse_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s.trim(), DATE_FORMAT).map_err(|e| {
    Error::InvalidQueryInput(format!("{s:?} is not a YYYY-MM-DD date: {e}"))
  })
}

/// Canonical form of a caller-supplied ISO3 code.
pub fn normalize_iso3(code: &str) -> String { code.trim().to_ascii_uppercase() }

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_iso_dates() {
    let r = DateRange::parse("2012-01-01", "2012-12-31").unwrap();
    assert_eq!(r.start, NaiveDate::from_ymd_opt(2012, 1, 1).unwrap());
    assert_eq!(r.end, NaiveDate::from_ymd_opt(2012, 12, 31).unwrap());
  }

  #[test]
  fn slash_separated_date_is_invalid_input() {
    let err = DateRange::parse("2012/01/01", "2012-01-31").unwrap_err();
    assert!(matches!(err, Error::InvalidQueryInput(_)));
  }

  #[test]
  fn impossible_calendar_date_is_invalid_input() {
    let err = DateRange::parse("2012-01-01", "2012-02-30").unwrap_err();
    assert!(matches!(err, Error::InvalidQueryInput(_)));
  }

  #[test]
  fn contains_is_inclusive() {
    let r = DateRange::parse("2012-01-01", "2012-01-31").unwrap();
    assert!(r.contains(r.start));
    assert!(r.contains(r.end));
    assert!(!r.contains(NaiveDate::from_ymd_opt(2012, 2, 1).unwrap()));
  }

  #[test]
  fn inverted_range_matches_nothing() {
    let r = DateRange::parse("2013-01-01", "2012-01-01").unwrap();
    assert!(!r.contains(NaiveDate::from_ymd_opt(2012, 6, 1).unwrap()));
  }

  #[test]
  fn iso3_is_upper_cased() {
    assert_eq!(normalize_iso3(" dza "), "DZA");
  }
}
