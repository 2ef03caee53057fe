//! Encoding and decoding helpers between domain types and the plain
//! representations stored in SQLite columns.
//!
//! Dates are stored as `YYYY-MM-DD` text so lexical order equals calendar
//! order. Regions are stored as their canonical code.

use chrono::NaiveDate;
use epiwatch_core::{
  case::{CaseCounts, CaseData, MonthlyCase},
  country::Country,
  query::DATE_FORMAT,
  region::Region,
};

use crate::{Error, Result};

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format(DATE_FORMAT).to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Region ──────────────────────────────────────────────────────────────────

pub fn encode_region(r: Region) -> &'static str { r.code() }

pub fn decode_region(s: &str) -> Result<Region> { Ok(s.parse()?) }

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `country` row.
pub struct RawCountry {
  pub iso3:    String,
  pub country: String,
  pub region:  String,
}

impl RawCountry {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      iso3:    row.get(0)?,
      country: row.get(1)?,
      region:  row.get(2)?,
    })
  }

  pub fn into_country(self) -> Result<Country> {
    Ok(Country {
      iso3:   self.iso3,
      name:   self.country,
      region: decode_region(&self.region)?,
    })
  }
}

/// Raw values read from a `case_data` row in
/// [`CASE_COLUMNS`](crate::schema::CASE_COLUMNS) order.
pub struct RawCase {
  pub country_iso3: String,
  pub date:         String,
  pub counts:       CaseCounts,
}

impl RawCase {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      country_iso3: row.get(0)?,
      date:         row.get(1)?,
      counts:       CaseCounts {
        measles_suspect:       row.get(2)?,
        measles_clinical:      row.get(3)?,
        measles_epi_linked:    row.get(4)?,
        measles_lab_confirmed: row.get(5)?,
        measles_total:         row.get(6)?,
        rubella_clinical:      row.get(7)?,
        rubella_epi_linked:    row.get(8)?,
        rubella_lab_confirmed: row.get(9)?,
        rubella_total:         row.get(10)?,
        discarded:             row.get(11)?,
      },
    })
  }

  pub fn into_case(self) -> Result<CaseData> {
    Ok(CaseData {
      country_iso3: self.country_iso3,
      date:         decode_date(&self.date)?,
      counts:       self.counts,
    })
  }
}

/// A [`RawCase`] followed by the joined `country.country` and
/// `country.region` columns.
pub struct RawMonthlyCase {
  pub case:    RawCase,
  pub country: String,
  pub region:  String,
}

impl RawMonthlyCase {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      case:    RawCase::from_row(row)?,
      country: row.get(12)?,
      region:  row.get(13)?,
    })
  }

  pub fn into_monthly(self) -> Result<MonthlyCase> {
    Ok(MonthlyCase {
      case:    self.case.into_case()?,
      country: self.country,
      region:  decode_region(&self.region)?,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn dates_are_stored_as_iso_text() {
    let d = NaiveDate::from_ymd_opt(2012, 3, 1).unwrap();
    assert_eq!(encode_date(d), "2012-03-01");
    assert_eq!(decode_date("2012-03-01").unwrap(), d);
  }

  #[test]
  fn bad_stored_values_are_reported() {
    assert!(matches!(decode_date("March 2012"), Err(Error::DateParse(_))));
    assert!(matches!(decode_region("AFRO"), Err(Error::Core(_))));
  }
}
