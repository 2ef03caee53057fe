//! Turns raw extract rows into the `country` and `case_data` relations.
//!
//! Countries are the union of `(iso3, country, region)` over the yearly then
//! the monthly extract. A row contributes a country only if it has a code, a
//! name, and a region that normalizes; the first such row per code wins.
//!
//! Every monthly row becomes one case record dated on the first of its month,
//! with missing measurements filled with zero. A year or month that is not a
//! calendar value aborts the build. A row with no country code, or with a
//! measurement that is not a number, is rejected on its own and counted.

use std::collections::{BTreeSet, HashSet};

use epiwatch_core::{
  case::{CaseCounts, CaseData, month_start},
  country::Country,
  query::normalize_iso3,
  region::Region,
};

use crate::{
  Error, Result,
  extract::{Extracts, MONTH_FILE, MonthRecord, Sourced},
};

/// Normalized relations ready for persistence.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
  pub countries: Vec<Country>,
  pub cases:     Vec<CaseData>,
  /// Monthly rows that produced no case record.
  pub rejected:  usize,
}

/// Cell values treated as missing, in addition to the empty cell.
const NULL_TOKENS: &[&str] = &["NA", "N/A", "NaN", "nan", "null", "NULL"];

fn present(cell: &Option<String>) -> Option<&str> {
  cell
    .as_deref()
    .map(str::trim)
    .filter(|v| !v.is_empty() && !NULL_TOKENS.contains(v))
}

/// What one monthly row turned into.
enum CaseRow {
  Case(CaseData),
  Rejected(String),
}

pub fn build(extracts: &Extracts) -> Result<Dataset> {
  let countries = build_countries(extracts);

  let mut cases = Vec::with_capacity(extracts.month.len());
  let mut rejected = 0;
  for row in &extracts.month {
    match build_case(row)? {
      CaseRow::Case(case) => cases.push(case),
      CaseRow::Rejected(reason) => {
        tracing::warn!(extract = MONTH_FILE, line = row.line, %reason, "rejecting case row");
        rejected += 1;
      }
    }
  }

  tracing::info!(
    countries = countries.len(),
    cases = cases.len(),
    rejected,
    "built dataset"
  );
  Ok(Dataset { countries, cases, rejected })
}

fn build_countries(extracts: &Extracts) -> Vec<Country> {
  let year = extracts
    .year
    .iter()
    .map(|r| (&r.record.iso3, &r.record.country, &r.record.region));
  let month = extracts
    .month
    .iter()
    .map(|r| (&r.record.iso3, &r.record.country, &r.record.region));

  let mut seen = HashSet::new();
  let mut unmapped = BTreeSet::new();
  let mut countries = Vec::new();

  for (iso3, name, region) in year.chain(month) {
    let (Some(iso3), Some(name)) = (present(iso3), present(name)) else {
      continue;
    };
    let iso3 = normalize_iso3(iso3);
    let Some(region) = present(region).and_then(Region::normalize) else {
      unmapped.insert(iso3);
      continue;
    };
    if seen.insert(iso3.clone()) {
      countries.push(Country { iso3, name: name.to_owned(), region });
    }
  }

  for iso3 in unmapped.iter().filter(|iso3| !seen.contains(*iso3)) {
    tracing::warn!(%iso3, "dropping country with no recognised region");
  }

  countries
}

fn build_case(row: &Sourced<MonthRecord>) -> Result<CaseRow> {
  let line = row.line;
  let r = &row.record;

  let year = whole(&r.year, "year", line)?;
  let month = whole(&r.month, "month", line)?;
  let date = i32::try_from(year)
    .ok()
    .zip(u32::try_from(month).ok())
    .and_then(|(y, m)| month_start(y, m))
    .ok_or_else(|| Error::MalformedInput {
      extract: MONTH_FILE,
      line,
      message: format!("year {year} month {month} is not a calendar month"),
    })?;

  let Some(iso3) = present(&r.iso3).map(normalize_iso3) else {
    return Ok(CaseRow::Rejected("missing iso3".into()));
  };

  let counts = (|| {
    Ok::<_, String>(CaseCounts {
      measles_suspect:       measurement(&r.measles_suspect, "measles_suspect")?,
      measles_clinical:      measurement(&r.measles_clinical, "measles_clinical")?,
      measles_epi_linked:    measurement(&r.measles_epi_linked, "measles_epi_linked")?,
      measles_lab_confirmed: measurement(&r.measles_lab_confirmed, "measles_lab_confirmed")?,
      measles_total:         measurement(&r.measles_total, "measles_total")?,
      rubella_clinical:      measurement(&r.rubella_clinical, "rubella_clinical")?,
      rubella_epi_linked:    measurement(&r.rubella_epi_linked, "rubella_epi_linked")?,
      rubella_lab_confirmed: measurement(&r.rubella_lab_confirmed, "rubella_lab_confirmed")?,
      rubella_total:         measurement(&r.rubella_total, "rubella_total")?,
      discarded:             measurement(&r.discarded, "discarded")?,
    })
  })();

  Ok(match counts {
    Ok(counts) => CaseRow::Case(CaseData { country_iso3: iso3, date, counts }),
    Err(reason) => CaseRow::Rejected(reason),
  })
}

/// A whole number, also accepting the `2012.0` form float-typed exports use.
fn whole(cell: &Option<String>, column: &str, line: u64) -> Result<i64> {
  let malformed = |message: String| Error::MalformedInput {
    extract: MONTH_FILE,
    line,
    message,
  };
  let raw = present(cell).ok_or_else(|| malformed(format!("missing {column}")))?;
  raw
    .parse::<i64>()
    .ok()
    .or_else(|| {
      raw
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite() && f.fract() == 0.0)
        .map(|f| f as i64)
    })
    .ok_or_else(|| malformed(format!("{column} {raw:?} is not a whole number")))
}

/// A measurement cell; missing values become zero.
fn measurement(cell: &Option<String>, column: &str) -> std::result::Result<f64, String> {
  let Some(raw) = present(cell) else {
    return Ok(0.0);
  };
  raw
    .parse::<f64>()
    .map_err(|_| format!("{column} {raw:?} is not a number"))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::extract::YearRecord;

  fn year_row(line: u64, iso3: &str, country: Option<&str>, region: &str) -> Sourced<YearRecord> {
    Sourced {
      line,
      record: YearRecord {
        iso3:    Some(iso3.into()),
        country: country.map(Into::into),
        region:  Some(region.into()),
        year:    Some("2012".into()),
      },
    }
  }

  fn month_row(line: u64, iso3: &str, region: &str, year: &str, month: &str) -> Sourced<MonthRecord> {
    Sourced {
      line,
      record: MonthRecord {
        iso3: Some(iso3.into()),
        country: Some(format!("Country {iso3}")),
        region: Some(region.into()),
        year: Some(year.into()),
        month: Some(month.into()),
        ..Default::default()
      },
    }
  }

  #[test]
  fn office_and_short_codes_collapse_to_one_country() {
    let extracts = Extracts {
      year:  vec![year_row(2, "NZL", Some("New Zealand"), "WPRO")],
      month: vec![month_row(2, "NZL", "WPR", "2012", "1")],
    };
    let ds = build(&extracts).unwrap();
    assert_eq!(ds.countries, vec![Country {
      iso3:   "NZL".into(),
      name:   "New Zealand".into(),
      region: Region::Wpr,
    }]);
  }

  #[test]
  fn first_named_occurrence_wins() {
    let extracts = Extracts {
      year:  vec![
        year_row(2, "DZA", None, "AFRO"),
        year_row(3, "DZA", Some("Algeria"), "AFRO"),
        year_row(4, "DZA", Some("Algérie"), "AFR"),
      ],
      month: vec![],
    };
    let ds = build(&extracts).unwrap();
    assert_eq!(ds.countries.len(), 1);
    assert_eq!(ds.countries[0].name, "Algeria");
  }

  #[test]
  fn rows_without_a_name_are_dropped() {
    let extracts = Extracts {
      year:  vec![year_row(2, "XKX", None, "EURO"), year_row(3, "FRA", Some("NA"), "EURO")],
      month: vec![],
    };
    assert!(build(&extracts).unwrap().countries.is_empty());
  }

  #[test]
  fn rows_with_an_unmapped_region_are_dropped() {
    let extracts = Extracts {
      year:  vec![year_row(2, "ATA", Some("Antarctica"), "ANTARCTIC")],
      month: vec![],
    };
    assert!(build(&extracts).unwrap().countries.is_empty());
  }

  #[test]
  fn cases_are_dated_first_of_month_and_zero_filled() {
    let mut row = month_row(2, "DZA", "AFRO", "2012", "7");
    row.record.measles_total = Some("12".into());
    row.record.rubella_total = Some("".into());
    row.record.discarded = Some("NaN".into());

    let ds = build(&Extracts { year: vec![], month: vec![row] }).unwrap();
    let case = &ds.cases[0];
    assert_eq!(case.country_iso3, "DZA");
    assert_eq!(case.date, month_start(2012, 7).unwrap());
    assert_eq!(case.counts.measles_total, 12.0);
    assert_eq!(case.counts.rubella_total, 0.0);
    assert_eq!(case.counts.discarded, 0.0);
    assert_eq!(case.counts.measles_suspect, 0.0);
  }

  #[test]
  fn float_formatted_year_and_month_are_accepted() {
    let row = month_row(2, "DZA", "AFR", "2012.0", "3.0");
    let ds = build(&Extracts { year: vec![], month: vec![row] }).unwrap();
    assert_eq!(ds.cases[0].date, month_start(2012, 3).unwrap());
  }

  #[test]
  fn out_of_range_month_is_malformed_input() {
    let extracts = Extracts {
      year:  vec![],
      month: vec![
        month_row(2, "DZA", "AFR", "2012", "1"),
        month_row(3, "DZA", "AFR", "2012", "13"),
      ],
    };
    match build(&extracts).unwrap_err() {
      Error::MalformedInput { extract, line, .. } => {
        assert_eq!(extract, MONTH_FILE);
        assert_eq!(line, 3);
      }
      other => panic!("unexpected error: {other}"),
    }
  }

  #[test]
  fn non_numeric_year_is_malformed_input() {
    let extracts = Extracts {
      year:  vec![],
      month: vec![month_row(2, "DZA", "AFR", "twenty-twelve", "1")],
    };
    assert!(matches!(build(&extracts), Err(Error::MalformedInput { .. })));
  }

  #[test]
  fn non_numeric_measurement_rejects_only_its_row() {
    let mut bad = month_row(3, "DZA", "AFR", "2012", "2");
    bad.record.measles_clinical = Some("many".into());
    let extracts = Extracts {
      year:  vec![],
      month: vec![month_row(2, "DZA", "AFR", "2012", "1"), bad],
    };
    let ds = build(&extracts).unwrap();
    assert_eq!(ds.cases.len(), 1);
    assert_eq!(ds.rejected, 1);
  }

  #[test]
  fn blank_iso3_rejects_only_its_row() {
    let extracts = Extracts {
      year:  vec![],
      month: vec![
        month_row(2, "DZA", "AFR", "2012", "1"),
        month_row(3, " ", "AFR", "2012", "2"),
        month_row(4, "DZA", "AFR", "2012", "3"),
      ],
    };
    let ds = build(&extracts).unwrap();
    let months: Vec<_> = ds.cases.iter().map(|c| c.date).collect();
    assert_eq!(months, vec![month_start(2012, 1).unwrap(), month_start(2012, 3).unwrap()]);
    assert_eq!(ds.rejected, 1);
  }

  #[test]
  fn bad_month_is_fatal_even_without_iso3() {
    let extracts = Extracts {
      year:  vec![],
      month: vec![month_row(2, "", "AFR", "2012", "0")],
    };
    assert!(matches!(build(&extracts), Err(Error::MalformedInput { line: 2, .. })));
  }

  #[test]
  fn case_rows_are_kept_even_when_their_country_is_dropped() {
    let extracts = Extracts {
      year:  vec![],
      month: vec![month_row(2, "ATA", "ANTARCTIC", "2012", "1")],
    };
    let ds = build(&extracts).unwrap();
    assert!(ds.countries.is_empty());
    assert_eq!(ds.cases.len(), 1);
  }
}
