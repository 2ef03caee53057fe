//! Readers for the two surveillance extracts.
//!
//! Both files are wide CSVs with a header row. Only the columns named on
//! [`YearRecord`] and [`MonthRecord`] are read; everything else (incidence
//! rates, population, ...) is ignored. Cells are kept as text here so the
//! builder can report bad values with their line number.

use std::{
  fs::File,
  io::Read,
  path::{Path, PathBuf},
};

use serde::{Deserialize, de::DeserializeOwned};

use crate::{Error, Result};

pub const YEAR_FILE: &str = "cases_year.csv";
pub const MONTH_FILE: &str = "cases_month.csv";

/// A record together with the 1-based line it was read from.
#[derive(Debug, Clone)]
pub struct Sourced<T> {
  pub line:   u64,
  pub record: T,
}

/// One row of `cases_year.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct YearRecord {
  pub iso3:    Option<String>,
  pub country: Option<String>,
  pub region:  Option<String>,
  pub year:    Option<String>,
}

/// One row of `cases_month.csv`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MonthRecord {
  pub iso3:                  Option<String>,
  pub country:               Option<String>,
  pub region:                Option<String>,
  pub year:                  Option<String>,
  pub month:                 Option<String>,
  pub measles_suspect:       Option<String>,
  pub measles_clinical:      Option<String>,
  pub measles_epi_linked:    Option<String>,
  pub measles_lab_confirmed: Option<String>,
  pub measles_total:         Option<String>,
  pub rubella_clinical:      Option<String>,
  pub rubella_epi_linked:    Option<String>,
  pub rubella_lab_confirmed: Option<String>,
  pub rubella_total:         Option<String>,
  pub discarded:             Option<String>,
}

/// Both extracts, fully read into memory.
#[derive(Debug, Clone, Default)]
pub struct Extracts {
  pub year:  Vec<Sourced<YearRecord>>,
  pub month: Vec<Sourced<MonthRecord>>,
}

impl Extracts {
  /// Read [`YEAR_FILE`] and [`MONTH_FILE`] from `dir`.
  pub fn from_dir(dir: impl AsRef<Path>) -> Result<Self> {
    let dir = dir.as_ref();
    let year = open(&dir.join(YEAR_FILE))?;
    let month = open(&dir.join(MONTH_FILE))?;
    Self::from_readers(year, month)
  }

  pub fn from_readers(year: impl Read, month: impl Read) -> Result<Self> {
    let year = read_records(year, YEAR_FILE)?;
    let month = read_records(month, MONTH_FILE)?;
    tracing::info!(
      year_rows = year.len(),
      month_rows = month.len(),
      "read surveillance extracts"
    );
    Ok(Self { year, month })
  }
}

/// Directory holding the running executable, or the working directory when
/// that cannot be determined.
pub fn default_csv_dir() -> PathBuf {
  std::env::current_exe()
    .ok()
    .and_then(|exe| exe.parent().map(Path::to_path_buf))
    .unwrap_or_else(|| PathBuf::from("."))
}

fn open(path: &Path) -> Result<File> {
  File::open(path).map_err(|source| Error::Open { path: path.to_path_buf(), source })
}

fn read_records<T: DeserializeOwned>(
  reader: impl Read,
  extract: &'static str,
) -> Result<Vec<Sourced<T>>> {
  let mut reader = csv::ReaderBuilder::new()
    .has_headers(true)
    .trim(csv::Trim::All)
    .from_reader(reader);
  let headers = reader.headers()?.clone();

  let mut raw = csv::StringRecord::new();
  let mut rows = Vec::new();
  while reader.read_record(&mut raw)? {
    let line = raw.position().map_or(0, |p| p.line());
    let record = raw.deserialize(Some(&headers)).map_err(|e| Error::MalformedInput {
      extract,
      line,
      message: e.to_string(),
    })?;
    rows.push(Sourced { line, record });
  }
  Ok(rows)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn reads_known_columns_and_ignores_the_rest() {
    let csv = "\
region,country,iso3,year,total_pop,measles_incidence_rate_per_1000000_total_population
AFRO,Algeria,DZA,2012,37383887,0.5
";
    let rows: Vec<Sourced<YearRecord>> = read_records(csv.as_bytes(), YEAR_FILE).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].line, 2);
    assert_eq!(rows[0].record.iso3.as_deref(), Some("DZA"));
    assert_eq!(rows[0].record.region.as_deref(), Some("AFRO"));
  }

  #[test]
  fn empty_cells_read_as_none() {
    let csv = "\
region,country,iso3,year,month,measles_total,discarded
AFR,,DZA,2012,1,,3
";
    let rows: Vec<Sourced<MonthRecord>> = read_records(csv.as_bytes(), MONTH_FILE).unwrap();
    let r = &rows[0].record;
    assert_eq!(r.country, None);
    assert_eq!(r.measles_total, None);
    assert_eq!(r.rubella_total, None, "missing column");
    assert_eq!(r.discarded.as_deref(), Some("3"));
  }

  #[test]
  fn missing_directory_names_the_file() {
    let err = Extracts::from_dir("/nonexistent/epiwatch").unwrap_err();
    match err {
      Error::Open { path, .. } => assert!(path.ends_with(YEAR_FILE)),
      other => panic!("unexpected error: {other}"),
    }
  }
}
