//! [`SqliteStore`] — the SQLite implementation of [`CaseStore`] and
//! [`CaseSink`].

use std::{collections::BTreeSet, path::Path};

use rusqlite::OptionalExtension as _;

use epiwatch_core::{
  case::{CaseData, MonthlyCase},
  country::Country,
  query::{DateRange, normalize_iso3},
  store::{CaseSink, CaseStore, UpsertReport},
};

use crate::{
  Error, Result,
  encode::{RawCase, RawCountry, RawMonthlyCase, encode_date, encode_region},
  schema::{CASE_COLUMNS, INSERT_CASE, INSERT_COUNTRY, PRAGMAS, SCHEMA},
};

/// Rows per `case_data` insert transaction unless overridden.
pub const DEFAULT_CASE_BATCH: usize = 1000;

const COUNTRY_BATCH: usize = 100;

// ─── Store ───────────────────────────────────────────────────────────────────

/// A surveillance store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn:       tokio_rusqlite::Connection,
  case_batch: usize,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and create the schema if absent.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::init(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::init(conn).await
  }

  async fn init(conn: tokio_rusqlite::Connection) -> Result<Self> {
    conn
      .call(|conn| {
        conn.execute_batch(PRAGMAS)?;
        Ok(())
      })
      .await?;
    let store = Self { conn, case_batch: DEFAULT_CASE_BATCH };
    store.create_schema().await?;
    Ok(store)
  }

  /// Set the number of case rows written per transaction. Zero is treated as
  /// one.
  pub fn with_case_batch(mut self, rows: usize) -> Self {
    self.case_batch = rows.max(1);
    self
  }

  async fn count(&self, sql: &'static str) -> Result<usize> {
    let n: i64 = self
      .conn
      .call(move |conn| Ok(conn.query_row(sql, [], |r| r.get(0))?))
      .await?;
    Ok(n as usize)
  }

  async fn query_cases(
    &self,
    sql: String,
    params: Vec<Option<String>>,
  ) -> Result<Vec<CaseData>> {
    let raws: Vec<RawCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map(rusqlite::params_from_iter(params), RawCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCase::into_case).collect()
  }

  /// Execute raw SQL with foreign-key enforcement switched off, for
  /// constructing states the public API cannot reach.
  #[cfg(test)]
  pub(crate) async fn execute_unchecked(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        let res = conn.execute_batch(sql);
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        res?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn is_foreign_key_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(err, _)
      if err.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY
  )
}

// ─── CaseSink impl ───────────────────────────────────────────────────────────

impl CaseSink for SqliteStore {
  type Error = Error;

  async fn create_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  async fn upsert_countries(&self, rows: &[Country]) -> Result<UpsertReport> {
    let mut report = UpsertReport::default();

    for batch in rows.chunks(COUNTRY_BATCH) {
      let batch: Vec<(String, String, &'static str)> = batch
        .iter()
        .map(|c| (c.iso3.clone(), c.name.clone(), encode_region(c.region)))
        .collect();

      let part: UpsertReport = self
        .conn
        .call(move |conn| {
          let tx = conn.transaction()?;
          let mut part = UpsertReport::default();
          {
            let mut stmt = tx.prepare_cached(INSERT_COUNTRY)?;
            for (iso3, name, region) in &batch {
              match stmt.execute(rusqlite::params![iso3, name, region])? {
                0 => part.skipped += 1,
                _ => part.inserted += 1,
              }
            }
          }
          tx.commit()?;
          Ok(part)
        })
        .await?;

      report.merge(part);
    }

    tracing::debug!(
      inserted = report.inserted,
      skipped = report.skipped,
      "upserted countries"
    );
    Ok(report)
  }

  async fn upsert_cases(&self, rows: &[CaseData]) -> Result<UpsertReport> {
    let mut report = UpsertReport::default();

    for (index, batch) in rows.chunks(self.case_batch).enumerate() {
      let batch = batch.to_vec();

      let (part, orphans): (UpsertReport, BTreeSet<String>) = self
        .conn
        .call(move |conn| {
          // Dropping `tx` on an early return rolls the whole batch back.
          let tx = conn.transaction()?;
          let mut part = UpsertReport::default();
          let mut orphans = BTreeSet::new();
          {
            let mut stmt = tx.prepare_cached(INSERT_CASE)?;
            for row in &batch {
              let c = &row.counts;
              let outcome = stmt.execute(rusqlite::params![
                row.country_iso3,
                encode_date(row.date),
                c.measles_suspect,
                c.measles_clinical,
                c.measles_epi_linked,
                c.measles_lab_confirmed,
                c.measles_total,
                c.rubella_clinical,
                c.rubella_epi_linked,
                c.rubella_lab_confirmed,
                c.rubella_total,
                c.discarded,
              ]);
              match outcome {
                Ok(0) => part.skipped += 1,
                Ok(_) => part.inserted += 1,
                Err(e) if is_foreign_key_violation(&e) => {
                  part.rejected += 1;
                  orphans.insert(row.country_iso3.clone());
                }
                Err(e) => return Err(e.into()),
              }
            }
          }
          tx.commit()?;
          Ok((part, orphans))
        })
        .await?;

      if !orphans.is_empty() {
        tracing::warn!(
          batch = index,
          rejected = part.rejected,
          countries = ?orphans,
          "case rows reference unknown countries"
        );
      }
      tracing::debug!(
        batch = index,
        inserted = part.inserted,
        skipped = part.skipped,
        "upserted case batch"
      );
      report.merge(part);
    }

    Ok(report)
  }
}

// ─── CaseStore impl ──────────────────────────────────────────────────────────

impl CaseStore for SqliteStore {
  type Error = Error;

  async fn get_countries(&self) -> Result<Vec<Country>> {
    let raws: Vec<RawCountry> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare("SELECT iso3, country, region FROM country")?;
        let rows = stmt
          .query_map([], RawCountry::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCountry::into_country).collect()
  }

  async fn get_country(&self, iso3: &str) -> Result<Option<Country>> {
    let code = normalize_iso3(iso3);

    let raw: Option<RawCountry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT iso3, country, region FROM country WHERE iso3 = ?1",
              rusqlite::params![code],
              RawCountry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawCountry::into_country).transpose()
  }

  async fn get_monthly_cases(&self) -> Result<Vec<MonthlyCase>> {
    let sql = format!(
      "SELECT {CASE_COLUMNS}, k.country, k.region
       FROM case_data c
       INNER JOIN country k ON k.iso3 = c.country_iso3
       ORDER BY c.date, c.country_iso3"
    );

    let raws: Vec<RawMonthlyCase> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawMonthlyCase::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMonthlyCase::into_monthly).collect()
  }

  async fn get_cases_by_country(&self, iso3: &str) -> Result<Vec<CaseData>> {
    let sql = format!(
      "SELECT {CASE_COLUMNS}
       FROM case_data c
       WHERE c.country_iso3 = ?1
       ORDER BY c.date"
    );
    self.query_cases(sql, vec![Some(normalize_iso3(iso3))]).await
  }

  async fn get_cases_in_range(
    &self,
    range: DateRange,
    iso3: Option<&str>,
  ) -> Result<Vec<CaseData>> {
    let sql = format!(
      "SELECT {CASE_COLUMNS}
       FROM case_data c
       WHERE c.date BETWEEN ?1 AND ?2
         AND (?3 IS NULL OR c.country_iso3 = ?3)
       ORDER BY c.date, c.country_iso3"
    );
    let params = vec![
      Some(encode_date(range.start)),
      Some(encode_date(range.end)),
      iso3.map(normalize_iso3),
    ];
    self.query_cases(sql, params).await
  }

  async fn count_countries(&self) -> Result<usize> {
    self.count("SELECT COUNT(*) FROM country").await
  }

  async fn count_cases(&self) -> Result<usize> {
    self.count("SELECT COUNT(*) FROM case_data").await
  }
}
