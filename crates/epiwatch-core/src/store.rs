//! The [`CaseStore`] and [`CaseSink`] traits.
//!
//! Storage backends (e.g. `epiwatch-store-sqlite`) implement both. The load
//! pipeline only sees [`CaseSink`]; the API and any presentation tier only
//! see [`CaseStore`], so nothing downstream of the load can write.

use std::future::Future;

use serde::{Deserialize, Serialize};

use crate::{
  case::{CaseData, MonthlyCase},
  country::Country,
  query::DateRange,
};

// ─── Write outcome ───────────────────────────────────────────────────────────

/// Per-call accounting for an insert-or-ignore write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertReport {
  /// Rows that were newly written.
  pub inserted: usize,
  /// Rows ignored because their key already existed.
  pub skipped:  usize,
  /// Rows refused because they referenced a missing country.
  pub rejected: usize,
}

impl UpsertReport {
  pub fn total(&self) -> usize { self.inserted + self.skipped + self.rejected }

  pub fn merge(&mut self, other: UpsertReport) {
    self.inserted += other.inserted;
    self.skipped += other.skipped;
    self.rejected += other.rejected;
  }
}

// ─── Reads ───────────────────────────────────────────────────────────────────

/// Read-only access to persisted countries and case records.
///
/// All methods return `Send` futures so the trait can be used behind `axum`
/// handlers on a multi-threaded runtime.
pub trait CaseStore: Send + Sync {
  type Error: std::error::Error + From<crate::Error> + Send + Sync + 'static;

  /// All countries, in no particular order.
  fn get_countries(
    &self,
  ) -> impl Future<Output = Result<Vec<Country>, Self::Error>> + Send + '_;

  /// A single country by ISO3 code (case-insensitive). `None` if unknown.
  fn get_country<'a>(
    &'a self,
    iso3: &'a str,
  ) -> impl Future<Output = Result<Option<Country>, Self::Error>> + Send + 'a;

  /// Every case row inner-joined with its country. Rows whose country is
  /// absent are excluded.
  fn get_monthly_cases(
    &self,
  ) -> impl Future<Output = Result<Vec<MonthlyCase>, Self::Error>> + Send + '_;

  /// Case rows for one country, date ascending. Unknown codes yield an empty
  /// vector.
  fn get_cases_by_country<'a>(
    &'a self,
    iso3: &'a str,
  ) -> impl Future<Output = Result<Vec<CaseData>, Self::Error>> + Send + 'a;

  /// Case rows with `date` inside `range` (inclusive), optionally restricted
  /// to one country, date ascending.
  fn get_cases_in_range<'a>(
    &'a self,
    range: DateRange,
    iso3: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<CaseData>, Self::Error>> + Send + 'a;

  /// Like [`get_cases_in_range`](Self::get_cases_in_range) but takes the
  /// bounds as `YYYY-MM-DD` strings. Unparseable bounds fail with
  /// [`crate::Error::InvalidQueryInput`].
  fn get_cases_by_date_range<'a>(
    &'a self,
    start: &'a str,
    end: &'a str,
    iso3: Option<&'a str>,
  ) -> impl Future<Output = Result<Vec<CaseData>, Self::Error>> + Send + 'a {
    async move {
      let range = DateRange::parse(start, end)?;
      self.get_cases_in_range(range, iso3).await
    }
  }

  fn count_countries(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  fn count_cases(&self) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;
}

// ─── Writes ──────────────────────────────────────────────────────────────────

/// Write access used exclusively by the load pipeline.
///
/// Every write is insert-or-ignore: existing keys are never overwritten, and
/// re-running a load against the same input is a no-op.
pub trait CaseSink: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Create both relations and their constraints if absent. Idempotent.
  fn create_schema(&self) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Insert countries, skipping any whose `iso3` already exists.
  fn upsert_countries<'a>(
    &'a self,
    rows: &'a [Country],
  ) -> impl Future<Output = Result<UpsertReport, Self::Error>> + Send + 'a;

  /// Insert case rows in batches, skipping existing `(country_iso3, date)`
  /// keys and rejecting rows whose country is absent. Each batch is atomic;
  /// the call as a whole is not.
  fn upsert_cases<'a>(
    &'a self,
    rows: &'a [CaseData],
  ) -> impl Future<Output = Result<UpsertReport, Self::Error>> + Send + 'a;
}
