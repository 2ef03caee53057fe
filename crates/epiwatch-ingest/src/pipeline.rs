//! The load pipeline: extracts → dataset → sink.

use epiwatch_core::store::{CaseSink, UpsertReport};
use serde::Serialize;

use crate::{Error, Result, builder, extract::Extracts};

/// What a load wrote, and what it declined to write.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct LoadReport {
  pub countries: UpsertReport,
  pub cases:     UpsertReport,
}

fn sink_err<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Sink(Box::new(e))
}

/// Build the dataset from `extracts` and write it to `sink`.
///
/// An unparseable year or month fails before the first write. Rows that
/// collide with existing keys, lack a country code, carry a non-numeric
/// measurement, or reference a country that was never written are counted in
/// the returned report rather than failing the load.
pub async fn load<S: CaseSink>(sink: &S, extracts: &Extracts) -> Result<LoadReport> {
  let dataset = builder::build(extracts)?;

  sink.create_schema().await.map_err(sink_err)?;
  let countries = sink
    .upsert_countries(&dataset.countries)
    .await
    .map_err(sink_err)?;
  let mut cases = sink.upsert_cases(&dataset.cases).await.map_err(sink_err)?;
  cases.rejected += dataset.rejected;

  tracing::info!(
    countries_inserted = countries.inserted,
    countries_skipped = countries.skipped,
    cases_inserted = cases.inserted,
    cases_skipped = cases.skipped,
    cases_rejected = cases.rejected,
    "load complete"
  );
  if cases.rejected > 0 {
    tracing::warn!(
      rejected = cases.rejected,
      "some case rows were not loaded"
    );
  }

  Ok(LoadReport { countries, cases })
}
