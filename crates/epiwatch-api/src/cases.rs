//! Handlers for `/cases` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/cases` | Every case row joined with its country |
//! | `GET`  | `/cases/:iso3` | Date ascending; empty for unknown codes |
//! | `GET`  | `/cases/range` | `?start=YYYY-MM-DD&end=YYYY-MM-DD[&iso3=...]`; 400 on bad dates |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use epiwatch_core::{
  case::{CaseData, MonthlyCase},
  query::DateRange,
  store::CaseStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// `GET /cases`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<MonthlyCase>>, ApiError> {
  let cases = store.get_monthly_cases().await.map_err(ApiError::store)?;
  Ok(Json(cases))
}

/// `GET /cases/:iso3`
pub async fn by_country<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(iso3): Path<String>,
) -> Result<Json<Vec<CaseData>>, ApiError> {
  let cases = store
    .get_cases_by_country(&iso3)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(cases))
}

#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub start: String,
  pub end:   String,
  pub iso3:  Option<String>,
}

/// `GET /cases/range?start=...&end=...[&iso3=...]`
pub async fn range<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<CaseData>>, ApiError> {
  let range = DateRange::parse(&params.start, &params.end)?;
  let cases = store
    .get_cases_in_range(range, params.iso3.as_deref())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(cases))
}
