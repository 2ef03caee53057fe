//! Handlers for `/series` endpoints — aggregated views over every joined
//! case row.
//!
//! Both accept `?metric=<column>` (default `measles_total`) and
//! `?regions=AFR,EUR` (default: all regions). Regional office codes such as
//! `AFRO` are accepted as well.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use epiwatch_core::{
  region::Region,
  series::{CaseMetric, MonthMean, SeriesPoint, monthly_profile, totals_by_date},
  store::CaseStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct SeriesParams {
  /// Column name of the measurement to aggregate.
  pub metric:  Option<String>,
  /// Comma-separated region codes.
  pub regions: Option<String>,
}

impl SeriesParams {
  fn metric(&self) -> Result<CaseMetric, ApiError> {
    match &self.metric {
      Some(m) => Ok(m.parse()?),
      None => Ok(CaseMetric::MeaslesTotal),
    }
  }

  fn regions(&self) -> Result<Vec<Region>, ApiError> {
    self
      .regions
      .as_deref()
      .unwrap_or_default()
      .split(',')
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(|s| {
        Region::normalize(s).ok_or_else(|| ApiError::BadRequest(format!("unknown region {s:?}")))
      })
      .collect()
  }
}

/// `GET /series[?metric=...][&regions=...]`
pub async fn totals<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SeriesParams>,
) -> Result<Json<Vec<SeriesPoint>>, ApiError> {
  let metric = params.metric()?;
  let regions = params.regions()?;
  let cases = store.get_monthly_cases().await.map_err(ApiError::store)?;
  Ok(Json(totals_by_date(&cases, metric, &regions)))
}

/// `GET /series/profile[?metric=...][&regions=...]`
pub async fn profile<S: CaseStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<SeriesParams>,
) -> Result<Json<Vec<MonthMean>>, ApiError> {
  let metric = params.metric()?;
  let regions = params.regions()?;
  let cases = store.get_monthly_cases().await.map_err(ApiError::store)?;
  Ok(Json(monthly_profile(&cases, metric, &regions)))
}
