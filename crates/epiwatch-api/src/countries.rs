//! Handlers for `/countries` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/countries` | Every country, unordered |
//! | `GET`  | `/countries/:iso3` | 404 if unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use epiwatch_core::{country::Country, store::CaseStore};

use crate::error::ApiError;

/// `GET /countries`
pub async fn list<S: CaseStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Country>>, ApiError> {
  let countries = store.get_countries().await.map_err(ApiError::store)?;
  Ok(Json(countries))
}

/// `GET /countries/:iso3`
pub async fn get_one<S: CaseStore>(
  State(store): State<Arc<S>>,
  Path(iso3): Path<String>,
) -> Result<Json<Country>, ApiError> {
  let country = store
    .get_country(&iso3)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("country {iso3} not found")))?;
  Ok(Json(country))
}
