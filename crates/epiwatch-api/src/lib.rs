//! JSON REST API for epiwatch.
//!
//! Exposes a read-only axum [`Router`] backed by any
//! [`epiwatch_core::store::CaseStore`]. This is the surface dashboard pages
//! consume; nothing here can write to the store.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", epiwatch_api::api_router(Arc::new(store)))
//! ```

pub mod cases;
pub mod countries;
pub mod error;
pub mod series;

use std::sync::Arc;

use axum::{Router, routing::get};
use epiwatch_core::store::CaseStore;

pub use error::ApiError;

/// Build the API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CaseStore + 'static,
{
  Router::new()
    // Countries
    .route("/countries", get(countries::list::<S>))
    .route("/countries/{iso3}", get(countries::get_one::<S>))
    // Cases
    .route("/cases", get(cases::list::<S>))
    .route("/cases/range", get(cases::range::<S>))
    .route("/cases/{iso3}", get(cases::by_country::<S>))
    // Aggregates
    .route("/series", get(series::totals::<S>))
    .route("/series/profile", get(series::profile::<S>))
    .with_state(store)
}
