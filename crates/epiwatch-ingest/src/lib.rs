//! Batch ingestion of surveillance extracts into a [`CaseSink`].
//!
//! ```text
//! cases_year.csv ─┐
//!                 ├─ extract ─► builder ─► pipeline ─► CaseSink
//! cases_month.csv ┘
//! ```
//!
//! [`CaseSink`]: epiwatch_core::store::CaseSink

pub mod builder;
pub mod error;
pub mod extract;
pub mod pipeline;

pub use error::{Error, Result};
pub use extract::Extracts;
pub use pipeline::{LoadReport, load};
