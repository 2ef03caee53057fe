//! Core types and trait definitions for the epiwatch surveillance store.
//!
//! This crate is deliberately free of CSV, HTTP and database dependencies.
//! The ingest pipeline, the SQLite backend and the API all depend on it.

pub mod case;
pub mod country;
pub mod error;
pub mod query;
pub mod region;
pub mod series;
pub mod store;

pub use error::{Error, Result};
