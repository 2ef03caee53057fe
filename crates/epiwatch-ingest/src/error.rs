//! Error type for `epiwatch-ingest`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A source row could not be turned into a record. Fatal for the load;
  /// raised before anything is written.
  #[error("malformed input in {extract} at line {line}: {message}")]
  MalformedInput {
    extract: &'static str,
    line:    u64,
    message: String,
  },

  #[error("csv error: {0}")]
  Csv(#[from] csv::Error),

  #[error("cannot open {path}: {source}")]
  Open {
    path:   std::path::PathBuf,
    #[source]
    source: std::io::Error,
  },

  #[error("store error: {0}")]
  Sink(#[source] Box<dyn std::error::Error + Send + Sync>),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
