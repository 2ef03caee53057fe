//! Error types for `epiwatch-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A caller-supplied query argument could not be interpreted.
  #[error("invalid query input: {0}")]
  InvalidQueryInput(String),

  #[error("unknown region code: {0:?}")]
  UnknownRegion(String),

  #[error("unknown case metric: {0:?}")]
  UnknownMetric(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
