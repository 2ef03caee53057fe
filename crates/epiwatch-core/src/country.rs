//! Country — one row per ISO3 code.

use serde::{Deserialize, Serialize};

use crate::region::Region;

/// A reporting country. `iso3` is the primary key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Country {
  pub iso3:   String,
  /// Display name; serialised as `country` to match the extract column.
  #[serde(rename = "country")]
  pub name:   String,
  pub region: Region,
}
