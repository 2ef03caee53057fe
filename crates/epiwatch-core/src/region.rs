//! WHO regions and the normalizer for the regional office codes found in
//! surveillance extracts.
//!
//! Extracts disagree on spelling: some carry the regional office code
//! (`AFRO`, `SEARO`), others the short region code (`AFR`, `SEAR`). Only the
//! short form is ever stored.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Error;

/// A canonical WHO region code.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "UPPERCASE")]
pub enum Region {
  Afr,
  Amr,
  Sear,
  Eur,
  Emr,
  Wpr,
}

impl Region {
  pub const ALL: [Region; 6] = [
    Region::Afr,
    Region::Amr,
    Region::Sear,
    Region::Eur,
    Region::Emr,
    Region::Wpr,
  ];

  /// Map a raw region label from an extract to its canonical region.
  ///
  /// Accepts both regional office codes (`"WPRO"`) and canonical codes
  /// (`"WPR"`). Returns `None` for anything else, including the empty string.
  pub fn normalize(raw: &str) -> Option<Region> {
    match raw.trim() {
      "AFRO" | "AFR" => Some(Region::Afr),
      "EURO" | "EUR" => Some(Region::Eur),
      "WPRO" | "WPR" => Some(Region::Wpr),
      "AMRO" | "AMR" => Some(Region::Amr),
      "EMRO" | "EMR" => Some(Region::Emr),
      "SEARO" | "SEAR" => Some(Region::Sear),
      _ => None,
    }
  }

  /// The canonical code as stored in the `country.region` column.
  pub fn code(self) -> &'static str {
    match self {
      Region::Afr => "AFR",
      Region::Amr => "AMR",
      Region::Sear => "SEAR",
      Region::Eur => "EUR",
      Region::Emr => "EMR",
      Region::Wpr => "WPR",
    }
  }

  /// Display name used for legends and filters.
  pub fn name(self) -> &'static str {
    match self {
      Region::Afr => "African Region",
      Region::Amr => "Region of the Americas",
      Region::Sear => "South-East Asia Region",
      Region::Eur => "European Region",
      Region::Emr => "Eastern Mediterranean Region",
      Region::Wpr => "Western Pacific Region",
    }
  }
}

impl fmt::Display for Region {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.code()) }
}

/// Strict parse: only canonical codes are accepted. Use
/// [`Region::normalize`] for raw extract labels.
impl FromStr for Region {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Region::ALL
      .into_iter()
      .find(|r| r.code() == s)
      .ok_or_else(|| Error::UnknownRegion(s.to_owned()))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn office_codes_map_to_canonical() {
    let cases = [
      ("AFRO", Region::Afr),
      ("EURO", Region::Eur),
      ("WPRO", Region::Wpr),
      ("AMRO", Region::Amr),
      ("EMRO", Region::Emr),
      ("SEARO", Region::Sear),
    ];
    for (raw, expected) in cases {
      assert_eq!(Region::normalize(raw), Some(expected), "{raw}");
    }
  }

  #[test]
  fn canonical_codes_map_to_themselves() {
    for region in Region::ALL {
      assert_eq!(Region::normalize(region.code()), Some(region));
    }
    assert_eq!(Region::normalize("AFR").map(Region::code), Some("AFR"));
  }

  #[test]
  fn unrecognized_labels_are_unmapped() {
    assert_eq!(Region::normalize(""), None);
    assert_eq!(Region::normalize("afro"), None);
    assert_eq!(Region::normalize("Africa"), None);
    assert_eq!(Region::normalize("PAHO"), None);
  }

  #[test]
  fn surrounding_whitespace_is_ignored() {
    assert_eq!(Region::normalize(" SEARO "), Some(Region::Sear));
  }

  #[test]
  fn from_str_rejects_office_codes() {
    assert_eq!("EMR".parse::<Region>().unwrap(), Region::Emr);
    assert!(matches!("EMRO".parse::<Region>(), Err(Error::UnknownRegion(_))));
  }

  #[test]
  fn serializes_as_canonical_code() {
    assert_eq!(serde_json::to_string(&Region::Sear).unwrap(), "\"SEAR\"");
    let back: Region = serde_json::from_str("\"WPR\"").unwrap();
    assert_eq!(back, Region::Wpr);
  }
}
