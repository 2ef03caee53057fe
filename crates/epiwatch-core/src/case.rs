//! Monthly case records.
//!
//! A [`CaseData`] row is keyed by `(country_iso3, date)` where `date` is
//! always the first day of the reporting month. Measurements are zero-filled
//! at load time, so every field of [`CaseCounts`] is a plain `f64`.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::region::Region;

/// The ten measurements reported per country and month.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CaseCounts {
  pub measles_suspect:       f64,
  pub measles_clinical:      f64,
  pub measles_epi_linked:    f64,
  pub measles_lab_confirmed: f64,
  pub measles_total:         f64,
  pub rubella_clinical:      f64,
  pub rubella_epi_linked:    f64,
  pub rubella_lab_confirmed: f64,
  pub rubella_total:         f64,
  pub discarded:             f64,
}

/// One row of the `case_data` relation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CaseData {
  pub country_iso3: String,
  /// First calendar day of the reporting month.
  pub date:         NaiveDate,
  #[serde(flatten)]
  pub counts:       CaseCounts,
}

/// A [`CaseData`] row joined with its country's name and region.
///
/// Never stored; produced by the inner join in
/// [`CaseStore::get_monthly_cases`](crate::store::CaseStore::get_monthly_cases).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCase {
  #[serde(flatten)]
  pub case:    CaseData,
  pub country: String,
  pub region:  Region,
}

/// Returns the first day of `month` in `year`, or `None` when either
/// component is outside the calendar.
pub fn month_start(year: i32, month: u32) -> Option<NaiveDate> {
  NaiveDate::from_ymd_opt(year, month, 1)
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn month_start_is_first_of_month() {
    let d = month_start(2012, 7).unwrap();
    assert_eq!(d, NaiveDate::from_ymd_opt(2012, 7, 1).unwrap());
  }

  #[test]
  fn month_start_rejects_out_of_range() {
    assert!(month_start(2012, 0).is_none());
    assert!(month_start(2012, 13).is_none());
  }

  #[test]
  fn monthly_case_serializes_flat() {
    let row = MonthlyCase {
      case:    CaseData {
        country_iso3: "DZA".into(),
        date:         month_start(2012, 1).unwrap(),
        counts:       CaseCounts { measles_total: 4.0, ..Default::default() },
      },
      country: "Algeria".into(),
      region:  Region::Afr,
    };
    let json = serde_json::to_value(&row).unwrap();
    assert_eq!(json["country_iso3"], "DZA");
    assert_eq!(json["date"], "2012-01-01");
    assert_eq!(json["measles_total"], 4.0);
    assert_eq!(json["discarded"], 0.0);
    assert_eq!(json["region"], "AFR");
  }
}
