//! Aggregations over joined monthly case rows.
//!
//! These are the reductions a dashboard needs for its time-series and
//! seasonality views: sum a chosen measurement per month (optionally per
//! region) and average it per calendar month.

use std::{collections::BTreeMap, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{case::CaseCounts, case::MonthlyCase, region::Region, Error};

/// One of the ten measured fields of a case record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CaseMetric {
  MeaslesSuspect,
  MeaslesClinical,
  MeaslesEpiLinked,
  MeaslesLabConfirmed,
  MeaslesTotal,
  RubellaClinical,
  RubellaEpiLinked,
  RubellaLabConfirmed,
  RubellaTotal,
  Discarded,
}

impl CaseMetric {
  pub const ALL: [CaseMetric; 10] = [
    CaseMetric::MeaslesSuspect,
    CaseMetric::MeaslesClinical,
    CaseMetric::MeaslesEpiLinked,
    CaseMetric::MeaslesLabConfirmed,
    CaseMetric::MeaslesTotal,
    CaseMetric::RubellaClinical,
    CaseMetric::RubellaEpiLinked,
    CaseMetric::RubellaLabConfirmed,
    CaseMetric::RubellaTotal,
    CaseMetric::Discarded,
  ];

  /// Column name in extracts and in the `case_data` table.
  pub fn column(self) -> &'static str {
    match self {
      CaseMetric::MeaslesSuspect => "measles_suspect",
      CaseMetric::MeaslesClinical => "measles_clinical",
      CaseMetric::MeaslesEpiLinked => "measles_epi_linked",
      CaseMetric::MeaslesLabConfirmed => "measles_lab_confirmed",
      CaseMetric::MeaslesTotal => "measles_total",
      CaseMetric::RubellaClinical => "rubella_clinical",
      CaseMetric::RubellaEpiLinked => "rubella_epi_linked",
      CaseMetric::RubellaLabConfirmed => "rubella_lab_confirmed",
      CaseMetric::RubellaTotal => "rubella_total",
      CaseMetric::Discarded => "discarded",
    }
  }

  pub fn value(self, counts: &CaseCounts) -> f64 {
    match self {
      CaseMetric::MeaslesSuspect => counts.measles_suspect,
      CaseMetric::MeaslesClinical => counts.measles_clinical,
      CaseMetric::MeaslesEpiLinked => counts.measles_epi_linked,
      CaseMetric::MeaslesLabConfirmed => counts.measles_lab_confirmed,
      CaseMetric::MeaslesTotal => counts.measles_total,
      CaseMetric::RubellaClinical => counts.rubella_clinical,
      CaseMetric::RubellaEpiLinked => counts.rubella_epi_linked,
      CaseMetric::RubellaLabConfirmed => counts.rubella_lab_confirmed,
      CaseMetric::RubellaTotal => counts.rubella_total,
      CaseMetric::Discarded => counts.discarded,
    }
  }
}

impl fmt::Display for CaseMetric {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.column()) }
}

impl FromStr for CaseMetric {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    CaseMetric::ALL
      .into_iter()
      .find(|m| m.column() == s)
      .ok_or_else(|| Error::UnknownMetric(s.to_owned()))
  }
}

/// A single point of a monthly series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
  pub date:  NaiveDate,
  pub value: f64,
}

/// Mean value for one calendar month across all years.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthMean {
  pub month: u32,
  pub mean:  f64,
}

fn selected(regions: &[Region], region: Region) -> bool {
  regions.is_empty() || regions.contains(&region)
}

/// Sum `metric` per month over the rows whose region is in `regions` (an
/// empty slice selects every region). Ascending by date.
pub fn totals_by_date(
  cases: &[MonthlyCase],
  metric: CaseMetric,
  regions: &[Region],
) -> Vec<SeriesPoint> {
  let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for row in cases.iter().filter(|r| selected(regions, r.region)) {
    *sums.entry(row.case.date).or_default() += metric.value(&row.case.counts);
  }
  sums
    .into_iter()
    .map(|(date, value)| SeriesPoint { date, value })
    .collect()
}

/// Sum `metric` per month and region. Ascending by date, then region.
pub fn totals_by_region(
  cases: &[MonthlyCase],
  metric: CaseMetric,
) -> BTreeMap<(NaiveDate, Region), f64> {
  let mut sums = BTreeMap::new();
  for row in cases {
    *sums.entry((row.case.date, row.region)).or_default() +=
      metric.value(&row.case.counts);
  }
  sums
}

/// Mean of `metric` per calendar month (1..=12) across every selected row.
/// Months with no rows are omitted.
pub fn monthly_profile(
  cases: &[MonthlyCase],
  metric: CaseMetric,
  regions: &[Region],
) -> Vec<MonthMean> {
  let mut acc: BTreeMap<u32, (f64, usize)> = BTreeMap::new();
  for row in cases.iter().filter(|r| selected(regions, r.region)) {
    let slot = acc.entry(row.case.date.month()).or_default();
    slot.0 += metric.value(&row.case.counts);
    slot.1 += 1;
  }
  acc
    .into_iter()
    .map(|(month, (sum, n))| MonthMean { month, mean: sum / n as f64 })
    .collect()
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::case::{month_start, CaseData};

  fn row(iso3: &str, region: Region, year: i32, month: u32, measles: f64) -> MonthlyCase {
    MonthlyCase {
      case:    CaseData {
        country_iso3: iso3.into(),
        date:         month_start(year, month).unwrap(),
        counts:       CaseCounts { measles_total: measles, ..Default::default() },
      },
      country: iso3.into(),
      region,
    }
  }

  fn sample() -> Vec<MonthlyCase> {
    vec![
      row("DZA", Region::Afr, 2012, 2, 10.0),
      row("FRA", Region::Eur, 2012, 1, 3.0),
      row("DZA", Region::Afr, 2012, 1, 5.0),
      row("DZA", Region::Afr, 2013, 1, 7.0),
    ]
  }

  #[test]
  fn metric_round_trips_through_column_name() {
    for m in CaseMetric::ALL {
      assert_eq!(m.column().parse::<CaseMetric>().unwrap(), m);
    }
    assert!(matches!("measles".parse::<CaseMetric>(), Err(Error::UnknownMetric(_))));
  }

  #[test]
  fn totals_by_date_sums_all_regions() {
    let series = totals_by_date(&sample(), CaseMetric::MeaslesTotal, &[]);
    let values: Vec<f64> = series.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![8.0, 10.0, 7.0]);
    assert!(series.windows(2).all(|w| w[0].date < w[1].date));
  }

  #[test]
  fn totals_by_date_respects_region_filter() {
    let series = totals_by_date(&sample(), CaseMetric::MeaslesTotal, &[Region::Eur]);
    assert_eq!(series.len(), 1);
    assert_eq!(series[0].value, 3.0);
  }

  #[test]
  fn totals_by_region_keys_on_date_and_region() {
    let sums = totals_by_region(&sample(), CaseMetric::MeaslesTotal);
    let jan = month_start(2012, 1).unwrap();
    assert_eq!(sums[&(jan, Region::Afr)], 5.0);
    assert_eq!(sums[&(jan, Region::Eur)], 3.0);
    assert_eq!(sums.len(), 4);
  }

  #[test]
  fn monthly_profile_averages_per_calendar_month() {
    let profile = monthly_profile(&sample(), CaseMetric::MeaslesTotal, &[Region::Afr]);
    assert_eq!(profile, vec![
      MonthMean { month: 1, mean: 6.0 },
      MonthMean { month: 2, mean: 10.0 },
    ]);
  }

  #[test]
  fn other_metrics_read_their_own_field() {
    let series = totals_by_date(&sample(), CaseMetric::RubellaTotal, &[]);
    assert!(series.iter().all(|p| p.value == 0.0));
  }
}
