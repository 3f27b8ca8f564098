//! Views over the set of vehicles currently on the premises.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator as _;

use crate::{ledger::OccupancyRecord, vehicle::VehicleClass};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Case-insensitive substring filter over plate and unit.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OccupancyFilter {
  pub plate: Option<String>,
  pub unit:  Option<String>,
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
  haystack.to_lowercase().contains(&needle.to_lowercase())
}

impl OccupancyFilter {
  pub fn is_empty(&self) -> bool { self.plate.is_none() && self.unit.is_none() }

  pub fn matches(&self, record: &OccupancyRecord) -> bool {
    let plate_ok = self
      .plate
      .as_deref()
      .is_none_or(|p| contains_ci(&record.entry.vehicle_number, p));
    // An entry without a unit never matches a unit filter.
    let unit_ok = match self.unit.as_deref() {
      None => true,
      Some(u) => record
        .entry
        .unit
        .as_deref()
        .is_some_and(|have| contains_ci(have, u)),
    };
    plate_ok && unit_ok
  }

  pub fn apply(&self, records: Vec<OccupancyRecord>) -> Vec<OccupancyRecord> {
    if self.is_empty() {
      return records;
    }
    records.into_iter().filter(|r| self.matches(r)).collect()
  }
}

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Head-count of the premises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OccupancySummary {
  /// Vehicles with an open entry.
  pub present:  usize,
  /// Registered vehicles not currently present.
  pub away:     usize,
  /// Present vehicles per class; every class is listed, possibly with zero.
  pub by_class: BTreeMap<VehicleClass, usize>,
}

impl OccupancySummary {
  pub fn tally(open: &[OccupancyRecord], registered: usize) -> Self {
    let mut by_class: BTreeMap<VehicleClass, usize> =
      VehicleClass::iter().map(|c| (c, 0)).collect();
    for record in open {
      *by_class.entry(record.vehicle.class).or_default() += 1;
    }
    Self {
      present: open.len(),
      away: registered.saturating_sub(open.len()),
      by_class,
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::Utc;

  use super::*;
  use crate::{
    ledger::{OccupancyEntry, VehicleDisplay},
    vehicle::Purpose,
  };

  fn record(plate: &str, unit: Option<&str>, class: VehicleClass) -> OccupancyRecord {
    OccupancyRecord {
      entry:   OccupancyEntry {
        entry_id:       1,
        vehicle_id:     1,
        vehicle_number: plate.into(),
        time_in:        Utc::now(),
        time_out:       None,
        purpose:        Purpose::Visitor,
        unit:           unit.map(Into::into),
      },
      vehicle: VehicleDisplay {
        owner_name:     "Owner".into(),
        vehicle_name:   "Car".into(),
        class,
        contact_number: "1".into(),
      },
    }
  }

  #[test]
  fn filter_matches_substrings_ignoring_case() {
    let filter = OccupancyFilter { plate: Some("ab12".into()), unit: None };
    assert!(filter.matches(&record("MHAB1234", None, VehicleClass::FourWheeler)));
    assert!(!filter.matches(&record("MH991234", None, VehicleClass::FourWheeler)));
  }

  #[test]
  fn unit_filter_skips_entries_without_unit() {
    let filter = OccupancyFilter { plate: None, unit: Some("b-2".into()) };
    assert!(filter.matches(&record("X", Some("B-204"), VehicleClass::TwoWheeler)));
    assert!(!filter.matches(&record("X", None, VehicleClass::TwoWheeler)));
  }

  #[test]
  fn tally_counts_present_away_and_classes() {
    let open = vec![
      record("A", None, VehicleClass::TwoWheeler),
      record("B", None, VehicleClass::TwoWheeler),
      record("C", None, VehicleClass::FourWheeler),
    ];
    let summary = OccupancySummary::tally(&open, 5);
    assert_eq!(summary.present, 3);
    assert_eq!(summary.away, 2);
    assert_eq!(summary.by_class[&VehicleClass::TwoWheeler], 2);
    assert_eq!(summary.by_class[&VehicleClass::FourWheeler], 1);
  }

  #[test]
  fn tally_lists_empty_classes() {
    let summary = OccupancySummary::tally(&[], 0);
    assert_eq!(summary.present, 0);
    assert_eq!(summary.by_class.len(), 2);
  }
}
