//! Occupancy ledger records.
//!
//! An entry is opened on check-in and closed exactly once on check-out by
//! stamping `time_out`. A vehicle has at most one open entry at a time.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::vehicle::{Purpose, Vehicle, VehicleClass, normalize_unit};

// ─── Entry ───────────────────────────────────────────────────────────────────

/// One visit of a vehicle to the premises.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyEntry {
  pub entry_id:       i64,
  pub vehicle_id:     i64,
  /// Plate as it was when the entry was opened.
  pub vehicle_number: String,
  pub time_in:        DateTime<Utc>,
  /// `None` while the vehicle is on the premises.
  pub time_out:       Option<DateTime<Utc>>,
  pub purpose:        Purpose,
  pub unit:           Option<String>,
}

impl OccupancyEntry {
  pub fn is_open(&self) -> bool { self.time_out.is_none() }

  /// Time spent on the premises; `None` while the entry is open.
  pub fn duration(&self) -> Option<Duration> {
    self.time_out.map(|out| out - self.time_in)
  }
}

// ─── CheckIn ─────────────────────────────────────────────────────────────────

/// Input to [`crate::store::GateStore::check_in`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckIn {
  pub vehicle_id: i64,
  /// Falls back to the vehicle's registered purpose.
  #[serde(default)]
  pub purpose:    Option<Purpose>,
  /// Falls back to the vehicle's registered unit.
  #[serde(default)]
  pub unit:       Option<String>,
}

impl CheckIn {
  pub fn new(vehicle_id: i64) -> Self {
    Self { vehicle_id, purpose: None, unit: None }
  }

  /// Resolve purpose and unit against the vehicle's registered defaults.
  pub fn resolve(&self, vehicle: &Vehicle) -> (Purpose, Option<String>) {
    let purpose = self.purpose.unwrap_or(vehicle.purpose);
    let unit = normalize_unit(self.unit.clone()).or_else(|| vehicle.unit.clone());
    (purpose, unit)
  }
}

// ─── Enriched record ─────────────────────────────────────────────────────────

/// Display fields joined in from the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VehicleDisplay {
  pub owner_name:     String,
  pub vehicle_name:   String,
  pub class:          VehicleClass,
  pub contact_number: String,
}

impl From<&Vehicle> for VehicleDisplay {
  fn from(v: &Vehicle) -> Self {
    Self {
      owner_name:     v.owner_name.clone(),
      vehicle_name:   v.vehicle_name.clone(),
      class:          v.class,
      contact_number: v.contact_number.clone(),
    }
  }
}

/// An entry together with the referenced vehicle's display fields. This is
/// the shape every ledger listing returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
  #[serde(flatten)]
  pub entry:   OccupancyEntry,
  #[serde(flatten)]
  pub vehicle: VehicleDisplay,
}
