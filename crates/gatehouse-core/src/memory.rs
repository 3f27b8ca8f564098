//! [`MemoryStore`]: an in-process [`GateStore`] for tests and demos.
//!
//! Every operation runs under a single mutex, so check-in and check-out are
//! trivially atomic.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, SubsecRound as _, Utc};

use crate::{
  Error, Result,
  ledger::{CheckIn, OccupancyEntry, OccupancyRecord, VehicleDisplay},
  report::DateRange,
  store::GateStore,
  vehicle::{NewVehicle, Vehicle, VehicleUpdate, normalize_plate},
};

#[derive(Default)]
struct Tables {
  vehicles:        Vec<Vehicle>,
  entries:         Vec<OccupancyEntry>,
  last_vehicle_id: i64,
  last_entry_id:   i64,
}

impl Tables {
  fn vehicle(&self, vehicle_id: i64) -> Option<&Vehicle> {
    self.vehicles.iter().find(|v| v.vehicle_id == vehicle_id)
  }

  fn plate_taken(&self, plate: &str, except: Option<i64>) -> bool {
    self
      .vehicles
      .iter()
      .any(|v| v.vehicle_number == plate && Some(v.vehicle_id) != except)
  }

  fn enrich(&self, entry: &OccupancyEntry) -> Option<OccupancyRecord> {
    self.vehicle(entry.vehicle_id).map(|v| OccupancyRecord {
      entry:   entry.clone(),
      vehicle: VehicleDisplay::from(v),
    })
  }

  /// Enriched entries matching `keep`, newest entry first.
  fn records(&self, keep: impl Fn(&OccupancyEntry) -> bool) -> Vec<OccupancyRecord> {
    let mut out: Vec<OccupancyRecord> = self
      .entries
      .iter()
      .filter(|&e| keep(e))
      .filter_map(|e| self.enrich(e))
      .collect();
    out.sort_by(|a, b| {
      b.entry
        .time_in
        .cmp(&a.entry.time_in)
        .then(b.entry.entry_id.cmp(&a.entry.entry_id))
    });
    out
  }
}

/// A [`GateStore`] held entirely in memory.
///
/// Cloning is cheap; clones share the same tables.
#[derive(Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, Tables> {
    self.tables.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

impl GateStore for MemoryStore {
  type Error = Error;

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn register_vehicle(&self, input: NewVehicle) -> Result<Vehicle> {
    let input = input.normalized()?;
    let mut tables = self.lock();
    if tables.plate_taken(&input.vehicle_number, None) {
      return Err(Error::DuplicatePlate(input.vehicle_number));
    }
    tables.last_vehicle_id += 1;
    let vehicle = input.into_vehicle(tables.last_vehicle_id, now());
    tables.vehicles.push(vehicle.clone());
    Ok(vehicle)
  }

  async fn find_vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>> {
    let plate = normalize_plate(plate);
    let tables = self.lock();
    Ok(tables.vehicles.iter().find(|v| v.vehicle_number == plate).cloned())
  }

  async fn get_vehicle(&self, vehicle_id: i64) -> Result<Option<Vehicle>> {
    Ok(self.lock().vehicle(vehicle_id).cloned())
  }

  async fn update_vehicle(&self, vehicle_id: i64, update: VehicleUpdate) -> Result<Vehicle> {
    let mut tables = self.lock();
    let current = tables
      .vehicle(vehicle_id)
      .ok_or(Error::VehicleNotFound(vehicle_id))?;
    let next = update.apply_to(current)?;
    if tables.plate_taken(&next.vehicle_number, Some(vehicle_id)) {
      return Err(Error::DuplicatePlate(next.vehicle_number));
    }
    if let Some(slot) = tables.vehicles.iter_mut().find(|v| v.vehicle_id == vehicle_id) {
      *slot = next.clone();
    }
    Ok(next)
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
    let mut vehicles = self.lock().vehicles.clone();
    vehicles.sort_by(|a, b| {
      b.created_at
        .cmp(&a.created_at)
        .then(b.vehicle_id.cmp(&a.vehicle_id))
    });
    Ok(vehicles)
  }

  async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()> {
    let mut tables = self.lock();
    if tables.vehicle(vehicle_id).is_none() {
      return Err(Error::VehicleNotFound(vehicle_id));
    }
    if tables.entries.iter().any(|e| e.vehicle_id == vehicle_id) {
      return Err(Error::VehicleHasEntries(vehicle_id));
    }
    tables.vehicles.retain(|v| v.vehicle_id != vehicle_id);
    Ok(())
  }

  async fn registrations_between(&self, range: DateRange) -> Result<Vec<Vehicle>> {
    let mut vehicles: Vec<Vehicle> = self
      .lock()
      .vehicles
      .iter()
      .filter(|v| range.contains_date(v.registration_date))
      .cloned()
      .collect();
    vehicles.sort_by(|a, b| {
      b.registration_date
        .cmp(&a.registration_date)
        .then(b.vehicle_id.cmp(&a.vehicle_id))
    });
    Ok(vehicles)
  }

  // ── Ledger writes ─────────────────────────────────────────────────────────

  async fn check_in(&self, input: CheckIn) -> Result<OccupancyEntry> {
    let mut tables = self.lock();
    let vehicle = tables
      .vehicle(input.vehicle_id)
      .ok_or(Error::VehicleNotFound(input.vehicle_id))?;
    let already_open = tables
      .entries
      .iter()
      .any(|e| e.vehicle_id == vehicle.vehicle_id && e.is_open());
    if already_open {
      return Err(Error::AlreadyCheckedIn(vehicle.vehicle_number.clone()));
    }

    let (purpose, unit) = input.resolve(vehicle);
    let vehicle_number = vehicle.vehicle_number.clone();
    tables.last_entry_id += 1;
    let entry = OccupancyEntry {
      entry_id: tables.last_entry_id,
      vehicle_id: input.vehicle_id,
      vehicle_number,
      time_in: now(),
      time_out: None,
      purpose,
      unit,
    };
    tables.entries.push(entry.clone());
    Ok(entry)
  }

  async fn check_out(&self, entry_id: i64) -> Result<OccupancyEntry> {
    let mut tables = self.lock();
    let entry = tables
      .entries
      .iter_mut()
      .find(|e| e.entry_id == entry_id)
      .ok_or(Error::EntryNotFound(entry_id))?;
    if !entry.is_open() {
      return Err(Error::AlreadyCheckedOut(entry_id));
    }
    entry.time_out = Some(now());
    Ok(entry.clone())
  }

  // ── Ledger reads ──────────────────────────────────────────────────────────

  async fn get_entry(&self, entry_id: i64) -> Result<Option<OccupancyRecord>> {
    let tables = self.lock();
    Ok(
      tables
        .entries
        .iter()
        .find(|e| e.entry_id == entry_id)
        .and_then(|e| tables.enrich(e)),
    )
  }

  async fn open_entry_for_vehicle(&self, vehicle_id: i64) -> Result<Option<OccupancyEntry>> {
    Ok(
      self
        .lock()
        .entries
        .iter()
        .find(|e| e.vehicle_id == vehicle_id && e.is_open())
        .cloned(),
    )
  }

  async fn list_open(&self) -> Result<Vec<OccupancyRecord>> {
    Ok(self.lock().records(OccupancyEntry::is_open))
  }

  async fn list_entries(&self) -> Result<Vec<OccupancyRecord>> {
    Ok(self.lock().records(|_| true))
  }

  async fn history_for_plate(&self, plate: &str) -> Result<Vec<OccupancyRecord>> {
    let plate = normalize_plate(plate);
    Ok(self.lock().records(|e| e.vehicle_number == plate))
  }

  async fn entries_between(&self, range: DateRange) -> Result<Vec<OccupancyRecord>> {
    Ok(self.lock().records(|e| range.contains(e.time_in)))
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::*;
  use crate::vehicle::{Purpose, VehicleClass};

  fn new_vehicle(plate: &str) -> NewVehicle {
    NewVehicle {
      vehicle_number:    plate.into(),
      owner_name:        "Kiran".into(),
      contact_number:    "555".into(),
      vehicle_name:      "Pulsar".into(),
      class:             VehicleClass::TwoWheeler,
      registration_date: NaiveDate::from_ymd_opt(2026, 5, 10).unwrap(),
      unit:              None,
      purpose:           Purpose::Visitor,
    }
  }

  #[tokio::test]
  async fn duplicate_plate_is_case_insensitive() {
    let s = MemoryStore::new();
    s.register_vehicle(new_vehicle("Ka01")).await.unwrap();
    let err = s.register_vehicle(new_vehicle("KA01")).await.unwrap_err();
    assert_eq!(err, Error::DuplicatePlate("KA01".into()));
  }

  #[tokio::test]
  async fn second_check_in_is_rejected_until_check_out() {
    let s = MemoryStore::new();
    let v = s.register_vehicle(new_vehicle("KA01")).await.unwrap();

    let entry = s.check_in(CheckIn::new(v.vehicle_id)).await.unwrap();
    let err = s.check_in(CheckIn::new(v.vehicle_id)).await.unwrap_err();
    assert_eq!(err, Error::AlreadyCheckedIn("KA01".into()));

    s.check_out(entry.entry_id).await.unwrap();
    assert_eq!(
      s.check_out(entry.entry_id).await.unwrap_err(),
      Error::AlreadyCheckedOut(entry.entry_id)
    );
    s.check_in(CheckIn::new(v.vehicle_id)).await.unwrap();
    assert_eq!(s.history_for_plate("ka01").await.unwrap().len(), 2);
  }

  #[tokio::test]
  async fn concurrent_check_ins_open_one_entry() {
    let s = MemoryStore::new();
    let id = s.register_vehicle(new_vehicle("KA01")).await.unwrap().vehicle_id;

    let handles: Vec<_> = (0..8)
      .map(|_| {
        let s = s.clone();
        tokio::spawn(async move { s.check_in(CheckIn::new(id)).await })
      })
      .collect();
    let mut ok = 0;
    for h in handles {
      if h.await.unwrap().is_ok() {
        ok += 1;
      }
    }
    assert_eq!(ok, 1);
    assert_eq!(s.list_open().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn history_keeps_plate_recorded_at_check_in() {
    let s = MemoryStore::new();
    let v = s.register_vehicle(new_vehicle("OLD1")).await.unwrap();
    let entry = s.check_in(CheckIn::new(v.vehicle_id)).await.unwrap();
    s.check_out(entry.entry_id).await.unwrap();

    let update = VehicleUpdate { vehicle_number: Some("NEW1".into()), ..Default::default() };
    s.update_vehicle(v.vehicle_id, update).await.unwrap();

    let old = s.history_for_plate("old1").await.unwrap();
    assert_eq!(old.len(), 1);
    assert_eq!(old[0].entry.vehicle_number, "OLD1");
    assert!(s.history_for_plate("new1").await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn update_to_taken_plate_is_rejected() {
    let s = MemoryStore::new();
    s.register_vehicle(new_vehicle("KA01")).await.unwrap();
    let b = s.register_vehicle(new_vehicle("KA02")).await.unwrap();
    let update = VehicleUpdate { vehicle_number: Some("ka01".into()), ..Default::default() };
    assert_eq!(
      s.update_vehicle(b.vehicle_id, update).await.unwrap_err(),
      Error::DuplicatePlate("KA01".into())
    );
  }

  #[tokio::test]
  async fn delete_refuses_vehicle_with_history() {
    let s = MemoryStore::new();
    let a = s.register_vehicle(new_vehicle("KA01")).await.unwrap();
    let b = s.register_vehicle(new_vehicle("KA02")).await.unwrap();
    s.check_in(CheckIn::new(a.vehicle_id)).await.unwrap();

    assert_eq!(
      s.delete_vehicle(a.vehicle_id).await.unwrap_err(),
      Error::VehicleHasEntries(a.vehicle_id)
    );
    s.delete_vehicle(b.vehicle_id).await.unwrap();
    assert!(s.get_vehicle(b.vehicle_id).await.unwrap().is_none());
  }
}
