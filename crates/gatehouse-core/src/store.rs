//! The `GateStore` trait.
//!
//! The trait is implemented by storage backends (`gatehouse-store-sqlite`,
//! and [`crate::memory::MemoryStore`] for tests). Higher layers
//! (`gatehouse-api`, `gatehouse-server`) depend on this abstraction, not on
//! any concrete backend.

use std::future::Future;

use crate::{
  Error,
  ledger::{CheckIn, OccupancyEntry, OccupancyRecord},
  report::DateRange,
  vehicle::{NewVehicle, Vehicle, VehicleUpdate},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Bound on a backend's error type.
///
/// Backends wrap the domain [`Error`] alongside their own failure modes;
/// `domain` lets callers tell the two apart without knowing the backend.
pub trait StoreError: std::error::Error + From<Error> + Send + Sync + 'static {
  fn domain(&self) -> Option<&Error>;
}

impl StoreError for Error {
  fn domain(&self) -> Option<&Error> { Some(self) }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Gatehouse store backend.
///
/// Backends must make `check_in` and `check_out` atomic per vehicle: two
/// concurrent check-ins of the same vehicle yield exactly one open entry and
/// one [`Error::AlreadyCheckedIn`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GateStore: Send + Sync {
  type Error: StoreError;

  // ── Registry ──────────────────────────────────────────────────────────

  /// Validate, normalise and persist a new vehicle.
  ///
  /// Fails with [`Error::DuplicatePlate`] if the canonical plate is taken.
  fn register_vehicle(
    &self,
    input: NewVehicle,
  ) -> impl Future<Output = Result<Vehicle, Self::Error>> + Send + '_;

  /// Case-insensitive lookup by plate. Returns `None` if not found.
  fn find_vehicle_by_plate<'a>(
    &'a self,
    plate: &'a str,
  ) -> impl Future<Output = Result<Option<Vehicle>, Self::Error>> + Send + 'a;

  /// Retrieve a vehicle by id. Returns `None` if not found.
  fn get_vehicle(
    &self,
    vehicle_id: i64,
  ) -> impl Future<Output = Result<Option<Vehicle>, Self::Error>> + Send + '_;

  /// Apply a sparse update and return the stored result.
  fn update_vehicle(
    &self,
    vehicle_id: i64,
    update: VehicleUpdate,
  ) -> impl Future<Output = Result<Vehicle, Self::Error>> + Send + '_;

  /// All vehicles, newest registration first.
  fn list_vehicles(
    &self,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  /// Remove a vehicle that has never been checked in.
  ///
  /// Ledger entries are never deleted, so a vehicle with history fails with
  /// [`Error::VehicleHasEntries`].
  fn delete_vehicle(
    &self,
    vehicle_id: i64,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  /// Vehicles whose registration date lies in `range`, newest date first.
  fn registrations_between(
    &self,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<Vehicle>, Self::Error>> + Send + '_;

  // ── Ledger writes ─────────────────────────────────────────────────────

  /// Open an entry for a vehicle, stamped with the current time.
  fn check_in(
    &self,
    input: CheckIn,
  ) -> impl Future<Output = Result<OccupancyEntry, Self::Error>> + Send + '_;

  /// Close an open entry, stamping `time_out` with the current time.
  ///
  /// Not idempotent: closing a closed entry fails with
  /// [`Error::AlreadyCheckedOut`].
  fn check_out(
    &self,
    entry_id: i64,
  ) -> impl Future<Output = Result<OccupancyEntry, Self::Error>> + Send + '_;

  // ── Ledger reads ──────────────────────────────────────────────────────

  /// Retrieve one enriched entry. Returns `None` if not found.
  fn get_entry(
    &self,
    entry_id: i64,
  ) -> impl Future<Output = Result<Option<OccupancyRecord>, Self::Error>> + Send + '_;

  /// The vehicle's open entry, if it is on the premises.
  fn open_entry_for_vehicle(
    &self,
    vehicle_id: i64,
  ) -> impl Future<Output = Result<Option<OccupancyEntry>, Self::Error>> + Send + '_;

  /// Entries with no exit time, newest entry first.
  fn list_open(
    &self,
  ) -> impl Future<Output = Result<Vec<OccupancyRecord>, Self::Error>> + Send + '_;

  /// Every entry, newest entry first.
  fn list_entries(
    &self,
  ) -> impl Future<Output = Result<Vec<OccupancyRecord>, Self::Error>> + Send + '_;

  /// Open and closed entries recorded under `plate` at check-in, newest
  /// first. Visits made before a plate change stay with the old plate.
  fn history_for_plate<'a>(
    &'a self,
    plate: &'a str,
  ) -> impl Future<Output = Result<Vec<OccupancyRecord>, Self::Error>> + Send + 'a;

  /// Entries whose entry time falls in `range`, newest first.
  fn entries_between(
    &self,
    range: DateRange,
  ) -> impl Future<Output = Result<Vec<OccupancyRecord>, Self::Error>> + Send + '_;
}
