//! Plate-driven gate operations.
//!
//! Guards at the gate know a plate, not an id. These helpers resolve the plate
//! against the registry and then drive the ledger.

use crate::{
  Error,
  ledger::{CheckIn, OccupancyEntry},
  store::GateStore,
  vehicle::{Purpose, normalize_plate},
};

/// Check in the vehicle registered under `plate`.
pub async fn check_in_plate<S: GateStore>(
  store: &S,
  plate: &str,
  purpose: Option<Purpose>,
  unit: Option<String>,
) -> Result<OccupancyEntry, S::Error> {
  let vehicle = store
    .find_vehicle_by_plate(plate)
    .await?
    .ok_or_else(|| Error::PlateNotFound(normalize_plate(plate)))?;

  store
    .check_in(CheckIn { vehicle_id: vehicle.vehicle_id, purpose, unit })
    .await
}

/// Close the open entry of the vehicle registered under `plate`.
pub async fn check_out_plate<S: GateStore>(
  store: &S,
  plate: &str,
) -> Result<OccupancyEntry, S::Error> {
  let vehicle = store
    .find_vehicle_by_plate(plate)
    .await?
    .ok_or_else(|| Error::PlateNotFound(normalize_plate(plate)))?;

  let open = store
    .open_entry_for_vehicle(vehicle.vehicle_id)
    .await?
    .ok_or_else(|| Error::NotCheckedIn(vehicle.vehicle_number.clone()))?;

  store.check_out(open.entry_id).await
}
