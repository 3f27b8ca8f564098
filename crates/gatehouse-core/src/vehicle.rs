//! Vehicle registry records.
//!
//! A vehicle is keyed by its plate number. Plates are case-insensitive; the
//! canonical form is trimmed and upper-cased, and every write path stores only
//! the canonical form.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The class of a vehicle. The string forms match the persisted column
/// values.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
  strum::EnumIter,
)]
pub enum VehicleClass {
  #[serde(rename = "2-Wheeler")]
  #[strum(serialize = "2-Wheeler")]
  TwoWheeler,
  #[serde(rename = "4-Wheeler")]
  #[strum(serialize = "4-Wheeler")]
  FourWheeler,
}

/// Why a vehicle is on the premises.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Default,
  Serialize,
  Deserialize,
  strum::Display,
  strum::EnumString,
  strum::AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Purpose {
  Resident,
  #[default]
  Visitor,
  Delivery,
  Service,
  Maintenance,
  Other,
}

// ─── Normalisation ───────────────────────────────────────────────────────────

/// Canonical form of a plate number: trimmed and upper-cased.
pub fn normalize_plate(plate: &str) -> String { plate.trim().to_uppercase() }

/// Blank unit identifiers are stored as `None`.
pub fn normalize_unit(unit: Option<String>) -> Option<String> {
  unit
    .map(|u| u.trim().to_owned())
    .filter(|u| !u.is_empty())
}

fn require(field: &'static str, value: String) -> Result<String> {
  let value = value.trim().to_owned();
  if value.is_empty() {
    return Err(Error::MissingField(field));
  }
  Ok(value)
}

// ─── Vehicle ─────────────────────────────────────────────────────────────────

/// A registered vehicle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vehicle {
  pub vehicle_id:        i64,
  /// Canonical plate number.
  pub vehicle_number:    String,
  pub owner_name:        String,
  pub contact_number:    String,
  /// Display name, e.g. "Honda City".
  pub vehicle_name:      String,
  pub class:             VehicleClass,
  pub registration_date: NaiveDate,
  /// Flat or unit the vehicle belongs to, if any.
  pub unit:              Option<String>,
  /// Default purpose applied on check-in when none is given.
  pub purpose:           Purpose,
  /// Store-assigned; never changes after registration.
  pub created_at:        DateTime<Utc>,
}

// ─── NewVehicle ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::GateStore::register_vehicle`].
/// `vehicle_id` and `created_at` are always assigned by the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewVehicle {
  pub vehicle_number:    String,
  pub owner_name:        String,
  pub contact_number:    String,
  pub vehicle_name:      String,
  pub class:             VehicleClass,
  pub registration_date: NaiveDate,
  #[serde(default)]
  pub unit:              Option<String>,
  #[serde(default)]
  pub purpose:           Purpose,
}

impl NewVehicle {
  /// Validate required fields and bring the input into canonical form.
  pub fn normalized(self) -> Result<Self> {
    Ok(Self {
      vehicle_number:    normalize_plate(&require(
        "vehicle_number",
        self.vehicle_number,
      )?),
      owner_name:        require("owner_name", self.owner_name)?,
      contact_number:    require("contact_number", self.contact_number)?,
      vehicle_name:      require("vehicle_name", self.vehicle_name)?,
      class:             self.class,
      registration_date: self.registration_date,
      unit:              normalize_unit(self.unit),
      purpose:           self.purpose,
    })
  }

  /// Materialise the stored record once the store has assigned identity.
  pub fn into_vehicle(self, vehicle_id: i64, created_at: DateTime<Utc>) -> Vehicle {
    Vehicle {
      vehicle_id,
      vehicle_number: self.vehicle_number,
      owner_name: self.owner_name,
      contact_number: self.contact_number,
      vehicle_name: self.vehicle_name,
      class: self.class,
      registration_date: self.registration_date,
      unit: self.unit,
      purpose: self.purpose,
      created_at,
    }
  }
}

// ─── VehicleUpdate ───────────────────────────────────────────────────────────

/// A sparse set of field changes. `None` leaves a field untouched; a blank
/// `unit` clears it.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleUpdate {
  pub vehicle_number:    Option<String>,
  pub owner_name:        Option<String>,
  pub contact_number:    Option<String>,
  pub vehicle_name:      Option<String>,
  pub class:             Option<VehicleClass>,
  pub registration_date: Option<NaiveDate>,
  pub unit:              Option<String>,
  pub purpose:           Option<Purpose>,
}

impl VehicleUpdate {
  /// Apply the update to `current`, returning the new record. `current` is
  /// left untouched if any field fails validation.
  pub fn apply_to(self, current: &Vehicle) -> Result<Vehicle> {
    let mut next = current.clone();
    if let Some(plate) = self.vehicle_number {
      next.vehicle_number = normalize_plate(&require("vehicle_number", plate)?);
    }
    if let Some(name) = self.owner_name {
      next.owner_name = require("owner_name", name)?;
    }
    if let Some(contact) = self.contact_number {
      next.contact_number = require("contact_number", contact)?;
    }
    if let Some(name) = self.vehicle_name {
      next.vehicle_name = require("vehicle_name", name)?;
    }
    if let Some(class) = self.class {
      next.class = class;
    }
    if let Some(date) = self.registration_date {
      next.registration_date = date;
    }
    if let Some(unit) = self.unit {
      next.unit = normalize_unit(Some(unit));
    }
    if let Some(purpose) = self.purpose {
      next.purpose = purpose;
    }
    Ok(next)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn new_vehicle() -> NewVehicle {
    NewVehicle {
      vehicle_number:    "  mh12ab1234 ".into(),
      owner_name:        "Asha Rao".into(),
      contact_number:    "9800000000".into(),
      vehicle_name:      "Honda City".into(),
      class:             VehicleClass::FourWheeler,
      registration_date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
      unit:              Some("   ".into()),
      purpose:           Purpose::Resident,
    }
  }

  #[test]
  fn plate_is_trimmed_and_uppercased() {
    assert_eq!(normalize_plate(" ka01Xy9 "), "KA01XY9");
  }

  #[test]
  fn normalized_canonicalises_plate_and_blank_unit() {
    let v = new_vehicle().normalized().unwrap();
    assert_eq!(v.vehicle_number, "MH12AB1234");
    assert_eq!(v.unit, None);
    assert_eq!(v.purpose, Purpose::Resident);
  }

  #[test]
  fn normalized_rejects_blank_required_field() {
    let mut input = new_vehicle();
    input.owner_name = "  ".into();
    assert_eq!(
      input.normalized().unwrap_err(),
      Error::MissingField("owner_name")
    );
  }

  #[test]
  fn purpose_defaults_to_visitor_when_absent() {
    let json = r#"{
      "vehicle_number": "x1",
      "owner_name": "A",
      "contact_number": "1",
      "vehicle_name": "Scooter",
      "class": "2-Wheeler",
      "registration_date": "2026-02-01"
    }"#;
    let input: NewVehicle = serde_json::from_str(json).unwrap();
    assert_eq!(input.purpose, Purpose::Visitor);
    assert_eq!(input.class, VehicleClass::TwoWheeler);
  }

  #[test]
  fn class_string_forms_match_columns() {
    assert_eq!(VehicleClass::TwoWheeler.as_ref(), "2-Wheeler");
    assert_eq!("4-Wheeler".parse::<VehicleClass>().unwrap(), VehicleClass::FourWheeler);
    assert_eq!(Purpose::Maintenance.to_string(), "maintenance");
  }

  #[test]
  fn update_applies_sparse_fields_only() {
    let current = new_vehicle()
      .normalized()
      .unwrap()
      .into_vehicle(7, Utc::now());
    let update = VehicleUpdate {
      vehicle_number: Some("mh12zz0001".into()),
      unit: Some("B-204".into()),
      ..Default::default()
    };
    let next = update.apply_to(&current).unwrap();
    assert_eq!(next.vehicle_number, "MH12ZZ0001");
    assert_eq!(next.unit.as_deref(), Some("B-204"));
    assert_eq!(next.owner_name, current.owner_name);
    assert_eq!(next.vehicle_id, 7);
  }

  #[test]
  fn update_with_blank_unit_clears_it() {
    let mut current = new_vehicle()
      .normalized()
      .unwrap()
      .into_vehicle(1, Utc::now());
    current.unit = Some("A-1".into());
    let update = VehicleUpdate { unit: Some(String::new()), ..Default::default() };
    assert_eq!(update.apply_to(&current).unwrap().unit, None);
  }
}
