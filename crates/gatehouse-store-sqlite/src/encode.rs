//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 UTC strings with a fixed microsecond
//! precision, so lexical order matches chronological order. Dates are stored
//! as `YYYY-MM-DD`. Enumerations use their `strum` string forms.

use chrono::{DateTime, NaiveDate, SecondsFormat, SubsecRound as _, Utc};
use gatehouse_core::{
  ledger::{OccupancyEntry, OccupancyRecord, VehicleDisplay},
  vehicle::{Purpose, Vehicle, VehicleClass},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

/// The current time at the precision the store persists.
pub fn now() -> DateTime<Utc> { Utc::now().trunc_subsecs(6) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_date(d: NaiveDate) -> String { d.format("%Y-%m-%d").to_string() }

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("date {s:?}: {e}")))
}

// ─── Enumerations ────────────────────────────────────────────────────────────

pub fn decode_class(s: &str) -> Result<VehicleClass> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown vehicle type: {s:?}")))
}

pub fn decode_purpose(s: &str) -> Result<Purpose> {
  s.parse()
    .map_err(|_| Error::Decode(format!("unknown purpose: {s:?}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `vehicles` row, in `VEHICLE_COLUMNS` order.
pub struct RawVehicle {
  pub vehicle_id:        i64,
  pub vehicle_number:    String,
  pub owner_name:        String,
  pub contact_number:    String,
  pub vehicle_name:      String,
  pub class:             String,
  pub registration_date: String,
  pub unit:              Option<String>,
  pub purpose:           String,
  pub created_at:        String,
}

impl RawVehicle {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      vehicle_id:        row.get(0)?,
      vehicle_number:    row.get(1)?,
      owner_name:        row.get(2)?,
      contact_number:    row.get(3)?,
      vehicle_name:      row.get(4)?,
      class:             row.get(5)?,
      registration_date: row.get(6)?,
      unit:              row.get(7)?,
      purpose:           row.get(8)?,
      created_at:        row.get(9)?,
    })
  }

  pub fn into_vehicle(self) -> Result<Vehicle> {
    Ok(Vehicle {
      vehicle_id:        self.vehicle_id,
      vehicle_number:    self.vehicle_number,
      owner_name:        self.owner_name,
      contact_number:    self.contact_number,
      vehicle_name:      self.vehicle_name,
      class:             decode_class(&self.class)?,
      registration_date: decode_date(&self.registration_date)?,
      unit:              self.unit,
      purpose:           decode_purpose(&self.purpose)?,
      created_at:        decode_dt(&self.created_at)?,
    })
  }
}

/// Raw values read from a `vehicle_logs` row, in `ENTRY_COLUMNS` order.
pub struct RawEntry {
  pub entry_id:       i64,
  pub vehicle_id:     i64,
  pub vehicle_number: String,
  pub time_in:        String,
  pub time_out:       Option<String>,
  pub purpose:        String,
  pub unit:           Option<String>,
}

impl RawEntry {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry_id:       row.get(0)?,
      vehicle_id:     row.get(1)?,
      vehicle_number: row.get(2)?,
      time_in:        row.get(3)?,
      time_out:       row.get(4)?,
      purpose:        row.get(5)?,
      unit:           row.get(6)?,
    })
  }

  pub fn into_entry(self) -> Result<OccupancyEntry> {
    Ok(OccupancyEntry {
      entry_id:       self.entry_id,
      vehicle_id:     self.vehicle_id,
      vehicle_number: self.vehicle_number,
      time_in:        decode_dt(&self.time_in)?,
      time_out:       self.time_out.as_deref().map(decode_dt).transpose()?,
      purpose:        decode_purpose(&self.purpose)?,
      unit:           self.unit,
    })
  }
}

/// A `vehicle_logs` row joined with its vehicle's display columns, in
/// `RECORD_COLUMNS` order.
pub struct RawRecord {
  pub entry:          RawEntry,
  pub owner_name:     String,
  pub vehicle_name:   String,
  pub class:          String,
  pub contact_number: String,
}

impl RawRecord {
  pub fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      entry:          RawEntry::from_row(row)?,
      owner_name:     row.get(7)?,
      vehicle_name:   row.get(8)?,
      class:          row.get(9)?,
      contact_number: row.get(10)?,
    })
  }

  pub fn into_record(self) -> Result<OccupancyRecord> {
    Ok(OccupancyRecord {
      entry:   self.entry.into_entry()?,
      vehicle: VehicleDisplay {
        owner_name:     self.owner_name,
        vehicle_name:   self.vehicle_name,
        class:          decode_class(&self.class)?,
        contact_number: self.contact_number,
      },
    })
  }
}
