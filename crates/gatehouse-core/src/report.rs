//! Report date ranges and the flat rows handed to spreadsheet exporters.

use std::ops::RangeInclusive;

use chrono::{DateTime, Datelike as _, Duration, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::{
  Error, Result,
  ledger::OccupancyRecord,
  vehicle::{Vehicle, VehicleClass},
};

// ─── DateRange ───────────────────────────────────────────────────────────────

/// Years stored timestamps can hold while sorting lexically.
const YEARS: RangeInclusive<i32> = 0..=9999;

const DAY_MICROS: i64 = 86_400_000_000;

/// An inclusive range of calendar days. `from <= to` always holds, and both
/// ends fall in years 0 through 9999.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
  from: NaiveDate,
  to:   NaiveDate,
}

impl DateRange {
  pub fn new(from: NaiveDate, to: NaiveDate) -> Result<Self> {
    if from > to || !YEARS.contains(&from.year()) || !YEARS.contains(&to.year()) {
      return Err(Error::InvalidRange { from, to });
    }
    Ok(Self { from, to })
  }

  pub fn from(&self) -> NaiveDate { self.from }

  pub fn to(&self) -> NaiveDate { self.to }

  pub fn contains_date(&self, date: NaiveDate) -> bool {
    self.from <= date && date <= self.to
  }

  /// Whether `at` falls on one of the range's days (UTC).
  pub fn contains(&self, at: DateTime<Utc>) -> bool {
    self.contains_date(at.date_naive())
  }

  /// Midnight UTC at the start of `from`.
  pub fn start(&self) -> DateTime<Utc> {
    self.from.and_time(NaiveTime::MIN).and_utc()
  }

  /// The last microsecond of `to` (UTC). Stored timestamps carry
  /// microsecond precision, so the bound is inclusive.
  pub fn last(&self) -> DateTime<Utc> {
    self.to.and_time(NaiveTime::MIN).and_utc() + Duration::microseconds(DAY_MICROS - 1)
  }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// One line of the vehicle log report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LogReportRow {
  pub vehicle_number: String,
  pub owner_name:     String,
  pub contact_number: String,
  pub vehicle_name:   String,
  pub class:          VehicleClass,
  pub time_in:        DateTime<Utc>,
  /// `None` while the vehicle is still inside.
  pub time_out:       Option<DateTime<Utc>>,
  /// Hours on the premises, rounded to two decimals.
  pub duration_hours: Option<f64>,
}

impl From<&OccupancyRecord> for LogReportRow {
  fn from(r: &OccupancyRecord) -> Self {
    let duration_hours = r.entry.duration().map(|d| {
      let hours = d.num_milliseconds() as f64 / 3_600_000.0;
      (hours * 100.0).round() / 100.0
    });
    Self {
      vehicle_number: r.entry.vehicle_number.clone(),
      owner_name: r.vehicle.owner_name.clone(),
      contact_number: r.vehicle.contact_number.clone(),
      vehicle_name: r.vehicle.vehicle_name.clone(),
      class: r.vehicle.class,
      time_in: r.entry.time_in,
      time_out: r.entry.time_out,
      duration_hours,
    }
  }
}

/// One line of the new-registrations report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegistrationReportRow {
  pub owner_name:        String,
  pub contact_number:    String,
  pub vehicle_number:    String,
  pub vehicle_name:      String,
  pub class:             VehicleClass,
  pub registration_date: NaiveDate,
}

impl From<&Vehicle> for RegistrationReportRow {
  fn from(v: &Vehicle) -> Self {
    Self {
      owner_name:        v.owner_name.clone(),
      contact_number:    v.contact_number.clone(),
      vehicle_number:    v.vehicle_number.clone(),
      vehicle_name:      v.vehicle_name.clone(),
      class:             v.class,
      registration_date: v.registration_date,
    }
  }
}
