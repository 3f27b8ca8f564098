//! Error types for `gatehouse-core`.

use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
  #[error("vehicle not found: {0}")]
  VehicleNotFound(i64),

  #[error("no vehicle registered with plate {0}")]
  PlateNotFound(String),

  #[error("occupancy entry not found: {0}")]
  EntryNotFound(i64),

  #[error("plate {0} is already registered")]
  DuplicatePlate(String),

  #[error("vehicle {0} is already checked in")]
  AlreadyCheckedIn(String),

  #[error("occupancy entry {0} is already checked out")]
  AlreadyCheckedOut(i64),

  #[error("vehicle {0} is not checked in")]
  NotCheckedIn(String),

  #[error("vehicle {0} has occupancy history and cannot be deleted")]
  VehicleHasEntries(i64),

  #[error("missing required field: {0}")]
  MissingField(&'static str),

  #[error("invalid date range: {from} to {to}")]
  InvalidRange { from: NaiveDate, to: NaiveDate },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
