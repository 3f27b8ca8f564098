//! [`SqliteStore`]: the SQLite implementation of [`GateStore`].

use std::path::Path;

use rusqlite::{OptionalExtension as _, params, params_from_iter, types::Value};

use gatehouse_core::{
  Error as CoreError,
  ledger::{CheckIn, OccupancyEntry, OccupancyRecord},
  report::DateRange,
  store::GateStore,
  vehicle::{NewVehicle, Vehicle, VehicleUpdate, normalize_plate},
};

use crate::{
  Result,
  encode::{RawEntry, RawRecord, RawVehicle, encode_date, encode_dt, now},
  schema::SCHEMA,
};

// ─── SQL fragments ───────────────────────────────────────────────────────────

const VEHICLE_COLUMNS: &str = "id, vehicle_number, person_name, contact_number, vehicle_name,
   vehicle_type, registration_date, flat_number, purpose, created_at";

const ENTRY_COLUMNS: &str = "vl.id, vl.vehicle_id, vl.vehicle_number, vl.time_in, vl.time_out,
   vl.purpose, vl.flat_number";

const RECORD_COLUMNS: &str = "vl.id, vl.vehicle_id, vl.vehicle_number, vl.time_in, vl.time_out,
   vl.purpose, vl.flat_number, v.person_name, v.vehicle_name, v.vehicle_type, v.contact_number";

const NEWEST_ENTRY_FIRST: &str = "ORDER BY vl.time_in DESC, vl.id DESC";

/// Whether `err` is a UNIQUE constraint violation (plate, or open entry).
fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn select_vehicle(
  conn: &rusqlite::Connection,
  vehicle_id: i64,
) -> rusqlite::Result<Option<RawVehicle>> {
  conn
    .query_row(
      &format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1"),
      params![vehicle_id],
      RawVehicle::from_row,
    )
    .optional()
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Gatehouse store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted. All clones
/// share one connection thread, so each operation runs to completion before
/// the next starts.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::info!(path = %path.display(), "opened sqlite store");
    Ok(store)
  }

  /// Open an in-memory store, used by tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `SELECT <vehicle columns> FROM vehicles <clause>`.
  async fn vehicles(&self, clause: &'static str, args: Vec<Value>) -> Result<Vec<Vehicle>> {
    let raws: Vec<RawVehicle> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!("SELECT {VEHICLE_COLUMNS} FROM vehicles {clause}"))?;
        let rows = stmt
          .query_map(params_from_iter(args), RawVehicle::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawVehicle::into_vehicle).collect()
  }

  /// Run the enriched ledger query with `clause`, newest entry first.
  async fn records(&self, clause: &'static str, args: Vec<Value>) -> Result<Vec<OccupancyRecord>> {
    let raws: Vec<RawRecord> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {RECORD_COLUMNS}
           FROM vehicle_logs vl
           JOIN vehicles v ON v.id = vl.vehicle_id
           {clause}
           {NEWEST_ENTRY_FIRST}"
        ))?;
        let rows = stmt
          .query_map(params_from_iter(args), RawRecord::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRecord::into_record).collect()
  }
}

// ─── GateStore impl ──────────────────────────────────────────────────────────

impl GateStore for SqliteStore {
  type Error = crate::Error;

  // ── Registry ──────────────────────────────────────────────────────────────

  async fn register_vehicle(&self, input: NewVehicle) -> Result<Vehicle> {
    let input = input.normalized()?;
    let created_at = now();
    let row = input.clone();

    let inserted: Option<i64> = self
      .conn
      .call(move |conn| {
        let result = conn.execute(
          "INSERT INTO vehicles (
             vehicle_number, person_name, contact_number, vehicle_name,
             vehicle_type, registration_date, flat_number, purpose, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
          params![
            row.vehicle_number,
            row.owner_name,
            row.contact_number,
            row.vehicle_name,
            row.class.to_string(),
            encode_date(row.registration_date),
            row.unit,
            row.purpose.to_string(),
            encode_dt(created_at),
          ],
        );
        match result {
          Ok(_) => Ok(Some(conn.last_insert_rowid())),
          Err(e) if is_unique_violation(&e) => Ok(None),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    let Some(vehicle_id) = inserted else {
      return Err(CoreError::DuplicatePlate(input.vehicle_number).into());
    };
    tracing::info!(vehicle_id, plate = %input.vehicle_number, "vehicle registered");
    Ok(input.into_vehicle(vehicle_id, created_at))
  }

  async fn find_vehicle_by_plate(&self, plate: &str) -> Result<Option<Vehicle>> {
    let plate = normalize_plate(plate);
    let found = self
      .vehicles("WHERE vehicle_number = ?1", vec![Value::Text(plate)])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn get_vehicle(&self, vehicle_id: i64) -> Result<Option<Vehicle>> {
    let raw: Option<RawVehicle> = self
      .conn
      .call(move |conn| Ok(select_vehicle(conn, vehicle_id)?))
      .await?;

    raw.map(RawVehicle::into_vehicle).transpose()
  }

  async fn update_vehicle(&self, vehicle_id: i64, update: VehicleUpdate) -> Result<Vehicle> {
    self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Result<Vehicle>> {
        let tx = conn.transaction()?;
        let Some(raw) = select_vehicle(&tx, vehicle_id)? else {
          return Ok(Err(CoreError::VehicleNotFound(vehicle_id).into()));
        };
        let next = match raw
          .into_vehicle()
          .and_then(|current| Ok(update.apply_to(&current)?))
        {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };

        let written = tx.execute(
          "UPDATE vehicles
           SET vehicle_number = ?1, person_name = ?2, contact_number = ?3,
               vehicle_name = ?4, vehicle_type = ?5, registration_date = ?6,
               flat_number = ?7, purpose = ?8
           WHERE id = ?9",
          params![
            next.vehicle_number,
            next.owner_name,
            next.contact_number,
            next.vehicle_name,
            next.class.to_string(),
            encode_date(next.registration_date),
            next.unit,
            next.purpose.to_string(),
            vehicle_id,
          ],
        );
        match written {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::DuplicatePlate(next.vehicle_number).into()));
          }
          Err(e) => return Err(e.into()),
        }
        tx.commit()?;
        Ok(Ok(next))
      })
      .await?
  }

  async fn list_vehicles(&self) -> Result<Vec<Vehicle>> {
    self.vehicles("ORDER BY created_at DESC, id DESC", Vec::new()).await
  }

  async fn delete_vehicle(&self, vehicle_id: i64) -> Result<()> {
    self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Result<()>> {
        let tx = conn.transaction()?;
        if select_vehicle(&tx, vehicle_id)?.is_none() {
          return Ok(Err(CoreError::VehicleNotFound(vehicle_id).into()));
        }
        let entries: i64 = tx.query_row(
          "SELECT COUNT(*) FROM vehicle_logs WHERE vehicle_id = ?1",
          params![vehicle_id],
          |r| r.get(0),
        )?;
        if entries > 0 {
          return Ok(Err(CoreError::VehicleHasEntries(vehicle_id).into()));
        }
        tx.execute("DELETE FROM vehicles WHERE id = ?1", params![vehicle_id])?;
        tx.commit()?;
        Ok(Ok(()))
      })
      .await??;

    tracing::info!(vehicle_id, "vehicle deleted");
    Ok(())
  }

  async fn registrations_between(&self, range: DateRange) -> Result<Vec<Vehicle>> {
    self
      .vehicles(
        "WHERE registration_date >= ?1 AND registration_date <= ?2
         ORDER BY registration_date DESC, id DESC",
        vec![
          Value::Text(encode_date(range.from())),
          Value::Text(encode_date(range.to())),
        ],
      )
      .await
  }

  // ── Ledger writes ─────────────────────────────────────────────────────────

  async fn check_in(&self, input: CheckIn) -> Result<OccupancyEntry> {
    let time_in = now();

    let entry = self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Result<OccupancyEntry>> {
        let tx = conn.transaction()?;
        let Some(raw) = select_vehicle(&tx, input.vehicle_id)? else {
          return Ok(Err(CoreError::VehicleNotFound(input.vehicle_id).into()));
        };
        let vehicle = match raw.into_vehicle() {
          Ok(v) => v,
          Err(e) => return Ok(Err(e)),
        };
        let (purpose, unit) = input.resolve(&vehicle);

        // The partial unique index rejects a second open entry.
        let inserted = tx.execute(
          "INSERT INTO vehicle_logs (
             vehicle_id, vehicle_number, time_in, purpose, flat_number, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?3)",
          params![
            vehicle.vehicle_id,
            vehicle.vehicle_number,
            encode_dt(time_in),
            purpose.to_string(),
            unit,
          ],
        );
        match inserted {
          Ok(_) => {}
          Err(e) if is_unique_violation(&e) => {
            return Ok(Err(CoreError::AlreadyCheckedIn(vehicle.vehicle_number).into()));
          }
          Err(e) => return Err(e.into()),
        }
        let entry_id = tx.last_insert_rowid();
        tx.commit()?;

        Ok(Ok(OccupancyEntry {
          entry_id,
          vehicle_id: vehicle.vehicle_id,
          vehicle_number: vehicle.vehicle_number,
          time_in,
          time_out: None,
          purpose,
          unit,
        }))
      })
      .await??;

    tracing::info!(
      entry_id = entry.entry_id,
      vehicle_id = entry.vehicle_id,
      plate = %entry.vehicle_number,
      "vehicle checked in"
    );
    Ok(entry)
  }

  async fn check_out(&self, entry_id: i64) -> Result<OccupancyEntry> {
    let time_out = encode_dt(now());

    let entry = self
      .conn
      .call(move |conn| -> tokio_rusqlite::Result<Result<OccupancyEntry>> {
        let changed = conn.execute(
          "UPDATE vehicle_logs SET time_out = ?1 WHERE id = ?2 AND time_out IS NULL",
          params![time_out, entry_id],
        )?;
        let raw = conn
          .query_row(
            &format!("SELECT {ENTRY_COLUMNS} FROM vehicle_logs vl WHERE vl.id = ?1"),
            params![entry_id],
            RawEntry::from_row,
          )
          .optional()?;

        Ok(match (changed, raw) {
          (_, None) => Err(CoreError::EntryNotFound(entry_id).into()),
          (0, Some(_)) => Err(CoreError::AlreadyCheckedOut(entry_id).into()),
          (_, Some(raw)) => raw.into_entry(),
        })
      })
      .await??;

    tracing::info!(
      entry_id,
      vehicle_id = entry.vehicle_id,
      plate = %entry.vehicle_number,
      "vehicle checked out"
    );
    Ok(entry)
  }

  // ── Ledger reads ──────────────────────────────────────────────────────────

  async fn get_entry(&self, entry_id: i64) -> Result<Option<OccupancyRecord>> {
    let found = self
      .records("WHERE vl.id = ?1", vec![Value::Integer(entry_id)])
      .await?;
    Ok(found.into_iter().next())
  }

  async fn open_entry_for_vehicle(&self, vehicle_id: i64) -> Result<Option<OccupancyEntry>> {
    let raw: Option<RawEntry> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {ENTRY_COLUMNS} FROM vehicle_logs vl
                 WHERE vl.vehicle_id = ?1 AND vl.time_out IS NULL"
              ),
              params![vehicle_id],
              RawEntry::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawEntry::into_entry).transpose()
  }

  async fn list_open(&self) -> Result<Vec<OccupancyRecord>> {
    self.records("WHERE vl.time_out IS NULL", Vec::new()).await
  }

  async fn list_entries(&self) -> Result<Vec<OccupancyRecord>> {
    self.records("", Vec::new()).await
  }

  async fn history_for_plate(&self, plate: &str) -> Result<Vec<OccupancyRecord>> {
    let plate = normalize_plate(plate);
    self
      .records("WHERE vl.vehicle_number = ?1", vec![Value::Text(plate)])
      .await
  }

  async fn entries_between(&self, range: DateRange) -> Result<Vec<OccupancyRecord>> {
    self
      .records(
        "WHERE vl.time_in >= ?1 AND vl.time_in <= ?2",
        vec![
          Value::Text(encode_dt(range.start())),
          Value::Text(encode_dt(range.last())),
        ],
      )
      .await
  }
}
