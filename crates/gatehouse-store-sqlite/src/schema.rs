//! SQL schema for the Gatehouse SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS vehicles (
    id                INTEGER PRIMARY KEY AUTOINCREMENT,
    person_name       TEXT NOT NULL,
    contact_number    TEXT NOT NULL,
    vehicle_number    TEXT NOT NULL UNIQUE,  -- canonical upper-case plate
    vehicle_name      TEXT NOT NULL,
    vehicle_type      TEXT NOT NULL CHECK (vehicle_type IN ('2-Wheeler', '4-Wheeler')),
    registration_date TEXT NOT NULL,         -- YYYY-MM-DD
    flat_number       TEXT,
    purpose           TEXT NOT NULL DEFAULT 'visitor',
    created_at        TEXT NOT NULL          -- RFC 3339 UTC, microseconds
);

-- Rows are never deleted; time_out is written exactly once.
CREATE TABLE IF NOT EXISTS vehicle_logs (
    id             INTEGER PRIMARY KEY AUTOINCREMENT,
    vehicle_id     INTEGER NOT NULL REFERENCES vehicles(id),
    vehicle_number TEXT NOT NULL,            -- plate at check-in time
    time_in        TEXT NOT NULL,
    time_out       TEXT,                     -- NULL while on the premises
    purpose        TEXT NOT NULL DEFAULT 'visitor',
    flat_number    TEXT,
    created_at     TEXT NOT NULL
);

-- At most one open entry per vehicle.
CREATE UNIQUE INDEX IF NOT EXISTS vehicle_logs_one_open_idx
    ON vehicle_logs(vehicle_id) WHERE time_out IS NULL;

CREATE INDEX IF NOT EXISTS vehicle_logs_vehicle_idx  ON vehicle_logs(vehicle_id, time_out);
CREATE INDEX IF NOT EXISTS vehicle_logs_time_in_idx  ON vehicle_logs(time_in);
CREATE INDEX IF NOT EXISTS vehicle_logs_plate_idx    ON vehicle_logs(vehicle_number);
CREATE INDEX IF NOT EXISTS vehicles_registration_idx ON vehicles(registration_date);

PRAGMA user_version = 1;
";
