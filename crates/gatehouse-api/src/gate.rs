//! Plate-driven gate endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/gate/check-in` | Body: [`GateCheckIn`]; returns 201 |
//! | `POST` | `/gate/check-out` | Body: `{"vehicle_number":"..."}` |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use gatehouse_core::{
  gate::{check_in_plate, check_out_plate},
  ledger::OccupancyEntry,
  store::GateStore,
  vehicle::Purpose,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct GateCheckIn {
  pub vehicle_number: String,
  pub purpose:        Option<Purpose>,
  pub unit:           Option<String>,
}

/// `POST /gate/check-in`
pub async fn check_in<S: GateStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<GateCheckIn>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = check_in_plate(store.as_ref(), &body.vehicle_number, body.purpose, body.unit)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

#[derive(Debug, Deserialize)]
pub struct GateCheckOut {
  pub vehicle_number: String,
}

/// `POST /gate/check-out`
pub async fn check_out<S: GateStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<GateCheckOut>,
) -> Result<Json<OccupancyEntry>, ApiError> {
  let entry = check_out_plate(store.as_ref(), &body.vehicle_number)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entry))
}
