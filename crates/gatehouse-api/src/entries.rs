//! Handlers for ledger endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/entries` | Optional `?open=true`, `plate`, `unit` substring filters |
//! | `POST` | `/entries` | Body: [`CheckIn`]; returns 201 + the open entry |
//! | `GET`  | `/entries/{id}` | Enriched record |
//! | `POST` | `/entries/{id}/check-out` | 409 if already closed |
//! | `GET`  | `/plates/{plate}/history` | Newest first |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  ledger::{CheckIn, OccupancyEntry, OccupancyRecord},
  occupancy::OccupancyFilter,
  store::GateStore,
};
use serde::Deserialize;

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  /// If `true`, return only entries with no exit time. Default `false`.
  #[serde(default)]
  pub open:  bool,
  pub plate: Option<String>,
  pub unit:  Option<String>,
}

/// `GET /entries[?open=true][&plate=...][&unit=...]`
pub async fn list<S: GateStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<OccupancyRecord>>, ApiError> {
  let records = if params.open {
    store.list_open().await
  } else {
    store.list_entries().await
  }
  .map_err(ApiError::store)?;

  let filter = OccupancyFilter { plate: params.plate, unit: params.unit };
  Ok(Json(filter.apply(records)))
}

// ─── Check in ─────────────────────────────────────────────────────────────────

/// `POST /entries`
pub async fn create<S: GateStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<CheckIn>,
) -> Result<impl IntoResponse, ApiError> {
  let entry = store.check_in(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(entry)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /entries/{id}`
pub async fn get_one<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<OccupancyRecord>, ApiError> {
  let record = store
    .get_entry(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("occupancy entry {id} not found")))?;
  Ok(Json(record))
}

// ─── Check out ────────────────────────────────────────────────────────────────

/// `POST /entries/{id}/check-out`
pub async fn check_out<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<OccupancyEntry>, ApiError> {
  let entry = store.check_out(id).await.map_err(ApiError::store)?;
  Ok(Json(entry))
}

// ─── History ──────────────────────────────────────────────────────────────────

/// `GET /plates/{plate}/history`
pub async fn history<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(plate): Path<String>,
) -> Result<Json<Vec<OccupancyRecord>>, ApiError> {
  let records = store
    .history_for_plate(&plate)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(records))
}
