//! Handlers for registry endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/vehicles` | Newest registration first |
//! | `POST`   | `/vehicles` | Body: [`NewVehicle`]; returns 201 + stored vehicle |
//! | `GET`    | `/vehicles/{id}` | 404 if not found |
//! | `PATCH`  | `/vehicles/{id}` | Body: sparse [`VehicleUpdate`] |
//! | `DELETE` | `/vehicles/{id}` | 204; 409 once the vehicle has history |
//! | `GET`    | `/plates/{plate}` | Case-insensitive lookup |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  store::GateStore,
  vehicle::{NewVehicle, Vehicle, VehicleUpdate, normalize_plate},
};

use crate::error::ApiError;

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /vehicles`
pub async fn list<S: GateStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Vehicle>>, ApiError> {
  let vehicles = store.list_vehicles().await.map_err(ApiError::store)?;
  Ok(Json(vehicles))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /vehicles`
pub async fn create<S: GateStore>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewVehicle>,
) -> Result<impl IntoResponse, ApiError> {
  let vehicle = store.register_vehicle(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(vehicle)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /vehicles/{id}`
pub async fn get_one<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<Json<Vehicle>, ApiError> {
  let vehicle = store
    .get_vehicle(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("vehicle {id} not found")))?;
  Ok(Json(vehicle))
}

/// `GET /plates/{plate}`
pub async fn by_plate<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(plate): Path<String>,
) -> Result<Json<Vehicle>, ApiError> {
  let vehicle = store
    .find_vehicle_by_plate(&plate)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("no vehicle registered with plate {}", normalize_plate(&plate)))
    })?;
  Ok(Json(vehicle))
}

// ─── Update ───────────────────────────────────────────────────────────────────

/// `PATCH /vehicles/{id}`
pub async fn update<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
  Json(body): Json<VehicleUpdate>,
) -> Result<Json<Vehicle>, ApiError> {
  let vehicle = store
    .update_vehicle(id, body)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(vehicle))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /vehicles/{id}`
pub async fn remove<S: GateStore>(
  State(store): State<Arc<S>>,
  Path(id): Path<i64>,
) -> Result<StatusCode, ApiError> {
  store.delete_vehicle(id).await.map_err(ApiError::store)?;
  Ok(StatusCode::NO_CONTENT)
}
