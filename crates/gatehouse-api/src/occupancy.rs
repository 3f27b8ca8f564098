//! `GET /occupancy`: head-count of the premises.

use std::sync::Arc;

use axum::{Json, extract::State};
use gatehouse_core::{occupancy::OccupancySummary, store::GateStore};

use crate::error::ApiError;

/// `GET /occupancy`
pub async fn summary<S: GateStore>(
  State(store): State<Arc<S>>,
) -> Result<Json<OccupancySummary>, ApiError> {
  let open = store.list_open().await.map_err(ApiError::store)?;
  let registered = store.list_vehicles().await.map_err(ApiError::store)?.len();
  Ok(Json(OccupancySummary::tally(&open, registered)))
}
