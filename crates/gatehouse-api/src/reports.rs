//! Report endpoints. Rows are handed to an external spreadsheet exporter.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/reports/logs` | `?from=YYYY-MM-DD&to=YYYY-MM-DD`, by entry day |
//! | `GET`  | `/reports/registrations` | Same range, by registration date |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
};
use chrono::NaiveDate;
use gatehouse_core::{
  report::{DateRange, LogReportRow, RegistrationReportRow},
  store::GateStore,
};
use serde::Deserialize;

use crate::error::ApiError;

/// Inclusive day range; both ends required.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
  pub from: NaiveDate,
  pub to:   NaiveDate,
}

/// `GET /reports/logs?from=...&to=...`
pub async fn logs<S: GateStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<LogReportRow>>, ApiError> {
  let range = DateRange::new(params.from, params.to)?;
  let records = store.entries_between(range).await.map_err(ApiError::store)?;
  Ok(Json(records.iter().map(LogReportRow::from).collect()))
}

/// `GET /reports/registrations?from=...&to=...`
pub async fn registrations<S: GateStore>(
  State(store): State<Arc<S>>,
  Query(params): Query<RangeParams>,
) -> Result<Json<Vec<RegistrationReportRow>>, ApiError> {
  let range = DateRange::new(params.from, params.to)?;
  let vehicles = store
    .registrations_between(range)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(vehicles.iter().map(RegistrationReportRow::from).collect()))
}
