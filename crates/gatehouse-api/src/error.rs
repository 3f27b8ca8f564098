//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use gatehouse_core::{Error, store::StoreError};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error("conflict: {0}")]
  Conflict(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl ApiError {
  /// Map a backend error, classifying the domain kinds it carries.
  pub fn store<E: StoreError>(err: E) -> Self {
    match err.domain() {
      Some(domain) => domain.clone().into(),
      None => ApiError::Store(Box::new(err)),
    }
  }
}

impl From<Error> for ApiError {
  fn from(err: Error) -> Self {
    let message = err.to_string();
    match err {
      Error::VehicleNotFound(_) | Error::PlateNotFound(_) | Error::EntryNotFound(_) => {
        ApiError::NotFound(message)
      }
      Error::DuplicatePlate(_)
      | Error::AlreadyCheckedIn(_)
      | Error::AlreadyCheckedOut(_)
      | Error::NotCheckedIn(_)
      | Error::VehicleHasEntries(_) => ApiError::Conflict(message),
      Error::MissingField(_) | Error::InvalidRange { .. } => ApiError::BadRequest(message),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::Conflict(m) => (StatusCode::CONFLICT, m.clone()),
      ApiError::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
      }
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn domain_kinds_map_to_statuses() {
    let cases = [
      (Error::PlateNotFound("X".into()), StatusCode::NOT_FOUND),
      (Error::EntryNotFound(1), StatusCode::NOT_FOUND),
      (Error::AlreadyCheckedIn("X".into()), StatusCode::CONFLICT),
      (Error::VehicleHasEntries(1), StatusCode::CONFLICT),
      (Error::MissingField("owner_name"), StatusCode::BAD_REQUEST),
    ];
    for (err, status) in cases {
      assert_eq!(ApiError::store(err).into_response().status(), status);
    }
  }
}
