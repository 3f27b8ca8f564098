//! JSON REST API for Gatehouse.
//!
//! Exposes an axum [`Router`] backed by any [`gatehouse_core::store::GateStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gatehouse_api::api_router(store.clone()))
//! ```

pub mod entries;
pub mod error;
pub mod gate;
pub mod occupancy;
pub mod reports;
pub mod vehicles;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use gatehouse_core::store::GateStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GateStore + 'static,
{
  Router::new()
    // Registry
    .route("/vehicles", get(vehicles::list::<S>).post(vehicles::create::<S>))
    .route(
      "/vehicles/{id}",
      get(vehicles::get_one::<S>)
        .patch(vehicles::update::<S>)
        .delete(vehicles::remove::<S>),
    )
    .route("/plates/{plate}", get(vehicles::by_plate::<S>))
    .route("/plates/{plate}/history", get(entries::history::<S>))
    // Ledger
    .route("/entries", get(entries::list::<S>).post(entries::create::<S>))
    .route("/entries/{id}", get(entries::get_one::<S>))
    .route("/entries/{id}/check-out", post(entries::check_out::<S>))
    // Gate
    .route("/gate/check-in", post(gate::check_in::<S>))
    .route("/gate/check-out", post(gate::check_out::<S>))
    // Views
    .route("/occupancy", get(occupancy::summary::<S>))
    .route("/reports/logs", get(reports::logs::<S>))
    .route("/reports/registrations", get(reports::registrations::<S>))
    .with_state(store)
}

#[cfg(test)]
mod tests;
