//! Router tests against the in-memory store.

use std::sync::Arc;

use axum::{
  body::Body,
  http::{Request, StatusCode, header},
  response::Response,
};
use chrono::{DateTime, Utc};
use gatehouse_core::memory::MemoryStore;
use serde_json::{Value, json};
use tower::ServiceExt as _;

use crate::api_router;

async fn send(store: &Arc<MemoryStore>, method: &str, uri: &str, body: Option<Value>) -> Response {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(json) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(json.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  api_router(store.clone()).oneshot(req).await.unwrap()
}

async fn body_json(resp: Response) -> Value {
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  serde_json::from_slice(&bytes).unwrap()
}

fn vehicle_body(plate: &str) -> Value {
  json!({
    "vehicle_number": plate,
    "owner_name": "Arjun Rao",
    "contact_number": "9900112233",
    "vehicle_name": "Honda Activa",
    "class": "2-Wheeler",
    "registration_date": "2026-05-04",
    "unit": "B-12",
  })
}

async fn register(store: &Arc<MemoryStore>, plate: &str) -> Value {
  let resp = send(store, "POST", "/vehicles", Some(vehicle_body(plate))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  body_json(resp).await
}

// ── Registry ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_returns_201_with_canonical_plate() {
  let store = Arc::new(MemoryStore::new());
  let v = register(&store, "ka01ab0001").await;
  assert_eq!(v["vehicle_number"], "KA01AB0001");
  assert_eq!(v["purpose"], "visitor");
  assert_eq!(v["class"], "2-Wheeler");
}

#[tokio::test]
async fn duplicate_plate_returns_409() {
  let store = Arc::new(MemoryStore::new());
  register(&store, "KA01AB0001").await;

  let resp = send(&store, "POST", "/vehicles", Some(vehicle_body("ka01ab0001"))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);
  let body = body_json(resp).await;
  assert!(body["error"].as_str().unwrap().contains("KA01AB0001"));
}

#[tokio::test]
async fn blank_field_returns_400() {
  let store = Arc::new(MemoryStore::new());
  let mut body = vehicle_body("KA01");
  body["owner_name"] = json!("   ");

  let resp = send(&store, "POST", "/vehicles", Some(body)).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn plate_lookup_and_missing_vehicle() {
  let store = Arc::new(MemoryStore::new());
  let v = register(&store, "MH04ZZ9").await;

  let resp = send(&store, "GET", "/plates/mh04zz9", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["vehicle_id"], v["vehicle_id"]);

  let resp = send(&store, "GET", "/plates/nope", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&store, "GET", "/vehicles/999", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn patch_updates_sparse_fields() {
  let store = Arc::new(MemoryStore::new());
  let v = register(&store, "GJ01").await;
  let uri = format!("/vehicles/{}", v["vehicle_id"]);

  let resp = send(&store, "PATCH", &uri, Some(json!({ "contact_number": "7000000000" }))).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let updated = body_json(resp).await;
  assert_eq!(updated["contact_number"], "7000000000");
  assert_eq!(updated["owner_name"], "Arjun Rao");
}

#[tokio::test]
async fn delete_refused_once_vehicle_has_history() {
  let store = Arc::new(MemoryStore::new());
  let kept = register(&store, "DEL1").await;
  let gone = register(&store, "DEL2").await;

  let resp = send(&store, "POST", "/entries", Some(json!({ "vehicle_id": kept["vehicle_id"] }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);

  let resp = send(&store, "DELETE", &format!("/vehicles/{}", kept["vehicle_id"]), None).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&store, "DELETE", &format!("/vehicles/{}", gone["vehicle_id"]), None).await;
  assert_eq!(resp.status(), StatusCode::NO_CONTENT);
}

// ── Ledger ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn entry_lifecycle_by_id() {
  let store = Arc::new(MemoryStore::new());
  let v = register(&store, "TS07").await;

  let resp = send(&store, "POST", "/entries", Some(json!({ "vehicle_id": v["vehicle_id"] }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  let entry = body_json(resp).await;
  assert_eq!(entry["unit"], "B-12");
  assert!(entry["time_out"].is_null());

  let resp = send(&store, "POST", "/entries", Some(json!({ "vehicle_id": v["vehicle_id"] }))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&store, "GET", &format!("/entries/{}", entry["entry_id"]), None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert_eq!(body_json(resp).await["owner_name"], "Arjun Rao");

  let check_out = format!("/entries/{}/check-out", entry["entry_id"]);
  let resp = send(&store, "POST", &check_out, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  assert!(!body_json(resp).await["time_out"].is_null());

  let resp = send(&store, "POST", &check_out, None).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&store, "POST", "/entries/424/check-out", None).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn open_entries_filter_by_plate_and_unit() {
  let store = Arc::new(MemoryStore::new());
  for plate in ["AB1", "CD2"] {
    register(&store, plate).await;
  }
  send(&store, "POST", "/gate/check-in", Some(json!({ "vehicle_number": "ab1" }))).await;
  send(
    &store,
    "POST",
    "/gate/check-in",
    Some(json!({ "vehicle_number": "CD2", "unit": "Z-9" })),
  )
  .await;

  let resp = send(&store, "GET", "/entries?open=true", None).await;
  assert_eq!(body_json(resp).await.as_array().unwrap().len(), 2);

  let resp = send(&store, "GET", "/entries?open=true&unit=z-", None).await;
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["vehicle_number"], "CD2");

  let resp = send(&store, "GET", "/entries?plate=b1", None).await;
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["vehicle_number"], "AB1");
}

// ── Gate ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn gate_flow_by_plate() {
  let store = Arc::new(MemoryStore::new());
  register(&store, "TEST123").await;

  let resp = send(&store, "POST", "/gate/check-in", Some(json!({ "vehicle_number": "test123", "purpose": "delivery" }))).await;
  assert_eq!(resp.status(), StatusCode::CREATED);
  assert_eq!(body_json(resp).await["purpose"], "delivery");

  let resp = send(&store, "POST", "/gate/check-out", Some(json!({ "vehicle_number": "TEST123" }))).await;
  assert_eq!(resp.status(), StatusCode::OK);

  let resp = send(&store, "POST", "/gate/check-out", Some(json!({ "vehicle_number": "TEST123" }))).await;
  assert_eq!(resp.status(), StatusCode::CONFLICT);

  let resp = send(&store, "POST", "/gate/check-in", Some(json!({ "vehicle_number": "UNKNOWN" }))).await;
  assert_eq!(resp.status(), StatusCode::NOT_FOUND);

  let resp = send(&store, "GET", "/plates/test123/history", None).await;
  let history = body_json(resp).await;
  assert_eq!(history.as_array().unwrap().len(), 1);
  assert!(!history[0]["time_out"].is_null());
}

// ── Views ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn occupancy_counts_present_and_away() {
  let store = Arc::new(MemoryStore::new());
  for plate in ["P1", "P2", "P3"] {
    register(&store, plate).await;
  }
  send(&store, "POST", "/gate/check-in", Some(json!({ "vehicle_number": "P2" }))).await;

  let resp = send(&store, "GET", "/occupancy", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let summary = body_json(resp).await;
  assert_eq!(summary["present"], 1);
  assert_eq!(summary["away"], 2);
  assert_eq!(summary["by_class"]["2-Wheeler"], 1);
  assert_eq!(summary["by_class"]["4-Wheeler"], 0);
}

#[tokio::test]
async fn registration_report_and_inverted_range() {
  let store = Arc::new(MemoryStore::new());
  register(&store, "RPT1").await;

  let resp = send(&store, "GET", "/reports/registrations?from=2026-05-01&to=2026-05-04", None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert_eq!(rows[0]["vehicle_number"], "RPT1");

  let resp = send(&store, "GET", "/reports/logs?from=2026-05-04&to=2026-05-01", None).await;
  assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn log_report_includes_open_entries_without_duration() {
  let store = Arc::new(MemoryStore::new());
  register(&store, "LOG1").await;
  let resp = send(&store, "POST", "/gate/check-in", Some(json!({ "vehicle_number": "LOG1" }))).await;
  let entry = body_json(resp).await;
  let time_in: DateTime<Utc> = serde_json::from_value(entry["time_in"].clone()).unwrap();

  let day = time_in.date_naive();
  let uri = format!("/reports/logs?from={day}&to={day}");
  let resp = send(&store, "GET", &uri, None).await;
  assert_eq!(resp.status(), StatusCode::OK);
  let rows = body_json(resp).await;
  assert_eq!(rows.as_array().unwrap().len(), 1);
  assert!(rows[0]["duration_hours"].is_null());
  assert_eq!(rows[0]["owner_name"], "Arjun Rao");
}
