//! `GET /health` — liveness probe only, matching `app/db/models/health.py`'s
//! shape. Out of this specification's scope beyond the contract in
//! spec.md §6: it never touches storage or the bus.

use axum::Json;
use serde_json::{json, Value};

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}
