//! Request handlers.
//!
//! Each handler makes at most one store round trip and keeps nothing
//! between requests.

use crate::error::{GatewayError, GatewayResult};
use axum::{
    body::Bytes,
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    Json,
};
use kvgate_store::{KeyValue, KvStore};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Shared handler state: the injected store handle.
#[derive(Clone)]
pub struct GatewayState {
    store: Arc<dyn KvStore>,
}

impl GatewayState {
    pub fn new(store: Arc<dyn KvStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &dyn KvStore {
        self.store.as_ref()
    }
}

/// Raw query pairs, in request order. Repeated parameters are kept.
pub type QueryPairs = Query<Vec<(String, String)>>;

/// The first `key` query parameter, which must be non-empty.
///
/// Later repeats of `key` are ignored.
fn required_key(query: Result<QueryPairs, QueryRejection>) -> GatewayResult<String> {
    let Query(pairs) = query.map_err(|e| GatewayError::bad_request(e.body_text()))?;

    match pairs.into_iter().find(|(name, _)| name == "key") {
        Some((_, key)) if !key.is_empty() => Ok(key),
        _ => Err(GatewayError::bad_request("Key is required")),
    }
}

/// POST /set
///
/// Body must be exactly `{"key": ..., "value": ...}`. Returns 200 with an
/// empty body.
pub async fn set(State(state): State<GatewayState>, body: Bytes) -> GatewayResult<StatusCode> {
    let kv: KeyValue = serde_json::from_slice(&body).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting set body");
        GatewayError::bad_request("Invalid request body")
    })?;

    if kv.key.is_empty() {
        return Err(GatewayError::bad_request("Key is required"));
    }

    state
        .store()
        .put(&kv.key, &kv.value)
        .await
        .map_err(GatewayError::store("Failed to set key-value pair"))?;

    Ok(StatusCode::OK)
}

/// GET /get?key=
pub async fn get(
    State(state): State<GatewayState>,
    query: Result<QueryPairs, QueryRejection>,
) -> GatewayResult<Json<KeyValue>> {
    let key = required_key(query)?;

    let value = state
        .store()
        .get(&key)
        .await
        .map_err(GatewayError::store("Failed to get value for key"))?
        .ok_or_else(|| GatewayError::not_found("Key not found"))?;

    Ok(Json(KeyValue { key, value }))
}

/// GET /getAll
///
/// Full-keyspace scan. Unbounded; an empty store yields `[]`.
pub async fn get_all(State(state): State<GatewayState>) -> GatewayResult<Json<Vec<KeyValue>>> {
    let pairs = state
        .store()
        .get_prefix("")
        .await
        .map_err(GatewayError::store("Failed to get all key-value pairs"))?;

    Ok(Json(pairs))
}

/// DELETE /delete?key=
///
/// No existence check: deleting an absent key succeeds.
pub async fn delete(
    State(state): State<GatewayState>,
    query: Result<QueryPairs, QueryRejection>,
) -> GatewayResult<(StatusCode, String)> {
    let key = required_key(query)?;

    state
        .store()
        .delete(&key)
        .await
        .map_err(GatewayError::store("Failed to delete key"))?;

    Ok((StatusCode::OK, format!("Key '{}' deleted", key)))
}

/// Health check response.
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: String,
}

/// GET /health
///
/// Does not touch the store.
pub async fn health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.store().backend_name().to_string(),
    })
}

/// Bare OPTIONS on a known path.
pub async fn options() -> StatusCode {
    StatusCode::OK
}
