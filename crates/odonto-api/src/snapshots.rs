//! Handlers for `/snapshots` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/snapshots` | `?subject_id` required; newest first |
//! | `POST` | `/snapshots` | Body: [`AppendBody`]; returns the stored snapshot |
//! | `GET`  | `/snapshots/latest` | `?subject_id` required; `data` is `null` without history |
//! | `GET`  | `/snapshots/:id` | `?subject_id` required; 404 if not found |
//!
//! Every response body is `{"data": ...}` on success and `{"error": "..."}`
//! on failure. All calls are scoped by the request's [`Owner`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{JsonRejection, QueryRejection},
  },
};
use odonto_core::{
  chart::{WireChart, parse_wire},
  snapshot::{NewSnapshot, Snapshot, SubjectId},
  store::SnapshotStore,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{error::ApiError, owner::Owner};

/// Success envelope.
#[derive(Debug, Serialize, Deserialize)]
pub struct Data<T> {
  pub data: T,
}

#[derive(Debug, Deserialize)]
pub struct SubjectParams {
  pub subject_id: SubjectId,
}

fn subject_param(
  params: Result<Query<SubjectParams>, QueryRejection>,
) -> Result<SubjectId, ApiError> {
  params
    .map(|Query(p)| p.subject_id)
    .map_err(|e| ApiError::BadRequest(e.body_text()))
}

// ─── List ─────────────────────────────────────────────────────────────────────

/// `GET /snapshots?subject_id=<id>`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Owner(owner): Owner,
  params: Result<Query<SubjectParams>, QueryRejection>,
) -> Result<Json<Data<Vec<Snapshot>>>, ApiError>
where
  S: SnapshotStore,
{
  let subject_id = subject_param(params)?;
  let snapshots = store
    .list(owner, subject_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Data { data: snapshots }))
}

// ─── Append ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /snapshots`.
///
/// `state` uses wire names: tooth numbers as string keys and condition names
/// as values, e.g. `{"16": "restored"}`.
#[derive(Debug, Deserialize)]
pub struct AppendBody {
  pub subject_id: SubjectId,
  #[serde(default)]
  pub state:      WireChart,
  pub note:       Option<String>,
}

/// `POST /snapshots`. Returns the stored [`Snapshot`].
pub async fn append<S>(
  State(store): State<Arc<S>>,
  Owner(owner): Owner,
  payload: Result<Json<AppendBody>, JsonRejection>,
) -> Result<Json<Data<Snapshot>>, ApiError>
where
  S: SnapshotStore,
{
  let Json(body) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
  let state = parse_wire(&body.state).map_err(|e| {
    tracing::warn!(subject_id = %body.subject_id, "rejected chart: {e}");
    ApiError::BadRequest(e.to_string())
  })?;

  let snapshot = store
    .append(owner, NewSnapshot {
      subject_id: body.subject_id,
      state,
      note: body.note,
    })
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Data { data: snapshot }))
}

// ─── Latest ───────────────────────────────────────────────────────────────────

/// `GET /snapshots/latest?subject_id=<id>`
pub async fn latest<S>(
  State(store): State<Arc<S>>,
  Owner(owner): Owner,
  params: Result<Query<SubjectParams>, QueryRejection>,
) -> Result<Json<Data<Option<Snapshot>>>, ApiError>
where
  S: SnapshotStore,
{
  let subject_id = subject_param(params)?;
  let snapshot = store
    .latest(owner, subject_id)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(Data { data: snapshot }))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /snapshots/:id?subject_id=<id>`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Owner(owner): Owner,
  Path(id): Path<Uuid>,
  params: Result<Query<SubjectParams>, QueryRejection>,
) -> Result<Json<Data<Snapshot>>, ApiError>
where
  S: SnapshotStore,
{
  let subject_id = subject_param(params)?;
  let snapshot = store
    .get(owner, subject_id, id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("snapshot {id} not found")))?;
  Ok(Json(Data { data: snapshot }))
}
