//! HTTP server for Odonto.
//!
//! Mounts the JSON API from `odonto-api` under `/api` behind HTTP Basic
//! authentication, backed by any [`SnapshotStore`].

pub mod auth;

use std::{path::PathBuf, sync::Arc};

use axum::{Router, middleware};
use odonto_core::store::SnapshotStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::{AccountConfig, AuthConfig, require_owner};

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ODONTO_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:       String,
  #[serde(default = "default_port")]
  pub port:       u16,
  pub store_path: PathBuf,
  #[serde(default)]
  pub accounts:   Vec<AccountConfig>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state the router is built from.
#[derive(Clone)]
pub struct AppState<S> {
  pub store: Arc<S>,
  pub auth:  Arc<AuthConfig>,
}

impl<S> AppState<S> {
  pub fn new(store: S, accounts: Vec<AccountConfig>) -> Self {
    Self {
      store: Arc::new(store),
      auth:  Arc::new(AuthConfig { accounts }),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the axum [`Router`] for the whole server.
pub fn router<S>(state: AppState<S>) -> Router
where
  S: SnapshotStore + 'static,
{
  let api = odonto_api::api_router(state.store.clone())
    .layer(middleware::from_fn_with_state(state.auth.clone(), require_owner));

  Router::new()
    .nest("/api", api)
    .layer(TraceLayer::new_for_http())
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use odonto_core::snapshot::OwnerId;
  use odonto_store_sqlite::SqliteStore;
  use rand_core::OsRng;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;
  use uuid::Uuid;

  use super::*;

  const PASSWORD: &str = "secret";

  fn account(username: &str, owner_id: OwnerId) -> AccountConfig {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
      .hash_password(PASSWORD.as_bytes(), &salt)
      .unwrap()
      .to_string();
    AccountConfig {
      username: username.to_string(),
      password_hash: hash,
      owner_id,
    }
  }

  async fn make_state(accounts: Vec<AccountConfig>) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    AppState::new(store, accounts)
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    state: AppState<SqliteStore>,
    method: &str,
    uri: &str,
    auth: Option<&str>,
    body: Option<Value>,
  ) -> Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = auth {
      builder = builder.header(header::AUTHORIZATION, auth_header(user, PASSWORD));
    }
    let body = match body {
      Some(v) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(v.to_string())
      }
      None => Body::empty(),
    };
    router(state).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn list(state: &AppState<SqliteStore>, user: &str, subject: Uuid) -> Value {
    let resp = oneshot_raw(
      state.clone(),
      "GET",
      &format!("/api/snapshots?subject_id={subject}"),
      Some(user),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    json_body(resp).await
  }

  async fn commit(
    state: &AppState<SqliteStore>,
    user: &str,
    subject: Uuid,
    chart: Value,
  ) -> Response {
    oneshot_raw(
      state.clone(),
      "POST",
      "/api/snapshots",
      Some(user),
      Some(json!({ "subject_id": subject, "state": chart })),
    )
    .await
  }

  #[tokio::test]
  async fn missing_credentials_get_a_basic_challenge() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let resp = oneshot_raw(
      state,
      "GET",
      &format!("/api/snapshots?subject_id={}", Uuid::new_v4()),
      None,
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
      resp.headers().get(header::WWW_AUTHENTICATE).unwrap(),
      "Basic realm=\"odonto\""
    );
    assert_eq!(json_body(resp).await, json!({ "error": "unauthorized" }));
  }

  #[tokio::test]
  async fn wrong_password_is_unauthorized_on_write() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/snapshots")
      .header(header::AUTHORIZATION, auth_header("clinic", "wrong"))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(
        json!({ "subject_id": Uuid::new_v4(), "state": {} }).to_string(),
      ))
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn empty_history() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let body = list(&state, "clinic", Uuid::new_v4()).await;
    assert_eq!(body, json!({ "data": [] }));
  }

  #[tokio::test]
  async fn first_commit_is_listed() {
    let owner = Uuid::new_v4();
    let state = make_state(vec![account("clinic", owner)]).await;
    let patient = Uuid::new_v4();

    let resp = commit(&state, "clinic", patient, json!({ "16": "restored" })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let created = json_body(resp).await;
    assert_eq!(created["data"]["state"], json!({ "16": "restored" }));
    assert_eq!(created["data"]["owner_id"], owner.to_string());

    let body = list(&state, "clinic", patient).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0], created["data"]);
  }

  #[tokio::test]
  async fn reverting_to_none_stores_an_empty_chart() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let patient = Uuid::new_v4();

    commit(&state, "clinic", patient, json!({ "16": "restored" })).await;
    let resp = commit(&state, "clinic", patient, json!({})).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let latest = json_body(
      oneshot_raw(
        state.clone(),
        "GET",
        &format!("/api/snapshots/latest?subject_id={patient}"),
        Some("clinic"),
        None,
      )
      .await,
    )
    .await;
    assert_eq!(latest["data"]["state"], json!({}));
    assert_eq!(list(&state, "clinic", patient).await["data"].as_array().unwrap().len(), 2);
  }

  #[tokio::test]
  async fn older_snapshot_stays_readable_after_a_newer_commit() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let patient = Uuid::new_v4();

    let a = json_body(commit(&state, "clinic", patient, json!({ "11": "cavity" })).await).await;
    let b = json_body(commit(&state, "clinic", patient, json!({ "11": "healthy" })).await).await;

    let body = list(&state, "clinic", patient).await;
    assert_eq!(body["data"][0], b["data"]);
    assert_eq!(body["data"][1], a["data"]);

    let id = a["data"]["id"].as_str().unwrap();
    let resp = oneshot_raw(
      state.clone(),
      "GET",
      &format!("/api/snapshots/{id}?subject_id={patient}"),
      Some("clinic"),
      None,
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["data"]["state"], json!({ "11": "cavity" }));
  }

  #[tokio::test]
  async fn invalid_value_is_rejected_and_nothing_is_stored() {
    let state = make_state(vec![account("clinic", Uuid::new_v4())]).await;
    let patient = Uuid::new_v4();

    commit(&state, "clinic", patient, json!({ "11": "healthy" })).await;
    let resp = commit(&state, "clinic", patient, json!({ "16": "bogus" })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(resp).await["error"].is_string());

    let body = list(&state, "clinic", patient).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["state"], json!({ "11": "healthy" }));
  }

  #[tokio::test]
  async fn accounts_never_see_each_others_charts() {
    let state = make_state(vec![
      account("north", Uuid::new_v4()),
      account("south", Uuid::new_v4()),
    ])
    .await;
    let patient = Uuid::new_v4();

    commit(&state, "north", patient, json!({ "21": "implant" })).await;

    assert_eq!(list(&state, "south", patient).await, json!({ "data": [] }));
    assert_eq!(list(&state, "north", patient).await["data"].as_array().unwrap().len(), 1);
  }
}
