//! Async HTTP client wrapping the odonto JSON API.

use std::time::Duration;

use odonto_core::{
  chart::ChartMap,
  snapshot::{Snapshot, SubjectId},
  store::ChartLog,
};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use thiserror::Error;

/// Connection settings for the odonto API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub username: String,
  pub password: String,
}

#[derive(Debug, Error)]
pub enum ClientError {
  #[error("request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("server answered {status}: {message}")]
  Status { status: StatusCode, message: String },
}

#[derive(Deserialize)]
struct Envelope<T> {
  data: T,
}

#[derive(Deserialize)]
struct ErrorBody {
  error: String,
}

#[derive(Serialize)]
struct AppendBody<'a> {
  subject_id: SubjectId,
  state:      &'a ChartMap,
  #[serde(skip_serializing_if = "Option::is_none")]
  note:       Option<&'a str>,
}

/// Async HTTP client for the odonto JSON REST API.
///
/// Clones share the inner [`reqwest::Client`].
#[derive(Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> Result<Self, ClientError> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/api{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn auth(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
    if self.config.username.is_empty() {
      req
    } else {
      req.basic_auth(&self.config.username, Some(&self.config.password))
    }
  }

  async fn read<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClientError> {
    let status = resp.status();
    if !status.is_success() {
      let message = match resp.json::<ErrorBody>().await {
        Ok(body) => body.error,
        Err(_) => status.canonical_reason().unwrap_or("error").to_string(),
      };
      return Err(ClientError::Status { status, message });
    }
    Ok(resp.json::<Envelope<T>>().await?.data)
  }

  /// `GET /api/snapshots?subject_id=<id>`
  pub async fn list_snapshots(&self, subject_id: SubjectId) -> Result<Vec<Snapshot>, ClientError> {
    let resp = self
      .auth(self.client.get(self.url("/snapshots")))
      .query(&[("subject_id", subject_id.to_string())])
      .send()
      .await?;
    Self::read(resp).await
  }

  /// `POST /api/snapshots`
  pub async fn append_snapshot(
    &self,
    subject_id: SubjectId,
    state: &ChartMap,
    note: Option<&str>,
  ) -> Result<Snapshot, ClientError> {
    let resp = self
      .auth(self.client.post(self.url("/snapshots")))
      .json(&AppendBody { subject_id, state, note })
      .send()
      .await?;
    Self::read(resp).await
  }
}

/// One patient's chart on the server.
///
/// The owner is never sent: the server resolves it from the credentials.
#[derive(Clone)]
pub struct RemoteChart {
  client:     ApiClient,
  subject_id: SubjectId,
}

impl RemoteChart {
  pub fn new(client: ApiClient, subject_id: SubjectId) -> Self {
    Self { client, subject_id }
  }
}

impl ChartLog for RemoteChart {
  type Error = ClientError;

  fn subject_id(&self) -> SubjectId { self.subject_id }

  async fn append(
    &self,
    state: ChartMap,
    note: Option<String>,
  ) -> Result<Snapshot, ClientError> {
    let snapshot = self
      .client
      .append_snapshot(self.subject_id, &state, note.as_deref())
      .await?;
    tracing::info!(snapshot_id = %snapshot.id, teeth = snapshot.state.len(), "committed chart");
    Ok(snapshot)
  }

  async fn list(&self) -> Result<Vec<Snapshot>, ClientError> {
    let snapshots = self.client.list_snapshots(self.subject_id).await?;
    tracing::debug!(count = snapshots.len(), "loaded chart history");
    Ok(snapshots)
  }
}
