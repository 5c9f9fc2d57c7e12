//! HTTP Basic authentication resolving a clinic account to its owner id.

use std::sync::Arc;

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::{
  extract::{Request, State},
  http::HeaderMap,
  middleware::Next,
  response::{IntoResponse as _, Response},
};
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD as B64;
use odonto_api::{ApiError, Owner};
use odonto_core::snapshot::OwnerId;
use serde::Deserialize;

/// One clinic account allowed to use this server.
#[derive(Debug, Clone, Deserialize)]
pub struct AccountConfig {
  pub username:      String,
  /// PHC string produced by argon2, e.g. `$argon2id$v=19$…`
  pub password_hash: String,
  /// Every snapshot written with these credentials is scoped to this id.
  pub owner_id:      OwnerId,
}

/// Credentials accepted as valid for this server instance.
#[derive(Debug, Clone, Default)]
pub struct AuthConfig {
  pub accounts: Vec<AccountConfig>,
}

impl AuthConfig {
  fn account(&self, username: &str) -> Option<&AccountConfig> {
    self.accounts.iter().find(|a| a.username == username)
  }
}

/// Verify credentials from headers and return the account's owner id.
pub fn verify_auth(headers: &HeaderMap, config: &AuthConfig) -> Result<OwnerId, ApiError> {
  let header_val = headers
    .get(axum::http::header::AUTHORIZATION)
    .and_then(|v| v.to_str().ok())
    .ok_or(ApiError::Unauthorized)?;

  let encoded = header_val
    .strip_prefix("Basic ")
    .ok_or(ApiError::Unauthorized)?;

  let decoded = B64.decode(encoded).map_err(|_| ApiError::Unauthorized)?;
  let creds   = std::str::from_utf8(&decoded).map_err(|_| ApiError::Unauthorized)?;

  let (username, password) = creds.split_once(':').ok_or(ApiError::Unauthorized)?;

  let account = config.account(username).ok_or(ApiError::Unauthorized)?;

  let parsed_hash = PasswordHash::new(&account.password_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Argon2::default()
    .verify_password(password.as_bytes(), &parsed_hash)
    .map_err(|_| ApiError::Unauthorized)?;

  Ok(account.owner_id)
}

/// Middleware: authenticate the request and attach its [`Owner`].
///
/// Every failure answers the same `401`, whatever the reason.
pub async fn require_owner(
  State(config): State<Arc<AuthConfig>>,
  mut req: Request,
  next: Next,
) -> Response {
  match verify_auth(req.headers(), &config) {
    Ok(owner) => {
      req.extensions_mut().insert(Owner(owner));
      next.run(req).await
    }
    Err(e) => {
      tracing::warn!(method = %req.method(), path = %req.uri().path(), "rejected credentials");
      e.into_response()
    }
  }
}
