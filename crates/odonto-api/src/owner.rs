//! The authenticated clinic account behind a request.

use axum::{extract::FromRequestParts, http::request::Parts};
use odonto_core::snapshot::OwnerId;

use crate::error::ApiError;

/// The owner every store call in a request is scoped to.
///
/// Authentication layers insert it as a request extension; the API never
/// reads an owner from the query string or body. Extracting it from a
/// request without one rejects with `401`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Owner(pub OwnerId);

impl<S: Send + Sync> FromRequestParts<S> for Owner {
  type Rejection = ApiError;

  async fn from_request_parts(
    parts: &mut Parts,
    _state: &S,
  ) -> Result<Self, Self::Rejection> {
    parts
      .extensions
      .get::<Owner>()
      .copied()
      .ok_or(ApiError::Unauthorized)
  }
}
