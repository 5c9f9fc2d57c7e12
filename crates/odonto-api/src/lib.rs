//! JSON REST API for Odonto chart snapshots.
//!
//! Exposes an axum [`Router`] backed by any
//! [`odonto_core::store::SnapshotStore`]. Authentication is the caller's
//! responsibility: a layer in front of this router must resolve the clinic
//! account and insert an [`Owner`] extension, otherwise every route answers
//! `401`.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", odonto_api::api_router(store.clone()))
//! ```

pub mod error;
pub mod owner;
pub mod snapshots;

use std::sync::Arc;

use axum::{Router, routing::get};
use odonto_core::store::SnapshotStore;

pub use error::ApiError;
pub use owner::Owner;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: SnapshotStore + 'static,
{
  Router::new()
    .route(
      "/snapshots",
      get(snapshots::list::<S>).post(snapshots::append::<S>),
    )
    .route("/snapshots/latest", get(snapshots::latest::<S>))
    .route("/snapshots/{id}", get(snapshots::get_one::<S>))
    .with_state(store)
}
