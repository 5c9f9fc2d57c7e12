//! The `SnapshotStore` trait and the owner/subject-scoped [`ChartLog`].
//!
//! `SnapshotStore` is implemented by storage backends (e.g.
//! `odonto-store-sqlite`). Editors never talk to a store directly; they hold a
//! [`ChartLog`] bound to one patient of one clinic account, which is either a
//! [`Scoped`] store or a remote client whose owner is resolved by the server.

use std::future::Future;

use uuid::Uuid;

use crate::{
  chart::ChartMap,
  error::ValidationError,
  snapshot::{NewSnapshot, OwnerId, Snapshot, SubjectId},
};

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Error type of a [`SnapshotStore`] backend.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  /// The validation failure behind this error, if the store rejected the
  /// input rather than failing to persist it.
  fn validation(&self) -> Option<&ValidationError>;
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// Append-only snapshot persistence.
///
/// Every operation is scoped by `(owner, subject)`. A backend must never
/// return a snapshot whose owner or subject differs from the one asked for,
/// even when subject ids collide across owners.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait SnapshotStore: Send + Sync {
  type Error: StoreError;

  /// Validate and persist a new snapshot. `id` and `created_at` are assigned
  /// by the store; `created_at` is strictly greater than that of every
  /// earlier snapshot for the same owner and subject.
  ///
  /// Fails with a validation error if `state` holds the sentinel condition.
  fn append(
    &self,
    owner: OwnerId,
    input: NewSnapshot,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// All snapshots for the subject, newest first. Empty when the subject has
  /// no history.
  fn list(
    &self,
    owner: OwnerId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<Vec<Snapshot>, Self::Error>> + Send + '_;

  /// The newest snapshot for the subject, if any.
  fn latest(
    &self,
    owner: OwnerId,
    subject: SubjectId,
  ) -> impl Future<Output = Result<Option<Snapshot>, Self::Error>> + Send + '_;

  /// One snapshot by id. `None` if it does not exist under this owner and
  /// subject.
  fn get(
    &self,
    owner: OwnerId,
    subject: SubjectId,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Snapshot>, Self::Error>> + Send + '_;
}

// ─── Scoped log ──────────────────────────────────────────────────────────────

/// The history of one patient's chart, as seen by an editor.
pub trait ChartLog: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn subject_id(&self) -> SubjectId;

  /// Persist `state` as a new snapshot.
  fn append(
    &self,
    state: ChartMap,
    note: Option<String>,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_;

  /// All snapshots, newest first.
  fn list(&self) -> impl Future<Output = Result<Vec<Snapshot>, Self::Error>> + Send + '_;
}

/// A [`SnapshotStore`] bound to one owner and subject.
#[derive(Debug, Clone)]
pub struct Scoped<S> {
  store:   S,
  owner:   OwnerId,
  subject: SubjectId,
}

impl<S: SnapshotStore> Scoped<S> {
  pub fn new(store: S, owner: OwnerId, subject: SubjectId) -> Self {
    Self { store, owner, subject }
  }

  pub fn owner_id(&self) -> OwnerId { self.owner }
}

impl<S: SnapshotStore> ChartLog for Scoped<S> {
  type Error = S::Error;

  fn subject_id(&self) -> SubjectId { self.subject }

  fn append(
    &self,
    state: ChartMap,
    note: Option<String>,
  ) -> impl Future<Output = Result<Snapshot, Self::Error>> + Send + '_ {
    self.store.append(self.owner, NewSnapshot {
      subject_id: self.subject,
      state,
      note,
    })
  }

  fn list(&self) -> impl Future<Output = Result<Vec<Snapshot>, Self::Error>> + Send + '_ {
    self.store.list(self.owner, self.subject)
  }
}
