//! Integration tests for `SqliteStore` against an in-memory database.

use odonto_core::{
  ValidationError,
  chart::ChartMap,
  condition::Condition,
  session::{ChartSession, Mode},
  snapshot::NewSnapshot,
  store::{Scoped, SnapshotStore, StoreError as _},
  tooth::ToothNumber,
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn tooth(n: u8) -> ToothNumber { ToothNumber::new(n).unwrap() }

fn chart(pairs: &[(u8, Condition)]) -> ChartMap {
  pairs.iter().map(|(t, c)| (tooth(*t), *c)).collect()
}

// ─── Append ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_without_history_is_empty() {
  let s = store().await;
  let snapshots = s.list(Uuid::new_v4(), Uuid::new_v4()).await.unwrap();
  assert!(snapshots.is_empty());
  assert!(s.latest(Uuid::new_v4(), Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn append_and_list_roundtrip() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();

  let input = NewSnapshot::new(patient, chart(&[(16, Condition::Restored)]))
    .with_note("resin restoration");
  let created = s.append(owner, input).await.unwrap();

  assert_eq!(created.owner_id, owner);
  assert_eq!(created.subject_id, patient);
  assert_eq!(created.note.as_deref(), Some("resin restoration"));

  let listed = s.list(owner, patient).await.unwrap();
  assert_eq!(listed, vec![created]);
}

#[tokio::test]
async fn explicit_sentinel_is_rejected_and_nothing_is_stored() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();
  s.append(owner, NewSnapshot::new(patient, chart(&[(11, Condition::Healthy)])))
    .await
    .unwrap();

  let err = s
    .append(
      owner,
      NewSnapshot::new(patient, chart(&[(11, Condition::Healthy), (16, Condition::None)])),
    )
    .await
    .unwrap_err();

  assert!(matches!(
    err,
    Error::Validation(ValidationError::ExplicitSentinel(t)) if t == tooth(16)
  ));
  assert!(err.validation().is_some());
  assert_eq!(s.list(owner, patient).await.unwrap().len(), 1);
}

#[tokio::test]
async fn rejected_append_leaves_history_untouched() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();
  let first = s
    .append(owner, NewSnapshot::new(patient, chart(&[(16, Condition::Restored)])))
    .await
    .unwrap();

  for bad in [
    chart(&[(16, Condition::None)]),
    chart(&[(11, Condition::Cavity), (36, Condition::None)]),
  ] {
    let err = s
      .append(owner, NewSnapshot::new(patient, bad).with_note("rejected"))
      .await
      .unwrap_err();
    assert!(err.validation().is_some(), "{err}");
  }

  assert_eq!(s.list(owner, patient).await.unwrap(), vec![first.clone()]);
  assert_eq!(s.latest(owner, patient).await.unwrap(), Some(first.clone()));

  let next = s
    .append(owner, NewSnapshot::new(patient, chart(&[(16, Condition::Canal)])))
    .await
    .unwrap();
  assert!(next.created_at > first.created_at);
  assert_eq!(s.list(owner, patient).await.unwrap(), vec![next, first]);
}

#[tokio::test]
async fn empty_chart_is_a_valid_snapshot() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();

  let snap = s
    .append(owner, NewSnapshot::new(patient, ChartMap::new()))
    .await
    .unwrap();
  assert!(snap.state.is_empty());
  assert!(snap.note.is_none());
}

// ─── Ordering ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn list_is_newest_first_and_strictly_ordered() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();

  let mut appended = Vec::new();
  for c in Condition::ALL_RECORDED {
    appended.push(
      s.append(owner, NewSnapshot::new(patient, chart(&[(36, c)])))
        .await
        .unwrap(),
    );
  }

  let listed = s.list(owner, patient).await.unwrap();
  assert_eq!(listed.len(), appended.len());
  for pair in listed.windows(2) {
    assert!(pair[0].created_at > pair[1].created_at);
  }

  appended.reverse();
  assert_eq!(listed, appended);
  assert_eq!(
    s.latest(owner, patient).await.unwrap().as_ref(),
    listed.first()
  );
}

#[tokio::test]
async fn earlier_snapshots_never_change() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();

  let first = s
    .append(owner, NewSnapshot::new(patient, chart(&[(11, Condition::Cavity)])).with_note("a"))
    .await
    .unwrap();
  for _ in 0..3 {
    s.append(owner, NewSnapshot::new(patient, chart(&[(11, Condition::Restored)])))
      .await
      .unwrap();
  }

  let stored = s.get(owner, patient, first.id).await.unwrap().unwrap();
  assert_eq!(stored, first);
}

#[tokio::test]
async fn table_rejects_update_and_delete() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();
  s.append(owner, NewSnapshot::new(patient, chart(&[(11, Condition::Cavity)])))
    .await
    .unwrap();

  let update = s
    .conn
    .call(|conn| {
      conn.execute("UPDATE snapshots SET note = 'tampered'", [])?;
      Ok(())
    })
    .await;
  assert!(update.is_err());

  let delete = s
    .conn
    .call(|conn| {
      conn.execute("DELETE FROM snapshots", [])?;
      Ok(())
    })
    .await;
  assert!(delete.is_err());

  let listed = s.list(owner, patient).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert!(listed[0].note.is_none());
}

// ─── Isolation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn owners_are_isolated_even_with_colliding_subject_ids() {
  let s = store().await;
  let owner_a = Uuid::new_v4();
  let owner_b = Uuid::new_v4();
  let patient = Uuid::new_v4();

  let a = s
    .append(owner_a, NewSnapshot::new(patient, chart(&[(11, Condition::Healthy)])))
    .await
    .unwrap();
  let b = s
    .append(owner_b, NewSnapshot::new(patient, chart(&[(11, Condition::Missing)])))
    .await
    .unwrap();

  assert_eq!(s.list(owner_a, patient).await.unwrap(), vec![a.clone()]);
  assert_eq!(s.list(owner_b, patient).await.unwrap(), vec![b.clone()]);
  assert!(s.get(owner_a, patient, b.id).await.unwrap().is_none());
  assert_eq!(s.latest(owner_b, patient).await.unwrap(), Some(b));
}

#[tokio::test]
async fn subjects_are_isolated() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let p1 = Uuid::new_v4();
  let p2 = Uuid::new_v4();

  let first = s
    .append(owner, NewSnapshot::new(p1, chart(&[(21, Condition::Implant)])))
    .await
    .unwrap();
  s.append(owner, NewSnapshot::new(p2, chart(&[(21, Condition::Canal)])))
    .await
    .unwrap();

  assert_eq!(s.list(owner, p1).await.unwrap(), vec![first.clone()]);
  assert!(s.get(owner, p2, first.id).await.unwrap().is_none());
}

// ─── Session over SQLite ─────────────────────────────────────────────────────

#[tokio::test]
async fn session_two_commits_then_pin_the_older_one() {
  let s = store().await;
  let log = Scoped::new(s.clone(), Uuid::new_v4(), Uuid::new_v4());
  let mut session = ChartSession::open(log).await.unwrap();

  session.set_condition(tooth(11), Condition::Cavity).unwrap();
  let a = session.commit(None).await.unwrap().clone();
  session.set_condition(tooth(11), Condition::Healthy).unwrap();
  let b = session.commit(None).await.unwrap().clone();

  assert_eq!(session.current(), Some(&b));
  assert_eq!(session.condition_of(tooth(11)), Condition::Healthy);

  session.pin(a.id).unwrap();
  assert_eq!(session.condition_of(tooth(11)), Condition::Cavity);

  session.return_to_current().await.unwrap();
  assert_eq!(session.mode(), Mode::Current);
  assert_eq!(session.condition_of(tooth(11)), Condition::Healthy);

  let owner = session.log().owner_id();
  let subject = b.subject_id;
  assert_eq!(s.list(owner, subject).await.unwrap(), vec![b, a]);
}

#[tokio::test]
async fn session_clearing_a_tooth_persists_an_empty_chart() {
  let s = store().await;
  let owner = Uuid::new_v4();
  let patient = Uuid::new_v4();
  s.append(owner, NewSnapshot::new(patient, chart(&[(16, Condition::Restored)])))
    .await
    .unwrap();

  let mut session = ChartSession::open(Scoped::new(s.clone(), owner, patient))
    .await
    .unwrap();
  session.set_condition(tooth(16), Condition::None).unwrap();
  session.commit(None).await.unwrap();

  let latest = s.latest(owner, patient).await.unwrap().unwrap();
  assert!(latest.state.is_empty());
}
