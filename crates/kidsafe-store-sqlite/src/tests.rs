//! Integration tests for `SqliteStore` against an in-memory database.

use kidsafe_core::{
  Error as CoreError,
  account::{AccountService, NewAccount, Role},
  alert::{AlertKind, AlertLog, NewAlert},
  geo::Coordinate,
  membership::MembershipTracker,
  position::PositionSample,
  snapshot::EngineSnapshot,
  store::{AccountLookup, Repository},
  zone::{NewZone, ZoneStore},
};
use uuid::Uuid;

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn new_account(name: &str, email: &str, role: Role) -> NewAccount {
  NewAccount {
    name: name.into(),
    email: email.into(),
    role,
  }
}

// ─── Accounts ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn register_and_get_account() {
  let svc = AccountService::new(store().await);

  let parent = svc
    .register(new_account("Dana", "Dana@Example.com", Role::Parent))
    .await
    .unwrap();
  assert_eq!(parent.email, "dana@example.com");

  let fetched = svc.get(parent.account_id).await.unwrap();
  assert_eq!(fetched, parent);
}

#[tokio::test]
async fn get_account_missing_returns_none() {
  let s = store().await;
  assert!(s.get_account(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn find_by_email_and_code() {
  let s = store().await;
  let svc = AccountService::new(s.clone());
  let parent = svc
    .register(new_account("Dana", "dana@example.com", Role::Parent))
    .await
    .unwrap();

  let by_email = s
    .find_account(AccountLookup::Email("dana@example.com".into()))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_email.account_id, parent.account_id);

  let code = parent.pairing_code.clone().unwrap();
  let by_code = s
    .find_account(AccountLookup::PairingCode(code))
    .await
    .unwrap()
    .unwrap();
  assert_eq!(by_code.account_id, parent.account_id);
}

#[tokio::test]
async fn duplicate_email_rejected_by_service() {
  let svc = AccountService::new(store().await);
  svc
    .register(new_account("Dana", "dana@example.com", Role::Parent))
    .await
    .unwrap();
  let err = svc
    .register(new_account("Dee", "dana@example.com", Role::Child))
    .await
    .unwrap_err();
  assert!(matches!(err, CoreError::EmailTaken(_)));
}

#[tokio::test]
async fn pairing_persists_on_both_sides() {
  let svc = AccountService::new(store().await);
  let parent = svc
    .register(new_account("Dana", "dana@example.com", Role::Parent))
    .await
    .unwrap();
  let child = svc
    .register(new_account("Maya", "maya@example.com", Role::Child))
    .await
    .unwrap();

  let code = parent.pairing_code.clone().unwrap();
  svc.pair(child.account_id, code.as_str()).await.unwrap();

  let children = svc.children_of(parent.account_id).await.unwrap();
  assert_eq!(children.len(), 1);
  assert_eq!(children[0].paired_with, vec![parent.account_id]);
}

#[tokio::test]
async fn list_accounts_keeps_insertion_order_across_updates() {
  let s = store().await;
  let svc = AccountService::new(s.clone());
  let parent = svc
    .register(new_account("Dana", "dana@example.com", Role::Parent))
    .await
    .unwrap();
  let child = svc
    .register(new_account("Maya", "maya@example.com", Role::Child))
    .await
    .unwrap();
  svc
    .pair(child.account_id, parent.pairing_code.as_ref().unwrap().as_str())
    .await
    .unwrap();

  let names: Vec<_> = s
    .list_accounts()
    .await
    .unwrap()
    .into_iter()
    .map(|a| a.name)
    .collect();
  assert_eq!(names, ["Dana", "Maya"]);
}

// ─── Snapshot ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn snapshot_absent_until_saved() {
  let s = store().await;
  assert!(s.load_snapshot().await.unwrap().is_none());
}

#[tokio::test]
async fn snapshot_round_trips_and_overwrites() {
  let s = store().await;

  let mut zones = ZoneStore::new();
  zones
    .add_zone(NewZone::new("Home", Coordinate::new(40.7128, -74.0060), 50.0))
    .unwrap();
  let mut tracker = MembershipTracker::new();
  tracker.evaluate(
    &PositionSample::new("kid", Coordinate::new(40.7128, -74.0060)),
    zones.list_zones(),
  );
  let mut alerts = AlertLog::new();
  let sos = alerts.append(NewAlert {
    kind:         AlertKind::Sos,
    message:      "EMERGENCY: Maya triggered SOS alert!".into(),
    subject_id:   "kid".into(),
    subject_name: "Maya".into(),
  });
  alerts.acknowledge(sos.alert_id);

  let snapshot = EngineSnapshot {
    zones:      zones.list_zones().to_vec(),
    alerts:     alerts.records().to_vec(),
    membership: tracker.entries(),
  };
  s.save_snapshot(snapshot.clone()).await.unwrap();
  assert_eq!(s.load_snapshot().await.unwrap(), Some(snapshot));

  s.save_snapshot(EngineSnapshot::default()).await.unwrap();
  assert_eq!(
    s.load_snapshot().await.unwrap(),
    Some(EngineSnapshot::default())
  );
}
