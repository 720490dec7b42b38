//! Integration tests for `SqliteRepository` against an in-memory database.

use chrono::{DateTime, Duration, TimeZone, Utc};
use recall_core::{
  card::{Card, CardState, ItemMetadata, Quality},
  clock::ManualClock,
  scheduler::apply_review,
  session::Session,
  store::CardRepository,
};

use crate::SqliteRepository;

async fn store() -> SqliteRepository {
  SqliteRepository::open_in_memory()
    .await
    .expect("in-memory store")
}

fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 3, 10, 9, 30, 0).unwrap() }

fn q(v: i64) -> Quality { Quality::new(v).unwrap() }

fn card(id: &str) -> Card {
  Card::new(
    id,
    ItemMetadata { question_text: format!("What is {id}?"), question_type: "recall".into() },
    t0(),
  )
}

/// A card with `qualities` applied one day apart.
fn reviewed(id: &str, qualities: &[i64]) -> Card {
  let mut c = card(id);
  for (i, v) in qualities.iter().enumerate() {
    c = apply_review(&c, q(*v), t0() + Duration::days(i as i64 + 1));
  }
  c
}

// ─── Round trip ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn empty_store_loads_nothing() {
  let s = store().await;
  assert!(s.load_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn fresh_card_round_trips() {
  let s = store().await;
  let c = card("a");
  s.save_card(&c).await.unwrap();

  let loaded = s.load_cards().await.unwrap();
  assert_eq!(loaded, vec![c]);
  assert_eq!(loaded[0].last_review_date, None);
  assert_eq!(loaded[0].question_text, "What is a?");
}

#[tokio::test]
async fn history_round_trips_in_order() {
  let s = store().await;
  let c = reviewed("a", &[4, 5, 1, 3]);
  assert_eq!(c.state, CardState::Relearning);
  s.save_card(&c).await.unwrap();

  let loaded = s.load_cards().await.unwrap();
  assert_eq!(loaded.len(), 1);
  assert_eq!(loaded[0], c);
  let qualities: Vec<u8> = loaded[0].review_history.iter().map(|r| r.quality.value()).collect();
  assert_eq!(qualities, vec![4, 5, 1, 3]);
}

#[tokio::test]
async fn save_overwrites_and_extends_history() {
  let s = store().await;
  let c = reviewed("a", &[4]);
  s.save_card(&c).await.unwrap();

  let c = apply_review(&c, q(5), t0() + Duration::days(5));
  s.save_card(&c).await.unwrap();

  let loaded = s.load_cards().await.unwrap();
  assert_eq!(loaded, vec![c]);
  assert_eq!(loaded[0].review_history.len(), 2);
}

#[tokio::test]
async fn save_with_shorter_history_truncates() {
  let s = store().await;
  s.save_card(&reviewed("a", &[4, 4, 4])).await.unwrap();

  let shorter = reviewed("a", &[2]);
  s.save_card(&shorter).await.unwrap();

  let loaded = s.load_cards().await.unwrap();
  assert_eq!(loaded, vec![shorter]);
}

#[tokio::test]
async fn cards_load_sorted_by_id() {
  let s = store().await;
  for id in ["c", "a", "b"] {
    s.save_card(&card(id)).await.unwrap();
  }
  let ids: Vec<String> = s.load_cards().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, vec!["a", "b", "c"]);
}

// ─── Delete / replace ────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_reports_whether_card_existed() {
  let s = store().await;
  s.save_card(&reviewed("a", &[4, 4])).await.unwrap();

  assert!(s.delete_card("a").await.unwrap());
  assert!(!s.delete_card("a").await.unwrap());
  assert!(s.load_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn delete_cascades_to_history() {
  let s = store().await;
  s.save_card(&reviewed("a", &[4, 4])).await.unwrap();
  s.delete_card("a").await.unwrap();

  // Recreating the id must not resurrect the old history.
  let fresh = card("a");
  s.save_card(&fresh).await.unwrap();
  assert_eq!(s.load_cards().await.unwrap(), vec![fresh]);
}

#[tokio::test]
async fn replace_all_swaps_contents() {
  let s = store().await;
  s.save_card(&reviewed("old", &[4])).await.unwrap();

  let new_cards = vec![reviewed("x", &[5, 5]), card("y")];
  s.replace_all(&new_cards).await.unwrap();

  assert_eq!(s.load_cards().await.unwrap(), new_cards);

  s.replace_all(&[]).await.unwrap();
  assert!(s.load_cards().await.unwrap().is_empty());
}

#[tokio::test]
async fn reopening_file_store_keeps_cards() {
  let dir = std::env::temp_dir().join(format!("recall-sqlite-{}", std::process::id()));
  std::fs::create_dir_all(&dir).unwrap();
  let path = dir.join("cards.db");
  let _ = std::fs::remove_file(&path);

  let c = reviewed("persisted", &[3, 4]);
  {
    let s = SqliteRepository::open(&path).await.unwrap();
    s.save_card(&c).await.unwrap();
  }
  let s = SqliteRepository::open(&path).await.unwrap();
  assert_eq!(s.load_cards().await.unwrap(), vec![c]);

  drop(s);
  let _ = std::fs::remove_dir_all(&dir);
}

// ─── Session ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn session_over_sqlite_persists_reviews() {
  let s = store().await;
  let clock = std::sync::Arc::new(ManualClock::new(t0()));

  let mut session = Session::open(s.clone(), clock.clone()).await.unwrap();
  session.get_or_create_card("s1", ItemMetadata::default()).await.unwrap();
  session.review_card("s1", q(4)).await.unwrap();
  clock.advance(Duration::days(1));
  let after = session.review_card("s1", q(4)).await.unwrap();
  assert_eq!(after.interval, 6);

  let reopened = Session::open(s, clock).await.unwrap();
  assert_eq!(reopened.deck().card("s1"), Some(&after));
}

#[tokio::test]
async fn session_import_replaces_stored_cards() {
  let s = store().await;
  let clock = ManualClock::new(t0());
  let mut session = Session::open(s.clone(), clock).await.unwrap();
  session.get_or_create_card("gone", ItemMetadata::default()).await.unwrap();

  let other = recall_core::Deck::from_cards(ManualClock::new(t0()), [reviewed("kept", &[5])]);
  session.import(&other.export().unwrap()).await.unwrap();

  let ids: Vec<String> = s.load_cards().await.unwrap().into_iter().map(|c| c.id).collect();
  assert_eq!(ids, vec!["kept"]);
}
