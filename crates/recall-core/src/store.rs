//! The `CardRepository` trait and an in-memory implementation.
//!
//! The trait is implemented by storage backends (e.g. `recall-store-sqlite`).
//! The scheduling core never touches a repository directly; [`Session`]
//! pairs a [`Deck`] with one and keeps the two consistent.
//!
//! [`Session`]: crate::session::Session
//! [`Deck`]: crate::deck::Deck

use std::{
  collections::BTreeMap,
  convert::Infallible,
  future::Future,
  sync::{Arc, Mutex, PoisonError},
};

use crate::card::Card;

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Durable storage for cards.
///
/// Each method is one unit of consistency: `save_card` persists a card and
/// its full review history together, and `replace_all` swaps the entire
/// store at once.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CardRepository: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Every stored card, history included.
  fn load_cards(&self) -> impl Future<Output = Result<Vec<Card>, Self::Error>> + Send + '_;

  /// Insert or overwrite one card.
  fn save_card<'a>(
    &'a self,
    card: &'a Card,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Delete everything and store `cards` in its place.
  fn replace_all<'a>(
    &'a self,
    cards: &'a [Card],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  /// Remove one card. Returns `false` if it did not exist.
  fn delete_card<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}

// ─── In-memory ───────────────────────────────────────────────────────────────

/// A repository that keeps cards in memory only.
///
/// Useful when the caller handles durability itself (e.g. through
/// export/import) and in tests. Cloning is cheap and clones share contents.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
  cards: Arc<Mutex<BTreeMap<String, Card>>>,
}

impl MemoryRepository {
  pub fn new() -> Self { Self::default() }

  fn with<R>(&self, f: impl FnOnce(&mut BTreeMap<String, Card>) -> R) -> R {
    let mut guard = self.cards.lock().unwrap_or_else(PoisonError::into_inner);
    f(&mut guard)
  }
}

impl CardRepository for MemoryRepository {
  type Error = Infallible;

  async fn load_cards(&self) -> Result<Vec<Card>, Infallible> {
    Ok(self.with(|cards| cards.values().cloned().collect()))
  }

  async fn save_card(&self, card: &Card) -> Result<(), Infallible> {
    self.with(|cards| cards.insert(card.id.clone(), card.clone()));
    Ok(())
  }

  async fn replace_all(&self, new_cards: &[Card]) -> Result<(), Infallible> {
    self.with(|cards| {
      *cards = new_cards.iter().map(|c| (c.id.clone(), c.clone())).collect();
    });
    Ok(())
  }

  async fn delete_card(&self, id: &str) -> Result<bool, Infallible> {
    Ok(self.with(|cards| cards.remove(id).is_some()))
  }
}
