//! [`Session`] — a deck bound to durable storage.
//!
//! Every mutating call computes its result on a copy, awaits the repository
//! write, and only then swaps the result into the deck. A failed write, or a
//! caller that stops polling mid-write, leaves the deck as it was. Reads go
//! straight to the deck.

use thiserror::Error;
use tracing::{debug, warn};

use crate::{
  Error,
  card::{Card, ItemMetadata, Quality},
  clock::Clock,
  deck::Deck,
  snapshot::Snapshot,
  store::CardRepository,
};

#[derive(Debug, Error)]
pub enum SessionError<E: std::error::Error + 'static> {
  #[error(transparent)]
  Engine(#[from] Error),

  #[error("storage error: {0}")]
  Storage(#[source] E),
}

pub type SessionResult<T, E> = std::result::Result<T, SessionError<E>>;

pub struct Session<R, C> {
  deck: Deck<C>,
  repo: R,
}

impl<R: CardRepository, C: Clock> Session<R, C> {
  /// Load every stored card into a fresh deck.
  pub async fn open(repo: R, clock: C) -> Result<Self, R::Error> {
    let cards = repo.load_cards().await?;
    debug!(cards = cards.len(), "session opened");
    Ok(Self { deck: Deck::from_cards(clock, cards), repo })
  }

  pub fn deck(&self) -> &Deck<C> { &self.deck }

  pub fn repository(&self) -> &R { &self.repo }

  pub async fn get_or_create_card(
    &mut self,
    item_id: &str,
    metadata: ItemMetadata,
  ) -> SessionResult<Card, R::Error> {
    if let Some(card) = self.deck.card(item_id) {
      return Ok(card.clone());
    }

    let card = Card::new(item_id, metadata, self.deck.clock().now());
    if let Err(e) = self.repo.save_card(&card).await {
      warn!(item_id, error = %e, "failed to persist new card");
      return Err(SessionError::Storage(e));
    }
    debug!(item_id, "creating card");
    self.deck.put_card(card.clone());
    Ok(card)
  }

  pub async fn review_card(
    &mut self,
    item_id: &str,
    quality: Quality,
  ) -> SessionResult<Card, R::Error> {
    let after = self.deck.reviewed(item_id, quality)?;
    if let Err(e) = self.repo.save_card(&after).await {
      warn!(item_id, error = %e, "failed to persist review");
      return Err(SessionError::Storage(e));
    }
    debug!(
      item_id,
      quality = quality.value(),
      interval = after.interval,
      state = %after.state,
      "review committed"
    );
    self.deck.put_card(after.clone());
    Ok(after)
  }

  /// Remove a card from storage and memory. Returns `None` if it was unknown.
  pub async fn remove_card(&mut self, item_id: &str) -> SessionResult<Option<Card>, R::Error> {
    if self.deck.card(item_id).is_none() {
      return Ok(None);
    }

    if let Err(e) = self.repo.delete_card(item_id).await {
      warn!(item_id, error = %e, "failed to delete card");
      return Err(SessionError::Storage(e));
    }
    Ok(self.deck.remove_card(item_id))
  }

  /// Replace the whole store from an exported blob.
  ///
  /// Malformed input is rejected before memory or storage is touched.
  pub async fn import(&mut self, blob: &str) -> SessionResult<(), R::Error> {
    let cards = Snapshot::from_json(blob)?.into_cards()?;
    let list: Vec<Card> = cards.values().cloned().collect();

    if let Err(e) = self.repo.replace_all(&list).await {
      warn!(error = %e, "failed to persist import");
      return Err(SessionError::Storage(e));
    }
    self.deck.replace_cards(cards);
    debug!(cards = list.len(), "import committed");
    Ok(())
  }

  pub fn export(&self) -> Result<String, Error> { self.deck.export() }
}
