//! [`Deck`] — the in-memory card store and the engine's main entry point.
//!
//! A deck owns its cards and its clock. There is no global instance; create
//! as many independent decks as needed (per user, per test).

use std::collections::HashMap;

use tracing::debug;

use crate::{
  Error, Result,
  card::{Card, ItemMetadata, Quality},
  clock::{Clock, SystemClock},
  due,
  retention::{self, RetentionCurve},
  scheduler,
  snapshot::Snapshot,
  stats::{self, Stats},
};

#[derive(Debug)]
pub struct Deck<C = SystemClock> {
  cards: HashMap<String, Card>,
  clock: C,
}

impl Default for Deck<SystemClock> {
  fn default() -> Self { Self::new(SystemClock) }
}

impl<C: Clock> Deck<C> {
  pub fn new(clock: C) -> Self { Self { cards: HashMap::new(), clock } }

  /// Build a deck from previously persisted cards. Later duplicates of an id
  /// replace earlier ones.
  pub fn from_cards(clock: C, cards: impl IntoIterator<Item = Card>) -> Self {
    let cards = cards.into_iter().map(|c| (c.id.clone(), c)).collect();
    Self { cards, clock }
  }

  pub fn clock(&self) -> &C { &self.clock }

  pub fn len(&self) -> usize { self.cards.len() }

  pub fn is_empty(&self) -> bool { self.cards.is_empty() }

  pub fn card(&self, id: &str) -> Option<&Card> { self.cards.get(id) }

  /// All cards, in no particular order.
  pub fn cards(&self) -> impl Iterator<Item = &Card> { self.cards.values() }

  // ── Card store ────────────────────────────────────────────────────────────

  /// Return the card for `item_id`, creating a fresh one (due now) the first
  /// time the id is seen. Existing cards are returned unchanged; `metadata`
  /// is only used on creation.
  pub fn get_or_create_card(&mut self, item_id: &str, metadata: ItemMetadata) -> &Card {
    let now = self.clock.now();
    self.cards.entry(item_id.to_owned()).or_insert_with(|| {
      debug!(item_id, "creating card");
      Card::new(item_id, metadata, now)
    })
  }

  /// Drop a card. Used by collaborators that delete the underlying item; the
  /// scheduler itself never removes cards.
  pub fn remove_card(&mut self, id: &str) -> Option<Card> { self.cards.remove(id) }

  /// Replace or insert a card wholesale.
  pub(crate) fn put_card(&mut self, card: Card) -> Option<Card> {
    self.cards.insert(card.id.clone(), card)
  }

  // ── Scheduling ────────────────────────────────────────────────────────────

  /// Apply an SM-2 review to the card for `item_id`.
  ///
  /// Fails with [`Error::CardNotFound`] for an id that was never created;
  /// a review never creates a card.
  pub fn review_card(&mut self, item_id: &str, quality: Quality) -> Result<&Card> {
    let next = self.reviewed(item_id, quality)?;
    let card = self.cards.entry(item_id.to_owned()).insert_entry(next).into_mut();
    debug!(
      item_id,
      quality = quality.value(),
      interval = card.interval,
      ease_factor = card.ease_factor,
      state = %card.state,
      "card reviewed"
    );
    Ok(&*card)
  }

  /// The card as a review of `quality` at the current time would leave it.
  /// The deck itself is not changed.
  pub(crate) fn reviewed(&self, item_id: &str, quality: Quality) -> Result<Card> {
    let card = self
      .card(item_id)
      .ok_or_else(|| Error::CardNotFound(item_id.to_owned()))?;
    Ok(scheduler::apply_review(card, quality, self.clock.now()))
  }

  /// Interval each quality 0..=5 would give the card, without reviewing it.
  pub fn preview_intervals(&self, item_id: &str) -> Result<[u32; 6]> {
    self
      .card(item_id)
      .map(scheduler::preview_intervals)
      .ok_or_else(|| Error::CardNotFound(item_id.to_owned()))
  }

  // ── Queries ───────────────────────────────────────────────────────────────

  /// Cards due now, in queue order. Pure read.
  pub fn due_cards(&self, limit: Option<usize>) -> Vec<&Card> {
    due::select_due(self.cards.values(), self.clock.now(), limit)
  }

  pub fn predict_retention(&self, card: &Card, hours_from_now: f64) -> f64 {
    retention::predict_retention(card, self.clock.now(), hours_from_now)
  }

  pub fn retention_curve(&self, card: &Card, days: f64) -> RetentionCurve {
    retention::retention_curve(card, self.clock.now(), days)
  }

  pub fn stats(&self) -> Stats { stats::compute(self.cards.values(), self.clock.now()) }

  // ── Backup ────────────────────────────────────────────────────────────────

  /// Serialise every card into an opaque JSON blob.
  pub fn export(&self) -> Result<String> {
    Snapshot::capture(self.cards.values(), self.clock.now()).to_json()
  }

  /// Replace every card with the contents of an exported blob.
  ///
  /// The blob is fully parsed and validated before anything changes; on
  /// error the deck is left exactly as it was.
  pub fn import(&mut self, blob: &str) -> Result<()> {
    let cards = Snapshot::from_json(blob)?.into_cards()?;
    debug!(cards = cards.len(), "importing snapshot");
    self.cards = cards;
    Ok(())
  }

  /// Swap in a whole new card map.
  pub(crate) fn replace_cards(&mut self, cards: HashMap<String, Card>) { self.cards = cards; }
}
