//! Whole-store backup format.
//!
//! A snapshot is a versioned JSON object holding every card keyed by id. The
//! storage collaborator treats it as an opaque blob; the only promise is that
//! export followed by import reproduces the card set exactly.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  Error, Result,
  card::Card,
  scheduler::{MAX_INTERVAL_DAYS, MIN_EASE_FACTOR},
};

pub const SNAPSHOT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
  pub version:     u32,
  pub exported_at: DateTime<Utc>,
  /// Sorted by id so identical decks export identical blobs.
  pub cards:       BTreeMap<String, Card>,
}

impl Snapshot {
  pub fn capture<'a>(cards: impl IntoIterator<Item = &'a Card>, now: DateTime<Utc>) -> Self {
    Self {
      version:     SNAPSHOT_VERSION,
      exported_at: now,
      cards:       cards.into_iter().map(|c| (c.id.clone(), c.clone())).collect(),
    }
  }

  pub fn to_json(&self) -> Result<String> { Ok(serde_json::to_string(self)?) }

  pub fn from_json(blob: &str) -> Result<Self> { Ok(serde_json::from_str(blob)?) }

  /// Validate every card and hand back the store contents.
  pub fn into_cards(self) -> Result<HashMap<String, Card>> {
    if self.version != SNAPSHOT_VERSION {
      return Err(Error::UnsupportedVersion(self.version));
    }

    self
      .cards
      .into_iter()
      .map(|(key, card)| {
        validate(&key, &card)?;
        Ok((key, card))
      })
      .collect()
  }
}

fn validate(key: &str, card: &Card) -> Result<()> {
  let invalid = |msg: String| -> Result<()> { Err(Error::InvalidSnapshot(msg)) };

  if key != card.id {
    return invalid(format!("entry {key:?} holds card {:?}", card.id));
  }
  if !card.ease_factor.is_finite() || card.ease_factor < MIN_EASE_FACTOR {
    return invalid(format!("card {key:?} has ease factor {}", card.ease_factor));
  }
  if card.interval > MAX_INTERVAL_DAYS {
    return invalid(format!("card {key:?} has interval {} days", card.interval));
  }
  if card.repetitions > 0 && card.interval == 0 {
    return invalid(format!("card {key:?} has repetitions without an interval"));
  }
  if let Some(r) = card
    .review_history
    .iter()
    .find(|r| !r.ease_factor.is_finite() || r.ease_factor < MIN_EASE_FACTOR)
  {
    return invalid(format!(
      "card {key:?} has a review record with ease factor {}",
      r.ease_factor
    ));
  }
  Ok(())
}
