//! Aggregate statistics over a card set. Read-only.

use std::{cmp::Reverse, collections::BTreeMap};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{
  card::{Card, CardState, ReviewRecord},
  retention::predict_retention,
};

/// How many of the latest review records feed `recent_accuracy`.
pub const RECENT_WINDOW: usize = 20;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
  pub total_cards:       usize,
  /// Due within the next 24 hours, overdue cards included.
  pub due_today:         usize,
  /// Due between 24 and 48 hours from now.
  pub due_tomorrow:      usize,
  pub average_retention: f64,
  pub cards_by_state:    BTreeMap<CardState, usize>,
  pub total_reviews:     usize,
  /// Pass rate in `[0, 1]` over the most recent review records.
  pub recent_accuracy:   f64,
}

pub fn compute<'a>(cards: impl IntoIterator<Item = &'a Card>, now: DateTime<Utc>) -> Stats {
  let cards: Vec<&Card> = cards.into_iter().collect();
  let day_end = now + Duration::hours(24);
  let tomorrow_end = now + Duration::hours(48);

  let mut cards_by_state: BTreeMap<CardState, usize> =
    CardState::ALL.iter().map(|s| (*s, 0)).collect();
  let mut due_today = 0;
  let mut due_tomorrow = 0;
  let mut retention_sum = 0.0;
  let mut total_reviews = 0;

  for card in &cards {
    *cards_by_state.entry(card.state).or_default() += 1;

    if card.next_review_date <= day_end {
      due_today += 1;
    } else if card.next_review_date <= tomorrow_end {
      due_tomorrow += 1;
    }

    retention_sum += predict_retention(card, now, 0.0);
    total_reviews += card.review_history.len();
  }

  let average_retention = if cards.is_empty() {
    0.0
  } else {
    retention_sum / cards.len() as f64
  };

  let recent = recent_reviews(cards.iter().copied(), RECENT_WINDOW);
  let recent_accuracy = if recent.is_empty() {
    0.0
  } else {
    let passed = recent.iter().filter(|(_, r)| r.quality.is_pass()).count();
    passed as f64 / recent.len() as f64
  };

  Stats {
    total_cards: cards.len(),
    due_today,
    due_tomorrow,
    average_retention,
    cards_by_state,
    total_reviews,
    recent_accuracy,
  }
}

/// The `n` most recent review records across `cards`, newest first.
///
/// Equal timestamps fall back to card id, then to the later entry in that
/// card's history.
pub fn recent_reviews<'a>(
  cards: impl IntoIterator<Item = &'a Card>,
  n: usize,
) -> Vec<(&'a str, &'a ReviewRecord)> {
  let mut records: Vec<(&str, usize, &ReviewRecord)> = cards
    .into_iter()
    .flat_map(|card| {
      card
        .review_history
        .iter()
        .enumerate()
        .map(move |(pos, record)| (card.id.as_str(), pos, record))
    })
    .collect();
  records.sort_by_key(|(id, pos, record)| (Reverse(record.date), *id, Reverse(*pos)));
  records.truncate(n);
  records.into_iter().map(|(id, _, record)| (id, record)).collect()
}
