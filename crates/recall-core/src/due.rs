//! Due-card selection.
//!
//! A card is due once `now >= next_review_date`. Due cards are served in
//! state-priority order (new, learning, relearning, review); within a tier
//! the most overdue card comes first.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};

use crate::card::Card;

/// Queue order: state priority, then due date, then id.
pub fn queue_order(a: &Card, b: &Card) -> Ordering {
  a.state
    .priority()
    .cmp(&b.state.priority())
    .then_with(|| a.next_review_date.cmp(&b.next_review_date))
    .then_with(|| a.id.cmp(&b.id))
}

/// Select the cards due at `now`, in queue order, truncated to `limit`.
pub fn select_due<'a>(
  cards: impl IntoIterator<Item = &'a Card>,
  now: DateTime<Utc>,
  limit: Option<usize>,
) -> Vec<&'a Card> {
  let mut due: Vec<&Card> = cards.into_iter().filter(|c| c.is_due(now)).collect();
  due.sort_by(|a, b| queue_order(a, b));
  if let Some(limit) = limit {
    due.truncate(limit);
  }
  due
}
