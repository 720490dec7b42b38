//! Encoding and decoding helpers between Rust domain types and the plain
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings. States are stored as their
//! lowercase names. Counters are stored as `INTEGER` and range-checked on the
//! way back out.

use chrono::{DateTime, Utc};
use recall_core::card::{Card, CardState, Quality, ReviewRecord};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── CardState ───────────────────────────────────────────────────────────────

pub fn encode_state(state: CardState) -> &'static str { state.into() }

pub fn decode_state(s: &str) -> Result<CardState> {
  s.parse().map_err(|_| Error::UnknownState(s.to_owned()))
}

// ─── Counters ────────────────────────────────────────────────────────────────

fn decode_u32(column: &'static str, value: i64) -> Result<u32> {
  u32::try_from(value).map_err(|_| Error::OutOfRange { column, value })
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `cards` row.
pub struct RawCard {
  pub card_id:        String,
  pub question_text:  String,
  pub question_type:  String,
  pub ease_factor:    f64,
  pub interval_days:  i64,
  pub repetitions:    i64,
  pub next_review_at: String,
  pub last_review_at: Option<String>,
  pub state:          String,
  pub lapses:         i64,
  pub created_at:     String,
}

/// Raw values read directly from a `reviews` row.
pub struct RawReview {
  pub card_id:       String,
  pub reviewed_at:   String,
  pub quality:       i64,
  pub interval_days: i64,
  pub ease_factor:   f64,
  pub state:         String,
}

impl RawReview {
  pub fn into_record(self) -> Result<ReviewRecord> {
    Ok(ReviewRecord {
      date:        decode_dt(&self.reviewed_at)?,
      quality:     Quality::new(self.quality)?,
      interval:    decode_u32("reviews.interval_days", self.interval_days)?,
      ease_factor: self.ease_factor,
      state:       decode_state(&self.state)?,
    })
  }
}

impl RawCard {
  /// Decode the row together with its review history, already in `seq`
  /// order.
  pub fn into_card(self, history: Vec<RawReview>) -> Result<Card> {
    let review_history = history
      .into_iter()
      .map(RawReview::into_record)
      .collect::<Result<Vec<_>>>()?;

    Ok(Card {
      id: self.card_id,
      question_text: self.question_text,
      question_type: self.question_type,
      ease_factor: self.ease_factor,
      interval: decode_u32("cards.interval_days", self.interval_days)?,
      repetitions: decode_u32("cards.repetitions", self.repetitions)?,
      next_review_date: decode_dt(&self.next_review_at)?,
      last_review_date: self.last_review_at.as_deref().map(decode_dt).transpose()?,
      review_history,
      state: decode_state(&self.state)?,
      lapses: decode_u32("cards.lapses", self.lapses)?,
      created_at: decode_dt(&self.created_at)?,
    })
  }
}

/// Owned, column-ready values for one `cards` row plus its history, built
/// before handing off to the database thread.
pub struct EncodedCard {
  pub card_id:        String,
  pub question_text:  String,
  pub question_type:  String,
  pub ease_factor:    f64,
  pub interval_days:  i64,
  pub repetitions:    i64,
  pub next_review_at: String,
  pub last_review_at: Option<String>,
  pub state:          &'static str,
  pub lapses:         i64,
  pub created_at:     String,
  pub reviews:        Vec<EncodedReview>,
}

pub struct EncodedReview {
  pub seq:           i64,
  pub reviewed_at:   String,
  pub quality:       i64,
  pub interval_days: i64,
  pub ease_factor:   f64,
  pub state:         &'static str,
}

pub fn encode_card(card: &Card) -> EncodedCard {
  EncodedCard {
    card_id:        card.id.clone(),
    question_text:  card.question_text.clone(),
    question_type:  card.question_type.clone(),
    ease_factor:    card.ease_factor,
    interval_days:  i64::from(card.interval),
    repetitions:    i64::from(card.repetitions),
    next_review_at: encode_dt(card.next_review_date),
    last_review_at: card.last_review_date.map(encode_dt),
    state:          encode_state(card.state),
    lapses:         i64::from(card.lapses),
    created_at:     encode_dt(card.created_at),
    reviews:        card
      .review_history
      .iter()
      .enumerate()
      .map(|(seq, r)| EncodedReview {
        seq:           seq as i64,
        reviewed_at:   encode_dt(r.date),
        quality:       i64::from(r.quality.value()),
        interval_days: i64::from(r.interval),
        ease_factor:   r.ease_factor,
        state:         encode_state(r.state),
      })
      .collect(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn state_names_round_trip() {
    for state in CardState::ALL {
      assert_eq!(decode_state(encode_state(state)).unwrap(), state);
    }
    assert!(matches!(decode_state("graduated"), Err(Error::UnknownState(_))));
  }

  #[test]
  fn stored_state_matches_json_name() {
    for state in CardState::ALL {
      let json = serde_json::to_value(state).unwrap();
      assert_eq!(json.as_str(), Some(encode_state(state)));
      assert_eq!(state.to_string(), encode_state(state));
    }
  }

  #[test]
  fn negative_counter_is_rejected() {
    assert!(matches!(
      decode_u32("cards.lapses", -1),
      Err(Error::OutOfRange { column: "cards.lapses", value: -1 })
    ));
  }

  #[test]
  fn timestamps_keep_subsecond_precision() {
    let dt = DateTime::parse_from_rfc3339("2024-02-29T23:59:59.123456789Z")
      .unwrap()
      .with_timezone(&Utc);
    assert_eq!(decode_dt(&encode_dt(dt)).unwrap(), dt);
  }
}
