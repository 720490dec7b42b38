//! Card — the unit of scheduling.
//!
//! One card exists per learning item. Its scheduling parameters (interval,
//! ease factor, repetitions, state) change only through a review; every
//! review leaves behind a [`ReviewRecord`] describing the card as it was
//! before the update.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

use crate::{Error, Result, scheduler::DEFAULT_EASE_FACTOR};

// ─── State ───────────────────────────────────────────────────────────────────

/// Where a card sits in the learning state machine.
///
/// `New → Learning → Review`, with `Review → Relearning` on a lapse and
/// `Relearning → Review` once the card passes twice in a row again.
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  Hash,
  PartialOrd,
  Ord,
  Default,
  Serialize,
  Deserialize,
  Display,
  EnumString,
  IntoStaticStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CardState {
  #[default]
  New,
  Learning,
  Review,
  Relearning,
}

impl CardState {
  /// All states, in due-queue priority order.
  pub const ALL: [CardState; 4] = [
    CardState::New,
    CardState::Learning,
    CardState::Relearning,
    CardState::Review,
  ];

  /// Due-queue priority; lower values are served first.
  pub fn priority(self) -> u8 {
    match self {
      Self::New => 0,
      Self::Learning => 1,
      Self::Relearning => 2,
      Self::Review => 3,
    }
  }
}

// ─── Quality ─────────────────────────────────────────────────────────────────

/// An SM-2 recall quality rating in `0..=5`.
///
/// - 0: complete blackout
/// - 1: incorrect, but the answer was recognised
/// - 2: incorrect, but the answer seemed easy once shown
/// - 3: correct with serious difficulty
/// - 4: correct after hesitation
/// - 5: perfect, instant recall
///
/// Values outside the range are unrepresentable; construction rejects them.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(try_from = "i64", into = "u8")]
pub struct Quality(u8);

impl Quality {
  pub const MAX: u8 = 5;
  /// Lowest quality that counts as a successful recall.
  pub const PASS: u8 = 3;

  pub fn new(value: i64) -> Result<Self> {
    if (0..=i64::from(Self::MAX)).contains(&value) {
      Ok(Self(value as u8))
    } else {
      Err(Error::InvalidQuality(value))
    }
  }

  pub fn value(self) -> u8 { self.0 }

  pub fn is_pass(self) -> bool { self.0 >= Self::PASS }

  /// Every valid quality, ascending.
  pub fn all() -> impl Iterator<Item = Quality> { (0..=Self::MAX).map(Quality) }
}

impl TryFrom<i64> for Quality {
  type Error = Error;

  fn try_from(value: i64) -> Result<Self> { Self::new(value) }
}

impl From<Quality> for u8 {
  fn from(q: Quality) -> u8 { q.0 }
}

/// Four-button rating used by front-ends that do not expose the full 0–5
/// scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Rating {
  Again,
  Hard,
  Good,
  Easy,
}

impl From<Rating> for Quality {
  fn from(rating: Rating) -> Self {
    match rating {
      Rating::Again => Quality(1),
      Rating::Hard => Quality(3),
      Rating::Good => Quality(4),
      Rating::Easy => Quality(5),
    }
  }
}

// ─── Records ─────────────────────────────────────────────────────────────────

/// Snapshot of a card taken immediately before a review was applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewRecord {
  pub date:        DateTime<Utc>,
  pub quality:     Quality,
  /// Interval in days before the update.
  pub interval:    u32,
  pub ease_factor: f64,
  pub state:       CardState,
}

/// Descriptive metadata about the item a card tracks. Never consulted by the
/// scheduler.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemMetadata {
  #[serde(default)]
  pub question_text: String,
  #[serde(default)]
  pub question_type: String,
}

// ─── Card ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
  pub id:               String,
  pub question_text:    String,
  pub question_type:    String,
  pub ease_factor:      f64,
  /// Days until the next review; 0 until the first review.
  pub interval:         u32,
  /// Consecutive passing reviews since the last lapse.
  pub repetitions:      u32,
  pub next_review_date: DateTime<Utc>,
  pub last_review_date: Option<DateTime<Utc>>,
  pub review_history:   Vec<ReviewRecord>,
  pub state:            CardState,
  pub lapses:           u32,
  pub created_at:       DateTime<Utc>,
}

impl Card {
  /// A never-reviewed card, due immediately.
  pub fn new(id: impl Into<String>, metadata: ItemMetadata, now: DateTime<Utc>) -> Self {
    Self {
      id:               id.into(),
      question_text:    metadata.question_text,
      question_type:    metadata.question_type,
      ease_factor:      DEFAULT_EASE_FACTOR,
      interval:         0,
      repetitions:      0,
      next_review_date: now,
      last_review_date: None,
      review_history:   Vec::new(),
      state:            CardState::New,
      lapses:           0,
      created_at:       now,
    }
  }

  pub fn is_due(&self, now: DateTime<Utc>) -> bool { now >= self.next_review_date }

  pub fn metadata(&self) -> ItemMetadata {
    ItemMetadata {
      question_text: self.question_text.clone(),
      question_type: self.question_type.clone(),
    }
  }
}
