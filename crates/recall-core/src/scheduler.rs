//! SM-2 spaced repetition update rule.
//!
//! Implementation of the SuperMemo 2 algorithm, extended with a
//! new/learning/review/relearning state machine. Scheduling functions are
//! pure: they take the current time as an argument and return a new value
//! rather than mutating in place.

use chrono::{DateTime, Duration, Utc};

use crate::card::{Card, CardState, Quality, ReviewRecord};

/// Ease factor assigned to a fresh card.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Minimum ease factor allowed
pub const MIN_EASE_FACTOR: f64 = 1.3;

/// Longest interval a review can schedule: one hundred years.
pub const MAX_INTERVAL_DAYS: u32 = 36_500;

/// The scheduling parameters a review produces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Schedule {
  pub interval:    u32,
  pub repetitions: u32,
  pub ease_factor: f64,
  pub state:       CardState,
  pub lapses:      u32,
}

/// `EF' = max(1.3, EF + (0.1 - (5-q) * (0.08 + (5-q) * 0.02)))`
pub fn next_ease_factor(ease_factor: f64, quality: Quality) -> f64 {
  let miss = f64::from(Quality::MAX - quality.value());
  (ease_factor + (0.1 - miss * (0.08 + miss * 0.02))).max(MIN_EASE_FACTOR)
}

/// Compute the parameters `card` would have after a review of `quality`.
pub fn next_schedule(card: &Card, quality: Quality) -> Schedule {
  let (interval, repetitions, state, lapses) = if quality.is_pass() {
    let interval = match card.repetitions {
      0 => 1,
      1 => 6,
      // Uses the ease factor from before this review.
      _ => (f64::from(card.interval) * card.ease_factor)
        .round()
        .min(f64::from(MAX_INTERVAL_DAYS)) as u32,
    };
    let repetitions = card.repetitions + 1;

    let state = match card.state {
      CardState::New => CardState::Learning,
      CardState::Learning | CardState::Relearning if repetitions >= 2 => CardState::Review,
      CardState::Learning => CardState::Learning,
      CardState::Relearning => CardState::Relearning,
      CardState::Review => CardState::Review,
    };

    (interval, repetitions, state, card.lapses)
  } else {
    let state = match card.state {
      CardState::Review => CardState::Relearning,
      _ => CardState::Learning,
    };

    (1, 0, state, card.lapses + 1)
  };

  Schedule {
    interval,
    repetitions,
    ease_factor: next_ease_factor(card.ease_factor, quality),
    state,
    lapses,
  }
}

/// Apply a review to `card` at `now`, returning the updated card.
///
/// The input is left untouched; callers swap the result in as a whole, so a
/// half-applied update is never observable.
pub fn apply_review(card: &Card, quality: Quality, now: DateTime<Utc>) -> Card {
  let schedule = next_schedule(card, quality);

  let mut next = card.clone();
  next.review_history.push(ReviewRecord {
    date: now,
    quality,
    interval: card.interval,
    ease_factor: card.ease_factor,
    state: card.state,
  });
  next.last_review_date = Some(now);
  next.interval = schedule.interval;
  next.repetitions = schedule.repetitions;
  next.ease_factor = schedule.ease_factor;
  next.state = schedule.state;
  next.lapses = schedule.lapses;
  next.next_review_date = due_after(now, schedule.interval);
  next
}

/// `now + interval days`, saturating at the latest representable instant.
fn due_after(now: DateTime<Utc>, interval: u32) -> DateTime<Utc> {
  now
    .checked_add_signed(Duration::days(i64::from(interval)))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// The interval each quality rating 0..=5 would produce, indexed by quality.
///
/// Used to show users what each answer button would do.
pub fn preview_intervals(card: &Card) -> [u32; 6] {
  let mut out = [0; 6];
  for quality in Quality::all() {
    out[usize::from(quality.value())] = next_schedule(card, quality).interval;
  }
  out
}

/// Format an interval in days to a human-readable string
pub fn format_interval(days: u32) -> String {
  match days {
    0 => "now".to_string(),
    1..=6 => format!("{days}d"),
    7..=29 => format!("{}w", days / 7),
    30..=364 => format!("{}mo", days / 30),
    _ => format!("{}y", days / 365),
  }
}
