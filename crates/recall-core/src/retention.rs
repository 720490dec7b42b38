//! Forgetting-curve model.
//!
//! Retention decays exponentially from the last review:
//! `R(t) = e^(-t / S)`, where `t` is elapsed hours and `S` is the card's
//! stability in hours, derived from its interval and ease factor.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{card::Card, scheduler::DEFAULT_EASE_FACTOR};

/// Default look-ahead for [`predict_retention`].
pub const DEFAULT_HOURS_FROM_NOW: f64 = 0.0;

/// Default span for [`retention_curve`].
pub const DEFAULT_CURVE_DAYS: f64 = 30.0;

/// Number of samples in a retention curve.
pub const CURVE_POINTS: usize = 51;

/// Stability in hours: `interval × 24 × (ease / 2.5)`, floored at 1.
pub fn stability_hours(card: &Card) -> f64 {
  (f64::from(card.interval) * 24.0 * (card.ease_factor / DEFAULT_EASE_FACTOR)).max(1.0)
}

fn retention_after(card: &Card, elapsed_hours: f64) -> f64 {
  (-elapsed_hours / stability_hours(card)).exp().clamp(0.0, 1.0)
}

/// Predicted probability of recall `hours_from_now` hours after `now`.
///
/// A card that has never been reviewed has retention exactly 1.0.
pub fn predict_retention(card: &Card, now: DateTime<Utc>, hours_from_now: f64) -> f64 {
  let Some(last) = card.last_review_date else {
    return 1.0;
  };

  let elapsed_hours = (now - last).num_milliseconds() as f64 / 3_600_000.0;
  let t = elapsed_hours + hours_from_now;
  if t.is_nan() {
    return 1.0;
  }
  retention_after(card, t)
}

/// One sample of a retention curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurvePoint {
  pub hours_from_review: f64,
  pub days_from_review:  f64,
  pub retention:         f64,
}

/// Evenly spaced retention samples over `[0, days]` measured from the last
/// review, or from `now` for a card that has never been reviewed.
///
/// The iterator owns its inputs, so it can be cloned and restarted freely.
#[derive(Debug, Clone)]
pub struct RetentionCurve {
  card:   Card,
  anchor: DateTime<Utc>,
  days:   f64,
  next:   usize,
}

impl Iterator for RetentionCurve {
  type Item = CurvePoint;

  fn next(&mut self) -> Option<CurvePoint> {
    if self.next >= CURVE_POINTS {
      return None;
    }
    let step = self.next as f64 / (CURVE_POINTS - 1) as f64;
    self.next += 1;

    let days_from_review = self.days * step;
    let hours_from_review = days_from_review * 24.0;
    let retention = predict_retention(&self.card, self.anchor, hours_from_review);

    Some(CurvePoint { hours_from_review, days_from_review, retention })
  }

  fn size_hint(&self) -> (usize, Option<usize>) {
    let left = CURVE_POINTS - self.next.min(CURVE_POINTS);
    (left, Some(left))
  }
}

impl ExactSizeIterator for RetentionCurve {}

pub fn retention_curve(card: &Card, now: DateTime<Utc>, days: f64) -> RetentionCurve {
  RetentionCurve {
    card:   card.clone(),
    anchor: card.last_review_date.unwrap_or(now),
    days:   if days.is_finite() { days.max(0.0) } else { DEFAULT_CURVE_DAYS },
    next:   0,
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone};

  use super::*;
  use crate::{
    card::{ItemMetadata, Quality},
    scheduler::apply_review,
  };

  fn t0() -> DateTime<Utc> { Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap() }

  fn reviewed(interval: u32, ease: f64) -> Card {
    let mut card = Card::new("c", ItemMetadata::default(), t0());
    card.interval = interval;
    card.ease_factor = ease;
    card.last_review_date = Some(t0());
    card
  }

  #[test]
  fn unreviewed_card_has_full_retention() {
    let card = Card::new("c", ItemMetadata::default(), t0());
    assert_eq!(predict_retention(&card, t0() + Duration::days(400), 0.0), 1.0);
    assert_eq!(predict_retention(&card, t0(), 10_000.0), 1.0);
  }

  #[test]
  fn retention_follows_exponential_decay() {
    // interval 1 at ease 2.5: stability is 24 hours.
    let card = reviewed(1, 2.5);
    let r = predict_retention(&card, t0() + Duration::hours(24), 0.0);
    assert!((r - (-1.0f64).exp()).abs() < 1e-12);

    let ahead = predict_retention(&card, t0(), 24.0);
    assert!((ahead - r).abs() < 1e-12);
  }

  #[test]
  fn stability_floor_avoids_blowup() {
    let card = reviewed(0, 1.3);
    assert_eq!(stability_hours(&card), 1.0);
    let r = predict_retention(&card, t0() + Duration::hours(2), 0.0);
    assert!((r - (-2.0f64).exp()).abs() < 1e-12);
  }

  #[test]
  fn retention_stays_in_unit_interval() {
    let card = reviewed(6, 2.5);
    for hours in [-1e6, -5.0, 0.0, 1.0, 1e3, 1e9, f64::INFINITY, f64::NAN] {
      let r = predict_retention(&card, t0(), hours);
      assert!((0.0..=1.0).contains(&r), "hours {hours} gave {r}");
    }
  }

  #[test]
  fn retention_right_after_review_is_one() {
    let card = apply_review(
      &Card::new("c", ItemMetadata::default(), t0()),
      Quality::new(4).unwrap(),
      t0(),
    );
    assert_eq!(predict_retention(&card, t0(), 0.0), 1.0);
  }

  #[test]
  fn curve_has_51_points_spanning_range() {
    let card = reviewed(6, 2.5);
    let points: Vec<CurvePoint> =
      retention_curve(&card, t0() + Duration::days(3), 30.0).collect();

    assert_eq!(points.len(), CURVE_POINTS);
    assert_eq!(points[0].days_from_review, 0.0);
    assert_eq!(points[0].retention, 1.0);
    assert!((points[50].days_from_review - 30.0).abs() < 1e-9);
    assert!((points[50].hours_from_review - 720.0).abs() < 1e-9);
    assert!(points.windows(2).all(|w| w[1].retention <= w[0].retention));
  }

  #[test]
  fn curve_is_restartable() {
    let card = reviewed(3, 2.0);
    let curve = retention_curve(&card, t0(), 10.0);
    assert_eq!(curve.len(), CURVE_POINTS);

    let first: Vec<_> = curve.clone().collect();
    let second: Vec<_> = curve.collect();
    assert_eq!(first, second);
  }
}
