//! Time sources.
//!
//! Everything in this crate that needs "now" reads it from a [`Clock`], so
//! tests can pin or advance time without touching the wall clock.

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, Utc};

pub trait Clock: Send + Sync {
  fn now(&self) -> DateTime<Utc>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
  fn now(&self) -> DateTime<Utc> { Utc::now() }
}

/// A clock that only moves when told to. Millisecond resolution.
#[derive(Debug)]
pub struct ManualClock {
  millis: AtomicI64,
}

impl ManualClock {
  pub fn new(start: DateTime<Utc>) -> Self {
    Self { millis: AtomicI64::new(start.timestamp_millis()) }
  }

  pub fn set(&self, to: DateTime<Utc>) {
    self.millis.store(to.timestamp_millis(), Ordering::SeqCst);
  }

  pub fn advance(&self, by: Duration) {
    self.millis.fetch_add(by.num_milliseconds(), Ordering::SeqCst);
  }
}

impl Clock for ManualClock {
  fn now(&self) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(self.millis.load(Ordering::SeqCst))
      .unwrap_or_default()
  }
}

impl<C: Clock + ?Sized> Clock for std::sync::Arc<C> {
  fn now(&self) -> DateTime<Utc> { (**self).now() }
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  #[test]
  fn manual_clock_moves_only_when_told() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let clock = ManualClock::new(start);
    assert_eq!(clock.now(), start);

    clock.advance(Duration::hours(36));
    assert_eq!(clock.now(), start + Duration::hours(36));

    clock.set(start);
    assert_eq!(clock.now(), start);
  }
}
