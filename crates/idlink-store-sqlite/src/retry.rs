//! Backoff policy for replaying a request after lock contention.

use std::time::Duration;

use serde::Deserialize;

/// Exponential backoff: `base_delay_ms * 2^(attempt - 1)`, capped at
/// `max_delay_ms`, for at most `max_attempts` tries in total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
  pub max_attempts:  u32,
  pub base_delay_ms: u64,
  pub max_delay_ms:  u64,
}

impl Default for RetryPolicy {
  fn default() -> Self {
    Self { max_attempts: 8, base_delay_ms: 10, max_delay_ms: 1_000 }
  }
}

impl RetryPolicy {
  /// Delay before retry number `attempt` (1-based: the delay after the
  /// first failure is `delay(1)`).
  pub fn delay(&self, attempt: u32) -> Duration {
    let shift = attempt.saturating_sub(1).min(32);
    let ms = self
      .base_delay_ms
      .saturating_mul(1u64 << shift)
      .min(self.max_delay_ms);
    Duration::from_millis(ms)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn delay_doubles_then_caps() {
    let p = RetryPolicy { max_attempts: 10, base_delay_ms: 10, max_delay_ms: 50 };
    let got: Vec<u64> = (1..=5).map(|a| p.delay(a).as_millis() as u64).collect();
    assert_eq!(got, vec![10, 20, 40, 50, 50]);
  }

  #[test]
  fn huge_attempt_numbers_do_not_overflow() {
    let p = RetryPolicy::default();
    assert_eq!(p.delay(u32::MAX), Duration::from_millis(p.max_delay_ms));
  }
}
