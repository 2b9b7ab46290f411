//! Retry and backoff configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Backoff configuration for retries
///
/// `max_attempts` counts every attempt including the first one. `None`
/// retries for as long as the process lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetryPolicy {
    /// Maximum attempts (None = unbounded)
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Delay before the first retry (milliseconds)
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Upper bound for any single delay (milliseconds)
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Growth factor applied after every retry
    #[serde(default = "default_multiplier")]
    pub multiplier: f64,
}

fn default_initial_delay_ms() -> u64 {
    500
}

fn default_max_delay_ms() -> u64 {
    30_000
}

fn default_multiplier() -> f64 {
    2.0
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl RetryPolicy {
    /// Retry forever with exponential backoff.
    pub fn unbounded() -> Self {
        Self {
            max_attempts: None,
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            multiplier: default_multiplier(),
        }
    }

    /// Give up after `max_attempts` attempts.
    pub fn bounded(max_attempts: u32) -> Self {
        Self {
            max_attempts: Some(max_attempts),
            ..Self::unbounded()
        }
    }

    /// No delay between attempts. Used by tests.
    pub fn immediate(max_attempts: Option<u32>) -> Self {
        Self {
            max_attempts,
            initial_delay_ms: 0,
            max_delay_ms: 0,
            multiplier: 1.0,
        }
    }

    pub fn backoff(&self) -> Backoff {
        Backoff {
            remaining: self.max_attempts.map(|n| n.max(1) - 1),
            next_delay_ms: self.initial_delay_ms as f64,
            max_delay_ms: self.max_delay_ms as f64,
            multiplier: self.multiplier.max(1.0),
        }
    }
}

/// Sequence of delays to wait before each retry
///
/// Yields one item per permitted retry and then ends.
#[derive(Debug, Clone)]
pub struct Backoff {
    remaining: Option<u32>,
    next_delay_ms: f64,
    max_delay_ms: f64,
    multiplier: f64,
}

impl Iterator for Backoff {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if let Some(remaining) = self.remaining.as_mut() {
            if *remaining == 0 {
                return None;
            }
            *remaining -= 1;
        }

        let delay = self.next_delay_ms.min(self.max_delay_ms);
        self.next_delay_ms = (self.next_delay_ms * self.multiplier).min(self.max_delay_ms);
        Some(Duration::from_millis(delay as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounded_yields_attempts_minus_one() {
        let delays: Vec<_> = RetryPolicy::bounded(4).backoff().collect();
        assert_eq!(delays.len(), 3);
    }

    #[test]
    fn test_single_attempt_never_retries() {
        assert_eq!(RetryPolicy::bounded(1).backoff().next(), None);
        assert_eq!(RetryPolicy::bounded(0).backoff().next(), None);
    }

    #[test]
    fn test_delays_grow_and_cap() {
        let policy = RetryPolicy {
            max_attempts: None,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            multiplier: 2.0,
        };
        let delays: Vec<u64> = policy
            .backoff()
            .take(5)
            .map(|d| d.as_millis() as u64)
            .collect();
        assert_eq!(delays, vec![100, 200, 350, 350, 350]);
    }

    #[test]
    fn test_unbounded_keeps_going() {
        assert_eq!(RetryPolicy::immediate(None).backoff().take(1000).count(), 1000);
    }

    #[test]
    fn test_policy_defaults_from_partial_toml_like_json() {
        let policy: RetryPolicy = serde_json::from_str(r#"{"max_attempts": 3}"#).unwrap();
        assert_eq!(policy.max_attempts, Some(3));
        assert_eq!(policy.initial_delay_ms, 500);
        assert_eq!(policy.max_delay_ms, 30_000);
    }
}
