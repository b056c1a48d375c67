//! # Bus configuration.
//!
//! Provides [`BusConfig`], the centralized settings for an [`EventBus`](crate::EventBus).
//!
//! ## Sentinel values
//! - `max_background = 0` → unlimited background executions
//! - `execute_timeout = 0s` → no per-execution deadline
//! - `tick = 0s` → clamped to 1ms (the sweep must keep running)

use std::time::Duration;

use crate::policies::OverflowPolicy;

/// Global configuration for the event bus.
///
/// ## Field semantics
/// - `max_background`: background concurrency cap (`0` = unlimited)
/// - `tick`: idle wake-up interval; every tick sweeps the running set
/// - `execute_timeout`: deadline per background/inline execution (`0s` = none)
/// - `overflow`: what to do when the cap is reached
/// - `grace`: how long shutdown waits for running background work
/// - `notice_capacity`: notice feed ring buffer size (min 1)
///
/// ## Notes
/// All fields are public. Prefer the helper accessors over checking the `0`
/// sentinels directly.
#[derive(Clone, Debug)]
pub struct BusConfig {
    /// Maximum number of background executions in the running set.
    pub max_background: usize,

    /// Interval after which an idle dispatch loop wakes up and sweeps.
    pub tick: Duration,

    /// Deadline for a single execution.
    ///
    /// A background execution that exceeds it is cancelled and reaped with a
    /// timeout outcome; an inline one is cancelled and reported as failed.
    pub execute_timeout: Duration,

    /// Behavior when a background admission hits the cap.
    pub overflow: OverflowPolicy,

    /// Maximum wait for running background work on shutdown before aborting it.
    pub grace: Duration,

    /// Capacity of the notice feed broadcast channel.
    pub notice_capacity: usize,
}

impl BusConfig {
    /// Returns the background cap as an `Option` (`None` = unlimited).
    #[inline]
    pub fn background_limit(&self) -> Option<usize> {
        match self.max_background {
            0 => None,
            n => Some(n),
        }
    }

    /// Returns the per-execution deadline as an `Option` (`None` = no deadline).
    #[inline]
    pub fn execution_deadline(&self) -> Option<Duration> {
        if self.execute_timeout == Duration::ZERO {
            None
        } else {
            Some(self.execute_timeout)
        }
    }

    /// Returns the tick interval, clamped to at least 1ms.
    #[inline]
    pub fn tick_clamped(&self) -> Duration {
        self.tick.max(Duration::from_millis(1))
    }

    /// Returns the notice capacity clamped to a minimum of 1.
    #[inline]
    pub fn notice_capacity_clamped(&self) -> usize {
        self.notice_capacity.max(1)
    }
}

impl Default for BusConfig {
    /// Default configuration:
    ///
    /// - `max_background = 5`
    /// - `tick = 1s`
    /// - `execute_timeout = 0s` (no deadline)
    /// - `overflow = OverflowPolicy::Reject`
    /// - `grace = 30s`
    /// - `notice_capacity = 1024`
    fn default() -> Self {
        Self {
            max_background: 5,
            tick: Duration::from_secs(1),
            execute_timeout: Duration::ZERO,
            overflow: OverflowPolicy::default(),
            grace: Duration::from_secs(30),
            notice_capacity: 1024,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cfg = BusConfig::default();
        assert_eq!(cfg.background_limit(), Some(5));
        assert_eq!(cfg.tick_clamped(), Duration::from_secs(1));
        assert_eq!(cfg.execution_deadline(), None);
        assert_eq!(cfg.overflow, OverflowPolicy::Reject);
    }

    #[test]
    fn test_sentinels() {
        let cfg = BusConfig {
            max_background: 0,
            tick: Duration::ZERO,
            execute_timeout: Duration::from_millis(250),
            notice_capacity: 0,
            ..BusConfig::default()
        };
        assert_eq!(cfg.background_limit(), None);
        assert_eq!(cfg.tick_clamped(), Duration::from_millis(1));
        assert_eq!(cfg.execution_deadline(), Some(Duration::from_millis(250)));
        assert_eq!(cfg.notice_capacity_clamped(), 1);
    }
}
