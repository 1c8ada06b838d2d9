//! Monotonic millisecond clock sources.
//!
//! Every timestamp in the crate is a `u32` millisecond counter that wraps at
//! 2^32. Elapsed time is always computed with [`elapsed_ms`], which stays
//! correct across the wrap as long as no single interval exceeds half the
//! counter range (hold durations are tens of milliseconds against a ~49 day
//! wrap period).

use std::cell::Cell;
use std::time::Instant;

/// Boundary capability returning the current wrapping millisecond count.
pub trait MonotonicClock {
    fn now(&self) -> u32;
}

/// Milliseconds from `since` to `now`, modulo 2^32.
pub fn elapsed_ms(now: u32, since: u32) -> u32 {
    now.wrapping_sub(since)
}

/// Wall clock measured from process start.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        SystemClock {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl MonotonicClock for SystemClock {
    fn now(&self) -> u32 {
        // Truncation is the wrap.
        self.origin.elapsed().as_millis() as u32
    }
}

/// Clock driven by hand, for deterministic tests and replays.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: Cell<u32>,
}

impl ManualClock {
    pub fn new(start: u32) -> Self {
        ManualClock {
            now: Cell::new(start),
        }
    }

    pub fn set(&self, now: u32) {
        self.now.set(now);
    }

    /// Moves the clock forward, wrapping at 2^32.
    pub fn advance(&self, ms: u32) {
        self.now.set(self.now.get().wrapping_add(ms));
    }
}

impl MonotonicClock for ManualClock {
    fn now(&self) -> u32 {
        self.now.get()
    }
}

impl<C: MonotonicClock + ?Sized> MonotonicClock for &C {
    fn now(&self) -> u32 {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_elapsed_across_wrap() {
        assert_eq!(elapsed_ms(5, u32::MAX - 2), 8);
        assert_eq!(elapsed_ms(8, u32::MAX - 2), 11);
        assert_eq!(elapsed_ms(100, 40), 60);
    }

    #[test]
    fn test_manual_clock_wraps() {
        let clock = ManualClock::new(u32::MAX);
        clock.advance(2);
        assert_eq!(clock.now(), 1);
    }

    #[test]
    fn test_system_clock_is_monotonic() {
        let clock = SystemClock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(elapsed_ms(b, a) < 1_000);
    }
}
