//! Simulation clock
//!
//! Turns wall-clock timestamps into a bounded step. Large gaps (backgrounding,
//! debugger stalls) collapse to `FRAME_CAP` so one frame can never explode.

use crate::consts::FRAME_CAP;

#[derive(Debug, Clone, Copy, Default)]
pub struct SimClock {
    /// Timestamp of the previous tick (seconds)
    last: Option<f64>,
}

impl SimClock {
    pub fn new() -> Self {
        Self { last: None }
    }

    /// Record `now` and return the clamped step since the previous call.
    ///
    /// The first call after construction or `reset` returns 0.
    pub fn advance(&mut self, now: f64) -> f32 {
        let dt = match self.last {
            Some(last) => clamp_dt((now - last) as f32),
            None => 0.0,
        };
        if now.is_finite() {
            self.last = Some(now);
        }
        dt
    }

    pub fn reset(&mut self) {
        self.last = None;
    }

    pub fn last(&self) -> Option<f64> {
        self.last
    }
}

/// Clamp a raw step into `[0, FRAME_CAP]`; non-finite steps become 0
#[inline]
pub fn clamp_dt(raw: f32) -> f32 {
    if raw.is_finite() {
        raw.clamp(0.0, FRAME_CAP)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_tick_is_zero() {
        let mut clock = SimClock::new();
        assert_eq!(clock.advance(12.5), 0.0);
        assert!((clock.advance(12.5 + 1.0 / 60.0) - 1.0 / 60.0).abs() < 1e-5);
    }

    #[test]
    fn test_large_gap_is_capped() {
        let mut clock = SimClock::new();
        clock.advance(0.0);
        assert_eq!(clock.advance(30.0), FRAME_CAP);
    }

    #[test]
    fn test_backwards_time_is_zero() {
        let mut clock = SimClock::new();
        clock.advance(10.0);
        assert_eq!(clock.advance(9.0), 0.0);
    }

    #[test]
    fn test_reset_restarts() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        clock.reset();
        assert_eq!(clock.last(), None);
        assert_eq!(clock.advance(50.0), 0.0);
    }

    #[test]
    fn test_nan_timestamp_ignored() {
        let mut clock = SimClock::new();
        clock.advance(1.0);
        assert_eq!(clock.advance(f64::NAN), 0.0);
        assert_eq!(clock.last(), Some(1.0));
    }

    proptest! {
        #[test]
        fn prop_dt_always_clamped(gaps in proptest::collection::vec(-10.0f64..1000.0, 1..64)) {
            let mut clock = SimClock::new();
            let mut now = 0.0;
            clock.advance(now);
            for gap in gaps {
                now += gap;
                let dt = clock.advance(now);
                prop_assert!(dt >= 0.0);
                prop_assert!(dt <= FRAME_CAP);
            }
        }
    }
}
