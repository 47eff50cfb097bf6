//! Frame driver and tick sources
//!
//! The platform's display-sync callback is abstracted as a `TickSource` so the
//! whole engine can run headless from a scripted list of frame gaps.

use std::collections::VecDeque;

use super::clock::SimClock;
use crate::consts::TARGET_HZ;

/// Anything that produces frame timestamps (seconds, monotonic)
pub trait TickSource {
    /// Timestamp of the next frame, or `None` when the source is exhausted
    fn next_timestamp(&mut self) -> Option<f64>;
}

/// Timestamps built from a synthetic sequence of frame gaps
#[derive(Debug, Clone, Default)]
pub struct ScriptedTicks {
    pending: VecDeque<f64>,
}

impl ScriptedTicks {
    /// First frame lands at `start`, then one frame per gap
    pub fn from_gaps(start: f64, gaps: impl IntoIterator<Item = f64>) -> Self {
        let mut pending = VecDeque::new();
        let mut now = start;
        pending.push_back(now);
        for gap in gaps {
            now += gap;
            pending.push_back(now);
        }
        Self { pending }
    }

    /// `frames` evenly spaced frames at the target refresh rate
    pub fn steady(frames: usize) -> Self {
        let gap = 1.0 / TARGET_HZ as f64;
        Self::from_gaps(0.0, std::iter::repeat_n(gap, frames.saturating_sub(1)))
    }

    /// Insert a stall of `gap` seconds before every remaining frame after `after`
    pub fn with_stall(mut self, after: usize, gap: f64) -> Self {
        for t in self.pending.iter_mut().skip(after) {
            *t += gap;
        }
        self
    }

    pub fn remaining(&self) -> usize {
        self.pending.len()
    }
}

impl TickSource for ScriptedTicks {
    fn next_timestamp(&mut self) -> Option<f64> {
        self.pending.pop_front()
    }
}

/// Converts frame timestamps into scaled simulation steps
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameDriver {
    clock: SimClock,
}

impl FrameDriver {
    pub fn new() -> Self {
        Self {
            clock: SimClock::new(),
        }
    }

    /// Clamped step for this frame times the speed multiplier (0..=1)
    pub fn frame_dt(&mut self, now: f64, speed: f32) -> f32 {
        let speed = if speed.is_finite() {
            speed.clamp(0.0, 1.0)
        } else {
            1.0
        };
        self.clock.advance(now) * speed
    }

    pub fn reset(&mut self) {
        self.clock.reset();
    }
}

/// Drain a tick source, calling `on_tick` once per frame.
///
/// Returns the number of frames delivered.
pub fn pump<S, F>(source: &mut S, mut on_tick: F) -> usize
where
    S: TickSource + ?Sized,
    F: FnMut(f64),
{
    let mut frames = 0;
    while let Some(now) = source.next_timestamp() {
        on_tick(now);
        frames += 1;
    }
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::FRAME_CAP;

    #[test]
    fn test_scripted_ticks_accumulate() {
        let mut ticks = ScriptedTicks::from_gaps(1.0, [0.5, 0.25]);
        assert_eq!(ticks.remaining(), 3);
        assert_eq!(ticks.next_timestamp(), Some(1.0));
        assert_eq!(ticks.next_timestamp(), Some(1.5));
        assert_eq!(ticks.next_timestamp(), Some(1.75));
        assert_eq!(ticks.next_timestamp(), None);
    }

    #[test]
    fn test_steady_frame_count() {
        let mut ticks = ScriptedTicks::steady(60);
        assert_eq!(pump(&mut ticks, |_| {}), 60);
    }

    #[test]
    fn test_driver_scales_and_clamps() {
        let mut driver = FrameDriver::new();
        assert_eq!(driver.frame_dt(0.0, 1.0), 0.0);
        let dt = driver.frame_dt(1.0 / 60.0, 0.5);
        assert!((dt - 0.5 / 60.0).abs() < 1e-6);

        // Stall is clamped before scaling
        let dt = driver.frame_dt(100.0, 1.0);
        assert_eq!(dt, FRAME_CAP);

        // Out-of-range speeds are clamped
        let dt = driver.frame_dt(100.0 + 1.0 / 60.0, 4.0);
        assert!(dt <= FRAME_CAP);
    }

    #[test]
    fn test_stall_is_clamped_through_driver() {
        let mut ticks = ScriptedTicks::steady(10).with_stall(5, 3.0);
        let mut driver = FrameDriver::new();
        let mut max_dt: f32 = 0.0;
        pump(&mut ticks, |now| {
            max_dt = max_dt.max(driver.frame_dt(now, 1.0));
        });
        assert_eq!(max_dt, FRAME_CAP);
    }
}
