//! Coarse scheduled callbacks (auto-cycle, session limit, parental auto-lock)
//!
//! Timers are polled from the frame loop rather than firing on their own, so
//! cancelling one simply invalidates it before its next poll. Every timer is
//! started explicitly and its owner cancels all of them on teardown.

/// Shortest interval a repeating timer may have (seconds)
pub const MIN_INTERVAL: f64 = 1e-3;

/// What a timer is for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Rotate to the next scene
    AutoCycle,
    /// Enter wind-down before the session ends
    WindDown,
    /// Session time is up
    SessionLimit,
    /// Relock the parental menu
    ParentalAutoLock,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug, Clone)]
struct TimerEntry {
    id: TimerId,
    kind: TimerKind,
    /// Next fire time (seconds, same clock as `poll`)
    due: f64,
    /// Re-arm interval for repeating timers
    interval: Option<f64>,
}

/// Set of pending timers
#[derive(Debug, Clone, Default)]
pub struct Timers {
    entries: Vec<TimerEntry>,
    next_id: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fire once, `delay` seconds after `now`
    pub fn start_once(&mut self, kind: TimerKind, now: f64, delay: f64) -> TimerId {
        self.insert(kind, now + delay.max(0.0), None)
    }

    /// Fire every `interval` seconds starting `interval` after `now`.
    /// Intervals below `MIN_INTERVAL` (or NaN) are raised to it.
    pub fn start_repeating(&mut self, kind: TimerKind, now: f64, interval: f64) -> TimerId {
        let interval = interval.max(MIN_INTERVAL);
        self.insert(kind, now + interval, Some(interval))
    }

    fn insert(&mut self, kind: TimerKind, due: f64, interval: Option<f64>) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(TimerEntry {
            id,
            kind,
            due,
            interval,
        });
        log::debug!("Timer {:?} ({:?}) due at {:.2}", id, kind, due);
        id
    }

    /// Cancel one timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        before != self.entries.len()
    }

    /// Cancel every timer of `kind`. Returns how many were cancelled.
    pub fn cancel_kind(&mut self, kind: TimerKind) -> usize {
        let before = self.entries.len();
        self.entries.retain(|e| e.kind != kind);
        before - self.entries.len()
    }

    /// Cancel everything (teardown)
    pub fn cancel_all(&mut self) -> usize {
        let n = self.entries.len();
        self.entries.clear();
        n
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.entries.iter().any(|e| e.kind == kind)
    }

    /// Seconds until the next fire of `kind`
    pub fn remaining(&self, kind: TimerKind, now: f64) -> Option<f64> {
        self.entries
            .iter()
            .filter(|e| e.kind == kind)
            .map(|e| (e.due - now).max(0.0))
            .min_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fire everything due at `now`, in due order.
    ///
    /// One-shot timers are removed; repeating timers fire at most once per
    /// poll and re-arm from their previous due time, skipping missed beats.
    pub fn poll(&mut self, now: f64) -> Vec<TimerKind> {
        let mut due: Vec<(f64, TimerId, TimerKind)> = self
            .entries
            .iter()
            .filter(|e| e.due <= now)
            .map(|e| (e.due, e.id, e.kind))
            .collect();
        if due.is_empty() {
            return Vec::new();
        }
        due.sort_by(|a, b| {
            a.0.partial_cmp(&b.0)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        self.entries.retain_mut(|e| {
            if e.due > now {
                return true;
            }
            match e.interval {
                Some(interval) => {
                    let beats = ((now - e.due) / interval).floor() + 1.0;
                    e.due += beats * interval;
                    if e.due <= now {
                        e.due = now + interval;
                    }
                    true
                }
                None => false,
            }
        });

        due.into_iter().map(|(_, _, kind)| kind).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_once_fires_once() {
        let mut timers = Timers::new();
        timers.start_once(TimerKind::SessionLimit, 0.0, 10.0);
        assert!(timers.poll(9.9).is_empty());
        assert_eq!(timers.poll(10.0), vec![TimerKind::SessionLimit]);
        assert!(timers.poll(20.0).is_empty());
        assert!(timers.is_empty());
    }

    #[test]
    fn test_repeating_rearms_and_skips_missed() {
        let mut timers = Timers::new();
        timers.start_repeating(TimerKind::AutoCycle, 0.0, 5.0);
        assert_eq!(timers.poll(5.0), vec![TimerKind::AutoCycle]);
        // Long stall: fires once, next due on the beat after now
        assert_eq!(timers.poll(23.0), vec![TimerKind::AutoCycle]);
        assert_eq!(timers.remaining(TimerKind::AutoCycle, 23.0), Some(2.0));
    }

    #[test]
    fn test_zero_interval_is_floored() {
        let mut timers = Timers::new();
        timers.start_repeating(TimerKind::AutoCycle, 5.0, 0.0);
        assert!(timers.poll(5.0).is_empty());
        assert_eq!(timers.poll(5.5), vec![TimerKind::AutoCycle]);
        let next = timers.remaining(TimerKind::AutoCycle, 5.5).unwrap();
        assert!(next > 0.0 && next <= MIN_INTERVAL * 1.5);
    }

    #[test]
    fn test_tiny_interval_late_poll_returns() {
        let mut timers = Timers::new();
        timers.start_repeating(TimerKind::AutoCycle, 1000.0, 1e-12);
        assert_eq!(timers.poll(1_000_000.0), vec![TimerKind::AutoCycle]);
        assert!(timers.remaining(TimerKind::AutoCycle, 1_000_000.0).unwrap() > 0.0);
        assert_eq!(timers.poll(f64::MAX), vec![TimerKind::AutoCycle]);
    }

    #[test]
    fn test_cancel_invalidates_before_fire() {
        let mut timers = Timers::new();
        let id = timers.start_once(TimerKind::ParentalAutoLock, 0.0, 1.0);
        assert!(timers.cancel(id));
        assert!(!timers.cancel(id));
        assert!(timers.poll(5.0).is_empty());
    }

    #[test]
    fn test_due_order() {
        let mut timers = Timers::new();
        timers.start_once(TimerKind::SessionLimit, 0.0, 3.0);
        timers.start_once(TimerKind::WindDown, 0.0, 2.0);
        timers.start_repeating(TimerKind::AutoCycle, 0.0, 1.0);
        assert_eq!(
            timers.poll(3.0),
            vec![TimerKind::AutoCycle, TimerKind::WindDown, TimerKind::SessionLimit]
        );
    }

    #[test]
    fn test_cancel_all_and_kind() {
        let mut timers = Timers::new();
        timers.start_repeating(TimerKind::AutoCycle, 0.0, 1.0);
        timers.start_once(TimerKind::AutoCycle, 0.0, 1.0);
        timers.start_once(TimerKind::SessionLimit, 0.0, 1.0);
        assert_eq!(timers.cancel_kind(TimerKind::AutoCycle), 2);
        assert!(timers.is_active(TimerKind::SessionLimit));
        assert_eq!(timers.cancel_all(), 1);
        assert!(timers.poll(100.0).is_empty());
    }
}
