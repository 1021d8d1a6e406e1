//! Timer scheduling.
//!
//! Components never sleep or spawn. They ask a [`Scheduler`] for a one-shot
//! timer, keep the returned handle, and cancel it before starting another of
//! the same kind. When a timer fires the host routes the handle back through
//! [`Command::TimerFired`](crate::Command::TimerFired); a handle that no longer
//! matches its owner's stored one is ignored.

use log::trace;

/// Identifies one scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    /// Wrap a scheduler-specific id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw id.
    pub const fn id(self) -> u64 {
        self.0
    }
}

/// What a timer is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerTag {
    /// Clears the write-ritual indicators.
    WriteFlash,
    /// Ends the degauss light window.
    DegaussWindow,
    /// Repeats a held direction.
    AutoRepeat,
}

/// One-shot timer source with a monotonic millisecond clock.
pub trait Scheduler {
    /// Current time in milliseconds.
    fn now_ms(&self) -> u64;

    /// Schedule a timer `delay_ms` from now.
    fn schedule_once(&mut self, delay_ms: u64, tag: TimerTag) -> TimerHandle;

    /// Cancel a pending timer. Unknown or already fired handles are ignored.
    fn cancel(&mut self, handle: TimerHandle);
}

#[derive(Debug, Clone, Copy)]
struct PendingTimer {
    handle: TimerHandle,
    tag: TimerTag,
    due_ms: u64,
}

/// Deterministic scheduler driven by explicit time advances.
///
/// ```
/// use pvm_panel_core::{Scheduler, TimerTag, VirtualScheduler};
///
/// let mut scheduler = VirtualScheduler::new();
/// let handle = scheduler.schedule_once(1000, TimerTag::WriteFlash);
/// assert!(scheduler.next_due(999).is_none());
/// assert_eq!(scheduler.next_due(1000), Some((handle, TimerTag::WriteFlash)));
/// assert_eq!(scheduler.now_ms(), 1000);
/// ```
#[derive(Debug, Default)]
pub struct VirtualScheduler {
    now_ms: u64,
    next_id: u64,
    pending: Vec<PendingTimer>,
}

impl VirtualScheduler {
    /// Create a scheduler at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a scheduler whose clock starts at `now_ms`.
    pub fn starting_at(now_ms: u64) -> Self {
        Self {
            now_ms,
            ..Self::default()
        }
    }

    /// Move the clock forward to `now_ms` without firing anything.
    ///
    /// The clock never moves backwards.
    pub fn set_now(&mut self, now_ms: u64) {
        self.now_ms = self.now_ms.max(now_ms);
    }

    /// Number of timers still pending.
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Whether `handle` is still pending.
    pub fn is_pending(&self, handle: TimerHandle) -> bool {
        self.pending.iter().any(|timer| timer.handle == handle)
    }

    /// Pop the earliest timer due at or before `until_ms`.
    ///
    /// The clock advances to that timer's deadline. Ties fire in scheduling
    /// order.
    pub fn next_due(&mut self, until_ms: u64) -> Option<(TimerHandle, TimerTag)> {
        let (index, _) = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, timer)| timer.due_ms <= until_ms)
            .min_by_key(|(_, timer)| (timer.due_ms, timer.handle))?;
        let timer = self.pending.remove(index);
        self.set_now(timer.due_ms);
        trace!("timer {:?} ({:?}) fired at {}", timer.handle, timer.tag, self.now_ms);
        Some((timer.handle, timer.tag))
    }
}

impl Scheduler for VirtualScheduler {
    fn now_ms(&self) -> u64 {
        self.now_ms
    }

    fn schedule_once(&mut self, delay_ms: u64, tag: TimerTag) -> TimerHandle {
        self.next_id += 1;
        let handle = TimerHandle::new(self.next_id);
        self.pending.push(PendingTimer {
            handle,
            tag,
            due_ms: self.now_ms.saturating_add(delay_ms),
        });
        trace!("timer {:?} ({:?}) due in {}ms", handle, tag, delay_ms);
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.pending.retain(|timer| timer.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timers_fire_in_deadline_order() {
        let mut scheduler = VirtualScheduler::new();
        let late = scheduler.schedule_once(500, TimerTag::AutoRepeat);
        let early = scheduler.schedule_once(35, TimerTag::AutoRepeat);

        assert_eq!(scheduler.next_due(1000).map(|(h, _)| h), Some(early));
        assert_eq!(scheduler.now_ms(), 35);
        assert_eq!(scheduler.next_due(1000).map(|(h, _)| h), Some(late));
        assert!(scheduler.next_due(1000).is_none());
    }

    #[test]
    fn test_cancelled_timer_never_fires() {
        let mut scheduler = VirtualScheduler::new();
        let handle = scheduler.schedule_once(10, TimerTag::DegaussWindow);
        scheduler.cancel(handle);
        assert!(!scheduler.is_pending(handle));
        assert!(scheduler.next_due(u64::MAX).is_none());
    }

    #[test]
    fn test_clock_is_monotonic() {
        let mut scheduler = VirtualScheduler::starting_at(100);
        scheduler.set_now(50);
        assert_eq!(scheduler.now_ms(), 100);
    }
}
