//! Hold-to-repeat for the directional keys.
//!
//! Only the initial press edge and the owned timer produce steps; repeats
//! generated by the host OS are dropped.

use log::trace;

use crate::osd::Direction;
use crate::timer::{Scheduler, TimerHandle, TimerTag};

const MIN_PERIOD_MS: u64 = 1;

/// Auto-repeat for one held direction.
#[derive(Debug, Default)]
pub struct AutoRepeat {
    held: Option<Direction>,
    timer: Option<TimerHandle>,
}

impl AutoRepeat {
    /// Create an idle repeater.
    pub fn new() -> Self {
        Self::default()
    }

    /// Direction currently repeating, if any.
    pub fn held(&self) -> Option<Direction> {
        self.held
    }

    /// Start repeating `dir` after `delay_ms`. Any previous repeat is dropped.
    ///
    /// Delays below 1ms are raised to 1ms.
    pub fn start<S: Scheduler + ?Sized>(&mut self, dir: Direction, scheduler: &mut S, delay_ms: u64) {
        self.stop(scheduler);
        self.held = Some(dir);
        self.timer = Some(scheduler.schedule_once(delay_ms.max(MIN_PERIOD_MS), TimerTag::AutoRepeat));
        trace!("repeat armed for {:?}", dir);
    }

    /// Handle a fired timer.
    ///
    /// Returns the direction to step when the timer is ours, after scheduling
    /// the next repeat `interval_ms` out (at least 1ms).
    pub fn on_timer<S: Scheduler + ?Sized>(
        &mut self,
        handle: TimerHandle,
        scheduler: &mut S,
        interval_ms: u64,
    ) -> Option<Direction> {
        if self.timer != Some(handle) {
            return None;
        }
        let dir = self.held?;
        self.timer = Some(scheduler.schedule_once(interval_ms.max(MIN_PERIOD_MS), TimerTag::AutoRepeat));
        Some(dir)
    }

    /// Stop if `dir` is the held direction.
    pub fn release<S: Scheduler + ?Sized>(&mut self, dir: Direction, scheduler: &mut S) {
        if self.held == Some(dir) {
            self.stop(scheduler);
        }
    }

    /// Stop unconditionally.
    pub fn stop<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.timer.take() {
            scheduler.cancel(handle);
            trace!("repeat stopped");
        }
        self.held = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::VirtualScheduler;

    #[test]
    fn test_delay_then_interval() {
        let mut scheduler = VirtualScheduler::new();
        let mut repeat = AutoRepeat::new();
        repeat.start(Direction::Up, &mut scheduler, 500);

        assert!(scheduler.next_due(499).is_none());
        let mut fired = Vec::new();
        while let Some((handle, _)) = scheduler.next_due(570) {
            fired.push((scheduler.now_ms(), repeat.on_timer(handle, &mut scheduler, 35)));
        }
        assert_eq!(
            fired,
            [(500, Some(Direction::Up)), (535, Some(Direction::Up)), (570, Some(Direction::Up))]
        );
    }

    #[test]
    fn test_release_of_other_direction_is_ignored() {
        let mut scheduler = VirtualScheduler::new();
        let mut repeat = AutoRepeat::new();
        repeat.start(Direction::Down, &mut scheduler, 500);

        repeat.release(Direction::Up, &mut scheduler);
        assert_eq!(repeat.held(), Some(Direction::Down));

        repeat.release(Direction::Down, &mut scheduler);
        assert_eq!(repeat.held(), None);
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_zero_timings_still_advance_the_clock() {
        let mut scheduler = VirtualScheduler::new();
        let mut repeat = AutoRepeat::new();
        repeat.start(Direction::Up, &mut scheduler, 0);

        let mut steps = 0;
        while let Some((handle, _)) = scheduler.next_due(10) {
            assert!(repeat.on_timer(handle, &mut scheduler, 0).is_some());
            steps += 1;
        }
        assert_eq!(steps, 10);
        assert_eq!(scheduler.now_ms(), 10);
    }

    #[test]
    fn test_stale_handle_does_not_step() {
        let mut scheduler = VirtualScheduler::new();
        let mut repeat = AutoRepeat::new();
        repeat.start(Direction::Up, &mut scheduler, 500);
        let first = TimerHandle::new(1);
        repeat.start(Direction::Down, &mut scheduler, 500);

        assert_eq!(repeat.on_timer(first, &mut scheduler, 35), None);
        assert_eq!(scheduler.pending_count(), 1);
    }
}
