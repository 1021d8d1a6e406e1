//! Degauss cooldown.
//!
//! A press lights the degauss lamp for a fixed window. The strength of the
//! effect depends on how long ago the previous press was; a second press
//! during the window aborts it.

use log::{debug, info};

use crate::config::PanelConfig;
use crate::timer::{Scheduler, TimerHandle, TimerTag};

/// Strength level chosen by time since the previous trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegaussTier {
    /// Too soon: the lamp lights but nothing else happens.
    Cooling,
    /// Partly recovered: half-strength effect.
    Half,
    /// Fully recovered, or never triggered.
    Full,
}

impl DegaussTier {
    /// Tier for `elapsed_ms` since the previous trigger (`None` if never).
    pub fn for_elapsed(elapsed_ms: Option<u64>, half_after_ms: u64, full_after_ms: u64) -> Self {
        match elapsed_ms {
            None => DegaussTier::Full,
            Some(elapsed) if elapsed < half_after_ms => DegaussTier::Cooling,
            Some(elapsed) if elapsed < full_after_ms => DegaussTier::Half,
            Some(_) => DegaussTier::Full,
        }
    }

    /// Effect strength factor.
    pub fn strength(self) -> f64 {
        match self {
            DegaussTier::Cooling => 0.0,
            DegaussTier::Half => 0.5,
            DegaussTier::Full => 1.0,
        }
    }
}

/// Result of a degauss button press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DegaussPress {
    /// A new window started at the given tier.
    Triggered(DegaussTier),
    /// The pending window was cancelled.
    Aborted,
}

/// Degauss lamp, window timer and cooldown bookkeeping.
#[derive(Debug)]
pub struct Degauss {
    last_triggered_ms: Option<u64>,
    window: Option<TimerHandle>,
    aborted: bool,
    light: bool,
    window_ms: u64,
    half_after_ms: u64,
    full_after_ms: u64,
}

impl Degauss {
    /// Create an idle, never-triggered degauss.
    pub fn new(config: &PanelConfig) -> Self {
        Self {
            last_triggered_ms: None,
            window: None,
            aborted: false,
            light: false,
            window_ms: config.degauss_window_ms,
            half_after_ms: config.degauss_half_after_ms,
            full_after_ms: config.degauss_full_after_ms,
        }
    }

    /// Whether the lamp is lit.
    pub fn light(&self) -> bool {
        self.light
    }

    /// Whether the last window was cut short.
    pub fn aborted(&self) -> bool {
        self.aborted
    }

    /// Time of the last trigger, if any.
    pub fn last_triggered_ms(&self) -> Option<u64> {
        self.last_triggered_ms
    }

    /// Tier a press at `now_ms` would get.
    pub fn tier_at(&self, now_ms: u64) -> DegaussTier {
        let elapsed = self
            .last_triggered_ms
            .map(|last| now_ms.saturating_sub(last));
        DegaussTier::for_elapsed(elapsed, self.half_after_ms, self.full_after_ms)
    }

    /// Handle a press of the degauss button.
    pub fn press<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) -> DegaussPress {
        if let Some(handle) = self.window.take() {
            scheduler.cancel(handle);
            self.light = false;
            self.aborted = true;
            debug!("degauss aborted");
            return DegaussPress::Aborted;
        }

        let now = scheduler.now_ms();
        let tier = self.tier_at(now);
        self.last_triggered_ms = Some(now);
        self.aborted = false;
        self.light = true;
        self.window = Some(scheduler.schedule_once(self.window_ms, TimerTag::DegaussWindow));
        info!("degauss triggered at {} ({:?})", now, tier);
        DegaussPress::Triggered(tier)
    }

    /// Handle a fired timer. Returns `true` when the window ended, which is
    /// when the relay clicks.
    pub fn on_timer(&mut self, handle: TimerHandle) -> bool {
        if self.window != Some(handle) {
            return false;
        }
        self.window = None;
        self.light = false;
        debug!("degauss window ended");
        true
    }

    /// Start a powered session: the coil counts as freshly degaussed.
    pub fn power_on(&mut self, now_ms: u64) {
        self.last_triggered_ms = Some(now_ms);
    }

    /// Cancel any window and darken the lamp.
    pub fn shut_down<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.window.take() {
            scheduler.cancel(handle);
        }
        self.light = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::VirtualScheduler;

    const SEC: u64 = 1000;
    const MIN: u64 = 60 * SEC;

    fn tier_after(elapsed_ms: u64) -> DegaussTier {
        let config = PanelConfig::default();
        let mut scheduler = VirtualScheduler::new();
        let mut degauss = Degauss::new(&config);
        degauss.power_on(0);
        scheduler.set_now(elapsed_ms);
        match degauss.press(&mut scheduler) {
            DegaussPress::Triggered(tier) => tier,
            DegaussPress::Aborted => panic!("unexpected abort"),
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(tier_after(4 * MIN + 59 * SEC), DegaussTier::Cooling);
        assert_eq!(tier_after(5 * MIN), DegaussTier::Half);
        assert_eq!(tier_after(9 * MIN + 59 * SEC), DegaussTier::Half);
        assert_eq!(tier_after(10 * MIN), DegaussTier::Full);
    }

    #[test]
    fn test_never_triggered_is_full_strength() {
        let degauss = Degauss::new(&PanelConfig::default());
        assert_eq!(degauss.tier_at(0), DegaussTier::Full);
        assert_eq!(DegaussTier::Full.strength(), 1.0);
        assert_eq!(DegaussTier::Half.strength(), 0.5);
    }

    #[test]
    fn test_window_ends_with_relay() {
        let mut scheduler = VirtualScheduler::new();
        let mut degauss = Degauss::new(&PanelConfig::default());
        degauss.press(&mut scheduler);
        assert!(degauss.light());

        assert!(scheduler.next_due(9_999).is_none());
        let (handle, _) = scheduler.next_due(10_000).unwrap();
        assert!(degauss.on_timer(handle));
        assert!(!degauss.light());
    }

    #[test]
    fn test_second_press_aborts_window() {
        let mut scheduler = VirtualScheduler::new();
        let mut degauss = Degauss::new(&PanelConfig::default());
        degauss.press(&mut scheduler);
        scheduler.set_now(3 * SEC);

        assert_eq!(degauss.press(&mut scheduler), DegaussPress::Aborted);
        assert!(!degauss.light());
        assert!(degauss.aborted());
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[test]
    fn test_cooling_press_still_resets_cooldown() {
        let mut scheduler = VirtualScheduler::new();
        let mut degauss = Degauss::new(&PanelConfig::default());
        degauss.power_on(0);

        scheduler.set_now(MIN);
        assert_eq!(degauss.press(&mut scheduler), DegaussPress::Triggered(DegaussTier::Cooling));
        let (handle, _) = scheduler.next_due(u64::MAX).unwrap();
        degauss.on_timer(handle);

        // 5 minutes after power-on but only 4 after the cooling press.
        scheduler.set_now(5 * MIN);
        assert_eq!(degauss.tier_at(scheduler.now_ms()), DegaussTier::Cooling);
        assert_eq!(degauss.last_triggered_ms(), Some(MIN));
    }
}
