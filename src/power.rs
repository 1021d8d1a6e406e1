//! Power-on sound selection.
//!
//! How long the set was off decides whether it starts warm or cold. The
//! power-off time lives in the key/value store so it survives the host
//! restarting.

use log::{debug, warn};

use crate::config::PanelConfig;
use crate::error::PanelError;
use crate::store::{KEY_FORCE_COLD_START, KEY_LAST_POWER_OFF, KeyValueStore};

/// Which power-on sound to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerSound {
    /// Short off period, or never powered off.
    Warm,
    /// Medium off period: cold start at reduced volume.
    ColdHalf,
    /// Long off period, or a forced cold start.
    ColdFull,
}

impl PowerSound {
    /// Tier for `off_ms` since the last power-off (`None` if unknown).
    pub fn for_off_time(off_ms: Option<u64>, config: &PanelConfig) -> Self {
        match off_ms {
            None => PowerSound::Warm,
            Some(off) if off < config.warm_start_within_ms => PowerSound::Warm,
            Some(off) if off < config.cold_full_after_ms => PowerSound::ColdHalf,
            Some(_) => PowerSound::ColdFull,
        }
    }

    /// Playback volume.
    pub fn volume(self) -> f64 {
        match self {
            PowerSound::Warm | PowerSound::ColdFull => 0.7,
            PowerSound::ColdHalf => 0.35,
        }
    }
}

/// Pick the sound for a power-on at `now_ms`, consuming a pending forced
/// cold start.
pub fn power_on_sound<K: KeyValueStore + ?Sized>(
    store: &mut K,
    now_ms: u64,
    config: &PanelConfig,
) -> Result<PowerSound, PanelError> {
    if store.get(KEY_FORCE_COLD_START)?.as_deref() == Some("true") {
        store.remove(KEY_FORCE_COLD_START)?;
        debug!("forced cold start");
        return Ok(PowerSound::ColdFull);
    }

    let last_off = match store.get(KEY_LAST_POWER_OFF)? {
        Some(raw) => match raw.parse::<u64>() {
            Ok(ms) if ms > 0 => Some(ms),
            Ok(_) => None,
            Err(_) => {
                warn!("ignoring unreadable {} value {:?}", KEY_LAST_POWER_OFF, raw);
                None
            }
        },
        None => None,
    };
    let sound = PowerSound::for_off_time(last_off.map(|off| now_ms.saturating_sub(off)), config);
    debug!("power-on after {:?}: {:?}", last_off.map(|off| now_ms.saturating_sub(off)), sound);
    Ok(sound)
}

/// Record a power-off at `now_ms`.
pub fn record_power_off<K: KeyValueStore + ?Sized>(store: &mut K, now_ms: u64) -> Result<(), PanelError> {
    store.set(KEY_LAST_POWER_OFF, &now_ms.to_string())
}

/// Make the next power-on a full cold start, e.g. after the host restarted
/// with the set switched off.
pub fn force_cold_start<K: KeyValueStore + ?Sized>(store: &mut K) -> Result<(), PanelError> {
    store.set(KEY_FORCE_COLD_START, "true")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    const MIN: u64 = 60 * 1000;

    #[test]
    fn test_sound_tiers() {
        let config = PanelConfig::default();
        let mut store = MemoryStore::new();
        assert_eq!(power_on_sound(&mut store, MIN, &config).unwrap(), PowerSound::Warm);

        record_power_off(&mut store, MIN).unwrap();
        let at = |store: &mut MemoryStore, off: u64| power_on_sound(store, MIN + off, &config).unwrap();
        assert_eq!(at(&mut store, 4 * MIN), PowerSound::Warm);
        assert_eq!(at(&mut store, 5 * MIN), PowerSound::ColdHalf);
        assert_eq!(at(&mut store, 10 * MIN), PowerSound::ColdFull);
    }

    #[test]
    fn test_forced_cold_start_is_consumed() {
        let config = PanelConfig::default();
        let mut store = MemoryStore::new();
        record_power_off(&mut store, MIN).unwrap();
        force_cold_start(&mut store).unwrap();

        assert_eq!(power_on_sound(&mut store, MIN + 1, &config).unwrap(), PowerSound::ColdFull);
        assert_eq!(power_on_sound(&mut store, MIN + 1, &config).unwrap(), PowerSound::Warm);
    }

    #[test]
    fn test_garbage_timestamp_counts_as_unknown() {
        let config = PanelConfig::default();
        let mut store = MemoryStore::new();
        store.set(KEY_LAST_POWER_OFF, "yesterday").unwrap();
        assert_eq!(power_on_sound(&mut store, 20 * MIN, &config).unwrap(), PowerSound::Warm);
        assert_eq!(PowerSound::ColdHalf.volume(), 0.35);
    }
}
