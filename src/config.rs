//! Tunable timings and power-up defaults.

use serde::{Deserialize, Serialize};

use crate::geometry::GeometryScope;
use crate::input::InputKey;

const MINUTE_MS: u64 = 60 * 1000;

/// Panel configuration.
///
/// Every timing is in milliseconds. Missing keys fall back to
/// [`PanelConfig::default`] when deserialized.
///
/// ```
/// use pvm_panel_core::PanelConfig;
///
/// let config: PanelConfig = serde_json::from_str(r#"{ "repeat_interval_ms": 50 }"#).unwrap();
/// assert_eq!(config.repeat_interval_ms, 50);
/// assert_eq!(config.repeat_delay_ms, 500);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PanelConfig {
    /// Hold time before a held direction starts repeating.
    pub repeat_delay_ms: u64,
    /// Interval between repeats once repeating.
    pub repeat_interval_ms: u64,
    /// How long the commit star stays up after a session default is written.
    pub write_flash_ms: u64,
    /// How long the degauss light stays lit after a press.
    pub degauss_window_ms: u64,
    /// Elapsed time below which degauss has no effect.
    pub degauss_half_after_ms: u64,
    /// Elapsed time from which degauss runs at full strength.
    pub degauss_full_after_ms: u64,
    /// Off time below which power-on is a warm start.
    pub warm_start_within_ms: u64,
    /// Off time from which power-on is a full cold start.
    pub cold_full_after_ms: u64,
    /// Kelvin change per directional step while editing USER.
    pub kelvin_step: f64,
    /// Source lit at first power-up.
    pub initial_source: InputKey,
    /// Whether LINE mode starts enabled.
    pub initial_line_mode: bool,
    /// Whether geometry is shared across inputs or kept per input.
    pub geometry_scope: GeometryScope,
    /// Mirror committed session defaults into the key/value store.
    pub persist_session_defaults: bool,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            repeat_delay_ms: 500,
            repeat_interval_ms: 35,
            write_flash_ms: 1000,
            degauss_window_ms: 10_000,
            degauss_half_after_ms: 5 * MINUTE_MS,
            degauss_full_after_ms: 10 * MINUTE_MS,
            warm_start_within_ms: 5 * MINUTE_MS,
            cold_full_after_ms: 10 * MINUTE_MS,
            kelvin_step: 100.0,
            initial_source: InputKey::A,
            initial_line_mode: false,
            geometry_scope: GeometryScope::Shared,
            persist_session_defaults: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_front_panel_timings() {
        let config = PanelConfig::default();
        assert_eq!(config.repeat_delay_ms, 500);
        assert_eq!(config.repeat_interval_ms, 35);
        assert_eq!(config.degauss_half_after_ms, 300_000);
        assert_eq!(config.degauss_full_after_ms, 600_000);
        assert_eq!(config.initial_source, InputKey::A);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: PanelConfig =
            serde_json::from_str(r#"{ "initial_source": "b", "geometry_scope": "per_input" }"#)
                .unwrap();
        assert_eq!(config.initial_source, InputKey::B);
        assert_eq!(config.geometry_scope, GeometryScope::PerInput);
        assert_eq!(config.write_flash_ms, 1000);
    }
}
