//! Color temperature model.

use log::debug;
use crate::error::PanelError;

/// Lowest USER color temperature.
pub const KELVIN_MIN: f64 = 3500.0;
/// Highest USER color temperature.
pub const KELVIN_MAX: f64 = 10000.0;
/// Neutral color temperature; also the factory default for USER.
pub const FACTORY_KELVIN: f64 = 6500.0;

const PRESET_5600K: f64 = 5600.0;

/// Color temperature mode, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColorTempMode {
    /// D65 preset.
    #[default]
    K6500,
    /// Warmer preset.
    K5600,
    /// User-adjustable Kelvin.
    User,
}

impl ColorTempMode {
    /// All modes in menu order.
    pub const ALL: [ColorTempMode; 3] =
        [ColorTempMode::K6500, ColorTempMode::K5600, ColorTempMode::User];

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            ColorTempMode::K6500 => "6500K",
            ColorTempMode::K5600 => "5600K",
            ColorTempMode::User => "USER",
        }
    }

    /// Mode at a color-temp menu cursor position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }
}

/// Mode plus the Kelvin value it resolves to.
///
/// The Kelvin value is kept across mode switches so returning to USER
/// restores the last user setting.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorTemp {
    mode: ColorTempMode,
    kelvin: f64,
}

impl Default for ColorTemp {
    fn default() -> Self {
        Self {
            mode: ColorTempMode::K6500,
            kelvin: FACTORY_KELVIN,
        }
    }
}

impl ColorTemp {
    /// Start in USER mode at `kelvin`.
    ///
    /// # Errors
    /// Returns [`PanelError::KelvinOutOfRange`] outside 3500-10000.
    pub fn user(kelvin: f64) -> Result<Self, PanelError> {
        if !(KELVIN_MIN..=KELVIN_MAX).contains(&kelvin) {
            return Err(PanelError::KelvinOutOfRange(kelvin));
        }
        Ok(Self {
            mode: ColorTempMode::User,
            kelvin,
        })
    }

    /// Current mode.
    pub fn mode(&self) -> ColorTempMode {
        self.mode
    }

    /// Current Kelvin value.
    pub fn kelvin(&self) -> f64 {
        self.kelvin
    }

    /// Select a mode. Presets overwrite the Kelvin value; USER keeps it.
    pub fn set_mode(&mut self, mode: ColorTempMode) {
        self.mode = mode;
        match mode {
            ColorTempMode::K6500 => self.kelvin = FACTORY_KELVIN,
            ColorTempMode::K5600 => self.kelvin = PRESET_5600K,
            ColorTempMode::User => {}
        }
        debug!("color temp mode {} ({}K)", mode.label(), self.kelvin);
    }

    /// Switch to USER and move the Kelvin value by `delta_k`, clamped.
    pub fn nudge(&mut self, delta_k: f64) {
        self.mode = ColorTempMode::User;
        self.kelvin = (self.kelvin + delta_k).clamp(KELVIN_MIN, KELVIN_MAX);
    }

    /// Set the USER Kelvin value directly, clamped.
    pub fn set_kelvin(&mut self, kelvin: f64) {
        self.kelvin = kelvin.clamp(KELVIN_MIN, KELVIN_MAX);
    }

    /// Rounded Kelvin for display.
    pub fn display_value(&self) -> i32 {
        self.kelvin.round() as i32
    }

    /// Warm/cool bias in [-1, 1]; negative is warm, positive is cool.
    pub fn bias(&self) -> f64 {
        ((self.kelvin - FACTORY_KELVIN) / 3500.0).clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_overwrite_kelvin_user_keeps_it() {
        let mut ct = ColorTemp::default();
        ct.nudge(700.0);
        assert_eq!(ct.kelvin(), 7200.0);

        ct.set_mode(ColorTempMode::K5600);
        assert_eq!(ct.kelvin(), 5600.0);

        ct.set_kelvin(8000.0);
        ct.set_mode(ColorTempMode::User);
        assert_eq!(ct.kelvin(), 8000.0);
    }

    #[test]
    fn test_nudge_forces_user_and_clamps() {
        let mut ct = ColorTemp::default();
        for _ in 0..100 {
            ct.nudge(100.0);
        }
        assert_eq!(ct.mode(), ColorTempMode::User);
        assert_eq!(ct.display_value(), 10000);

        for _ in 0..100 {
            ct.nudge(-100.0);
        }
        assert_eq!(ct.display_value(), 3500);
    }

    #[test]
    fn test_bias_range() {
        let mut ct = ColorTemp::default();
        assert_eq!(ct.bias(), 0.0);
        ct.set_kelvin(KELVIN_MAX);
        assert_eq!(ct.bias(), 1.0);
        ct.set_kelvin(KELVIN_MIN);
        assert!((ct.bias() + 3000.0 / 3500.0).abs() < 1e-12);
    }

    #[test]
    fn test_user_constructor_validates() {
        assert!(ColorTemp::user(9300.0).is_ok());
        assert!(matches!(
            ColorTemp::user(2000.0),
            Err(PanelError::KelvinOutOfRange(_))
        ));
    }
}
