//! Recording renderer for testing.

use crate::color_temp::ColorTemp;
use crate::controller::PanelRenderer;
use crate::geometry::Geometry;
use crate::input::InputKey;
use crate::power::PowerSound;
use crate::toggles::{PanelToggle, ShaderEffect};

/// One outward effect, as seen by a [`RecordingRenderer`].
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// The media prompt was requested.
    OpenMediaPrompt,
    /// A shader flag changed.
    Shader(ShaderEffect, bool),
    /// Geometry was applied for an input.
    Geometry(InputKey, Geometry),
    /// Color temperature was applied.
    ColorTemp(ColorTemp),
    /// Degauss wobble with its strength.
    Degauss(f64),
    /// Relay click at the end of a degauss window.
    RelayClick,
    /// Source-switch glitch.
    Glitch,
    /// The lit source or LINE mode changed.
    Source(Option<InputKey>, bool),
    /// A toggle light changed.
    Toggle(PanelToggle, bool),
    /// Previous (-1) or next (+1) channel.
    Channel(i32),
    /// Power-on sound.
    PowerSound(PowerSound),
    /// Power state changed.
    Power(bool),
    /// The menu was shown or hidden.
    MenuVisible(bool),
    /// The degauss lamp changed.
    DegaussLight(bool),
}

/// A renderer that records every effect.
///
/// This allows testing the panel without a display or audio.
///
/// # Example
///
/// ```
/// use pvm_panel_core::{Command, Effect, FrontPanel, PanelConfig, RecordingRenderer, VirtualScheduler};
///
/// let mut panel = FrontPanel::new(PanelConfig::default(), RecordingRenderer::new(), VirtualScheduler::new());
/// panel.dispatch(Command::PowerOn).unwrap();
/// panel.dispatch(Command::Menu).unwrap();
/// assert!(panel.renderer().contains(&Effect::MenuVisible(true)));
/// ```
#[derive(Debug, Clone, Default)]
pub struct RecordingRenderer {
    effects: Vec<Effect>,
}

impl RecordingRenderer {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, oldest first.
    pub fn effects(&self) -> &[Effect] {
        &self.effects
    }

    /// Whether `effect` was recorded.
    pub fn contains(&self, effect: &Effect) -> bool {
        self.effects.contains(effect)
    }

    /// Drain the recorded effects.
    pub fn take(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.effects)
    }
}

impl PanelRenderer for RecordingRenderer {
    fn open_media_prompt(&mut self) {
        self.effects.push(Effect::OpenMediaPrompt);
    }

    fn shader_changed(&mut self, effect: ShaderEffect, on: bool) {
        self.effects.push(Effect::Shader(effect, on));
    }

    fn apply_geometry(&mut self, input: InputKey, geometry: &Geometry) {
        self.effects.push(Effect::Geometry(input, *geometry));
    }

    fn apply_color_temp(&mut self, color_temp: &ColorTemp) {
        self.effects.push(Effect::ColorTemp(*color_temp));
    }

    fn degauss(&mut self, strength: f64) {
        self.effects.push(Effect::Degauss(strength));
    }

    fn relay_click(&mut self) {
        self.effects.push(Effect::RelayClick);
    }

    fn glitch(&mut self) {
        self.effects.push(Effect::Glitch);
    }

    fn source_changed(&mut self, active: Option<InputKey>, line: bool) {
        self.effects.push(Effect::Source(active, line));
    }

    fn toggle_changed(&mut self, toggle: PanelToggle, on: bool) {
        self.effects.push(Effect::Toggle(toggle, on));
    }

    fn change_channel(&mut self, delta: i32) {
        self.effects.push(Effect::Channel(delta));
    }

    fn power_sound(&mut self, sound: PowerSound) {
        self.effects.push(Effect::PowerSound(sound));
    }

    fn power_changed(&mut self, on: bool) {
        self.effects.push(Effect::Power(on));
    }

    fn menu_visibility(&mut self, visible: bool) {
        self.effects.push(Effect::MenuVisible(visible));
    }

    fn degauss_light(&mut self, on: bool) {
        self.effects.push(Effect::DegaussLight(on));
    }
}
