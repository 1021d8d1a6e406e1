//! Panel state snapshots.

use crate::color_temp::ColorTemp;
use crate::geometry::{Geometry, GeometryField};
use crate::input::InputKey;
use crate::osd::MenuMode;

/// A snapshot of the panel's current state.
///
/// Use [`FrontPanel::state`](crate::FrontPanel::state) to obtain one.
#[derive(Debug, Clone, PartialEq)]
pub struct PanelState {
    /// Whether the set is powered.
    pub powered: bool,
    /// The lit source.
    pub active_source: Option<InputKey>,
    /// Whether LINE mode is on.
    pub line_mode: bool,
    /// Whether the menu is on screen.
    pub menu_visible: bool,
    /// Current menu mode.
    pub menu_mode: MenuMode,
    /// Cursor position in the current menu list.
    pub cursor: usize,
    /// Whether an edit session is active.
    pub editing: bool,
    /// Geometry of the active source.
    pub geometry: Geometry,
    /// Color temperature.
    pub color_temp: ColorTemp,
    /// Whether the degauss lamp is lit.
    pub degauss_light: bool,
    /// Whether the WRITE indicator is showing.
    pub write_armed: bool,
    /// Whether the commit star is showing.
    pub star_flash: bool,
}

/// The two-line readout shown in the geometry submenu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeometryReadout {
    /// Input label (`RGB`, `COMPONENT` or `SDI`).
    pub input_label: &'static str,
    /// Field under the cursor.
    pub field: GeometryField,
    /// Current value on the 0-255 scale.
    pub value: u8,
    /// The default's value on the 0-255 scale (session default or factory).
    pub default_value: u8,
    /// 1-based position of the field in the list.
    pub index: usize,
    /// Whether the commit star is showing.
    pub star: bool,
    /// Whether the WRITE indicator is showing.
    pub write: bool,
}

impl GeometryReadout {
    /// Whether the value sits on its default (the arrow marker).
    pub fn at_default(&self) -> bool {
        self.value == self.default_value
    }

    /// Parameter label.
    pub fn param_label(&self) -> &'static str {
        self.field.label()
    }
}
