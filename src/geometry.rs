//! Picture geometry: stretch, rotation and shift.
//!
//! Each field maps onto a 0-255 display scale. Directional nudges move the
//! display value by exactly one unit, so holding a direction for N repeats
//! changes the readout by N.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::defaults::{FieldId, SessionDefaults};
use crate::error::PanelError;
use crate::input::InputKey;

/// Stretch lower bound (and display 0).
pub const STRETCH_MIN: f64 = 0.5;
/// Stretch upper bound.
pub const STRETCH_MAX: f64 = 1.5;

const DISPLAY_MAX: f64 = 255.0;

// =============================================================================
// Fields
// =============================================================================

/// One of the five editable geometry parameters, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum GeometryField {
    /// Horizontal stretch factor.
    HStretch,
    /// Vertical stretch factor.
    VStretch,
    /// Rotation in degrees.
    Rotate,
    /// Horizontal shift in pixels.
    ShiftH,
    /// Vertical shift in pixels.
    ShiftV,
}

impl GeometryField {
    /// All fields in menu order.
    pub const ALL: [GeometryField; 5] = [
        GeometryField::HStretch,
        GeometryField::VStretch,
        GeometryField::Rotate,
        GeometryField::ShiftH,
        GeometryField::ShiftV,
    ];

    /// Field at a geometry menu cursor position.
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Position in the geometry menu.
    pub fn index(self) -> usize {
        match self {
            GeometryField::HStretch => 0,
            GeometryField::VStretch => 1,
            GeometryField::Rotate => 2,
            GeometryField::ShiftH => 3,
            GeometryField::ShiftV => 4,
        }
    }

    /// Menu label.
    pub fn label(self) -> &'static str {
        match self {
            GeometryField::HStretch => "H STRETCH",
            GeometryField::VStretch => "V STRETCH",
            GeometryField::Rotate => "ROTATE",
            GeometryField::ShiftH => "SHIFT HORIZ",
            GeometryField::ShiftV => "SHIFT VERTICAL",
        }
    }

    /// Short identifier used in persisted state.
    pub fn id(self) -> &'static str {
        match self {
            GeometryField::HStretch => "sx",
            GeometryField::VStretch => "sy",
            GeometryField::Rotate => "rotDeg",
            GeometryField::ShiftH => "dx",
            GeometryField::ShiftV => "dy",
        }
    }

    /// Value the field has when no session default exists.
    pub fn factory_value(self) -> f64 {
        match self {
            GeometryField::HStretch | GeometryField::VStretch => 1.0,
            GeometryField::Rotate | GeometryField::ShiftH | GeometryField::ShiftV => 0.0,
        }
    }

    /// Bring a raw value into the field's domain.
    ///
    /// Stretch clamps, rotation wraps into (-180, 180], shift is unbounded.
    pub fn clamp(self, raw: f64) -> f64 {
        match self {
            GeometryField::HStretch | GeometryField::VStretch => {
                raw.clamp(STRETCH_MIN, STRETCH_MAX)
            }
            GeometryField::Rotate => normalize_degrees(raw),
            GeometryField::ShiftH | GeometryField::ShiftV => raw,
        }
    }

    /// Quantize a raw value onto the 0-255 display scale.
    pub fn to_display(self, raw: f64) -> u8 {
        self.display_unclamped(raw).clamp(0, 255) as u8
    }

    /// Raw value that quantizes to `display`.
    pub fn from_display(self, display: u8) -> f64 {
        self.raw_for_display(i64::from(display))
    }

    /// Raw value one display unit away from `raw` (`delta` is +1 or -1).
    pub fn step(self, raw: f64, delta: i32) -> f64 {
        let target = self.display_unclamped(raw) + i64::from(delta.signum());
        self.clamp(self.raw_for_display(target))
    }

    /// Human-readable value: percent, degrees or pixels.
    pub fn format_value(self, raw: f64) -> String {
        match self {
            GeometryField::HStretch | GeometryField::VStretch => {
                format!("{}%", (raw * 100.0).round() as i64)
            }
            GeometryField::Rotate => format!("{}°", raw.round() as i64),
            GeometryField::ShiftH | GeometryField::ShiftV => format!("{}px", raw.round() as i64),
        }
    }

    fn display_unclamped(self, raw: f64) -> i64 {
        let scaled = match self {
            GeometryField::HStretch | GeometryField::VStretch => {
                (raw - STRETCH_MIN) / (STRETCH_MAX - STRETCH_MIN) * DISPLAY_MAX
            }
            GeometryField::Rotate => {
                // Closed range so that -180 keeps display 0.
                (wrap_degrees(raw, true) + 180.0) / 360.0 * DISPLAY_MAX
            }
            GeometryField::ShiftH | GeometryField::ShiftV => (raw + 128.0) / 256.0 * DISPLAY_MAX,
        };
        scaled.round() as i64
    }

    fn raw_for_display(self, display: i64) -> f64 {
        let d = display as f64;
        match self {
            GeometryField::HStretch | GeometryField::VStretch => {
                STRETCH_MIN + d / DISPLAY_MAX * (STRETCH_MAX - STRETCH_MIN)
            }
            GeometryField::Rotate => d * 360.0 / DISPLAY_MAX - 180.0,
            GeometryField::ShiftH | GeometryField::ShiftV => d * 256.0 / DISPLAY_MAX - 128.0,
        }
    }
}

impl fmt::Display for GeometryField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for GeometryField {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GeometryField::ALL
            .into_iter()
            .find(|field| field.id() == s)
            .ok_or_else(|| PanelError::UnknownField(s.to_string()))
    }
}

/// Wrap an angle into (-180, 180].
pub fn normalize_degrees(deg: f64) -> f64 {
    wrap_degrees(deg, false)
}

/// Wrap into (-180, 180], or [-180, 180] when `closed`.
fn wrap_degrees(deg: f64, closed: bool) -> f64 {
    let wrapped = deg % 360.0;
    if wrapped > 180.0 {
        wrapped - 360.0
    } else if wrapped < -180.0 || (!closed && wrapped == -180.0) {
        wrapped + 360.0
    } else {
        wrapped
    }
}

// =============================================================================
// Geometry values
// =============================================================================

/// The five geometry values applied to one input's picture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geometry {
    /// Horizontal stretch, 0.5-1.5.
    pub sx: f64,
    /// Vertical stretch, 0.5-1.5.
    pub sy: f64,
    /// Rotation in degrees, (-180, 180].
    pub rot_deg: f64,
    /// Horizontal shift in pixels.
    pub dx: f64,
    /// Vertical shift in pixels.
    pub dy: f64,
}

impl Default for Geometry {
    fn default() -> Self {
        Self {
            sx: GeometryField::HStretch.factory_value(),
            sy: GeometryField::VStretch.factory_value(),
            rot_deg: GeometryField::Rotate.factory_value(),
            dx: GeometryField::ShiftH.factory_value(),
            dy: GeometryField::ShiftV.factory_value(),
        }
    }
}

impl Geometry {
    /// Raw value of `field`.
    pub fn get(&self, field: GeometryField) -> f64 {
        match field {
            GeometryField::HStretch => self.sx,
            GeometryField::VStretch => self.sy,
            GeometryField::Rotate => self.rot_deg,
            GeometryField::ShiftH => self.dx,
            GeometryField::ShiftV => self.dy,
        }
    }

    /// Set `field`, clamping or wrapping into its domain.
    pub fn set(&mut self, field: GeometryField, raw: f64) {
        let value = field.clamp(raw);
        match field {
            GeometryField::HStretch => self.sx = value,
            GeometryField::VStretch => self.sy = value,
            GeometryField::Rotate => self.rot_deg = value,
            GeometryField::ShiftH => self.dx = value,
            GeometryField::ShiftV => self.dy = value,
        }
    }

    /// Display value (0-255) of `field`.
    pub fn display(&self, field: GeometryField) -> u8 {
        field.to_display(self.get(field))
    }

    /// Set `field` from a display value.
    ///
    /// # Errors
    /// Returns [`PanelError::InvalidDisplayValue`] if `value` is not in 0-255.
    pub fn set_display(&mut self, field: GeometryField, value: i32) -> Result<(), PanelError> {
        let display =
            u8::try_from(value).map_err(|_| PanelError::InvalidDisplayValue { field, value })?;
        self.set(field, field.from_display(display));
        Ok(())
    }

    /// Move `field` one display unit up (`delta > 0`) or down.
    pub fn nudge(&mut self, field: GeometryField, delta: i32) {
        let next = field.step(self.get(field), delta);
        self.set(field, next);
    }
}

// =============================================================================
// Per-input storage
// =============================================================================

/// Whether inputs share one geometry or each keep their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeometryScope {
    /// All inputs read and write the same values.
    #[default]
    Shared,
    /// Each input has its own values.
    PerInput,
}

/// Geometry for every input, aliased according to [`GeometryScope`].
#[derive(Debug, Clone)]
pub struct GeometryStore {
    scope: GeometryScope,
    slots: [Geometry; 3],
}

impl GeometryStore {
    /// Create a store with factory values everywhere.
    pub fn new(scope: GeometryScope) -> Self {
        Self {
            scope,
            slots: [Geometry::default(); 3],
        }
    }

    /// Current scope.
    pub fn scope(&self) -> GeometryScope {
        self.scope
    }

    /// Geometry used by `input`.
    pub fn get(&self, input: InputKey) -> &Geometry {
        &self.slots[self.slot(input)]
    }

    /// Mutable geometry used by `input`.
    pub fn get_mut(&mut self, input: InputKey) -> &mut Geometry {
        let slot = self.slot(input);
        &mut self.slots[slot]
    }

    /// Reset `field` of `input` to its session default, or the factory value.
    pub fn apply_default(
        &mut self,
        input: InputKey,
        field: GeometryField,
        defaults: &SessionDefaults,
    ) {
        let value = defaults.value_or_factory(input, FieldId::Geometry(field));
        self.get_mut(input).set(field, value);
    }

    /// Reset every field of `input` to its default.
    pub fn apply_all_defaults(&mut self, input: InputKey, defaults: &SessionDefaults) {
        for field in GeometryField::ALL {
            self.apply_default(input, field, defaults);
        }
    }

    fn slot(&self, input: InputKey) -> usize {
        match (self.scope, input) {
            (GeometryScope::Shared, _) | (GeometryScope::PerInput, InputKey::A) => 0,
            (GeometryScope::PerInput, InputKey::B) => 1,
            (GeometryScope::PerInput, InputKey::C) => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_values_sit_at_midpoint() {
        let geometry = Geometry::default();
        for field in GeometryField::ALL {
            assert_eq!(geometry.display(field), 128, "{field:?}");
        }
    }

    #[test]
    fn test_display_round_trip() {
        for field in GeometryField::ALL {
            for d in 0..=255u8 {
                assert_eq!(field.to_display(field.from_display(d)), d, "{field:?} {d}");
            }
        }
    }

    #[test]
    fn test_each_nudge_moves_display_by_one() {
        for field in GeometryField::ALL {
            let mut geometry = Geometry::default();
            for n in 1..=20 {
                geometry.nudge(field, 1);
                assert_eq!(i32::from(geometry.display(field)), 128 + n, "{field:?}");
            }
            for n in 1..=40 {
                geometry.nudge(field, -1);
                assert_eq!(i32::from(geometry.display(field)), 148 - n, "{field:?}");
            }
        }
    }

    #[test]
    fn test_stretch_saturates_at_bounds() {
        let mut geometry = Geometry::default();
        for _ in 0..300 {
            geometry.nudge(GeometryField::HStretch, 1);
        }
        assert_eq!(geometry.sx, STRETCH_MAX);
        assert_eq!(geometry.display(GeometryField::HStretch), 255);

        geometry.set(GeometryField::VStretch, 0.1);
        assert_eq!(geometry.sy, STRETCH_MIN);
        assert_eq!(geometry.display(GeometryField::VStretch), 0);
    }

    #[test]
    fn test_rotation_wraps_instead_of_clamping() {
        let mut geometry = Geometry::default();
        geometry.set_display(GeometryField::Rotate, 255).unwrap();
        assert_eq!(geometry.rot_deg, 180.0);
        geometry.nudge(GeometryField::Rotate, 1);
        assert!(geometry.rot_deg < 0.0);
        assert_eq!(geometry.display(GeometryField::Rotate), 1);

        geometry.set(GeometryField::Rotate, 540.0);
        assert_eq!(geometry.rot_deg, 180.0);
        geometry.set(GeometryField::Rotate, -180.0);
        assert_eq!(geometry.rot_deg, 180.0);
    }

    #[test]
    fn test_degree_wrap_boundaries() {
        assert_eq!(normalize_degrees(-180.0), 180.0);
        assert_eq!(normalize_degrees(-540.0), 180.0);
        assert_eq!(normalize_degrees(181.0), -179.0);
        assert_eq!(normalize_degrees(360.0), 0.0);

        assert_eq!(wrap_degrees(-180.0, true), -180.0);
        assert_eq!(wrap_degrees(-540.0, true), -180.0);
        assert_eq!(wrap_degrees(540.0, true), 180.0);
        assert_eq!(GeometryField::Rotate.to_display(-180.0), 0);
        assert_eq!(GeometryField::Rotate.to_display(180.0), 255);
    }

    #[test]
    fn test_shift_is_unbounded() {
        let mut geometry = Geometry::default();
        for _ in 0..400 {
            geometry.nudge(GeometryField::ShiftH, 1);
        }
        assert!(geometry.dx > 128.0);
        assert_eq!(geometry.display(GeometryField::ShiftH), 255);
    }

    #[test]
    fn test_set_display_rejects_out_of_range() {
        let mut geometry = Geometry::default();
        let err = geometry.set_display(GeometryField::ShiftV, 256).unwrap_err();
        assert!(matches!(
            err,
            PanelError::InvalidDisplayValue {
                field: GeometryField::ShiftV,
                value: 256
            }
        ));
    }

    #[test]
    fn test_format_value_units() {
        assert_eq!(GeometryField::HStretch.format_value(1.25), "125%");
        assert_eq!(GeometryField::Rotate.format_value(-12.4), "-12°");
        assert_eq!(GeometryField::ShiftV.format_value(7.0), "7px");
    }

    #[test]
    fn test_shared_scope_aliases_inputs() {
        let mut store = GeometryStore::new(GeometryScope::Shared);
        store.get_mut(InputKey::A).set(GeometryField::ShiftH, 10.0);
        assert_eq!(store.get(InputKey::C).dx, 10.0);

        let mut store = GeometryStore::new(GeometryScope::PerInput);
        store.get_mut(InputKey::A).set(GeometryField::ShiftH, 10.0);
        assert_eq!(store.get(InputKey::C).dx, 0.0);
    }

    #[test]
    fn test_field_id_parse() {
        assert_eq!("rotDeg".parse::<GeometryField>().unwrap(), GeometryField::Rotate);
        assert!("zoom".parse::<GeometryField>().is_err());
    }
}
