//! Session defaults and the two-press write ritual.
//!
//! While a field is being edited, a first press of the write button arms the
//! write; a second press stores the current value as the field's default for
//! the active input and flashes a star for a moment. The defaults last for
//! the session and survive power cycles.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use log::{debug, info};

use crate::color_temp::FACTORY_KELVIN;
use crate::error::PanelError;
use crate::geometry::GeometryField;
use crate::input::InputKey;
use crate::timer::{Scheduler, TimerHandle, TimerTag};

/// A field that can carry a session default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FieldId {
    /// One of the geometry parameters.
    Geometry(GeometryField),
    /// The USER color temperature in Kelvin.
    Kelvin,
}

impl FieldId {
    /// Value used when no session default exists.
    pub fn factory_value(self) -> f64 {
        match self {
            FieldId::Geometry(field) => field.factory_value(),
            FieldId::Kelvin => FACTORY_KELVIN,
        }
    }

    /// Identifier used in persisted state.
    pub fn id(self) -> &'static str {
        match self {
            FieldId::Geometry(field) => field.id(),
            FieldId::Kelvin => "ctK",
        }
    }
}

impl From<GeometryField> for FieldId {
    fn from(field: GeometryField) -> Self {
        FieldId::Geometry(field)
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for FieldId {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "ctK" {
            return Ok(FieldId::Kelvin);
        }
        s.parse().map(FieldId::Geometry)
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Committed per-input, per-field defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionDefaults {
    values: BTreeMap<(InputKey, FieldId), f64>,
}

impl SessionDefaults {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Committed value for `(input, field)`, if any.
    pub fn get(&self, input: InputKey, field: FieldId) -> Option<f64> {
        self.values.get(&(input, field)).copied()
    }

    /// Committed value, or the field's factory value.
    pub fn value_or_factory(&self, input: InputKey, field: FieldId) -> f64 {
        self.get(input, field).unwrap_or_else(|| field.factory_value())
    }

    /// Store a default.
    pub fn set(&mut self, input: InputKey, field: FieldId, value: f64) {
        self.values.insert((input, field), value);
    }

    /// Whether nothing has been committed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Encode as `{"a": {"sx": 1.02}, ...}`.
    pub fn to_json(&self) -> Result<String, PanelError> {
        let mut nested: BTreeMap<&str, BTreeMap<&str, f64>> = BTreeMap::new();
        for ((input, field), value) in &self.values {
            nested.entry(input.id()).or_default().insert(field.id(), *value);
        }
        Ok(serde_json::to_string(&nested)?)
    }

    /// Decode the form written by [`SessionDefaults::to_json`].
    ///
    /// # Errors
    /// Fails on malformed JSON or unknown input/field ids.
    pub fn from_json(json: &str) -> Result<Self, PanelError> {
        let nested: BTreeMap<String, BTreeMap<String, f64>> = serde_json::from_str(json)?;
        let mut defaults = Self::new();
        for (input, fields) in nested {
            let input: InputKey = input.parse()?;
            for (field, value) in fields {
                defaults.set(input, field.parse()?, value);
            }
        }
        Ok(defaults)
    }
}

// =============================================================================
// Write ritual
// =============================================================================

/// Result of one write-button press.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RitualOutcome {
    /// The write is armed; nothing stored yet.
    Armed,
    /// The value was stored.
    Committed(f64),
}

/// Arm/commit state with its flash-clear timer.
#[derive(Debug, Default)]
pub struct WriteRitual {
    armed: bool,
    star_flash: bool,
    clear_timer: Option<TimerHandle>,
}

impl WriteRitual {
    /// Create an idle ritual.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the WRITE indicator is showing.
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Whether the commit star is showing.
    pub fn star_flash(&self) -> bool {
        self.star_flash
    }

    /// Handle a write-button press while `field` is being edited.
    ///
    /// A press that lands while the star is still showing clears the flash
    /// and starts a fresh arm cycle.
    pub fn trigger<S: Scheduler + ?Sized>(
        &mut self,
        input: InputKey,
        field: FieldId,
        value: f64,
        defaults: &mut SessionDefaults,
        scheduler: &mut S,
        flash_ms: u64,
    ) -> RitualOutcome {
        if self.star_flash {
            self.cancel_timer(scheduler);
            self.star_flash = false;
            self.armed = true;
            debug!("write re-armed for {}/{}", input, field);
            return RitualOutcome::Armed;
        }

        if !self.armed {
            self.armed = true;
            debug!("write armed for {}/{}", input, field);
            return RitualOutcome::Armed;
        }

        defaults.set(input, field, value);
        self.star_flash = true;
        self.cancel_timer(scheduler);
        self.clear_timer = Some(scheduler.schedule_once(flash_ms, TimerTag::WriteFlash));
        info!("session default {}/{} = {}", input, field, value);
        RitualOutcome::Committed(value)
    }

    /// Clear both indicators and cancel the pending flash clear.
    pub fn reset<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        self.cancel_timer(scheduler);
        self.armed = false;
        self.star_flash = false;
    }

    /// Handle a fired timer. Returns `true` if it belonged to this ritual.
    pub fn on_timer(&mut self, handle: TimerHandle) -> bool {
        if self.clear_timer != Some(handle) {
            return false;
        }
        self.clear_timer = None;
        self.armed = false;
        self.star_flash = false;
        debug!("write flash cleared");
        true
    }

    fn cancel_timer<S: Scheduler + ?Sized>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.clear_timer.take() {
            scheduler.cancel(handle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::VirtualScheduler;

    const SX: FieldId = FieldId::Geometry(GeometryField::HStretch);

    #[test]
    fn test_missing_default_falls_back_to_factory() {
        let defaults = SessionDefaults::new();
        assert_eq!(defaults.value_or_factory(InputKey::B, SX), 1.0);
        assert_eq!(
            defaults.value_or_factory(InputKey::B, FieldId::Geometry(GeometryField::Rotate)),
            0.0
        );
        assert_eq!(defaults.value_or_factory(InputKey::B, FieldId::Kelvin), 6500.0);
    }

    #[test]
    fn test_first_press_arms_second_commits() {
        let mut scheduler = VirtualScheduler::new();
        let mut defaults = SessionDefaults::new();
        let mut ritual = WriteRitual::new();

        let outcome = ritual.trigger(InputKey::A, SX, 1.2, &mut defaults, &mut scheduler, 1000);
        assert_eq!(outcome, RitualOutcome::Armed);
        assert!(ritual.is_armed());
        assert!(defaults.is_empty());

        let outcome = ritual.trigger(InputKey::A, SX, 1.2, &mut defaults, &mut scheduler, 1000);
        assert_eq!(outcome, RitualOutcome::Committed(1.2));
        assert!(ritual.is_armed());
        assert!(ritual.star_flash());
        assert_eq!(defaults.get(InputKey::A, SX), Some(1.2));

        let (handle, tag) = scheduler.next_due(1000).unwrap();
        assert_eq!(tag, TimerTag::WriteFlash);
        assert!(ritual.on_timer(handle));
        assert!(!ritual.is_armed());
        assert!(!ritual.star_flash());
        assert_eq!(defaults.get(InputKey::A, SX), Some(1.2));
    }

    #[test]
    fn test_press_during_flash_rearms() {
        let mut scheduler = VirtualScheduler::new();
        let mut defaults = SessionDefaults::new();
        let mut ritual = WriteRitual::new();
        for _ in 0..2 {
            ritual.trigger(InputKey::A, SX, 0.9, &mut defaults, &mut scheduler, 1000);
        }

        let outcome = ritual.trigger(InputKey::A, SX, 1.4, &mut defaults, &mut scheduler, 1000);
        assert_eq!(outcome, RitualOutcome::Armed);
        assert!(ritual.is_armed());
        assert!(!ritual.star_flash());
        assert_eq!(scheduler.pending_count(), 0);
        assert_eq!(defaults.get(InputKey::A, SX), Some(0.9));
    }

    #[test]
    fn test_reset_cancels_pending_clear() {
        let mut scheduler = VirtualScheduler::new();
        let mut defaults = SessionDefaults::new();
        let mut ritual = WriteRitual::new();
        for _ in 0..2 {
            ritual.trigger(InputKey::C, FieldId::Kelvin, 7200.0, &mut defaults, &mut scheduler, 1000);
        }
        assert_eq!(scheduler.pending_count(), 1);

        ritual.reset(&mut scheduler);
        assert_eq!(scheduler.pending_count(), 0);
        assert!(!ritual.is_armed());
        // The cancelled clear is the only timer ever issued.
        assert!(!ritual.on_timer(TimerHandle::new(1)));
    }

    #[test]
    fn test_json_round_trip_through_ids() {
        let mut defaults = SessionDefaults::new();
        defaults.set(InputKey::A, SX, 1.1);
        defaults.set(InputKey::C, FieldId::Kelvin, 8000.0);

        let json = defaults.to_json().unwrap();
        assert!(json.contains("\"ctK\":8000.0"));
        assert_eq!(SessionDefaults::from_json(&json).unwrap(), defaults);
    }

    #[test]
    fn test_from_json_rejects_unknown_field() {
        let err = SessionDefaults::from_json(r#"{"a":{"zoom":1.0}}"#).unwrap_err();
        assert!(matches!(err, PanelError::UnknownField(_)));
    }
}
