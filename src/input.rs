//! Input source selection.
//!
//! Three sources (A, B, C) form an exclusive group: pressing one lights it and
//! darkens the others, and the group never ends up fully dark. LINE mode sits
//! outside the group and switches which "last selected source" memory is used.

use std::fmt;
use std::str::FromStr;

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::error::PanelError;

/// One of the three front-panel inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputKey {
    /// A (RGB).
    A,
    /// B (component).
    B,
    /// C (SDI).
    C,
}

impl InputKey {
    /// All inputs in panel order.
    pub const ALL: [InputKey; 3] = [InputKey::A, InputKey::B, InputKey::C];

    /// Label shown on the geometry readout.
    pub fn label(self) -> &'static str {
        match self {
            InputKey::A => "RGB",
            InputKey::B => "COMPONENT",
            InputKey::C => "SDI",
        }
    }

    /// Lower-case identifier used in persisted state.
    pub fn id(self) -> &'static str {
        match self {
            InputKey::A => "a",
            InputKey::B => "b",
            InputKey::C => "c",
        }
    }

    fn index(self) -> usize {
        match self {
            InputKey::A => 0,
            InputKey::B => 1,
            InputKey::C => 2,
        }
    }
}

impl fmt::Display for InputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for InputKey {
    type Err = PanelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "a" => Ok(InputKey::A),
            "b" => Ok(InputKey::B),
            "c" => Ok(InputKey::C),
            _ => Err(PanelError::UnknownInput(s.to_string())),
        }
    }
}

/// Exclusive source selection plus the LINE-mode memories.
#[derive(Debug, Clone)]
pub struct SourceSelector {
    lit: [bool; 3],
    line: bool,
    last_normal: Option<InputKey>,
    last_line: Option<InputKey>,
    initial: InputKey,
}

impl SourceSelector {
    /// Create a selector with `initial` lit.
    ///
    /// Both memories are seeded with `initial` so LINE toggling always has a
    /// fallback, even when LINE starts enabled.
    pub fn new(initial: InputKey, line: bool) -> Self {
        let mut lit = [false; 3];
        lit[initial.index()] = true;
        Self {
            lit,
            line,
            last_normal: Some(initial),
            last_line: Some(initial),
            initial,
        }
    }

    /// The lit source, or `None` if the group is dark.
    pub fn active_key(&self) -> Option<InputKey> {
        InputKey::ALL.into_iter().find(|key| self.lit[key.index()])
    }

    /// The lit source, falling back to the source captured at initialization.
    pub fn active_or_initial(&self) -> InputKey {
        self.active_key().unwrap_or_else(|| {
            warn!("no source lit, falling back to {}", self.initial);
            self.initial
        })
    }

    /// Whether `key` is currently lit.
    pub fn is_lit(&self, key: InputKey) -> bool {
        self.lit[key.index()]
    }

    /// Whether LINE mode is on.
    pub fn line_mode(&self) -> bool {
        self.line
    }

    /// Remembered source for normal mode.
    pub fn last_normal(&self) -> Option<InputKey> {
        self.last_normal
    }

    /// Remembered source for LINE mode.
    pub fn last_line(&self) -> Option<InputKey> {
        self.last_line
    }

    /// Exclusive select with toggle semantics that never darkens the group.
    ///
    /// An unlit target is lit alone. A lit target hands over to another lit
    /// member if one exists (unreachable while the invariant holds), otherwise
    /// it stays lit.
    pub fn select_exclusive(&mut self, target: InputKey) {
        if !self.is_lit(target) {
            self.lit = [false; 3];
            self.lit[target.index()] = true;
            return;
        }

        let other = InputKey::ALL
            .into_iter()
            .find(|key| *key != target && self.is_lit(*key));
        debug_assert!(other.is_none(), "exclusive group had two lit sources");
        match other {
            Some(other) => {
                warn!("sources {} and {} both lit, keeping {}", target, other, other);
                self.lit = [false; 3];
                self.lit[other.index()] = true;
            }
            None => self.lit[target.index()] = true,
        }
    }

    /// Set the selection exactly, without toggle semantics.
    ///
    /// `None` darkens the whole group; callers restoring from memory always
    /// pass a resolved source.
    pub fn set_exact(&mut self, target: Option<InputKey>) {
        self.lit = [false; 3];
        if let Some(target) = target {
            self.lit[target.index()] = true;
        }
    }

    /// Handle a press of an A/B/C button.
    ///
    /// Returns `true` when the lit source changed.
    pub fn press(&mut self, target: InputKey) -> bool {
        let before = self.active_key();
        self.select_exclusive(target);
        let after = self.active_key();
        if self.line {
            self.last_line = after;
        } else {
            self.last_normal = after;
        }
        debug!(
            "source press {}: {:?} -> {:?} (line={})",
            target, before, after, self.line
        );
        before != after
    }

    /// Flip LINE mode and restore the source remembered for the new mode.
    ///
    /// Returns the new LINE state.
    pub fn toggle_line(&mut self) -> bool {
        if !self.line {
            self.last_normal = self.active_key();
            self.line = true;
            let candidate = self.last_line.or(self.last_normal).unwrap_or(InputKey::A);
            self.set_exact(Some(candidate));
            self.last_line = Some(candidate);
            debug!("line on, restored {}", candidate);
        } else {
            self.line = false;
            let candidate = self.last_normal.unwrap_or(self.initial);
            self.set_exact(Some(candidate));
            debug!("line off, restored {}", candidate);
        }
        self.line
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_select_exclusive_lights_only_target() {
        let mut selector = SourceSelector::new(InputKey::A, false);
        selector.select_exclusive(InputKey::C);
        assert_eq!(selector.active_key(), Some(InputKey::C));
        assert!(!selector.is_lit(InputKey::A));
        assert!(!selector.is_lit(InputKey::B));
    }

    #[test]
    fn test_pressing_lit_source_keeps_it_lit() {
        let mut selector = SourceSelector::new(InputKey::B, false);
        assert!(!selector.press(InputKey::B));
        assert_eq!(selector.active_key(), Some(InputKey::B));
    }

    #[test]
    fn test_press_records_memory_for_current_mode() {
        let mut selector = SourceSelector::new(InputKey::A, false);
        assert!(selector.press(InputKey::B));
        assert_eq!(selector.last_normal(), Some(InputKey::B));

        selector.toggle_line();
        selector.press(InputKey::C);
        assert_eq!(selector.last_line(), Some(InputKey::C));
        assert_eq!(selector.last_normal(), Some(InputKey::B));
    }

    #[test]
    fn test_line_round_trip_restores_source() {
        let mut selector = SourceSelector::new(InputKey::A, false);
        assert!(selector.toggle_line());
        assert!(!selector.toggle_line());
        assert_eq!(selector.active_key(), Some(InputKey::A));
    }

    #[test]
    fn test_line_modes_keep_separate_memories() {
        let mut selector = SourceSelector::new(InputKey::A, false);
        selector.press(InputKey::B);
        selector.toggle_line();
        // LINE memory was seeded with the initial source.
        assert_eq!(selector.active_key(), Some(InputKey::A));
        selector.press(InputKey::C);
        selector.toggle_line();
        assert_eq!(selector.active_key(), Some(InputKey::B));
        selector.toggle_line();
        assert_eq!(selector.active_key(), Some(InputKey::C));
    }

    #[test]
    fn test_set_exact_none_falls_back_to_initial() {
        let mut selector = SourceSelector::new(InputKey::C, false);
        selector.set_exact(None);
        assert_eq!(selector.active_key(), None);
        assert_eq!(selector.active_or_initial(), InputKey::C);
    }

    #[test]
    fn test_never_dark_over_press_and_line_sequences() {
        let mut selector = SourceSelector::new(InputKey::A, false);
        // Walk a deterministic pseudo-random sequence of presses and LINE flips.
        let mut seed: u32 = 0x1234_5678;
        for _ in 0..2000 {
            seed = seed.wrapping_mul(1_103_515_245).wrapping_add(12_345);
            match (seed >> 16) % 5 {
                0 => selector.select_exclusive(InputKey::A),
                1 => selector.select_exclusive(InputKey::B),
                2 => {
                    selector.press(InputKey::C);
                }
                _ => {
                    selector.toggle_line();
                }
            }
            assert!(selector.active_key().is_some());
            let lit = InputKey::ALL.iter().filter(|k| selector.is_lit(**k)).count();
            assert_eq!(lit, 1);
        }
    }

    #[test]
    fn test_parse_input_key() {
        assert_eq!("B".parse::<InputKey>().unwrap(), InputKey::B);
        assert!(matches!(
            "d".parse::<InputKey>(),
            Err(PanelError::UnknownInput(_))
        ));
    }
}
