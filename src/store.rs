//! Key/value persistence collaborator.

use std::collections::HashMap;

use crate::error::PanelError;

/// Key holding the time of the last power-off, in milliseconds.
pub const KEY_LAST_POWER_OFF: &str = "lastPowerOffMs";
/// Key that forces the next power-on to be a full cold start.
pub const KEY_FORCE_COLD_START: &str = "forceColdStart";
/// Key holding the JSON-encoded session defaults.
pub const KEY_SESSION_DEFAULTS: &str = "sessionDefaults";

/// String key/value store.
///
/// Hosts back this with whatever persistence they have. The panel only
/// touches it during power transitions and explicit save/load.
pub trait KeyValueStore {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<String>, PanelError>;

    /// Write a value.
    fn set(&mut self, key: &str, value: &str) -> Result<(), PanelError>;

    /// Delete a value. Missing keys are not an error.
    fn remove(&mut self, key: &str) -> Result<(), PanelError>;
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, PanelError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), PanelError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), PanelError> {
        self.entries.remove(key);
        Ok(())
    }
}
