//! Error types for the front panel core.

use crate::geometry::GeometryField;

/// Errors that can occur when driving the front panel.
///
/// Navigation and editing never fail; values are clamped instead. These
/// variants cover validated constructors, text identifiers and the
/// persistence collaborator.
#[derive(Debug, thiserror::Error)]
pub enum PanelError {
    /// A field identifier could not be parsed.
    #[error("Unknown field id '{0}'")]
    UnknownField(String),

    /// An input identifier could not be parsed.
    #[error("Unknown input '{0}' (expected a, b or c)")]
    UnknownInput(String),

    /// A display value was outside the 8-bit scale.
    #[error("Invalid display value {value} for {field:?} (expected 0-255)")]
    InvalidDisplayValue {
        /// The geometry field being set.
        field: GeometryField,
        /// The rejected value.
        value: i32,
    },

    /// A Kelvin value was outside the supported range.
    #[error("Color temperature {0}K out of range (expected 3500-10000)")]
    KelvinOutOfRange(f64),

    /// The key/value store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),

    /// Persisted state could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
