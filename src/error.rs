//! Error types for the FlexBuffers codec.

use crate::descriptor::VarType;

/// Errors that can occur while building or reading a FlexBuffers buffer.
#[derive(Debug, thiserror::Error)]
pub enum FlexError {
    /// An operation addressed the wrong container: a keyed entry outside a
    /// map, `end` with nothing open, a second root value, an overfull
    /// fixed-arity vector, and similar stack-shape violations.
    #[error("shape error: {0}")]
    Shape(String),

    /// An empty key, or a key already present in the map.
    #[error("key error: {0}")]
    Key(String),

    /// An element of a disallowed type or width for the target container.
    #[error("type error: {0}")]
    Type(String),

    /// A read accessor was called on a value of a different type.
    #[error("{ty} value cannot be read as {expected}")]
    WrongType {
        expected: &'static str,
        ty: VarType,
    },

    /// Indexed access past the end of a container.
    #[error("index {index} out of bounds for {count} item(s)")]
    OutOfBounds { index: usize, count: usize },

    /// A map lookup found no matching key.
    #[error("key {0:?} not found in map")]
    KeyNotFound(String),

    /// The buffer does not describe a well-formed FlexBuffers value.
    #[error("corrupted buffer: {0}")]
    Corruption(String),
}
