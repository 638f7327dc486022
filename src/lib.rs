//! FlexR - a pure-Rust FlexBuffers codec.
//!
//! FlexBuffers is a schemaless, self-describing binary format in which any
//! element of the serialized tree can be reached without a prior decode pass:
//! containers record their byte width and item count, children are addressed
//! through backward offsets, and map keys are packed sorted so lookups are a
//! binary search over the raw buffer.
//!
//! # Architecture
//!
//! - **`descriptor`** — wire type tags, byte widths, descriptor packing
//! - **`builder`** — write side: the stack `Builder` and post-order serializer
//! - **`reader`** — read side: in-place `Reference` views and scanners
//! - **`types`** — dynamic `FlexValue` trees for auto-building and unpacking
//! - **`error`** — error types
//!
//! # Example
//!
//! ```
//! use flexr::{from_bytes, to_bytes, FlexValue};
//!
//! let value = FlexValue::IntVector(vec![1, 2, 3]);
//! let buffer = to_bytes(&value).unwrap();
//! assert_eq!(from_bytes(&buffer).unwrap(), value);
//! ```

pub mod builder;
pub mod descriptor;
pub mod error;
pub mod reader;
pub mod types;

pub use builder::Builder;
pub use descriptor::{ByteWidth, VarType};
pub use error::FlexError;
pub use reader::{MapScanner, Reference, VecScanner};
pub use types::{FlexMap, FlexValue};

use bytes::Bytes;

/// Serializes a dynamic value tree into a FlexBuffers buffer.
pub fn to_bytes(value: &FlexValue) -> Result<Bytes, FlexError> {
    let mut builder = Builder::new();
    builder.push_value(value)?;
    builder.finish()?;
    builder.serialize()
}

/// Decodes the root of a FlexBuffers buffer into a dynamic value tree.
pub fn from_bytes(buffer: &[u8]) -> Result<FlexValue, FlexError> {
    Reference::new(buffer)?.to_value()
}
