//! Dynamic value trees for auto-building and unpacking buffers.

mod value;

pub use value::{FlexMap, FlexValue};
