//! Element slots: inline scalars and pending offsets to child structures.

use bytes::{BufMut, BytesMut};

use crate::descriptor::{self, ByteWidth, VarType};

/// Index of a structure in the builder's arena.
pub(crate) type StructId = usize;

/// One element slot of a container under construction.
///
/// The payload is kept as 8 little-endian bytes: the full two's-complement
/// encoding for ints, so truncating to any width the value fits in yields the
/// correctly sign-extended slot. Floats keep their 64-bit IEEE-754 bits and
/// are re-narrowed at write time when the slot is 4 bytes wide.
///
/// Offset elements carry the arena id of their referent instead of a payload;
/// the stored distance is computed during serialization once both positions
/// are known.
#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub bytes: [u8; 8],
    pub ty: VarType,
    /// Intrinsic width of the scalar; unused for offsets.
    pub width: ByteWidth,
    /// Referent structure for offset elements.
    pub child: Option<StructId>,
}

impl Element {
    pub fn int(value: i64) -> Element {
        Element {
            bytes: value.to_le_bytes(),
            ty: VarType::Int,
            width: descriptor::int_width(value),
            child: None,
        }
    }

    pub fn uint(value: u64) -> Element {
        Element {
            bytes: value.to_le_bytes(),
            ty: VarType::UInt,
            width: descriptor::uint_width(value),
            child: None,
        }
    }

    pub fn float(value: f64) -> Element {
        Element {
            bytes: value.to_bits().to_le_bytes(),
            ty: VarType::Float,
            width: descriptor::float_width(value),
            child: None,
        }
    }

    pub fn boolean(value: bool) -> Element {
        let mut bytes = [0u8; 8];
        bytes[0] = u8::from(value);
        Element {
            bytes,
            ty: VarType::Bool,
            width: ByteWidth::W1,
            child: None,
        }
    }

    pub fn null() -> Element {
        Element {
            bytes: [0u8; 8],
            ty: VarType::Null,
            width: ByteWidth::W1,
            child: None,
        }
    }

    /// An offset slot pointing at `child`, which has the given wire type.
    pub fn offset(ty: VarType, child: StructId) -> Element {
        Element {
            bytes: [0u8; 8],
            ty,
            width: ByteWidth::W1,
            child: Some(child),
        }
    }

    /// Writes this scalar into `buf` as one `width`-byte slot.
    ///
    /// Requires `width >= self.width`; the serializer guarantees this by
    /// construction (a container is at least as wide as its widest element).
    pub fn write_scalar(&self, buf: &mut BytesMut, width: ByteWidth) {
        if self.ty == VarType::Float {
            let value = f64::from_bits(u64::from_le_bytes(self.bytes));
            match width {
                // Exact by the width-selection rule: only values that
                // round-trip through f32 are ever given a 4-byte slot.
                ByteWidth::W4 => buf.put_slice(&(value as f32).to_le_bytes()),
                _ => buf.put_slice(&value.to_le_bytes()),
            }
            return;
        }
        buf.put_slice(&self.bytes[..width.bytes()]);
    }
}
