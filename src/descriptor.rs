//! Wire-level type descriptors and width math.
//!
//! Every stored value carries a one-byte descriptor packing its type tag
//! (high 6 bits) and a 2-bit byte-width code (low 2 bits). The numeric tag
//! assignments are part of the wire format and must not change.

use std::fmt;

use crate::error::FlexError;

/// Value-type tag as it appears on the wire.
///
/// Tags 0..=3 and 26 are inline: the value lives directly in the parent's
/// element slot. All other tags are reached through a backward offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VarType {
    Null = 0,
    Int = 1,
    UInt = 2,
    Float = 3,
    Key = 4,
    String = 5,
    IndirectInt = 6,
    IndirectUInt = 7,
    IndirectFloat = 8,
    Map = 9,
    /// Untyped vector: carries a trailing type table.
    Vector = 10,
    /// Typed vectors: no type table, element type implied by the tag.
    VectorInt = 11,
    VectorUInt = 12,
    VectorFloat = 13,
    VectorKey = 14,
    /// Retained for decoding old buffers only; never produced.
    VectorStringDeprecated = 15,
    /// Typed pairs/triples/quads: no type table and no size prefix.
    VectorInt2 = 16,
    VectorUInt2 = 17,
    VectorFloat2 = 18,
    VectorInt3 = 19,
    VectorUInt3 = 20,
    VectorFloat3 = 21,
    VectorInt4 = 22,
    VectorUInt4 = 23,
    VectorFloat4 = 24,
    Blob = 25,
    Bool = 26,
    VectorBool = 36,
}

impl VarType {
    /// Decodes a raw tag value, rejecting the unassigned gap 27..=35.
    pub fn from_u8(value: u8) -> Option<VarType> {
        Some(match value {
            0 => VarType::Null,
            1 => VarType::Int,
            2 => VarType::UInt,
            3 => VarType::Float,
            4 => VarType::Key,
            5 => VarType::String,
            6 => VarType::IndirectInt,
            7 => VarType::IndirectUInt,
            8 => VarType::IndirectFloat,
            9 => VarType::Map,
            10 => VarType::Vector,
            11 => VarType::VectorInt,
            12 => VarType::VectorUInt,
            13 => VarType::VectorFloat,
            14 => VarType::VectorKey,
            15 => VarType::VectorStringDeprecated,
            16 => VarType::VectorInt2,
            17 => VarType::VectorUInt2,
            18 => VarType::VectorFloat2,
            19 => VarType::VectorInt3,
            20 => VarType::VectorUInt3,
            21 => VarType::VectorFloat3,
            22 => VarType::VectorInt4,
            23 => VarType::VectorUInt4,
            24 => VarType::VectorFloat4,
            25 => VarType::Blob,
            26 => VarType::Bool,
            36 => VarType::VectorBool,
            _ => return None,
        })
    }

    /// True if the value is stored directly in the parent's element slot.
    pub fn is_inline(self) -> bool {
        matches!(
            self,
            VarType::Null | VarType::Int | VarType::UInt | VarType::Float | VarType::Bool
        )
    }

    /// True for BLOB, STRING and KEY: raw byte content behind an offset.
    pub fn is_blob_like(self) -> bool {
        matches!(self, VarType::Blob | VarType::String | VarType::Key)
    }

    /// Arity of a fixed-typed vector (1 for INDIRECT_*, 2/3/4 for the
    /// tuple/triple/quad tags), or `None` for every other tag.
    pub fn fixed_arity(self) -> Option<usize> {
        match self {
            VarType::IndirectInt | VarType::IndirectUInt | VarType::IndirectFloat => Some(1),
            VarType::VectorInt2 | VarType::VectorUInt2 | VarType::VectorFloat2 => Some(2),
            VarType::VectorInt3 | VarType::VectorUInt3 | VarType::VectorFloat3 => Some(3),
            VarType::VectorInt4 | VarType::VectorUInt4 | VarType::VectorFloat4 => Some(4),
            _ => None,
        }
    }

    /// True for fixed-typed vectors: arity implied by the tag, no size prefix.
    pub fn is_fixed_typed_vector(self) -> bool {
        self.fixed_arity().is_some()
    }

    /// True for vectors whose element type is implied by the tag.
    pub fn is_typed_vector(self) -> bool {
        matches!(
            self,
            VarType::VectorInt
                | VarType::VectorUInt
                | VarType::VectorFloat
                | VarType::VectorKey
                | VarType::VectorBool
        ) || self.is_fixed_typed_vector()
    }

    /// True for any vector shape, untyped or typed.
    pub fn is_vector(self) -> bool {
        self == VarType::Vector
            || self == VarType::VectorStringDeprecated
            || self.is_typed_vector()
    }

    /// True if the value supports indexed access.
    pub fn is_iterable(self) -> bool {
        self.is_vector() || self == VarType::Map || self.is_blob_like()
    }

    /// True if the serialized body starts with an item-count prefix.
    pub fn has_size_prefix(self) -> bool {
        match self {
            VarType::Map | VarType::Blob | VarType::String => true,
            _ => self.is_vector() && !self.is_fixed_typed_vector(),
        }
    }

    /// Element type of a typed container, or `None` for untyped shapes.
    pub fn typed_element(self) -> Option<VarType> {
        match self {
            VarType::VectorInt
            | VarType::IndirectInt
            | VarType::VectorInt2
            | VarType::VectorInt3
            | VarType::VectorInt4 => Some(VarType::Int),
            VarType::VectorUInt
            | VarType::IndirectUInt
            | VarType::VectorUInt2
            | VarType::VectorUInt3
            | VarType::VectorUInt4 => Some(VarType::UInt),
            VarType::VectorFloat
            | VarType::IndirectFloat
            | VarType::VectorFloat2
            | VarType::VectorFloat3
            | VarType::VectorFloat4 => Some(VarType::Float),
            VarType::VectorBool => Some(VarType::Bool),
            VarType::VectorKey => Some(VarType::Key),
            VarType::VectorStringDeprecated => Some(VarType::String),
            _ => None,
        }
    }
}

impl fmt::Display for VarType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VarType::Null => "NULL",
            VarType::Int => "INT",
            VarType::UInt => "UINT",
            VarType::Float => "FLOAT",
            VarType::Key => "KEY",
            VarType::String => "STRING",
            VarType::IndirectInt => "INDIRECT_INT",
            VarType::IndirectUInt => "INDIRECT_UINT",
            VarType::IndirectFloat => "INDIRECT_FLOAT",
            VarType::Map => "MAP",
            VarType::Vector => "VECTOR",
            VarType::VectorInt => "VECTOR_INT",
            VarType::VectorUInt => "VECTOR_UINT",
            VarType::VectorFloat => "VECTOR_FLOAT",
            VarType::VectorKey => "VECTOR_KEY",
            VarType::VectorStringDeprecated => "VECTOR_STRING_DEPRECATED",
            VarType::VectorInt2 => "VECTOR_INT2",
            VarType::VectorUInt2 => "VECTOR_UINT2",
            VarType::VectorFloat2 => "VECTOR_FLOAT2",
            VarType::VectorInt3 => "VECTOR_INT3",
            VarType::VectorUInt3 => "VECTOR_UINT3",
            VarType::VectorFloat3 => "VECTOR_FLOAT3",
            VarType::VectorInt4 => "VECTOR_INT4",
            VarType::VectorUInt4 => "VECTOR_UINT4",
            VarType::VectorFloat4 => "VECTOR_FLOAT4",
            VarType::Blob => "BLOB",
            VarType::Bool => "BOOL",
            VarType::VectorBool => "VECTOR_BOOL",
        };
        f.write_str(name)
    }
}

/// Byte width of a container slot, encoded on the wire as a 2-bit code
/// (00 = 1 byte, 01 = 2, 10 = 4, 11 = 8).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum ByteWidth {
    W1 = 0,
    W2 = 1,
    W4 = 2,
    W8 = 3,
}

impl ByteWidth {
    /// The actual slot size in bytes: `2^code`.
    pub fn bytes(self) -> usize {
        1 << (self as usize)
    }

    /// The 2-bit wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decodes a 2-bit code; only the low two bits are considered.
    pub fn from_code(code: u8) -> ByteWidth {
        match code & 0b11 {
            0 => ByteWidth::W1,
            1 => ByteWidth::W2,
            2 => ByteWidth::W4,
            _ => ByteWidth::W8,
        }
    }

    /// Maps a literal byte count back to a width, if it is one of 1/2/4/8.
    pub fn from_bytes(bytes: usize) -> Option<ByteWidth> {
        match bytes {
            1 => Some(ByteWidth::W1),
            2 => Some(ByteWidth::W2),
            4 => Some(ByteWidth::W4),
            8 => Some(ByteWidth::W8),
            _ => None,
        }
    }
}

/// Packs a type tag and width code into one descriptor byte.
pub fn pack(ty: VarType, width: ByteWidth) -> u8 {
    ((ty as u8) << 2) | width.code()
}

/// Splits a descriptor byte back into its tag and width code.
pub fn unpack(descriptor: u8) -> Result<(VarType, ByteWidth), FlexError> {
    let ty = VarType::from_u8(descriptor >> 2).ok_or_else(|| {
        FlexError::Corruption(format!("unknown type tag {}", descriptor >> 2))
    })?;
    Ok((ty, ByteWidth::from_code(descriptor)))
}

/// Smallest width whose unsigned range contains `value`.
pub fn uint_width(value: u64) -> ByteWidth {
    if value <= u64::from(u8::MAX) {
        ByteWidth::W1
    } else if value <= u64::from(u16::MAX) {
        ByteWidth::W2
    } else if value <= u64::from(u32::MAX) {
        ByteWidth::W4
    } else {
        ByteWidth::W8
    }
}

/// Smallest width whose signed range contains `value`.
pub fn int_width(value: i64) -> ByteWidth {
    if i64::from(i8::MIN) <= value && value <= i64::from(i8::MAX) {
        ByteWidth::W1
    } else if i64::from(i16::MIN) <= value && value <= i64::from(i16::MAX) {
        ByteWidth::W2
    } else if i64::from(i32::MIN) <= value && value <= i64::from(i32::MAX) {
        ByteWidth::W4
    } else {
        ByteWidth::W8
    }
}

/// Width of a float: 4 bytes when the value survives an exact round-trip
/// through 32-bit IEEE-754, 8 otherwise. NaN never compares equal to itself,
/// so every NaN is stored wide with its payload untouched.
pub fn float_width(value: f64) -> ByteWidth {
    if f64::from(value as f32) == value {
        ByteWidth::W4
    } else {
        ByteWidth::W8
    }
}
