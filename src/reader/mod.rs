//! Read side: typed views over a serialized buffer.
//!
//! A [`Reference`] points at one value inside a finished buffer and exposes
//! typed getters and container navigation without copying anything out of
//! the slice. The root is found from the two-byte trailer; children are
//! reached through per-container byte widths, trailing type tables, and
//! backward offsets.

mod scan;

pub use scan::{MapScanner, VecScanner};

use crate::descriptor::{self, ByteWidth, VarType};
use crate::error::FlexError;

/// A typed view over one value inside a serialized FlexBuffers buffer.
///
/// References are cheap to copy; navigation yields fresh references into the
/// same buffer.
#[derive(Debug, Clone, Copy)]
pub struct Reference<'a> {
    buffer: &'a [u8],
    /// Start of the value or of the container body.
    index0: usize,
    ty: VarType,
    width: ByteWidth,
    item_count: usize,
}

impl<'a> Reference<'a> {
    /// Decodes the root of `buffer` from its two-byte trailer.
    pub fn new(buffer: &'a [u8]) -> Result<Reference<'a>, FlexError> {
        let n = buffer.len();
        if n < 3 {
            return Err(FlexError::Corruption(
                "buffer too short for a root and trailer".into(),
            ));
        }
        let root_width = ByteWidth::from_bytes(buffer[n - 1] as usize).ok_or_else(|| {
            FlexError::Corruption(format!("invalid trailer width {}", buffer[n - 1]))
        })?;
        let (ty, width) = descriptor::unpack(buffer[n - 2])?;
        let mut index0 = (n - 2).checked_sub(root_width.bytes()).ok_or_else(|| {
            FlexError::Corruption("buffer too short for the root slot".into())
        })?;
        if !ty.is_inline() {
            let offset = read_uint(buffer, index0, root_width)?;
            index0 = index0.checked_sub(offset as usize).ok_or_else(|| {
                FlexError::Corruption(format!("root offset {offset} out of range"))
            })?;
        }
        Reference::at(buffer, index0, ty, width)
    }

    /// A view at a known position, with the item count resolved up front.
    fn at(
        buffer: &'a [u8],
        index0: usize,
        ty: VarType,
        width: ByteWidth,
    ) -> Result<Reference<'a>, FlexError> {
        let item_count = if let Some(arity) = ty.fixed_arity() {
            arity
        } else if ty.is_inline() {
            1
        } else if ty == VarType::Key {
            let tail = buffer.get(index0..).ok_or_else(|| {
                FlexError::Corruption("key start out of range".into())
            })?;
            tail.iter()
                .position(|&b| b == 0)
                .ok_or_else(|| FlexError::Corruption("unterminated key".into()))?
        } else {
            // Vectors, maps, blobs and strings carry a size prefix just
            // before the body.
            let pos = index0.checked_sub(width.bytes()).ok_or_else(|| {
                FlexError::Corruption("size prefix out of range".into())
            })?;
            let count = read_uint(buffer, pos, width)? as usize;
            if count > buffer.len() {
                return Err(FlexError::Corruption(format!(
                    "item count {count} exceeds the buffer size"
                )));
            }
            count
        };
        Ok(Reference {
            buffer,
            index0,
            ty,
            width,
            item_count,
        })
    }

    /// The wire type of this value.
    pub fn var_type(&self) -> VarType {
        self.ty
    }

    /// Item count: bytes for blob-likes, elements for containers, 1 for
    /// scalars.
    pub fn len(&self) -> usize {
        self.item_count
    }

    pub fn is_empty(&self) -> bool {
        self.item_count == 0
    }

    pub fn is_null(&self) -> bool {
        self.ty == VarType::Null
    }

    pub fn as_int(&self) -> Result<i64, FlexError> {
        if self.ty != VarType::Int {
            return Err(FlexError::WrongType {
                expected: "an int",
                ty: self.ty,
            });
        }
        read_int(self.buffer, self.index0, self.width)
    }

    pub fn as_uint(&self) -> Result<u64, FlexError> {
        if self.ty != VarType::UInt {
            return Err(FlexError::WrongType {
                expected: "a uint",
                ty: self.ty,
            });
        }
        read_uint(self.buffer, self.index0, self.width)
    }

    pub fn as_float(&self) -> Result<f64, FlexError> {
        if self.ty != VarType::Float {
            return Err(FlexError::WrongType {
                expected: "a float",
                ty: self.ty,
            });
        }
        let raw = read_uint(self.buffer, self.index0, self.width)?;
        match self.width {
            ByteWidth::W4 => Ok(f64::from(f32::from_bits(raw as u32))),
            ByteWidth::W8 => Ok(f64::from_bits(raw)),
            _ => Err(FlexError::Corruption(format!(
                "float of width {}",
                self.width.bytes()
            ))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, FlexError> {
        if self.ty != VarType::Bool {
            return Err(FlexError::WrongType {
                expected: "a bool",
                ty: self.ty,
            });
        }
        let byte = self.buffer.get(self.index0).ok_or_else(|| {
            FlexError::Corruption("bool slot out of range".into())
        })?;
        Ok(*byte != 0)
    }

    /// String or key content as UTF-8 text.
    pub fn as_str(&self) -> Result<&'a str, FlexError> {
        if !matches!(self.ty, VarType::String | VarType::Key) {
            return Err(FlexError::WrongType {
                expected: "a string",
                ty: self.ty,
            });
        }
        std::str::from_utf8(self.content_bytes()?)
            .map_err(|e| FlexError::Corruption(format!("invalid UTF-8 in string: {e}")))
    }

    pub fn as_blob(&self) -> Result<&'a [u8], FlexError> {
        if self.ty != VarType::Blob {
            return Err(FlexError::WrongType {
                expected: "a blob",
                ty: self.ty,
            });
        }
        self.content_bytes()
    }

    /// Raw content of a blob-like value: `item_count` bytes at `index0`.
    pub(crate) fn content_bytes(&self) -> Result<&'a [u8], FlexError> {
        let end = self.index0.checked_add(self.item_count).ok_or_else(|| {
            FlexError::Corruption("content range overflow".into())
        })?;
        self.buffer.get(self.index0..end).ok_or_else(|| {
            FlexError::Corruption("content out of range".into())
        })
    }

    pub fn int_slice(&self) -> Result<Vec<i64>, FlexError> {
        self.typed_slice(VarType::Int, "an int vector", |r| r.as_int())
    }

    pub fn uint_slice(&self) -> Result<Vec<u64>, FlexError> {
        self.typed_slice(VarType::UInt, "a uint vector", |r| r.as_uint())
    }

    pub fn float_slice(&self) -> Result<Vec<f64>, FlexError> {
        self.typed_slice(VarType::Float, "a float vector", |r| r.as_float())
    }

    pub fn bool_slice(&self) -> Result<Vec<bool>, FlexError> {
        self.typed_slice(VarType::Bool, "a bool vector", |r| r.as_bool())
    }

    fn typed_slice<T>(
        &self,
        base: VarType,
        expected: &'static str,
        get: impl Fn(&Reference<'a>) -> Result<T, FlexError>,
    ) -> Result<Vec<T>, FlexError> {
        if !self.ty.is_typed_vector() || self.ty.typed_element() != Some(base) {
            return Err(FlexError::WrongType {
                expected,
                ty: self.ty,
            });
        }
        let mut out = Vec::with_capacity(self.item_count);
        for i in 0..self.item_count {
            out.push(get(&self.index(i)?)?);
        }
        Ok(out)
    }

    /// The `index`-th element of any iterable value.
    pub fn index(&self, index: usize) -> Result<Reference<'a>, FlexError> {
        if !self.ty.is_iterable() {
            return Err(FlexError::WrongType {
                expected: "an indexable container",
                ty: self.ty,
            });
        }
        if index >= self.item_count {
            return Err(FlexError::OutOfBounds {
                index,
                count: self.item_count,
            });
        }
        if self.ty.is_blob_like() {
            // Content bytes read back as width-1 uints.
            return Reference::at(self.buffer, self.index0 + index, VarType::UInt, ByteWidth::W1);
        }
        let w = self.width.bytes();
        let slot = self.index0 + index * w;
        if let Some(base) = self.ty.typed_element() {
            // Keys (and deprecated string entries) sit behind offsets; the
            // scalar bases are inline at the container's width.
            return match base {
                VarType::Key | VarType::String => {
                    let target = self.follow_offset(slot)?;
                    Reference::at(self.buffer, target, base, ByteWidth::W1)
                }
                _ => Reference::at(self.buffer, slot, base, self.width),
            };
        }
        // Untyped vector or map: the element descriptor lives in the
        // trailing type table.
        let desc_pos = self.index0 + self.item_count * w + index;
        let desc = *self.buffer.get(desc_pos).ok_or_else(|| {
            FlexError::Corruption("type table out of range".into())
        })?;
        let (ety, ewidth) = descriptor::unpack(desc)?;
        if ety.is_inline() {
            Reference::at(self.buffer, slot, ety, ewidth)
        } else {
            let target = self.follow_offset(slot)?;
            Reference::at(self.buffer, target, ety, ewidth)
        }
    }

    /// Resolves the backward offset stored at `slot` (in this container's
    /// width) to the referent's start.
    fn follow_offset(&self, slot: usize) -> Result<usize, FlexError> {
        let offset = read_uint(self.buffer, slot, self.width)?;
        slot.checked_sub(offset as usize).ok_or_else(|| {
            FlexError::Corruption(format!("backward offset {offset} out of range"))
        })
    }

    /// The packed key vector of a map.
    pub fn key_vector(&self) -> Result<Reference<'a>, FlexError> {
        if self.ty != VarType::Map {
            return Err(FlexError::WrongType {
                expected: "a map",
                ty: self.ty,
            });
        }
        let w = self.width.bytes();
        let width_pos = self.index0.checked_sub(2 * w).ok_or_else(|| {
            FlexError::Corruption("map trailer out of range".into())
        })?;
        let offset_pos = self.index0.checked_sub(3 * w).ok_or_else(|| {
            FlexError::Corruption("map trailer out of range".into())
        })?;
        let kv_width_raw = read_uint(self.buffer, width_pos, self.width)?;
        let kv_width = ByteWidth::from_bytes(kv_width_raw as usize).ok_or_else(|| {
            FlexError::Corruption(format!("invalid key vector width {kv_width_raw}"))
        })?;
        let offset = read_uint(self.buffer, offset_pos, self.width)?;
        let start = offset_pos.checked_sub(offset as usize).ok_or_else(|| {
            FlexError::Corruption(format!("key vector offset {offset} out of range"))
        })?;
        Reference::at(self.buffer, start, VarType::VectorKey, kv_width)
    }

    /// Looks `key` up by binary search over the packed key vector.
    pub fn map_index(&self, key: &str) -> Result<Reference<'a>, FlexError> {
        let keys = self.key_vector()?;
        let wanted = key.as_bytes();
        let mut lower = 0;
        let mut upper = keys.item_count;
        while lower < upper {
            let pivot = lower + (upper - lower) / 2;
            let candidate = keys.index(pivot)?;
            match candidate.content_bytes()?.cmp(wanted) {
                std::cmp::Ordering::Equal => return self.index(pivot),
                std::cmp::Ordering::Less => lower = pivot + 1,
                std::cmp::Ordering::Greater => upper = pivot,
            }
        }
        Err(FlexError::KeyNotFound(key.to_string()))
    }

    /// A single-pass scanner over a vector's elements.
    pub fn vec_scan(&self) -> Result<VecScanner<'a>, FlexError> {
        if !self.ty.is_vector() {
            return Err(FlexError::WrongType {
                expected: "a vector",
                ty: self.ty,
            });
        }
        Ok(VecScanner::new(*self))
    }

    /// A single-pass scanner over a map's entries in ascending key order.
    pub fn map_scan(&self) -> Result<MapScanner<'a>, FlexError> {
        let keys = self.key_vector()?;
        Ok(MapScanner::new(*self, keys))
    }
}

/// Little-endian unsigned read of `width` bytes at `pos`.
fn read_uint(buffer: &[u8], pos: usize, width: ByteWidth) -> Result<u64, FlexError> {
    let end = pos.checked_add(width.bytes()).ok_or_else(|| {
        FlexError::Corruption("read range overflow".into())
    })?;
    let b = buffer.get(pos..end).ok_or_else(|| {
        FlexError::Corruption(format!(
            "read of {} byte(s) at {pos} past the buffer end",
            width.bytes()
        ))
    })?;
    Ok(match width {
        ByteWidth::W1 => u64::from(b[0]),
        ByteWidth::W2 => u64::from(u16::from_le_bytes([b[0], b[1]])),
        ByteWidth::W4 => u64::from(u32::from_le_bytes([b[0], b[1], b[2], b[3]])),
        ByteWidth::W8 => u64::from_le_bytes([b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7]]),
    })
}

/// Little-endian signed read: the slot holds the sign-extended value.
fn read_int(buffer: &[u8], pos: usize, width: ByteWidth) -> Result<i64, FlexError> {
    let raw = read_uint(buffer, pos, width)?;
    Ok(match width {
        ByteWidth::W1 => i64::from(raw as u8 as i8),
        ByteWidth::W2 => i64::from(raw as u16 as i16),
        ByteWidth::W4 => i64::from(raw as u32 as i32),
        ByteWidth::W8 => raw as i64,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::Builder;

    fn build(f: impl FnOnce(&mut Builder)) -> Vec<u8> {
        let mut b = Builder::new();
        f(&mut b);
        b.finish().unwrap();
        b.serialize().unwrap().to_vec()
    }

    #[test]
    fn scalar_round_trips() {
        for value in [0i64, 1, -1, 127, -128, 128, 32767, -40000, 1 << 40, i64::MAX, i64::MIN] {
            let buf = build(|b| b.int(value).unwrap());
            let root = Reference::new(&buf).unwrap();
            assert_eq!(root.as_int().unwrap(), value, "int {value}");
        }
        for value in [0u64, 255, 256, 1 << 20, u64::MAX] {
            let buf = build(|b| b.uint(value).unwrap());
            assert_eq!(Reference::new(&buf).unwrap().as_uint().unwrap(), value);
        }
        for value in [0.0f64, 1.5, -2.25, 0.3, f64::MAX, f64::from(f32::MAX)] {
            let buf = build(|b| b.float(value).unwrap());
            assert_eq!(Reference::new(&buf).unwrap().as_float().unwrap(), value);
        }
        let buf = build(|b| b.bool(true).unwrap());
        assert!(Reference::new(&buf).unwrap().as_bool().unwrap());
        let buf = build(|b| b.null().unwrap());
        assert!(Reference::new(&buf).unwrap().is_null());
    }

    #[test]
    fn wrong_accessor_is_distinguished_from_bounds() {
        let buf = build(|b| b.int(1).unwrap());
        let root = Reference::new(&buf).unwrap();
        assert!(matches!(
            root.as_uint(),
            Err(FlexError::WrongType { .. })
        ));
        assert!(matches!(
            root.index(0),
            Err(FlexError::WrongType { .. })
        ));

        let buf = build(|b| {
            b.start_vector().unwrap();
            b.int(1).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert!(matches!(
            root.index(1),
            Err(FlexError::OutOfBounds { index: 1, count: 1 })
        ));
    }

    #[test]
    fn untyped_vector_navigation() {
        let buf = build(|b| {
            b.start_vector().unwrap();
            b.int(10).unwrap();
            b.int(-10).unwrap();
            b.bool(true).unwrap();
            b.int(2147483647).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.var_type(), VarType::Vector);
        assert_eq!(root.len(), 4);
        assert_eq!(root.index(0).unwrap().as_int().unwrap(), 10);
        assert_eq!(root.index(1).unwrap().as_int().unwrap(), -10);
        assert!(root.index(2).unwrap().as_bool().unwrap());
        assert_eq!(root.index(3).unwrap().as_int().unwrap(), 2147483647);
    }

    #[test]
    fn nested_vectors() {
        let buf = build(|b| {
            b.start_vector().unwrap();
            b.int(10).unwrap();
            b.start_vector().unwrap();
            b.int(-10).unwrap();
            b.bool(true).unwrap();
            b.end().unwrap();
            b.string("tail").unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        let inner = root.index(1).unwrap();
        assert_eq!(inner.var_type(), VarType::Vector);
        assert_eq!(inner.index(0).unwrap().as_int().unwrap(), -10);
        assert!(inner.index(1).unwrap().as_bool().unwrap());
        assert_eq!(root.index(2).unwrap().as_str().unwrap(), "tail");
    }

    #[test]
    fn typed_vectors_and_slices() {
        let buf = build(|b| {
            b.start_int_vector().unwrap();
            b.int(3).unwrap();
            b.int(-70000).unwrap();
            b.int(5).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.int_slice().unwrap(), vec![3, -70000, 5]);
        assert!(matches!(
            root.uint_slice(),
            Err(FlexError::WrongType { .. })
        ));

        let buf = build(|b| {
            b.start_float_vector().unwrap();
            b.float(1.5).unwrap();
            b.float(2.5).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.float_slice().unwrap(), vec![1.5, 2.5]);

        let buf = build(|b| {
            b.start_bool_vector().unwrap();
            b.bool(true).unwrap();
            b.bool(false).unwrap();
            b.end().unwrap();
        });
        assert_eq!(
            Reference::new(&buf).unwrap().bool_slice().unwrap(),
            vec![true, false]
        );
    }

    #[test]
    fn fixed_typed_vectors() {
        let buf = build(|b| {
            b.start_fixed_int_vector(3).unwrap();
            b.int(3).unwrap();
            b.int(2).unwrap();
            b.int(1).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.var_type(), VarType::VectorInt3);
        assert_eq!(root.len(), 3);
        assert_eq!(root.int_slice().unwrap(), vec![3, 2, 1]);

        // Indirect scalar: arity 1, no size prefix.
        let buf = build(|b| {
            b.start_fixed_uint_vector(1).unwrap();
            b.uint(900).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.var_type(), VarType::IndirectUInt);
        assert_eq!(root.uint_slice().unwrap(), vec![900]);
    }

    #[test]
    fn mixed_width_floats_widen() {
        // 1.5 fits f32, f64::MAX does not; both slots must decode exactly.
        let buf = build(|b| {
            b.start_float_vector().unwrap();
            b.float(1.5).unwrap();
            b.float(f64::MAX).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.float_slice().unwrap(), vec![1.5, f64::MAX]);
    }

    #[test]
    fn blob_and_string_content() {
        let buf = build(|b| b.blob(&[0xDE, 0xAD, 0xBE, 0xEF]).unwrap());
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.as_blob().unwrap(), &[0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(root.index(1).unwrap().as_uint().unwrap(), 0xAD);

        let buf = build(|b| b.string("hello").unwrap());
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.as_str().unwrap(), "hello");
        assert_eq!(root.len(), 5);
    }

    #[test]
    fn long_string_takes_a_two_byte_prefix() {
        let text = "x".repeat(300);
        let buf = build(|b| b.string(&text).unwrap());
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.len(), 300);
        assert_eq!(root.as_str().unwrap(), text);
    }

    #[test]
    fn map_lookup_and_key_order() {
        let buf = build(|b| {
            b.start_map().unwrap();
            b.int_with_key("One", 1).unwrap();
            b.int_with_key("Two", 2).unwrap();
            b.int_with_key("Three", 3).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.len(), 3);
        assert_eq!(root.map_index("One").unwrap().as_int().unwrap(), 1);
        assert_eq!(root.map_index("Two").unwrap().as_int().unwrap(), 2);
        assert_eq!(root.map_index("Three").unwrap().as_int().unwrap(), 3);
        assert!(matches!(
            root.map_index("Four"),
            Err(FlexError::KeyNotFound(_))
        ));

        let keys = root.key_vector().unwrap();
        assert_eq!(keys.index(0).unwrap().as_str().unwrap(), "One");
        assert_eq!(keys.index(1).unwrap().as_str().unwrap(), "Three");
        assert_eq!(keys.index(2).unwrap().as_str().unwrap(), "Two");
    }

    #[test]
    fn every_key_is_found_in_larger_maps() {
        let names: Vec<String> = (0..40).map(|i| format!("key{i:02}")).collect();
        let buf = build(|b| {
            b.start_map().unwrap();
            for (i, name) in names.iter().enumerate() {
                b.int_with_key(name, i as i64).unwrap();
            }
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(
                root.map_index(name).unwrap().as_int().unwrap(),
                i as i64,
                "lookup of {name}"
            );
        }
        assert!(root.map_index("key99").is_err());
        assert!(root.map_index("").is_err());
    }

    #[test]
    fn map_values_of_mixed_types() {
        let buf = build(|b| {
            b.start_map().unwrap();
            b.start_vector_with_key("MyVec").unwrap();
            b.int(1).unwrap();
            b.int(2).unwrap();
            b.int(2147483647).unwrap();
            b.end().unwrap();
            b.string_with_key("MyString", "This is my string!").unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        let vec = root.map_index("MyVec").unwrap();
        assert_eq!(vec.index(2).unwrap().as_int().unwrap(), 2147483647);
        assert_eq!(
            root.map_index("MyString").unwrap().as_str().unwrap(),
            "This is my string!"
        );
    }

    #[test]
    fn key_vector_roots() {
        let buf = build(|b| {
            b.start_key_vector().unwrap();
            b.key("alpha").unwrap();
            b.key("beta").unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.var_type(), VarType::VectorKey);
        assert_eq!(root.index(0).unwrap().as_str().unwrap(), "alpha");
        assert_eq!(root.index(1).unwrap().as_str().unwrap(), "beta");
    }

    #[test]
    fn scanners_walk_vectors_and_maps() {
        let buf = build(|b| {
            b.start_vector().unwrap();
            b.int(1).unwrap();
            b.int(2).unwrap();
            b.int(3).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        let values: Vec<i64> = root
            .vec_scan()
            .unwrap()
            .map(|r| r.unwrap().as_int().unwrap())
            .collect();
        assert_eq!(values, vec![1, 2, 3]);

        let buf = build(|b| {
            b.start_map().unwrap();
            b.int_with_key("b", 2).unwrap();
            b.int_with_key("a", 1).unwrap();
            b.end().unwrap();
        });
        let root = Reference::new(&buf).unwrap();
        let entries: Vec<(String, i64)> = root
            .map_scan()
            .unwrap()
            .map(|e| {
                let (k, v) = e.unwrap();
                (k.to_string(), v.as_int().unwrap())
            })
            .collect();
        assert_eq!(entries, vec![("a".into(), 1), ("b".into(), 2)]);
    }

    #[test]
    fn deprecated_string_vector_decodes_as_strings() {
        // Hand-built: ["ab", "c"] as VECTOR_STRING_DEPRECATED, width 1.
        let buf = [
            0x02, 0x61, 0x62, 0x00, // "ab" with its size prefix and terminator
            0x01, 0x63, 0x00, // "c"
            0x02, // vector size prefix
            0x07, 0x04, // offsets back to the string bodies
            0x02, // root slot
            0x3C, // descriptor: VECTOR_STRING_DEPRECATED (15), width code 0
            0x01, // root slot width
        ];
        let root = Reference::new(&buf).unwrap();
        assert_eq!(root.var_type(), VarType::VectorStringDeprecated);
        assert_eq!(root.len(), 2);
        assert_eq!(root.index(0).unwrap().as_str().unwrap(), "ab");
        assert_eq!(root.index(1).unwrap().as_str().unwrap(), "c");
    }

    #[test]
    fn corrupted_trailers_are_rejected() {
        assert!(Reference::new(&[]).is_err());
        assert!(Reference::new(&[0x01, 0x04]).is_err());
        // Trailer width 3 is not one of 1/2/4/8.
        assert!(Reference::new(&[0x01, 0x04, 0x03]).is_err());
        // Unassigned tag 27.
        assert!(Reference::new(&[0x01, 27 << 2, 0x01]).is_err());
        // Root offset pointing before the buffer start.
        assert!(Reference::new(&[0x09, 0x28, 0x01]).is_err());
    }
}
