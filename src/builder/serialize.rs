//! Post-order wire emission.
//!
//! Children are serialized strictly before the structures that reference
//! them, so every stored offset points backward. A structure's byte width is
//! decided here, once its children's positions are known: it is the smallest
//! of {1, 2, 4, 8} that holds every inline scalar, the item count of a
//! size-prefixed body, and every backward offset. Slot positions move with
//! the width, so the selection iterates until it is stable.

use bytes::{BufMut, BytesMut};
use tracing::trace;

use crate::builder::element::StructId;
use crate::builder::structure::Structure;
use crate::descriptor::{self, pack, ByteWidth, VarType};
use crate::error::FlexError;

/// Position and final width of an already-emitted structure.
#[derive(Debug, Clone, Copy)]
struct Emitted {
    start: usize,
    width: ByteWidth,
}

/// Emits a finished structure tree into a byte buffer.
pub(crate) struct Serializer<'a> {
    arena: &'a [Structure],
    buf: &'a mut BytesMut,
    emitted: Vec<Option<Emitted>>,
}

impl<'a> Serializer<'a> {
    pub fn new(arena: &'a [Structure], buf: &'a mut BytesMut) -> Serializer<'a> {
        Serializer {
            emitted: vec![None; arena.len()],
            arena,
            buf,
        }
    }

    /// Emits the root's body, the root slot, and the two-byte trailer.
    pub fn run(mut self, root_id: StructId) -> Result<(), FlexError> {
        let arena = self.arena;
        let root = &arena[root_id];
        let elem = root.elems.first().ok_or_else(|| {
            FlexError::Shape("nothing was built: the root holds no value".into())
        })?;

        let (width, descriptor) = match elem.child {
            None => {
                let width = elem.width;
                elem.write_scalar(self.buf, width);
                (width, pack(elem.ty, width))
            }
            Some(child) => {
                // The root's child skips the usual exit padding.
                let child_info = self.emit(child, false)?;
                let slot = self.buf.len();
                let distance = (slot - child_info.start) as u64;
                let width = descriptor::uint_width(distance);
                put_uint(self.buf, distance, width);
                (width, pack(elem.ty, child_info.width))
            }
        };
        self.buf.put_u8(descriptor);
        self.buf.put_u8(width.bytes() as u8);
        Ok(())
    }

    fn emit(&mut self, id: StructId, pad: bool) -> Result<Emitted, FlexError> {
        let arena = self.arena;
        let s = &arena[id];

        // Children land first; a map's key vector goes after the value
        // children and right before the map body.
        for elem in &s.elems {
            if let Some(child) = elem.child {
                self.emit(child, true)?;
            }
        }
        let kv_info = match s.keys {
            Some(kv) => Some(self.emit(kv, true)?),
            None => None,
        };

        let info = if s.ty.is_blob_like() {
            self.emit_blob_like(s)
        } else {
            self.emit_container(s, kv_info)?
        };

        if pad && !s.is_empty() {
            pad_to(self.buf, info.width);
        }
        trace!(ty = %s.ty, width = info.width.bytes(), index0 = info.start, "emitted structure");
        self.emitted[id] = Some(info);
        Ok(info)
    }

    /// Blob/string/key bodies: `[size?] [bytes] [terminator?]`. The content
    /// is raw bytes; only the size prefix takes the container width.
    fn emit_blob_like(&mut self, s: &Structure) -> Emitted {
        let width = match s.ty {
            VarType::Key => ByteWidth::W1,
            _ => descriptor::uint_width(s.data.len() as u64),
        };
        if s.ty != VarType::Key {
            put_uint(self.buf, s.data.len() as u64, width);
        }
        let start = self.buf.len();
        self.buf.put_slice(&s.data);
        if matches!(s.ty, VarType::String | VarType::Key) {
            self.buf.put_u8(0);
        }
        Emitted { start, width }
    }

    /// Vector, typed vector, fixed-typed vector and map bodies:
    /// `[kv_offset kv_width]? [size]? [slots...] [type table]?`.
    fn emit_container(
        &mut self,
        s: &Structure,
        kv_info: Option<Emitted>,
    ) -> Result<Emitted, FlexError> {
        let count = s.elems.len();
        let has_prefix = s.ty.has_size_prefix();
        let pre_slots = usize::from(has_prefix) + if kv_info.is_some() { 2 } else { 0 };
        let cursor = self.buf.len();

        let mut width = ByteWidth::W1;
        for elem in &s.elems {
            if elem.child.is_none() && elem.width > width {
                width = elem.width;
            }
        }
        if has_prefix {
            width = width.max(descriptor::uint_width(count as u64));
        }
        loop {
            let w = width.bytes();
            let index0 = cursor + pre_slots * w;
            let mut need = width;
            if let Some(kv) = kv_info {
                need = need.max(descriptor::uint_width((cursor - kv.start) as u64));
            }
            for (i, elem) in s.elems.iter().enumerate() {
                if let Some(child) = elem.child {
                    let slot = index0 + i * w;
                    let start = self.child_info(child).start;
                    need = need.max(descriptor::uint_width((slot - start) as u64));
                }
            }
            if need == width {
                break;
            }
            width = need;
        }

        if let Some(kv) = kv_info {
            put_uint(self.buf, (cursor - kv.start) as u64, width);
            put_uint(self.buf, kv.width.bytes() as u64, width);
        }
        if has_prefix {
            put_uint(self.buf, count as u64, width);
        }
        let index0 = self.buf.len();
        for (i, elem) in s.elems.iter().enumerate() {
            match elem.child {
                None => elem.write_scalar(self.buf, width),
                Some(child) => {
                    let slot = index0 + i * width.bytes();
                    let distance = (slot - self.child_info(child).start) as u64;
                    put_uint(self.buf, distance, width);
                }
            }
        }
        if matches!(s.ty, VarType::Vector | VarType::Map) {
            for elem in &s.elems {
                let elem_width = match elem.child {
                    None => width,
                    Some(child) => self.child_info(child).width,
                };
                self.buf.put_u8(pack(elem.ty, elem_width));
            }
        }
        Ok(Emitted { start: index0, width })
    }

    fn child_info(&self, id: StructId) -> Emitted {
        // emit() visits children before the structure that references them.
        self.emitted[id].expect("children are serialized before their parents")
    }
}

fn put_uint(buf: &mut BytesMut, value: u64, width: ByteWidth) {
    buf.put_slice(&value.to_le_bytes()[..width.bytes()]);
}

/// Pads with zeros up to a multiple of `width` bytes.
fn pad_to(buf: &mut BytesMut, width: ByteWidth) {
    let padding = buf.len().wrapping_neg() & (width.bytes() - 1);
    buf.put_bytes(0, padding);
}
