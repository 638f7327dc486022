//! Containers under construction and their admission rules.
//!
//! Every container is a flat tagged `Structure`; the per-subtype behavior
//! (allowed element types, fixed arity, blob content, map key vector) hangs
//! off the wire tag instead of a type hierarchy. Structures live in an arena
//! owned by the builder and refer to each other by index, so offset slots
//! stay valid however the element lists grow.

use crate::builder::element::{Element, StructId};
use crate::descriptor::VarType;
use crate::error::FlexError;

/// A container being assembled: element slots for vectors and maps, raw
/// content bytes for blobs/strings/keys, and the embedded key vector for maps.
#[derive(Debug)]
pub(crate) struct Structure {
    pub ty: VarType,
    /// The synthetic root accepts exactly one element.
    pub root: bool,
    /// Element slots (scalars and offsets) in wire order.
    pub elems: Vec<Element>,
    /// Blob/string/key content.
    pub data: Vec<u8>,
    /// Map only: arena id of the key vector.
    pub keys: Option<StructId>,
}

impl Structure {
    pub fn new(ty: VarType) -> Structure {
        Structure {
            ty,
            root: false,
            elems: Vec::new(),
            data: Vec::new(),
            keys: None,
        }
    }

    /// The synthetic root at the bottom of the builder stack.
    pub fn root() -> Structure {
        Structure {
            root: true,
            ..Structure::new(VarType::Null)
        }
    }

    pub fn with_data(ty: VarType, data: &[u8]) -> Structure {
        Structure {
            data: data.to_vec(),
            ..Structure::new(ty)
        }
    }

    pub fn key(content: &[u8]) -> Structure {
        Structure::with_data(VarType::Key, content)
    }

    pub fn map(keys: StructId) -> Structure {
        Structure {
            keys: Some(keys),
            ..Structure::new(VarType::Map)
        }
    }

    pub fn is_empty(&self) -> bool {
        self.elems.is_empty() && self.data.is_empty()
    }

    /// Name for error messages.
    pub fn name(&self) -> String {
        if self.root {
            "the root".into()
        } else {
            self.ty.to_string()
        }
    }

    /// Validates an element against this container's subtype rules.
    pub fn admit(&self, elem: &Element) -> Result<(), FlexError> {
        if self.root && !self.elems.is_empty() {
            return Err(FlexError::Shape(
                "the root holds exactly one value".into(),
            ));
        }
        if self.ty.is_blob_like() {
            // Blob-like content is a run of single bytes.
            if elem.ty != VarType::UInt {
                return Err(FlexError::Type(format!(
                    "cannot add a {} element to a {}",
                    elem.ty, self.ty
                )));
            }
            if elem.width.bytes() != 1 {
                return Err(FlexError::Type(format!(
                    "{} entries must be a single byte wide",
                    self.ty
                )));
            }
            return Ok(());
        }
        if let Some(base) = self.ty.typed_element() {
            if elem.ty != base {
                return Err(FlexError::Type(format!(
                    "cannot add a {} element to a {}",
                    elem.ty, self.ty
                )));
            }
        }
        if let Some(arity) = self.ty.fixed_arity() {
            if self.elems.len() >= arity {
                return Err(FlexError::Shape(format!(
                    "{} is full ({arity} element(s))",
                    self.ty
                )));
            }
        }
        Ok(())
    }

    /// Validates and inserts an element at `index` (clamped to the end).
    /// Blob-like containers take the element as one content byte.
    pub fn insert(&mut self, elem: Element, index: usize) -> Result<(), FlexError> {
        self.admit(&elem)?;
        if self.ty.is_blob_like() {
            self.data.push(elem.bytes[0]);
            return Ok(());
        }
        let index = index.min(self.elems.len());
        self.elems.insert(index, elem);
        Ok(())
    }

    /// Validates and appends an element.
    pub fn push(&mut self, elem: Element) -> Result<(), FlexError> {
        let end = self.elems.len();
        self.insert(elem, end)
    }
}

/// Content bytes of the `index`-th key of a key vector.
fn key_at<'a>(arena: &'a [Structure], kv: &Structure, index: usize) -> &'a [u8] {
    match kv.elems[index].child {
        Some(id) => &arena[id].data,
        None => &[],
    }
}

/// True if `key` is already present in the key vector.
pub(crate) fn contains_key(arena: &[Structure], kv_id: StructId, key: &[u8]) -> bool {
    let kv = &arena[kv_id];
    (0..kv.elems.len()).any(|i| key_at(arena, kv, i) == key)
}

/// Slot at which `key` keeps the key vector sorted by raw byte content.
pub(crate) fn insertion_index(arena: &[Structure], kv_id: StructId, key: &[u8]) -> usize {
    let kv = &arena[kv_id];
    let mut lower = 0;
    let mut upper = kv.elems.len();
    while lower < upper {
        let pivot = lower + (upper - lower) / 2;
        if key < key_at(arena, kv, pivot) {
            upper = pivot;
        } else {
            lower = pivot + 1;
        }
    }
    lower
}
