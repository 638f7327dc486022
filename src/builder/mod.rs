//! Write side: the stack-based builder and the wire serializer.

pub(crate) mod element;
mod serialize;
pub(crate) mod structure;

use bytes::{Bytes, BytesMut};
use tracing::debug;

use crate::descriptor::VarType;
use crate::error::FlexError;
use element::{Element, StructId};
use serialize::Serializer;
use structure::Structure;

const ROOT_ID: StructId = 0;

/// Assembles a FlexBuffers value tree and serializes it.
///
/// Scalars are registered into the innermost open container; `start_*`
/// operations open a new container on the stack and `end` closes it. Inside
/// a map every operation takes the `_with_key` form. Once the stack is back
/// at the synthetic root the builder is finished and `serialize` emits the
/// buffer.
///
/// ```
/// use flexr::Builder;
///
/// let mut b = Builder::new();
/// b.start_map().unwrap();
/// b.int_with_key("answer", 42).unwrap();
/// b.end().unwrap();
/// b.finish().unwrap();
/// let buffer = b.serialize().unwrap();
/// assert_eq!(buffer.last(), Some(&1));
/// ```
pub struct Builder {
    arena: Vec<Structure>,
    stack: Vec<StructId>,
    finished: bool,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            arena: vec![Structure::root()],
            stack: Vec::new(),
            finished: false,
        }
    }

    /// The innermost open container, or the synthetic root.
    fn head(&self) -> StructId {
        self.stack.last().copied().unwrap_or(ROOT_ID)
    }

    fn ensure_open(&self) -> Result<(), FlexError> {
        if self.finished {
            return Err(FlexError::Shape("the builder is already finished".into()));
        }
        Ok(())
    }

    fn alloc(&mut self, s: Structure) -> StructId {
        let id = self.arena.len();
        self.arena.push(s);
        id
    }

    /// Validates a keyed operation against the current head and returns the
    /// head's key vector.
    fn map_check(&self, head: StructId, key: &str) -> Result<StructId, FlexError> {
        let target = &self.arena[head];
        let Some(kv_id) = target.keys else {
            return Err(FlexError::Shape(format!(
                "{} does not support keyed entries",
                target.name()
            )));
        };
        if key.is_empty() {
            return Err(FlexError::Key("empty keys are not allowed".into()));
        }
        if structure::contains_key(&self.arena, kv_id, key.as_bytes()) {
            return Err(FlexError::Key(format!("duplicate key {key:?}")));
        }
        Ok(kv_id)
    }

    /// Inserts a keyed entry, keeping keys byte-sorted and the value slots
    /// aligned with them.
    fn map_insert(&mut self, head: StructId, key: &str, elem: Element) -> Result<(), FlexError> {
        let kv_id = self.map_check(head, key)?;
        self.arena[head].admit(&elem)?;
        let index = structure::insertion_index(&self.arena, kv_id, key.as_bytes());
        let key_id = self.alloc(Structure::key(key.as_bytes()));
        self.arena[kv_id].insert(Element::offset(VarType::Key, key_id), index)?;
        self.arena[head].insert(elem, index)?;
        Ok(())
    }

    /// Registers a scalar element into the current head.
    pub(crate) fn register(&mut self, key: Option<&str>, elem: Element) -> Result<(), FlexError> {
        self.ensure_open()?;
        let head = self.head();
        match key {
            Some(key) => self.map_insert(head, key, elem),
            None => {
                if self.arena[head].ty == VarType::Map {
                    return Err(FlexError::Shape("map entries require a key".into()));
                }
                self.arena[head].push(elem)?;
                if head == ROOT_ID {
                    self.finished = true;
                }
                Ok(())
            }
        }
    }

    /// Attaches a new container to the current head and makes it the head.
    pub(crate) fn start_container(
        &mut self,
        key: Option<&str>,
        s: Structure,
    ) -> Result<(), FlexError> {
        self.ensure_open()?;
        let head = self.head();
        let ty = s.ty;
        match key {
            None => {
                if self.arena[head].ty == VarType::Map {
                    return Err(FlexError::Shape("map entries require a key".into()));
                }
                self.arena[head].admit(&Element::offset(ty, ROOT_ID))?;
                let id = self.alloc(s);
                self.arena[head].push(Element::offset(ty, id))?;
                self.stack.push(id);
            }
            Some(key) => {
                self.map_check(head, key)?;
                let id = self.alloc(s);
                self.map_insert(head, key, Element::offset(ty, id))?;
                self.stack.push(id);
            }
        }
        Ok(())
    }

    pub(crate) fn start_map_at(&mut self, key: Option<&str>) -> Result<(), FlexError> {
        let keys = self.alloc(Structure::new(VarType::VectorKey));
        self.start_container(key, Structure::map(keys))
    }

    // Scalars.

    pub fn int(&mut self, value: i64) -> Result<(), FlexError> {
        self.register(None, Element::int(value))
    }

    pub fn int_with_key(&mut self, key: &str, value: i64) -> Result<(), FlexError> {
        self.register(Some(key), Element::int(value))
    }

    pub fn uint(&mut self, value: u64) -> Result<(), FlexError> {
        self.register(None, Element::uint(value))
    }

    pub fn uint_with_key(&mut self, key: &str, value: u64) -> Result<(), FlexError> {
        self.register(Some(key), Element::uint(value))
    }

    pub fn float(&mut self, value: f64) -> Result<(), FlexError> {
        self.register(None, Element::float(value))
    }

    pub fn float_with_key(&mut self, key: &str, value: f64) -> Result<(), FlexError> {
        self.register(Some(key), Element::float(value))
    }

    pub fn bool(&mut self, value: bool) -> Result<(), FlexError> {
        self.register(None, Element::boolean(value))
    }

    pub fn bool_with_key(&mut self, key: &str, value: bool) -> Result<(), FlexError> {
        self.register(Some(key), Element::boolean(value))
    }

    pub fn null(&mut self) -> Result<(), FlexError> {
        self.register(None, Element::null())
    }

    pub fn null_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.register(Some(key), Element::null())
    }

    // Vectors and maps.

    pub fn start_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::Vector))
    }

    pub fn start_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::Vector))
    }

    pub fn start_int_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::VectorInt))
    }

    pub fn start_int_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::VectorInt))
    }

    pub fn start_uint_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::VectorUInt))
    }

    pub fn start_uint_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::VectorUInt))
    }

    pub fn start_float_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::VectorFloat))
    }

    pub fn start_float_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::VectorFloat))
    }

    pub fn start_bool_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::VectorBool))
    }

    pub fn start_bool_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::VectorBool))
    }

    pub fn start_key_vector(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::VectorKey))
    }

    pub fn start_key_vector_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::VectorKey))
    }

    pub fn start_map(&mut self) -> Result<(), FlexError> {
        self.start_map_at(None)
    }

    pub fn start_map_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_map_at(Some(key))
    }

    /// Opens a fixed-arity int vector: arity 1 is an indirect scalar,
    /// 2/3/4 are the tuple/triple/quad shapes.
    pub fn start_fixed_int_vector(&mut self, arity: usize) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::Int, arity)?;
        self.start_container(None, Structure::new(ty))
    }

    pub fn start_fixed_int_vector_with_key(
        &mut self,
        key: &str,
        arity: usize,
    ) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::Int, arity)?;
        self.start_container(Some(key), Structure::new(ty))
    }

    pub fn start_fixed_uint_vector(&mut self, arity: usize) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::UInt, arity)?;
        self.start_container(None, Structure::new(ty))
    }

    pub fn start_fixed_uint_vector_with_key(
        &mut self,
        key: &str,
        arity: usize,
    ) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::UInt, arity)?;
        self.start_container(Some(key), Structure::new(ty))
    }

    pub fn start_fixed_float_vector(&mut self, arity: usize) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::Float, arity)?;
        self.start_container(None, Structure::new(ty))
    }

    pub fn start_fixed_float_vector_with_key(
        &mut self,
        key: &str,
        arity: usize,
    ) -> Result<(), FlexError> {
        let ty = fixed_vector_type(VarType::Float, arity)?;
        self.start_container(Some(key), Structure::new(ty))
    }

    // Strings, keys and blobs.

    pub fn start_string(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::String))
    }

    pub fn start_string_with_key(&mut self, key: &str) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::new(VarType::String))
    }

    /// Registers a complete string value.
    pub fn string(&mut self, value: &str) -> Result<(), FlexError> {
        self.start_container(None, Structure::with_data(VarType::String, value.as_bytes()))?;
        self.end()
    }

    pub fn string_with_key(&mut self, key: &str, value: &str) -> Result<(), FlexError> {
        self.start_container(
            Some(key),
            Structure::with_data(VarType::String, value.as_bytes()),
        )?;
        self.end()
    }

    pub fn start_key(&mut self) -> Result<(), FlexError> {
        self.start_container(None, Structure::new(VarType::Key))
    }

    /// Registers a complete key value (an entry of a key vector).
    pub fn key(&mut self, value: &str) -> Result<(), FlexError> {
        self.start_container(None, Structure::key(value.as_bytes()))?;
        self.end()
    }

    /// Opens a blob with its initial content; more bytes may be appended
    /// before `end`.
    pub fn start_blob(&mut self, content: &[u8]) -> Result<(), FlexError> {
        self.start_container(None, Structure::with_data(VarType::Blob, content))
    }

    pub fn start_blob_with_key(&mut self, key: &str, content: &[u8]) -> Result<(), FlexError> {
        self.start_container(Some(key), Structure::with_data(VarType::Blob, content))
    }

    /// Registers a complete blob value.
    pub fn blob(&mut self, content: &[u8]) -> Result<(), FlexError> {
        self.start_blob(content)?;
        self.end()
    }

    pub fn blob_with_key(&mut self, key: &str, content: &[u8]) -> Result<(), FlexError> {
        self.start_blob_with_key(key, content)?;
        self.end()
    }

    /// Appends bytes to the open string or blob on top of the stack.
    pub fn append(&mut self, bytes: &[u8]) -> Result<(), FlexError> {
        self.ensure_open()?;
        if self.stack.is_empty() {
            return Err(FlexError::Shape("no container is open".into()));
        }
        let head = self.head();
        match self.arena[head].ty {
            VarType::String | VarType::Blob => {
                self.arena[head].data.extend_from_slice(bytes);
                Ok(())
            }
            ty => Err(FlexError::Shape(format!("cannot append bytes to a {ty}"))),
        }
    }

    // Lifecycle.

    /// Closes the innermost open container.
    pub fn end(&mut self) -> Result<(), FlexError> {
        self.ensure_open()?;
        match self.stack.pop() {
            Some(_) => {
                if self.stack.is_empty() {
                    self.finished = true;
                }
                Ok(())
            }
            None => Err(FlexError::Shape("no container is open".into())),
        }
    }

    /// Marks the builder finished. Fails while containers are still open;
    /// a no-op once finished.
    pub fn finish(&mut self) -> Result<(), FlexError> {
        if self.finished {
            return Ok(());
        }
        if self.stack.is_empty() {
            self.finished = true;
            return Ok(());
        }
        Err(FlexError::Shape(format!(
            "{} container(s) still open",
            self.stack.len()
        )))
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Serializes the finished tree into `buf`.
    pub fn serialize_into(&self, buf: &mut BytesMut) -> Result<(), FlexError> {
        if !self.finished {
            return Err(FlexError::Shape(
                "serialize requires a finished builder".into(),
            ));
        }
        Serializer::new(&self.arena, buf).run(ROOT_ID)?;
        debug!(len = buf.len(), "serialized flexbuffer");
        Ok(())
    }

    /// Serializes the finished tree and returns the buffer.
    pub fn serialize(&self) -> Result<Bytes, FlexError> {
        let mut buf = BytesMut::new();
        self.serialize_into(&mut buf)?;
        Ok(buf.freeze())
    }
}

impl Default for Builder {
    fn default() -> Builder {
        Builder::new()
    }
}

fn fixed_vector_type(base: VarType, arity: usize) -> Result<VarType, FlexError> {
    let ty = match (base, arity) {
        (VarType::Int, 1) => VarType::IndirectInt,
        (VarType::UInt, 1) => VarType::IndirectUInt,
        (VarType::Float, 1) => VarType::IndirectFloat,
        (VarType::Int, 2) => VarType::VectorInt2,
        (VarType::UInt, 2) => VarType::VectorUInt2,
        (VarType::Float, 2) => VarType::VectorFloat2,
        (VarType::Int, 3) => VarType::VectorInt3,
        (VarType::UInt, 3) => VarType::VectorUInt3,
        (VarType::Float, 3) => VarType::VectorFloat3,
        (VarType::Int, 4) => VarType::VectorInt4,
        (VarType::UInt, 4) => VarType::VectorUInt4,
        (VarType::Float, 4) => VarType::VectorFloat4,
        _ => {
            return Err(FlexError::Shape(format!(
                "no fixed {base} vector of arity {arity}"
            )))
        }
    };
    Ok(ty)
}
