//! Dynamically typed FlexBuffers values.
//!
//! `FlexValue` is the tagged-variant counterpart of the builder's operation
//! set: [`Builder::push_value`] walks a value tree and issues the matching
//! operations, and [`Reference::to_value`] unpacks any buffer subtree back
//! into an owned tree.

use std::collections::BTreeMap;

use crate::builder::element::Element;
use crate::builder::structure::Structure;
use crate::builder::Builder;
use crate::descriptor::VarType;
use crate::error::FlexError;
use crate::reader::Reference;

/// Map alias: `BTreeMap` iterates in ascending key-byte order, matching the
/// wire's packed key vector.
pub type FlexMap = BTreeMap<String, FlexValue>;

/// A dynamically typed FlexBuffers value tree.
#[derive(Debug, Clone, PartialEq)]
pub enum FlexValue {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    Blob(Vec<u8>),
    /// Heterogeneous vector; serialized with a type table.
    Vector(Vec<FlexValue>),
    IntVector(Vec<i64>),
    UintVector(Vec<u64>),
    FloatVector(Vec<f64>),
    BoolVector(Vec<bool>),
    Map(FlexMap),
}

impl FlexValue {
    /// Returns the value as a string slice, if it is a `String` variant.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the value as an i64, if it is an `Int` variant.
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl Builder {
    /// Walks a dynamic value tree and issues the matching builder
    /// operations: scalars register inline, strings/blobs become one-shot
    /// containers, vectors and maps open, recurse and close.
    pub fn push_value(&mut self, value: &FlexValue) -> Result<(), FlexError> {
        self.push_value_at(None, value)
    }

    fn push_value_at(&mut self, key: Option<&str>, value: &FlexValue) -> Result<(), FlexError> {
        match value {
            FlexValue::Null => self.register(key, Element::null()),
            FlexValue::Bool(v) => self.register(key, Element::boolean(*v)),
            FlexValue::Int(v) => self.register(key, Element::int(*v)),
            FlexValue::UInt(v) => self.register(key, Element::uint(*v)),
            FlexValue::Float(v) => self.register(key, Element::float(*v)),
            FlexValue::String(s) => {
                self.start_container(key, Structure::with_data(VarType::String, s.as_bytes()))?;
                self.end()
            }
            FlexValue::Blob(b) => {
                self.start_container(key, Structure::with_data(VarType::Blob, b))?;
                self.end()
            }
            FlexValue::Vector(items) => {
                self.start_container(key, Structure::new(VarType::Vector))?;
                for item in items {
                    self.push_value_at(None, item)?;
                }
                self.end()
            }
            FlexValue::IntVector(items) => {
                self.start_container(key, Structure::new(VarType::VectorInt))?;
                for item in items {
                    self.register(None, Element::int(*item))?;
                }
                self.end()
            }
            FlexValue::UintVector(items) => {
                self.start_container(key, Structure::new(VarType::VectorUInt))?;
                for item in items {
                    self.register(None, Element::uint(*item))?;
                }
                self.end()
            }
            FlexValue::FloatVector(items) => {
                self.start_container(key, Structure::new(VarType::VectorFloat))?;
                for item in items {
                    self.register(None, Element::float(*item))?;
                }
                self.end()
            }
            FlexValue::BoolVector(items) => {
                self.start_container(key, Structure::new(VarType::VectorBool))?;
                for item in items {
                    self.register(None, Element::boolean(*item))?;
                }
                self.end()
            }
            FlexValue::Map(entries) => {
                self.start_map_at(key)?;
                for (k, v) in entries {
                    self.push_value_at(Some(k), v)?;
                }
                self.end()
            }
        }
    }
}

impl<'a> Reference<'a> {
    /// Unpacks this value and everything beneath it into an owned tree.
    ///
    /// Accessors are probed from narrow to wide: scalars, strings and blobs,
    /// typed slices, then untyped vectors and maps. Key vectors and the
    /// deprecated string-vector tag unpack as vectors of strings. A tag
    /// matching no accessor reports corruption.
    pub fn to_value(&self) -> Result<FlexValue, FlexError> {
        match self.var_type() {
            VarType::Null => Ok(FlexValue::Null),
            VarType::Int => Ok(FlexValue::Int(self.as_int()?)),
            VarType::UInt => Ok(FlexValue::UInt(self.as_uint()?)),
            VarType::Float => Ok(FlexValue::Float(self.as_float()?)),
            VarType::Bool => Ok(FlexValue::Bool(self.as_bool()?)),
            VarType::String | VarType::Key => Ok(FlexValue::String(self.as_str()?.to_owned())),
            VarType::Blob => Ok(FlexValue::Blob(self.as_blob()?.to_vec())),
            ty if ty.typed_element() == Some(VarType::Int) => {
                Ok(FlexValue::IntVector(self.int_slice()?))
            }
            ty if ty.typed_element() == Some(VarType::UInt) => {
                Ok(FlexValue::UintVector(self.uint_slice()?))
            }
            ty if ty.typed_element() == Some(VarType::Float) => {
                Ok(FlexValue::FloatVector(self.float_slice()?))
            }
            VarType::VectorBool => Ok(FlexValue::BoolVector(self.bool_slice()?)),
            VarType::VectorKey | VarType::VectorStringDeprecated => {
                let mut items = Vec::with_capacity(self.len());
                for i in 0..self.len() {
                    items.push(FlexValue::String(self.index(i)?.as_str()?.to_owned()));
                }
                Ok(FlexValue::Vector(items))
            }
            VarType::Vector => {
                let mut items = Vec::with_capacity(self.len());
                for i in 0..self.len() {
                    items.push(self.index(i)?.to_value()?);
                }
                Ok(FlexValue::Vector(items))
            }
            VarType::Map => {
                let keys = self.key_vector()?;
                let mut entries = FlexMap::new();
                for i in 0..self.len() {
                    let key = keys.index(i)?.as_str()?.to_owned();
                    entries.insert(key, self.index(i)?.to_value()?);
                }
                Ok(FlexValue::Map(entries))
            }
            ty => Err(FlexError::Corruption(format!(
                "no accessor matches a {ty} value"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn round_trip(value: &FlexValue) -> FlexValue {
        let mut b = Builder::new();
        b.push_value(value).unwrap();
        b.finish().unwrap();
        let buf = b.serialize().unwrap();
        Reference::new(&buf).unwrap().to_value().unwrap()
    }

    #[test]
    fn round_trip_scalars() {
        for value in [
            FlexValue::Null,
            FlexValue::Bool(true),
            FlexValue::Bool(false),
            FlexValue::Int(-42),
            FlexValue::Int(i64::MAX),
            FlexValue::UInt(u64::MAX),
            FlexValue::Float(10.25),
            FlexValue::Float(f64::MAX),
        ] {
            assert_eq!(round_trip(&value), value, "failed for {value:?}");
        }
    }

    #[test]
    fn round_trip_strings_and_blobs() {
        let value = FlexValue::String("alpha".into());
        assert_eq!(round_trip(&value), value);

        let value = FlexValue::String(String::new());
        assert_eq!(round_trip(&value), value);

        let value = FlexValue::Blob(vec![0xDE, 0xAD, 0xBE, 0xEF]);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn round_trip_vectors() {
        let value = FlexValue::Vector(vec![
            FlexValue::Int(10),
            FlexValue::Int(-20),
            FlexValue::Float(10.25),
            FlexValue::String("abc".into()),
        ]);
        assert_eq!(round_trip(&value), value);

        let value = FlexValue::IntVector(vec![1, 2, 3]);
        assert_eq!(round_trip(&value), value);

        let value = FlexValue::BoolVector(vec![true, false, true]);
        assert_eq!(round_trip(&value), value);

        let value = FlexValue::Vector(vec![]);
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn round_trip_maps_in_key_order() {
        let value = FlexValue::Map(FlexMap::from([
            ("one".to_string(), FlexValue::Int(1)),
            ("two".to_string(), FlexValue::Int(2)),
            ("three".to_string(), FlexValue::Int(3)),
        ]));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn round_trip_nested_structure() {
        let inner = FlexValue::Map(FlexMap::from([
            ("K1".to_string(), FlexValue::IntVector(vec![3, 2, 1])),
            ("K2".to_string(), FlexValue::String("XXX".into())),
            ("K3".to_string(), FlexValue::Int(i64::MAX)),
        ]));
        let value = FlexValue::Map(FlexMap::from([
            ("k1".to_string(), FlexValue::IntVector(vec![1, 2, 3])),
            ("k2".to_string(), inner),
            ("k3".to_string(), FlexValue::String("OK".into())),
        ]));
        assert_eq!(round_trip(&value), value);
    }

    #[test]
    fn key_vector_unpacks_as_strings() {
        let mut b = Builder::new();
        b.start_key_vector().unwrap();
        b.key("alpha").unwrap();
        b.key("beta").unwrap();
        b.end().unwrap();
        let buf = b.serialize().unwrap();
        let value = Reference::new(&buf).unwrap().to_value().unwrap();
        assert_eq!(
            value,
            FlexValue::Vector(vec![
                FlexValue::String("alpha".into()),
                FlexValue::String("beta".into()),
            ])
        );
    }

    #[test]
    fn accessors() {
        assert_eq!(FlexValue::String("x".into()).as_str(), Some("x"));
        assert_eq!(FlexValue::Int(3).as_int(), Some(3));
        assert_eq!(FlexValue::Int(3).as_str(), None);
        assert_eq!(FlexValue::Null.as_int(), None);
    }
}
