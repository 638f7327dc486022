//! Single-pass scanners over vectors and maps.
//!
//! Scanners are plain iterators; restart one by constructing a fresh scanner
//! from the parent reference.

use crate::error::FlexError;
use crate::reader::Reference;

/// Iterates a vector's elements in slot order.
pub struct VecScanner<'a> {
    parent: Reference<'a>,
    index: usize,
}

impl<'a> VecScanner<'a> {
    pub(crate) fn new(parent: Reference<'a>) -> VecScanner<'a> {
        VecScanner { parent, index: 0 }
    }
}

impl<'a> Iterator for VecScanner<'a> {
    type Item = Result<Reference<'a>, FlexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.parent.len() {
            return None;
        }
        let item = self.parent.index(self.index);
        self.index += 1;
        Some(item)
    }
}

/// Iterates a map's entries in ascending key-byte order.
pub struct MapScanner<'a> {
    parent: Reference<'a>,
    keys: Reference<'a>,
    index: usize,
}

impl<'a> MapScanner<'a> {
    pub(crate) fn new(parent: Reference<'a>, keys: Reference<'a>) -> MapScanner<'a> {
        MapScanner {
            parent,
            keys,
            index: 0,
        }
    }
}

impl<'a> Iterator for MapScanner<'a> {
    type Item = Result<(&'a str, Reference<'a>), FlexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.parent.len() {
            return None;
        }
        let index = self.index;
        self.index += 1;
        let entry = self
            .keys
            .index(index)
            .and_then(|k| k.as_str())
            .and_then(|key| self.parent.index(index).map(|value| (key, value)));
        Some(entry)
    }
}
