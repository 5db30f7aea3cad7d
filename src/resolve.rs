//! Name index and field-to-column resolution.

use std::collections::HashMap;

use crate::field::FieldDescriptor;

/// Mapping from resolved field name to column position, usually built from a header row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NameIndex {
    positions: HashMap<String, usize>,
}

impl NameIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from a header row. The first occurrence of a repeated name wins.
    pub fn from_header<S: AsRef<str>>(header: &[S]) -> Self {
        let mut positions = HashMap::with_capacity(header.len());
        for (position, name) in header.iter().enumerate() {
            positions
                .entry(name.as_ref().to_string())
                .or_insert(position);
        }

        NameIndex { positions }
    }

    /// Sets the position of `name`, replacing any previous one.
    pub fn insert(&mut self, name: impl Into<String>, position: usize) -> &mut Self {
        self.positions.insert(name.into(), position);
        self
    }

    pub fn get(&self, name: &str) -> Option<usize> {
        self.positions.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, usize)> for NameIndex {
    fn from_iter<T: IntoIterator<Item = (K, usize)>>(iter: T) -> Self {
        NameIndex {
            positions: iter.into_iter().map(|(k, v)| (k.into(), v)).collect(),
        }
    }
}

impl From<HashMap<String, usize>> for NameIndex {
    fn from(positions: HashMap<String, usize>) -> Self {
        NameIndex { positions }
    }
}

/// Column position for `field`, looked up by its resolved name. `None` means the field is
/// not present in the input and is skipped.
pub fn resolve(field: &FieldDescriptor, index: &NameIndex) -> Option<usize> {
    index.get(field.resolved_name())
}
