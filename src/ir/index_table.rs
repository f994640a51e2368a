//! Canonical index tables.
//!
//! An [`IndexTable`] is a label scheme: a dense `0..N` run of indices, each
//! naming one class. Both the taxonomy linearizer and the category index
//! builder produce one, and the remapper consumes two.

use std::collections::HashMap;

use serde::Serialize;

use super::ClassIndex;

/// Dense index → name table with a name → index inverse.
///
/// Names need not be unique. The inverse resolves a repeated name to its
/// last (highest) index; [`IndexTable::duplicate_names`] lists the repeats.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IndexTable {
    names: Vec<String>,
    #[serde(skip)]
    lookup: HashMap<String, ClassIndex>,
}

impl IndexTable {
    /// Builds a table assigning indices in iteration order.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        let mut lookup = HashMap::with_capacity(names.len());
        for (index, name) in names.iter().enumerate() {
            lookup.insert(name.clone(), ClassIndex::new(index));
        }
        Self { names, lookup }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Name at `index`, if in range.
    pub fn name(&self, index: ClassIndex) -> Option<&str> {
        self.names.get(index.as_usize()).map(String::as_str)
    }

    /// Last index carrying `name`.
    pub fn index_of(&self, name: &str) -> Option<ClassIndex> {
        self.lookup.get(name).copied()
    }

    pub fn contains_name(&self, name: &str) -> bool {
        self.lookup.contains_key(name)
    }

    /// Iterates `(index, name)` pairs in index order.
    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, &str)> {
        self.names
            .iter()
            .enumerate()
            .map(|(index, name)| (ClassIndex::new(index), name.as_str()))
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Names carried by more than one index, in first-occurrence order.
    pub fn duplicate_names(&self) -> Vec<&str> {
        let mut seen: HashMap<&str, usize> = HashMap::new();
        let mut duplicates = Vec::new();
        for name in &self.names {
            let count = seen.entry(name.as_str()).or_insert(0);
            *count += 1;
            if *count == 2 {
                duplicates.push(name.as_str());
            }
        }
        duplicates
    }
}
