//! Label scheme construction and name-keyed remapping.
//!
//! Two jobs live here:
//!
//! 1. [`build_category_table`] turns a raw source's category list into a
//!    dense [`IndexTable`], under an explicit [`OrderPolicy`].
//! 2. [`build_mapping`] matches two tables by exact name and produces the
//!    old-index → new-index [`IndexMapping`] the rewriter applies.
//!
//! Neither guesses a default policy. The same categories built in declared
//! and in id-sorted order are different, internally consistent schemes, so a
//! caller picks one and keeps it for the lifetime of the labels it writes.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use serde::Serialize;

use crate::ir::{Category, CategoryId, ClassIndex, IndexTable};

/// Order in which source categories receive dense indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum OrderPolicy {
    /// The order the source lists them in.
    Declared,
    /// Ascending source category id (stable for equal ids).
    SortedBySourceId,
}

/// What to do with a label whose old index has no counterpart in the new
/// scheme.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum UnmappedPolicy {
    /// Remove the line.
    Drop,
    /// Keep the line with its old index.
    Keep,
}

/// A dense table built from source categories, plus the source id lookup
/// used while rewriting annotations.
#[derive(Clone, Debug)]
pub struct CategoryTable {
    table: IndexTable,
    by_source_id: BTreeMap<CategoryId, ClassIndex>,
    policy: OrderPolicy,
}

impl CategoryTable {
    pub fn table(&self) -> &IndexTable {
        &self.table
    }

    pub fn policy(&self) -> OrderPolicy {
        self.policy
    }

    /// Dense index for a source category id.
    pub fn index_of(&self, id: CategoryId) -> Option<ClassIndex> {
        self.by_source_id.get(&id).copied()
    }
}

/// Densifies source categories into `0..N` in the order `policy` dictates.
///
/// A repeated source id keeps its first index; the repeat still occupies a
/// slot so the table stays aligned with the category list.
pub fn build_category_table(categories: &[Category], policy: OrderPolicy) -> CategoryTable {
    let mut ordered: Vec<&Category> = categories.iter().collect();
    if policy == OrderPolicy::SortedBySourceId {
        ordered.sort_by_key(|cat| cat.id);
    }

    let mut by_source_id = BTreeMap::new();
    for (index, category) in ordered.iter().enumerate() {
        if by_source_id.contains_key(&category.id) {
            log::warn!(
                "category id {} ('{}') is declared more than once; keeping its first index",
                category.id,
                category.name
            );
            continue;
        }
        by_source_id.insert(category.id, ClassIndex::new(index));
    }

    CategoryTable {
        table: IndexTable::from_names(ordered.iter().map(|cat| cat.name.clone())),
        by_source_id,
        policy,
    }
}

/// Old-index → new-index correspondence between two label schemes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct IndexMapping {
    pairs: BTreeMap<ClassIndex, ClassIndex>,
    unmapped: Vec<(ClassIndex, String)>,
    ambiguous: Vec<String>,
}

/// Outcome of looking up one old index.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Mapped(ClassIndex),
    KeptUnmapped(ClassIndex),
    Dropped,
}

impl IndexMapping {
    /// A mapping from explicit pairs, with nothing recorded as unmapped.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (usize, usize)>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(old, new)| (ClassIndex::new(old), ClassIndex::new(new)))
                .collect(),
            ..Default::default()
        }
    }

    pub fn get(&self, old: ClassIndex) -> Option<ClassIndex> {
        self.pairs.get(&old).copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ClassIndex, ClassIndex)> + '_ {
        self.pairs.iter().map(|(old, new)| (*old, *new))
    }

    /// Old entries whose name the new scheme lacks.
    pub fn unmapped(&self) -> &[(ClassIndex, String)] {
        &self.unmapped
    }

    /// Matched names that the new scheme carries more than once.
    pub fn ambiguous_names(&self) -> &[String] {
        &self.ambiguous
    }

    /// Applies `policy` to one old index.
    pub fn resolve(&self, old: ClassIndex, policy: UnmappedPolicy) -> Resolution {
        match (self.get(old), policy) {
            (Some(new), _) => Resolution::Mapped(new),
            (None, UnmappedPolicy::Keep) => Resolution::KeptUnmapped(old),
            (None, UnmappedPolicy::Drop) => Resolution::Dropped,
        }
    }
}

impl fmt::Display for IndexMapping {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Mapped {} class(es); {} without a counterpart",
            self.pairs.len(),
            self.unmapped.len()
        )?;
        for (index, name) in &self.unmapped {
            writeln!(f, "  unmapped {index}: {name}")?;
        }
        for name in &self.ambiguous {
            writeln!(f, "  ambiguous '{name}': resolved to its last index")?;
        }
        Ok(())
    }
}

/// Matches `old` against `new` by exact name.
///
/// Every `(old_index, name)` whose name also appears in `new` maps to
/// `new.index_of(name)`. The rest are left out and listed in
/// [`IndexMapping::unmapped`]; partial coverage is expected, not an error.
///
/// ```
/// use taxolabel::ir::{ClassIndex, IndexTable};
/// use taxolabel::remap::build_mapping;
///
/// let old = IndexTable::from_names(["car", "truck", "bike"]);
/// let new = IndexTable::from_names(["vehicles", "car", "truck"]);
/// let mapping = build_mapping(&old, &new);
///
/// assert_eq!(mapping.get(ClassIndex::new(0)), Some(ClassIndex::new(1)));
/// assert_eq!(mapping.get(ClassIndex::new(1)), Some(ClassIndex::new(2)));
/// assert_eq!(mapping.get(ClassIndex::new(2)), None);
/// ```
pub fn build_mapping(old: &IndexTable, new: &IndexTable) -> IndexMapping {
    let duplicated: HashSet<&str> = new.duplicate_names().into_iter().collect();
    let mut reported: HashSet<&str> = HashSet::new();
    let mut mapping = IndexMapping::default();

    for (old_index, name) in old.iter() {
        match new.index_of(name) {
            Some(new_index) => {
                mapping.pairs.insert(old_index, new_index);
                if duplicated.contains(name) && reported.insert(name) {
                    mapping.ambiguous.push(name.to_string());
                }
            }
            None => mapping.unmapped.push((old_index, name.to_string())),
        }
    }

    log::debug!(
        "built index mapping: {} mapped, {} unmapped, {} ambiguous",
        mapping.pairs.len(),
        mapping.unmapped.len(),
        mapping.ambiguous.len()
    );
    mapping
}
