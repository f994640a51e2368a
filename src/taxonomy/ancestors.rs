//! Ancestor chains.
//!
//! Used to annotate a box with its full hierarchical label, e.g. a `car` box
//! in the `vehicles > road` branch reads `vehicles > road > car`.

use std::collections::HashMap;

use super::{Taxonomy, TaxonomyNode};
use crate::error::TaxolabelError;
use crate::ir::{ClassIndex, IndexTable};

/// Name → enclosing group names, outermost first.
///
/// Every node is recorded, groups included. A name that appears more than
/// once keeps the chain of its last occurrence in traversal order.
#[derive(Clone, Debug, Default)]
pub struct AncestorMap {
    chains: HashMap<String, Vec<String>>,
}

impl AncestorMap {
    /// Builds the map in one depth-first pass.
    pub fn build(taxonomy: &Taxonomy) -> Self {
        let mut chains = HashMap::with_capacity(taxonomy.node_count());
        let mut path = Vec::new();
        for root in taxonomy.roots() {
            record(root, &mut path, &mut chains);
        }
        Self { chains }
    }

    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.chains.contains_key(name)
    }

    /// Enclosing groups of `name`; empty for a top-level node.
    ///
    /// # Errors
    /// [`TaxolabelError::UnknownTaxonomyNode`] if `name` is not in the
    /// taxonomy.
    pub fn ancestors_of(&self, name: &str) -> Result<&[String], TaxolabelError> {
        self.chains
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| TaxolabelError::UnknownTaxonomyNode {
                name: name.to_string(),
            })
    }

    /// Ancestors followed by `name` itself: the root-to-node path.
    pub fn full_chain(&self, name: &str) -> Result<Vec<String>, TaxolabelError> {
        let mut chain = self.ancestors_of(name)?.to_vec();
        chain.push(name.to_string());
        Ok(chain)
    }

    /// Full chain for a class index of a label scheme.
    ///
    /// Names the table carries but the taxonomy does not (a flat class that
    /// was never placed in the hierarchy) resolve to just `[name]`.
    pub fn chain_for_index(
        &self,
        table: &IndexTable,
        index: ClassIndex,
    ) -> Result<Vec<String>, TaxolabelError> {
        let name = table
            .name(index)
            .ok_or(TaxolabelError::UnknownClassIndex {
                index: index.as_usize(),
                len: table.len(),
            })?;

        if self.contains(name) {
            self.full_chain(name)
        } else {
            Ok(vec![name.to_string()])
        }
    }
}

fn record(
    node: &TaxonomyNode,
    path: &mut Vec<String>,
    chains: &mut HashMap<String, Vec<String>>,
) {
    chains.insert(node.name().to_string(), path.clone());

    if node.is_leaf() {
        return;
    }

    path.push(node.name().to_string());
    for child in node.children() {
        record(child, path, chains);
    }
    path.pop();
}
