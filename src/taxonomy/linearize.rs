//! Canonical indexing of taxonomy nodes.
//!
//! Every node, group or leaf, receives the next index in depth-first
//! pre-order with children visited in declaration order. The index therefore
//! encodes visit order only, not depth or degree, and re-running on an
//! unchanged taxonomy yields the same table.

use super::{Taxonomy, TaxonomyNode};
use crate::ir::IndexTable;

/// Linearizes a taxonomy into a dense index table.
///
/// ```
/// use taxolabel::taxonomy::{linearize, Taxonomy};
///
/// let taxonomy = Taxonomy::from_yaml_str("class_dag:\n  vehicles: [car, truck]\n", "class_dag")?;
/// let table = linearize(&taxonomy);
/// assert_eq!(table.names(), ["vehicles", "car", "truck"]);
/// # Ok::<(), taxolabel::TaxolabelError>(())
/// ```
pub fn linearize(taxonomy: &Taxonomy) -> IndexTable {
    let names = taxonomy
        .roots()
        .iter()
        .fold(Vec::with_capacity(taxonomy.node_count()), visit);
    IndexTable::from_names(names)
}

// The accumulator's length is the next free index.
fn visit(mut names: Vec<String>, node: &TaxonomyNode) -> Vec<String> {
    names.push(node.name().to_string());
    node.children().iter().fold(names, visit)
}
