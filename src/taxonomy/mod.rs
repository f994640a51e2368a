//! Hierarchical class taxonomies.
//!
//! A taxonomy arrives as nested YAML under a root key (`class_dag` by
//! default): mappings name groups, sequences list members, and a sequence
//! item may itself be a mapping of further groups.
//!
//! ```yaml
//! class_dag:
//!   vehicles:
//!     - car
//!     - truck
//!     - two_wheeled: [bicycle, motorcycle]
//!   animals: [cat, dog]
//! ```
//!
//! The document is converted once, at load time, into a tree of
//! [`TaxonomyNode`]s so that linearization, weighting and ancestor
//! resolution all walk the same uniform structure:
//!
//! - a mapping entry `name: value` becomes a node named `name` whose children
//!   come from `value`; a null, empty or bare scalar value makes it a
//!   [`TaxonomyNode::Leaf`] and the scalar itself is not a node;
//! - a scalar sequence item becomes a leaf;
//! - a mapping or sequence nested inside a sequence is spliced into the
//!   enclosing child list. The container itself is not a node.
//!
//! Names are compared exactly. Numbers and booleans are accepted and
//! stringified. The empty string is reserved as the "no parent" marker of
//! [`weights::HierarchyRow`] and is rejected.

pub mod ancestors;
pub mod linearize;
pub mod weights;

pub use ancestors::AncestorMap;
pub use linearize::linearize;
pub use weights::{propagate, propagate_with_seed, HierarchyRow, Rgb, WeightedTree};

use std::fs;
use std::path::Path;

use serde_yaml::Value;

use crate::error::TaxolabelError;

/// Root key expected when the caller does not configure another one.
pub const DEFAULT_ROOT_KEY: &str = "class_dag";

/// A node of the taxonomy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TaxonomyNode {
    /// A named group with at least one child.
    Group {
        name: String,
        children: Vec<TaxonomyNode>,
    },
    /// A named node without children.
    Leaf(String),
}

impl TaxonomyNode {
    pub fn leaf(name: impl Into<String>) -> Self {
        TaxonomyNode::Leaf(name.into())
    }

    /// Builds a group; an empty child list yields a leaf.
    pub fn group(name: impl Into<String>, children: Vec<TaxonomyNode>) -> Self {
        if children.is_empty() {
            TaxonomyNode::Leaf(name.into())
        } else {
            TaxonomyNode::Group {
                name: name.into(),
                children,
            }
        }
    }

    pub fn name(&self) -> &str {
        match self {
            TaxonomyNode::Group { name, .. } | TaxonomyNode::Leaf(name) => name,
        }
    }

    pub fn children(&self) -> &[TaxonomyNode] {
        match self {
            TaxonomyNode::Group { children, .. } => children,
            TaxonomyNode::Leaf(_) => &[],
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, TaxonomyNode::Leaf(_))
    }

    /// Number of nodes in this subtree, itself included.
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(TaxonomyNode::size).sum::<usize>()
    }
}

/// An ordered forest of taxonomy nodes.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Taxonomy {
    roots: Vec<TaxonomyNode>,
}

impl Taxonomy {
    pub fn new(roots: Vec<TaxonomyNode>) -> Self {
        Self { roots }
    }

    /// Top-level nodes in declaration order.
    pub fn roots(&self) -> &[TaxonomyNode] {
        &self.roots
    }

    pub fn node_count(&self) -> usize {
        self.roots.iter().map(TaxonomyNode::size).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Parses a taxonomy from a YAML string.
    pub fn from_yaml_str(yaml: &str, root_key: &str) -> Result<Self, TaxolabelError> {
        parse_taxonomy(yaml, root_key, Path::new("<string>"))
    }
}

/// Loads a taxonomy from the YAML file at `path`, reading the grouping found
/// under `root_key`.
///
/// # Errors
/// [`TaxolabelError::TaxonomyConfig`] if the root key is missing or a node
/// has an unusable name; [`TaxolabelError::TaxonomyParse`] for invalid YAML.
pub fn load_taxonomy(path: &Path, root_key: &str) -> Result<Taxonomy, TaxolabelError> {
    let data = fs::read_to_string(path).map_err(TaxolabelError::Io)?;
    parse_taxonomy(&data, root_key, path)
}

/// Parses a taxonomy document; `origin` is only used in error messages.
pub fn parse_taxonomy(
    yaml: &str,
    root_key: &str,
    origin: &Path,
) -> Result<Taxonomy, TaxolabelError> {
    let document: Value =
        serde_yaml::from_str(yaml).map_err(|source| TaxolabelError::TaxonomyParse {
            path: origin.to_path_buf(),
            source,
        })?;

    let root = document
        .as_mapping()
        .and_then(|mapping| mapping.get(root_key))
        .ok_or_else(|| TaxolabelError::TaxonomyConfig {
            path: origin.to_path_buf(),
            message: format!("missing required root key '{root_key}'"),
        })?;

    let mut roots = Vec::new();
    collect_nodes(root, origin, &mut roots)?;
    Ok(Taxonomy::new(roots))
}

fn collect_nodes(
    value: &Value,
    origin: &Path,
    out: &mut Vec<TaxonomyNode>,
) -> Result<(), TaxolabelError> {
    match value {
        Value::Null => {}
        Value::Mapping(mapping) => {
            for (key, child_value) in mapping {
                let name = node_name(key, origin)?;
                let mut children = Vec::new();
                if !is_scalar(child_value) {
                    collect_nodes(child_value, origin, &mut children)?;
                }
                out.push(TaxonomyNode::group(name, children));
            }
        }
        Value::Sequence(items) => {
            for item in items {
                collect_nodes(item, origin, out)?;
            }
        }
        Value::Tagged(tagged) => collect_nodes(&tagged.value, origin, out)?,
        Value::String(_) | Value::Number(_) | Value::Bool(_) => {
            out.push(TaxonomyNode::Leaf(node_name(value, origin)?));
        }
    }
    Ok(())
}

fn is_scalar(value: &Value) -> bool {
    match value {
        Value::String(_) | Value::Number(_) | Value::Bool(_) => true,
        Value::Tagged(tagged) => is_scalar(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => false,
    }
}

fn node_name(value: &Value, origin: &Path) -> Result<String, TaxolabelError> {
    let name = match value {
        Value::String(text) => text.clone(),
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        other => {
            return Err(TaxolabelError::TaxonomyConfig {
                path: origin.to_path_buf(),
                message: format!("node names must be scalars, found {other:?}"),
            });
        }
    };

    if name.is_empty() {
        return Err(TaxolabelError::TaxonomyConfig {
            path: origin.to_path_buf(),
            message: "node names must not be empty".to_string(),
        });
    }
    Ok(name)
}
