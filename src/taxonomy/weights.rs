//! Weighted, colored hierarchy rows for tree charts.
//!
//! Each taxonomy node becomes one [`HierarchyRow`] of
//! `(name, parent, weight, color, depth)`, the flat shape sunburst and
//! treemap renderers consume. Weight is the subtree size including the node.
//!
//! Colors are random by design: each top-level node draws its own base color
//! and every node below it is a small perturbation of its parent's color, so
//! a branch shares a related palette. The generator is injected; pass a
//! seeded [`StdRng`] for reproducible output.

use std::collections::HashSet;
use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::Path;

use rand::{rngs::StdRng, Rng, RngExt, SeedableRng};
use serde::{Serialize, Serializer};

use super::{Taxonomy, TaxonomyNode};
use crate::error::TaxolabelError;

/// Maximum change per color channel between a node and its color base.
pub const COLOR_VARIATION: i16 = 20;

/// An sRGB color, rendered as `#RRGGBB`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// A uniformly random color.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random(), rng.random(), rng.random())
    }

    /// Shifts each channel by a random amount in `-variation..=variation`,
    /// clamped to `0..=255`.
    pub fn perturbed<R: Rng + ?Sized>(&self, variation: i16, rng: &mut R) -> Self {
        let variation = variation.abs();
        let mut shift = |channel: u8| -> u8 {
            let delta = rng.random_range(-variation..=variation);
            (i16::from(channel) + delta).clamp(0, 255) as u8
        };
        let r = shift(self.r);
        let g = shift(self.g);
        let b = shift(self.b);
        Self::new(r, g, b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

impl Serialize for Rgb {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// One node of the weighted tree.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct HierarchyRow {
    pub name: String,
    /// Parent name, or `""` for a top-level node.
    pub parent: String,
    /// 1 plus the weights of the direct children.
    pub weight: usize,
    pub color: Rgb,
    /// 0 for top-level nodes.
    pub depth: usize,
}

impl HierarchyRow {
    pub fn is_top_level(&self) -> bool {
        self.parent.is_empty()
    }
}

/// Computes weights and colors for every node of `taxonomy`.
///
/// Rows are emitted in post-order (children before their parent).
pub fn propagate<R: Rng + ?Sized>(taxonomy: &Taxonomy, rng: &mut R) -> WeightedTree {
    let mut rows = Vec::with_capacity(taxonomy.node_count());
    for root in taxonomy.roots() {
        let base = Rgb::random(rng);
        weigh(root, "", 0, base, rng, &mut rows);
    }
    WeightedTree { rows }
}

/// [`propagate`] with a seeded generator, or the thread generator when
/// `seed` is `None`.
pub fn propagate_with_seed(taxonomy: &Taxonomy, seed: Option<u64>) -> WeightedTree {
    if let Some(seed) = seed {
        let mut rng = StdRng::seed_from_u64(seed);
        propagate(taxonomy, &mut rng)
    } else {
        let mut rng = rand::rng();
        propagate(taxonomy, &mut rng)
    }
}

fn weigh<R: Rng + ?Sized>(
    node: &TaxonomyNode,
    parent: &str,
    depth: usize,
    base: Rgb,
    rng: &mut R,
    rows: &mut Vec<HierarchyRow>,
) -> usize {
    let color = base.perturbed(COLOR_VARIATION, rng);

    let mut weight = 1;
    for child in node.children() {
        weight += weigh(child, node.name(), depth + 1, color, rng, rows);
    }

    rows.push(HierarchyRow {
        name: node.name().to_string(),
        parent: parent.to_string(),
        weight,
        color,
        depth,
    });
    weight
}

/// The flat row table produced by [`propagate`].
///
/// Rows reference their parent by name. When a name occurs more than once
/// the lookups below follow its first row.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct WeightedTree {
    rows: Vec<HierarchyRow>,
}

impl WeightedTree {
    pub fn rows(&self) -> &[HierarchyRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&HierarchyRow> {
        self.rows.iter().find(|row| row.name == name)
    }

    pub fn children_of<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a HierarchyRow> {
        self.rows.iter().filter(move |row| row.parent == name)
    }

    /// Names of nodes that have at least one child, in row order.
    pub fn internal_nodes(&self) -> Vec<&str> {
        let parents: HashSet<&str> = self
            .rows
            .iter()
            .filter(|row| !row.is_top_level())
            .map(|row| row.parent.as_str())
            .collect();

        let mut seen = HashSet::new();
        self.rows
            .iter()
            .map(|row| row.name.as_str())
            .filter(|name| parents.contains(name) && seen.insert(*name))
            .collect()
    }

    /// Names from the top-level ancestor down to `name`, inclusive.
    pub fn path_to(&self, name: &str) -> Result<Vec<String>, TaxolabelError> {
        let mut current = self.get(name).ok_or_else(|| TaxolabelError::UnknownTaxonomyNode {
            name: name.to_string(),
        })?;

        let mut path = vec![current.name.clone()];
        // A well-formed tree is never deeper than its row count.
        while !current.is_top_level() && path.len() <= self.rows.len() {
            let Some(parent) = self.get(&current.parent) else {
                break;
            };
            path.push(parent.name.clone());
            current = parent;
        }
        path.reverse();
        Ok(path)
    }

    /// The subtree rooted at `name`, re-rooted so it can be charted alone:
    /// the node's parent becomes `""` and depths are shifted to start at 0.
    pub fn subtree(&self, name: &str) -> Result<WeightedTree, TaxolabelError> {
        let root = self.get(name).ok_or_else(|| TaxolabelError::UnknownTaxonomyNode {
            name: name.to_string(),
        })?;

        let mut members: HashSet<&str> = HashSet::new();
        let mut stack = vec![root.name.as_str()];
        while let Some(current) = stack.pop() {
            if members.insert(current) {
                stack.extend(self.children_of(current).map(|row| row.name.as_str()));
            }
        }

        let mut emitted: HashSet<&str> = HashSet::new();
        let rows = self
            .rows
            .iter()
            .filter(|row| members.contains(row.name.as_str()))
            .filter(|row| emitted.insert(row.name.as_str()))
            .map(|row| {
                let mut row = row.clone();
                if row.name == root.name {
                    row.parent.clear();
                }
                row.depth = row.depth.saturating_sub(root.depth);
                row
            })
            .collect();

        Ok(WeightedTree { rows })
    }

    /// Renders the rows as CSV with a `name,parent,weight,color,depth` header.
    pub fn to_csv_string(&self) -> Result<String, csv::Error> {
        let mut csv_writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            csv_writer.serialize(row)?;
        }
        let bytes = csv_writer
            .into_inner()
            .map_err(|err| csv::Error::from(err.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Writes the rows as CSV.
    pub fn write_csv(&self, path: &Path) -> Result<(), TaxolabelError> {
        create_parent_dir(path)?;
        let file = File::create(path).map_err(TaxolabelError::Io)?;
        let mut csv_writer = csv::Writer::from_writer(BufWriter::new(file));
        for row in &self.rows {
            csv_writer
                .serialize(row)
                .map_err(|source| TaxolabelError::HierarchyWrite {
                    path: path.to_path_buf(),
                    message: source.to_string(),
                })?;
        }
        csv_writer.flush().map_err(TaxolabelError::Io)
    }

    /// Writes the rows as a pretty-printed JSON array.
    pub fn write_json(&self, path: &Path) -> Result<(), TaxolabelError> {
        create_parent_dir(path)?;
        let file = File::create(path).map_err(TaxolabelError::Io)?;
        serde_json::to_writer_pretty(BufWriter::new(file), self).map_err(|source| {
            TaxolabelError::HierarchyWrite {
                path: path.to_path_buf(),
                message: source.to_string(),
            }
        })
    }
}

fn create_parent_dir(path: &Path) -> Result<(), TaxolabelError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent).map_err(TaxolabelError::Io)
        }
        _ => Ok(()),
    }
}
