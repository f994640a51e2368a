#![allow(dead_code)]

use proptest::prelude::*;
use proptest::strategy::BoxedStrategy;
use proptest::test_runner::{Config as ProptestConfig, FileFailurePersistence};
use taxolabel::taxonomy::{Taxonomy, TaxonomyNode};

pub fn proptest_config() -> ProptestConfig {
    let cases = std::env::var("PROPTEST_CASES")
        .ok()
        .and_then(|v| v.parse::<u32>().ok())
        .unwrap_or(64);

    let mut config = ProptestConfig::with_failure_persistence(FileFailurePersistence::WithSource(
        "proptest-regressions",
    ));
    config.cases = cases;
    config.max_shrink_iters = 1024;
    config
}

fn name_strategy() -> BoxedStrategy<String> {
    proptest::string::string_regex("[a-z]{1,6}")
        .expect("valid name regex")
        .boxed()
}

fn arb_node() -> BoxedStrategy<TaxonomyNode> {
    name_strategy()
        .prop_map(TaxonomyNode::leaf)
        .prop_recursive(4, 48, 4, |inner| {
            (name_strategy(), proptest::collection::vec(inner, 1..4))
                .prop_map(|(name, children)| TaxonomyNode::group(name, children))
        })
        .boxed()
}

/// Random forests; names may repeat.
pub fn arb_taxonomy() -> BoxedStrategy<Taxonomy> {
    proptest::collection::vec(arb_node(), 0..5)
        .prop_map(Taxonomy::new)
        .boxed()
}

/// Random forests whose names are all distinct.
pub fn arb_unique_taxonomy() -> BoxedStrategy<Taxonomy> {
    arb_taxonomy().prop_map(uniquify).boxed()
}

/// Suffixes every name with its pre-order position.
pub fn uniquify(taxonomy: Taxonomy) -> Taxonomy {
    fn rename(node: &TaxonomyNode, next: &mut usize) -> TaxonomyNode {
        let name = format!("{}{}", node.name(), next);
        *next += 1;
        if node.is_leaf() {
            TaxonomyNode::leaf(name)
        } else {
            let children = node.children().iter().map(|c| rename(c, next)).collect();
            TaxonomyNode::group(name, children)
        }
    }

    let mut next = 0;
    Taxonomy::new(taxonomy.roots().iter().map(|r| rename(r, &mut next)).collect())
}

/// Renders a taxonomy as flow-style YAML under `class_dag`.
pub fn to_yaml(taxonomy: &Taxonomy) -> String {
    fn render(node: &TaxonomyNode, out: &mut String) {
        let quoted = format!("'{}'", node.name());
        if node.is_leaf() {
            out.push_str(&quoted);
            return;
        }
        out.push('{');
        out.push_str(&quoted);
        out.push_str(": [");
        for (i, child) in node.children().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            render(child, out);
        }
        out.push_str("]}");
    }

    let mut out = String::from("class_dag: [");
    for (i, root) in taxonomy.roots().iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        render(root, &mut out);
    }
    out.push_str("]\n");
    out
}

/// Node names in depth-first pre-order.
pub fn preorder_names(taxonomy: &Taxonomy) -> Vec<String> {
    fn walk(node: &TaxonomyNode, out: &mut Vec<String>) {
        out.push(node.name().to_string());
        for child in node.children() {
            walk(child, out);
        }
    }

    let mut out = Vec::new();
    for root in taxonomy.roots() {
        walk(root, &mut out);
    }
    out
}

/// `(name, ancestors)` for every node, outermost ancestor first.
pub fn ancestor_paths(taxonomy: &Taxonomy) -> Vec<(String, Vec<String>)> {
    fn walk(node: &TaxonomyNode, path: &mut Vec<String>, out: &mut Vec<(String, Vec<String>)>) {
        out.push((node.name().to_string(), path.clone()));
        path.push(node.name().to_string());
        for child in node.children() {
            walk(child, path, out);
        }
        path.pop();
    }

    let mut out = Vec::new();
    for root in taxonomy.roots() {
        walk(root, &mut Vec::new(), &mut out);
    }
    out
}
