use std::collections::HashMap;

use proptest::prelude::*;
use rand::{rngs::StdRng, SeedableRng};
use taxolabel::ir::ClassIndex;
use taxolabel::taxonomy::{linearize, propagate, AncestorMap, Taxonomy, DEFAULT_ROOT_KEY};

mod proptest_helpers;

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn linearization_is_dense_preorder(taxonomy in proptest_helpers::arb_taxonomy()) {
        let yaml = proptest_helpers::to_yaml(&taxonomy);
        let parsed = Taxonomy::from_yaml_str(&yaml, DEFAULT_ROOT_KEY).expect("parse rendered yaml");
        prop_assert_eq!(&parsed, &taxonomy);

        let table = linearize(&parsed);
        prop_assert_eq!(table.len(), taxonomy.node_count());
        let expected_names = proptest_helpers::preorder_names(&taxonomy);
        prop_assert_eq!(table.names(), expected_names.as_slice());

        for (index, name) in table.iter() {
            // Repeated names resolve to their last occurrence.
            let last = table.index_of(name).expect("listed name resolves");
            prop_assert!(last >= index);
            prop_assert_eq!(table.name(last), Some(name));
        }
    }

    #[test]
    fn linearization_is_deterministic(taxonomy in proptest_helpers::arb_taxonomy()) {
        let yaml = proptest_helpers::to_yaml(&taxonomy);
        let first = linearize(&Taxonomy::from_yaml_str(&yaml, DEFAULT_ROOT_KEY).expect("parse"));
        let second = linearize(&Taxonomy::from_yaml_str(&yaml, DEFAULT_ROOT_KEY).expect("parse"));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn weights_count_subtree_nodes(
        taxonomy in proptest_helpers::arb_unique_taxonomy(),
        seed in any::<u64>(),
    ) {
        let tree = propagate(&taxonomy, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(tree.len(), taxonomy.node_count());

        let position: HashMap<&str, usize> = tree
            .rows()
            .iter()
            .enumerate()
            .map(|(i, row)| (row.name.as_str(), i))
            .collect();
        for (i, row) in tree.rows().iter().enumerate() {
            let child_sum: usize = tree.children_of(&row.name).map(|c| c.weight).sum();
            prop_assert_eq!(row.weight, 1 + child_sum);
            if !row.is_top_level() {
                // Post-order: the parent's row comes later.
                prop_assert!(position[row.parent.as_str()] > i);
                let parent = tree.get(&row.parent).expect("parent row");
                prop_assert_eq!(parent.depth + 1, row.depth);
                prop_assert!((i16::from(row.color.r) - i16::from(parent.color.r)).abs() <= 20);
                prop_assert!((i16::from(row.color.g) - i16::from(parent.color.g)).abs() <= 20);
                prop_assert!((i16::from(row.color.b) - i16::from(parent.color.b)).abs() <= 20);
            }
        }

        let top_level = tree.rows().iter().filter(|row| row.is_top_level()).count();
        prop_assert_eq!(top_level, taxonomy.roots().len());
    }

    #[test]
    fn seeded_propagation_is_reproducible(
        taxonomy in proptest_helpers::arb_taxonomy(),
        seed in any::<u64>(),
    ) {
        let first = propagate(&taxonomy, &mut StdRng::seed_from_u64(seed));
        let second = propagate(&taxonomy, &mut StdRng::seed_from_u64(seed));
        prop_assert_eq!(first, second);
    }

    #[test]
    fn ancestor_chains_follow_the_tree(taxonomy in proptest_helpers::arb_unique_taxonomy()) {
        let map = AncestorMap::build(&taxonomy);
        let tree = propagate(&taxonomy, &mut StdRng::seed_from_u64(7));
        let table = linearize(&taxonomy);

        prop_assert_eq!(map.len(), taxonomy.node_count());
        for (name, ancestors) in proptest_helpers::ancestor_paths(&taxonomy) {
            prop_assert_eq!(map.ancestors_of(&name).expect("known node"), ancestors.as_slice());

            let chain = map.full_chain(&name).expect("known node");
            prop_assert_eq!(&chain, &tree.path_to(&name).expect("row exists"));

            let index: ClassIndex = table.index_of(&name).expect("indexed");
            prop_assert_eq!(map.chain_for_index(&table, index).expect("in range"), chain);
        }
    }
}
