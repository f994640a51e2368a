use proptest::prelude::*;
use taxolabel::ir::{ClassIndex, IndexTable};
use taxolabel::remap::build_mapping;

mod proptest_helpers;

fn arb_table() -> impl Strategy<Value = IndexTable> {
    // A small alphabet so old and new tables overlap often.
    let alphabet = vec!["car", "truck", "bike", "bus", "dog", "cat"];
    proptest::collection::vec(proptest::sample::select(alphabet), 0..8)
        .prop_map(|names| IndexTable::from_names(names))
}

proptest! {
    #![proptest_config(proptest_helpers::proptest_config())]

    #[test]
    fn mapping_covers_exactly_the_shared_names(old in arb_table(), new in arb_table()) {
        let mapping = build_mapping(&old, &new);

        for (old_index, name) in old.iter() {
            match mapping.get(old_index) {
                Some(new_index) => {
                    prop_assert_eq!(new.name(new_index), Some(name));
                    prop_assert_eq!(Some(new_index), new.index_of(name));
                }
                None => prop_assert!(!new.contains_name(name)),
            }
        }

        prop_assert_eq!(mapping.len() + mapping.unmapped().len(), old.len());
        for (old_index, name) in mapping.unmapped() {
            prop_assert_eq!(old.name(*old_index), Some(name.as_str()));
        }
        prop_assert!(mapping.iter().all(|(_, new_index)| new_index < ClassIndex::new(new.len())));
    }
}
