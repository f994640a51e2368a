//! Fuzz target for taxonomy YAML loading.
//!
//! Any document that loads must linearize, weigh and resolve ancestors
//! without panicking.

#![no_main]

use libfuzzer_sys::fuzz_target;
use taxolabel::taxonomy::{linearize, propagate_with_seed, AncestorMap, Taxonomy, DEFAULT_ROOT_KEY};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(taxonomy) = Taxonomy::from_yaml_str(yaml, DEFAULT_ROOT_KEY) {
        let table = linearize(&taxonomy);
        assert_eq!(table.len(), taxonomy.node_count());
        let tree = propagate_with_seed(&taxonomy, Some(0));
        assert_eq!(tree.len(), table.len());
        let _ = AncestorMap::build(&taxonomy);
    }
});
