//! Fuzz target for `names:` index table parsing.

#![no_main]

use std::path::Path;

use libfuzzer_sys::fuzz_target;
use taxolabel::ir::io_names_yaml::{names_from_str, to_names_yaml_string};

fuzz_target!(|data: &[u8]| {
    if data.len() > 1024 * 1024 {
        return;
    }

    let Ok(yaml) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(table) = names_from_str(yaml, Path::new("<fuzz>")) {
        let _ = to_names_yaml_string(&table);
    }
});
