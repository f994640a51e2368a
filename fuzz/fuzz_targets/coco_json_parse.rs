//! Fuzz target for COCO JSON reading.
//!
//! Run with:
//!   cargo +nightly fuzz run coco_json_parse

#![no_main]

use libfuzzer_sys::fuzz_target;
use taxolabel::ir::io_coco_json::from_coco_slice;
use taxolabel::remap::{build_category_table, OrderPolicy};

fuzz_target!(|data: &[u8]| {
    if data.len() > 10 * 1024 * 1024 {
        return;
    }

    // Parsed documents must also densify without panicking.
    if let Ok(dataset) = from_coco_slice(data) {
        let _ = build_category_table(&dataset.categories, OrderPolicy::SortedBySourceId);
    }
});
