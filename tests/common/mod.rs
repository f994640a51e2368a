#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

pub fn write_label_file(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("create parent dir");
    }
    fs::write(path, content).expect("write label file");
}

pub fn read_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .expect("read file")
        .lines()
        .map(str::to_string)
        .collect()
}

/// Creates the label set used by the re-index tests, indexed by
/// `flat_names.yaml` (car, truck, bike, person).
pub fn create_flat_labels(root: &Path) {
    write_label_file(
        root,
        "train/a.txt",
        "0 0.5 0.5 0.2 0.2\n2 0.25 0.75 0.1 0.1\n3 0.4 0.6 0.3 0.8\n",
    );
    write_label_file(root, "train/b.txt", "1 0.1 0.1 0.05 0.05\n\n");
    write_label_file(root, "val/c.txt", "2 0.5 0.5 1 1\nbroken line\n0 0.3 0.3 0.1 0.1\n");
}
