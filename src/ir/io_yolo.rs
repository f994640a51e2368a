//! YOLO label files.
//!
//! One `.txt` per image under a `labels/` directory that sits next to
//! `images/`, one box per line:
//!
//! ```text
//! <class-index> <center-x> <center-y> <width> <height>
//! ```
//!
//! Geometry is normalized to the image size. This module only parses and
//! formats lines and moves them to and from disk; deciding which lines to
//! keep is the rewriter's job.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use super::{BBoxCXCYWH, ClassIndex};
use crate::error::TaxolabelError;

pub const LABEL_EXTENSION: &str = "txt";

const GEOMETRY_FIELDS: [&str; 4] = ["x_center", "y_center", "width", "height"];

/// A parsed label line.
///
/// The geometry is kept as the original tokens so a re-indexed line carries
/// exactly the same text it was read with.
#[derive(Clone, Debug, PartialEq)]
pub struct LabelRow<'a> {
    pub class_index: ClassIndex,
    pub geometry: [&'a str; 4],
}

impl LabelRow<'_> {
    /// Renders the line with a (possibly different) class index.
    pub fn render_with(&self, class_index: ClassIndex) -> String {
        format!("{} {}", class_index, self.geometry.join(" "))
    }
}

/// Why a label line could not be used.
#[derive(Clone, Debug, PartialEq)]
pub enum MalformedLine {
    FieldCount(usize),
    InvalidIndex(String),
    InvalidNumber { field: &'static str, raw: String },
}

impl fmt::Display for MalformedLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedLine::FieldCount(found) => write!(f, "expected 5 fields, found {found}"),
            MalformedLine::InvalidIndex(raw) => {
                write!(f, "invalid class index '{raw}'; expected non-negative integer")
            }
            MalformedLine::InvalidNumber { field, raw } => {
                write!(f, "invalid {field} '{raw}'; expected floating-point number")
            }
        }
    }
}

/// Parses one label line. Blank lines yield `Ok(None)`.
pub fn parse_label_line(line: &str) -> Result<Option<LabelRow<'_>>, MalformedLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    // Take at most 6 tokens so pathological inputs do not allocate unbounded memory.
    let tokens: Vec<&str> = trimmed.split_whitespace().take(6).collect();
    if tokens.len() != 5 {
        let found = if tokens.len() == 6 {
            trimmed.split_whitespace().count()
        } else {
            tokens.len()
        };
        return Err(MalformedLine::FieldCount(found));
    }

    let class_index = tokens[0]
        .parse::<usize>()
        .map_err(|_| MalformedLine::InvalidIndex(tokens[0].to_string()))?;

    let geometry = [tokens[1], tokens[2], tokens[3], tokens[4]];
    for (raw, field) in geometry.iter().zip(GEOMETRY_FIELDS) {
        if raw.parse::<f64>().is_err() {
            return Err(MalformedLine::InvalidNumber {
                field,
                raw: raw.to_string(),
            });
        }
    }

    Ok(Some(LabelRow {
        class_index: ClassIndex::new(class_index),
        geometry,
    }))
}

/// Fuzz-only entrypoint for single-line parsing.
#[cfg(feature = "fuzzing")]
pub fn fuzz_parse_label_line(input: &str) -> Result<(), String> {
    parse_label_line(input)
        .map(|_| ())
        .map_err(|err| err.to_string())
}

/// Formats a label line with six decimals per geometry field.
pub fn format_label_line(class_index: ClassIndex, bbox: &BBoxCXCYWH) -> String {
    format!(
        "{} {:.6} {:.6} {:.6} {:.6}",
        class_index, bbox.cx, bbox.cy, bbox.width, bbox.height
    )
}

/// Where an image's label file goes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LabelPath {
    pub path: PathBuf,
    /// A root, drive prefix or `..` was dropped from the image name.
    pub stripped: bool,
}

/// Label file path for an image: the image's relative path with a `.txt`
/// extension, under `labels_dir`.
///
/// Only the normal components of the image name are kept, so the result
/// never leaves `labels_dir`. Returns `None` when no component is left.
pub fn label_path_for(labels_dir: &Path, image_file_name: &str) -> Option<LabelPath> {
    let mut rel = PathBuf::new();
    let mut stripped = false;
    for component in Path::new(image_file_name).components() {
        match component {
            Component::Normal(part) => rel.push(part),
            Component::CurDir => {}
            Component::RootDir | Component::Prefix(_) | Component::ParentDir => stripped = true,
        }
    }

    if rel.as_os_str().is_empty() {
        return None;
    }
    Some(LabelPath {
        path: labels_dir.join(rel.with_extension(LABEL_EXTENSION)),
        stripped,
    })
}

/// Appends lines to a label file, creating it and its parents if needed.
pub fn append_label_lines(path: &Path, lines: &[String]) -> Result<(), TaxolabelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(TaxolabelError::Io)?;
    }

    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(TaxolabelError::Io)?;

    for line in lines {
        writeln!(file, "{line}").map_err(TaxolabelError::Io)?;
    }
    Ok(())
}

/// Writes a label file from scratch, replacing any previous content.
pub fn write_label_file(path: &Path, lines: &[String]) -> Result<(), TaxolabelError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(TaxolabelError::Io)?;
    }

    let mut content = String::new();
    for line in lines {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(path, content).map_err(TaxolabelError::Io)
}

/// Collects every `.txt` file under `labels_dir`, sorted by relative path.
pub fn collect_label_files(labels_dir: &Path) -> Result<Vec<PathBuf>, TaxolabelError> {
    if !labels_dir.is_dir() {
        return Err(TaxolabelError::LabelDirMissing {
            path: labels_dir.to_path_buf(),
        });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(labels_dir).follow_links(true) {
        let entry = entry.map_err(|source| TaxolabelError::LabelDirWalk {
            path: labels_dir.to_path_buf(),
            message: source.to_string(),
        })?;

        if entry.file_type().is_file() && has_label_extension(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort_by_cached_key(|path| rel_string(labels_dir, path));
    Ok(files)
}

fn has_label_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(LABEL_EXTENSION))
        .unwrap_or(false)
}

pub(crate) fn rel_string(root: &Path, path: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    rel.to_string_lossy().replace('\\', "/")
}
