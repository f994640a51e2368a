//! `names:` YAML index table artifacts.
//!
//! This is the interchange format between the index builders and the
//! remapper, and the same `names` block Ultralytics-style `data.yaml` files
//! carry. Both shapes are accepted on read:
//!
//! ```yaml
//! names:
//!   0: person
//!   1: bicycle
//! ```
//!
//! ```yaml
//! names: [person, bicycle]
//! ```
//!
//! Other top-level keys are ignored, so a dataset config that also holds a
//! `class_dag` can be read directly. The writer always emits the mapping
//! form in index order.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use super::IndexTable;
use crate::error::TaxolabelError;

#[derive(Debug, Deserialize)]
struct NamesDocument {
    #[serde(default)]
    names: Option<NamesBlock>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NamesBlock {
    Sequence(Vec<NameValue>),
    Mapping(BTreeMap<usize, NameValue>),
}

/// YAML turns bare `true` or `1` into non-strings; accept them as names.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum NameValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl NameValue {
    fn into_name(self) -> String {
        match self {
            NameValue::Text(text) => text,
            NameValue::Integer(value) => value.to_string(),
            NameValue::Float(value) => value.to_string(),
            NameValue::Bool(value) => value.to_string(),
        }
    }
}

/// Reads an index table from a YAML file.
///
/// # Errors
/// [`TaxolabelError::IndexTableSchema`] if the `names` field is missing or
/// its indices are not exactly `0..N`.
pub fn read_names_yaml(path: &Path) -> Result<IndexTable, TaxolabelError> {
    let data = fs::read_to_string(path).map_err(TaxolabelError::Io)?;
    names_from_str(&data, path)
}

/// Parses an index table from a YAML string; `origin` is only used in errors.
pub fn names_from_str(yaml: &str, origin: &Path) -> Result<IndexTable, TaxolabelError> {
    let parsed: NamesDocument =
        serde_yaml::from_str(yaml).map_err(|source| TaxolabelError::IndexTableParse {
            path: origin.to_path_buf(),
            source,
        })?;

    let Some(names) = parsed.names else {
        return Err(TaxolabelError::IndexTableSchema {
            path: origin.to_path_buf(),
            message: "missing required 'names' field".to_string(),
        });
    };

    match names {
        NamesBlock::Sequence(values) => Ok(IndexTable::from_names(
            values.into_iter().map(NameValue::into_name),
        )),
        NamesBlock::Mapping(mapping) => {
            // BTreeMap keys are sorted, so density means key == position.
            if let Some((position, index)) = mapping
                .keys()
                .enumerate()
                .find(|(position, index)| position != *index)
            {
                return Err(TaxolabelError::IndexTableSchema {
                    path: origin.to_path_buf(),
                    message: format!(
                        "indices must be dense from 0; expected {position}, found {index}"
                    ),
                });
            }
            Ok(IndexTable::from_names(
                mapping.into_values().map(NameValue::into_name),
            ))
        }
    }
}

/// Writes an index table as a `names:` mapping.
pub fn write_names_yaml(path: &Path, table: &IndexTable) -> Result<(), TaxolabelError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(TaxolabelError::Io)?;
        }
    }
    fs::write(path, to_names_yaml_string(table)).map_err(TaxolabelError::Io)
}

/// Renders an index table as a `names:` mapping.
pub fn to_names_yaml_string(table: &IndexTable) -> String {
    let mut yaml = String::from("names:\n");
    for (index, name) in table.iter() {
        yaml.push_str(&format!("  {}: {}\n", index, yaml_single_quoted(name)));
    }
    yaml
}

fn yaml_single_quoted(raw: &str) -> String {
    format!("'{}'", raw.replace('\'', "''"))
}
