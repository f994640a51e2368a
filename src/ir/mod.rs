//! Records and file formats shared by the rest of the crate.
//!
//! - Source records ([`Dataset`], [`Image`], [`Category`], [`Annotation`])
//!   as a raw annotation source exposes them, keyed by source ids.
//! - Dense label schemes ([`IndexTable`], [`ClassIndex`]).
//! - The bounding box coder ([`BBoxXYWH`] ⇄ [`BBoxCXCYWH`]).
//! - Readers and writers: COCO JSON, YOLO label files, `names:` YAML.
//!
//! # Example
//!
//! ```
//! use taxolabel::ir::{BBoxXYWH, IndexTable, ClassIndex};
//!
//! let table = IndexTable::from_names(["vehicles", "car", "truck"]);
//! assert_eq!(table.index_of("car"), Some(ClassIndex::new(1)));
//!
//! let norm = BBoxXYWH::new(10.0, 10.0, 20.0, 20.0).to_normalized(100.0, 100.0);
//! assert!((norm.cx - 0.2).abs() < 1e-12);
//! ```

mod bbox;
mod ids;
mod index_table;
pub mod io_coco_json;
pub mod io_names_yaml;
pub mod io_yolo;
mod model;

pub use bbox::{BBoxCXCYWH, BBoxXYWH};
pub use ids::{CategoryId, ClassIndex, ImageId};
pub use index_table::IndexTable;
pub use model::{Annotation, Category, Dataset, Image};
