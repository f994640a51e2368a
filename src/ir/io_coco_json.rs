//! COCO JSON reader.
//!
//! Only the three collections the rewriter needs are modelled: `images`,
//! `annotations` and `categories`. Everything else in the document (info,
//! licenses, segmentation, scores) is accepted and ignored.
//!
//! COCO boxes are `[x, y, width, height]` with `(x, y)` the top-left corner in
//! absolute pixels, which maps directly onto [`BBoxXYWH`].

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use serde::Deserialize;

use super::model::{Annotation, Category, Dataset, Image};
use super::{BBoxXYWH, CategoryId, ImageId};
use crate::error::TaxolabelError;

#[derive(Debug, Deserialize)]
struct CocoDocument {
    #[serde(default)]
    images: Vec<CocoImage>,

    #[serde(default)]
    annotations: Vec<CocoAnnotation>,

    #[serde(default)]
    categories: Vec<CocoCategory>,
}

#[derive(Debug, Deserialize)]
struct CocoImage {
    id: u64,
    width: u32,
    height: u32,
    file_name: String,
}

#[derive(Debug, Deserialize)]
struct CocoCategory {
    id: u64,
    name: String,

    #[serde(default)]
    supercategory: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CocoAnnotation {
    #[serde(default)]
    id: Option<u64>,
    image_id: u64,
    category_id: u64,

    /// `[x, y, width, height]`, top-left origin.
    bbox: [f64; 4],
}

/// Reads a COCO JSON file.
///
/// # Example
/// ```no_run
/// use std::path::Path;
/// use taxolabel::ir::io_coco_json::read_coco_json;
///
/// let dataset = read_coco_json(Path::new("instances_train2017.json"))?;
/// println!("{} annotations", dataset.annotations.len());
/// # Ok::<(), taxolabel::TaxolabelError>(())
/// ```
pub fn read_coco_json(path: &Path) -> Result<Dataset, TaxolabelError> {
    let file = File::open(path).map_err(TaxolabelError::Io)?;
    let reader = BufReader::new(file);

    let coco: CocoDocument =
        serde_json::from_reader(reader).map_err(|source| TaxolabelError::CocoJsonParse {
            path: path.to_path_buf(),
            source,
        })?;

    Ok(coco_to_dataset(coco))
}

/// Reads a COCO JSON string. Useful for testing without file I/O.
pub fn from_coco_str(json: &str) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDocument = serde_json::from_str(json)?;
    Ok(coco_to_dataset(coco))
}

/// Reads a COCO JSON byte slice.
pub fn from_coco_slice(bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    let coco: CocoDocument = serde_json::from_slice(bytes)?;
    Ok(coco_to_dataset(coco))
}

fn coco_to_dataset(coco: CocoDocument) -> Dataset {
    let images = coco
        .images
        .into_iter()
        .map(|img| Image::new(ImageId::new(img.id), img.file_name, img.width, img.height))
        .collect();

    // Declared order is preserved; the index builder decides whether to sort.
    let categories = coco
        .categories
        .into_iter()
        .map(|cat| Category {
            id: CategoryId::new(cat.id),
            name: cat.name,
            supercategory: cat.supercategory,
        })
        .collect();

    let annotations = coco
        .annotations
        .into_iter()
        .map(|ann| Annotation {
            id: ann.id,
            image_id: ImageId::new(ann.image_id),
            category_id: CategoryId::new(ann.category_id),
            bbox: BBoxXYWH::from_coco(ann.bbox),
        })
        .collect();

    Dataset {
        images,
        categories,
        annotations,
    }
}
