//! Raw annotation source records.
//!
//! These mirror what a detection dataset (COCO JSON in practice) exposes to
//! the rewriter: images, categories and box annotations, each keyed by the
//! source's own ids.

use serde::{Deserialize, Serialize};

use super::bbox::BBoxXYWH;
use super::ids::{CategoryId, ImageId};

/// A detection dataset as read from a raw annotation source.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Dataset {
    pub images: Vec<Image>,
    pub categories: Vec<Category>,
    pub annotations: Vec<Annotation>,
}

/// An image record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Image {
    pub id: ImageId,

    /// Filename or relative path of the image.
    pub file_name: String,

    /// Width of the image in pixels.
    pub width: u32,

    /// Height of the image in pixels.
    pub height: u32,
}

impl Image {
    pub fn new(
        id: impl Into<ImageId>,
        file_name: impl Into<String>,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: id.into(),
            file_name: file_name.into(),
            width,
            height,
        }
    }

    /// Returns true if both dimensions are non-zero.
    pub fn has_valid_dimensions(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// A category record with its source id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub supercategory: Option<String>,
}

impl Category {
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            supercategory: None,
        }
    }
}

/// A bounding box annotation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Source annotation id, when the source provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub image_id: ImageId,
    pub category_id: CategoryId,
    pub bbox: BBoxXYWH,
}

impl Annotation {
    pub fn new(
        image_id: impl Into<ImageId>,
        category_id: impl Into<CategoryId>,
        bbox: BBoxXYWH,
    ) -> Self {
        Self {
            id: None,
            image_id: image_id.into(),
            category_id: category_id.into(),
            bbox,
        }
    }

    pub fn with_id(mut self, id: u64) -> Self {
        self.id = Some(id);
        self
    }

    /// Short human-readable reference used in reports.
    pub fn describe(&self) -> String {
        match self.id {
            Some(id) => format!("annotation {id}"),
            None => format!("annotation on image {}", self.image_id),
        }
    }
}
