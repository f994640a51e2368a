//! Bounding box coder.
//!
//! COCO stores boxes as `[x, y, width, height]` in pixels with `(x, y)` at the
//! top-left corner. YOLO label files store `cx cy w h` normalized by the image
//! size. The two types below keep those spaces apart; conversion needs the
//! image dimensions and is otherwise stateless.

use serde::{Deserialize, Serialize};

/// An absolute box: top-left origin plus size, in pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BBoxXYWH {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// A normalized box: center plus size, each as a fraction of the image.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BBoxCXCYWH {
    pub cx: f64,
    pub cy: f64,
    pub width: f64,
    pub height: f64,
}

impl BBoxXYWH {
    #[inline]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Builds a box from the COCO `bbox` array.
    #[inline]
    pub fn from_coco(bbox: [f64; 4]) -> Self {
        Self::new(bbox[0], bbox[1], bbox[2], bbox[3])
    }

    /// Returns true if all components are finite.
    #[inline]
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.width.is_finite() && self.height.is_finite()
    }

    /// Converts to the normalized center form.
    ///
    /// `image_width` and `image_height` must be positive; the caller checks.
    pub fn to_normalized(&self, image_width: f64, image_height: f64) -> BBoxCXCYWH {
        BBoxCXCYWH {
            cx: (self.x + self.width / 2.0) / image_width,
            cy: (self.y + self.height / 2.0) / image_height,
            width: self.width / image_width,
            height: self.height / image_height,
        }
    }
}

impl BBoxCXCYWH {
    #[inline]
    pub fn new(cx: f64, cy: f64, width: f64, height: f64) -> Self {
        Self {
            cx,
            cy,
            width,
            height,
        }
    }

    /// Converts back to absolute pixels. Exact inverse of
    /// [`BBoxXYWH::to_normalized`] up to floating point error.
    pub fn to_absolute(&self, image_width: f64, image_height: f64) -> BBoxXYWH {
        let width = self.width * image_width;
        let height = self.height * image_height;
        BBoxXYWH {
            x: self.cx * image_width - width / 2.0,
            y: self.cy * image_height - height / 2.0,
            width,
            height,
        }
    }
}
