//! Newtype ids and indices.
//!
//! Source ids (`ImageId`, `CategoryId`) come from a raw annotation source and
//! are never assumed contiguous. A [`ClassIndex`] is a dense, zero-based index
//! assigned by traversal or declaration order. Keeping them apart stops a
//! COCO category id from leaking into a label file unchanged.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! source_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            #[inline]
            pub fn new(id: u64) -> Self {
                Self(id)
            }

            #[inline]
            pub fn as_u64(&self) -> u64 {
                self.0
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

source_id!(
    /// Identifier of an image in a raw annotation source.
    ImageId
);

source_id!(
    /// Identifier of a category in a raw annotation source.
    CategoryId
);

/// A dense, zero-based class index in some label scheme.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ClassIndex(pub usize);

impl ClassIndex {
    #[inline]
    pub fn new(index: usize) -> Self {
        Self(index)
    }

    #[inline]
    pub fn as_usize(&self) -> usize {
        self.0
    }
}

impl From<usize> for ClassIndex {
    fn from(index: usize) -> Self {
        Self(index)
    }
}

impl fmt::Debug for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClassIndex({})", self.0)
    }
}

impl fmt::Display for ClassIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
