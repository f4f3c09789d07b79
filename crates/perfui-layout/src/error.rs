#![forbid(unsafe_code)]

//! Layout errors.

use std::fmt;

use crate::accordion::RegionId;

/// Layout computation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutError {
    /// The region was never added to this layout, or has been removed.
    UnknownRegion(RegionId),
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownRegion(id) => write!(f, "unknown layout region {id}"),
        }
    }
}

impl std::error::Error for LayoutError {}
