#![forbid(unsafe_code)]

//! Errors for animated value mutation.

use std::fmt;

/// A [`Range`](crate::Range) mutation that was not applied.
///
/// Rejections leave the range untouched. Callers check the result and may
/// retry on the next frame, once the lock has been released by
/// `post_animate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    /// The range is locked for the remainder of the current frame.
    Locked,
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Locked => write!(f, "range is locked for the current frame"),
        }
    }
}

impl std::error::Error for RangeError {}
