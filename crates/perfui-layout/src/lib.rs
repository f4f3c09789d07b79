#![forbid(unsafe_code)]

//! Layout primitives and the animated accordion space allocator.
//!
//! # Role in perfui
//! `perfui-layout` decides how much of a container's extent each child
//! region receives. Regions are minimized, maximized, or left at their
//! preferred size; transitions between these states glide over several
//! frames because [`AccordionLayout`] is itself
//! [`Animatable`](perfui_core::Animatable).

pub mod accordion;
pub mod error;

pub use accordion::{AccordionLayout, Allocation, GroupTotals, RegionId, RegionSpec, SizingState};
pub use error::LayoutError;

/// The axis along which regions are stacked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Top to bottom.
    #[default]
    Vertical,
    /// Left to right.
    Horizontal,
}

/// An axis-aligned rectangle in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    /// Create a new rectangle.
    #[must_use]
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Extent of the rectangle along `direction`.
    #[must_use]
    pub const fn extent(&self, direction: Direction) -> u32 {
        match direction {
            Direction::Horizontal => self.width,
            Direction::Vertical => self.height,
        }
    }

    /// Whether the rectangle has zero area.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extent_follows_direction() {
        let r = Rect::new(0, 0, 30, 40);
        assert_eq!(r.extent(Direction::Horizontal), 30);
        assert_eq!(r.extent(Direction::Vertical), 40);
        assert_eq!(Direction::default(), Direction::Vertical);
    }

    #[test]
    fn zero_area_is_empty() {
        assert!(Rect::new(5, 5, 0, 10).is_empty());
        assert!(!Rect::new(5, 5, 1, 1).is_empty());
    }
}
