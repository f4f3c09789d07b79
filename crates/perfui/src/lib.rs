#![forbid(unsafe_code)]

//! perfui public facade crate.
//!
//! Frame-synchronized animation for data views: a [`Choreographer`] drives
//! animated [`Range`]s and [`AccordionLayout`]s once per frame, and the host
//! repaints from their current values.
//!
//! This crate re-exports the common types from the internal crates and
//! offers a lightweight prelude for day-to-day usage.
//!
//! # Example
//!
//! ```
//! use perfui::prelude::*;
//!
//! let mut choreographer = Choreographer::new();
//! let timeline = shared(Range::new(0.0, 60.0));
//! choreographer.register(timeline.clone());
//!
//! // New data arrived: glide the visible window forward.
//! timeline.borrow_mut().set_target(30.0, 90.0)?;
//! for _ in 0..120 {
//!     choreographer.step();
//! }
//! assert!(timeline.borrow().min() > 29.0);
//! # Ok::<(), perfui::Error>(())
//! ```

use std::cell::RefCell;
use std::rc::Rc;

pub mod error;

// --- Core re-exports -------------------------------------------------------

pub use perfui_core::{Animatable, LerpConfig, Range, RangeError, lerp, lerp_with_threshold};

// --- Layout re-exports -----------------------------------------------------

pub use perfui_layout::{
    AccordionLayout, Allocation, Direction, GroupTotals, LayoutError, Rect, RegionId, RegionSpec,
    SizingState,
};

// --- Runtime re-exports ----------------------------------------------------

pub use perfui_runtime::{
    Choreographer, ChoreographerConfig, ConfigError, FrameSignal, FrameTimer, Participant,
    PerfuiConfig, Registrar, SchedulerState, TickOutcome,
};

// --- Errors ---------------------------------------------------------------

pub use error::{Error, Recovery, Result};

/// Wrap a participant for registration with a [`Choreographer`].
///
/// The returned handle coerces to [`Participant`] while keeping its concrete
/// type for the caller.
pub fn shared<T: Animatable + 'static>(participant: T) -> Rc<RefCell<T>> {
    Rc::new(RefCell::new(participant))
}

pub mod prelude {
    pub use crate::{
        AccordionLayout, Animatable, Choreographer, Direction, LerpConfig, Range, RegionSpec,
        SizingState, TickOutcome, shared,
    };

    pub use crate::{Error, Result};

    pub use crate::{core, layout, runtime};
}

pub use perfui_core as core;
pub use perfui_layout as layout;
pub use perfui_runtime as runtime;
