#![forbid(unsafe_code)]

//! Frame-driven animation primitives.
//!
//! Everything that moves in a perfui view moves the same way: once per frame
//! the scheduler hands each participant the elapsed frame length, and the
//! participant closes a fixed fraction of the remaining distance to its
//! target per second of elapsed time (see [`lerp`]).
//!
//! # Invariants
//!
//! 1. Within one frame, every participant's [`Animatable::animate`] runs
//!    before any participant's [`Animatable::post_animate`].
//! 2. `post_animate` is where per-frame transient state (such as a range
//!    lock) is released.
//! 3. `reset` snaps state back to its canonical starting configuration
//!    without unregistering the participant.

use std::time::Duration;

mod lerp;

pub use lerp::{LerpConfig, lerp, lerp_with_threshold};

/// A participant that can be advanced one discrete time step per frame.
///
/// Only `animate` is required. The remaining hooks default to no-ops so
/// simple participants stay simple.
pub trait Animatable {
    /// Advance internal state by `frame_length` of wall-clock time.
    fn animate(&mut self, frame_length: Duration);

    /// Called after every registered participant has been animated for the
    /// current frame.
    fn post_animate(&mut self) {}

    /// Snap state back to its initial configuration.
    fn reset(&mut self) {}

    /// Replace the convergence rate and snap threshold.
    fn configure_lerp(&mut self, _config: LerpConfig) {}
}

impl<T: Animatable + ?Sized> Animatable for Box<T> {
    fn animate(&mut self, frame_length: Duration) {
        (**self).animate(frame_length);
    }

    fn post_animate(&mut self) {
        (**self).post_animate();
    }

    fn reset(&mut self) {
        (**self).reset();
    }

    fn configure_lerp(&mut self, config: LerpConfig) {
        (**self).configure_lerp(config);
    }
}
