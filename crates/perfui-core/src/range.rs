#![forbid(unsafe_code)]

//! Animated two-ended interval.
//!
//! A [`Range`] carries a *current* pair of bounds (what is on screen) and a
//! *target* pair (where the bounds are heading). Each frame the scheduler
//! calls [`Animatable::animate`], which glides current toward target with
//! the range's [`LerpConfig`].
//!
//! # Locking
//!
//! An external mutator that computes bounds from a fresher source than the
//! animation (a pointer drag, for example) calls [`Range::lock`] to claim the
//! range for the rest of the frame. While locked, every setter returns
//! [`RangeError::Locked`] and leaves the range untouched. The lock is cleared
//! by [`Animatable::post_animate`], which the scheduler runs exactly once per
//! frame after all participants have animated.
//!
//! The lock is a same-thread re-entrancy guard, not a concurrency primitive.
//!
//! # Invariants
//!
//! 1. `min <= max` is not enforced; callers may flip bounds on purpose.
//! 2. A rejected mutation changes nothing (current, target, or lock).
//! 3. `shift` moves current and target of both bounds, or nothing.

use std::time::Duration;

use crate::animation::{Animatable, LerpConfig};
use crate::error::RangeError;

/// A two-ended interval whose displayed bounds glide toward target bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Range {
    min: f64,
    max: f64,
    target_min: f64,
    target_max: f64,
    initial_min: f64,
    initial_max: f64,
    lerp: LerpConfig,
    locked: bool,
}

impl Range {
    /// Create a range with both current and target bounds at `min..max`.
    #[must_use]
    pub fn new(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            target_min: min,
            target_max: max,
            initial_min: min,
            initial_max: max,
            lerp: LerpConfig::RANGE,
            locked: false,
        }
    }

    /// Set the convergence config (builder pattern).
    #[must_use]
    pub fn with_lerp(mut self, lerp: LerpConfig) -> Self {
        self.lerp = lerp;
        self
    }

    // --- Queries -----------------------------------------------------------

    /// Current (displayed) lower bound.
    #[inline]
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Current (displayed) upper bound.
    #[inline]
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Lower bound the range is converging toward.
    #[inline]
    #[must_use]
    pub fn target_min(&self) -> f64 {
        self.target_min
    }

    /// Upper bound the range is converging toward.
    #[inline]
    #[must_use]
    pub fn target_max(&self) -> f64 {
        self.target_max
    }

    /// `max - min` of the current bounds. Negative when flipped.
    #[inline]
    #[must_use]
    pub fn length(&self) -> f64 {
        self.max - self.min
    }

    /// Whether the current bounds coincide.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.min == self.max
    }

    /// Whether the range is locked for the current frame.
    #[inline]
    #[must_use]
    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Whether current bounds have reached their targets.
    #[must_use]
    pub fn is_converged(&self) -> bool {
        self.min == self.target_min && self.max == self.target_max
    }

    /// The convergence config in use.
    #[must_use]
    pub fn lerp_config(&self) -> LerpConfig {
        self.lerp
    }

    /// Clip `value` into the current bounds.
    ///
    /// Works on flipped ranges by clipping into `[lower, upper]` of the two.
    #[must_use]
    pub fn clamp(&self, value: f64) -> f64 {
        let (lo, hi) = self.ordered();
        value.max(lo).min(hi)
    }

    /// Whether `value` lies within the current bounds (inclusive).
    #[must_use]
    pub fn contains(&self, value: f64) -> bool {
        let (lo, hi) = self.ordered();
        lo <= value && value <= hi
    }

    /// Length of the overlap between the current bounds of two ranges.
    ///
    /// Zero when the ranges are disjoint or merely touch.
    #[must_use]
    pub fn intersection_length(&self, other: &Range) -> f64 {
        let (a_lo, a_hi) = self.ordered();
        let (b_lo, b_hi) = other.ordered();
        (a_hi.min(b_hi) - a_lo.max(b_lo)).max(0.0)
    }

    fn ordered(&self) -> (f64, f64) {
        if self.min <= self.max {
            (self.min, self.max)
        } else {
            (self.max, self.min)
        }
    }

    // --- Locking -----------------------------------------------------------

    /// Claim the range for the remainder of the current frame.
    pub fn lock(&mut self) {
        self.locked = true;
    }

    fn ensure_unlocked(&self, op: &'static str) -> Result<(), RangeError> {
        if self.locked {
            #[cfg(feature = "tracing")]
            tracing::trace!(op, "range mutation rejected while locked");
            #[cfg(not(feature = "tracing"))]
            let _ = op;
            return Err(RangeError::Locked);
        }
        Ok(())
    }

    // --- Jump setters ------------------------------------------------------

    /// Set the lower bound immediately (current and target).
    pub fn set_min(&mut self, min: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set_min")?;
        self.min = min;
        self.target_min = min;
        Ok(())
    }

    /// Set the upper bound immediately (current and target).
    pub fn set_max(&mut self, max: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set_max")?;
        self.max = max;
        self.target_max = max;
        Ok(())
    }

    /// Set both bounds immediately (current and target).
    pub fn set(&mut self, min: f64, max: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set")?;
        self.min = min;
        self.max = max;
        self.target_min = min;
        self.target_max = max;
        Ok(())
    }

    // --- Target setters ----------------------------------------------------

    /// Set the lower target; the current bound glides toward it.
    pub fn set_min_target(&mut self, min: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set_min_target")?;
        self.target_min = min;
        Ok(())
    }

    /// Set the upper target; the current bound glides toward it.
    pub fn set_max_target(&mut self, max: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set_max_target")?;
        self.target_max = max;
        Ok(())
    }

    /// Set both targets.
    pub fn set_target(&mut self, min: f64, max: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("set_target")?;
        self.target_min = min;
        self.target_max = max;
        Ok(())
    }

    // --- Compound mutations ------------------------------------------------

    /// Move both bounds (current and target) by `delta`.
    pub fn shift(&mut self, delta: f64) -> Result<(), RangeError> {
        self.ensure_unlocked("shift")?;
        self.min += delta;
        self.max += delta;
        self.target_min += delta;
        self.target_max += delta;
        Ok(())
    }

    /// Swap the lower and upper bounds (current and target).
    pub fn flip(&mut self) -> Result<(), RangeError> {
        self.ensure_unlocked("flip")?;
        std::mem::swap(&mut self.min, &mut self.max);
        std::mem::swap(&mut self.target_min, &mut self.target_max);
        Ok(())
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::new(0.0, 0.0)
    }
}

impl Animatable for Range {
    fn animate(&mut self, frame_length: Duration) {
        if self.min != self.target_min {
            self.min = self.lerp.step(self.min, self.target_min, frame_length);
        }
        if self.max != self.target_max {
            self.max = self.lerp.step(self.max, self.target_max, frame_length);
        }
    }

    fn post_animate(&mut self) {
        self.locked = false;
    }

    /// Snap back to the bounds the range was created with.
    fn reset(&mut self) {
        self.min = self.initial_min;
        self.max = self.initial_max;
        self.target_min = self.initial_min;
        self.target_max = self.initial_max;
        self.locked = false;
    }

    fn configure_lerp(&mut self, config: LerpConfig) {
        self.lerp = config;
    }
}
