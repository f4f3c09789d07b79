#![forbid(unsafe_code)]

//! Exponential-decay interpolation.
//!
//! Each call closes a fraction of the remaining distance between `from` and
//! `to`, scaled by elapsed wall-clock time:
//!
//!   q = (1 - fraction) ^ elapsed_secs
//!   result = from × q + to × (1 - q)
//!
//! # Parameters
//!
//! - **fraction**: share of the remaining distance closed per second of
//!   elapsed time, in [0.0, 1.0]. 0.95 closes 95% of the gap every second.
//! - **threshold**: remaining distance below which the value snaps to the
//!   target exactly.
//!
//! # Invariants
//!
//! 1. Frame-rate independence: one step of `t1 + t2` equals a step of `t1`
//!    followed by a step of `t2` (within floating-point tolerance), because
//!    `q(t1 + t2) = q(t1) × q(t2)`.
//! 2. With `threshold > 0` and `fraction > 0`, repeated steps reach `to`
//!    exactly after finitely many frames.
//! 3. `|to - from| < threshold` always returns `to`, for any elapsed time.
//!
//! # Failure Modes
//!
//! - `fraction` outside [0, 1]: clamped.
//! - Negative or NaN elapsed time: treated as zero (no movement).
//! - `threshold == 0`: pure asymptotic approach; the target is never reached
//!   exactly unless floating-point rounding lands on it.

use std::time::Duration;

/// Default convergence fraction per second.
const DEFAULT_FRACTION: f64 = 0.95;

/// Snap threshold for value ranges.
const RANGE_THRESHOLD: f64 = 0.001;

/// Snap threshold for pixel extents.
const LAYOUT_THRESHOLD: f64 = 1.0;

/// Interpolate from `from` toward `to` without a snap threshold.
///
/// The caller accepts asymptotic approach: the result never jumps to `to`.
#[inline]
#[must_use]
pub fn lerp(from: f64, to: f64, fraction: f64, elapsed_secs: f64) -> f64 {
    lerp_with_threshold(from, to, fraction, elapsed_secs, 0.0)
}

/// Interpolate from `from` toward `to`, snapping once within `threshold`.
#[must_use]
pub fn lerp_with_threshold(
    from: f64,
    to: f64,
    fraction: f64,
    elapsed_secs: f64,
    threshold: f64,
) -> f64 {
    if (to - from).abs() < threshold {
        return to;
    }

    let fraction = fraction.clamp(0.0, 1.0);
    let elapsed = if elapsed_secs > 0.0 { elapsed_secs } else { 0.0 };
    let q = (1.0 - fraction).powf(elapsed);
    from * q + to * (1.0 - q)
}

/// Convergence rate and snap threshold for one animated value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LerpConfig {
    /// Fraction of the remaining distance closed per second.
    pub fraction: f64,
    /// Distance below which the value snaps to its target.
    pub threshold: f64,
}

impl LerpConfig {
    /// Defaults for value ranges (timeline and axis bounds).
    pub const RANGE: Self = Self {
        fraction: DEFAULT_FRACTION,
        threshold: RANGE_THRESHOLD,
    };

    /// Defaults for pixel extents.
    pub const LAYOUT: Self = Self {
        fraction: DEFAULT_FRACTION,
        threshold: LAYOUT_THRESHOLD,
    };

    /// Create a config. `fraction` is clamped to [0, 1] and `threshold` is
    /// made non-negative.
    #[must_use]
    pub fn new(fraction: f64, threshold: f64) -> Self {
        Self {
            fraction: fraction.clamp(0.0, 1.0),
            threshold: threshold.abs(),
        }
    }

    /// Set the convergence fraction (builder pattern).
    #[must_use]
    pub fn with_fraction(mut self, fraction: f64) -> Self {
        self.fraction = fraction.clamp(0.0, 1.0);
        self
    }

    /// Set the snap threshold (builder pattern).
    #[must_use]
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold.abs();
        self
    }

    /// Advance `from` toward `to` by one frame of length `dt`.
    #[inline]
    #[must_use]
    pub fn step(&self, from: f64, to: f64, dt: Duration) -> f64 {
        lerp_with_threshold(from, to, self.fraction, dt.as_secs_f64(), self.threshold)
    }
}

impl Default for LerpConfig {
    fn default() -> Self {
        Self::RANGE
    }
}
