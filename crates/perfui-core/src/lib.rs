#![forbid(unsafe_code)]

//! Core: interpolation, animatable ranges, and the per-frame animation contract.
//!
//! # Role in perfui
//! `perfui-core` is the leaf layer. It owns the exponential-decay
//! interpolator every animated value is built on, the [`Animatable`]
//! contract the scheduler drives, and [`Range`], the two-ended interval that
//! timelines and axes glide between.
//!
//! # Primary responsibilities
//! - **lerp**: frame-rate independent convergence toward a target.
//! - **Animatable**: `animate` / `post_animate` / `reset` hooks.
//! - **Range**: current and target bounds with a single-frame write lock.
//!
//! # How it fits in the system
//! The runtime (`perfui-runtime`) owns a set of `Animatable` participants and
//! advances them once per frame. The layout crate (`perfui-layout`)
//! implements `Animatable` for its space allocator. Rendering code reads
//! current values after the frame's animate pass completes.

pub mod animation;
pub mod error;
pub mod range;

pub use animation::{Animatable, LerpConfig, lerp, lerp_with_threshold};
pub use error::RangeError;
pub use range::Range;
