#![forbid(unsafe_code)]

//! perfui runtime
//!
//! This crate drives animation: it decides when frames happen and in which
//! order participants see them.
//!
//! # Key Components
//!
//! - [`Choreographer`] - Two-pass frame scheduler over [`Animatable`](perfui_core::Animatable) participants
//! - [`Registrar`] - Cloneable handle for (un)registering participants from inside a frame
//! - [`FrameTimer`] - Background thread sending periodic [`FrameSignal`]s
//! - [`PerfuiConfig`] - Tunables as data, loadable from TOML/JSON with the `config` feature
//!
//! # Role in perfui
//! `perfui-runtime` is the heartbeat. Ranges and layouts from `perfui-core`
//! and `perfui-layout` only move when the choreographer animates them; the
//! host reads their values after each frame and repaints.

pub mod choreographer;
pub mod config;
pub mod timer;

pub use choreographer::{
    Choreographer, ChoreographerConfig, DEFAULT_FPS, Participant, Registrar, SchedulerState,
    TickOutcome,
};
pub use config::{ChoreographerSettings, ConfigError, LayoutSettings, PerfuiConfig, RangeSettings};
pub use timer::{FrameSignal, FrameTimer, StopSignal};
