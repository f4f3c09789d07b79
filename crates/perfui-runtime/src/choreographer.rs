#![forbid(unsafe_code)]

//! Frame-synchronized update scheduler.
//!
//! The [`Choreographer`] owns an ordered set of [`Animatable`] participants
//! and runs them once per frame:
//!
//! 1. If a reset was requested, every participant is reset
//! 2. Every participant is animated with the elapsed frame length
//! 3. Every participant gets `post_animate`
//! 4. Registration changes queued during the frame are applied, in order
//! 5. The host is asked to redraw
//!
//! All `animate` calls finish before any `post_animate` call starts, so a
//! participant may read another's post-animation state only after both
//! passes have run.
//!
//! # Threading
//!
//! Participants live on the host thread (`Rc<RefCell<..>>`). The optional
//! [`FrameTimer`] only sends wake-ups; [`Choreographer::pump`] turns them
//! into frames on the host thread.
//!
//! # Example
//!
//! ```
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! use perfui_core::Range;
//! use perfui_runtime::{Choreographer, TickOutcome};
//!
//! let mut choreographer = Choreographer::new();
//! let range = Rc::new(RefCell::new(Range::new(0.0, 10.0)));
//! choreographer.register(range.clone());
//!
//! range.borrow_mut().set_max_target(20.0).unwrap();
//! assert!(matches!(choreographer.step(), TickOutcome::Animated { .. }));
//! assert!(range.borrow().max() > 10.0);
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;
use std::rc::{Rc, Weak};
use std::sync::mpsc;
use std::time::Duration;

use perfui_core::Animatable;
use web_time::Instant;

use crate::timer::{FrameSignal, FrameTimer};

/// Default frame rate.
pub const DEFAULT_FPS: u32 = 60;

/// A registered participant.
///
/// Participants are compared by identity, never by value.
pub type Participant = Rc<RefCell<dyn Animatable>>;

fn same_participant(a: &Participant, b: &Participant) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Scheduler configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChoreographerConfig {
    /// Timer cadence and the nominal frame length used by [`Choreographer::step`].
    pub fps: u32,
    /// Whether frames run when ticked.
    pub updates_enabled: bool,
}

impl Default for ChoreographerConfig {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            updates_enabled: true,
        }
    }
}

impl ChoreographerConfig {
    /// Set the frame rate (builder pattern).
    #[must_use]
    pub fn with_fps(mut self, fps: u32) -> Self {
        self.fps = fps;
        self
    }

    /// The nominal frame length, `1 / fps`. A zero rate is treated as 1.
    #[must_use]
    pub fn frame_interval(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(self.fps.max(1)))
    }
}

/// Whether the scheduler is producing frames on its own.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    /// Timer stopped or updates disabled.
    Idle,
    /// Timer firing and updates enabled.
    Running,
}

/// What a tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// A full frame ran with this frame length.
    Animated { frame_length: Duration },
    /// Updates are disabled; the clock advanced but nothing ran.
    Suspended,
}

impl TickOutcome {
    #[must_use]
    pub fn is_animated(&self) -> bool {
        matches!(self, Self::Animated { .. })
    }
}

// --- Registry -------------------------------------------------------------

enum Change {
    Register(Participant),
    Unregister(Participant),
}

#[derive(Default)]
struct Registry {
    participants: RefCell<Vec<Participant>>,
    pending: RefCell<Vec<Change>>,
    in_frame: Cell<bool>,
}

impl Registry {
    fn submit(&self, change: Change) {
        if self.in_frame.get() {
            tracing::debug!(
                register = matches!(change, Change::Register(_)),
                "frame in progress; deferring registration change"
            );
            self.pending.borrow_mut().push(change);
        } else {
            self.apply(change);
        }
    }

    fn apply(&self, change: Change) {
        let mut participants = self.participants.borrow_mut();
        match change {
            Change::Register(participant) => {
                if participants.iter().any(|p| same_participant(p, &participant)) {
                    tracing::debug!("participant already registered; ignoring");
                    return;
                }
                participants.push(participant);
                tracing::debug!(participants = participants.len(), "participant registered");
            }
            Change::Unregister(participant) => {
                let before = participants.len();
                participants.retain(|p| !same_participant(p, &participant));
                if participants.len() < before {
                    tracing::debug!(participants = participants.len(), "participant unregistered");
                }
            }
        }
    }

    fn flush(&self) {
        let changes = std::mem::take(&mut *self.pending.borrow_mut());
        for change in changes {
            self.apply(change);
        }
    }

    fn snapshot(&self) -> Vec<Participant> {
        self.participants.borrow().clone()
    }

    fn contains(&self, participant: &Participant) -> bool {
        self.participants
            .borrow()
            .iter()
            .any(|p| same_participant(p, participant))
    }
}

/// Marks a frame as in progress.
///
/// Dropping the guard ends the frame and applies queued registration
/// changes. This also runs during unwind, so a change requested before a
/// participant panicked never lands after the host's later calls.
struct FrameGuard<'a>(&'a Registry);

impl<'a> FrameGuard<'a> {
    fn enter(registry: &'a Registry) -> Self {
        registry.in_frame.set(true);
        Self(registry)
    }
}

impl Drop for FrameGuard<'_> {
    fn drop(&mut self) {
        self.0.in_frame.set(false);
        if std::thread::panicking() {
            tracing::warn!(
                queued = self.0.pending.borrow().len(),
                "participant panicked; applying queued registration changes"
            );
        }
        self.0.flush();
    }
}

/// A cloneable handle for (un)registering participants.
///
/// Participants can hold one and call it from inside their own `animate`
/// or `post_animate`; such calls are applied once the frame's passes have
/// finished. The handle does not keep the choreographer's participants
/// alive: once the choreographer is dropped, calls are ignored.
#[derive(Clone)]
pub struct Registrar {
    registry: Weak<Registry>,
}

impl Registrar {
    /// Register a participant. Returns `false` if the choreographer is gone.
    pub fn register(&self, participant: Participant) -> bool {
        self.with_registry(|r| r.submit(Change::Register(participant)))
    }

    /// Unregister a participant. Returns `false` if the choreographer is gone.
    pub fn unregister(&self, participant: Participant) -> bool {
        self.with_registry(|r| r.submit(Change::Unregister(participant)))
    }

    fn with_registry(&self, f: impl FnOnce(&Registry)) -> bool {
        match self.registry.upgrade() {
            Some(registry) => {
                f(&registry);
                true
            }
            None => false,
        }
    }
}

impl fmt::Debug for Registrar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registrar")
            .field("alive", &(self.registry.strong_count() > 0))
            .finish()
    }
}

// --- Choreographer --------------------------------------------------------

/// Drives registered participants once per frame.
pub struct Choreographer {
    config: ChoreographerConfig,
    registry: Rc<Registry>,
    reset_pending: bool,
    last_tick: Option<Instant>,
    frame_count: u64,
    redraw_requested: bool,
    redraw_callback: Option<Box<dyn FnMut()>>,
    timer: Option<FrameTimer>,
    signals: Option<mpsc::Receiver<FrameSignal>>,
}

impl Choreographer {
    /// Create an idle choreographer at the default frame rate.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(ChoreographerConfig::default())
    }

    #[must_use]
    pub fn with_config(config: ChoreographerConfig) -> Self {
        Self {
            config,
            registry: Rc::new(Registry::default()),
            reset_pending: false,
            last_tick: None,
            frame_count: 0,
            redraw_requested: false,
            redraw_callback: None,
            timer: None,
            signals: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> ChoreographerConfig {
        self.config
    }

    /// A handle participants can use to (un)register themselves or others.
    #[must_use]
    pub fn registrar(&self) -> Registrar {
        Registrar {
            registry: Rc::downgrade(&self.registry),
        }
    }

    // --- Registration ------------------------------------------------------

    /// Register a participant.
    ///
    /// Applied immediately between frames; queued until the end of the
    /// current frame otherwise. Registering twice is a no-op.
    pub fn register(&self, participant: Participant) {
        self.registry.submit(Change::Register(participant));
    }

    /// Unregister a participant, with the same timing as [`register`](Self::register).
    pub fn unregister(&self, participant: Participant) {
        self.registry.submit(Change::Unregister(participant));
    }

    #[must_use]
    pub fn is_registered(&self, participant: &Participant) -> bool {
        self.registry.contains(participant)
    }

    #[must_use]
    pub fn participant_count(&self) -> usize {
        self.registry.participants.borrow().len()
    }

    /// Whether a frame is currently running its passes.
    #[must_use]
    pub fn is_in_frame(&self) -> bool {
        self.registry.in_frame.get()
    }

    // --- Control -----------------------------------------------------------

    /// Reset every participant at the start of the next enabled frame.
    pub fn request_reset(&mut self) {
        tracing::debug!("reset requested");
        self.reset_pending = true;
    }

    #[must_use]
    pub fn is_reset_pending(&self) -> bool {
        self.reset_pending
    }

    /// Pause or resume frames. Registration and participant state are kept.
    pub fn set_updates_enabled(&mut self, enabled: bool) {
        if self.config.updates_enabled != enabled {
            tracing::debug!(enabled, "updates toggled");
        }
        self.config.updates_enabled = enabled;
    }

    #[must_use]
    pub fn updates_enabled(&self) -> bool {
        self.config.updates_enabled
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.timer.is_some() && self.config.updates_enabled {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    /// Number of frames that have run (suspended ticks are not counted).
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    // --- Redraw ------------------------------------------------------------

    /// Call `callback` once at the end of every frame.
    pub fn set_redraw_callback(&mut self, callback: impl FnMut() + 'static) {
        self.redraw_callback = Some(Box::new(callback));
    }

    /// Whether a frame has run since the last call. Clears the flag.
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    // --- Ticking -----------------------------------------------------------

    /// Run a frame timed by the wall clock.
    pub fn tick(&mut self) -> TickOutcome {
        self.tick_at(Instant::now())
    }

    /// Run a frame as if the clock read `now`.
    ///
    /// The frame length is the time since the previous tick, or the nominal
    /// frame length for the first tick. The clock advances even when updates
    /// are disabled.
    pub fn tick_at(&mut self, now: Instant) -> TickOutcome {
        let frame_length = match self.last_tick {
            Some(previous) => now.saturating_duration_since(previous),
            None => self.config.frame_interval(),
        };
        self.last_tick = Some(now);
        self.run_frame(frame_length)
    }

    /// Run a frame with the nominal frame length, ignoring the clock.
    pub fn step(&mut self) -> TickOutcome {
        self.run_frame(self.config.frame_interval())
    }

    fn run_frame(&mut self, frame_length: Duration) -> TickOutcome {
        if !self.config.updates_enabled {
            tracing::trace!("updates disabled; tick suspended");
            return TickOutcome::Suspended;
        }

        let registry = Rc::clone(&self.registry);
        let participants = registry.snapshot();
        let _span = tracing::trace_span!(
            "choreographer.frame",
            frame = self.frame_count + 1,
            participants = participants.len()
        )
        .entered();

        {
            let _guard = FrameGuard::enter(&registry);

            if std::mem::take(&mut self.reset_pending) {
                tracing::debug!(participants = participants.len(), "resetting participants");
                for participant in &participants {
                    participant.borrow_mut().reset();
                }
            }
            for participant in &participants {
                participant.borrow_mut().animate(frame_length);
            }
            for participant in &participants {
                participant.borrow_mut().post_animate();
            }
        }

        self.frame_count += 1;
        self.redraw_requested = true;
        if let Some(callback) = self.redraw_callback.as_mut() {
            callback();
        }

        tracing::trace!(
            frame_length_us = frame_length.as_micros() as u64,
            "frame complete"
        );
        TickOutcome::Animated { frame_length }
    }

    // --- Timer -------------------------------------------------------------

    /// Start the frame timer. A no-op if it is already running.
    ///
    /// The first frame after a start uses the nominal frame length, so time
    /// spent stopped does not show up as one long frame.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the timer thread cannot be spawned.
    pub fn start(&mut self) -> io::Result<()> {
        if self.timer.is_some() {
            return Ok(());
        }
        let (sender, receiver) = mpsc::channel();
        self.timer = Some(FrameTimer::spawn(self.config.frame_interval(), sender)?);
        self.signals = Some(receiver);
        self.last_tick = None;
        Ok(())
    }

    /// Stop the frame timer and join its thread.
    pub fn stop(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.stop();
        }
        self.signals = None;
    }

    /// Run one frame if the timer fired since the last pump.
    ///
    /// Several pending signals are coalesced into a single frame whose length
    /// covers all of them. Returns `None` when nothing was pending.
    pub fn pump(&mut self) -> Option<TickOutcome> {
        let fired = self.drain_signals();
        if fired == 0 {
            return None;
        }
        if fired > 1 {
            tracing::trace!(fired, "coalesced timer signals");
        }
        Some(self.tick())
    }

    /// Wait up to `timeout` for the timer, then run one frame.
    ///
    /// Returns `None` on timeout or when the timer is not running.
    pub fn pump_blocking(&mut self, timeout: Duration) -> Option<TickOutcome> {
        self.signals.as_ref()?.recv_timeout(timeout).ok()?;
        self.drain_signals();
        Some(self.tick())
    }

    fn drain_signals(&self) -> usize {
        let Some(signals) = &self.signals else {
            return 0;
        };
        let mut fired = 0;
        loop {
            match signals.try_recv() {
                Ok(_) => fired += 1,
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    tracing::warn!("frame timer disconnected");
                    break;
                }
            }
        }
        fired
    }
}

impl Default for Choreographer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Choreographer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Choreographer")
            .field("config", &self.config)
            .field("state", &self.state())
            .field("participants", &self.participant_count())
            .field("reset_pending", &self.reset_pending)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use perfui_core::Range;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Probe {
        name: &'static str,
        log: Log,
    }

    impl Animatable for Probe {
        fn animate(&mut self, _frame_length: Duration) {
            self.log.borrow_mut().push(format!("{}.animate", self.name));
        }
        fn post_animate(&mut self) {
            self.log.borrow_mut().push(format!("{}.post", self.name));
        }
        fn reset(&mut self) {
            self.log.borrow_mut().push(format!("{}.reset", self.name));
        }
    }

    fn probe(name: &'static str, log: &Log) -> Rc<RefCell<Probe>> {
        Rc::new(RefCell::new(Probe {
            name,
            log: Rc::clone(log),
        }))
    }

    #[test]
    fn default_config_is_sixty_fps() {
        let config = ChoreographerConfig::default();
        assert_eq!(config.fps, 60);
        assert!(config.updates_enabled);
        assert_eq!(config.frame_interval(), Duration::from_secs_f64(1.0 / 60.0));
        assert_eq!(
            config.with_fps(0).frame_interval(),
            Duration::from_secs(1)
        );
    }

    #[test]
    fn all_animates_precede_all_post_animates() {
        let log = Log::default();
        let mut choreographer = Choreographer::new();
        choreographer.register(probe("a", &log));
        choreographer.register(probe("b", &log));

        choreographer.step();
        assert_eq!(
            *log.borrow(),
            vec!["a.animate", "b.animate", "a.post", "b.post"]
        );
    }

    #[test]
    fn duplicate_registration_is_ignored() {
        let log = Log::default();
        let choreographer = Choreographer::new();
        let p = probe("a", &log);
        choreographer.register(p.clone());
        choreographer.register(p.clone());
        assert_eq!(choreographer.participant_count(), 1);

        let participant: Participant = p;
        assert!(choreographer.is_registered(&participant));
        choreographer.unregister(participant.clone());
        assert!(!choreographer.is_registered(&participant));
    }

    #[test]
    fn first_tick_uses_nominal_frame_length() {
        let mut choreographer = Choreographer::new();
        let start = Instant::now();
        assert_eq!(
            choreographer.tick_at(start),
            TickOutcome::Animated {
                frame_length: ChoreographerConfig::default().frame_interval()
            }
        );
        assert_eq!(
            choreographer.tick_at(start + Duration::from_millis(40)),
            TickOutcome::Animated {
                frame_length: Duration::from_millis(40)
            }
        );
    }

    #[test]
    fn disabled_updates_suspend_but_advance_the_clock() {
        let log = Log::default();
        let mut choreographer = Choreographer::new();
        choreographer.register(probe("a", &log));
        let start = Instant::now();

        choreographer.tick_at(start);
        log.borrow_mut().clear();
        choreographer.take_redraw_request();

        choreographer.set_updates_enabled(false);
        assert_eq!(
            choreographer.tick_at(start + Duration::from_millis(500)),
            TickOutcome::Suspended
        );
        assert!(log.borrow().is_empty());
        assert!(!choreographer.take_redraw_request());

        choreographer.set_updates_enabled(true);
        assert_eq!(
            choreographer.tick_at(start + Duration::from_millis(516)),
            TickOutcome::Animated {
                frame_length: Duration::from_millis(16)
            }
        );
    }

    #[test]
    fn reset_runs_before_animate_once() {
        let log = Log::default();
        let mut choreographer = Choreographer::new();
        choreographer.register(probe("a", &log));

        choreographer.request_reset();
        assert!(choreographer.is_reset_pending());
        choreographer.step();
        choreographer.step();
        assert!(!choreographer.is_reset_pending());
        assert_eq!(
            *log.borrow(),
            vec!["a.reset", "a.animate", "a.post", "a.animate", "a.post"]
        );
    }

    #[test]
    fn pending_reset_waits_for_enabled_tick() {
        let log = Log::default();
        let mut choreographer = Choreographer::new();
        choreographer.register(probe("a", &log));
        choreographer.set_updates_enabled(false);
        choreographer.request_reset();
        choreographer.step();
        assert!(choreographer.is_reset_pending());
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn redraw_callback_fires_once_per_frame() {
        let count = Rc::new(Cell::new(0));
        let mut choreographer = Choreographer::new();
        let seen = Rc::clone(&count);
        choreographer.set_redraw_callback(move || seen.set(seen.get() + 1));

        choreographer.step();
        choreographer.step();
        assert_eq!(count.get(), 2);
        assert_eq!(choreographer.frame_count(), 2);
        assert!(choreographer.take_redraw_request());
        assert!(!choreographer.take_redraw_request());
    }

    #[test]
    fn range_locked_mid_frame_unlocks_after_post_animate() {
        let mut choreographer = Choreographer::new();
        let range = Rc::new(RefCell::new(Range::new(0.0, 1.0)));
        choreographer.register(range.clone());

        range.borrow_mut().lock();
        choreographer.step();
        assert!(!range.borrow().is_locked());
    }

    #[test]
    fn registrar_outliving_choreographer_is_inert() {
        let log = Log::default();
        let choreographer = Choreographer::new();
        let registrar = choreographer.registrar();
        assert!(registrar.register(probe("a", &log)));
        drop(choreographer);
        assert!(!registrar.register(probe("b", &log)));
    }

    #[test]
    fn state_tracks_timer_and_updates() {
        let mut choreographer = Choreographer::new();
        assert_eq!(choreographer.state(), SchedulerState::Idle);

        choreographer.start().unwrap();
        assert_eq!(choreographer.state(), SchedulerState::Running);

        choreographer.set_updates_enabled(false);
        assert_eq!(choreographer.state(), SchedulerState::Idle);

        choreographer.set_updates_enabled(true);
        choreographer.stop();
        assert_eq!(choreographer.state(), SchedulerState::Idle);
    }

    #[test]
    fn pump_without_timer_does_nothing() {
        let mut choreographer = Choreographer::new();
        assert_eq!(choreographer.pump(), None);
        assert_eq!(choreographer.pump_blocking(Duration::from_millis(1)), None);
        assert_eq!(choreographer.frame_count(), 0);
    }

    #[test]
    fn pump_blocking_runs_frames_from_timer() {
        let mut choreographer =
            Choreographer::with_config(ChoreographerConfig::default().with_fps(500));
        choreographer.start().unwrap();

        let outcome = choreographer.pump_blocking(Duration::from_secs(5));
        assert!(outcome.is_some_and(|o| o.is_animated()));
        assert!(choreographer.frame_count() >= 1);

        choreographer.stop();
    }
}
