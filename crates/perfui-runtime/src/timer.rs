#![forbid(unsafe_code)]

//! Background frame timer.
//!
//! [`FrameTimer`] wakes the host at a fixed cadence by sending a
//! [`FrameSignal`] through an `mpsc` channel. It never touches participant
//! state: the host drains signals on its own thread and runs the frame there
//! (see [`Choreographer::pump`](crate::Choreographer::pump)).
//!
//! # Lifecycle
//!
//! 1. [`FrameTimer::spawn`] starts a named thread
//! 2. The thread sleeps on a [`StopSignal`] with a timeout of one interval
//! 3. On timeout it sends a signal; on stop, or when the receiver is gone,
//!    it exits
//! 4. [`FrameTimer::stop`] triggers the signal and joins; dropping the timer
//!    triggers it without joining

use std::io;
use std::sync::mpsc;
use std::sync::{Arc, Condvar, Mutex, PoisonError};
use std::thread;
use std::time::Duration;

use web_time::Instant;

/// A wake-up from the frame timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameSignal {
    /// When the timer fired.
    pub fired_at: Instant,
    /// Number of signals sent so far by this timer, starting at 1.
    pub sequence: u64,
}

/// Shared stop flag for the timer thread.
///
/// Waiting on it blocks on a condition variable, so a stop request wakes the
/// thread immediately instead of after the current interval.
#[derive(Debug, Clone)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Create a new stop signal pair (signal, trigger).
    pub(crate) fn new() -> (Self, StopTrigger) {
        let inner = Arc::new((Mutex::new(false), Condvar::new()));
        let signal = Self {
            inner: Arc::clone(&inner),
        };
        (signal, StopTrigger { inner })
    }

    /// Check if the stop signal has been triggered.
    pub fn is_stopped(&self) -> bool {
        let (lock, _) = &*self.inner;
        *lock.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Wait for either the stop signal or a timeout.
    ///
    /// Returns `true` if stopped, `false` if timed out.
    pub fn wait_timeout(&self, duration: Duration) -> bool {
        let (lock, cvar) = &*self.inner;
        let stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        let (stopped, _) = cvar
            .wait_timeout_while(stopped, duration, |stopped| !*stopped)
            .unwrap_or_else(PoisonError::into_inner);
        *stopped
    }
}

/// Owner side of a [`StopSignal`].
#[derive(Debug)]
pub(crate) struct StopTrigger {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopTrigger {
    pub(crate) fn stop(&self) {
        let (lock, cvar) = &*self.inner;
        let mut stopped = lock.lock().unwrap_or_else(PoisonError::into_inner);
        *stopped = true;
        cvar.notify_all();
    }
}

/// A running periodic wake-up source.
#[derive(Debug)]
pub struct FrameTimer {
    interval: Duration,
    trigger: StopTrigger,
    thread: Option<thread::JoinHandle<()>>,
}

impl FrameTimer {
    /// Start a timer that sends a [`FrameSignal`] every `interval`.
    ///
    /// # Errors
    ///
    /// Returns the OS error if the timer thread cannot be spawned.
    pub fn spawn(interval: Duration, sender: mpsc::Sender<FrameSignal>) -> io::Result<Self> {
        let (signal, trigger) = StopSignal::new();
        let thread = thread::Builder::new()
            .name("perfui-frame-timer".into())
            .spawn(move || run(interval, &sender, &signal))?;

        tracing::info!(
            interval_us = interval.as_micros() as u64,
            "frame timer started"
        );
        Ok(Self {
            interval,
            trigger,
            thread: Some(thread),
        })
    }

    #[must_use]
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether the timer thread is still alive.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.thread.as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Stop the timer and join its thread.
    pub fn stop(mut self) {
        self.trigger.stop();
        if let Some(handle) = self.thread.take() {
            let _ = handle.join();
        }
        tracing::info!("frame timer stopped");
    }
}

impl Drop for FrameTimer {
    fn drop(&mut self) {
        self.trigger.stop();
        // Don't join in drop to avoid blocking
    }
}

fn run(interval: Duration, sender: &mpsc::Sender<FrameSignal>, stop: &StopSignal) {
    let mut sequence = 0u64;
    loop {
        if stop.wait_timeout(interval) {
            break;
        }
        sequence += 1;
        let signal = FrameSignal {
            fired_at: Instant::now(),
            sequence,
        };
        if sender.send(signal).is_err() {
            tracing::debug!("frame signal receiver dropped; timer exiting");
            break;
        }
    }
}
