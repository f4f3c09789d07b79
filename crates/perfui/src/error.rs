#![forbid(unsafe_code)]

//! Unified error model.
//!
//! Each subsystem keeps its own typed error so callers can match on what
//! matters. [`Error`] wraps them all for code that just wants `?`, and
//! [`Error::recovery`] says what a host should do next.

use std::fmt;

use perfui_core::RangeError;
use perfui_layout::LayoutError;
use perfui_runtime::ConfigError;

/// Top-level error type for perfui hosts.
#[derive(Debug)]
pub enum Error {
    /// A range rejected a mutation.
    Range(RangeError),
    /// A layout operation named an unknown region.
    Layout(LayoutError),
    /// Configuration could not be loaded or failed validation.
    Config(ConfigError),
    /// Raw I/O error (e.g. the frame timer thread could not be spawned).
    Io(std::io::Error),
}

/// Standard result type for perfui APIs.
pub type Result<T> = std::result::Result<T, Error>;

/// What a host should do when an error occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Recovery {
    /// Try the same mutation again after the current frame.
    RetryNextFrame,
    /// Drop the operation and continue.
    Ignore,
    /// Startup or system failure; the host cannot continue as configured.
    Abort,
}

impl Error {
    /// Determine the recovery action for this error.
    pub fn recovery(&self) -> Recovery {
        match self {
            Self::Range(RangeError::Locked) => Recovery::RetryNextFrame,
            Self::Layout(LayoutError::UnknownRegion(_)) => Recovery::Ignore,
            Self::Config(_) | Self::Io(_) => Recovery::Abort,
        }
    }

    /// Error type label for metrics and tracing.
    pub fn error_type(&self) -> &'static str {
        match self {
            Self::Range(_) => "range",
            Self::Layout(_) => "layout",
            Self::Config(_) => "config",
            Self::Io(_) => "io",
        }
    }

    /// Whether the host can keep running after this error.
    pub fn is_recoverable(&self) -> bool {
        !matches!(self.recovery(), Recovery::Abort)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Range(err) => write!(f, "{err}"),
            Self::Layout(err) => write!(f, "{err}"),
            Self::Config(err) => write!(f, "config: {err}"),
            Self::Io(err) => write!(f, "I/O: {err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Range(err) => Some(err),
            Self::Layout(err) => Some(err),
            Self::Config(err) => Some(err),
            Self::Io(err) => Some(err),
        }
    }
}

impl fmt::Display for Recovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::RetryNextFrame => "retry next frame",
            Self::Ignore => "ignore",
            Self::Abort => "abort",
        };
        f.write_str(label)
    }
}

// ── From conversions ────────────────────────────────────────────────────

impl From<RangeError> for Error {
    fn from(err: RangeError) -> Self {
        Self::Range(err)
    }
}

impl From<LayoutError> for Error {
    fn from(err: LayoutError) -> Self {
        Self::Layout(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::Config(err)
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}
