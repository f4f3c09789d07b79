#![forbid(unsafe_code)]

//! Configuration as data for the choreographer and interpolation tunables.
//!
//! Every tunable lives in one [`PerfuiConfig`] that can be loaded from TOML
//! or JSON at startup (feature `config`).
//!
//! # Loading
//!
//! ```toml
//! # perfui.toml
//! [choreographer]
//! fps = 120
//!
//! [layout]
//! threshold = 0.5
//! ```
//!
//! ```rust,ignore
//! let config = PerfuiConfig::from_toml_file("perfui.toml")?.validated()?;
//! let choreographer = Choreographer::with_config(config.to_choreographer_config());
//! ```
//!
//! # Defaults
//!
//! Every field defaults to the built-in constants, so `PerfuiConfig::default()`
//! behaves exactly like not configuring anything. Sections and fields left
//! out of a file keep their defaults.

#[cfg(feature = "config")]
use std::path::{Path, PathBuf};

#[cfg(feature = "config")]
use serde::{Deserialize, Serialize};

use perfui_core::LerpConfig;

use crate::choreographer::{ChoreographerConfig, DEFAULT_FPS};

// ---------------------------------------------------------------------------
// Top-level PerfuiConfig
// ---------------------------------------------------------------------------

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct PerfuiConfig {
    /// Frame scheduling.
    pub choreographer: ChoreographerSettings,
    /// Convergence of animated ranges.
    pub range: RangeSettings,
    /// Convergence of layout region extents.
    pub layout: LayoutSettings,
}

impl PerfuiConfig {
    /// Load from a TOML string.
    #[cfg(feature = "config")]
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(ConfigError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = read_config(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "config")]
    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(s).map_err(ConfigError::Json)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = read_config(path.as_ref())?;
        Self::from_json_str(&content)
    }

    /// Validate all parameters are within acceptable ranges.
    ///
    /// Returns a list of validation errors. An empty list means the config
    /// is valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.choreographer.fps == 0 {
            errors.push("choreographer.fps must be > 0".into());
        }

        check_lerp("range", self.range.fraction, self.range.threshold, &mut errors);
        check_lerp(
            "layout",
            self.layout.fraction,
            self.layout.threshold,
            &mut errors,
        );

        errors
    }

    /// Return `self` if it validates, or every problem found.
    pub fn validated(self) -> Result<Self, ConfigError> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(self)
        } else {
            tracing::warn!(count = errors.len(), "configuration rejected");
            Err(ConfigError::Validation(errors))
        }
    }

    /// Build a [`ChoreographerConfig`] from this config.
    #[must_use]
    pub fn to_choreographer_config(&self) -> ChoreographerConfig {
        ChoreographerConfig {
            fps: self.choreographer.fps,
            updates_enabled: self.choreographer.updates_enabled,
        }
    }

    /// Convergence settings for ranges.
    #[must_use]
    pub fn range_lerp(&self) -> LerpConfig {
        LerpConfig::new(self.range.fraction, self.range.threshold)
    }

    /// Convergence settings for layout regions.
    #[must_use]
    pub fn layout_lerp(&self) -> LerpConfig {
        LerpConfig::new(self.layout.fraction, self.layout.threshold)
    }
}

fn check_lerp(section: &str, fraction: f64, threshold: f64, errors: &mut Vec<String>) {
    if !(0.0..=1.0).contains(&fraction) {
        errors.push(format!(
            "{section}.fraction must be in [0, 1], got {fraction}"
        ));
    }
    if !(threshold >= 0.0 && threshold.is_finite()) {
        errors.push(format!(
            "{section}.threshold must be finite and >= 0, got {threshold}"
        ));
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// `[choreographer]` section.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct ChoreographerSettings {
    /// Frames per second. Default: 60.
    pub fps: u32,
    /// Start with updates enabled. Default: true.
    pub updates_enabled: bool,
}

impl Default for ChoreographerSettings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            updates_enabled: true,
        }
    }
}

/// `[range]` section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct RangeSettings {
    /// Fraction of the gap closed per second. Default: 0.95.
    pub fraction: f64,
    /// Snap distance. Default: 0.001.
    pub threshold: f64,
}

impl Default for RangeSettings {
    fn default() -> Self {
        Self {
            fraction: LerpConfig::RANGE.fraction,
            threshold: LerpConfig::RANGE.threshold,
        }
    }
}

/// `[layout]` section.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "config", serde(default))]
pub struct LayoutSettings {
    /// Fraction of the gap closed per second. Default: 0.95.
    pub fraction: f64,
    /// Snap distance in pixels. Default: 1.0.
    pub threshold: f64,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            fraction: LerpConfig::LAYOUT.fraction,
            threshold: LerpConfig::LAYOUT.threshold,
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Why a [`PerfuiConfig`] could not be produced.
#[derive(Debug)]
pub enum ConfigError {
    /// The config file could not be read.
    #[cfg(feature = "config")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The document is not valid TOML for this schema.
    #[cfg(feature = "config")]
    Toml(toml::de::Error),
    /// The document is not valid JSON for this schema.
    #[cfg(feature = "config")]
    Json(serde_json::Error),
    /// Parsed settings are out of range; one message per setting.
    Validation(Vec<String>),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            #[cfg(feature = "config")]
            Self::Read { path, source } => {
                write!(f, "cannot read perfui config {}: {source}", path.display())
            }
            #[cfg(feature = "config")]
            Self::Toml(e) => write!(f, "invalid perfui TOML config: {e}"),
            #[cfg(feature = "config")]
            Self::Json(e) => write!(f, "invalid perfui JSON config: {e}"),
            Self::Validation(errors) => write!(
                f,
                "invalid perfui settings ({}): {}",
                errors.len(),
                errors.join("; ")
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            #[cfg(feature = "config")]
            Self::Read { source, .. } => Some(source),
            #[cfg(feature = "config")]
            Self::Toml(e) => Some(e),
            #[cfg(feature = "config")]
            Self::Json(e) => Some(e),
            Self::Validation(_) => None,
        }
    }
}

#[cfg(feature = "config")]
fn read_config(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
