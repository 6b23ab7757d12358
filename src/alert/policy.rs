//! Outcome to alert mapping.
//!
//! | Outcome | `show_error_only = false` | `show_error_only = true` |
//! |---------|---------------------------|--------------------------|
//! | Failure | Info balloon + `failure.wav` | Info balloon + `failure.wav` |
//! | Success | Info balloon + `success.wav` | suppressed |
//! | Unstable | Warning balloon + `unstable.wav` | suppressed |
//! | Aborted | Info balloon + `aborted.wav` | suppressed |
//! | Unknown | suppressed | suppressed |

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use crate::protocol::Outcome;

use super::sound::SoundFile;

// ============================================================================
// Severity
// ============================================================================

/// Balloon icon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Informational.
    Info,
    /// Needs attention.
    Warning,
    /// Something went wrong on the client side.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

// ============================================================================
// AlertConfig
// ============================================================================

/// Live alert settings, read on every dispatch.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertConfig {
    /// Suppress everything except failures.
    pub show_error_only: bool,
    /// How long a balloon stays up, in seconds.
    pub balloon_timeout_secs: f64,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            show_error_only: false,
            balloon_timeout_secs: 5.0,
        }
    }
}

// ============================================================================
// Alert
// ============================================================================

/// A balloon the presenter should show.
#[derive(Debug, Clone, PartialEq)]
pub struct Alert {
    /// Icon.
    pub severity: Severity,
    /// Balloon title.
    pub title: String,
    /// Balloon text.
    pub body: String,
    /// Display time in seconds.
    pub timeout_secs: f64,
}

// ============================================================================
// Decision
// ============================================================================

/// What to do for one classified message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// No balloon, no sound.
    Suppressed,
    /// Show a balloon and play a sound.
    Alert {
        /// Balloon icon.
        severity: Severity,
        /// Sound to play.
        sound: SoundFile,
    },
}

impl Decision {
    /// Returns `true` if nothing should be shown.
    #[inline]
    #[must_use]
    pub const fn is_suppressed(&self) -> bool {
        matches!(self, Self::Suppressed)
    }
}

// ============================================================================
// Policy
// ============================================================================

/// Decides how to alert for `outcome` under `config`.
///
/// Failures always alert. With `show_error_only` set, nothing else does.
#[must_use]
pub fn decide(outcome: Outcome, config: &AlertConfig) -> Decision {
    let severity = match (outcome, config.show_error_only) {
        (Outcome::Failure, _) => Severity::Info,
        (_, true) | (Outcome::Unknown, false) => return Decision::Suppressed,
        (Outcome::Success | Outcome::Aborted, false) => Severity::Info,
        (Outcome::Unstable, false) => Severity::Warning,
    };

    match SoundFile::for_outcome(outcome) {
        Some(sound) => Decision::Alert { severity, sound },
        None => Decision::Suppressed,
    }
}

// ============================================================================
// Tests
// ============================================================================
