//! Build result classification.
//!
//! Turns the raw text of a server frame into a [`BuildResult`].
//!
//! # Encodings
//!
//! | Form | Example |
//! |------|---------|
//! | Tagged text | `FAILURE:Build #42 broken` |
//! | JSON object | `{"result": "FAILURE", "message": "Build #42 broken"}` |
//!
//! Tags are matched case-insensitively. Anything that is not one of the
//! two forms classifies as [`Outcome::Unknown`].

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;

use serde::Deserialize;
use tracing::debug;

// ============================================================================
// Outcome
// ============================================================================

/// Classified result of a build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// Build passed.
    Success,
    /// Build broke.
    Failure,
    /// Build finished with test failures or warnings.
    Unstable,
    /// Build was cancelled.
    Aborted,
    /// Payload was not recognized.
    Unknown,
}

impl Outcome {
    /// Wire tag for this outcome, `None` for [`Outcome::Unknown`].
    #[inline]
    #[must_use]
    pub const fn tag(self) -> Option<&'static str> {
        match self {
            Self::Success => Some("SUCCESS"),
            Self::Failure => Some("FAILURE"),
            Self::Unstable => Some("UNSTABLE"),
            Self::Aborted => Some("ABORTED"),
            Self::Unknown => None,
        }
    }

    /// Looks up a wire tag, ignoring case and surrounding whitespace.
    #[must_use]
    pub fn from_tag(tag: &str) -> Option<Self> {
        let tag = tag.trim();
        [Self::Success, Self::Failure, Self::Unstable, Self::Aborted]
            .into_iter()
            .find(|outcome| {
                outcome
                    .tag()
                    .is_some_and(|known| known.eq_ignore_ascii_case(tag))
            })
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag().unwrap_or("UNKNOWN"))
    }
}

// ============================================================================
// BuildResult
// ============================================================================

/// Immutable result of classifying one inbound frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildResult {
    outcome: Outcome,
    message: String,
}

/// JSON shape accepted by [`BuildResult::parse`].
#[derive(Debug, Deserialize)]
struct JsonPayload {
    result: String,
    #[serde(default)]
    message: Option<String>,
}

impl BuildResult {
    /// Creates a result directly.
    #[inline]
    #[must_use]
    pub fn new(outcome: Outcome, message: impl Into<String>) -> Self {
        Self {
            outcome,
            message: message.into(),
        }
    }

    /// Classifies raw frame text.
    ///
    /// Total over all input: unrecognized text yields [`Outcome::Unknown`]
    /// carrying the trimmed raw text as its message.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        if let Some(result) = Self::parse_json(raw).or_else(|| Self::parse_tagged(raw)) {
            return result;
        }

        debug!(payload = %raw, "Unrecognized build payload");
        Self::new(Outcome::Unknown, raw.trim())
    }

    fn parse_tagged(raw: &str) -> Option<Self> {
        let (tag, message) = raw.split_once(':')?;
        let outcome = Outcome::from_tag(tag)?;
        Some(Self::new(outcome, message.trim()))
    }

    fn parse_json(raw: &str) -> Option<Self> {
        if !raw.trim_start().starts_with('{') {
            return None;
        }

        let payload: JsonPayload = serde_json::from_str(raw).ok()?;
        let outcome = Outcome::from_tag(&payload.result)?;
        let message = payload.message.unwrap_or_default();
        Some(Self::new(outcome, message.trim()))
    }

    /// Returns the classified outcome.
    #[inline]
    #[must_use]
    pub const fn outcome(&self) -> Outcome {
        self.outcome
    }

    /// Returns the message carried by the payload.
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns `true` if the build passed.
    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.outcome == Outcome::Success
    }

    /// Returns `true` if the build broke.
    #[inline]
    #[must_use]
    pub fn is_failure(&self) -> bool {
        self.outcome == Outcome::Failure
    }

    /// Returns `true` if the build is unstable.
    #[inline]
    #[must_use]
    pub fn is_unstable(&self) -> bool {
        self.outcome == Outcome::Unstable
    }

    /// Returns `true` if the build was aborted.
    #[inline]
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.outcome == Outcome::Aborted
    }

    /// Renders the alert body.
    ///
    /// Falls back to `Build <TAG>` when the payload carried no text.
    #[must_use]
    pub fn to_message(&self) -> String {
        if self.message.is_empty() {
            format!("Build {}", self.outcome)
        } else {
            self.message.clone()
        }
    }
}

impl FromStr for BuildResult {
    type Err = std::convert::Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(raw))
    }
}

// ============================================================================
// Tests
// ============================================================================
