//! Error types for the build notifier.
//!
//! This module defines all error types used throughout the crate.
//!
//! # Usage
//!
//! Fallible setup operations return [`Result<T>`] which uses [`Error`]:
//!
//! ```ignore
//! use build_notifier::{Result, Settings};
//!
//! fn example() -> Result<()> {
//!     let settings = Settings::load("settings.toml")?;
//!     settings.validate()?;
//!     Ok(())
//! }
//! ```
//!
//! Transport errors never reach the caller of
//! [`ConnectionManager::open`](crate::transport::ConnectionManager::open);
//! they are delivered to the registered handler as
//! [`TransportEvent::Error`](crate::transport::TransportEvent::Error).
//!
//! # Error Categories
//!
//! | Category | Variants |
//! |----------|----------|
//! | Configuration | [`Error::Config`], [`Error::InvalidUrl`] |
//! | Connection | [`Error::WebSocket`] |
//! | Dispatch | [`Error::Handler`] |
//! | Playback | [`Error::Playback`] |
//! | External | [`Error::Io`], [`Error::Toml`] |

// ============================================================================
// Imports
// ============================================================================

use std::io::Error as IoError;
use std::path::PathBuf;
use std::result::Result as StdResult;

use thiserror::Error;
use tokio_tungstenite::tungstenite::Error as WsError;

// ============================================================================
// Result Alias
// ============================================================================

/// Result type alias using crate [`enum@Error`].
pub type Result<T> = StdResult<T, Error>;

// ============================================================================
// Error Enum
// ============================================================================

/// Main error type for the crate.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Configuration error.
    ///
    /// Returned when settings or builder input is invalid.
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration error.
        message: String,
    },

    /// Server URL could not be used.
    #[error("Invalid URL '{url}': {message}")]
    InvalidUrl {
        /// The rejected URL.
        url: String,
        /// Why it was rejected.
        message: String,
    },

    // ========================================================================
    // Dispatch Errors
    // ========================================================================
    /// Event handler panicked while handling an event.
    ///
    /// Reported to the same handler so the user sees it; the connection
    /// keeps running.
    #[error("Event handler panicked: {message}")]
    Handler {
        /// Panic payload, if it was a string.
        message: String,
    },

    // ========================================================================
    // Playback Errors
    // ========================================================================
    /// Sound playback failed.
    #[error("Playback failed for {path}: {message}")]
    Playback {
        /// Sound file being played.
        path: PathBuf,
        /// Description of the failure.
        message: String,
    },

    // ========================================================================
    // External Errors
    // ========================================================================
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] IoError),

    /// Settings file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    // ========================================================================
    // Connection Errors
    // ========================================================================
    /// Handshake or read failure on the WebSocket.
    #[error("WebSocket error: {0}")]
    WebSocket(#[from] WsError),
}

// ============================================================================
// Error Constructors
// ============================================================================

impl Error {
    /// Creates a configuration error.
    #[inline]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Creates an invalid URL error.
    #[inline]
    pub fn invalid_url(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            message: message.into(),
        }
    }

    /// Creates a handler panic error.
    #[inline]
    pub fn handler(message: impl Into<String>) -> Self {
        Self::Handler {
            message: message.into(),
        }
    }

    /// Creates a playback error.
    #[inline]
    pub fn playback(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Playback {
            path: path.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// Error Predicates
// ============================================================================

impl Error {
    /// Returns `true` if this is a connection error.
    #[inline]
    #[must_use]
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::InvalidUrl { .. } | Self::WebSocket(_))
    }

    /// Returns `true` if this error came from sound playback.
    ///
    /// Playback errors are never shown to the user.
    #[inline]
    #[must_use]
    pub fn is_playback_error(&self) -> bool {
        matches!(self, Self::Playback { .. })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::ErrorKind;

    #[test]
    fn test_websocket_error_display() {
        let err: Error = WsError::ConnectionClosed.into();
        assert_eq!(err.to_string(), "WebSocket error: Connection closed normally");
    }

    #[test]
    fn test_config_error() {
        let err = Error::config("timeout must be finite");
        assert_eq!(err.to_string(), "Configuration error: timeout must be finite");
    }

    #[test]
    fn test_invalid_url_display() {
        let err = Error::invalid_url("http://ci", "scheme must be ws or wss");
        assert_eq!(
            err.to_string(),
            "Invalid URL 'http://ci': scheme must be ws or wss"
        );
    }

    #[test]
    fn test_is_connection_error() {
        assert!(Error::from(WsError::AlreadyClosed).is_connection_error());
        assert!(Error::invalid_url("x", "y").is_connection_error());
        assert!(!Error::config("test").is_connection_error());
    }

    #[test]
    fn test_is_playback_error() {
        assert!(Error::playback("/tmp/failure.wav", "device busy").is_playback_error());
        assert!(!Error::invalid_url("x", "y").is_playback_error());
    }

    #[test]
    fn test_handler_error() {
        let err = Error::handler("presenter exploded");
        assert_eq!(err.to_string(), "Event handler panicked: presenter exploded");
        assert!(!err.is_connection_error());
        assert!(!err.is_playback_error());
    }

    #[test]
    fn test_from_io_error() {
        let io_err = IoError::new(ErrorKind::NotFound, "file not found");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_from_toml_error() {
        let toml_err = toml::from_str::<toml::Table>("url = ").unwrap_err();
        let err: Error = toml_err.into();
        assert!(matches!(err, Error::Toml(_)));
    }
}
