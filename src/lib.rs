//! Build Notifier - background client for build-server notifications.
//!
//! Keeps one WebSocket connection to a build-notification server, classifies
//! each inbound message into a build outcome and raises a balloon plus a
//! sound for it.
//!
//! # Architecture
//!
//! ```text
//! frame ──► ConnectionManager ──► BuildResult::parse ──► alert::decide ──► Presenter
//!            (one connection)      (pure)                 (live settings)   (balloon, sound)
//! ```
//!
//! Key design principles:
//!
//! - At most one connection exists; replacing it unregisters the old handler first
//! - Classification is total: unknown payloads become [`Outcome::Unknown`]
//! - Failures always alert, `show_error_only` silences everything else
//! - Transport errors become alerts, playback errors are dropped, nothing is fatal
//!
//! # Quick Start
//!
//! ```no_run
//! use build_notifier::{Client, Result, Settings};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings {
//!         url: "ws://ci.example.com:8081/".into(),
//!         ..Settings::default()
//!     };
//!
//!     let mut client = Client::builder().settings(settings).build()?;
//!     client.open().await;
//!
//!     tokio::signal::ctrl_c().await?;
//!     client.close();
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`alert`] | Alert policy, sounds, presenter boundary |
//! | [`client`] | [`Client`], [`Settings`], dispatch pipeline |
//! | [`error`] | Error types and [`Result`] alias |
//! | [`protocol`] | [`BuildResult`] classification |
//! | [`transport`] | WebSocket connection and its owner |

// ============================================================================
// Modules
// ============================================================================

/// Alert decisions and the presentation boundary.
pub mod alert;

/// Client lifecycle and configuration.
///
/// Use [`Client::builder()`] to create a configured client.
pub mod client;

/// Error types and result aliases.
pub mod error;

/// Build-server message classification.
pub mod protocol;

/// WebSocket transport layer.
pub mod transport;

// ============================================================================
// Re-exports
// ============================================================================

// Alert types
pub use alert::{Alert, AlertConfig, ConsolePresenter, Decision, Presenter, Severity, SoundFile};

// Client types
pub use client::{Client, ClientBuilder, Notifier, Settings, SettingsHandle};

// Error types
pub use error::{Error, Result};

// Protocol types
pub use protocol::{BuildResult, Outcome};

// Transport types
pub use transport::{ConnectionManager, ConnectionState, TransportEvent};
