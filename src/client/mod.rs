//! Build notifier client.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Client`] | Lifecycle: open, re-open on settings change, close |
//! | [`ClientBuilder`] | Fluent configuration builder |
//! | [`Notifier`] | Classify-and-dispatch pipeline |
//! | [`Settings`] | User settings (TOML) |
//! | [`SettingsHandle`] | Shared live settings |

// ============================================================================
// Submodules
// ============================================================================

/// Fluent builder pattern for client configuration.
pub mod builder;

/// Client lifecycle.
pub mod core;

/// Message classification and alert dispatch.
pub mod notifier;

/// User settings.
pub mod settings;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::ClientBuilder;
pub use self::core::Client;
pub use notifier::Notifier;
pub use settings::{Settings, SettingsHandle};
