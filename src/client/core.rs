//! Notifier client lifecycle.
//!
//! [`Client`] ties the settings, the [`ConnectionManager`] and the
//! [`Notifier`] together and exposes the three lifecycle hooks the host
//! needs: open on startup, re-open on settings change, close on exit.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;

use tracing::info;

use crate::error::Result;
use crate::transport::{ConnectionManager, ConnectionState};

use super::builder::ClientBuilder;
use super::notifier::Notifier;
use super::settings::{Settings, SettingsHandle};

// ============================================================================
// Client
// ============================================================================

/// Background build-notification client.
///
/// # Example
///
/// ```no_run
/// use build_notifier::{Client, Settings};
///
/// # async fn example() -> build_notifier::Result<()> {
/// let mut client = Client::builder()
///     .settings(Settings::default())
///     .build()?;
///
/// client.open().await;
/// // ... later, on exit
/// client.close();
/// # Ok(())
/// # }
/// ```
pub struct Client {
    settings: SettingsHandle,
    notifier: Arc<Notifier>,
    manager: ConnectionManager,
}

impl fmt::Debug for Client {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Client")
            .field("url", &self.settings.url())
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}

impl Client {
    /// Creates a configuration builder for the client.
    #[inline]
    #[must_use]
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    pub(crate) fn new(settings: SettingsHandle, notifier: Notifier) -> Self {
        let notifier = Arc::new(notifier);
        let manager = ConnectionManager::new(Arc::clone(&notifier).into_handler());

        Self {
            settings,
            notifier,
            manager,
        }
    }

    /// Connects to the configured URL, replacing any current connection.
    ///
    /// Connect failures are shown through the presenter, not returned.
    pub async fn open(&mut self) {
        let url = self.settings.url();
        self.manager.open(&url).await;
    }

    /// Validates and applies new settings, then re-opens the connection.
    ///
    /// # Errors
    ///
    /// Returns the validation error and keeps the old settings and
    /// connection untouched.
    pub async fn apply_settings(&mut self, settings: Settings) -> Result<()> {
        settings.validate()?;

        info!(url = %settings.url, show_error_only = settings.show_error_only, "Applying settings");
        self.settings.replace(settings);
        self.open().await;
        Ok(())
    }

    /// Closes the connection. Safe to call repeatedly.
    pub fn close(&mut self) {
        self.manager.close();
    }

    /// Returns the live settings handle.
    #[inline]
    #[must_use]
    pub fn settings(&self) -> &SettingsHandle {
        &self.settings
    }

    /// Returns the dispatch pipeline.
    #[inline]
    #[must_use]
    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Returns the connection state.
    #[inline]
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        self.manager.state()
    }
}

// ============================================================================
// Tests
// ============================================================================
