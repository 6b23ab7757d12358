//! Builder pattern for client configuration.
//!
//! # Example
//!
//! ```no_run
//! use build_notifier::{Client, Settings};
//!
//! # fn example() -> build_notifier::Result<()> {
//! let client = Client::builder()
//!     .settings(Settings::load_or_default("settings.toml")?)
//!     .build()?;
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::alert::{ConsolePresenter, Presenter, SoundLibrary};
use crate::error::{Error, Result};

use super::core::Client;
use super::notifier::Notifier;
use super::settings::{Settings, SettingsHandle};

// ============================================================================
// ClientBuilder
// ============================================================================

/// Builder for configuring a [`Client`] instance.
///
/// Use [`Client::builder()`] to create a new builder.
#[derive(Default, Clone)]
pub struct ClientBuilder {
    /// Initial settings.
    settings: Option<Settings>,
    /// Fallback sound directory. Program directory when unset.
    sound_dir: Option<PathBuf>,
    /// Presenter. [`ConsolePresenter`] when unset.
    presenter: Option<Arc<dyn Presenter>>,
}

impl fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("settings", &self.settings)
            .field("sound_dir", &self.sound_dir)
            .field("has_presenter", &self.presenter.is_some())
            .finish()
    }
}

// ============================================================================
// ClientBuilder Implementation
// ============================================================================

impl ClientBuilder {
    /// Creates a builder with no configuration.
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the initial settings.
    #[inline]
    #[must_use]
    pub fn settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Sets the sound directory used when the settings do not name one.
    #[inline]
    #[must_use]
    pub fn sound_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sound_dir = Some(dir.into());
        self
    }

    /// Sets the presenter that shows alerts and plays sounds.
    #[inline]
    #[must_use]
    pub fn presenter(mut self, presenter: Arc<dyn Presenter>) -> Self {
        self.presenter = Some(presenter);
        self
    }

    /// Builds the client with validation.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidUrl`] or [`Error::Config`] if the settings are invalid
    /// - [`Error::Io`] if no sound directory is set and the program
    ///   directory cannot be determined
    pub fn build(self) -> Result<Client> {
        let settings = self.settings.unwrap_or_default();
        settings.validate()?;

        let sound_dir = match self.sound_dir {
            Some(dir) => dir,
            None => SoundLibrary::program_dir()?.dir().to_path_buf(),
        };

        if let Some(dir) = settings.sound_dir.as_deref()
            && !dir.is_dir()
        {
            return Err(Error::config(format!(
                "sound_dir is not a directory: {}",
                dir.display()
            )));
        }

        let handle = SettingsHandle::new(settings);

        let presenter: Arc<dyn Presenter> = match self.presenter {
            Some(presenter) => presenter,
            None => {
                let live = handle.clone();
                Arc::new(ConsolePresenter::live(move || live.sound_player()))
            }
        };

        let notifier = Notifier::new(handle.clone(), sound_dir, presenter);

        Ok(Client::new(handle, notifier))
    }
}

// ============================================================================
// Tests
// ============================================================================
