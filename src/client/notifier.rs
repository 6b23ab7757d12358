//! Classify-and-dispatch pipeline.
//!
//! Each transport event runs `Received → Classified → {Suppressed | Alerted}`
//! once, with no retries and no queueing.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tokio::runtime::{Handle, RuntimeFlavor};
use tracing::{debug, info};

use crate::alert::{self, Alert, Decision, Presenter, Severity, SoundFile, SoundLibrary};
use crate::error::Error;
use crate::protocol::BuildResult;
use crate::transport::{EventHandler, TransportEvent};

use super::settings::SettingsHandle;

// ============================================================================
// Notifier
// ============================================================================

/// Turns transport events into presenter calls.
///
/// Reads the settings on every event, so changes apply to the next
/// message without a reconnect.
pub struct Notifier {
    settings: SettingsHandle,
    /// Sound directory used when the settings do not name one.
    default_sound_dir: PathBuf,
    presenter: Arc<dyn Presenter>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("settings", &self.settings)
            .field("default_sound_dir", &self.default_sound_dir)
            .finish_non_exhaustive()
    }
}

impl Notifier {
    /// Creates a notifier.
    #[must_use]
    pub fn new(
        settings: SettingsHandle,
        default_sound_dir: impl Into<PathBuf>,
        presenter: Arc<dyn Presenter>,
    ) -> Self {
        Self {
            settings,
            default_sound_dir: default_sound_dir.into(),
            presenter,
        }
    }

    /// Wraps the notifier as a transport event handler.
    #[must_use]
    pub fn into_handler(self: Arc<Self>) -> EventHandler {
        Arc::new(move |event: TransportEvent| self.handle_event(event))
    }

    /// Handles one transport event.
    pub fn handle_event(&self, event: TransportEvent) {
        match event {
            TransportEvent::Message(text) => {
                self.notify(&text);
            }
            TransportEvent::Error(error) => self.report_error(&error),
        }
    }

    /// Classifies `raw` and alerts as the policy decides.
    ///
    /// Blocks until the sound, if any, has finished.
    pub fn notify(&self, raw: &str) -> Decision {
        let result = BuildResult::parse(raw);
        let config = self.settings.alert_config();
        let decision = alert::decide(result.outcome(), &config);

        match decision {
            Decision::Suppressed => {
                debug!(outcome = %result.outcome(), "Suppressed");
            }
            Decision::Alert { severity, sound } => {
                info!(outcome = %result.outcome(), %severity, "Alerting");
                self.presenter.show_alert(&Alert {
                    severity,
                    title: self.settings.title(),
                    body: result.to_message(),
                    timeout_secs: config.balloon_timeout_secs,
                });
                self.play(sound);
            }
        }

        decision
    }

    /// Shows a transport error to the user.
    pub fn report_error(&self, error: &Error) {
        self.presenter.show_alert(&Alert {
            severity: Severity::Error,
            title: self.settings.title(),
            body: error.to_string(),
            timeout_secs: self.settings.alert_config().balloon_timeout_secs,
        });
    }

    /// Plays `sound` if its file exists. Failures are logged and dropped.
    fn play(&self, sound: SoundFile) {
        let dir = self
            .settings
            .sound_dir()
            .unwrap_or_else(|| self.default_sound_dir.clone());

        let Some(path) = SoundLibrary::new(dir).resolve(sound) else {
            return;
        };

        if let Err(e) = blocking(|| self.presenter.play_sound(&path)) {
            debug!(error = %e, "Ignoring playback failure");
        }
    }
}

/// Runs `f` to completion, first moving other tasks off this worker when
/// called on a multi-threaded runtime.
fn blocking<T>(f: impl FnOnce() -> T) -> T {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::MultiThread => {
            tokio::task::block_in_place(f)
        }
        _ => f(),
    }
}

// ============================================================================
// Tests
// ============================================================================
