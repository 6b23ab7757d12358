//! Presentation boundary.
//!
//! The core decides what to show and what to play; a [`Presenter`] does
//! the showing and playing.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;
use std::path::Path;
use std::process::{Command, Stdio};
use std::sync::Arc;

use tracing::{error, info, trace, warn};

use crate::error::{Error, Result};

use super::policy::{Alert, Severity};

// ============================================================================
// Presenter
// ============================================================================

/// Renders alerts and plays sounds.
///
/// Called from the connection event-loop task, one event at a time per
/// connection. Implementations that need a UI thread must hop to it
/// themselves.
pub trait Presenter: Send + Sync {
    /// Shows a balloon.
    fn show_alert(&self, alert: &Alert);

    /// Plays the sound at `path` and returns when it has finished.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Playback`] if playback fails. Callers discard it.
    fn play_sound(&self, path: &Path) -> Result<()>;
}

// ============================================================================
// ConsolePresenter
// ============================================================================

/// Source of the player command, consulted on every playback.
pub type PlayerSource = Arc<dyn Fn() -> Option<String> + Send + Sync>;

/// Presenter for terminals and headless hosts.
///
/// Alerts go to the log at a level matching their severity. Sounds are
/// played by an external command (e.g. `aplay`, `afplay`, `paplay`) that
/// receives the file path as its only argument.
#[derive(Clone)]
pub struct ConsolePresenter {
    player: PlayerSource,
}

impl fmt::Debug for ConsolePresenter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConsolePresenter")
            .field("player", &self.player())
            .finish()
    }
}

impl Default for ConsolePresenter {
    fn default() -> Self {
        Self::new(None)
    }
}

impl ConsolePresenter {
    /// Creates a presenter with a fixed player; `None` disables sound.
    #[must_use]
    pub fn new(player: Option<String>) -> Self {
        Self::live(move || player.clone())
    }

    /// Creates a presenter that asks `source` for the player before each sound.
    #[must_use]
    pub fn live(source: impl Fn() -> Option<String> + Send + Sync + 'static) -> Self {
        Self {
            player: Arc::new(source),
        }
    }

    /// Returns the player command currently in effect.
    #[inline]
    #[must_use]
    pub fn player(&self) -> Option<String> {
        (self.player)()
    }
}

impl Presenter for ConsolePresenter {
    fn show_alert(&self, alert: &Alert) {
        match alert.severity {
            Severity::Info => info!(
                target: "build_notifier::alert",
                title = %alert.title,
                timeout_secs = alert.timeout_secs,
                "{}",
                alert.body
            ),
            Severity::Warning => warn!(
                target: "build_notifier::alert",
                title = %alert.title,
                timeout_secs = alert.timeout_secs,
                "{}",
                alert.body
            ),
            Severity::Error => error!(
                target: "build_notifier::alert",
                title = %alert.title,
                timeout_secs = alert.timeout_secs,
                "{}",
                alert.body
            ),
        }
    }

    fn play_sound(&self, path: &Path) -> Result<()> {
        let Some(player) = self.player() else {
            trace!(path = %path.display(), "No player configured");
            return Ok(());
        };

        // status() waits for the child, so it is reaped on every path.
        let status = Command::new(&player)
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map_err(|e| Error::playback(path, format!("{player}: {e}")))?;

        if status.success() {
            Ok(())
        } else {
            Err(Error::playback(path, format!("{player} exited with {status}")))
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::io;

    use parking_lot::Mutex;
    use tracing::Level;

    fn alert(severity: Severity) -> Alert {
        Alert {
            severity,
            title: "CI".into(),
            body: "Build #1 broken".into(),
            timeout_secs: 1.0,
        }
    }

    /// Log sink shared with a test subscriber.
    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_show_alert_logs_at_severity_level() {
        let captured = Captured::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer({
                let captured = captured.clone();
                move || captured.clone()
            })
            .with_ansi(false)
            .with_max_level(Level::TRACE)
            .finish();

        let presenter = ConsolePresenter::default();
        tracing::subscriber::with_default(subscriber, || {
            for severity in [Severity::Info, Severity::Warning, Severity::Error] {
                presenter.show_alert(&alert(severity));
            }
        });

        let output = String::from_utf8(captured.0.lock().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3, "{output}");
        for (line, level) in lines.iter().zip(["INFO", "WARN", "ERROR"]) {
            assert!(line.contains(level), "{line}");
            assert!(line.contains("build_notifier::alert"), "{line}");
            assert!(line.contains("Build #1 broken"), "{line}");
            assert!(line.contains("title=CI"), "{line}");
        }
    }

    #[test]
    fn test_default_has_no_player() {
        assert_eq!(ConsolePresenter::default().player(), None);
        assert_eq!(
            ConsolePresenter::new(Some("aplay".into())).player().as_deref(),
            Some("aplay")
        );
    }

    #[test]
    fn test_no_player_is_silent_success() {
        let presenter = ConsolePresenter::new(None);
        assert!(presenter.play_sound(Path::new("/nonexistent/success.wav")).is_ok());
    }

    #[test]
    fn test_missing_player_is_playback_error() {
        let presenter = ConsolePresenter::new(Some("build-notifier-no-such-player".into()));
        let err = presenter
            .play_sound(Path::new("failure.wav"))
            .unwrap_err();
        assert!(err.is_playback_error());
    }

    #[cfg(unix)]
    #[test]
    fn test_live_player_follows_source() {
        let current = Arc::new(Mutex::new(Some("false".to_owned())));
        let presenter = ConsolePresenter::live({
            let current = Arc::clone(&current);
            move || current.lock().clone()
        });
        assert!(presenter.play_sound(Path::new("success.wav")).is_err());

        *current.lock() = Some("true".into());
        assert!(presenter.play_sound(Path::new("success.wav")).is_ok());

        *current.lock() = None;
        assert_eq!(presenter.player(), None);
        assert!(presenter.play_sound(Path::new("success.wav")).is_ok());
    }

    #[cfg(unix)]
    #[test]
    fn test_player_exit_status() {
        let ok = ConsolePresenter::new(Some("true".into()));
        assert!(ok.play_sound(Path::new("success.wav")).is_ok());

        let failing = ConsolePresenter::new(Some("false".into()));
        assert!(matches!(
            failing.play_sound(Path::new("success.wav")),
            Err(Error::Playback { .. })
        ));
    }
}
