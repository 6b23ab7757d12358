//! Sound file selection and lookup.

// ============================================================================
// Imports
// ============================================================================

use std::env;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{Error, Result};
use crate::protocol::Outcome;

// ============================================================================
// SoundFile
// ============================================================================

/// Sound played for an outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundFile {
    /// `success.wav`
    Success,
    /// `failure.wav`
    Failure,
    /// `unstable.wav`
    Unstable,
    /// `aborted.wav`
    Aborted,
}

impl SoundFile {
    /// Sound for `outcome`, `None` for [`Outcome::Unknown`].
    #[must_use]
    pub const fn for_outcome(outcome: Outcome) -> Option<Self> {
        match outcome {
            Outcome::Success => Some(Self::Success),
            Outcome::Failure => Some(Self::Failure),
            Outcome::Unstable => Some(Self::Unstable),
            Outcome::Aborted => Some(Self::Aborted),
            Outcome::Unknown => None,
        }
    }

    /// File name looked up in the sound directory.
    #[inline]
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::Success => "success.wav",
            Self::Failure => "failure.wav",
            Self::Unstable => "unstable.wav",
            Self::Aborted => "aborted.wav",
        }
    }
}

// ============================================================================
// SoundLibrary
// ============================================================================

/// Directory holding the `.wav` files.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SoundLibrary {
    dir: PathBuf,
}

impl SoundLibrary {
    /// Uses `dir` as the sound directory.
    #[inline]
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Uses the directory of the running executable.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the executable path cannot be determined.
    pub fn program_dir() -> Result<Self> {
        let exe = env::current_exe()?;
        let dir = exe
            .parent()
            .ok_or_else(|| Error::config(format!("No parent directory for {}", exe.display())))?;
        Ok(Self::new(dir))
    }

    /// Returns the sound directory.
    #[inline]
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of `sound`, whether or not it exists.
    #[inline]
    #[must_use]
    pub fn path_of(&self, sound: SoundFile) -> PathBuf {
        self.dir.join(sound.file_name())
    }

    /// Path of `sound` if the file exists.
    #[must_use]
    pub fn resolve(&self, sound: SoundFile) -> Option<PathBuf> {
        let path = self.path_of(sound);
        if path.is_file() {
            Some(path)
        } else {
            debug!(path = %path.display(), "Sound file missing, skipping playback");
            None
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs;

    #[test]
    fn test_file_names() {
        assert_eq!(SoundFile::Success.file_name(), "success.wav");
        assert_eq!(SoundFile::Failure.file_name(), "failure.wav");
        assert_eq!(SoundFile::Unstable.file_name(), "unstable.wav");
        assert_eq!(SoundFile::Aborted.file_name(), "aborted.wav");
    }

    #[test]
    fn test_unknown_has_no_sound() {
        assert_eq!(SoundFile::for_outcome(Outcome::Unknown), None);
        assert_eq!(
            SoundFile::for_outcome(Outcome::Unstable),
            Some(SoundFile::Unstable)
        );
    }

    #[test]
    fn test_resolve_existing_file() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::write(dir.path().join("failure.wav"), b"RIFF")?;

        let library = SoundLibrary::new(dir.path());
        assert_eq!(
            library.resolve(SoundFile::Failure),
            Some(dir.path().join("failure.wav"))
        );
        assert_eq!(library.resolve(SoundFile::Success), None);
        Ok(())
    }

    #[test]
    fn test_resolve_ignores_directories() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        fs::create_dir(dir.path().join("aborted.wav"))?;

        let library = SoundLibrary::new(dir.path());
        assert_eq!(library.resolve(SoundFile::Aborted), None);
        Ok(())
    }

    #[test]
    fn test_program_dir_contains_test_binary() -> anyhow::Result<()> {
        let library = SoundLibrary::program_dir()?;
        let exe = env::current_exe()?;
        assert_eq!(Some(library.dir()), exe.parent());
        Ok(())
    }
}
