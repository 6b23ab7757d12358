//! Alert decisions and the presentation boundary.
//!
//! # Components
//!
//! | Type | Description |
//! |------|-------------|
//! | [`decide`] | Outcome + [`AlertConfig`] → [`Decision`] |
//! | [`SoundLibrary`] | Resolves [`SoundFile`]s in a directory |
//! | [`Presenter`] | Shows balloons, plays sounds |
//! | [`ConsolePresenter`] | Log-based presenter with an external sound player |

// ============================================================================
// Submodules
// ============================================================================

/// Outcome to balloon/sound mapping.
pub mod policy;

/// Presenter trait and console implementation.
pub mod presenter;

/// Sound file names and lookup.
pub mod sound;

// ============================================================================
// Re-exports
// ============================================================================

pub use policy::{Alert, AlertConfig, Decision, Severity, decide};
pub use presenter::{ConsolePresenter, PlayerSource, Presenter};
pub use sound::{SoundFile, SoundLibrary};
