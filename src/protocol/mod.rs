//! Build-server message types.
//!
//! The server pushes one text frame per finished build. This module
//! classifies those frames; it has no side effects.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `result` | [`Outcome`] and [`BuildResult`] |

// ============================================================================
// Submodules
// ============================================================================

/// Build outcome classification.
pub mod result;

// ============================================================================
// Re-exports
// ============================================================================

pub use result::{BuildResult, Outcome};
