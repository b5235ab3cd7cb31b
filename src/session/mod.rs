//! Session management module.
//!
//! A [`Session`] owns one monkey process end to end: the stdio channel,
//! the entity mirrors, the timer queue and the event loop that feeds
//! them. Test code drives it with blocking operations and reads state
//! back between steps.
//!
//! | Module | Responsibility |
//! |--------|----------------|
//! | [`builder`] | Launch configuration and the startup handshake |
//! | [`core`] | Session state and notification dispatch |
//! | [`event_loop`] | Step, run and wait primitives |
//! | [`windows`] | Window operations (open, navigate, redraw, logs) |
//! | [`prompts`] | Login and certificate prompt operations |

// ============================================================================
// Submodules
// ============================================================================

/// Session launch configuration.
pub mod builder;

/// Session state and dispatch.
pub mod core;

/// Cooperative event loop.
pub mod event_loop;

/// Prompt operations.
pub mod prompts;

/// Window operations.
pub mod windows;

// ============================================================================
// Re-exports
// ============================================================================

pub use builder::SessionBuilder;
pub use core::Session;
