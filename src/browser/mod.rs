//! Browser entities module.
//!
//! This module provides the driver-side mirrors of everything the
//! frontend announces over the wire:
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Window`] | Browser window (attributes, console log, captured plots) |
//! | [`CredentialPrompt`] | Login (401) prompt awaiting credentials |
//! | [`CertificatePrompt`] | TLS certificate verification prompt |
//!
//! Mirrors are owned by the session and mutated only from its dispatch
//! loop; test code reads them through the session's accessors.

// ============================================================================
// Submodules
// ============================================================================

/// Login prompt state.
pub mod login;

/// Certificate prompt state.
pub mod sslcert;

/// Browser window state.
pub mod window;

// ============================================================================
// Re-exports
// ============================================================================

pub use login::{CredentialDecision, CredentialPrompt};
pub use sslcert::{CertificateDecision, CertificatePrompt};
pub use window::{LogEntry, LogFilter, PlotCommand, Window};
