//! Wire protocol message types.
//!
//! This module defines both halves of the text protocol spoken with the
//! monkey frontend: outbound command lines and inbound notification
//! lines.
//!
//! # Protocol Overview
//!
//! | Message Type | Direction | Purpose |
//! |--------------|-----------|---------|
//! | [`Command`] | Driver → Frontend | Control request |
//! | [`Notification`] | Frontend → Driver | State announcement |
//!
//! Lines are space-separated tokens with no escaping. The first token
//! names a command family (`GENERIC`, `WINDOW`, `LOGIN`, `SSLCERT`,
//! `PLOT`); free-text payloads occupy the tail of a line and keep their
//! internal spaces by rejoining the remaining tokens.
//!
//! # Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | `args` | Token cursor over one line |
//! | `command` | Outbound command encoding |
//! | `event` | Inbound notification parsing |

// ============================================================================
// Submodules
// ============================================================================

/// Token cursor over a protocol line.
pub mod args;

/// Outbound command messages.
pub mod command;

/// Inbound notification messages.
pub mod event;

// ============================================================================
// Re-exports
// ============================================================================

pub use args::TokenCursor;
pub use command::{Command, RedrawArea};
pub use event::{
    CertAction, GenericEvent, LoginAction, NewWindowParams, Notification, WindowAction,
    WindowUpdate,
};
